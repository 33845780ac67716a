//! Ask command implementation.

use super::{build_engine, open_store};
use crate::cli::preflight::{self, Operation};
use crate::cli::Output;
use crate::config::Settings;
use anyhow::Result;

/// Run the ask command.
pub async fn run_ask(question: &str, settings: Settings) -> Result<()> {
    if let Err(e) = preflight::check(Operation::Ask, &settings) {
        Output::error(&format!("{}", e));
        return Err(e.into());
    }

    let store = open_store(&settings)?;
    let engine = build_engine(&settings, store);

    let spinner = Output::spinner("Searching your documents...");

    match engine.answer(question).await {
        Ok(answer) => {
            spinner.finish_and_clear();

            println!("\n{}\n", answer.text());

            if !answer.sources().is_empty() {
                Output::header("Sources");
                for source in answer.sources() {
                    Output::search_result(&source.source, source.score, &source.content);
                }
            }
        }
        Err(e) => {
            spinner.finish_and_clear();
            Output::error(&format!("Failed to generate answer: {}", e));
            return Err(e.into());
        }
    }

    Ok(())
}
