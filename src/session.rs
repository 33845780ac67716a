//! Interactive assistant session.
//!
//! Drives the read-eval-respond conversation loop: typed input is answered
//! directly, empty input falls back to voice capture, and the literal token
//! "stop" (any case, typed or spoken) ends the session. Every turn embeds
//! the query and retrieves against the document collection independently;
//! nothing is cached between turns.

use crate::cli::Output;
use crate::error::Result;
use crate::rag::{Answer, AnswerEngine};
use crate::voice::{Speaker, SpeechCapture};
use console::style;
use std::io::{self, BufRead, Write};
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Message printed and spoken when the session ends.
const TERMINATION_MESSAGE: &str = "Conversation ended.";

/// Conversation loop state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    /// Waiting for the user to type a line.
    AwaitingInput,
    /// Capturing a spoken phrase.
    Listening,
    /// Embedding, retrieving, and generating.
    Processing,
    /// Printing and speaking the answer.
    Responding,
    /// Terminal state; the loop has exited.
    Ended,
}

/// The outcome of a single conversation turn.
#[derive(Debug)]
pub enum Turn {
    /// The query was answered (or matched nothing).
    Answered(Answer),
    /// Voice capture produced no usable phrase.
    NotUnderstood,
    /// The user asked to stop.
    Stopped,
}

/// An interactive question-answering session.
///
/// Owns its collaborators explicitly; they are constructed at session start
/// and dropped with the session. Voice input and output are optional so the
/// loop also runs on machines without audio devices.
pub struct Session {
    engine: AnswerEngine,
    voice_in: Option<Arc<dyn SpeechCapture>>,
    voice_out: Option<Arc<dyn Speaker>>,
    state: SessionState,
}

impl Session {
    /// Create a text-only session.
    pub fn new(engine: AnswerEngine) -> Self {
        Self {
            engine,
            voice_in: None,
            voice_out: None,
            state: SessionState::AwaitingInput,
        }
    }

    /// Attach a speech capture handle.
    pub fn with_voice_input(mut self, voice_in: Arc<dyn SpeechCapture>) -> Self {
        self.voice_in = Some(voice_in);
        self
    }

    /// Attach a speaker handle.
    pub fn with_voice_output(mut self, voice_out: Arc<dyn Speaker>) -> Self {
        self.voice_out = Some(voice_out);
        self
    }

    /// Current loop state.
    pub fn state(&self) -> SessionState {
        self.state
    }

    /// Handle one turn of input.
    ///
    /// Empty typed input triggers voice capture when a capture handle is
    /// attached. "stop" is matched before any embedding or retrieval work,
    /// from typed and recognized input alike.
    pub async fn handle_input(&mut self, typed: &str) -> Result<Turn> {
        let typed = typed.trim();

        if is_stop(typed) {
            self.state = SessionState::Ended;
            return Ok(Turn::Stopped);
        }

        let query = if typed.is_empty() {
            let Some(voice_in) = &self.voice_in else {
                // Text-only session; nothing to capture from.
                return Ok(Turn::NotUnderstood);
            };

            self.state = SessionState::Listening;
            let recognized = match voice_in.listen().await {
                Ok(text) => text,
                Err(e) => {
                    self.state = SessionState::AwaitingInput;
                    return Err(e);
                }
            };

            match recognized {
                Some(text) => text,
                None => {
                    debug!("No phrase recognized");
                    self.state = SessionState::AwaitingInput;
                    return Ok(Turn::NotUnderstood);
                }
            }
        } else {
            typed.to_string()
        };

        if is_stop(&query) {
            self.state = SessionState::Ended;
            return Ok(Turn::Stopped);
        }

        self.state = SessionState::Processing;
        let result = self.engine.answer(&query).await;
        self.state = SessionState::AwaitingInput;

        Ok(Turn::Answered(result?))
    }

    /// Run the interactive console loop until the user stops.
    pub async fn run(&mut self) -> Result<()> {
        println!("\n{}", style("Svara").bold().cyan());
        if self.voice_in.is_some() {
            println!(
                "{}\n",
                style("Type your question, or press Enter to speak. Type 'stop' to exit.").dim()
            );
        } else {
            println!("{}\n", style("Type your question. Type 'stop' to exit.").dim());
        }

        let stdin = io::stdin();
        let mut stdout = io::stdout();

        while self.state != SessionState::Ended {
            print!("{} ", style("You:").green().bold());
            stdout.flush()?;

            let mut line = String::new();
            if stdin.lock().read_line(&mut line)? == 0 {
                // EOF on stdin ends the session like "stop" does.
                self.state = SessionState::Ended;
                break;
            }

            if line.trim().is_empty() && self.voice_in.is_some() {
                Output::info("Listening...");
            }

            match self.handle_input(&line).await {
                Ok(Turn::Stopped) => {
                    info!("Session ended by user");
                    println!("\n{}", TERMINATION_MESSAGE);
                    self.say(TERMINATION_MESSAGE).await;
                }
                Ok(Turn::NotUnderstood) => {
                    if self.voice_in.is_some() {
                        Output::warning("Could not understand. Please repeat.");
                    } else {
                        Output::info("Type a question, or 'stop' to exit.");
                    }
                }
                Ok(Turn::Answered(answer)) => {
                    self.state = SessionState::Responding;
                    println!("\n{} {}\n", style("Svara:").cyan().bold(), answer.text());

                    for source in answer.sources() {
                        println!(
                            "   {}",
                            style(format!("[{} | score {:.2}]", source.source, source.score))
                                .dim()
                        );
                    }

                    self.say(answer.text()).await;
                    self.state = SessionState::AwaitingInput;
                }
                Err(e) if e.is_recoverable() => {
                    // Abandon the turn, keep the session alive.
                    warn!(error = %e, "turn abandoned");
                    Output::error(&format!("{}", e));
                }
                Err(e) => return Err(e),
            }
        }

        Ok(())
    }

    /// Speak text if a speaker is attached; synthesis failures only warn.
    async fn say(&self, text: &str) {
        if let Some(voice_out) = &self.voice_out {
            if let Err(e) = voice_out.speak(text).await {
                warn!(error = %e, "speech synthesis failed");
                Output::warning(&format!("Speech output unavailable: {}", e));
            }
        }
    }
}

/// Whether input is the session-ending token.
fn is_stop(input: &str) -> bool {
    input.trim().eq_ignore_ascii_case("stop")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::embedding::Embedder;
    use crate::error::SvaraError;
    use crate::rag::{Generator, Retriever, NO_MATCH_MESSAGE};
    use crate::vector_store::{
        cosine_similarity, Document, SearchResult, VectorStore,
    };
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;

    type EventLog = Arc<Mutex<Vec<&'static str>>>;

    struct LoggingEmbedder {
        log: EventLog,
        calls: AtomicUsize,
    }

    #[async_trait]
    impl Embedder for LoggingEmbedder {
        async fn embed(&self, _text: &str) -> Result<Vec<f32>> {
            self.log.lock().unwrap().push("embed");
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(vec![1.0, 0.0])
        }

        async fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
            Ok(texts.iter().map(|_| vec![1.0, 0.0]).collect())
        }

        fn dimensions(&self) -> usize {
            2
        }
    }

    struct LoggingStore {
        log: EventLog,
        calls: AtomicUsize,
        docs: Vec<Document>,
    }

    #[async_trait]
    impl VectorStore for LoggingStore {
        async fn upsert(&self, _doc: &Document) -> Result<()> {
            unimplemented!("not used in session tests")
        }

        async fn upsert_batch(&self, _docs: &[Document]) -> Result<usize> {
            unimplemented!("not used in session tests")
        }

        async fn search(&self, query_embedding: &[f32], limit: usize) -> Result<Vec<SearchResult>> {
            self.search_with_threshold(query_embedding, limit, 0.0).await
        }

        async fn search_with_threshold(
            &self,
            query_embedding: &[f32],
            limit: usize,
            min_score: f32,
        ) -> Result<Vec<SearchResult>> {
            self.log.lock().unwrap().push("search");
            self.calls.fetch_add(1, Ordering::SeqCst);

            let mut results: Vec<SearchResult> = self
                .docs
                .iter()
                .map(|doc| SearchResult {
                    document: doc.clone(),
                    score: cosine_similarity(query_embedding, &doc.embedding),
                })
                .filter(|r| r.score >= min_score)
                .collect();
            results.sort_by(|a, b| b.score.total_cmp(&a.score));
            results.truncate(limit);
            Ok(results)
        }

        async fn delete_by_source(&self, _source: &str) -> Result<usize> {
            Ok(0)
        }

        async fn list_documents(&self) -> Result<Vec<Document>> {
            Ok(self.docs.clone())
        }

        async fn document_count(&self) -> Result<usize> {
            Ok(self.docs.len())
        }
    }

    struct CountingGenerator {
        calls: AtomicUsize,
        reply: Option<String>,
    }

    #[async_trait]
    impl Generator for CountingGenerator {
        async fn generate(&self, prompt: &str) -> Result<String> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            // Default reply echoes the prompt so tests can check the answer
            // was derived from the retrieved document.
            Ok(self.reply.clone().unwrap_or_else(|| prompt.to_string()))
        }
    }

    struct ScriptedCapture {
        calls: AtomicUsize,
        result: Result<Option<String>>,
    }

    impl ScriptedCapture {
        fn returning(result: Result<Option<String>>) -> Arc<Self> {
            Arc::new(Self {
                calls: AtomicUsize::new(0),
                result,
            })
        }
    }

    #[async_trait]
    impl SpeechCapture for ScriptedCapture {
        async fn listen(&self) -> Result<Option<String>> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            match &self.result {
                Ok(text) => Ok(text.clone()),
                Err(_) => Err(SvaraError::SpeechToText("backend unreachable".to_string())),
            }
        }
    }

    struct Harness {
        session: Session,
        log: EventLog,
        embedder_calls: Arc<LoggingEmbedder>,
        store_calls: Arc<LoggingStore>,
        generator_calls: Arc<CountingGenerator>,
    }

    fn harness(docs: Vec<Document>, reply: Option<String>) -> Harness {
        let log: EventLog = Arc::new(Mutex::new(Vec::new()));

        let embedder = Arc::new(LoggingEmbedder {
            log: log.clone(),
            calls: AtomicUsize::new(0),
        });
        let store = Arc::new(LoggingStore {
            log: log.clone(),
            calls: AtomicUsize::new(0),
            docs,
        });
        let generator = Arc::new(CountingGenerator {
            calls: AtomicUsize::new(0),
            reply,
        });

        let engine = AnswerEngine::new(
            Retriever::new(embedder.clone(), store.clone()),
            generator.clone(),
        );

        Harness {
            session: Session::new(engine),
            log,
            embedder_calls: embedder,
            store_calls: store,
            generator_calls: generator,
        }
    }

    fn paris_doc() -> Document {
        Document::new(
            "facts".to_string(),
            "Paris is the capital of France".to_string(),
            vec![1.0, 0.0],
        )
    }

    #[tokio::test]
    async fn test_embedding_precedes_retrieval() {
        let mut h = harness(vec![paris_doc()], Some("answer".to_string()));

        h.session.handle_input("What is the capital of France?").await.unwrap();

        let events = h.log.lock().unwrap().clone();
        assert_eq!(events, vec!["embed", "search"]);
    }

    #[tokio::test]
    async fn test_empty_retrieval_skips_generation() {
        let mut h = harness(Vec::new(), None);

        let turn = h.session.handle_input("anything at all").await.unwrap();

        match turn {
            Turn::Answered(answer) => assert_eq!(answer.text(), NO_MATCH_MESSAGE),
            other => panic!("expected an answer, got {:?}", other),
        }
        assert_eq!(h.generator_calls.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_stop_is_case_insensitive_and_skips_retrieval() {
        for input in ["stop", "STOP", "Stop", "  sToP  "] {
            let mut h = harness(vec![paris_doc()], None);

            let turn = h.session.handle_input(input).await.unwrap();

            assert!(matches!(turn, Turn::Stopped));
            assert_eq!(h.session.state(), SessionState::Ended);
            assert_eq!(h.embedder_calls.calls.load(Ordering::SeqCst), 0);
            assert_eq!(h.store_calls.calls.load(Ordering::SeqCst), 0);
        }
    }

    #[tokio::test]
    async fn test_empty_input_triggers_voice_capture() {
        let mut h = harness(vec![paris_doc()], Some("answer".to_string()));
        let capture = ScriptedCapture::returning(Ok(Some(
            "What is the capital of France?".to_string(),
        )));
        h.session = h.session.with_voice_input(capture.clone());

        let turn = h.session.handle_input("").await.unwrap();

        assert_eq!(capture.calls.load(Ordering::SeqCst), 1);
        assert!(matches!(turn, Turn::Answered(_)));
        // The empty line itself was never used as a query
        assert_eq!(h.embedder_calls.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_spoken_stop_ends_session() {
        let mut h = harness(vec![paris_doc()], None);
        let capture = ScriptedCapture::returning(Ok(Some("Stop".to_string())));
        h.session = h.session.with_voice_input(capture);

        let turn = h.session.handle_input("").await.unwrap();

        assert!(matches!(turn, Turn::Stopped));
        assert_eq!(h.embedder_calls.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_unrecognized_phrase_is_not_a_query() {
        let mut h = harness(vec![paris_doc()], None);
        let capture = ScriptedCapture::returning(Ok(None));
        h.session = h.session.with_voice_input(capture);

        let turn = h.session.handle_input("").await.unwrap();

        assert!(matches!(turn, Turn::NotUnderstood));
        assert_eq!(h.session.state(), SessionState::AwaitingInput);
        assert_eq!(h.embedder_calls.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_capture_failure_is_recoverable() {
        let mut h = harness(vec![paris_doc()], None);
        let capture = ScriptedCapture::returning(Err(SvaraError::SpeechToText(
            "backend unreachable".to_string(),
        )));
        h.session = h.session.with_voice_input(capture);

        let err = h.session.handle_input("").await.unwrap_err();

        assert!(err.is_recoverable());
        assert_eq!(h.session.state(), SessionState::AwaitingInput);
    }

    #[tokio::test]
    async fn test_round_trip_answer_derives_from_stored_document() {
        // The generator echoes its prompt, so the answer text contains
        // whatever document was retrieved.
        let mut h = harness(vec![paris_doc()], None);

        let turn = h
            .session
            .handle_input("What is the capital of France?")
            .await
            .unwrap();

        match turn {
            Turn::Answered(answer) => {
                assert!(answer.text().contains("Paris is the capital of France"));
                assert!(answer.text().contains("What is the capital of France?"));
            }
            other => panic!("expected an answer, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_consecutive_queries_embed_and_retrieve_independently() {
        let mut h = harness(vec![paris_doc()], Some("answer".to_string()));

        h.session.handle_input("first question").await.unwrap();
        h.session.handle_input("second question").await.unwrap();

        assert_eq!(h.embedder_calls.calls.load(Ordering::SeqCst), 2);
        assert_eq!(h.store_calls.calls.load(Ordering::SeqCst), 2);

        let events = h.log.lock().unwrap().clone();
        assert_eq!(events, vec!["embed", "search", "embed", "search"]);
    }

    #[tokio::test]
    async fn test_text_only_empty_input_reprompts() {
        let mut h = harness(vec![paris_doc()], None);

        let turn = h.session.handle_input("   ").await.unwrap();

        assert!(matches!(turn, Turn::NotUnderstood));
        assert_eq!(h.embedder_calls.calls.load(Ordering::SeqCst), 0);
    }
}
