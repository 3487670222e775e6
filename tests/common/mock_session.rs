//! Mock Recognition Session for Testing
//!
//! All sessions built by one factory share a log, so tests can speak into the
//! current session from outside the pipeline and check what the controller did.

use speechflow::error::SessionError;
use speechflow::recognition::{
    EventSink, RecognitionSession, ResultBatch, SessionConfig, SessionFactory,
};
use std::collections::VecDeque;
use std::sync::{Arc, Mutex, MutexGuard};

#[derive(Debug, Default)]
pub struct SessionLog {
    pub created: usize,
    pub starts: usize,
    pub stops: usize,
    /// Language of every created session, then every live change
    pub languages: Vec<String>,
    /// Error codes returned by upcoming `start` calls, in order
    pub start_failures: VecDeque<String>,
    sink: Option<EventSink>,
}

#[derive(Clone, Default)]
pub struct MockSessionFactory {
    shared: Arc<Mutex<SessionLog>>,
}

impl MockSessionFactory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Factory whose next starts fail with `codes`
    pub fn failing_starts(codes: &[&str]) -> Self {
        let factory = Self::new();
        factory
            .log()
            .start_failures
            .extend(codes.iter().map(|c| c.to_string()));
        factory
    }

    pub fn log(&self) -> MutexGuard<'_, SessionLog> {
        self.shared.lock().expect("Session log poisoned")
    }

    fn sink(&self) -> EventSink {
        self.log()
            .sink
            .clone()
            .expect("No session has been created")
    }

    /// Deliver a final transcript from the current session
    pub fn say(&self, transcript: &str) {
        self.sink().result(ResultBatch::single(transcript, 0.9));
    }

    pub fn say_batch(&self, batch: ResultBatch) {
        self.sink().result(batch);
    }

    /// Platform failure: an error event followed by the session end
    pub fn fail(&self, code: &str) {
        let sink = self.sink();
        sink.error(Some(code));
        sink.end();
    }

    /// Session ended on its own
    pub fn end(&self) {
        self.sink().end();
    }
}

impl SessionFactory for MockSessionFactory {
    fn create(
        &self,
        config: &SessionConfig,
        sink: EventSink,
    ) -> Option<Box<dyn RecognitionSession>> {
        let mut log = self.log();
        log.created += 1;
        log.languages.push(config.language.clone());
        log.sink = Some(sink.clone());
        Some(Box::new(MockSession {
            shared: Arc::clone(&self.shared),
            sink,
        }))
    }
}

struct MockSession {
    shared: Arc<Mutex<SessionLog>>,
    sink: EventSink,
}

impl RecognitionSession for MockSession {
    fn start(&mut self) -> Result<(), SessionError> {
        let mut log = self.shared.lock().expect("Session log poisoned");
        log.starts += 1;
        match log.start_failures.pop_front() {
            Some(code) => Err(SessionError::new(code, "mock start failure")),
            None => Ok(()),
        }
    }

    fn stop(&mut self) -> Result<(), SessionError> {
        self.shared.lock().expect("Session log poisoned").stops += 1;
        self.sink.end();
        Ok(())
    }

    fn set_language(&mut self, language: &str) {
        self.shared
            .lock()
            .expect("Session log poisoned")
            .languages
            .push(language.to_string());
    }
}
