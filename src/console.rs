//! Console recognition session
//!
//! A recognition backend for terminals and scripts: every input line is a
//! final transcript. Lines of the form `!error <code>` and `!end` inject
//! platform errors and session ends, which is handy for exercising recovery.
//! Like a platform session, an error is always followed by an end.

use crate::error::{SessionError, VoiceResult};
use crate::recognition::{
    EventSink, RecognitionSession, ResultBatch, SessionConfig, SessionFactory,
};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use tokio::io::{AsyncBufRead, AsyncBufReadExt};
use tracing::debug;

#[derive(Default)]
struct Shared {
    active: AtomicBool,
    sink: Mutex<Option<EventSink>>,
}

impl Shared {
    fn sink(&self) -> Option<EventSink> {
        self.sink.lock().ok().and_then(|slot| slot.clone())
    }
}

/// Builds console sessions; clones share the same input
#[derive(Clone, Default)]
pub struct ConsoleSessionFactory {
    shared: Arc<Shared>,
}

impl ConsoleSessionFactory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether a session is currently capturing
    pub fn is_active(&self) -> bool {
        self.shared.active.load(Ordering::SeqCst)
    }

    /// Feed `reader` line by line into the current session until EOF.
    ///
    /// Lines arriving while no session is listening are dropped. Returns the
    /// number of transcripts delivered.
    pub async fn pump<R>(&self, reader: R) -> VoiceResult<usize>
    where
        R: AsyncBufRead + Unpin,
    {
        let mut lines = reader.lines();
        let mut delivered = 0;

        while let Some(line) = lines.next_line().await? {
            if !self.is_active() {
                debug!("Not listening, dropped '{}'", line);
                continue;
            }
            let Some(sink) = self.shared.sink() else {
                continue;
            };

            let line = line.trim();
            if let Some(code) = line.strip_prefix("!error") {
                let code = code.trim();
                sink.error((!code.is_empty()).then_some(code));
                self.shared.active.store(false, Ordering::SeqCst);
                sink.end();
            } else if line == "!end" {
                self.shared.active.store(false, Ordering::SeqCst);
                sink.end();
            } else {
                sink.result(ResultBatch::single(line, 1.0));
                delivered += 1;
            }
        }

        // Input closed: the session ends as a platform session would.
        if self.shared.active.swap(false, Ordering::SeqCst) {
            if let Some(sink) = self.shared.sink() {
                sink.end();
            }
        }
        Ok(delivered)
    }
}

impl SessionFactory for ConsoleSessionFactory {
    fn create(
        &self,
        config: &SessionConfig,
        sink: EventSink,
    ) -> Option<Box<dyn RecognitionSession>> {
        debug!("Console session {:?} ({})", sink.session(), config.language);
        if let Ok(mut slot) = self.shared.sink.lock() {
            *slot = Some(sink);
        }
        Some(Box::new(ConsoleSession {
            shared: Arc::clone(&self.shared),
        }))
    }
}

struct ConsoleSession {
    shared: Arc<Shared>,
}

impl RecognitionSession for ConsoleSession {
    fn start(&mut self) -> Result<(), SessionError> {
        if self.shared.active.swap(true, Ordering::SeqCst) {
            return Err(SessionError::new(
                "InvalidStateError",
                "console session already started",
            ));
        }
        Ok(())
    }

    fn stop(&mut self) -> Result<(), SessionError> {
        if !self.shared.active.swap(false, Ordering::SeqCst) {
            return Err(SessionError::new(
                "InvalidStateError",
                "console session not started",
            ));
        }
        if let Some(sink) = self.shared.sink() {
            sink.end();
        }
        Ok(())
    }

    fn set_language(&mut self, language: &str) {
        debug!("Console session language: {}", language);
    }
}
