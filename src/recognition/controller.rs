//! Recognition Controller
//!
//! Owns one logical listening session and keeps it alive: every lifecycle
//! step is mirrored into the voice state machine, and failures are retried
//! with exponential backoff instead of leaving recognition silently dead.

use super::errors::{normalize, ErrorDescriptor};
use super::{
    EventSink, RecognitionEvent, RecognitionOptions, RecognitionSession, ResultBatch,
    SessionConfig, SessionEvent, SessionFactory, SessionId,
};
use crate::error::{SessionError, TransitionError};
use crate::state::{TransitionMeta, VoiceSnapshot, VoiceState, VoiceStateMachine};
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::time::Instant;
use tracing::{debug, info, warn};

/// Delay before the first restart attempt
pub const BASE_RESTART_DELAY: Duration = Duration::from_millis(500);

/// Attempts beyond this no longer grow the delay (500ms * 2^6 = 32s)
pub const MAX_BACKOFF_EXPONENT: u32 = 6;

pub type ResultCallback = Box<dyn FnMut(&str, &ResultBatch) + Send>;
pub type ErrorCallback = Box<dyn FnMut(&ErrorDescriptor) + Send>;

/// Options for [`RecognitionController::start_listening`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StartOptions {
    /// Reset the backoff counter. Restart timers pass `false`.
    pub allow_retry: bool,
}

impl Default for StartOptions {
    fn default() -> Self {
        Self { allow_retry: true }
    }
}

impl StartOptions {
    /// Options used when a restart timer fires
    pub fn retry() -> Self {
        Self { allow_retry: false }
    }
}

/// The single outstanding restart, if any
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PendingRestart {
    /// 1-based attempt number this restart represents
    pub attempt: u32,
    pub delay: Duration,
    pub deadline: Instant,
}

/// Backoff delay for the given number of previous attempts
pub fn backoff_delay(attempts: u32) -> Duration {
    BASE_RESTART_DELAY * 2u32.pow(attempts.min(MAX_BACKOFF_EXPONENT))
}

pub struct RecognitionController {
    machine: VoiceStateMachine,
    factory: Option<Box<dyn SessionFactory>>,
    session: Option<Box<dyn RecognitionSession>>,
    session_id: SessionId,
    events: mpsc::UnboundedSender<SessionEvent>,
    options: RecognitionOptions,
    is_running: bool,
    stopped_by_user: bool,
    restart_attempts: u32,
    pending_restart: Option<PendingRestart>,
    on_result: Option<ResultCallback>,
    on_error: Option<ErrorCallback>,
}

impl RecognitionController {
    /// Create a controller.
    ///
    /// `factory` is `None` on platforms without speech recognition; starting
    /// then reports `not_supported`. Sessions publish into `events`, which the
    /// owner must drain into [`RecognitionController::dispatch`].
    pub fn new(
        machine: VoiceStateMachine,
        factory: Option<Box<dyn SessionFactory>>,
        options: RecognitionOptions,
        events: mpsc::UnboundedSender<SessionEvent>,
    ) -> Self {
        Self {
            machine,
            factory,
            session: None,
            session_id: SessionId(0),
            events,
            options,
            is_running: false,
            stopped_by_user: false,
            restart_attempts: 0,
            pending_restart: None,
            on_result: None,
            on_error: None,
        }
    }

    /// Called with the latest transcript of every result event
    pub fn on_result<F>(&mut self, callback: F)
    where
        F: FnMut(&str, &ResultBatch) + Send + 'static,
    {
        self.on_result = Some(Box::new(callback));
    }

    /// Called with every normalized recognition failure
    pub fn on_error<F>(&mut self, callback: F)
    where
        F: FnMut(&ErrorDescriptor) + Send + 'static,
    {
        self.on_error = Some(Box::new(callback));
    }

    pub fn machine(&self) -> &VoiceStateMachine {
        &self.machine
    }

    pub fn state(&self) -> VoiceState {
        self.machine.state()
    }

    pub fn snapshot(&self) -> VoiceSnapshot {
        self.machine.snapshot()
    }

    pub fn is_listening(&self) -> bool {
        self.is_running
    }

    pub fn language(&self) -> &str {
        &self.options.language
    }

    pub fn auto_restart(&self) -> bool {
        self.options.auto_restart
    }

    pub fn restart_attempts(&self) -> u32 {
        self.restart_attempts
    }

    pub fn pending_restart(&self) -> Option<&PendingRestart> {
        self.pending_restart.as_ref()
    }

    /// Id of the current session instance, if one exists
    pub fn session_id(&self) -> Option<SessionId> {
        self.session.as_ref().map(|_| self.session_id)
    }

    /// Host-requested transition, e.g. `Speaking` while narration plays
    pub fn request_state(&mut self, next: VoiceState) -> Result<VoiceState, TransitionError> {
        self.machine.transition(next, TransitionMeta::source("host"))
    }

    /// Start listening.
    ///
    /// Recognition failures are reported through the error callback and the
    /// `Error` state, never returned; the return value says whether the
    /// session is now running. Only an illegal state move is an `Err`.
    pub fn start_listening(&mut self, opts: StartOptions) -> Result<bool, TransitionError> {
        // Still set after a restartable error until the session's end event
        // arrives. Platforms always follow an error with an end.
        if self.is_running {
            return Ok(true);
        }

        if !self.ensure_session() {
            let error = ErrorDescriptor::not_supported();
            warn!("🚫 {}", error.message);
            self.machine.set_error(error.clone())?;
            self.emit_error(&error);
            return Ok(false);
        }

        self.stopped_by_user = false;
        self.cancel_restart();
        if opts.allow_retry {
            self.restart_attempts = 0;
        }

        self.machine
            .transition(VoiceState::RequestingPermission, TransitionMeta::source("start"))?;

        let started = match self.session.as_mut() {
            Some(session) => session.start(),
            None => Err(SessionError::new("start_failed", "session disappeared")),
        };

        match started {
            Ok(()) => {
                self.is_running = true;
                self.machine
                    .transition(VoiceState::Listening, TransitionMeta::source("start_success"))?;
                info!("🎙️ Listening ({})", self.options.language);
                Ok(true)
            }
            Err(e) => {
                warn!("❌ Could not start recognition: {}", e);
                self.fail(normalize(Some(e.code.as_str())))?;
                Ok(false)
            }
        }
    }

    /// Stop listening at the user's request. Suppresses auto-restart.
    pub fn stop_listening(&mut self) -> Result<(), TransitionError> {
        self.stopped_by_user = true;
        self.cancel_restart();
        self.restart_attempts = 0;

        if let Some(session) = self.session.as_mut() {
            // Stopping an already-stopped session is not an error.
            if let Err(e) = session.stop() {
                debug!("Ignoring stop failure: {}", e);
            }
        }
        // The end event still owed by the stopped run must not reach a later
        // run, so the next start builds a fresh session and that end goes stale.
        self.invalidate_session();

        if self.machine.state() != VoiceState::Idle {
            self.machine
                .transition(VoiceState::Idle, TransitionMeta::source("stop"))?;
        }
        info!("🛑 Stopped listening");
        Ok(())
    }

    pub fn set_language(&mut self, language: &str) {
        let language = language.trim();
        if language.is_empty() {
            return;
        }
        self.options.language = language.to_string();

        if self.is_running {
            if let Some(session) = self.session.as_mut() {
                session.set_language(language);
            }
        } else if self.session.is_some() {
            // Rebuilt with the new language on the next start.
            self.invalidate_session();
        }
    }

    pub fn set_auto_restart(&mut self, enabled: bool) {
        self.options.auto_restart = enabled;
        if !enabled {
            self.cancel_restart();
        }
    }

    /// Route an event from a session to its handler.
    ///
    /// Events from a session instance that has since been replaced are dropped.
    pub fn dispatch(&mut self, event: SessionEvent) -> Result<(), TransitionError> {
        if self.session_id() != Some(event.session) {
            debug!("Ignoring event from stale session {:?}", event.session);
            return Ok(());
        }

        match event.event {
            RecognitionEvent::Result(batch) => self.on_result_event(batch),
            RecognitionEvent::Error(code) => self.on_error_event(code.as_deref()),
            RecognitionEvent::End => self.on_end_event(),
        }
    }

    /// Result: `Processing`, hand over the transcript, back to `Listening`
    pub fn on_result_event(&mut self, batch: ResultBatch) -> Result<(), TransitionError> {
        self.machine
            .transition(VoiceState::Processing, TransitionMeta::source("onresult"))?;

        match batch.transcript() {
            Some(transcript) => {
                debug!("📝 Heard: '{}'", transcript);
                if let Some(callback) = self.on_result.as_mut() {
                    callback(transcript, &batch);
                }
            }
            None => debug!("Result event carried no transcript"),
        }

        self.machine
            .transition(VoiceState::Listening, TransitionMeta::source("onresult_complete"))?;
        Ok(())
    }

    pub fn on_error_event(&mut self, raw_code: Option<&str>) -> Result<(), TransitionError> {
        let error = normalize(raw_code);
        warn!("⚠️ Recognition error {} ({})", error.code, error.raw_code);
        self.fail(error)
    }

    pub fn on_end_event(&mut self) -> Result<(), TransitionError> {
        self.is_running = false;

        if self.stopped_by_user {
            self.machine
                .transition(VoiceState::Idle, TransitionMeta::source("onend_stopped"))?;
            return Ok(());
        }

        if self.machine.state() != VoiceState::Error {
            self.machine
                .transition(VoiceState::Idle, TransitionMeta::source("onend"))?;
        }

        // Policy: any session end we did not ask for is resumed, whether the
        // platform finished cleanly or died. Availability wins over telling
        // the two apart.
        self.schedule_restart();
        Ok(())
    }

    /// Consume the pending restart and try to start again.
    ///
    /// Returns whether the controller is listening afterwards.
    pub fn fire_restart(&mut self) -> Result<bool, TransitionError> {
        match self.pending_restart.take() {
            Some(pending) => {
                debug!("Restart attempt {} firing", pending.attempt);
                self.start_listening(StartOptions::retry())
            }
            None => Ok(self.is_running),
        }
    }

    fn ensure_session(&mut self) -> bool {
        if self.session.is_some() {
            return true;
        }
        let Some(factory) = self.factory.as_ref() else {
            return false;
        };

        let id = SessionId(self.session_id.0 + 1);
        let config = SessionConfig {
            language: self.options.language.clone(),
            continuous: self.options.continuous,
            interim_results: self.options.interim_results,
        };
        match factory.create(&config, EventSink::new(id, self.events.clone())) {
            Some(session) => {
                debug!("Created recognition session {:?}", id);
                self.session = Some(session);
                self.session_id = id;
                true
            }
            None => false,
        }
    }

    fn invalidate_session(&mut self) {
        if self.session.take().is_some() {
            debug!("Dropped recognition session {:?}", self.session_id);
        }
        self.is_running = false;
    }

    fn fail(&mut self, error: ErrorDescriptor) -> Result<(), TransitionError> {
        self.machine.set_error(error.clone())?;
        self.emit_error(&error);

        if error.should_restart() {
            // Fires after the trailing end event has cleared `is_running`.
            self.schedule_restart();
        } else {
            // Terminal for this session; the user has to start again.
            self.invalidate_session();
        }
        Ok(())
    }

    fn emit_error(&mut self, error: &ErrorDescriptor) {
        if let Some(callback) = self.on_error.as_mut() {
            callback(error);
        }
    }

    fn schedule_restart(&mut self) {
        if !self.options.auto_restart || self.stopped_by_user {
            return;
        }
        self.cancel_restart();

        let delay = backoff_delay(self.restart_attempts);
        self.restart_attempts = self.restart_attempts.saturating_add(1);
        info!(
            "🔁 Restarting recognition in {:?} (attempt {})",
            delay, self.restart_attempts
        );
        self.pending_restart = Some(PendingRestart {
            attempt: self.restart_attempts,
            delay,
            deadline: Instant::now() + delay,
        });
    }

    fn cancel_restart(&mut self) {
        if self.pending_restart.take().is_some() {
            debug!("Cancelled pending restart");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::recognition::ErrorCode;
    use std::collections::VecDeque;
    use std::sync::{Arc, Mutex};

    #[derive(Default)]
    struct FakeLog {
        created: Vec<SessionConfig>,
        sinks: Vec<EventSink>,
        starts: usize,
        stops: usize,
        languages: Vec<String>,
        start_failures: VecDeque<String>,
    }

    struct FakeSession {
        log: Arc<Mutex<FakeLog>>,
    }

    impl RecognitionSession for FakeSession {
        fn start(&mut self) -> Result<(), SessionError> {
            let mut log = self.log.lock().unwrap();
            log.starts += 1;
            match log.start_failures.pop_front() {
                Some(code) => Err(SessionError::new(code, "fake failure")),
                None => Ok(()),
            }
        }

        fn stop(&mut self) -> Result<(), SessionError> {
            self.log.lock().unwrap().stops += 1;
            Err(SessionError::new("InvalidStateError", "already stopped"))
        }

        fn set_language(&mut self, language: &str) {
            self.log.lock().unwrap().languages.push(language.to_string());
        }
    }

    struct FakeFactory {
        log: Arc<Mutex<FakeLog>>,
    }

    impl SessionFactory for FakeFactory {
        fn create(
            &self,
            config: &SessionConfig,
            sink: EventSink,
        ) -> Option<Box<dyn RecognitionSession>> {
            let mut log = self.log.lock().unwrap();
            log.created.push(config.clone());
            log.sinks.push(sink);
            Some(Box::new(FakeSession {
                log: Arc::clone(&self.log),
            }))
        }
    }

    struct Harness {
        controller: RecognitionController,
        log: Arc<Mutex<FakeLog>>,
        errors: Arc<Mutex<Vec<ErrorDescriptor>>>,
        events: mpsc::UnboundedReceiver<SessionEvent>,
    }

    impl Harness {
        fn new() -> Self {
            Self::with_machine(VoiceStateMachine::new())
        }

        fn with_machine(machine: VoiceStateMachine) -> Self {
            let log = Arc::new(Mutex::new(FakeLog::default()));
            let (tx, events) = mpsc::unbounded_channel();
            let mut controller = RecognitionController::new(
                machine,
                Some(Box::new(FakeFactory {
                    log: Arc::clone(&log),
                })),
                RecognitionOptions::default(),
                tx,
            );
            let errors = Arc::new(Mutex::new(Vec::new()));
            let sink = Arc::clone(&errors);
            controller.on_error(move |e| sink.lock().unwrap().push(e.clone()));
            Self {
                controller,
                log,
                errors,
                events,
            }
        }

        fn sink(&self) -> EventSink {
            self.log.lock().unwrap().sinks.last().cloned().unwrap()
        }

        /// Deliver everything the fake sessions have published
        fn pump(&mut self) {
            while let Ok(event) = self.events.try_recv() {
                self.controller.dispatch(event).unwrap();
            }
        }

        fn state(&self) -> VoiceState {
            self.controller.machine().state()
        }
    }

    #[test]
    fn test_start_enters_listening_and_is_idempotent() {
        let mut h = Harness::new();
        assert_eq!(h.controller.start_listening(StartOptions::default()), Ok(true));
        assert_eq!(h.state(), VoiceState::Listening);
        assert!(h.controller.is_listening());

        assert_eq!(h.controller.start_listening(StartOptions::default()), Ok(true));
        let log = h.log.lock().unwrap();
        assert_eq!(log.starts, 1);
        assert_eq!(log.created.len(), 1);
        assert_eq!(log.created[0].language, "en-US");
        assert!(log.created[0].continuous);
    }

    #[test]
    fn test_unsupported_platform_reports_error() {
        let (tx, _rx) = mpsc::unbounded_channel();
        let mut controller = RecognitionController::new(
            VoiceStateMachine::new(),
            None,
            RecognitionOptions::default(),
            tx,
        );
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&seen);
        controller.on_error(move |e| sink.lock().unwrap().push(e.code));

        assert_eq!(controller.start_listening(StartOptions::default()), Ok(false));
        assert_eq!(controller.machine().state(), VoiceState::Error);
        assert_eq!(*seen.lock().unwrap(), vec![ErrorCode::NotSupported]);
        assert!(controller.pending_restart().is_none());
    }

    #[test]
    fn test_recoverable_start_failure_schedules_restart() {
        let mut h = Harness::new();
        h.log
            .lock()
            .unwrap()
            .start_failures
            .push_back("network".into());

        assert_eq!(h.controller.start_listening(StartOptions::default()), Ok(false));
        assert_eq!(h.state(), VoiceState::Error);
        assert!(!h.controller.is_listening());
        let pending = *h.controller.pending_restart().unwrap();
        assert_eq!(pending.delay, Duration::from_millis(500));
        assert_eq!(pending.attempt, 1);

        assert_eq!(h.controller.fire_restart(), Ok(true));
        assert_eq!(h.state(), VoiceState::Listening);
        // A timer-driven start keeps the backoff counter.
        assert_eq!(h.controller.restart_attempts(), 1);
    }

    #[test]
    fn test_permission_denied_does_not_restart_and_drops_session() {
        let mut h = Harness::new();
        h.log
            .lock()
            .unwrap()
            .start_failures
            .push_back("not-allowed".into());

        assert_eq!(h.controller.start_listening(StartOptions::default()), Ok(false));
        assert!(h.controller.pending_restart().is_none());
        assert_eq!(h.errors.lock().unwrap()[0].code, ErrorCode::PermissionDenied);
        assert_eq!(h.controller.session_id(), None);

        // User retries: a fresh session is built.
        assert_eq!(h.controller.start_listening(StartOptions::default()), Ok(true));
        assert_eq!(h.log.lock().unwrap().created.len(), 2);
    }

    #[test]
    fn test_result_is_bracketed_by_processing() {
        let trace = Arc::new(Mutex::new(Vec::new()));
        let mut machine = VoiceStateMachine::new();
        let state_trace = Arc::clone(&trace);
        machine.on_change(move |change| {
            state_trace
                .lock()
                .unwrap()
                .push(format!("state:{}", change.state))
        });
        let mut h = Harness::with_machine(machine);
        let result_trace = Arc::clone(&trace);
        h.controller.on_result(move |transcript, _| {
            result_trace
                .lock()
                .unwrap()
                .push(format!("result:{}", transcript))
        });

        h.controller.start_listening(StartOptions::default()).unwrap();
        trace.lock().unwrap().clear();

        h.sink().result(ResultBatch::single("bubble 2", 0.9));
        h.pump();

        assert_eq!(
            *trace.lock().unwrap(),
            vec!["state:processing", "result:bubble 2", "state:listening"]
        );
    }

    #[test]
    fn test_result_while_idle_is_an_integration_error() {
        let mut h = Harness::new();
        let err = h
            .controller
            .on_result_event(ResultBatch::single("hello", 1.0))
            .unwrap_err();
        assert_eq!(
            err,
            TransitionError::Invalid {
                from: VoiceState::Idle,
                to: VoiceState::Processing
            }
        );
    }

    #[test]
    fn test_backoff_doubles_then_caps() {
        let mut h = Harness::new();
        h.controller.start_listening(StartOptions::default()).unwrap();

        let mut delays = Vec::new();
        for _ in 0..9 {
            h.sink().error(Some("network"));
            h.pump();
            let pending = h.controller.pending_restart().expect("one pending restart");
            delays.push(pending.delay.as_millis());
        }

        assert_eq!(
            delays,
            vec![500, 1000, 2000, 4000, 8000, 16000, 32000, 32000, 32000]
        );
        assert_eq!(h.controller.restart_attempts(), 9);
        assert_eq!(h.errors.lock().unwrap().len(), 9);
    }

    #[test]
    fn test_user_start_resets_attempts() {
        let mut h = Harness::new();
        h.controller.start_listening(StartOptions::default()).unwrap();
        h.sink().error(Some("no-speech"));
        h.sink().error(Some("no-speech"));
        h.pump();
        assert_eq!(h.controller.restart_attempts(), 2);

        h.controller.stop_listening().unwrap();
        assert_eq!(h.controller.restart_attempts(), 0);
        h.controller.start_listening(StartOptions::default()).unwrap();
        assert_eq!(h.controller.restart_attempts(), 0);
        assert!(h.controller.pending_restart().is_none());
    }

    #[test]
    fn test_late_events_after_stop_do_not_restart() {
        let mut h = Harness::new();
        h.controller.start_listening(StartOptions::default()).unwrap();
        let sink = h.sink();

        h.controller.stop_listening().unwrap();
        assert_eq!(h.state(), VoiceState::Idle);
        assert_eq!(h.log.lock().unwrap().stops, 1);

        sink.error(Some("aborted"));
        sink.end();
        h.pump();

        assert!(h.controller.pending_restart().is_none());
        assert_eq!(h.state(), VoiceState::Idle);
        assert!(!h.controller.is_listening());
    }

    #[test]
    fn test_stop_then_start_ignores_end_of_stopped_run() {
        let mut h = Harness::new();
        h.controller.start_listening(StartOptions::default()).unwrap();
        let first_run = h.sink();

        h.controller.stop_listening().unwrap();
        assert_eq!(h.controller.start_listening(StartOptions::default()), Ok(true));
        assert_eq!(h.log.lock().unwrap().created.len(), 2);

        // The first run's end shows up after the new run has started.
        first_run.end();
        h.pump();

        assert_eq!(h.state(), VoiceState::Listening);
        assert!(h.controller.is_listening());
        assert!(h.controller.pending_restart().is_none());

        h.sink().result(ResultBatch::single("undo", 1.0));
        h.pump();
        assert_eq!(h.state(), VoiceState::Listening);
    }

    #[test]
    fn test_restart_after_error_and_end_listens_again() {
        let mut h = Harness::new();
        h.controller.start_listening(StartOptions::default()).unwrap();
        h.sink().error(Some("no-speech"));
        h.sink().end();
        h.pump();
        assert!(!h.controller.is_listening());

        assert_eq!(h.controller.fire_restart(), Ok(true));
        assert_eq!(h.state(), VoiceState::Listening);
        assert_eq!(h.log.lock().unwrap().starts, 2);

        h.sink().result(ResultBatch::single("redo", 1.0));
        h.pump();
        assert_eq!(h.state(), VoiceState::Listening);
    }

    #[test]
    fn test_unforced_end_goes_idle_and_restarts() {
        let mut h = Harness::new();
        h.controller.start_listening(StartOptions::default()).unwrap();

        h.sink().end();
        h.pump();
        assert_eq!(h.state(), VoiceState::Idle);
        assert!(!h.controller.is_listening());
        assert_eq!(
            h.controller.pending_restart().map(|p| p.delay),
            Some(Duration::from_millis(500))
        );

        assert_eq!(h.controller.fire_restart(), Ok(true));
        assert_eq!(h.log.lock().unwrap().starts, 2);
        // Same session instance is reused.
        assert_eq!(h.log.lock().unwrap().created.len(), 1);
    }

    #[test]
    fn test_end_after_error_keeps_error_state() {
        let mut h = Harness::new();
        h.controller.start_listening(StartOptions::default()).unwrap();
        h.sink().error(Some("network"));
        h.sink().end();
        h.pump();

        assert_eq!(h.state(), VoiceState::Error);
        let pending = h.controller.pending_restart().unwrap();
        assert_eq!(pending.attempt, 2);
        assert_eq!(pending.delay, Duration::from_millis(1000));
    }

    #[test]
    fn test_disabling_auto_restart_cancels_pending() {
        let mut h = Harness::new();
        h.controller.start_listening(StartOptions::default()).unwrap();
        h.sink().error(Some("no-speech"));
        h.pump();
        assert!(h.controller.pending_restart().is_some());

        h.controller.set_auto_restart(false);
        assert!(h.controller.pending_restart().is_none());

        h.sink().end();
        h.pump();
        assert!(h.controller.pending_restart().is_none());
    }

    #[test]
    fn test_fatal_error_ignores_stale_end() {
        let mut h = Harness::new();
        h.controller.start_listening(StartOptions::default()).unwrap();
        h.sink().error(Some("service-not-allowed"));
        h.sink().end();
        h.pump();

        assert_eq!(h.state(), VoiceState::Error);
        assert!(h.controller.pending_restart().is_none());
        assert!(!h.controller.is_listening());
    }

    #[test]
    fn test_language_change() {
        let mut h = Harness::new();
        h.controller.start_listening(StartOptions::default()).unwrap();
        h.controller.set_language("fr-FR");
        assert_eq!(h.log.lock().unwrap().languages, vec!["fr-FR"]);

        h.controller.stop_listening().unwrap();
        h.controller.set_language("de-DE");
        h.controller.set_language("   ");
        assert_eq!(h.controller.language(), "de-DE");
        assert_eq!(h.controller.session_id(), None);

        h.controller.start_listening(StartOptions::default()).unwrap();
        let log = h.log.lock().unwrap();
        assert_eq!(log.created.len(), 2);
        assert_eq!(log.created[1].language, "de-DE");
    }

    #[test]
    fn test_host_can_request_speaking() {
        let mut h = Harness::new();
        h.controller.start_listening(StartOptions::default()).unwrap();
        assert_eq!(
            h.controller.request_state(VoiceState::Speaking),
            Ok(VoiceState::Speaking)
        );
        assert!(h.controller.request_state(VoiceState::Processing).is_err());
    }

    #[test]
    fn test_backoff_delay_table() {
        assert_eq!(backoff_delay(0), Duration::from_millis(500));
        assert_eq!(backoff_delay(3), Duration::from_millis(4000));
        assert_eq!(backoff_delay(6), Duration::from_secs(32));
        assert_eq!(backoff_delay(60), Duration::from_secs(32));
    }
}
