//! Voice Pipeline
//!
//! Event loop tying the pieces together: session events go to the
//! recognition controller, admitted transcripts go to the router, and the
//! single pending restart is awaited as a deadline. Everything runs on one
//! task, so the controller and its state machine need no locking.

use crate::config::VoiceSettings;
use crate::core::gate::TranscriptGate;
use crate::error::TransitionError;
use crate::recognition::{
    RecognitionController, RecognitionOptions, SessionEvent, SessionFactory, StartOptions,
};
use crate::router::{VoiceHandlers, VoiceRouter};
use crate::state::{StateChange, VoiceState, VoiceStateMachine};
use tokio::sync::mpsc;
use tokio::time::Instant;
use tracing::{debug, error, info, warn};

/// Requests from the host to the running pipeline
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ControlMessage {
    Start,
    Stop,
    SetLanguage(String),
    SetAutoRestart(bool),
    /// Host-driven state such as `Speaking` during narration
    Transition(VoiceState),
    Shutdown,
}

/// Cloneable handle for controlling a running pipeline
#[derive(Debug, Clone)]
pub struct PipelineHandle {
    tx: mpsc::UnboundedSender<ControlMessage>,
}

impl PipelineHandle {
    /// Returns false once the pipeline has shut down
    pub fn send(&self, message: ControlMessage) -> bool {
        self.tx.send(message).is_ok()
    }

    pub fn start(&self) -> bool {
        self.send(ControlMessage::Start)
    }

    pub fn stop(&self) -> bool {
        self.send(ControlMessage::Stop)
    }

    pub fn set_language(&self, language: impl Into<String>) -> bool {
        self.send(ControlMessage::SetLanguage(language.into()))
    }

    pub fn set_auto_restart(&self, enabled: bool) -> bool {
        self.send(ControlMessage::SetAutoRestart(enabled))
    }

    pub fn request_state(&self, state: VoiceState) -> bool {
        self.send(ControlMessage::Transition(state))
    }

    pub fn shutdown(&self) -> bool {
        self.send(ControlMessage::Shutdown)
    }
}

pub struct VoicePipeline {
    controller: RecognitionController,
    events: mpsc::UnboundedReceiver<SessionEvent>,
    control: mpsc::UnboundedReceiver<ControlMessage>,
    auto_start: bool,
}

impl VoicePipeline {
    /// Wire a controller, gate and router from `settings`.
    ///
    /// Listening starts as soon as [`VoicePipeline::run`] is polled unless
    /// push-to-talk is enabled, in which case the host sends `Start`.
    pub fn new<H>(
        factory: Option<Box<dyn SessionFactory>>,
        settings: &VoiceSettings,
        router: VoiceRouter<H>,
    ) -> (Self, PipelineHandle)
    where
        H: VoiceHandlers + Send + 'static,
    {
        let (event_tx, events) = mpsc::unbounded_channel();
        let (control_tx, control) = mpsc::unbounded_channel();

        let mut machine = VoiceStateMachine::new();
        machine.on_change(log_state_change);

        let mut controller = RecognitionController::new(
            machine,
            factory,
            RecognitionOptions::from(settings),
            event_tx,
        );

        let gate = TranscriptGate::from_settings(settings);
        let mut router = router;
        controller.on_result(move |_, batch| {
            if let Some(transcript) = gate.admit(batch) {
                let outcome = router.route(&transcript);
                debug!("Routed '{}': {:?}", transcript, outcome);
            }
        });
        controller.on_error(|error| {
            if error.should_restart() {
                info!("{}", error.message);
            } else {
                warn!("❌ {}", error.message);
            }
        });

        let pipeline = Self {
            controller,
            events,
            control,
            auto_start: !settings.push_to_talk_enabled,
        };
        (pipeline, PipelineHandle { tx: control_tx })
    }

    pub fn controller(&self) -> &RecognitionController {
        &self.controller
    }

    /// Run until `Shutdown` or until every handle is dropped.
    ///
    /// Returns the controller so the caller can inspect the final state.
    pub async fn run(mut self) -> RecognitionController {
        if self.auto_start {
            self.apply(ControlMessage::Start);
        }

        loop {
            let restart_at = self.controller.pending_restart().map(|p| p.deadline);

            tokio::select! {
                message = self.control.recv() => match message {
                    Some(ControlMessage::Shutdown) | None => break,
                    Some(message) => self.apply(message),
                },
                Some(event) = self.events.recv() => {
                    let outcome = self.controller.dispatch(event);
                    report(outcome);
                }
                _ = restart_timer(restart_at) => {
                    let outcome = self.controller.fire_restart().map(|_| ());
                    report(outcome);
                }
            }
        }

        if self.controller.is_listening() {
            report(self.controller.stop_listening());
        }
        info!("Voice pipeline stopped");
        self.controller
    }

    fn apply(&mut self, message: ControlMessage) {
        debug!("Control: {:?}", message);
        let outcome = match message {
            ControlMessage::Start => self
                .controller
                .start_listening(StartOptions::default())
                .map(|_| ()),
            ControlMessage::Stop => self.controller.stop_listening(),
            ControlMessage::SetLanguage(language) => {
                self.controller.set_language(&language);
                Ok(())
            }
            ControlMessage::SetAutoRestart(enabled) => {
                self.controller.set_auto_restart(enabled);
                Ok(())
            }
            ControlMessage::Transition(state) => {
                self.controller.request_state(state).map(|_| ())
            }
            ControlMessage::Shutdown => Ok(()),
        };
        report(outcome);
    }
}

fn log_state_change(change: &StateChange) {
    let source = change.meta.source.as_deref().unwrap_or("-");
    match (&change.last_error, change.state) {
        (Some(error), VoiceState::Error) => {
            warn!("🔴 {} -> error: {} ({})", change.previous, error.code, source)
        }
        _ => info!("🔵 {} -> {} ({})", change.previous, change.state, source),
    }
}

/// Illegal transitions are integration bugs: logged loudly, loop keeps going
fn report(outcome: Result<(), TransitionError>) {
    if let Err(e) = outcome {
        error!("🐛 Voice state integration error: {}", e);
    }
}

async fn restart_timer(deadline: Option<Instant>) {
    match deadline {
        Some(deadline) => tokio::time::sleep_until(deadline).await,
        None => std::future::pending().await,
    }
}
