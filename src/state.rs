//! Voice State Machine
//!
//! Single source of truth for what the voice pipeline is doing. The current
//! state only changes through [`VoiceStateMachine::transition`], which checks
//! every move against a fixed transition table.

use crate::error::TransitionError;
use crate::recognition::errors::ErrorDescriptor;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use tracing::debug;

/// Mode of the voice pipeline
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VoiceState {
    Idle,
    RequestingPermission,
    Listening,
    Processing,
    Speaking,
    Paused,
    Error,
}

impl VoiceState {
    pub const ALL: [VoiceState; 7] = [
        VoiceState::Idle,
        VoiceState::RequestingPermission,
        VoiceState::Listening,
        VoiceState::Processing,
        VoiceState::Speaking,
        VoiceState::Paused,
        VoiceState::Error,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            VoiceState::Idle => "idle",
            VoiceState::RequestingPermission => "requesting_permission",
            VoiceState::Listening => "listening",
            VoiceState::Processing => "processing",
            VoiceState::Speaking => "speaking",
            VoiceState::Paused => "paused",
            VoiceState::Error => "error",
        }
    }

    /// States reachable from `self` in one step, excluding `self`.
    ///
    /// This match is the transition table. It is total by construction.
    pub fn allowed_targets(self) -> &'static [VoiceState] {
        use VoiceState::*;
        match self {
            Idle => &[RequestingPermission, Listening, Error],
            RequestingPermission => &[Listening, Error, Idle],
            Listening => &[Processing, Error, Idle, Paused, Speaking],
            Processing => &[Listening, Speaking, Error, Idle],
            Speaking => &[Listening, Paused, Error, Idle],
            Paused => &[Listening, Speaking, Error, Idle],
            Error => &[Idle, RequestingPermission, Listening],
        }
    }

    /// Self-transitions are always legal.
    pub fn can_move_to(self, next: VoiceState) -> bool {
        self == next || self.allowed_targets().contains(&next)
    }
}

impl fmt::Display for VoiceState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for VoiceState {
    type Err = TransitionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        VoiceState::ALL
            .into_iter()
            .find(|state| state.as_str() == s)
            .ok_or_else(|| TransitionError::UnknownState(s.to_string()))
    }
}

/// Extra context attached to a transition
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct TransitionMeta {
    /// Where the transition was requested from (e.g. "start", "onresult")
    pub source: Option<String>,
    /// Error to record as the machine's last error
    pub error: Option<ErrorDescriptor>,
}

impl TransitionMeta {
    pub fn source(source: impl Into<String>) -> Self {
        Self {
            source: Some(source.into()),
            error: None,
        }
    }

    pub fn with_error(mut self, error: ErrorDescriptor) -> Self {
        self.error = Some(error);
        self
    }
}

/// Notification sent to the observer after each successful transition
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StateChange {
    pub previous: VoiceState,
    pub state: VoiceState,
    pub last_error: Option<ErrorDescriptor>,
    pub meta: TransitionMeta,
}

/// Read-only view of the machine
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct VoiceSnapshot {
    pub state: VoiceState,
    pub last_error: Option<ErrorDescriptor>,
}

pub type StateObserver = Box<dyn FnMut(&StateChange) + Send>;

/// Guarded state machine for the voice pipeline
pub struct VoiceStateMachine {
    current: VoiceState,
    last_error: Option<ErrorDescriptor>,
    observer: Option<StateObserver>,
}

impl Default for VoiceStateMachine {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for VoiceStateMachine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("VoiceStateMachine")
            .field("current", &self.current)
            .field("last_error", &self.last_error)
            .field("observer", &self.observer.is_some())
            .finish()
    }
}

impl VoiceStateMachine {
    /// Create a machine in the `Idle` state
    pub fn new() -> Self {
        Self {
            current: VoiceState::Idle,
            last_error: None,
            observer: None,
        }
    }

    /// Register the callback notified after every successful transition
    pub fn on_change<F>(&mut self, observer: F)
    where
        F: FnMut(&StateChange) + Send + 'static,
    {
        self.observer = Some(Box::new(observer));
    }

    pub fn state(&self) -> VoiceState {
        self.current
    }

    pub fn last_error(&self) -> Option<&ErrorDescriptor> {
        self.last_error.as_ref()
    }

    pub fn snapshot(&self) -> VoiceSnapshot {
        VoiceSnapshot {
            state: self.current,
            last_error: self.last_error.clone(),
        }
    }

    pub fn can_transition(&self, next: VoiceState) -> bool {
        self.current.can_move_to(next)
    }

    /// Move to `next`, failing without side effects if the table forbids it
    pub fn transition(
        &mut self,
        next: VoiceState,
        meta: TransitionMeta,
    ) -> Result<VoiceState, TransitionError> {
        if !self.can_transition(next) {
            return Err(TransitionError::Invalid {
                from: self.current,
                to: next,
            });
        }

        let previous = self.current;
        self.current = next;
        if next != VoiceState::Error {
            self.last_error = None;
        }
        if let Some(error) = &meta.error {
            self.last_error = Some(error.clone());
        }

        debug!(
            "Voice state: {} -> {} ({})",
            previous,
            next,
            meta.source.as_deref().unwrap_or("-")
        );

        if let Some(observer) = self.observer.as_mut() {
            observer(&StateChange {
                previous,
                state: next,
                last_error: self.last_error.clone(),
                meta,
            });
        }

        Ok(self.current)
    }

    /// Transition using a state name, as received from a host boundary
    pub fn transition_named(
        &mut self,
        next: &str,
        meta: TransitionMeta,
    ) -> Result<VoiceState, TransitionError> {
        let next = next.parse::<VoiceState>()?;
        self.transition(next, meta)
    }

    /// Enter `Error`, recording `error` as the last error
    pub fn set_error(&mut self, error: ErrorDescriptor) -> Result<VoiceState, TransitionError> {
        self.transition(VoiceState::Error, TransitionMeta::default().with_error(error))
    }
}
