//! SpeechFlow Library
//!
//! Voice command pipeline for a mind-map canvas: recognition lifecycle,
//! transcript classification and command routing.

pub mod commands;
pub mod config;
pub mod console;
pub mod core;
pub mod error;
pub mod pipeline;
pub mod recognition;
pub mod router;
pub mod state;
