#![forbid(unsafe_code)]

//! Core domain model and rep-counting logic for reptrack.
//!
//! This crate provides:
//! - Domain types (landmarks, frames, exercises, screens)
//! - Calibration check and per-exercise rep classifier
//! - Screen sequencer with countdown and feedback timers
//! - Pose sources and a session runner for replaying landmark streams
//! - Synthetic landmark frames

pub mod types;
pub mod error;
pub mod catalog;
pub mod config;
pub mod logging;
pub mod calibration;
pub mod classifier;
pub mod countdown;
pub mod feedback;
pub mod trainer;
pub mod pose;
pub mod runner;
pub mod synthetic;

// Re-export commonly used types
pub use error::{Error, Result};
pub use types::*;
pub use config::{Config, TrackingOptions};
pub use classifier::{classify, Classification, RepState};
pub use countdown::CountdownDisplay;
pub use trainer::{Trainer, TrainerEvent};
pub use pose::{JsonlFrameSource, PoseSource, ScriptedSource};
pub use runner::{RunReport, SessionRunner};
