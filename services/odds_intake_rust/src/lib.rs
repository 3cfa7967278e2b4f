//! Odds Intake Service Library
//!
//! Exposes the upload/command handlers and the expiry sweeper for testing.

pub mod config;
pub mod intake;
pub mod sweeper;

pub use config::IntakeConfig;
pub use intake::{CommandOutcome, Intake, QueueCommand, UploadPayload};
pub use sweeper::{run_expiry_sweeper, sweep_once};
