//! Recorder for classroom observations. An observer toggles activity categories while a lesson
//! runs; the recorder keeps the raw log of presses, live per-category totals and the closed
//! intervals used for exports and for AI generated feedback.
//!

pub mod cli;
pub mod error;
pub mod export;
pub mod feedback;
pub mod recorder;
pub mod session;
pub mod utils;
