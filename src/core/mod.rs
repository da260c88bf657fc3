//! Core functionality for sharegrab

pub mod job;
pub mod orchestrator;
pub mod progress;
pub mod video;

pub use job::*;
pub use orchestrator::*;
pub use progress::*;
pub use video::*;
