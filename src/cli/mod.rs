//! Command line interface for sharegrab

pub mod args;
pub mod output;

pub use args::{Args, VerbosityLevel};
pub use output::{create_progress_callback, OutputFormatter};
