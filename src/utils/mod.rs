//! Utility functions for sharegrab

pub mod filename;
pub mod media;

pub use filename::*;
pub use media::*;
