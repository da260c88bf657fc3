//! Browser control for sharegrab

pub mod config;
pub mod session;
pub mod webdriver;

#[cfg(test)]
pub(crate) mod mock;

pub use config::*;
pub use session::*;
pub use webdriver::*;
