//! Download agents for sharegrab

pub mod agent;
pub mod hls;
pub mod http;

pub use agent::*;
pub use hls::*;
pub use http::*;
