//! Data models for the application
//!
//! Records produced by the upload pipeline and the read-side views built
//! from them (pages, statistics, health).

mod health;
mod stats;
mod upload;

pub use health::*;
pub use stats::*;
pub use upload::*;
