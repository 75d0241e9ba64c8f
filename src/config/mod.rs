//! Configuration module
//!
//! Settings file handling: display defaults, debounce windows and the
//! per-mode table sizes.

#[allow(clippy::module_inception)]
pub mod config;

pub use config::Config;
