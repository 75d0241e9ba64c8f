//! Utility components: debouncing and logging

pub mod debouncer;
pub mod logging;
