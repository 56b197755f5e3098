//! Utility functions and helpers.

pub mod http;
pub mod progress;
pub mod time;
