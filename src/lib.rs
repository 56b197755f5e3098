// src/lib.rs

//! Channel Scout Library
//!
//! Finds video channels by keyword, enriches them with statistics and latest
//! upload time, filters them against configurable criteria and exports the
//! survivors in a stable order.

pub mod api;
pub mod error;
pub mod models;
pub mod pipeline;
pub mod services;
pub mod storage;
pub mod utils;
