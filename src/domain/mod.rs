//! Core domain types and logic.

pub mod financials;
pub mod thresholds;
pub mod candidate;
pub mod screen;
pub mod universe;
pub mod config_validation;
pub mod error;
