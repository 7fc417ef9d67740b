//! turnscreen: weekly screen for high-growth turnaround US stocks.
//!
//! Hexagonal architecture: filtering logic in [`domain`], port traits in
//! [`ports`], screener/data/export implementations in [`adapters`].

pub mod domain;
pub mod ports;
pub mod adapters;
pub mod cli;
pub mod logging;
