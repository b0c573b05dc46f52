//! Multi-model consensus engine for swing and intraday trading signals.
//!
//! Strategy models run as isolated workers; their results are normalized,
//! combined into a persistence-weighted super score per horizon, filtered by
//! trend regime and resolved into one decision per instrument.

pub mod config;
pub mod core;
pub mod error;
pub mod logging;
pub mod metrics;
pub mod models;
pub mod services;
pub mod signals;
