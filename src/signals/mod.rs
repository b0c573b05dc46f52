//! Ensemble scoring: normalization, aggregation, regime filter, resolution.

pub mod aggregation;
pub mod decision;
pub mod engine;
pub mod normalizer;
pub mod regime;

pub use aggregation::*;
pub use decision::*;
pub use engine::EnsembleEngine;
pub use normalizer::*;
pub use regime::*;
