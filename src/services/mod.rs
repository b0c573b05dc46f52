//! Boundaries to external collaborators.

pub mod reporting;
pub mod universe;
pub mod worker;

pub use reporting::{JsonReportSink, LogReportSink, ReportSink};
pub use universe::{
    FallbackUniverse, HttpUniverseSource, SnapshotUniverseSource, StaticUniverseSource,
    UniverseSource,
};
pub use worker::{parse_worker_output, StrategyWorker, SubprocessWorker};
