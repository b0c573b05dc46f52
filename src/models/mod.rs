//! Shared data models spanning the engine layers.

pub mod cycle;
pub mod ensemble;
pub mod instrument;
pub mod result;
pub mod signal;

pub use cycle::{CycleOutcome, CycleReport, SkippedInstrument};
pub use ensemble::{EnsembleResult, HorizonDecision, InstrumentAnalysis, ModelBreakdown};
pub use instrument::Instrument;
pub use result::{
    FailureKind, ModelOutcome, ModelReport, ModelResult, SuccessPayload, WorkerFailure,
    WorkerPayload, MAX_FAILURE_REASON,
};
pub use signal::{Horizon, SignalKind, SignalRecord, SignalSnapshot};
