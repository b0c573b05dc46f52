//! Core runtime: worker invocation, orchestration, scheduling

pub mod invoker;
pub mod orchestrator;
pub mod scheduler;

pub use invoker::*;
pub use orchestrator::*;
pub use scheduler::*;
