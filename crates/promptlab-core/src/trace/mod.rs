//! Experiment trace logging: entries and append-only recorders

pub mod entry;
pub mod recorder;

pub use entry::{EvaluatorTag, TraceEntry};
pub use recorder::{FailingTraceRecorder, JsonlTraceRecorder, MemoryTraceRecorder, TraceRecorder};
