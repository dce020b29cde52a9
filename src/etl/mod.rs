//! Core ETL (Extract, Transform, Load) abstractions
//!
//! This module provides the trait definitions every pipeline stage
//! implements, the observer that receives stage events, and the
//! orchestrator that sequences the stages.

mod extract;
mod load;
mod observer;
mod pipeline;
mod transform;

pub use extract::{Extraction, Extractor, SkippedFile};
pub use load::Loader;
pub use observer::{EtlEvent, EtlObserver, LogObserver, RecordingObserver};
pub use pipeline::{Pipeline, PipelineReport, PipelineState, outcome_message};
pub use transform::Transformer;
