//! Extraction orchestrator.

pub mod engine;

pub use engine::ExtractionEngine;

pub use crate::report::ExtractionResult;
