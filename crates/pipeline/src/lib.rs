//! # Availstrip Pipeline
//!
//! Whole-file boundary around the engine: read a file, decide whether its
//! directive set can be reduced deterministically, run the oracle-gated
//! stripper, and write the result back only when something changed. Line
//! terminators of unmodified regions are preserved byte-for-byte.
//!
//! Files are independent; callers that want parallelism give each worker
//! its own [`FileProcessor`].

mod error;
mod processor;

pub use error::{PipelineError, Result};
pub use processor::{
    render_report, FileOutcome, FileProcessor, OutcomeStatus, PipelineConfig, Rewrite, SkipReason,
};
