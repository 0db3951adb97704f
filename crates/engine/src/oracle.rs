//! Content classifier oracle interface.
//!
//! The stripper never inspects block interiors itself; it asks an oracle
//! whether a span of source text is metadata-only. The oracle receives the
//! block interior with the block's own directive markers removed but any
//! nested directive lines left in place, and must answer as a pure,
//! synchronous, side-effect-free query. A `false` answer is a designed
//! abstention, never an error.

use crate::annotations::is_availability_annotation;
use crate::line::{classify, split_with_terminators};

/// Answers whether a span of source text consists solely of availability
/// metadata annotations.
pub trait MetadataOracle {
    fn is_metadata_only(&self, text: &str) -> bool;
}

/// Line-shape oracle: accepts a span when every significant line applies a
/// known availability attribute.
///
/// Blank lines, comment lines and nested directive lines are treated as
/// inert separators. This is a purely lexical approximation; a
/// grammar-aware classifier should be preferred when one is available for
/// the host language.
#[derive(Debug, Clone, Copy, Default)]
pub struct LineOracle;

impl MetadataOracle for LineOracle {
    fn is_metadata_only(&self, text: &str) -> bool {
        split_with_terminators(text).into_iter().all(|raw| {
            let trimmed = raw.trim();
            trimmed.is_empty()
                || trimmed.starts_with("//")
                || classify(raw).kind.is_directive()
                || is_availability_annotation(trimmed)
        })
    }
}
