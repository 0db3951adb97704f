//! # Availstrip Classifier
//!
//! Grammar-aware implementation of the engine's metadata oracle for C#
//! sources, built on tree-sitter. Given a conditional block's interior,
//! it decides whether the span consists solely of availability attribute
//! applications, the question the stripper must have answered before it
//! may delete or invert a block.
//!
//! The classifier is deliberately conservative: any span the grammar
//! cannot fully account for is reported as not metadata-only, which the
//! engine treats as an abstention rather than an error.

mod classifier;
mod error;

pub use classifier::DeclClassifier;
pub use error::{ClassifierError, Result};
