//! # Availstrip Engine
//!
//! Conditional-block analysis and text-preserving rewriting for source
//! files that gate platform-availability metadata behind nested
//! conditional-compilation directives (`#if`/`#elif`/`#else`/`#endif`).
//!
//! ## Architecture
//!
//! ```text
//! Whole-file text
//!     │
//!     ├──> Line Classifier (directive kind, condition span, raw bytes kept)
//!     │
//!     ├──> Conditional-Stack Tracker
//!     │    ├─> stack of active conditions, innermost last
//!     │    ├─> chunk crediting via the annotation predicate
//!     │    └─> define-usage analysis + eligibility verdict
//!     │
//!     └──> Chunk Rewriter / Stripper
//!          ├─> buffer candidate blocks (#if TARGET / #if !TARGET)
//!          ├─> consult the metadata oracle per closed block
//!          └─> delete / invert / flag for review / abstain verbatim
//! ```
//!
//! All state is scoped to one file's traversal; files can be processed in
//! parallel with one engine instance each. The oracle that decides
//! whether a block interior is metadata-only is an external collaborator
//! behind [`MetadataOracle`]; a negative verdict leaves the block
//! byte-for-byte untouched.
//!
//! ## Example
//!
//! ```rust
//! use availstrip_engine::{LineOracle, StripMode, Stripper};
//!
//! let text = "#if NET\n[SupportedOSPlatform (\"ios13.0\")]\n#endif\nclass C { }\n";
//! let oracle = LineOracle;
//! let mut stripper = Stripper::new("NET", StripMode::Strip, &oracle);
//! assert_eq!(stripper.strip(text).unwrap(), "class C { }\n");
//! ```

pub mod annotations;
mod condition;
mod error;
mod line;
mod oracle;
mod stripper;
mod tracker;

pub use condition::{split_conditional_parts, Condition};
pub use error::{EngineError, Result};
pub use line::{classify, split_with_terminators, DirectiveKind, SourceLine};
pub use oracle::{LineOracle, MetadataOracle};
pub use stripper::{StripMode, Stripper, REVIEW_MARKER};
pub use tracker::{
    credited_conditions, find_unique_defines_that_cover_all, parse_all_defines,
    ConditionalTracker, Eligibility,
};
