//! Chunk rewriter: strips conditional blocks that only guard availability
//! metadata.
//!
//! Only two directive shapes are candidates for one target define, say
//! `NET`: an `#if NET` block is buffered until its `#else`/`#endif` and
//! deleted or inverted when the oracle confirms the interior is
//! metadata-only, while an `#if !NET` block passes through but arms the
//! stripper so the `#else` branch becomes the candidate. Every other
//! directive passes through verbatim together with its content. Nested
//! directives inside a buffered span ride along as plain text and are only
//! seen by the oracle; they are never re-evaluated independently.
//!
//! A negative oracle verdict is a designed abstention: the whole block is
//! emitted byte-for-byte as it was read.

use crate::condition::Condition;
use crate::error::{EngineError, Result};
use crate::line::{classify, split_with_terminators, DirectiveKind, SourceLine};
use crate::oracle::MetadataOracle;
use std::mem;

/// Sentinel inserted before a block whose nesting makes automatic
/// stripping unsafe, in [`StripMode::FlagForReview`].
pub const REVIEW_MARKER: &str = "// availstrip: nested conditional block, review before stripping";

/// Disposition policy for blocks the oracle clears for transformation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum StripMode {
    /// Delete or invert eligible blocks
    #[default]
    Strip,
    /// Strip flat blocks, but flag blocks containing nested directives
    /// with a review marker instead of transforming them
    FlagForReview,
}

/// Rewrite state. Replaces the historical `enabled`/`enable_on_else` flag
/// pair; invalid flag combinations cannot be represented.
#[derive(Debug)]
enum StripState {
    /// Passing lines through verbatim
    Idle,
    /// Inside `#if TARGET`, buffering until the block resolves
    BufferingPrimary {
        opening: Opening,
        buffer: Vec<String>,
        depth: usize,
    },
    /// Inside `#if !TARGET`, emitted verbatim; the next depth-0 `#else`
    /// starts buffering the candidate branch
    ArmedForElse { depth: usize },
    /// Buffering the branch after a depth-0 `#else`
    BufferingAlternate {
        buffer: Vec<String>,
        depth: usize,
        /// The branch survives unconditionally (its primary half was
        /// already stripped by inversion)
        keep: bool,
    },
}

#[derive(Debug)]
struct Opening {
    raw: String,
    inverted: String,
}

/// Strips redundant conditional blocks around availability metadata.
///
/// State is scoped to one traversal and is not reset automatically
/// between runs; call [`Stripper::reset`] (or build a fresh instance)
/// before reusing one after a failed run.
pub struct Stripper<'o> {
    target: String,
    mode: StripMode,
    oracle: &'o dyn MetadataOracle,
    state: StripState,
    output: String,
    /// Whether the last emitted line was the review marker; keeps repeated
    /// passes from stacking markers without rescanning the output
    last_line_flagged: bool,
}

impl<'o> Stripper<'o> {
    pub fn new(target: impl Into<String>, mode: StripMode, oracle: &'o dyn MetadataOracle) -> Self {
        Self {
            target: target.into(),
            mode,
            oracle,
            state: StripState::Idle,
            output: String::new(),
            last_line_flagged: false,
        }
    }

    /// Rewrite whole-file text. Unmodified regions are reproduced
    /// byte-for-byte, including line terminators.
    pub fn strip(&mut self, text: &str) -> Result<String> {
        for raw in split_with_terminators(text) {
            self.step(raw);
        }
        self.finish()
    }

    /// Clear traversal state for reuse
    pub fn reset(&mut self) {
        self.state = StripState::Idle;
        self.output.clear();
        self.last_line_flagged = false;
    }

    fn step(&mut self, raw: &str) {
        let line = classify(raw);
        let state = mem::replace(&mut self.state, StripState::Idle);
        self.state = match state {
            StripState::Idle => self.step_idle(&line),
            StripState::BufferingPrimary {
                opening,
                buffer,
                depth,
            } => self.step_primary(&line, opening, buffer, depth),
            StripState::ArmedForElse { depth } => self.step_armed(&line, depth),
            StripState::BufferingAlternate {
                buffer,
                depth,
                keep,
            } => self.step_alternate(&line, buffer, depth, keep),
        };
    }

    fn finish(&mut self) -> Result<String> {
        match &self.state {
            StripState::Idle => Ok(mem::take(&mut self.output)),
            StripState::BufferingPrimary { depth, .. }
            | StripState::ArmedForElse { depth }
            | StripState::BufferingAlternate { depth, .. } => {
                Err(EngineError::unterminated(depth + 1))
            }
        }
    }

    fn step_idle(&mut self, line: &SourceLine<'_>) -> StripState {
        if line.kind == DirectiveKind::If {
            let condition = Condition::parse(line.condition().unwrap_or_default());
            if !condition.is_compound() && condition.names_define(&self.target) {
                if condition.is_negated() {
                    self.emit(line.raw);
                    return StripState::ArmedForElse { depth: 0 };
                }
                return StripState::BufferingPrimary {
                    opening: Opening {
                        raw: line.raw.to_string(),
                        inverted: line.with_condition(&condition.inverted().to_string()),
                    },
                    buffer: Vec::new(),
                    depth: 0,
                };
            }
        }
        self.emit(line.raw);
        StripState::Idle
    }

    fn step_primary(
        &mut self,
        line: &SourceLine<'_>,
        opening: Opening,
        mut buffer: Vec<String>,
        depth: usize,
    ) -> StripState {
        match line.kind {
            DirectiveKind::If => {
                buffer.push(line.raw.to_string());
                StripState::BufferingPrimary {
                    opening,
                    buffer,
                    depth: depth + 1,
                }
            }
            DirectiveKind::Endif if depth > 0 => {
                buffer.push(line.raw.to_string());
                StripState::BufferingPrimary {
                    opening,
                    buffer,
                    depth: depth - 1,
                }
            }
            (DirectiveKind::Else | DirectiveKind::Elif) if depth > 0 => {
                buffer.push(line.raw.to_string());
                StripState::BufferingPrimary {
                    opening,
                    buffer,
                    depth,
                }
            }
            DirectiveKind::Plain => {
                buffer.push(line.raw.to_string());
                StripState::BufferingPrimary {
                    opening,
                    buffer,
                    depth,
                }
            }
            DirectiveKind::Elif => {
                // the shape is no longer a plain if/else pair; hands off
                self.emit_block(&opening.raw, &buffer, line.raw);
                StripState::Idle
            }
            DirectiveKind::Else => {
                if self.needs_review(&buffer) {
                    self.emit_review_marker(&opening.raw);
                    self.emit_block(&opening.raw, &buffer, line.raw);
                    return StripState::Idle;
                }
                if self.oracle.is_metadata_only(&buffer.concat()) {
                    log::debug!("inverting `{}`", opening.raw.trim_end());
                    self.emit(&opening.inverted);
                    StripState::BufferingAlternate {
                        buffer: Vec::new(),
                        depth: 0,
                        keep: true,
                    }
                } else {
                    self.emit_block(&opening.raw, &buffer, line.raw);
                    StripState::Idle
                }
            }
            DirectiveKind::Endif => {
                if self.needs_review(&buffer) {
                    self.emit_review_marker(&opening.raw);
                    self.emit_block(&opening.raw, &buffer, line.raw);
                    return StripState::Idle;
                }
                if self.oracle.is_metadata_only(&buffer.concat()) {
                    log::debug!("deleting block `{}`", opening.raw.trim_end());
                    // the whole block goes: condition, content and #endif
                } else {
                    self.emit_block(&opening.raw, &buffer, line.raw);
                }
                StripState::Idle
            }
        }
    }

    fn step_armed(&mut self, line: &SourceLine<'_>, depth: usize) -> StripState {
        match line.kind {
            DirectiveKind::If => {
                self.emit(line.raw);
                StripState::ArmedForElse { depth: depth + 1 }
            }
            DirectiveKind::Endif if depth > 0 => {
                self.emit(line.raw);
                StripState::ArmedForElse { depth: depth - 1 }
            }
            (DirectiveKind::Else | DirectiveKind::Elif) if depth > 0 => {
                self.emit(line.raw);
                StripState::ArmedForElse { depth }
            }
            DirectiveKind::Plain => {
                self.emit(line.raw);
                StripState::ArmedForElse { depth }
            }
            DirectiveKind::Elif => {
                self.emit(line.raw);
                StripState::Idle
            }
            DirectiveKind::Else => {
                // hold the #else back; it is dropped if the branch goes
                StripState::BufferingAlternate {
                    buffer: vec![line.raw.to_string()],
                    depth: 0,
                    keep: false,
                }
            }
            DirectiveKind::Endif => {
                // no alternate branch; nothing to strip
                self.emit(line.raw);
                StripState::Idle
            }
        }
    }

    fn step_alternate(
        &mut self,
        line: &SourceLine<'_>,
        mut buffer: Vec<String>,
        depth: usize,
        keep: bool,
    ) -> StripState {
        match line.kind {
            DirectiveKind::If => {
                buffer.push(line.raw.to_string());
                StripState::BufferingAlternate {
                    buffer,
                    depth: depth + 1,
                    keep,
                }
            }
            DirectiveKind::Endif if depth > 0 => {
                buffer.push(line.raw.to_string());
                StripState::BufferingAlternate {
                    buffer,
                    depth: depth - 1,
                    keep,
                }
            }
            (DirectiveKind::Else | DirectiveKind::Elif) if depth > 0 => {
                buffer.push(line.raw.to_string());
                StripState::BufferingAlternate {
                    buffer,
                    depth,
                    keep,
                }
            }
            DirectiveKind::Plain => {
                buffer.push(line.raw.to_string());
                StripState::BufferingAlternate {
                    buffer,
                    depth,
                    keep,
                }
            }
            DirectiveKind::Else | DirectiveKind::Elif => {
                // malformed or multi-branch shape; abstain verbatim
                self.emit_lines(&buffer);
                self.emit(line.raw);
                StripState::Idle
            }
            DirectiveKind::Endif => {
                if keep {
                    // surviving half of an inverted block
                    self.emit_lines(&buffer);
                    self.emit(line.raw);
                    return StripState::Idle;
                }
                // buffer[0] is the held-back #else line
                let interior = &buffer[1..];
                if self.mode == StripMode::FlagForReview
                    && interior.iter().any(|l| classify(l).kind.is_directive())
                {
                    // the opening directive already streamed out while
                    // armed, so the marker flags the #else branch instead
                    self.emit_review_marker(&buffer[0]);
                    self.emit_lines(&buffer);
                    self.emit(line.raw);
                } else if self.oracle.is_metadata_only(&interior.concat()) {
                    log::debug!("dropping superseded #else branch");
                    self.emit(line.raw);
                } else {
                    self.emit_lines(&buffer);
                    self.emit(line.raw);
                }
                StripState::Idle
            }
        }
    }

    fn needs_review(&self, buffer: &[String]) -> bool {
        self.mode == StripMode::FlagForReview
            && buffer.iter().any(|l| classify(l).kind.is_directive())
    }

    fn emit(&mut self, text: &str) {
        self.last_line_flagged = text.trim() == REVIEW_MARKER;
        self.output.push_str(text);
    }

    fn emit_lines(&mut self, lines: &[String]) {
        for line in lines {
            self.emit(line);
        }
    }

    fn emit_block(&mut self, opening: &str, buffer: &[String], closing: &str) {
        self.emit(opening);
        self.emit_lines(buffer);
        self.emit(closing);
    }

    /// Insert the review marker with the flagged line's indentation and
    /// terminator, unless one is already there from a previous pass.
    fn emit_review_marker(&mut self, flagged: &str) {
        if self.last_line_flagged {
            return;
        }
        let classified = classify(flagged);
        let terminator = match classified.terminator() {
            "" => "\n",
            t => t,
        };
        let content = flagged.trim_end_matches(['\r', '\n']);
        let indent = &content[..content.len() - content.trim_start().len()];
        self.output
            .push_str(&format!("{indent}{REVIEW_MARKER}{terminator}"));
        self.last_line_flagged = true;
    }
}
