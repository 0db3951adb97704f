//! Conditional-stack tracker and define-usage analysis.
//!
//! A pure state machine over the classified line stream. The stack holds
//! the active conditions (innermost last); its length is the current
//! nesting depth and it must be empty at end of input. A rolling chunk
//! accumulates plain content between directive transitions; when a chunk
//! is finalized and contains at least one availability annotation, every
//! condition on the stack is credited as "used with metadata": the full
//! nesting path, not just the innermost condition. This over-credits outer
//! conditions for inner content; the behavior is deliberately conservative.

use crate::annotations::is_availability_annotation;
use crate::condition::Condition;
use crate::error::{EngineError, Result};
use crate::line::{classify, split_with_terminators, DirectiveKind};
use serde::{Deserialize, Serialize};

/// Verdict of the coverage check: either the ordered distinct set of
/// atomic conditions guarding metadata, or a refusal because the
/// directive set cannot be reduced to one deterministic outcome.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Eligibility {
    Eligible(Vec<Condition>),
    Ineligible,
}

impl Eligibility {
    #[must_use]
    pub const fn is_eligible(&self) -> bool {
        matches!(self, Self::Eligible(_))
    }
}

/// State machine tracking nested conditional directives over one file.
#[derive(Debug, Default)]
pub struct ConditionalTracker<'a> {
    stack: Vec<Condition>,
    chunk: Vec<&'a str>,
    credited: Vec<Condition>,
    line_number: usize,
}

impl<'a> ConditionalTracker<'a> {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Feed one raw line. Fails on a directive with no open block.
    pub fn step(&mut self, raw: &'a str) -> Result<()> {
        self.line_number += 1;
        let line = classify(raw);
        match line.kind {
            DirectiveKind::If => {
                let condition = Condition::parse(line.condition().unwrap_or_default());
                self.stack.push(condition);
                self.chunk.clear();
            }
            DirectiveKind::Elif => {
                self.require_open("#elif")?;
                self.finalize_chunk();
                let condition = Condition::parse(line.condition().unwrap_or_default());
                let top = self.stack.len() - 1;
                self.stack[top] = condition;
            }
            DirectiveKind::Else => {
                self.require_open("#else")?;
                self.finalize_chunk();
                let top = self.stack.len() - 1;
                self.stack[top] = self.stack[top].inverted();
            }
            DirectiveKind::Endif => {
                self.require_open("#endif")?;
                self.finalize_chunk();
                self.stack.pop();
            }
            DirectiveKind::Plain => {
                // content outside any conditional is not tracked
                if !self.stack.is_empty() {
                    self.chunk.push(raw);
                }
            }
        }
        Ok(())
    }

    /// Consume the tracker; fails if any block is still open.
    pub fn finish(self) -> Result<Vec<Condition>> {
        if !self.stack.is_empty() {
            return Err(EngineError::unterminated(self.stack.len()));
        }
        Ok(self.credited)
    }

    fn require_open(&self, directive: &str) -> Result<()> {
        if self.stack.is_empty() {
            return Err(EngineError::dangling(directive, self.line_number));
        }
        Ok(())
    }

    /// Credit the whole stack path when the pending chunk carries metadata,
    /// then clear the chunk.
    fn finalize_chunk(&mut self) {
        let has_metadata = self
            .chunk
            .iter()
            .any(|line| is_availability_annotation(line));
        if has_metadata {
            for condition in &self.stack {
                if !self.credited.contains(condition) {
                    log::trace!("crediting condition {condition} as guarding metadata");
                    self.credited.push(condition.clone());
                }
            }
        }
        self.chunk.clear();
    }
}

/// Conditions credited as guarding metadata, unflattened, in first-seen
/// order. The input must be well-nested.
pub fn credited_conditions(text: &str) -> Result<Vec<Condition>> {
    let mut tracker = ConditionalTracker::new();
    for raw in split_with_terminators(text) {
        tracker.step(raw)?;
    }
    tracker.finish()
}

/// Distinct atomic conditions guarding metadata, in first-seen order.
/// Compound expressions contribute each flattened operand independently.
pub fn parse_all_defines(text: &str) -> Result<Vec<Condition>> {
    let mut defines = Vec::new();
    for condition in credited_conditions(text)? {
        for atom in condition.flattened() {
            if !defines.contains(&atom) {
                defines.push(atom);
            }
        }
    }
    Ok(defines)
}

/// Decide whether the file's directive set can be reduced to one
/// deterministic outcome.
///
/// `Ineligible` when any credited expression is compound (the eligibility
/// check accepts only simple identifiers) or when two credited conditions
/// are complementary. `baseline` names an always-present define excluded
/// from the check in both polarities.
pub fn find_unique_defines_that_cover_all(
    text: &str,
    baseline: Option<&str>,
) -> Result<Eligibility> {
    let credited = credited_conditions(text)?;

    let mut defines: Vec<Condition> = Vec::new();
    for condition in credited {
        if baseline.is_some_and(|name| condition.names_define(name)) {
            continue;
        }
        if condition.is_compound() {
            log::debug!("compound condition `{}` blocks eligibility", condition.expr());
            return Ok(Eligibility::Ineligible);
        }
        if defines.iter().any(|seen| seen.is_complementary(&condition)) {
            log::debug!("complementary pair on `{}` blocks eligibility", condition.expr());
            return Ok(Eligibility::Ineligible);
        }
        if !defines.contains(&condition) {
            defines.push(condition);
        }
    }
    Ok(Eligibility::Eligible(defines))
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn cond(token: &str) -> Condition {
        Condition::parse(token)
    }

    #[test]
    fn test_single_guarded_block() {
        let text = "#if NET\n[SupportedOSPlatform (\"ios13.0\")]\n#endif\n";
        assert_eq!(parse_all_defines(text).unwrap(), vec![cond("NET")]);
    }

    #[test]
    fn test_else_credits_inverse() {
        let text = "#if NET\nint x;\n#else\n[Introduced (PlatformName.iOS, 11, 0)]\n#endif\n";
        assert_eq!(parse_all_defines(text).unwrap(), vec![cond("!NET")]);
    }

    #[test]
    fn test_nested_blocks_credit_full_path() {
        let text = concat!(
            "#if NET\n",
            "#if IOS\n",
            "[SupportedOSPlatform (\"ios13.0\")]\n",
            "#endif\n",
            "#endif\n",
        );
        // inner metadata credits the whole stack path, outermost included
        assert_eq!(
            parse_all_defines(text).unwrap(),
            vec![cond("NET"), cond("IOS")]
        );
    }

    #[test]
    fn test_content_outside_conditionals_is_ignored() {
        let text = "[iOS (11, 0)]\npublic void Foo ();\n";
        assert_eq!(parse_all_defines(text).unwrap(), Vec::<Condition>::new());
    }

    #[test]
    fn test_non_metadata_blocks_credit_nothing() {
        let text = "#if NET\npublic void Foo ();\n#endif\n";
        assert_eq!(parse_all_defines(text).unwrap(), Vec::<Condition>::new());
    }

    #[test]
    fn test_compound_contributes_flattened_atoms() {
        let text = "#if IOS && TVOS\n[Introduced (PlatformName.iOS, 11, 0)]\n#endif\n";
        assert_eq!(
            parse_all_defines(text).unwrap(),
            vec![cond("IOS"), cond("TVOS")]
        );
    }

    #[test]
    fn test_coverage_rejects_complementary_pair() {
        let text = concat!(
            "#if IOS\n[iOS (11, 0)]\n#endif\n",
            "#if !IOS\n[NoiOS]\n#endif\n",
        );
        assert_eq!(
            find_unique_defines_that_cover_all(text, None).unwrap(),
            Eligibility::Ineligible
        );
    }

    #[test]
    fn test_coverage_rejects_compound_expression() {
        let text = "#if IOS && TVOS\n[iOS (11, 0)]\n#endif\n";
        assert_eq!(
            find_unique_defines_that_cover_all(text, None).unwrap(),
            Eligibility::Ineligible
        );
    }

    #[test]
    fn test_coverage_returns_first_seen_order() {
        let text = concat!(
            "#if WATCH\n[Watch (5, 0)]\n#endif\n",
            "#if IOS\n[iOS (11, 0)]\n#endif\n",
        );
        assert_eq!(
            find_unique_defines_that_cover_all(text, None).unwrap(),
            Eligibility::Eligible(vec![cond("WATCH"), cond("IOS")])
        );
    }

    #[test]
    fn test_coverage_baseline_is_excluded() {
        let text = concat!(
            "#if NET\n[SupportedOSPlatform (\"ios13.0\")]\n#endif\n",
            "#if !NET\n[Introduced (PlatformName.iOS, 13, 0)]\n#endif\n",
        );
        // NET and !NET are complementary, but NET is the assumed default
        assert_eq!(
            find_unique_defines_that_cover_all(text, Some("NET")).unwrap(),
            Eligibility::Eligible(Vec::new())
        );
        assert_eq!(
            find_unique_defines_that_cover_all(text, None).unwrap(),
            Eligibility::Ineligible
        );
    }

    #[test]
    fn test_dangling_endif_is_fatal() {
        let err = parse_all_defines("#endif\n").unwrap_err();
        assert!(matches!(err, EngineError::DanglingDirective { line: 1, .. }));
    }

    #[test]
    fn test_unterminated_block_is_fatal() {
        let err = parse_all_defines("#if NET\n[iOS (11, 0)]\n").unwrap_err();
        assert!(matches!(err, EngineError::UnterminatedBlock { depth: 1 }));
    }

    #[test]
    fn test_elif_switches_condition() {
        let text = concat!(
            "#if IOS\n[iOS (11, 0)]\n",
            "#elif TVOS\n[TV (12, 0)]\n",
            "#endif\n",
        );
        assert_eq!(
            parse_all_defines(text).unwrap(),
            vec![cond("IOS"), cond("TVOS")]
        );
    }
}
