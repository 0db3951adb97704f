//! Condition algebra for conditional-compilation expressions.
//!
//! A [`Condition`] is either a single atomic define with a negation flag
//! (`NET`, `!NET`) or an unparsed compound expression (`NET && IOS`).
//! Compound expressions are never evaluated; they are only flattened into
//! their atomic operands for conflict and complexity checks, which
//! deliberately discards grouping information.

use serde::{Deserialize, Serialize};
use std::fmt;

/// One condition as it appears on the conditional stack.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Condition {
    expr: String,
    negated: bool,
}

impl Condition {
    /// Parse a condition token.
    ///
    /// Atomic tokens fold leading `!` markers and drop grouping
    /// parentheses; compound tokens are stored verbatim so the original
    /// expression stays available for the complexity check.
    #[must_use]
    pub fn parse(token: &str) -> Self {
        let trimmed = token.trim();
        if contains_connective(trimmed) {
            return Self {
                expr: trimmed.to_string(),
                negated: false,
            };
        }

        let mut negated = false;
        let mut rest = trimmed;
        loop {
            if let Some(stripped) = rest.strip_prefix('!') {
                negated = !negated;
                rest = stripped.trim_start();
            } else if let Some(stripped) = rest.strip_prefix('(') {
                rest = stripped.trim_start();
            } else {
                break;
            }
        }
        let expr = rest.trim_end_matches(')').trim().to_string();
        Self { expr, negated }
    }

    /// The define name (or the unparsed expression for compound conditions)
    #[must_use]
    pub fn expr(&self) -> &str {
        &self.expr
    }

    #[must_use]
    pub const fn is_negated(&self) -> bool {
        self.negated
    }

    /// Whether the expression still contains `&&`/`||` connectives
    #[must_use]
    pub fn is_compound(&self) -> bool {
        contains_connective(&self.expr)
    }

    /// The syntactic inverse: toggles the single leading negation marker
    #[must_use]
    pub fn inverted(&self) -> Self {
        Self {
            expr: self.expr.clone(),
            negated: !self.negated,
        }
    }

    /// Two conditions are complementary when they name the same define
    /// with opposite negation
    #[must_use]
    pub fn is_complementary(&self, other: &Self) -> bool {
        self.expr == other.expr && self.negated != other.negated
    }

    /// Check against a known define name, regardless of polarity
    #[must_use]
    pub fn names_define(&self, define: &str) -> bool {
        self.expr == define
    }

    /// Flatten into atomic operands, in source order.
    ///
    /// Atomic conditions yield themselves; compound expressions yield one
    /// condition per operand with its own negation marker preserved.
    /// Grouping is discarded: `A && (B || C)` flattens to `[A, B, C]`.
    #[must_use]
    pub fn flattened(&self) -> Vec<Self> {
        if self.is_compound() {
            split_conditional_parts(&self.expr)
        } else {
            vec![self.clone()]
        }
    }
}

impl fmt::Display for Condition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.negated {
            write!(f, "!{}", self.expr)
        } else {
            write!(f, "{}", self.expr)
        }
    }
}

/// Split a boolean expression on `&&`/`||` into its atomic operands.
///
/// Used only for conflict and complexity detection, never to evaluate or
/// reconstruct the expression.
#[must_use]
pub fn split_conditional_parts(expr: &str) -> Vec<Condition> {
    expr.split("&&")
        .flat_map(|part| part.split("||"))
        .map(Condition::parse)
        .filter(|cond| !cond.expr().is_empty())
        .collect()
}

fn contains_connective(expr: &str) -> bool {
    expr.contains("&&") || expr.contains("||")
}
