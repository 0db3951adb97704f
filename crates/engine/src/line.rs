//! Line-level classification of conditional-compilation directives.
//!
//! Directive recognition works on a trimmed, comment-stripped copy of the
//! line; the raw text (including indentation, trailing comments and the
//! line terminator) is kept untouched so unmodified regions can be
//! reproduced byte-for-byte.

/// Directive kind recognized on a single source line
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DirectiveKind {
    If,
    Elif,
    Else,
    Endif,
    Plain,
}

impl DirectiveKind {
    /// Check whether this line opens, switches or closes a conditional
    #[must_use]
    pub const fn is_directive(self) -> bool {
        !matches!(self, Self::Plain)
    }
}

/// One classified source line.
///
/// `raw` carries the terminator (`\n` or `\r\n`) when the input had one.
/// For `If`/`Elif` lines, `condition_span` locates the condition text
/// inside `raw` so a rewrite can swap the condition while preserving
/// everything around it.
#[derive(Debug, Clone)]
pub struct SourceLine<'a> {
    pub raw: &'a str,
    pub kind: DirectiveKind,
    condition_span: Option<(usize, usize)>,
}

impl<'a> SourceLine<'a> {
    /// The unparsed condition string for `If`/`Elif` lines
    #[must_use]
    pub fn condition(&self) -> Option<&'a str> {
        self.condition_span.map(|(start, end)| &self.raw[start..end])
    }

    /// Rebuild this directive line with a different condition, keeping
    /// indentation, trailing comment and terminator intact
    #[must_use]
    pub fn with_condition(&self, condition: &str) -> String {
        match self.condition_span {
            Some((start, end)) => {
                format!("{}{}{}", &self.raw[..start], condition, &self.raw[end..])
            }
            None => self.raw.to_string(),
        }
    }

    /// Terminator carried by this line (empty for a final unterminated line)
    #[must_use]
    pub fn terminator(&self) -> &'a str {
        if self.raw.ends_with("\r\n") {
            "\r\n"
        } else if self.raw.ends_with('\n') {
            "\n"
        } else {
            ""
        }
    }
}

/// Split whole-file text into lines that keep their terminators, so that
/// concatenating the pieces reproduces the input exactly.
pub fn split_with_terminators(text: &str) -> Vec<&str> {
    let mut lines = Vec::new();
    let mut start = 0;
    for (idx, byte) in text.bytes().enumerate() {
        if byte == b'\n' {
            lines.push(&text[start..=idx]);
            start = idx + 1;
        }
    }
    if start < text.len() {
        lines.push(&text[start..]);
    }
    lines
}

/// Classify one raw line.
pub fn classify(raw: &str) -> SourceLine<'_> {
    let content = raw
        .strip_suffix('\n')
        .map(|rest| rest.strip_suffix('\r').unwrap_or(rest))
        .unwrap_or(raw);

    let trimmed_start = content.trim_start();
    if !trimmed_start.starts_with('#') {
        return plain(raw);
    }

    let indent_len = content.len() - trimmed_start.len();
    let mut body = trimmed_start.trim_end();
    if let Some(pos) = body.find("//") {
        body = body[..pos].trim_end();
    }

    match body {
        "#else" => {
            return SourceLine {
                raw,
                kind: DirectiveKind::Else,
                condition_span: None,
            }
        }
        "#endif" => {
            return SourceLine {
                raw,
                kind: DirectiveKind::Endif,
                condition_span: None,
            }
        }
        _ => {}
    }

    for (keyword, kind) in [("#if", DirectiveKind::If), ("#elif", DirectiveKind::Elif)] {
        if let Some(rest) = body.strip_prefix(keyword) {
            if !rest.starts_with(char::is_whitespace) {
                continue;
            }
            let condition = rest.trim();
            if condition.is_empty() {
                continue;
            }
            let offset_in_body = keyword.len() + (rest.len() - rest.trim_start().len());
            let start = indent_len + offset_in_body;
            return SourceLine {
                raw,
                kind,
                condition_span: Some((start, start + condition.len())),
            };
        }
    }

    plain(raw)
}

const fn plain(raw: &str) -> SourceLine<'_> {
    SourceLine {
        raw,
        kind: DirectiveKind::Plain,
        condition_span: None,
    }
}
