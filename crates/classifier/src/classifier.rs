use crate::error::{ClassifierError, Result};
use availstrip_engine::annotations::is_availability_attribute_name;
use availstrip_engine::{classify, split_with_terminators, MetadataOracle};
use std::cell::RefCell;
use tree_sitter::{Node, Parser};

/// Name of the synthetic declaration appended to a span so that a bare
/// run of attributes parses as a complete compilation unit.
const PROBE_NAME: &str = "__AvailstripProbe";
const PROBE_DECLARATION: &str = "class __AvailstripProbe { }";

/// Grammar-aware metadata classifier for C# source spans.
///
/// Answers whether a block interior consists solely of availability
/// attribute applications. Conditional-directive lines inside the span are
/// blanked to empty lines first (they are separators, not content), then
/// the span is parsed with a probe declaration appended; the verdict is positive only
/// when the parse is error-free, the probe is the sole declaration, and
/// every attribute attached to it comes from the closed availability set.
/// Anything the grammar cannot account for yields `false`, which callers
/// treat as an abstention.
pub struct DeclClassifier {
    parser: RefCell<Parser>,
}

impl DeclClassifier {
    pub fn new() -> Result<Self> {
        let mut parser = Parser::new();
        parser
            .set_language(&tree_sitter_c_sharp::LANGUAGE.into())
            .map_err(|e| ClassifierError::tree_sitter(format!("Failed to set language: {e}")))?;
        Ok(Self {
            parser: RefCell::new(parser),
        })
    }

    fn classify(&self, text: &str) -> bool {
        let prepared = blank_directive_lines(text);
        if prepared.trim().is_empty() {
            // nothing but separators; vacuously metadata-only
            return true;
        }

        let source = format!("{prepared}\n{PROBE_DECLARATION}\n");
        let tree = match self.parser.borrow_mut().parse(&source, None) {
            Some(tree) => tree,
            None => {
                log::warn!("parser returned no tree; abstaining");
                return false;
            }
        };

        let root = tree.root_node();
        if root.has_error() {
            log::debug!("span does not parse cleanly; abstaining");
            return false;
        }

        let mut probe_seen = false;
        let mut cursor = root.walk();
        for child in root.named_children(&mut cursor) {
            match child.kind() {
                "comment" => {}
                "class_declaration" if is_probe(child, &source) => {
                    if probe_seen || !attributes_are_availability(child, &source) {
                        return false;
                    }
                    probe_seen = true;
                }
                _ => return false,
            }
        }
        probe_seen
    }
}

impl MetadataOracle for DeclClassifier {
    fn is_metadata_only(&self, text: &str) -> bool {
        self.classify(text)
    }
}

/// Replace conditional-directive lines with their bare terminators so the
/// span parses as ordinary source while line positions stay stable.
///
/// Only the recognized conditional directives are blanked. Other
/// preprocessor lines (`#region`, `#pragma`, ...) are kept: they are real
/// content the verdict must account for, not separators.
fn blank_directive_lines(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for raw in split_with_terminators(text) {
        let line = classify(raw);
        if line.kind.is_directive() {
            out.push_str(line.terminator());
        } else {
            out.push_str(raw);
        }
    }
    out
}

fn is_probe(node: Node, source: &str) -> bool {
    node.child_by_field_name("name")
        .and_then(|name| name.utf8_text(source.as_bytes()).ok())
        .is_some_and(|name| name == PROBE_NAME)
}

/// Every attribute on the declaration must come from the closed
/// availability set.
fn attributes_are_availability(declaration: Node, source: &str) -> bool {
    let mut saw_attribute = false;
    let mut cursor = declaration.walk();
    for child in declaration.children(&mut cursor) {
        if child.kind() != "attribute_list" {
            continue;
        }
        let mut list_cursor = child.walk();
        for attribute in child.named_children(&mut list_cursor) {
            if attribute.kind() != "attribute" {
                continue;
            }
            saw_attribute = true;
            if !attribute_name(attribute, source)
                .is_some_and(|name| is_availability_attribute_name(name))
            {
                return false;
            }
        }
    }
    saw_attribute
}

/// Simple name of an attribute, with any namespace qualification dropped
fn attribute_name<'s>(attribute: Node, source: &'s str) -> Option<&'s str> {
    let name_node = attribute
        .child_by_field_name("name")
        .or_else(|| attribute.named_child(0))?;
    let text = name_node.utf8_text(source.as_bytes()).ok()?;
    Some(text.rsplit('.').next().unwrap_or(text).trim())
}
