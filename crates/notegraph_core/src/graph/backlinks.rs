//! Backlink detection between notes.
//!
//! # Responsibility
//! - Decide which inbound-link candidates really reference a target note.
//! - Ignore references that only occur inside the backlinks annotation
//!   section the note app appends to each note.
//!
//! # Invariants
//! - Matching is a literal substring test for `[[<title>]]`; no link syntax
//!   parsing, escaping, or alias handling.
//! - Output keeps candidate order (creation time ascending).
//! - Edges always point from the referencing note to the referenced note.

use crate::model::note::{NoteId, NoteRecord};

/// One detected reference from `source` to `target`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BacklinkEdge {
    pub source: NoteId,
    pub target: NoteId,
}

/// Literal reference scanner bound to one annotation delimiter.
#[derive(Debug, Clone, Copy)]
pub struct BacklinkExtractor<'a> {
    delimiter: &'a str,
}

impl<'a> BacklinkExtractor<'a> {
    /// `delimiter` marks the start of the annotation section; empty means
    /// notes have no such section.
    pub fn new(delimiter: &'a str) -> Self {
        Self { delimiter }
    }

    /// Portion of `text` before the first delimiter occurrence.
    pub fn body<'t>(&self, text: &'t str) -> &'t str {
        if self.delimiter.is_empty() {
            return text;
        }
        match text.find(self.delimiter) {
            Some(index) => &text[..index],
            None => text,
        }
    }

    /// Whether `source_text` references `target_title` before the delimiter.
    pub fn references(&self, source_text: &str, target_title: &str) -> bool {
        self.body(source_text)
            .contains(reference_token(target_title).as_str())
    }

    /// Filters `candidates` down to true backlink sources of `target`.
    pub fn extract(&self, target: &NoteRecord, candidates: &[NoteRecord]) -> Vec<BacklinkEdge> {
        let token = reference_token(&target.title);
        candidates
            .iter()
            .filter(|candidate| self.body(&candidate.text).contains(token.as_str()))
            .map(|candidate| BacklinkEdge {
                source: candidate.id,
                target: target.id,
            })
            .collect()
    }
}

/// Wiki-style reference literal for a note title.
pub fn reference_token(title: &str) -> String {
    format!("[[{title}]]")
}
