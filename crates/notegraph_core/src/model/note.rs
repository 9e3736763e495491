//! Note and tag-assignment read models.
//!
//! # Responsibility
//! - Define the row shapes supplied by the note store collaborator.
//! - Keep note identity (`id` + `uid`) explicit in signatures.
//!
//! # Invariants
//! - Records are read-only snapshots; core never writes them back.
//! - `title` and `text` are never `None`; NULL store columns read as `""`.

use serde::Serialize;

/// Store-local integer identity of one note (Bear `Z_PK`).
pub type NoteId = i64;

/// One non-deleted note as read from the store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NoteRecord {
    /// Stable integer id used for graph identity.
    pub id: NoteId,
    /// Globally-unique string identifier stored beside the integer id.
    pub uid: String,
    /// Display title.
    pub title: String,
    /// Raw markdown text, possibly including the backlinks annotation section.
    pub text: String,
}

impl NoteRecord {
    pub fn new(
        id: NoteId,
        uid: impl Into<String>,
        title: impl Into<String>,
        text: impl Into<String>,
    ) -> Self {
        Self {
            id,
            uid: uid.into(),
            title: title.into(),
            text: text.into(),
        }
    }
}

/// One (note, tag) association row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TagAssignment {
    pub note_id: NoteId,
    pub note_title: String,
    /// Slash-delimited tag path, e.g. `work/clients/acme`.
    pub tag_path: String,
}

impl TagAssignment {
    pub fn new(note_id: NoteId, note_title: impl Into<String>, tag_path: impl Into<String>) -> Self {
        Self {
            note_id,
            note_title: note_title.into(),
            tag_path: tag_path.into(),
        }
    }
}
