//! Domain model for note graph builds.
//!
//! # Responsibility
//! - Define the row shapes read from the note store.
//! - Define the abstract node/edge graph published to renderers.
//!
//! # Invariants
//! - Every note is identified by a stable integer `NoteId`.
//! - Graph identities never mix note ids with tag paths.

pub mod graph;
pub mod note;
