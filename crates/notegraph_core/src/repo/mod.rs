//! Note store access contracts and implementations.
//!
//! # Responsibility
//! - Define the read-only `NoteSource` contract consumed by graph builds.
//! - Isolate Bear SQLite query details from graph orchestration.
//!
//! # Invariants
//! - Sources never mutate the store.
//! - Result sets are complete and deterministically ordered.

pub mod memory_repo;
pub mod note_repo;
