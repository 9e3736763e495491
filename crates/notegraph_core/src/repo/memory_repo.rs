//! In-memory note source.
//!
//! Holds rows added through `add_note`/`add_tag`/`add_link` and answers the
//! `NoteSource` contract with the same ordering rules as the SQLite
//! implementation.

use crate::db::StoreResult;
use crate::model::note::{NoteId, NoteRecord, TagAssignment};
use crate::repo::note_repo::{DigestWriter, NoteSource};
use std::collections::{BTreeMap, BTreeSet};

#[derive(Debug, Clone)]
struct StoredNote {
    record: NoteRecord,
    created_at: i64,
}

/// Note source backed by plain collections.
#[derive(Debug, Clone, Default)]
pub struct MemoryNoteSource {
    notes: BTreeMap<NoteId, StoredNote>,
    tags: BTreeMap<NoteId, BTreeSet<String>>,
    /// target note id -> source note ids linking to it
    inbound: BTreeMap<NoteId, BTreeSet<NoteId>>,
}

impl MemoryNoteSource {
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts or replaces one note. `created_at` orders inbound links.
    pub fn add_note(&mut self, record: NoteRecord, created_at: i64) -> &mut Self {
        self.notes
            .insert(record.id, StoredNote { record, created_at });
        self
    }

    /// Records that `note_id` carries `tag_path`.
    ///
    /// Assignments for unknown note ids are kept; they are dropped at read
    /// time like dangling rows in a live export.
    pub fn add_tag(&mut self, note_id: NoteId, tag_path: impl Into<String>) -> &mut Self {
        self.tags.entry(note_id).or_default().insert(tag_path.into());
        self
    }

    /// Records that `source_id` links to `target_id`.
    pub fn add_link(&mut self, source_id: NoteId, target_id: NoteId) -> &mut Self {
        self.inbound.entry(target_id).or_default().insert(source_id);
        self
    }
}

impl NoteSource for MemoryNoteSource {
    fn fetch_all_notes(&self) -> StoreResult<Vec<NoteRecord>> {
        Ok(self
            .notes
            .values()
            .map(|stored| stored.record.clone())
            .collect())
    }

    fn fetch_tag_assignments(&self) -> StoreResult<Vec<TagAssignment>> {
        let mut assignments = Vec::new();
        for (note_id, tags) in &self.tags {
            let Some(stored) = self.notes.get(note_id) else {
                continue;
            };
            for tag in tags {
                assignments.push(TagAssignment::new(
                    *note_id,
                    stored.record.title.clone(),
                    tag.clone(),
                ));
            }
        }
        Ok(assignments)
    }

    fn fetch_inbound_links(&self, note_id: NoteId) -> StoreResult<Vec<NoteRecord>> {
        let Some(sources) = self.inbound.get(&note_id) else {
            return Ok(Vec::new());
        };
        let mut linked = sources
            .iter()
            .filter_map(|source_id| self.notes.get(source_id))
            .collect::<Vec<_>>();
        linked.sort_by_key(|stored| (stored.created_at, stored.record.id));
        Ok(linked
            .into_iter()
            .map(|stored| stored.record.clone())
            .collect())
    }

    fn content_digest(&self) -> StoreResult<u64> {
        let mut digest = DigestWriter::new();
        for stored in self.notes.values() {
            digest.write_note(&stored.record);
            digest.write_i64(stored.created_at);
        }
        for assignment in self.fetch_tag_assignments()? {
            digest.write_i64(assignment.note_id);
            digest.write_str(&assignment.tag_path);
        }
        for (target_id, sources) in &self.inbound {
            for source_id in sources {
                digest.write_i64(*target_id);
                digest.write_i64(*source_id);
            }
        }
        Ok(digest.finish())
    }
}
