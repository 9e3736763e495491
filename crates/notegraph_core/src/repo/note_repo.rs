//! Note store contracts and Bear SQLite implementation.
//!
//! # Responsibility
//! - Define the read-only data-access contract consumed by graph builds.
//! - Keep Bear schema details (`ZSFNOTE`, `Z_7TAGS`, ...) inside this module.
//!
//! # Invariants
//! - All queries exclude trashed notes (`ZTRASHED = 0`).
//! - Every query has a total order, so repeated reads are identical.
//! - Inbound links are ordered by source creation time ascending.
//! - `with_snapshot` holds one deferred read transaction, so every fetch
//!   inside it sees the same store state.

use crate::db::schema::{table_exists, table_has_column};
use crate::db::{StoreError, StoreResult};
use crate::model::note::{NoteId, NoteRecord, TagAssignment};
use rusqlite::{Connection, Row};
use xxhash_rust::xxh3::Xxh3;

const REQUIRED_COLUMNS: &[(&str, &[&str])] = &[
    (
        "ZSFNOTE",
        &[
            "Z_PK",
            "ZUNIQUEIDENTIFIER",
            "ZTITLE",
            "ZTEXT",
            "ZTRASHED",
            "ZCREATIONDATE",
        ],
    ),
    ("ZSFNOTETAG", &["Z_PK", "ZTITLE"]),
    ("Z_7TAGS", &["Z_7NOTES", "Z_14TAGS"]),
    ("Z_7LINKEDNOTES", &["Z_7LINKEDNOTES", "Z_7LINKEDBYNOTES"]),
];

const NOTES_SQL: &str = "SELECT
    Z_PK,
    ZUNIQUEIDENTIFIER,
    ZTITLE,
    ZTEXT,
    ZCREATIONDATE
FROM ZSFNOTE
WHERE ZTRASHED = 0
ORDER BY Z_PK ASC;";

const TAG_ASSIGNMENTS_SQL: &str = "SELECT
    ZSFNOTE.Z_PK AS note_id,
    ZSFNOTE.ZTITLE AS note_title,
    ZSFNOTETAG.ZTITLE AS tag_path
FROM Z_7TAGS
INNER JOIN ZSFNOTE ON Z_7TAGS.Z_7NOTES = ZSFNOTE.Z_PK
INNER JOIN ZSFNOTETAG ON Z_7TAGS.Z_14TAGS = ZSFNOTETAG.Z_PK
WHERE ZSFNOTE.ZTRASHED = 0
  AND ZSFNOTETAG.ZTITLE IS NOT NULL
ORDER BY ZSFNOTE.Z_PK ASC, ZSFNOTETAG.ZTITLE ASC;";

const INBOUND_LINKS_SQL: &str = "SELECT
    SNote.Z_PK,
    SNote.ZUNIQUEIDENTIFIER,
    SNote.ZTITLE,
    SNote.ZTEXT
FROM ZSFNOTE AS SNote
WHERE SNote.ZTRASHED = 0
  AND SNote.Z_PK IN (
      SELECT Z_7LINKEDBYNOTES
      FROM Z_7LINKEDNOTES
      WHERE Z_7LINKEDNOTES = ?1
  )
ORDER BY SNote.ZCREATIONDATE ASC, SNote.Z_PK ASC;";

const LINK_PAIRS_SQL: &str = "SELECT Z_7LINKEDNOTES, Z_7LINKEDBYNOTES
FROM Z_7LINKEDNOTES
ORDER BY Z_7LINKEDNOTES ASC, Z_7LINKEDBYNOTES ASC;";

/// Data-access contract for graph builds.
///
/// Implementations return complete, totally ordered result sets; graph
/// construction never sees partial reads.
pub trait NoteSource {
    /// All non-deleted notes, ordered by id.
    fn fetch_all_notes(&self) -> StoreResult<Vec<NoteRecord>>;
    /// One row per (note, tag) pair for non-deleted notes.
    fn fetch_tag_assignments(&self) -> StoreResult<Vec<TagAssignment>>;
    /// Non-deleted notes whose content links to `note_id`, oldest first.
    fn fetch_inbound_links(&self, note_id: NoteId) -> StoreResult<Vec<NoteRecord>>;
    /// Digest over every row the three fetches can observe.
    fn content_digest(&self) -> StoreResult<u64>;

    /// Runs `read` against one point-in-time view of the source.
    ///
    /// Nested calls join the outer snapshot. Sources without concurrent
    /// writers run `read` directly.
    fn with_snapshot<T, E, F>(&self, read: F) -> Result<T, E>
    where
        Self: Sized,
        E: From<StoreError>,
        F: FnOnce(&Self) -> Result<T, E>,
    {
        read(self)
    }
}

impl<T: NoteSource> NoteSource for &T {
    fn fetch_all_notes(&self) -> StoreResult<Vec<NoteRecord>> {
        (**self).fetch_all_notes()
    }

    fn fetch_tag_assignments(&self) -> StoreResult<Vec<TagAssignment>> {
        (**self).fetch_tag_assignments()
    }

    fn fetch_inbound_links(&self, note_id: NoteId) -> StoreResult<Vec<NoteRecord>> {
        (**self).fetch_inbound_links(note_id)
    }

    fn content_digest(&self) -> StoreResult<u64> {
        (**self).content_digest()
    }

    fn with_snapshot<R, E, F>(&self, read: F) -> Result<R, E>
    where
        E: From<StoreError>,
        F: FnOnce(&Self) -> Result<R, E>,
    {
        (**self).with_snapshot(|_| read(self))
    }
}

/// Bear-schema note source over an open connection.
pub struct SqliteNoteSource<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteNoteSource<'conn> {
    /// Constructs a source after verifying the Bear tables and columns.
    pub fn try_new(conn: &'conn Connection) -> StoreResult<Self> {
        ensure_bear_schema(conn)?;
        Ok(Self { conn })
    }
}

impl NoteSource for SqliteNoteSource<'_> {
    fn fetch_all_notes(&self) -> StoreResult<Vec<NoteRecord>> {
        let mut stmt = self.conn.prepare(NOTES_SQL)?;
        let mut rows = stmt.query([])?;
        let mut notes = Vec::new();
        while let Some(row) = rows.next()? {
            notes.push(parse_note_row(row)?);
        }
        Ok(notes)
    }

    fn fetch_tag_assignments(&self) -> StoreResult<Vec<TagAssignment>> {
        let mut stmt = self.conn.prepare(TAG_ASSIGNMENTS_SQL)?;
        let mut rows = stmt.query([])?;
        let mut assignments = Vec::new();
        while let Some(row) = rows.next()? {
            assignments.push(TagAssignment {
                note_id: row.get("note_id")?,
                note_title: row
                    .get::<_, Option<String>>("note_title")?
                    .unwrap_or_default(),
                tag_path: row.get("tag_path")?,
            });
        }
        Ok(assignments)
    }

    fn fetch_inbound_links(&self, note_id: NoteId) -> StoreResult<Vec<NoteRecord>> {
        let mut stmt = self.conn.prepare_cached(INBOUND_LINKS_SQL)?;
        let mut rows = stmt.query([note_id])?;
        let mut notes = Vec::new();
        while let Some(row) = rows.next()? {
            notes.push(parse_note_row(row)?);
        }
        Ok(notes)
    }

    fn content_digest(&self) -> StoreResult<u64> {
        let mut digest = DigestWriter::new();

        let mut stmt = self.conn.prepare(NOTES_SQL)?;
        let mut rows = stmt.query([])?;
        while let Some(row) = rows.next()? {
            let note = parse_note_row(row)?;
            digest.write_note(&note);
            digest.write_opt_f64(row.get::<_, Option<f64>>(4)?);
        }

        for assignment in self.fetch_tag_assignments()? {
            digest.write_i64(assignment.note_id);
            digest.write_str(&assignment.note_title);
            digest.write_str(&assignment.tag_path);
        }

        let mut stmt = self.conn.prepare(LINK_PAIRS_SQL)?;
        let mut rows = stmt.query([])?;
        while let Some(row) = rows.next()? {
            digest.write_opt_i64(row.get(0)?);
            digest.write_opt_i64(row.get(1)?);
        }

        Ok(digest.finish())
    }

    fn with_snapshot<T, E, F>(&self, read: F) -> Result<T, E>
    where
        E: From<StoreError>,
        F: FnOnce(&Self) -> Result<T, E>,
    {
        if !self.conn.is_autocommit() {
            return read(self);
        }

        // Deferred: the snapshot is pinned by the first read inside `read`.
        let tx = self
            .conn
            .unchecked_transaction()
            .map_err(StoreError::from)?;
        let value = read(self)?;
        tx.commit().map_err(StoreError::from)?;
        Ok(value)
    }
}

/// Streaming xxh3 digest with length-prefixed fields.
pub(crate) struct DigestWriter {
    hasher: Xxh3,
}

impl DigestWriter {
    pub(crate) fn new() -> Self {
        Self {
            hasher: Xxh3::new(),
        }
    }

    pub(crate) fn write_i64(&mut self, value: i64) {
        self.hasher.update(&value.to_le_bytes());
    }

    pub(crate) fn write_opt_i64(&mut self, value: Option<i64>) {
        match value {
            Some(value) => {
                self.hasher.update(&[1]);
                self.write_i64(value);
            }
            None => self.hasher.update(&[0]),
        }
    }

    pub(crate) fn write_opt_f64(&mut self, value: Option<f64>) {
        self.write_opt_i64(value.map(|value| value.to_bits() as i64));
    }

    pub(crate) fn write_str(&mut self, value: &str) {
        self.hasher.update(&(value.len() as u64).to_le_bytes());
        self.hasher.update(value.as_bytes());
    }

    pub(crate) fn write_note(&mut self, note: &NoteRecord) {
        self.write_i64(note.id);
        self.write_str(&note.uid);
        self.write_str(&note.title);
        self.write_str(&note.text);
    }

    pub(crate) fn finish(&self) -> u64 {
        self.hasher.digest()
    }
}

fn parse_note_row(row: &Row<'_>) -> StoreResult<NoteRecord> {
    Ok(NoteRecord {
        id: row.get(0)?,
        uid: row.get::<_, Option<String>>(1)?.unwrap_or_default(),
        title: row.get::<_, Option<String>>(2)?.unwrap_or_default(),
        text: row.get::<_, Option<String>>(3)?.unwrap_or_default(),
    })
}

fn ensure_bear_schema(conn: &Connection) -> StoreResult<()> {
    for &(table, columns) in REQUIRED_COLUMNS {
        if !table_exists(conn, table)? {
            return Err(StoreError::MissingRequiredTable(table));
        }
        for &column in columns {
            if !table_has_column(conn, table, column)? {
                return Err(StoreError::MissingRequiredColumn { table, column });
            }
        }
    }
    Ok(())
}
