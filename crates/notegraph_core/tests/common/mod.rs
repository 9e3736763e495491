#![allow(dead_code)]

use rusqlite::{params, Connection, OptionalExtension};
use std::path::{Path, PathBuf};

const BEAR_SCHEMA_SQL: &str = include_str!("../fixtures/bear_schema.sql");

pub fn bear_in_memory() -> Connection {
    let conn = Connection::open_in_memory().unwrap();
    conn.execute_batch(BEAR_SCHEMA_SQL).unwrap();
    conn
}

/// Creates an on-disk Bear-shaped database and returns its path.
pub fn bear_file(dir: &Path, fill: impl FnOnce(&Connection)) -> PathBuf {
    let path = dir.join("database.sqlite");
    let conn = Connection::open(&path).unwrap();
    conn.execute_batch(BEAR_SCHEMA_SQL).unwrap();
    fill(&conn);
    drop(conn);
    path
}

pub fn insert_note(conn: &Connection, id: i64, title: &str, text: &str, created_at: f64) {
    conn.execute(
        "INSERT INTO ZSFNOTE (Z_PK, ZUNIQUEIDENTIFIER, ZTITLE, ZTEXT, ZTRASHED, ZCREATIONDATE)
         VALUES (?1, ?2, ?3, ?4, 0, ?5);",
        params![id, format!("NOTE-{id}"), title, text, created_at],
    )
    .unwrap();
}

pub fn trash_note(conn: &Connection, id: i64) {
    conn.execute("UPDATE ZSFNOTE SET ZTRASHED = 1 WHERE Z_PK = ?1;", [id])
        .unwrap();
}

pub fn tag_note(conn: &Connection, note_id: i64, tag_path: &str) {
    let existing: Option<i64> = conn
        .query_row(
            "SELECT Z_PK FROM ZSFNOTETAG WHERE ZTITLE = ?1;",
            [tag_path],
            |row| row.get(0),
        )
        .optional()
        .unwrap();
    let tag_id = match existing {
        Some(tag_id) => tag_id,
        None => {
            conn.execute("INSERT INTO ZSFNOTETAG (ZTITLE) VALUES (?1);", [tag_path])
                .unwrap();
            conn.last_insert_rowid()
        }
    };
    conn.execute(
        "INSERT OR IGNORE INTO Z_7TAGS (Z_7NOTES, Z_14TAGS) VALUES (?1, ?2);",
        params![note_id, tag_id],
    )
    .unwrap();
}

/// Records that `source_id` links to `target_id`.
pub fn link_notes(conn: &Connection, source_id: i64, target_id: i64) {
    conn.execute(
        "INSERT OR IGNORE INTO Z_7LINKEDNOTES (Z_7LINKEDBYNOTES, Z_7LINKEDNOTES)
         VALUES (?1, ?2);",
        params![source_id, target_id],
    )
    .unwrap();
}
