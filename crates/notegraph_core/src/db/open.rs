//! Connection bootstrap for the external note store.
//!
//! # Responsibility
//! - Open the store file read-only.
//! - Configure connection pragmas required by graph builds.
//!
//! # Invariants
//! - A missing file is reported, never created.
//! - Returned connections reject writes (`query_only=ON`).

use super::{StoreError, StoreResult};
use log::{error, info};
use rusqlite::{Connection, OpenFlags};
use std::path::Path;
use std::time::{Duration, Instant};

const BUSY_TIMEOUT: Duration = Duration::from_secs(5);

/// Opens the note store at `path` in read-only mode.
///
/// # Side effects
/// - Emits `db_open` logging events with duration and status.
///
/// # Errors
/// - `DataSourceUnavailable` when the file does not exist, cannot be opened,
///   or is not a readable SQLite database.
pub fn open_note_store(path: impl AsRef<Path>) -> StoreResult<Connection> {
    let path = path.as_ref();
    let started_at = Instant::now();
    info!("event=db_open module=db status=start mode=read_only");

    let result = open_read_only(path);
    match &result {
        Ok(_) => info!(
            "event=db_open module=db status=ok mode=read_only duration_ms={}",
            started_at.elapsed().as_millis()
        ),
        Err(err) => error!(
            "event=db_open module=db status=error mode=read_only duration_ms={} error_code=store_unavailable error={}",
            started_at.elapsed().as_millis(),
            err
        ),
    }
    result
}

fn open_read_only(path: &Path) -> StoreResult<Connection> {
    let unavailable = |reason: String| StoreError::DataSourceUnavailable {
        path: path.to_path_buf(),
        reason,
    };

    if !path.is_file() {
        return Err(unavailable("file does not exist".to_string()));
    }

    let conn = Connection::open_with_flags(
        path,
        OpenFlags::SQLITE_OPEN_READ_ONLY | OpenFlags::SQLITE_OPEN_NO_MUTEX,
    )
    .map_err(|err| unavailable(err.to_string()))?;

    bootstrap_connection(&conn).map_err(|err| unavailable(err.to_string()))?;
    Ok(conn)
}

fn bootstrap_connection(conn: &Connection) -> StoreResult<()> {
    conn.busy_timeout(BUSY_TIMEOUT)?;
    conn.execute_batch("PRAGMA query_only = ON;")?;
    // Forces a header read so non-database files fail here, not mid-build.
    conn.query_row("SELECT COUNT(*) FROM sqlite_master;", [], |row| {
        row.get::<_, i64>(0)
    })?;
    Ok(())
}
