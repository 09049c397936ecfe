//! Connection bootstrap for the product store.
//!
//! # Responsibility
//! - Open file, read-only, or in-memory connections.
//! - Configure connection behavior and apply the schema before returning.
//!
//! # Invariants
//! - Read/write connections come back with the schema fully applied.
//! - Read-only connections never attempt schema changes; the store must
//!   already be initialized.

use super::migrations::{ensure_schema, latest_schema_version, schema_version};
use super::{DbError, DbResult};
use log::{error, info};
use rusqlite::{Connection, OpenFlags};
use std::path::Path;
use std::time::Duration;

const BUSY_TIMEOUT: Duration = Duration::from_secs(5);

/// Opens the file-backed product store, creating it on first use.
///
/// The returned connection is read/write and has all pending schema
/// versions applied. This is the handle the access facade holds for the
/// lifetime of the process.
///
/// # Errors
/// - [`DbError::Unavailable`] when the backing file cannot be created or
///   opened.
/// - [`DbError::UnsupportedSchemaVersion`] when the store was written by
///   a newer schema than this binary supports.
pub fn open_db(path: impl AsRef<Path>) -> DbResult<Connection> {
    let path = path.as_ref();

    let mut conn = Connection::open(path).map_err(|source| {
        error!(
            "event=db_open module=db status=error mode=file path={} error={source}",
            path.display()
        );
        DbError::Unavailable {
            path: path.to_path_buf(),
            source,
        }
    })?;

    bootstrap(&mut conn)?;
    info!(
        "event=db_open module=db status=ok mode=file path={} schema_version={}",
        path.display(),
        latest_schema_version()
    );
    Ok(conn)
}

/// Opens an existing store without write access.
///
/// Acquisition-mode counterpart of [`open_db`] for callers that only
/// read. The store must already exist and be initialized; this function
/// never creates the file or applies schema changes.
pub fn open_db_read_only(path: impl AsRef<Path>) -> DbResult<Connection> {
    let path = path.as_ref();

    let conn = Connection::open_with_flags(path, OpenFlags::SQLITE_OPEN_READ_ONLY).map_err(
        |source| {
            error!(
                "event=db_open module=db status=error mode=read_only path={} error={source}",
                path.display()
            );
            DbError::Unavailable {
                path: path.to_path_buf(),
                source,
            }
        },
    )?;

    conn.busy_timeout(BUSY_TIMEOUT)?;
    let version = schema_version(&conn)?;
    if version > latest_schema_version() {
        return Err(DbError::UnsupportedSchemaVersion {
            db_version: version,
            latest_supported: latest_schema_version(),
        });
    }

    info!(
        "event=db_open module=db status=ok mode=read_only path={} schema_version={version}",
        path.display()
    );
    Ok(conn)
}

/// Opens an in-memory product store with the schema applied.
pub fn open_db_in_memory() -> DbResult<Connection> {
    let mut conn = Connection::open_in_memory()?;
    bootstrap(&mut conn)?;
    info!("event=db_open module=db status=ok mode=memory");
    Ok(conn)
}

fn bootstrap(conn: &mut Connection) -> DbResult<()> {
    conn.busy_timeout(BUSY_TIMEOUT)?;
    ensure_schema(conn)?;
    Ok(())
}
