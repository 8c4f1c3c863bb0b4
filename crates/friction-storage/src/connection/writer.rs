//! Transaction helper for per-game atomic writes.

use friction_core::errors::StorageError;
use rusqlite::Connection;

/// Execute `f` inside a BEGIN IMMEDIATE transaction.
/// The transaction rolls back when `f` fails or the commit does.
pub fn with_immediate_transaction<F, T>(conn: &Connection, f: F) -> Result<T, StorageError>
where
    F: FnOnce(&rusqlite::Transaction<'_>) -> Result<T, StorageError>,
{
    conn.execute_batch("BEGIN IMMEDIATE")
        .map_err(|e| StorageError::SqliteError {
            message: format!("failed to begin immediate transaction: {e}"),
        })?;

    // The BEGIN above already opened the transaction; this only wraps it so
    // that dropping without commit issues a ROLLBACK.
    let tx = conn
        .unchecked_transaction()
        .map_err(|e| StorageError::SqliteError {
            message: format!("failed to wrap transaction: {e}"),
        })?;

    let result = f(&tx)?;

    tx.commit().map_err(|e| StorageError::SqliteError {
        message: format!("failed to commit: {e}"),
    })?;

    Ok(result)
}
