//! Batched inserts for ZIP imports.

use rusqlite::{Connection, ErrorCode};
use tracing::{debug, warn};

use super::store::insert_zip;
use crate::error::{Error, Result};
use crate::models::Zip;

/// Bulk inserter committing one transaction per batch
pub struct BulkInserter<'c> {
    conn: &'c Connection,
    batch_size: usize,
    buffer: Vec<Zip>,
    total_inserted: usize,
    total_rejected: usize,
}

impl<'c> BulkInserter<'c> {
    /// Create a new bulk inserter
    pub fn new(conn: &'c Connection, batch_size: usize) -> Self {
        let batch_size = batch_size.max(1);
        Self {
            conn,
            batch_size,
            buffer: Vec::with_capacity(batch_size),
            total_inserted: 0,
            total_rejected: 0,
        }
    }

    /// Add a record to the buffer, flushing if batch is full
    pub fn add(&mut self, zip: Zip) -> Result<()> {
        self.buffer.push(zip);

        if self.buffer.len() >= self.batch_size {
            self.flush()?;
        }

        Ok(())
    }

    /// Write the buffer in a single transaction.
    ///
    /// Rows failing validation or a table constraint are counted as rejected.
    /// Any other error leaves the batch buffered and is returned. Inside an
    /// open transaction the rows join it instead of starting their own, and
    /// undoing a failed batch is up to that transaction's owner.
    pub fn flush(&mut self) -> Result<()> {
        if self.buffer.is_empty() {
            return Ok(());
        }

        let count = self.buffer.len();
        debug!("Flushing {} records to SQLite", count);

        let conn = self.conn;
        let tx = if conn.is_autocommit() {
            Some(conn.unchecked_transaction()?)
        } else {
            None
        };
        let mut rejected = 0;

        for zip in &self.buffer {
            // A failed row rolls back only its own statement
            match insert_zip(conn, zip) {
                Ok(_) => {}
                Err(e) if is_rejection(&e) => {
                    warn!("Rejected {}: {}", zip, e);
                    rejected += 1;
                }
                Err(e) => return Err(e),
            }
        }

        if let Some(tx) = tx {
            tx.commit()?;
        }

        if rejected > 0 {
            warn!("Batch had {} rejected rows out of {}", rejected, count);
        }

        self.total_inserted += count - rejected;
        self.total_rejected += rejected;
        self.buffer.clear();

        Ok(())
    }

    /// Finish inserting and return (inserted, rejected)
    pub fn finish(mut self) -> Result<(usize, usize)> {
        self.flush()?;
        Ok((self.total_inserted, self.total_rejected))
    }

    /// Get current statistics
    pub fn stats(&self) -> (usize, usize) {
        (self.total_inserted, self.total_rejected)
    }
}

/// Errors caused by the row itself rather than the database
fn is_rejection(err: &Error) -> bool {
    match err {
        Error::InvalidRecord(_) | Error::InvalidCoordinate { .. } => true,
        Error::Sqlite(rusqlite::Error::SqliteFailure(e, _)) => {
            e.code == ErrorCode::ConstraintViolation
        }
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Location, UsState};
    use crate::storage::{create_schema, ZipStore};

    fn zip(code: &str) -> Zip {
        Zip::new(code, "Springfield", UsState::Illinois, Location::new(-89.65, 39.78)).unwrap()
    }

    #[test]
    fn test_flushes_in_batches() {
        let store = ZipStore::open_in_memory().unwrap();
        let mut inserter = BulkInserter::new(store.connection(), 2);

        inserter.add(zip("62701")).unwrap();
        assert_eq!(inserter.stats(), (0, 0));
        inserter.add(zip("62702")).unwrap();
        assert_eq!(inserter.stats(), (2, 0));
        inserter.add(zip("62703")).unwrap();

        assert_eq!(inserter.finish().unwrap(), (3, 0));
        assert_eq!(store.count().unwrap(), 3);
    }

    #[test]
    fn test_counts_rejected_rows() {
        let store = ZipStore::open_in_memory().unwrap();
        let mut inserter = BulkInserter::new(store.connection(), 10);

        let mut bad = zip("62704");
        bad.longitude = -500.0;

        inserter.add(zip("62701")).unwrap();
        inserter.add(bad).unwrap();

        assert_eq!(inserter.finish().unwrap(), (1, 1));
        assert_eq!(store.count().unwrap(), 1);
    }

    #[test]
    fn test_engine_error_keeps_batch() {
        let store = ZipStore::open_in_memory().unwrap();
        store.connection().execute_batch("DROP TABLE zips").unwrap();

        let mut inserter = BulkInserter::new(store.connection(), 10);
        inserter.add(zip("62701")).unwrap();
        inserter.add(zip("62702")).unwrap();

        assert!(matches!(inserter.flush(), Err(Error::Sqlite(_))));
        assert_eq!(inserter.stats(), (0, 0));

        create_schema(store.connection()).unwrap();
        assert_eq!(inserter.finish().unwrap(), (2, 0));
        assert_eq!(store.count().unwrap(), 2);
    }

    #[test]
    fn test_constraint_violation_is_rejected() {
        let store = ZipStore::open_in_memory().unwrap();
        store
            .connection()
            .execute_batch("CREATE UNIQUE INDEX zips_code_unique ON zips(code)")
            .unwrap();

        let mut inserter = BulkInserter::new(store.connection(), 10);
        inserter.add(zip("62701")).unwrap();
        inserter.add(zip("62701")).unwrap();

        assert_eq!(inserter.finish().unwrap(), (1, 1));
        assert_eq!(store.count().unwrap(), 1);
    }

    #[test]
    fn test_joins_open_transaction() {
        let store = ZipStore::open_in_memory().unwrap();
        let tx = store.connection().unchecked_transaction().unwrap();

        let mut inserter = BulkInserter::new(&tx, 1);
        inserter.add(zip("62701")).unwrap();
        inserter.add(zip("62702")).unwrap();
        assert_eq!(inserter.finish().unwrap(), (2, 0));

        drop(tx);
        assert_eq!(store.count().unwrap(), 0);
    }
}
