//! SQLite-backed store for imported traces.
//!
//! All writes of one import go through a single `ImportTransaction`. If the
//! import fails before `commit`, the transaction rolls back on drop and the
//! previously committed contents of the file are left as they were.

use super::schema::{
    StoredFrame, StoredSample, DROP_TRACE_SQL, INSERT_FRAME_SQL, INSERT_SAMPLE_SQL, PRAGMAS_SQL,
    REQUIRED_TABLES, SCHEMA_SQL, UPSERT_METADATA_SQL,
};
use crate::aggregator::FrameSink;
use crate::parser::{FrameRecord, SampleRecord};
use crate::utils::error::StoreError;
use log::debug;
use rusqlite::{params, Connection, OpenFlags, OptionalExtension, Row, Transaction};
use std::collections::{BTreeMap, HashSet};
use std::path::{Path, PathBuf};

/// Handle to one store file (or an in-memory database)
pub struct Store {
    conn: Connection,
    path: Option<PathBuf>,
}

impl Store {
    /// Open or create a store for writing
    ///
    /// **Public** - used by the importer
    ///
    /// The full schema is created if missing, so a fresh store can be
    /// queried straight away and returns empty results.
    ///
    /// # Errors
    /// * `StoreError::Open` - the file cannot be created or configured
    pub fn create(path: impl AsRef<Path>) -> Result<Self, StoreError> {
        let path = path.as_ref();
        debug!("Opening store for writing: {}", path.display());

        let open_err = |source| StoreError::Open {
            path: path.to_path_buf(),
            source,
        };

        let conn = Connection::open(path).map_err(open_err)?;
        conn.execute_batch(PRAGMAS_SQL).map_err(open_err)?;
        conn.execute_batch(SCHEMA_SQL).map_err(open_err)?;

        Ok(Self {
            conn,
            path: Some(path.to_path_buf()),
        })
    }

    /// Create a store that lives only in memory
    pub fn open_in_memory() -> Result<Self, StoreError> {
        let conn = Connection::open_in_memory()?;
        conn.execute_batch(PRAGMAS_SQL)?;
        conn.execute_batch(SCHEMA_SQL)?;
        Ok(Self { conn, path: None })
    }

    /// Open an existing store for queries only
    ///
    /// **Public** - used by the analyze command
    ///
    /// # Errors
    /// * `StoreError::NotFound` - no file at `path`
    /// * `StoreError::Open` - the file cannot be opened
    /// * `StoreError::SchemaMissing` - a required table is absent
    pub fn open_read_only(path: impl AsRef<Path>) -> Result<Self, StoreError> {
        let path = path.as_ref();
        if !path.is_file() {
            return Err(StoreError::NotFound(path.to_path_buf()));
        }

        debug!("Opening store read-only: {}", path.display());
        let flags = OpenFlags::SQLITE_OPEN_READ_ONLY | OpenFlags::SQLITE_OPEN_NO_MUTEX;
        let conn = Connection::open_with_flags(path, flags).map_err(|source| StoreError::Open {
            path: path.to_path_buf(),
            source,
        })?;

        let store = Self {
            conn,
            path: Some(path.to_path_buf()),
        };
        store.validate_schema()?;
        Ok(store)
    }

    /// Check that every table the queries need is present
    pub fn validate_schema(&self) -> Result<(), StoreError> {
        let mut stmt = self
            .conn
            .prepare("SELECT name FROM sqlite_master WHERE type = 'table'")?;
        let tables = stmt
            .query_map([], |row| row.get::<_, String>(0))?
            .collect::<Result<HashSet<_>, _>>()?;

        match REQUIRED_TABLES.iter().find(|table| !tables.contains(**table)) {
            Some(table) => Err(StoreError::SchemaMissing { table: *table }),
            None => Ok(()),
        }
    }

    /// Start an import, discarding previously imported samples and frames
    ///
    /// The reset happens inside the returned transaction, so nothing changes
    /// on disk unless the import commits.
    pub fn begin_import(&mut self) -> Result<ImportTransaction<'_>, StoreError> {
        let tx = self.conn.transaction()?;
        tx.execute_batch(DROP_TRACE_SQL)?;
        tx.execute_batch(SCHEMA_SQL)?;
        Ok(ImportTransaction { tx })
    }

    /// Location of the backing file, `None` for in-memory stores
    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    pub(crate) fn connection(&self) -> &Connection {
        &self.conn
    }

    pub fn sample_count(&self) -> Result<u64, StoreError> {
        count_rows(&self.conn, "SELECT COUNT(*) FROM perf_samples")
    }

    pub fn frame_count(&self) -> Result<u64, StoreError> {
        count_rows(&self.conn, "SELECT COUNT(*) FROM call_stacks")
    }

    /// Look up one sample by id
    pub fn sample(&self, id: i64) -> Result<Option<StoredSample>, StoreError> {
        let sample = self
            .conn
            .query_row(
                "SELECT id, timestamp, pid, tid, comm, raw_line FROM perf_samples WHERE id = ?1",
                [id],
                sample_from_row,
            )
            .optional()?;
        Ok(sample)
    }

    /// Frames of one sample in level order
    pub fn frames_for_sample(&self, sample_id: i64) -> Result<Vec<StoredFrame>, StoreError> {
        let mut stmt = self.conn.prepare_cached(
            "SELECT id, sample_id, level, ip, symbol, dso FROM call_stacks \
             WHERE sample_id = ?1 ORDER BY level",
        )?;
        let frames = stmt
            .query_map([sample_id], |row| {
                Ok(StoredFrame {
                    id: row.get(0)?,
                    sample_id: row.get(1)?,
                    level: row.get(2)?,
                    ip: row.get(3)?,
                    symbol: row.get(4)?,
                    dso: row.get::<_, Option<String>>(5)?.unwrap_or_default(),
                })
            })?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(frames)
    }

    /// Samples of one process in import order
    pub fn samples_for_pid(&self, pid: u32) -> Result<Vec<StoredSample>, StoreError> {
        let mut stmt = self.conn.prepare_cached(
            "SELECT id, timestamp, pid, tid, comm, raw_line FROM perf_samples \
             WHERE pid = ?1 ORDER BY id",
        )?;
        let samples = stmt
            .query_map([pid], sample_from_row)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(samples)
    }

    /// All metadata pairs, keyed by name
    pub fn metadata(&self) -> Result<BTreeMap<String, String>, StoreError> {
        let mut stmt = self.conn.prepare("SELECT key, value FROM metadata")?;
        let pairs = stmt
            .query_map([], |row| {
                Ok((
                    row.get::<_, String>(0)?,
                    row.get::<_, Option<String>>(1)?.unwrap_or_default(),
                ))
            })?
            .collect::<Result<BTreeMap<_, _>, _>>()?;
        Ok(pairs)
    }
}

/// Write side of one import run
pub struct ImportTransaction<'a> {
    tx: Transaction<'a>,
}

impl ImportTransaction<'_> {
    /// Insert a sample and return its surrogate id
    pub fn insert_sample(&mut self, sample: &SampleRecord) -> Result<i64, StoreError> {
        self.tx.prepare_cached(INSERT_SAMPLE_SQL)?.execute(params![
            sample.timestamp,
            sample.pid,
            sample.tid,
            sample.comm,
            sample.raw_line,
        ])?;
        Ok(self.tx.last_insert_rowid())
    }

    pub fn insert_frame(
        &mut self,
        sample_id: i64,
        level: u32,
        frame: &FrameRecord,
    ) -> Result<(), StoreError> {
        self.tx.prepare_cached(INSERT_FRAME_SQL)?.execute(params![
            sample_id,
            level,
            frame.ip,
            frame.symbol,
            frame.dso,
        ])?;
        Ok(())
    }

    /// Insert or overwrite one metadata key
    pub fn upsert_metadata(&mut self, key: &str, value: &str) -> Result<(), StoreError> {
        self.tx
            .prepare_cached(UPSERT_METADATA_SQL)?
            .execute(params![key, value])?;
        Ok(())
    }

    /// Make the import durable
    pub fn commit(self) -> Result<(), StoreError> {
        self.tx.commit()?;
        Ok(())
    }
}

impl FrameSink for ImportTransaction<'_> {
    type Error = StoreError;

    fn write_sample(&mut self, sample: &SampleRecord) -> Result<i64, Self::Error> {
        self.insert_sample(sample)
    }

    fn write_frame(
        &mut self,
        sample_id: i64,
        level: u32,
        frame: &FrameRecord,
    ) -> Result<(), Self::Error> {
        self.insert_frame(sample_id, level, frame)
    }
}

fn sample_from_row(row: &Row<'_>) -> rusqlite::Result<StoredSample> {
    Ok(StoredSample {
        id: row.get(0)?,
        timestamp: row.get(1)?,
        pid: row.get(2)?,
        tid: row.get(3)?,
        comm: row.get(4)?,
        raw_line: row.get::<_, Option<String>>(5)?.unwrap_or_default(),
    })
}

fn count_rows(conn: &Connection, sql: &str) -> Result<u64, StoreError> {
    let count: i64 = conn.query_row(sql, [], |row| row.get(0))?;
    Ok(u64::try_from(count).unwrap_or(0))
}
