use r2d2::{ManageConnection, Pool, PooledConnection};
use r2d2_sqlite::SqliteConnectionManager;
use rusqlite::{Connection, OpenFlags};
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::error::{Error, Result};
use crate::model::{EntryId, ReferenceEntry, ScaledFeatureVector};
use crate::store::{CandidateStore, CandidateStream, CorpusStats, ScanFilter};

/// Columns the pipeline reads from the `proteins` table.
pub(crate) const REQUIRED_COLUMNS: [&str; 7] = [
    "id",
    "name",
    "sequence",
    "organism",
    "description",
    "sequence_length",
    "features",
];

/// Rows fetched per round trip while streaming.
const BATCH_SIZE: usize = 1024;

/// Read-only connections open at once. A scan holds one for its lifetime.
const MAX_CONNECTIONS: u32 = 8;

/// How long a scan waits for a free connection.
const CHECKOUT_TIMEOUT: Duration = Duration::from_secs(15);

type SqlitePool = Pool<SqliteConnectionManager>;
type SqliteConnection = PooledConnection<SqliteConnectionManager>;

/// A SQLite corpus opened read-only.
///
/// Each scan checks out its own pooled connection, so concurrent scans never
/// share a handle. The connection returns to the pool when the stream is
/// dropped.
#[derive(Debug)]
pub struct SqliteCorpus {
    path: PathBuf,
    pool: SqlitePool,
}

impl SqliteCorpus {
    /// Open an existing corpus and verify its schema.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Initialization`] when the file cannot be opened or
    /// lacks the `proteins` table.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        let manager = SqliteConnectionManager::file(&path)
            .with_flags(OpenFlags::SQLITE_OPEN_READ_ONLY | OpenFlags::SQLITE_OPEN_NO_MUTEX);

        // Fail fast on a missing or foreign file instead of waiting out the
        // pool's checkout timeout.
        let conn = manager.connect().map_err(|e| {
            Error::Initialization(format!("cannot open corpus {}: {e}", path.display()))
        })?;
        verify_schema(&conn).map_err(|e| {
            Error::Initialization(format!("corpus {}: {e}", path.display()))
        })?;

        let pool = Pool::builder()
            .max_size(MAX_CONNECTIONS)
            .min_idle(Some(0))
            .connection_timeout(CHECKOUT_TIMEOUT)
            .build(manager)
            .map_err(|e| {
                Error::Initialization(format!(
                    "cannot build connection pool for {}: {e}",
                    path.display()
                ))
            })?;

        log::info!("Opened corpus {} (read-only)", path.display());
        Ok(Self { path, pool })
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn checkout(&self) -> Result<SqliteConnection> {
        Ok(self.pool.get()?)
    }
}

impl CandidateStore for SqliteCorpus {
    fn scan(&self, filter: ScanFilter, limit: usize) -> Result<CandidateStream<'_>> {
        let conn = self.checkout()?;
        Ok(Box::new(SqliteStream {
            conn,
            filter,
            remaining: limit,
            last_rowid: i64::MIN,
            buffer: Vec::new().into_iter(),
            exhausted: false,
        }))
    }

    fn stats(&self) -> Result<CorpusStats> {
        let conn = self.checkout()?;
        let (entries, min_length, max_length) = conn.query_row(
            "SELECT COUNT(*), MIN(sequence_length), MAX(sequence_length) FROM proteins",
            [],
            |row| {
                Ok((
                    row.get::<_, i64>(0)?,
                    row.get::<_, Option<i64>>(1)?,
                    row.get::<_, Option<i64>>(2)?,
                ))
            },
        )?;
        Ok(CorpusStats {
            entries: u64::try_from(entries).unwrap_or(0),
            min_length: min_length.and_then(|v| u32::try_from(v).ok()),
            max_length: max_length.and_then(|v| u32::try_from(v).ok()),
        })
    }
}

/// Keyset-paginated scan over `rowid`, one batch at a time.
struct SqliteStream {
    conn: SqliteConnection,
    filter: ScanFilter,
    remaining: usize,
    last_rowid: i64,
    buffer: std::vec::IntoIter<ReferenceEntry>,
    exhausted: bool,
}

impl SqliteStream {
    fn fetch_batch(&mut self) -> Result<()> {
        let wanted = self.remaining.min(BATCH_SIZE);
        let rows = fetch_rows(&self.conn, self.filter, self.last_rowid, wanted)?;
        if rows.len() < wanted {
            self.exhausted = true;
        }
        if let Some(last) = rows.last() {
            self.last_rowid = last.rowid;
        }
        let entries = rows
            .into_iter()
            .map(RawRow::into_entry)
            .collect::<Result<Vec<_>>>()?;
        self.buffer = entries.into_iter();
        Ok(())
    }
}

impl Iterator for SqliteStream {
    type Item = Result<ReferenceEntry>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            if self.remaining == 0 {
                return None;
            }
            if let Some(entry) = self.buffer.next() {
                self.remaining -= 1;
                return Some(Ok(entry));
            }
            if self.exhausted {
                return None;
            }
            if let Err(e) = self.fetch_batch() {
                self.exhausted = true;
                self.remaining = 0;
                return Some(Err(e));
            }
        }
    }
}

/// A row as stored, before vector decoding.
struct RawRow {
    rowid: i64,
    id: String,
    name: String,
    sequence: String,
    organism: Option<String>,
    description: Option<String>,
    sequence_length: i64,
    features: String,
}

impl RawRow {
    fn from_row(row: &rusqlite::Row) -> rusqlite::Result<Self> {
        Ok(Self {
            rowid: row.get(0)?,
            id: row.get(1)?,
            name: row.get(2)?,
            sequence: row.get(3)?,
            organism: row.get(4)?,
            description: row.get(5)?,
            sequence_length: row.get(6)?,
            features: row.get(7)?,
        })
    }

    fn into_entry(self) -> Result<ReferenceEntry> {
        let sequence_length = u32::try_from(self.sequence_length).map_err(|_| {
            Error::InvalidData(format!(
                "entry {}: invalid sequence_length {}",
                self.id, self.sequence_length
            ))
        })?;
        let values: Vec<f64> = serde_json::from_str(&self.features).map_err(|e| {
            Error::InvalidData(format!("entry {}: malformed features: {e}", self.id))
        })?;
        let features = ScaledFeatureVector::from_slice(&values)
            .map_err(|e| Error::InvalidData(format!("entry {}: {e}", self.id)))?;

        Ok(ReferenceEntry {
            id: EntryId::from(self.id),
            name: self.name,
            sequence: self.sequence,
            organism: self.organism.unwrap_or_default(),
            description: self.description.unwrap_or_default(),
            sequence_length,
            features,
        })
    }
}

fn fetch_rows(
    conn: &Connection,
    filter: ScanFilter,
    after_rowid: i64,
    limit: usize,
) -> Result<Vec<RawRow>> {
    let limit = i64::try_from(limit).unwrap_or(i64::MAX);
    let rows = match filter {
        ScanFilter::All => {
            let mut stmt = conn.prepare_cached(
                "SELECT rowid, id, name, sequence, organism, description,
                        sequence_length, features
                 FROM proteins
                 WHERE rowid > ?1
                 ORDER BY rowid
                 LIMIT ?2",
            )?;
            let rows = stmt
                .query_map(rusqlite::params![after_rowid, limit], RawRow::from_row)?
                .collect::<rusqlite::Result<Vec<_>>>()?;
            rows
        }
        ScanFilter::LengthWindow { min_len, max_len } => {
            let mut stmt = conn.prepare_cached(
                "SELECT rowid, id, name, sequence, organism, description,
                        sequence_length, features
                 FROM proteins
                 WHERE rowid > ?1 AND sequence_length BETWEEN ?3 AND ?4
                 ORDER BY rowid
                 LIMIT ?2",
            )?;
            let rows = stmt
                .query_map(
                    rusqlite::params![after_rowid, limit, i64::from(min_len), i64::from(max_len)],
                    RawRow::from_row,
                )?
                .collect::<rusqlite::Result<Vec<_>>>()?;
            rows
        }
    };
    Ok(rows)
}

fn verify_schema(conn: &Connection) -> Result<()> {
    let mut stmt = conn.prepare("SELECT name FROM pragma_table_info('proteins')")?;
    let columns = stmt
        .query_map([], |row| row.get::<_, String>(0))?
        .collect::<rusqlite::Result<Vec<_>>>()?;

    if columns.is_empty() {
        return Err(Error::InvalidData("missing table `proteins`".to_string()));
    }
    let missing: Vec<&str> = REQUIRED_COLUMNS
        .iter()
        .copied()
        .filter(|required| !columns.iter().any(|c| c == required))
        .collect();
    if !missing.is_empty() {
        return Err(Error::InvalidData(format!(
            "table `proteins` lacks columns: {}",
            missing.join(", ")
        )));
    }
    Ok(())
}
