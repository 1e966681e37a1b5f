//! SQLite storage implementation
//!
//! This module provides a SQLite-based implementation of the SiteStore trait.

use crate::state::SiteStatus;
use crate::storage::schema::initialize_schema;
use crate::storage::traits::{SiteStore, StorageError, StorageResult};
use crate::storage::{ClaimedSite, CrawlJob, UrlMatch};
use chrono::Utc;
use rusqlite::types::Type;
use rusqlite::{params, Connection, OptionalExtension, Row, TransactionBehavior};
use std::collections::HashMap;
use std::path::Path;
use std::sync::{Mutex, MutexGuard};

const SITE_COLUMNS: &str = "id, name, url, data, status, progress, created_at, updated_at";

/// SQLite site store
///
/// One connection is shared by every caller; the mutex makes each trait
/// method a critical section, and multi-statement operations additionally
/// run inside an immediate transaction.
pub struct SqliteSiteStore {
    conn: Mutex<Connection>,
}

impl SqliteSiteStore {
    /// Opens or creates a database file
    ///
    /// # Arguments
    ///
    /// * `path` - Path to the SQLite database file
    ///
    /// # Returns
    ///
    /// * `Ok(SqliteSiteStore)` - Successfully opened/created database
    /// * `Err(HarvestError)` - Failed to open database
    pub fn new(path: &Path) -> crate::Result<Self> {
        let conn = Connection::open(path)?;

        conn.execute_batch(
            "
            PRAGMA journal_mode = WAL;
            PRAGMA synchronous = NORMAL;
            PRAGMA temp_store = MEMORY;
            PRAGMA busy_timeout = 5000;
        ",
        )?;

        initialize_schema(&conn)?;

        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    /// Creates an in-memory database
    pub fn open_in_memory() -> crate::Result<Self> {
        let conn = Connection::open_in_memory()?;
        initialize_schema(&conn)?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    fn lock(&self) -> StorageResult<MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|_| StorageError::Database("connection mutex poisoned".to_string()))
    }
}

fn now() -> String {
    Utc::now().to_rfc3339()
}

/// Reads a status column, rejecting strings no status maps to
fn status_column(row: &Row<'_>, idx: usize) -> rusqlite::Result<SiteStatus> {
    let raw: String = row.get(idx)?;
    SiteStatus::from_db_string(&raw).ok_or_else(|| {
        rusqlite::Error::FromSqlConversionFailure(
            idx,
            Type::Text,
            format!("unknown site status '{}'", raw).into(),
        )
    })
}

fn row_to_job(row: &Row<'_>) -> rusqlite::Result<CrawlJob> {
    Ok(CrawlJob {
        id: row.get(0)?,
        name: row.get(1)?,
        url: row.get(2)?,
        metadata: row.get(3)?,
        status: status_column(row, 4)?,
        progress: row.get(5)?,
        created_at: row.get(6)?,
        updated_at: row.get(7)?,
    })
}

impl SiteStore for SqliteSiteStore {
    // ===== Intake =====

    fn insert_site(&self, name: &str, url: &str, metadata: &str) -> StorageResult<i64> {
        let conn = self.lock()?;
        let now = now();
        conn.execute(
            "INSERT INTO sites (name, url, data, status, progress, created_at, updated_at)
             VALUES (?1, ?2, ?3, ?4, '', ?5, ?5)",
            params![
                name,
                url,
                metadata,
                SiteStatus::Pending.to_db_string(),
                now
            ],
        )?;
        Ok(conn.last_insert_rowid())
    }

    // ===== Queue =====

    fn claim_pending(&self, batch_size: usize) -> StorageResult<Vec<ClaimedSite>> {
        let mut conn = self.lock()?;
        let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;

        let claimed = {
            let mut stmt =
                tx.prepare("SELECT id, url FROM sites WHERE status = ?1 ORDER BY id LIMIT ?2")?;
            let rows = stmt
                .query_map(
                    params![SiteStatus::Pending.to_db_string(), batch_size as i64],
                    |row| {
                        Ok(ClaimedSite {
                            id: row.get(0)?,
                            url: row.get(1)?,
                        })
                    },
                )?
                .collect::<Result<Vec<_>, _>>()?;
            rows
        };

        let now = now();
        for site in &claimed {
            tx.execute(
                "UPDATE sites SET status = ?1, updated_at = ?2 WHERE id = ?3",
                params![SiteStatus::Scheduled.to_db_string(), now, site.id],
            )?;
        }

        tx.commit()?;
        Ok(claimed)
    }

    fn find_by_url(&self, url: &str) -> StorageResult<Vec<UrlMatch>> {
        let conn = self.lock()?;
        let mut stmt = conn.prepare("SELECT id, status FROM sites WHERE url = ?1 ORDER BY id")?;

        let matches = stmt
            .query_map(params![url], |row| {
                Ok(UrlMatch {
                    id: row.get(0)?,
                    status: status_column(row, 1)?,
                })
            })?
            .collect::<Result<Vec<_>, _>>()?;

        Ok(matches)
    }

    fn mark_duplicate(&self, id: i64) -> StorageResult<bool> {
        let mut conn = self.lock()?;
        let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;

        let url: Option<String> = tx
            .query_row("SELECT url FROM sites WHERE id = ?1", params![id], |row| {
                row.get(0)
            })
            .optional()?;
        let url = url.ok_or(StorageError::SiteNotFound(id))?;

        let blocked: bool = tx.query_row(
            "SELECT EXISTS (
                 SELECT 1 FROM sites WHERE url = ?1 AND id != ?2 AND status IN (?3, ?4)
             )",
            params![
                url,
                id,
                SiteStatus::Processing.to_db_string(),
                SiteStatus::Done.to_db_string()
            ],
            |row| row.get(0),
        )?;

        if blocked {
            tx.execute(
                "UPDATE sites SET status = ?1, updated_at = ?2 WHERE id = ?3",
                params![SiteStatus::Duplicate.to_db_string(), now(), id],
            )?;
        }

        tx.commit()?;
        Ok(blocked)
    }

    fn get_by_id(&self, id: i64) -> StorageResult<CrawlJob> {
        let conn = self.lock()?;
        let job = conn
            .query_row(
                &format!("SELECT {} FROM sites WHERE id = ?1", SITE_COLUMNS),
                params![id],
                row_to_job,
            )
            .optional()?;

        job.ok_or(StorageError::SiteNotFound(id))
    }

    fn update_status(&self, id: i64, status: SiteStatus, progress: &str) -> StorageResult<()> {
        let conn = self.lock()?;
        let updated = conn.execute(
            "UPDATE sites SET status = ?1, progress = ?2, updated_at = ?3 WHERE id = ?4",
            params![status.to_db_string(), progress, now(), id],
        )?;
        if updated == 0 {
            return Err(StorageError::SiteNotFound(id));
        }
        Ok(())
    }

    fn reset_status(&self, id: i64) -> StorageResult<()> {
        let mut conn = self.lock()?;
        let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;

        let current: Option<String> = tx
            .query_row(
                "SELECT status FROM sites WHERE id = ?1",
                params![id],
                |row| row.get(0),
            )
            .optional()?;
        let current = current.ok_or(StorageError::SiteNotFound(id))?;

        // An unrecognised status can only come from a manual edit; resetting repairs it
        match SiteStatus::from_db_string(&current) {
            Some(status) if !status.is_terminal() => {
                return Err(StorageError::InvalidTransition {
                    from: status,
                    to: SiteStatus::Pending,
                });
            }
            Some(_) => {}
            None => tracing::warn!(site_id = id, status = %current, "Resetting site with unknown status"),
        }

        tx.execute(
            "UPDATE sites SET status = ?1, progress = '', updated_at = ?2 WHERE id = ?3",
            params![SiteStatus::Pending.to_db_string(), now(), id],
        )?;
        tx.commit()?;
        Ok(())
    }

    // ===== Blobs =====

    fn put_blob(&self, name: &str, data: &[u8]) -> StorageResult<()> {
        let conn = self.lock()?;
        conn.execute(
            "INSERT INTO raw_data (name, data) VALUES (?1, ?2)
             ON CONFLICT(name) DO UPDATE SET data = excluded.data",
            params![name, data],
        )?;
        Ok(())
    }

    fn get_blob(&self, name: &str) -> StorageResult<Vec<u8>> {
        let conn = self.lock()?;
        let data: Option<Vec<u8>> = conn
            .query_row(
                "SELECT data FROM raw_data WHERE name = ?1",
                params![name],
                |row| row.get(0),
            )
            .optional()?;

        data.ok_or_else(|| StorageError::BlobNotFound(name.to_string()))
    }

    // ===== Listing =====

    fn list_sites(&self) -> StorageResult<Vec<CrawlJob>> {
        let conn = self.lock()?;
        let mut stmt = conn.prepare(&format!("SELECT {} FROM sites ORDER BY id", SITE_COLUMNS))?;

        let sites = stmt
            .query_map([], row_to_job)?
            .collect::<Result<Vec<_>, _>>()?;

        Ok(sites)
    }

    fn count_by_status(&self) -> StorageResult<HashMap<SiteStatus, u64>> {
        let conn = self.lock()?;
        let mut stmt = conn.prepare("SELECT status, COUNT(*) FROM sites GROUP BY status")?;

        let mut counts = HashMap::new();
        let rows = stmt.query_map([], |row| {
            let status: String = row.get(0)?;
            let count: i64 = row.get(1)?;
            Ok((status, count))
        })?;

        for row in rows {
            let (status, count) = row?;
            match SiteStatus::from_db_string(&status) {
                Some(status) => *counts.entry(status).or_insert(0) += count as u64,
                None => tracing::warn!(status = %status, count, "Skipping unknown site status"),
            }
        }

        Ok(counts)
    }
}
