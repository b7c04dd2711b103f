use anyhow::Context;
use rusqlite::{params, Connection};
use shadowflight_execution::{HistoryStore, StoreError};
use shadowflight_types::HistoryEntry;
use std::path::Path;
use tracing::debug;

/// Round history kept in a SQLite database.
///
/// Rows are stored newest-first by `position`; every save replaces the table
/// contents in one transaction.
pub struct SqliteHistoryStore {
    conn: Connection,
}

impl SqliteHistoryStore {
    pub fn open(path: &Path) -> anyhow::Result<Self> {
        let conn = Connection::open(path).context("open history db")?;
        init_schema_sqlite(&conn)?;
        Ok(Self { conn })
    }

    pub fn open_in_memory() -> anyhow::Result<Self> {
        let conn = Connection::open_in_memory().context("open in-memory history db")?;
        init_schema_sqlite(&conn)?;
        Ok(Self { conn })
    }

    pub fn count(&self) -> anyhow::Result<usize> {
        let count: i64 = self
            .conn
            .query_row("SELECT COUNT(*) FROM history", [], |row| row.get(0))
            .context("count history rows")?;
        Ok(count.max(0) as usize)
    }
}

fn init_schema_sqlite(conn: &Connection) -> anyhow::Result<()> {
    conn.execute_batch(
        "PRAGMA journal_mode=WAL;
         PRAGMA synchronous=NORMAL;
         CREATE TABLE IF NOT EXISTS history (
             position INTEGER PRIMARY KEY,
             id INTEGER NOT NULL,
             bet_amount REAL NOT NULL,
             cashed_out_at REAL,
             crash_multiplier REAL NOT NULL,
             profit REAL NOT NULL
         );",
    )
    .context("init history schema")?;
    Ok(())
}

fn io_error(err: rusqlite::Error) -> StoreError {
    StoreError::Io(err.to_string())
}

impl HistoryStore for SqliteHistoryStore {
    fn load(&mut self) -> Result<Vec<HistoryEntry>, StoreError> {
        let mut stmt = self
            .conn
            .prepare(
                "SELECT id, bet_amount, cashed_out_at, crash_multiplier, profit
                 FROM history ORDER BY position ASC",
            )
            .map_err(io_error)?;
        let rows = stmt
            .query_map([], |row| {
                Ok((
                    row.get::<_, i64>(0)?,
                    row.get::<_, f64>(1)?,
                    row.get::<_, Option<f64>>(2)?,
                    row.get::<_, f64>(3)?,
                    row.get::<_, f64>(4)?,
                ))
            })
            .map_err(io_error)?;

        let mut entries = Vec::new();
        for row in rows {
            let (id, bet_amount, cashed_out_at, crash_multiplier, profit) = row.map_err(io_error)?;
            let id = u64::try_from(id)
                .map_err(|_| StoreError::Encoding(format!("negative history id {id}")))?;
            entries.push(HistoryEntry {
                id,
                bet_amount,
                cashed_out_at,
                crash_multiplier,
                profit,
            });
        }
        debug!(entries = entries.len(), "history loaded");
        Ok(entries)
    }

    fn save(&mut self, entries: &[HistoryEntry]) -> Result<(), StoreError> {
        let tx = self.conn.transaction().map_err(io_error)?;
        tx.execute("DELETE FROM history", []).map_err(io_error)?;
        {
            let mut stmt = tx
                .prepare(
                    "INSERT INTO history (position, id, bet_amount, cashed_out_at, crash_multiplier, profit)
                     VALUES (?, ?, ?, ?, ?, ?)",
                )
                .map_err(io_error)?;
            for (position, entry) in entries.iter().enumerate() {
                let id = i64::try_from(entry.id)
                    .map_err(|_| StoreError::Encoding(format!("history id {} out of range", entry.id)))?;
                stmt.execute(params![
                    position as i64,
                    id,
                    entry.bet_amount,
                    entry.cashed_out_at,
                    entry.crash_multiplier,
                    entry.profit
                ])
                .map_err(io_error)?;
            }
        }
        tx.commit().map_err(io_error)
    }
}
