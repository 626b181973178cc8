//! SQLite implementation of SayingStorage trait

use std::path::Path;
use std::time::Duration;

use actix_web::Error;
use actix_web::error::ErrorInternalServerError;
use log::{debug, info, warn};
use r2d2::{Pool, PooledConnection};
use r2d2_sqlite::SqliteConnectionManager;
use rusqlite::{params, TransactionBehavior};

use crate::config::StoreConfig;
use crate::sayings::{saying_not_found, KeyFn, Saying, SayingId, SayingStorage};

const CREATE_TABLE: &str = "CREATE TABLE IF NOT EXISTS sayings (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    date TEXT NOT NULL,
    saying TEXT NOT NULL
)";

const BUSY_TIMEOUT: Duration = Duration::from_secs(5);

type PooledConn = PooledConnection<SqliteConnectionManager>;

/// SQLite implementation of SayingStorage backed by a connection pool
pub struct SQLiteSayingStore {
    pool: Pool<SqliteConnectionManager>,
}

impl SQLiteSayingStore {
    /// Open (and if needed create) the `sayings` table at the configured path
    pub fn open(config: &StoreConfig) -> Result<Self, Error> {
        let db_path = Path::new(&config.db_path);
        if let Some(parent) = db_path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent).map_err(ErrorInternalServerError)?;
            }
        }

        let wal_mode = config.wal_mode;
        let manager = SqliteConnectionManager::file(db_path).with_init(move |conn| {
            conn.busy_timeout(BUSY_TIMEOUT)?;
            if wal_mode {
                conn.pragma_update_and_check(None, "journal_mode", "WAL", |row| row.get::<_, String>(0))?;
            }
            Ok(())
        });

        let pool = Pool::builder()
            .max_size(config.pool_size.max(1))
            .build(manager)
            .map_err(|e| {
                warn!("Failed to open saying database {}: {}", db_path.display(), e);
                ErrorInternalServerError(e)
            })?;

        let store = Self { pool };
        store.conn()?.execute(CREATE_TABLE, []).map_err(ErrorInternalServerError)?;
        info!("Opened saying database {} (pool_size: {}, wal_mode: {})",
              db_path.display(), config.pool_size, config.wal_mode);
        Ok(store)
    }

    /// Get a connection from the pool; it goes back when the guard drops
    fn conn(&self) -> Result<PooledConn, Error> {
        self.pool.get().map_err(|e| {
            warn!("Failed to get connection from pool: {}", e);
            ErrorInternalServerError(e)
        })
    }
}

fn row_to_saying(row: &rusqlite::Row<'_>) -> rusqlite::Result<Saying> {
    Ok(Saying {
        id: row.get(0)?,
        date: row.get(1)?,
        saying: row.get(2)?,
    })
}

impl SayingStorage for SQLiteSayingStore {
    fn ids(&self) -> Result<Vec<SayingId>, Error> {
        let conn = self.conn()?;
        debug!("Sending Query: SELECT id FROM sayings");
        let mut stmt = conn.prepare("SELECT id FROM sayings ORDER BY id")
            .map_err(ErrorInternalServerError)?;

        let rows = stmt.query_map([], |row| row.get::<_, SayingId>(0))
            .map_err(ErrorInternalServerError)?;

        let mut ids = Vec::new();
        for row in rows {
            ids.push(row.map_err(ErrorInternalServerError)?);
        }
        Ok(ids)
    }

    fn get_saying(&self, id: SayingId) -> Result<Saying, Error> {
        let conn = self.conn()?;
        debug!("Sending Query: SELECT id, date, saying FROM sayings WHERE id = {}", id);
        let mut stmt = conn.prepare("SELECT id, date, saying FROM sayings WHERE id = ?1")
            .map_err(ErrorInternalServerError)?;

        stmt.query_row(params![id], row_to_saying).map_err(|e| match e {
            rusqlite::Error::QueryReturnedNoRows => saying_not_found(id),
            other => ErrorInternalServerError(other),
        })
    }

    fn list_sayings(&self) -> Result<Vec<Saying>, Error> {
        let conn = self.conn()?;
        debug!("Sending Query: SELECT id, date, saying FROM sayings");
        let mut stmt = conn.prepare("SELECT id, date, saying FROM sayings ORDER BY id")
            .map_err(ErrorInternalServerError)?;

        let rows = stmt.query_map([], row_to_saying)
            .map_err(ErrorInternalServerError)?;

        let mut sayings = Vec::new();
        for row in rows {
            sayings.push(row.map_err(ErrorInternalServerError)?);
        }
        Ok(sayings)
    }

    fn insert_saying(&self, date: &str, text: &str) -> Result<SayingId, Error> {
        let conn = self.conn()?;
        debug!("Inserting: {} --> {}", date, text);
        conn.execute(
            "INSERT INTO sayings (date, saying) VALUES (?1, ?2)",
            params![date, text],
        ).map_err(ErrorInternalServerError)?;

        Ok(conn.last_insert_rowid())
    }

    fn insert_if_absent(&self, date: &str, text: &str, key: KeyFn) -> Result<Option<SayingId>, Error> {
        let mut conn = self.conn()?;
        // IMMEDIATE takes the write lock up front, so the scan below cannot go stale
        let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)
            .map_err(ErrorInternalServerError)?;

        let candidate = key(text);
        let duplicate = {
            let mut stmt = tx.prepare("SELECT saying FROM sayings")
                .map_err(ErrorInternalServerError)?;
            let rows = stmt.query_map([], |row| row.get::<_, String>(0))
                .map_err(ErrorInternalServerError)?;

            let mut found = false;
            for row in rows {
                if key(&row.map_err(ErrorInternalServerError)?) == candidate {
                    found = true;
                    break;
                }
            }
            found
        };

        if duplicate {
            // dropping the transaction rolls it back
            return Ok(None);
        }

        debug!("Inserting: {} --> {}", date, text);
        tx.execute(
            "INSERT INTO sayings (date, saying) VALUES (?1, ?2)",
            params![date, text],
        ).map_err(ErrorInternalServerError)?;
        let id = tx.last_insert_rowid();
        tx.commit().map_err(ErrorInternalServerError)?;

        Ok(Some(id))
    }
}
