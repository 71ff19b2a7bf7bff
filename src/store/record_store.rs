//! SQLite-backed record store
//!
//! A single database file holds any number of namespaces, each an isolated
//! key space of opaque byte records. Every write runs in its own
//! transaction, so a concurrent reader sees either the previous record or
//! the new one, never a mix.

use crate::{Error, Result};
use chrono::Utc;
use rusqlite::{Connection, OptionalExtension, Transaction, params};
use serde::{Serialize, de::DeserializeOwned};
use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard};
use tracing::{debug, info};

const SCHEMA: &str = "
    PRAGMA foreign_keys = ON;
    CREATE TABLE IF NOT EXISTS namespaces (
        name TEXT PRIMARY KEY
    );
    CREATE TABLE IF NOT EXISTS records (
        namespace TEXT NOT NULL REFERENCES namespaces(name),
        key TEXT NOT NULL,
        value BLOB NOT NULL,
        updated_at TEXT NOT NULL,
        PRIMARY KEY (namespace, key)
    );
";

/// Durable key→bytes store partitioned into namespaces
#[derive(Debug)]
pub struct RecordStore {
    conn: Mutex<Connection>,
    path: PathBuf,
}

impl RecordStore {
    /// Open (or create) the store file at `path`
    ///
    /// Missing parent directories are created. Namespaces are not created
    /// here; call [`RecordStore::ensure_namespaces`] once at startup.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref().to_path_buf();

        if let Some(parent) = path.parent()
            && !parent.as_os_str().is_empty()
            && !parent.exists()
        {
            std::fs::create_dir_all(parent)?;
            info!("Created cache directory: {}", parent.display());
        }

        let conn = Connection::open(&path)?;
        conn.execute_batch(SCHEMA)?;
        debug!("Opened record store at {}", path.display());

        Ok(Self {
            conn: Mutex::new(conn),
            path,
        })
    }

    /// Open a throwaway in-memory store
    pub fn in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        conn.execute_batch(SCHEMA)?;

        Ok(Self {
            conn: Mutex::new(conn),
            path: PathBuf::from(":memory:"),
        })
    }

    /// Location of the backing file
    pub fn path(&self) -> &Path {
        &self.path
    }

    pub(crate) fn lock(&self) -> Result<MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|_| Error::internal("record store lock poisoned"))
    }

    /// Create the given namespaces; existing ones are left untouched
    pub fn ensure_namespaces<I, S>(&self, names: I) -> Result<()>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut conn = self.lock()?;
        let tx = conn.transaction()?;

        for name in names {
            let name = name.as_ref();
            let created = tx.execute(
                "INSERT OR IGNORE INTO namespaces (name) VALUES (?1)",
                [name],
            )?;
            if created > 0 {
                info!("Created cache namespace '{}'", name);
            }
        }

        tx.commit()?;
        Ok(())
    }

    /// Insert or overwrite `key` in `namespace`
    pub fn put(&self, namespace: &str, key: &str, value: &[u8]) -> Result<()> {
        let mut conn = self.lock()?;
        let tx = conn.transaction()?;

        require_namespace(&tx, namespace)?;
        tx.execute(
            "INSERT INTO records (namespace, key, value, updated_at)
             VALUES (?1, ?2, ?3, ?4)
             ON CONFLICT(namespace, key) DO UPDATE SET
                 value = excluded.value,
                 updated_at = excluded.updated_at",
            params![namespace, key, value, Utc::now().to_rfc3339()],
        )?;

        tx.commit()?;
        debug!("Stored {} bytes for '{}' in '{}'", value.len(), key, namespace);
        Ok(())
    }

    /// Read the raw bytes stored for `key` in `namespace`
    pub fn get(&self, namespace: &str, key: &str) -> Result<Vec<u8>> {
        let mut conn = self.lock()?;
        let tx = conn.transaction()?;

        require_namespace(&tx, namespace)?;
        let value = tx
            .query_row(
                "SELECT value FROM records WHERE namespace = ?1 AND key = ?2",
                params![namespace, key],
                |row| row.get::<_, Vec<u8>>(0),
            )
            .optional()?;

        value.ok_or_else(|| Error::not_cached(namespace, key))
    }

    /// Serialize `value` as JSON and store it
    pub fn put_record<T: Serialize>(&self, namespace: &str, key: &str, value: &T) -> Result<()> {
        let bytes = serde_json::to_vec(value).map_err(|source| Error::EncodeFailure {
            namespace: namespace.to_string(),
            key: key.to_string(),
            source,
        })?;

        self.put(namespace, key, &bytes)
    }

    /// Load and deserialize a JSON record
    pub fn get_record<T: DeserializeOwned>(&self, namespace: &str, key: &str) -> Result<T> {
        let bytes = self.get(namespace, key)?;

        serde_json::from_slice(&bytes).map_err(|source| Error::DecodeFailure {
            namespace: namespace.to_string(),
            key: key.to_string(),
            source,
        })
    }

    /// Names of all namespaces, sorted
    pub fn namespaces(&self) -> Result<Vec<String>> {
        let conn = self.lock()?;
        let mut stmt = conn.prepare("SELECT name FROM namespaces ORDER BY name")?;
        let names = stmt
            .query_map([], |row| row.get::<_, String>(0))?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(names)
    }

    /// Keys stored in `namespace`, sorted
    pub fn keys(&self, namespace: &str) -> Result<Vec<String>> {
        let mut conn = self.lock()?;
        let tx = conn.transaction()?;

        require_namespace(&tx, namespace)?;
        let keys = {
            let mut stmt =
                tx.prepare("SELECT key FROM records WHERE namespace = ?1 ORDER BY key")?;
            let keys = stmt
                .query_map([namespace], |row| row.get::<_, String>(0))?
                .collect::<rusqlite::Result<Vec<_>>>()?;
            keys
        };

        Ok(keys)
    }
}

fn require_namespace(tx: &Transaction<'_>, namespace: &str) -> Result<()> {
    let exists = tx
        .query_row(
            "SELECT 1 FROM namespaces WHERE name = ?1",
            [namespace],
            |_| Ok(()),
        )
        .optional()?;

    match exists {
        Some(()) => Ok(()),
        None => Err(Error::namespace_missing(namespace)),
    }
}
