//! Persistent storage for pickup records
//!
//! The orchestrator talks to a [`PickupStore`] trait so the SQLite backend
//! can be swapped for the in-memory implementation in tests. The store is
//! deliberately small: keyed inserts and lookups, a full scan, delete by id,
//! and the "most recent id" query the id generator seeds from.

use std::collections::HashMap;
use std::path::Path;
use std::sync::{Arc, Mutex, RwLock};

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use rusqlite::{params, Connection, OptionalExtension};

use crate::models::{Frequency, Pickup, PickupStatus};

/// Repository of pickup records keyed by id
pub trait PickupStore: Send + Sync {
    /// Insert a new pickup. Fails if the id is already present.
    fn insert(&self, pickup: &Pickup) -> Result<()>;

    /// Look up a pickup by id
    fn get(&self, id: &str) -> Result<Option<Pickup>>;

    /// Full scan, storage iteration order
    fn list_all(&self) -> Result<Vec<Pickup>>;

    /// Delete by id; returns whether a record was removed
    fn delete(&self, id: &str) -> Result<bool>;

    /// Highest stored id, if any (seed for the id generator)
    fn latest_id(&self) -> Result<Option<String>>;

    /// Number of stored pickups
    fn count(&self) -> Result<usize>;
}

/// Thread-safe shared store handle
pub type SharedPickupStore = Arc<dyn PickupStore>;

// ============================================================================
// SQLite Implementation
// ============================================================================

/// SQLite-backed pickup store
///
/// Uses a `Mutex` around the connection; every operation is a single short
/// statement, so contention stays negligible at this service's scale.
pub struct SqlitePickupStore {
    conn: Mutex<Connection>,
}

impl SqlitePickupStore {
    /// Open (or create) the store at the given path
    pub fn new(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let conn = Connection::open(path).context("Failed to open SQLite database")?;
        conn.execute_batch("PRAGMA journal_mode=WAL; PRAGMA synchronous=NORMAL;")?;

        let store = Self {
            conn: Mutex::new(conn),
        };
        store.create_schema()?;

        tracing::info!(path = %path.display(), "SQLite pickup store initialized");
        Ok(store)
    }

    /// Create an in-memory store (for testing)
    pub fn in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory().context("Failed to create in-memory SQLite")?;
        let store = Self {
            conn: Mutex::new(conn),
        };
        store.create_schema()?;
        Ok(store)
    }

    fn create_schema(&self) -> Result<()> {
        let conn = self.conn.lock().unwrap();
        conn.execute_batch(
            r#"
            CREATE TABLE IF NOT EXISTS pickups (
                id TEXT PRIMARY KEY,
                zone_id TEXT NOT NULL,
                time_slot_start TEXT NOT NULL,
                time_slot_end TEXT NOT NULL,
                frequency TEXT NOT NULL,
                location_name TEXT NOT NULL,
                vehicle_id TEXT NOT NULL,
                worker1_id TEXT NOT NULL,
                worker2_id TEXT NOT NULL,
                status TEXT NOT NULL
            );

            CREATE INDEX IF NOT EXISTS idx_pickups_zone
                ON pickups(zone_id);
            "#,
        )
        .context("Failed to create SQLite schema")?;

        Ok(())
    }

    fn row_to_pickup(row: &rusqlite::Row<'_>) -> rusqlite::Result<Pickup> {
        let parse_ts = |idx: usize| -> rusqlite::Result<DateTime<Utc>> {
            let raw: String = row.get(idx)?;
            DateTime::parse_from_rfc3339(&raw)
                .map(|dt| dt.with_timezone(&Utc))
                .map_err(|e| {
                    rusqlite::Error::FromSqlConversionFailure(
                        idx,
                        rusqlite::types::Type::Text,
                        Box::new(e),
                    )
                })
        };

        Ok(Pickup {
            id: row.get(0)?,
            zone_id: row.get(1)?,
            time_slot_start: parse_ts(2)?,
            time_slot_end: parse_ts(3)?,
            frequency: Frequency::parse(&row.get::<_, String>(4)?)
                .unwrap_or(Frequency::OneTime),
            location_name: row.get(5)?,
            vehicle_id: row.get(6)?,
            worker1_id: row.get(7)?,
            worker2_id: row.get(8)?,
            status: PickupStatus::parse(&row.get::<_, String>(9)?)
                .unwrap_or(PickupStatus::Scheduled),
        })
    }
}

impl PickupStore for SqlitePickupStore {
    fn insert(&self, pickup: &Pickup) -> Result<()> {
        let conn = self.conn.lock().unwrap();
        conn.execute(
            r#"
            INSERT INTO pickups (id, zone_id, time_slot_start, time_slot_end,
                                 frequency, location_name, vehicle_id,
                                 worker1_id, worker2_id, status)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)
            "#,
            params![
                pickup.id,
                pickup.zone_id,
                pickup.time_slot_start.to_rfc3339(),
                pickup.time_slot_end.to_rfc3339(),
                pickup.frequency.as_str(),
                pickup.location_name,
                pickup.vehicle_id,
                pickup.worker1_id,
                pickup.worker2_id,
                pickup.status.as_str(),
            ],
        )
        .with_context(|| format!("Failed to insert pickup {}", pickup.id))?;

        Ok(())
    }

    fn get(&self, id: &str) -> Result<Option<Pickup>> {
        let conn = self.conn.lock().unwrap();
        let pickup = conn
            .query_row(
                "SELECT id, zone_id, time_slot_start, time_slot_end, frequency,
                        location_name, vehicle_id, worker1_id, worker2_id, status
                 FROM pickups WHERE id = ?1",
                params![id],
                Self::row_to_pickup,
            )
            .optional()
            .context("Failed to get pickup")?;

        Ok(pickup)
    }

    fn list_all(&self) -> Result<Vec<Pickup>> {
        let conn = self.conn.lock().unwrap();
        let mut stmt = conn.prepare(
            "SELECT id, zone_id, time_slot_start, time_slot_end, frequency,
                    location_name, vehicle_id, worker1_id, worker2_id, status
             FROM pickups",
        )?;

        let pickups = stmt
            .query_map([], Self::row_to_pickup)?
            .collect::<rusqlite::Result<Vec<_>>>()
            .context("Failed to list pickups")?;

        Ok(pickups)
    }

    fn delete(&self, id: &str) -> Result<bool> {
        let conn = self.conn.lock().unwrap();
        let removed = conn
            .execute("DELETE FROM pickups WHERE id = ?1", params![id])
            .with_context(|| format!("Failed to delete pickup {id}"))?;

        Ok(removed > 0)
    }

    fn latest_id(&self) -> Result<Option<String>> {
        let conn = self.conn.lock().unwrap();
        // Length before text: a plain lexicographic sort would rank P999
        // above P1000 once the counter grows past the zero padding.
        let id = conn
            .query_row(
                "SELECT id FROM pickups ORDER BY length(id) DESC, id DESC LIMIT 1",
                [],
                |row| row.get(0),
            )
            .optional()
            .context("Failed to query latest pickup id")?;

        Ok(id)
    }

    fn count(&self) -> Result<usize> {
        let conn = self.conn.lock().unwrap();
        let count: i64 = conn.query_row("SELECT COUNT(*) FROM pickups", [], |row| row.get(0))?;
        Ok(count as usize)
    }
}

// ============================================================================
// In-memory Implementation (for testing)
// ============================================================================

/// In-memory pickup store
///
/// Preserves insertion order for `list_all`, matching the "storage iteration
/// order" contract without promising anything stronger.
#[derive(Default)]
pub struct MemoryPickupStore {
    inner: RwLock<MemoryInner>,
}

#[derive(Default)]
struct MemoryInner {
    by_id: HashMap<String, Pickup>,
    order: Vec<String>,
}

impl MemoryPickupStore {
    /// Create a new empty store
    pub fn new() -> Self {
        Self::default()
    }
}

impl PickupStore for MemoryPickupStore {
    fn insert(&self, pickup: &Pickup) -> Result<()> {
        let mut inner = self.inner.write().unwrap();
        if inner.by_id.contains_key(&pickup.id) {
            anyhow::bail!("Duplicate pickup id: {}", pickup.id);
        }
        inner.order.push(pickup.id.clone());
        inner.by_id.insert(pickup.id.clone(), pickup.clone());
        Ok(())
    }

    fn get(&self, id: &str) -> Result<Option<Pickup>> {
        let inner = self.inner.read().unwrap();
        Ok(inner.by_id.get(id).cloned())
    }

    fn list_all(&self) -> Result<Vec<Pickup>> {
        let inner = self.inner.read().unwrap();
        Ok(inner
            .order
            .iter()
            .filter_map(|id| inner.by_id.get(id).cloned())
            .collect())
    }

    fn delete(&self, id: &str) -> Result<bool> {
        let mut inner = self.inner.write().unwrap();
        let removed = inner.by_id.remove(id).is_some();
        inner.order.retain(|stored| stored != id);
        Ok(removed)
    }

    fn latest_id(&self) -> Result<Option<String>> {
        let inner = self.inner.read().unwrap();
        // Same length-then-text ordering as the SQLite store
        Ok(inner
            .by_id
            .keys()
            .max_by(|a, b| a.len().cmp(&b.len()).then_with(|| a.cmp(b)))
            .cloned())
    }

    fn count(&self) -> Result<usize> {
        let inner = self.inner.read().unwrap();
        Ok(inner.by_id.len())
    }
}
