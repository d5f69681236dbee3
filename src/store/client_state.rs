use std::collections::HashMap;
use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use sqlx::sqlite::SqlitePool;
use tracing::{debug, warn};

use crate::models::Result;

const WELCOME_SHOWN: &str = "welcome_popup_shown";
const VISITOR_COUNT: &str = "visitor_count";

/// Process-wide key-value state persisted across sessions.
///
/// Loaded once from the `client_state` table; every write goes straight
/// back to storage. There is no teardown.
#[derive(Debug, Clone)]
pub struct ClientState {
    pool: SqlitePool,
    values: Arc<RwLock<HashMap<String, String>>>,
}

impl ClientState {
    pub async fn load(pool: SqlitePool) -> Result<Self> {
        let rows: Vec<(String, String)> = sqlx::query_as("SELECT key, value FROM client_state")
            .fetch_all(&pool)
            .await?;

        debug!("Loaded {} client state entries", rows.len());

        Ok(Self {
            pool,
            values: Arc::new(RwLock::new(rows.into_iter().collect())),
        })
    }

    // Storage is authoritative; a poisoned cache is still usable.
    fn read_values(&self) -> RwLockReadGuard<'_, HashMap<String, String>> {
        self.values.read().unwrap_or_else(|poisoned| {
            warn!("Client state cache lock poisoned, recovering");
            PoisonError::into_inner(poisoned)
        })
    }

    fn write_values(&self) -> RwLockWriteGuard<'_, HashMap<String, String>> {
        self.values.write().unwrap_or_else(|poisoned| {
            warn!("Client state cache lock poisoned, recovering");
            PoisonError::into_inner(poisoned)
        })
    }

    pub fn get(&self, key: &str) -> Option<String> {
        self.read_values().get(key).cloned()
    }

    pub async fn set(&self, key: &str, value: &str) -> Result<()> {
        sqlx::query(
            "INSERT INTO client_state (key, value) VALUES (?, ?)
             ON CONFLICT(key) DO UPDATE SET value = excluded.value",
        )
        .bind(key)
        .bind(value)
        .execute(&self.pool)
        .await?;

        self.write_values().insert(key.to_string(), value.to_string());
        Ok(())
    }

    pub fn welcome_shown(&self) -> bool {
        self.get(WELCOME_SHOWN).as_deref() == Some("true")
    }

    pub async fn mark_welcome_shown(&self) -> Result<()> {
        self.set(WELCOME_SHOWN, "true").await
    }

    pub fn visitor_count(&self) -> u64 {
        match self.get(VISITOR_COUNT) {
            Some(raw) => raw.parse().unwrap_or_else(|_| {
                warn!("Corrupt visitor count {:?}, starting over", raw);
                0
            }),
            None => 0,
        }
    }

    /// Bump the visitor counter and return the new total.
    ///
    /// The increment happens in storage, so concurrent visits from other
    /// processes or stale clones are never lost. A non-numeric stored value
    /// counts as zero.
    pub async fn record_visit(&self) -> Result<u64> {
        let next: i64 = sqlx::query_scalar(
            "INSERT INTO client_state (key, value) VALUES (?, '1')
             ON CONFLICT(key) DO UPDATE SET value = CAST(value AS INTEGER) + 1
             RETURNING CAST(value AS INTEGER)",
        )
        .bind(VISITOR_COUNT)
        .fetch_one(&self.pool)
        .await?;

        let next = u64::try_from(next).unwrap_or_else(|_| {
            warn!("Negative visitor count {}, reporting zero", next);
            0
        });
        self.write_values().insert(VISITOR_COUNT.to_string(), next.to_string());
        Ok(next)
    }
}
