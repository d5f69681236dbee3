use std::sync::Arc;

use futures::{Stream, StreamExt};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::models::{total_points, Result};
use super::PlayerStore;

pub const TIER_TABLE: &str = "tier_assignments";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum ChangeKind {
    Insert,
    Update,
    Delete,
}

/// A row change pushed by the store's change feed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChangeEvent {
    pub table: String,
    pub kind: ChangeKind,
    pub player_id: String,
}

impl ChangeEvent {
    pub fn new(table: impl Into<String>, kind: ChangeKind, player_id: impl Into<String>) -> Self {
        Self {
            table: table.into(),
            kind,
            player_id: player_id.into(),
        }
    }
}

/// Keeps each player's aggregate points in step with their tier rows.
///
/// The total is always recomputed from the full assignment set, so the
/// same event delivered twice writes the same value twice.
pub struct PointsRecomputer {
    store: Arc<dyn PlayerStore>,
}

impl PointsRecomputer {
    pub fn new(store: Arc<dyn PlayerStore>) -> Self {
        Self { store }
    }

    /// Returns the written total, or `None` when the event is for another table.
    pub async fn handle(&self, event: &ChangeEvent) -> Result<Option<i64>> {
        if event.table != TIER_TABLE {
            debug!("Ignoring change on {}", event.table);
            return Ok(None);
        }

        let assignments = self.store.tier_assignments(&event.player_id).await?;
        let points = total_points(&assignments);
        self.store.set_points(&event.player_id, points).await?;

        info!(
            "Recomputed points for {} after {:?}: {}",
            event.player_id, event.kind, points
        );
        Ok(Some(points))
    }

    /// Drain a change feed. Failures are logged and the feed keeps going.
    pub async fn run<S>(&self, events: S) -> usize
    where
        S: Stream<Item = ChangeEvent>,
    {
        futures::pin_mut!(events);
        let mut applied = 0;

        while let Some(event) = events.next().await {
            match self.handle(&event).await {
                Ok(Some(_)) => applied += 1,
                Ok(None) => {}
                Err(e) => warn!("Failed to recompute points for {}: {}", event.player_id, e),
            }
        }

        applied
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{TierAssignment, TierBoardError};
    use crate::store::MockPlayerStore;

    #[tokio::test]
    async fn test_recomputes_from_assignments() {
        let mut store = MockPlayerStore::new();
        store
            .expect_tier_assignments()
            .withf(|id| id == "p1")
            .returning(|_| Ok(vec![
                TierAssignment::new("Crystal", "HT1", 60.0),
                TierAssignment::new("sumo", "LT4", 3.0),
            ]));
        store
            .expect_set_points()
            .withf(|id, points| id == "p1" && *points == 63)
            .times(2)
            .returning(|_, _| Ok(()));

        let recomputer = PointsRecomputer::new(Arc::new(store));
        let event = ChangeEvent::new(TIER_TABLE, ChangeKind::Update, "p1");

        // redelivery is harmless
        assert_eq!(recomputer.handle(&event).await.unwrap(), Some(63));
        assert_eq!(recomputer.handle(&event).await.unwrap(), Some(63));
    }

    #[tokio::test]
    async fn test_ignores_other_tables() {
        let store = MockPlayerStore::new();
        let recomputer = PointsRecomputer::new(Arc::new(store));
        let event = ChangeEvent::new("snowfall_players", ChangeKind::Insert, "p1");
        assert_eq!(recomputer.handle(&event).await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_run_continues_after_failure() {
        let mut store = MockPlayerStore::new();
        store
            .expect_tier_assignments()
            .returning(|id| {
                if id == "gone" {
                    Err(TierBoardError::NotFound(id.to_string()))
                } else {
                    Ok(vec![TierAssignment::new("bridge", "LT2", 20.0)])
                }
            });
        store.expect_set_points().returning(|_, _| Ok(()));

        let recomputer = PointsRecomputer::new(Arc::new(store));
        let events = futures::stream::iter(vec![
            ChangeEvent::new(TIER_TABLE, ChangeKind::Insert, "gone"),
            ChangeEvent::new("players", ChangeKind::Update, "p2"),
            ChangeEvent::new(TIER_TABLE, ChangeKind::Delete, "p3"),
        ]);

        assert_eq!(recomputer.run(events).await, 1);
    }
}
