pub mod client_state;
pub mod realtime;
pub mod rest;
pub mod sqlite;

use async_trait::async_trait;

use crate::models::{Player, PlayerSummary, Result, SnowfallPlayer, TierAssignment};

pub use client_state::ClientState;
pub use realtime::{ChangeEvent, ChangeKind, PointsRecomputer};
pub use rest::RestStore;
pub use sqlite::SqliteStore;

/// Persistence seam in front of the player tables.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait PlayerStore: Send + Sync {
    /// Insert or replace the snowfall record keyed by `minecraft_username`.
    async fn upsert_snowfall_player(&self, player: &SnowfallPlayer) -> Result<SnowfallPlayer>;

    async fn get_snowfall_player(&self, minecraft_username: &str) -> Result<Option<SnowfallPlayer>>;

    /// Player with its tier assignments attached.
    async fn get_player(&self, player_id: &str) -> Result<Option<Player>>;

    async fn tier_assignments(&self, player_id: &str) -> Result<Vec<TierAssignment>>;

    async fn set_points(&self, player_id: &str, points: i64) -> Result<()>;

    async fn count_players(&self) -> Result<u64>;

    /// Players ordered by points descending, then display name.
    async fn list_players(&self, offset: u64, limit: u64) -> Result<Vec<PlayerSummary>>;

    /// Case-insensitive substring match on display name.
    async fn search_players(&self, query: &str, limit: usize) -> Result<Vec<PlayerSummary>>;
}
