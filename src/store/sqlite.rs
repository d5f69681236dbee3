use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::sqlite::{SqlitePool, SqlitePoolOptions};
use tracing::{debug, info};

use crate::config::DatabaseSettings;
use crate::models::{
    Player, PlayerSummary, Result, SnowfallPlayer, TierAssignment, TierBoardError,
};
use super::PlayerStore;

const SCHEMA: &[&str] = &[
    "CREATE TABLE IF NOT EXISTS players (
        id TEXT PRIMARY KEY,
        display_name TEXT NOT NULL,
        points INTEGER NOT NULL DEFAULT 0
    )",
    "CREATE TABLE IF NOT EXISTS tier_assignments (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        player_id TEXT NOT NULL REFERENCES players(id) ON DELETE CASCADE,
        gamemode TEXT NOT NULL,
        tier TEXT NOT NULL,
        score REAL NOT NULL DEFAULT 0
    )",
    "CREATE INDEX IF NOT EXISTS idx_tier_assignments_player ON tier_assignments(player_id)",
    "CREATE TABLE IF NOT EXISTS snowfall_players (
        minecraft_username TEXT PRIMARY KEY,
        playstyle INTEGER NOT NULL,
        movement INTEGER NOT NULL,
        pvp INTEGER NOT NULL,
        building INTEGER NOT NULL,
        projectiles INTEGER NOT NULL,
        overall_score REAL NOT NULL,
        tier TEXT NOT NULL,
        updated_at TEXT NOT NULL
    )",
    "CREATE TABLE IF NOT EXISTS client_state (
        key TEXT PRIMARY KEY,
        value TEXT NOT NULL
    )",
];

#[derive(sqlx::FromRow)]
struct SnowfallRow {
    minecraft_username: String,
    playstyle: i64,
    movement: i64,
    pvp: i64,
    building: i64,
    projectiles: i64,
    overall_score: f64,
    tier: String,
    updated_at: DateTime<Utc>,
}

impl From<SnowfallRow> for SnowfallPlayer {
    fn from(row: SnowfallRow) -> Self {
        Self {
            minecraft_username: row.minecraft_username,
            playstyle: row.playstyle as u8,
            movement: row.movement as u8,
            pvp: row.pvp as u8,
            building: row.building as u8,
            projectiles: row.projectiles as u8,
            overall_score: row.overall_score,
            tier: row.tier,
            updated_at: row.updated_at,
        }
    }
}

#[derive(sqlx::FromRow)]
struct PlayerRow {
    id: String,
    display_name: String,
    points: i64,
}

impl From<PlayerRow> for PlayerSummary {
    fn from(row: PlayerRow) -> Self {
        Self {
            id: row.id,
            display_name: row.display_name,
            points: row.points,
        }
    }
}

#[derive(sqlx::FromRow)]
struct AssignmentRow {
    gamemode: String,
    tier: String,
    score: f64,
}

/// Local SQLite implementation of [`PlayerStore`].
#[derive(Debug, Clone)]
pub struct SqliteStore {
    pool: SqlitePool,
}

impl SqliteStore {
    pub async fn connect(settings: &DatabaseSettings) -> Result<Self> {
        info!("Opening SQLite store at {}", settings.url);
        let pool = SqlitePoolOptions::new()
            .max_connections(settings.max_connections)
            .connect(&settings.url)
            .await?;

        Self::from_pool(pool).await
    }

    /// Private in-memory database. Limited to a single connection that is
    /// never recycled, since each SQLite memory connection is its own database.
    pub async fn in_memory() -> Result<Self> {
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .idle_timeout(None)
            .max_lifetime(None)
            .connect("sqlite::memory:")
            .await?;

        Self::from_pool(pool).await
    }

    pub async fn from_pool(pool: SqlitePool) -> Result<Self> {
        for statement in SCHEMA {
            sqlx::query(statement).execute(&pool).await?;
        }
        Ok(Self { pool })
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    pub async fn insert_player(&self, player: &Player) -> Result<()> {
        sqlx::query(
            "INSERT INTO players (id, display_name, points) VALUES (?, ?, ?)
             ON CONFLICT(id) DO UPDATE SET display_name = excluded.display_name, points = excluded.points",
        )
        .bind(&player.id)
        .bind(&player.display_name)
        .bind(player.points)
        .execute(&self.pool)
        .await?;

        sqlx::query("DELETE FROM tier_assignments WHERE player_id = ?")
            .bind(&player.id)
            .execute(&self.pool)
            .await?;

        for assignment in &player.tier_assignments {
            self.add_tier_assignment(&player.id, assignment).await?;
        }

        Ok(())
    }

    pub async fn add_tier_assignment(&self, player_id: &str, assignment: &TierAssignment) -> Result<()> {
        sqlx::query("INSERT INTO tier_assignments (player_id, gamemode, tier, score) VALUES (?, ?, ?, ?)")
            .bind(player_id)
            .bind(&assignment.gamemode)
            .bind(&assignment.tier)
            .bind(assignment.score)
            .execute(&self.pool)
            .await?;
        Ok(())
    }
}

/// Escape LIKE wildcards so user input only ever matches literally.
fn like_pattern(query: &str) -> String {
    let mut escaped = String::with_capacity(query.len() + 2);
    escaped.push('%');
    for c in query.chars() {
        if matches!(c, '%' | '_' | '\\') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped.push('%');
    escaped
}

#[async_trait]
impl PlayerStore for SqliteStore {
    async fn upsert_snowfall_player(&self, player: &SnowfallPlayer) -> Result<SnowfallPlayer> {
        debug!("Upserting snowfall record for {}", player.minecraft_username);

        sqlx::query(
            "INSERT INTO snowfall_players
                (minecraft_username, playstyle, movement, pvp, building, projectiles, overall_score, tier, updated_at)
             VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)
             ON CONFLICT(minecraft_username) DO UPDATE SET
                playstyle = excluded.playstyle,
                movement = excluded.movement,
                pvp = excluded.pvp,
                building = excluded.building,
                projectiles = excluded.projectiles,
                overall_score = excluded.overall_score,
                tier = excluded.tier,
                updated_at = excluded.updated_at",
        )
        .bind(&player.minecraft_username)
        .bind(player.playstyle as i64)
        .bind(player.movement as i64)
        .bind(player.pvp as i64)
        .bind(player.building as i64)
        .bind(player.projectiles as i64)
        .bind(player.overall_score)
        .bind(&player.tier)
        .bind(player.updated_at)
        .execute(&self.pool)
        .await?;

        Ok(player.clone())
    }

    async fn get_snowfall_player(&self, minecraft_username: &str) -> Result<Option<SnowfallPlayer>> {
        let row = sqlx::query_as::<_, SnowfallRow>(
            "SELECT * FROM snowfall_players WHERE minecraft_username = ?",
        )
        .bind(minecraft_username)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(SnowfallPlayer::from))
    }

    async fn get_player(&self, player_id: &str) -> Result<Option<Player>> {
        let row = sqlx::query_as::<_, PlayerRow>(
            "SELECT id, display_name, points FROM players WHERE id = ?",
        )
        .bind(player_id)
        .fetch_optional(&self.pool)
        .await?;

        let Some(row) = row else {
            return Ok(None);
        };

        let tier_assignments = self.tier_assignments(player_id).await?;

        Ok(Some(Player {
            id: row.id,
            display_name: row.display_name,
            points: row.points,
            tier_assignments,
        }))
    }

    async fn tier_assignments(&self, player_id: &str) -> Result<Vec<TierAssignment>> {
        let rows = sqlx::query_as::<_, AssignmentRow>(
            "SELECT gamemode, tier, score FROM tier_assignments WHERE player_id = ? ORDER BY id",
        )
        .bind(player_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows
            .into_iter()
            .map(|r| TierAssignment::new(r.gamemode, r.tier, r.score))
            .collect())
    }

    async fn set_points(&self, player_id: &str, points: i64) -> Result<()> {
        let result = sqlx::query("UPDATE players SET points = ? WHERE id = ?")
            .bind(points)
            .bind(player_id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(TierBoardError::NotFound(format!("player {}", player_id)));
        }
        Ok(())
    }

    async fn count_players(&self) -> Result<u64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM players")
            .fetch_one(&self.pool)
            .await?;
        Ok(count.max(0) as u64)
    }

    async fn list_players(&self, offset: u64, limit: u64) -> Result<Vec<PlayerSummary>> {
        let rows = sqlx::query_as::<_, PlayerRow>(
            "SELECT id, display_name, points FROM players
             ORDER BY points DESC, display_name ASC
             LIMIT ? OFFSET ?",
        )
        .bind(limit as i64)
        .bind(offset as i64)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(PlayerSummary::from).collect())
    }

    async fn search_players(&self, query: &str, limit: usize) -> Result<Vec<PlayerSummary>> {
        let rows = sqlx::query_as::<_, PlayerRow>(
            "SELECT id, display_name, points FROM players
             WHERE display_name LIKE ? ESCAPE '\\'
             ORDER BY points DESC, display_name ASC
             LIMIT ?",
        )
        .bind(like_pattern(query.trim()))
        .bind(limit as i64)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(PlayerSummary::from).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn seeded() -> SqliteStore {
        let store = SqliteStore::in_memory().await.unwrap();

        let mut alice = Player::new("p1", "Alice");
        alice.points = 120;
        alice.tier_assignments = vec![
            TierAssignment::new("crystal", "HT2", 80.0),
            TierAssignment::new("sumo", "LT3", 40.0),
        ];
        store.insert_player(&alice).await.unwrap();

        let mut bob = Player::new("p2", "Bob_the_Builder");
        bob.points = 300;
        store.insert_player(&bob).await.unwrap();

        let mut carol = Player::new("p3", "carol");
        carol.points = 120;
        store.insert_player(&carol).await.unwrap();

        store
    }

    #[test]
    fn test_like_pattern_escapes_wildcards() {
        assert_eq!(like_pattern("ab"), "%ab%");
        assert_eq!(like_pattern("a_%"), "%a\\_\\%%");
    }

    #[tokio::test]
    async fn test_player_round_trip() {
        let store = seeded().await;
        let player = store.get_player("p1").await.unwrap().unwrap();
        assert_eq!(player.display_name, "Alice");
        assert_eq!(player.tier_assignments.len(), 2);
        assert_eq!(player.tier_assignments[0].gamemode, "crystal");
        assert!(store.get_player("missing").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_list_orders_by_points_then_name() {
        let store = seeded().await;
        assert_eq!(store.count_players().await.unwrap(), 3);

        let page = store.list_players(0, 2).await.unwrap();
        let ids: Vec<_> = page.iter().map(|p| p.id.as_str()).collect();
        assert_eq!(ids, vec!["p2", "p1"]);

        let rest = store.list_players(2, 2).await.unwrap();
        assert_eq!(rest.len(), 1);
        assert_eq!(rest[0].id, "p3");
    }

    #[tokio::test]
    async fn test_search_is_case_insensitive_and_literal() {
        let store = seeded().await;
        let hits = store.search_players("ALI", 10).await.unwrap();
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].id, "p1");

        let hits = store.search_players("_the_", 10).await.unwrap();
        assert_eq!(hits.len(), 1);

        // '_' must not act as a single-char wildcard
        assert!(store.search_players("a_i", 10).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_set_points() {
        let store = seeded().await;
        store.set_points("p3", 7).await.unwrap();
        assert_eq!(store.get_player("p3").await.unwrap().unwrap().points, 7);
        assert!(matches!(
            store.set_points("ghost", 1).await,
            Err(TierBoardError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn test_snowfall_upsert_replaces() {
        let store = SqliteStore::in_memory().await.unwrap();
        let mut record = SnowfallPlayer {
            minecraft_username: "Steve".to_string(),
            playstyle: 90,
            movement: 90,
            pvp: 90,
            building: 90,
            projectiles: 90,
            overall_score: 90.0,
            tier: "LT1".to_string(),
            updated_at: Utc::now(),
        };
        store.upsert_snowfall_player(&record).await.unwrap();

        record.pvp = 40;
        record.overall_score = 80.0;
        record.tier = "MT2".to_string();
        store.upsert_snowfall_player(&record).await.unwrap();

        let stored = store.get_snowfall_player("Steve").await.unwrap().unwrap();
        assert_eq!(stored.pvp, 40);
        assert_eq!(stored.tier, "MT2");

        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM snowfall_players")
            .fetch_one(store.pool())
            .await
            .unwrap();
        assert_eq!(count, 1);
    }
}
