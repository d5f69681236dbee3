use serde::{Deserialize, Serialize};
use chrono::{DateTime, Utc};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Player {
    pub id: String,
    pub display_name: String,
    pub points: i64,
    #[serde(default)]
    pub tier_assignments: Vec<TierAssignment>,
}

/// One row of the per-gamemode tier table.
///
/// `gamemode` and `tier` are kept as the raw stored strings; matching
/// against [`GameMode`](super::GameMode) happens during aggregation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TierAssignment {
    pub gamemode: String,
    pub tier: String,
    pub score: f64,
}

/// Row returned by list and search queries.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlayerSummary {
    pub id: String,
    pub display_name: String,
    pub points: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SnowfallPlayer {
    pub minecraft_username: String,
    pub playstyle: u8,
    pub movement: u8,
    pub pvp: u8,
    pub building: u8,
    pub projectiles: u8,
    pub overall_score: f64,
    pub tier: String,
    pub updated_at: DateTime<Utc>,
}

impl Player {
    pub fn new(id: impl Into<String>, display_name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            display_name: display_name.into(),
            points: 0,
            tier_assignments: Vec::new(),
        }
    }

    pub fn summary(&self) -> PlayerSummary {
        PlayerSummary {
            id: self.id.clone(),
            display_name: self.display_name.clone(),
            points: self.points,
        }
    }
}

impl TierAssignment {
    pub fn new(gamemode: impl Into<String>, tier: impl Into<String>, score: f64) -> Self {
        Self {
            gamemode: gamemode.into(),
            tier: tier.into(),
            score,
        }
    }
}

/// Aggregate point total derived from a player's tier assignments.
///
/// Non-finite scores contribute nothing and the total never drops below zero.
pub fn total_points(assignments: &[TierAssignment]) -> i64 {
    let sum: f64 = assignments
        .iter()
        .map(|a| a.score)
        .filter(|s| s.is_finite())
        .sum();

    sum.round().max(0.0) as i64
}
