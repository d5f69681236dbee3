use serde::Serialize;

use crate::models::{Result, TierBoardError};

/// A named bracket over a player's aggregate point total.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RankTier {
    pub title: &'static str,
    pub min_points: u32,
    /// Inclusive upper bound; `None` only for the top tier.
    pub max_points: Option<u32>,
    pub color: &'static str,
    pub icon: &'static str,
}

impl RankTier {
    pub fn contains(&self, points: f64) -> bool {
        points >= self.min_points as f64
            && self.max_points.map_or(true, |max| points < max as f64 + 1.0)
    }
}

pub static RANK_TIERS: [RankTier; 7] = [
    RankTier { title: "Rookie", min_points: 0, max_points: Some(4), color: "#9ca3af", icon: "seedling" },
    RankTier { title: "Combat Novice", min_points: 5, max_points: Some(19), color: "#22c55e", icon: "sword" },
    RankTier { title: "Combat Cadet", min_points: 20, max_points: Some(49), color: "#3b82f6", icon: "shield" },
    RankTier { title: "Combat Specialist", min_points: 50, max_points: Some(99), color: "#8b5cf6", icon: "target" },
    RankTier { title: "Combat Ace", min_points: 100, max_points: Some(149), color: "#f97316", icon: "flame" },
    RankTier { title: "Combat Master", min_points: 150, max_points: Some(199), color: "#ef4444", icon: "crown" },
    RankTier { title: "Combat Grandmaster", min_points: 200, max_points: None, color: "#facc15", icon: "trophy" },
];

/// Maps point totals onto the rank table.
///
/// Every input maps to some tier: NaN and negative totals are treated as
/// zero, and anything the table cannot place lands on the lowest tier.
#[derive(Debug, Clone)]
pub struct RankClassifier {
    tiers: &'static [RankTier],
}

impl Default for RankClassifier {
    fn default() -> Self {
        Self { tiers: &RANK_TIERS }
    }
}

impl RankClassifier {
    pub fn new() -> Self {
        Self::default()
    }

    /// Use a custom table. It must be non-empty, ascending, contiguous, and
    /// end with exactly one unbounded tier.
    pub fn with_tiers(tiers: &'static [RankTier]) -> Result<Self> {
        validate_table(tiers)?;
        Ok(Self { tiers })
    }

    pub fn classify(&self, points: f64) -> &'static RankTier {
        let points = sanitize(points);

        self.tiers
            .iter()
            .rev()
            .find(|tier| points >= tier.min_points as f64)
            .unwrap_or(&self.tiers[0])
    }

    pub fn next_rank(&self, points: f64) -> Option<&'static RankTier> {
        let current = self.classify(points);
        let index = self.tiers.iter().position(|t| t.title == current.title)?;
        self.tiers.get(index + 1)
    }

    pub fn progress_to_next(&self, points: f64) -> u8 {
        let points = sanitize(points);
        let current = self.classify(points);

        let Some(next) = self.next_rank(points) else {
            return 100;
        };

        let span = (next.min_points - current.min_points) as f64;
        let progress = 100.0 * (points - current.min_points as f64) / span;

        // 100 is reserved for the top tier
        progress.round().clamp(0.0, 99.0) as u8
    }
}

fn sanitize(points: f64) -> f64 {
    if points.is_nan() || points < 0.0 {
        0.0
    } else {
        points
    }
}

fn validate_table(tiers: &[RankTier]) -> Result<()> {
    let Some(last) = tiers.last() else {
        return Err(TierBoardError::ConfigError("Rank table is empty".to_string()));
    };

    if last.max_points.is_some() {
        return Err(TierBoardError::ConfigError(
            "Highest rank tier must be unbounded".to_string(),
        ));
    }

    for pair in tiers.windows(2) {
        match pair[0].max_points {
            Some(max)
                if max >= pair[0].min_points
                    && max.checked_add(1) == Some(pair[1].min_points) => {}
            _ => {
                return Err(TierBoardError::ConfigError(format!(
                    "Rank tiers {} and {} are not contiguous",
                    pair[0].title, pair[1].title
                )));
            }
        }
    }

    Ok(())
}
