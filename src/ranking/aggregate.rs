use std::collections::BTreeMap;
use serde::Serialize;
use tracing::debug;

use crate::models::{GameMode, TierAssignment};
use super::color::{ColorToken, TierColorResolver};

/// Per-gamemode view of a player's tiers, in canonical mode order.
pub type TierLookup = BTreeMap<GameMode, Option<TierAssignment>>;

pub struct GamemodeTierAggregator;

impl GamemodeTierAggregator {
    /// Group assignments by supported mode. Gamemode names are compared
    /// case-insensitively. When a player has several rows for one mode the
    /// first one encountered wins.
    pub fn aggregate(assignments: &[TierAssignment], supported_modes: &[GameMode]) -> TierLookup {
        let mut lookup = TierLookup::new();

        for mode in supported_modes {
            let mut matching = assignments.iter().filter(|a| mode.matches(&a.gamemode));
            let first = matching.next().cloned();

            let extra = matching.count();
            if extra > 0 {
                debug!("Ignoring {} duplicate {} assignment(s)", extra, mode);
            }

            lookup.insert(*mode, first);
        }

        lookup
    }

    pub fn aggregate_all(assignments: &[TierAssignment]) -> TierLookup {
        Self::aggregate(assignments, &GameMode::ALL)
    }
}

/// Render-ready entry for one mode.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ModeTier {
    pub gamemode: GameMode,
    pub tier: String,
    pub score: Option<f64>,
    pub color: ColorToken,
}

impl ModeTier {
    pub const UNRANKED: &'static str = "Unranked";

    pub fn from_lookup(lookup: &TierLookup) -> Vec<ModeTier> {
        lookup
            .iter()
            .map(|(mode, assignment)| match assignment {
                Some(a) => ModeTier {
                    gamemode: *mode,
                    tier: a.tier.clone(),
                    score: Some(a.score),
                    color: TierColorResolver::color_for(&a.tier),
                },
                None => ModeTier {
                    gamemode: *mode,
                    tier: Self::UNRANKED.to_string(),
                    score: None,
                    color: ColorToken::Neutral,
                },
            })
            .collect()
    }
}
