pub mod api;
pub mod config;
pub mod models;
pub mod ranking;
pub mod search;
pub mod store;

pub use models::{GameMode, Player, TierAssignment, TierBoardError, TierCode, Result};
pub use config::Settings;
pub use ranking::{
    GamemodeTierAggregator, Paginator, RankClassifier, SnowfallTierCalculator, TierColorResolver,
};
