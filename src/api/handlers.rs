use axum::{
    extract::{
        rejection::{JsonRejection, QueryRejection},
        Path, Query, State,
    },
    Json,
};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::models::{PlayerSummary, SnowfallPlayer};
use crate::ranking::{
    GamemodeTierAggregator, ModeTier, PaginationState, Paginator, RankTier,
    SnowfallTierCalculator, SubScores,
};
use super::{error::ApiError, AppState};

#[derive(Debug, Deserialize)]
pub struct SubmissionPayload {
    pub minecraft_username: Option<String>,
    pub playstyle: Option<f64>,
    pub movement: Option<f64>,
    pub pvp: Option<f64>,
    pub building: Option<f64>,
    pub projectiles: Option<f64>,
    pub api_key: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct SubmissionResponse {
    pub success: bool,
    pub player: SnowfallPlayer,
    pub message: String,
}

fn required(value: Option<f64>, field: &str) -> Result<f64, ApiError> {
    value.ok_or_else(|| ApiError::Validation(format!("Missing required field: {}", field)))
}

impl SubmissionPayload {
    fn username(&self) -> Result<String, ApiError> {
        match self.minecraft_username.as_deref().map(str::trim) {
            Some(name) if !name.is_empty() => Ok(name.to_string()),
            _ => Err(ApiError::Validation(
                "Missing required field: minecraft_username".to_string(),
            )),
        }
    }

    fn sub_scores(&self) -> Result<SubScores, ApiError> {
        Ok(SubScores::new(
            required(self.playstyle, "playstyle")?,
            required(self.movement, "movement")?,
            required(self.pvp, "pvp")?,
            required(self.building, "building")?,
            required(self.projectiles, "projectiles")?,
        ))
    }
}

async fn record_submission(
    state: &AppState,
    payload: &SubmissionPayload,
) -> Result<Json<SubmissionResponse>, ApiError> {
    let username = payload.username()?;
    let scores = payload.sub_scores()?;
    let result = SnowfallTierCalculator::calculate(&scores)?;

    // calculate() has already bounded every score to 0..=100
    let record = SnowfallPlayer {
        minecraft_username: username,
        playstyle: scores.playstyle as u8,
        movement: scores.movement as u8,
        pvp: scores.pvp as u8,
        building: scores.building as u8,
        projectiles: scores.projectiles as u8,
        overall_score: result.overall_display(),
        tier: result.tier.to_string(),
        updated_at: Utc::now(),
    };

    let player = state.store.upsert_snowfall_player(&record).await?;
    info!(
        "Recorded snowfall score for {}: {} ({})",
        player.minecraft_username, player.overall_score, player.tier
    );

    Ok(Json(SubmissionResponse {
        success: true,
        message: format!(
            "{} ranked {} with an overall score of {:.1}",
            player.minecraft_username, player.tier, player.overall_score
        ),
        player,
    }))
}

pub async fn submit_snowfall(
    State(state): State<AppState>,
    payload: Result<Json<SubmissionPayload>, JsonRejection>,
) -> Result<Json<SubmissionResponse>, ApiError> {
    let Json(payload) = payload?;
    record_submission(&state, &payload).await
}

pub async fn submit_snowfall_keyed(
    State(state): State<AppState>,
    payload: Result<Json<SubmissionPayload>, JsonRejection>,
) -> Result<Json<SubmissionResponse>, ApiError> {
    let Json(payload) = payload?;

    let expected = state.settings.api.submission_key.as_deref();
    match (expected, payload.api_key.as_deref()) {
        (Some(expected), Some(given)) if !expected.is_empty() && expected == given => {}
        _ => return Err(ApiError::Unauthorized),
    }

    record_submission(&state, &payload).await
}

pub async fn method_not_allowed() -> ApiError {
    ApiError::MethodNotAllowed
}

#[derive(Debug, Deserialize)]
pub struct LeaderboardQuery {
    pub page: Option<i64>,
}

#[derive(Debug, Serialize)]
pub struct LeaderboardEntry {
    pub position: u64,
    #[serde(flatten)]
    pub player: PlayerSummary,
    pub rank: &'static str,
    pub rank_color: &'static str,
}

#[derive(Debug, Serialize)]
pub struct LeaderboardPage {
    pub pagination: PaginationState,
    pub page_size: u64,
    pub total_players: u64,
    pub players: Vec<LeaderboardEntry>,
}

pub async fn leaderboard(
    State(state): State<AppState>,
    query: Result<Query<LeaderboardQuery>, QueryRejection>,
) -> Result<Json<LeaderboardPage>, ApiError> {
    let Query(query) = query?;
    let page_size = state.settings.leaderboard.page_size;
    let total_players = state.store.count_players().await?;
    let pagination = Paginator::state(query.page.unwrap_or(1), total_players, page_size);
    let offset = pagination.offset(page_size);

    let players = state
        .store
        .list_players(offset, page_size)
        .await?
        .into_iter()
        .enumerate()
        .map(|(i, player)| {
            let rank = state.classifier.classify(player.points as f64);
            LeaderboardEntry {
                position: offset + i as u64 + 1,
                player,
                rank: rank.title,
                rank_color: rank.color,
            }
        })
        .collect();

    Ok(Json(LeaderboardPage {
        pagination,
        page_size,
        total_players,
        players,
    }))
}

#[derive(Debug, Serialize)]
pub struct PlayerProfile {
    pub player: PlayerSummary,
    pub rank: &'static RankTier,
    pub next_rank: Option<&'static RankTier>,
    pub progress: u8,
    pub tiers: Vec<ModeTier>,
}

pub async fn player_profile(
    State(state): State<AppState>,
    Path(player_id): Path<String>,
) -> Result<Json<PlayerProfile>, ApiError> {
    let player = state
        .store
        .get_player(&player_id)
        .await?
        .ok_or_else(|| ApiError::NotFound(format!("player {}", player_id)))?;

    let points = player.points as f64;
    let lookup = GamemodeTierAggregator::aggregate_all(&player.tier_assignments);

    Ok(Json(PlayerProfile {
        player: player.summary(),
        rank: state.classifier.classify(points),
        next_rank: state.classifier.next_rank(points),
        progress: state.classifier.progress_to_next(points),
        tiers: ModeTier::from_lookup(&lookup),
    }))
}

#[derive(Debug, Deserialize)]
pub struct SearchQuery {
    pub q: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct SearchResults {
    pub query: String,
    pub players: Vec<PlayerSummary>,
}

pub async fn quick_search(
    State(state): State<AppState>,
    query: Result<Query<SearchQuery>, QueryRejection>,
) -> Result<Json<SearchResults>, ApiError> {
    let Query(query) = query?;
    let query = query.q.unwrap_or_default().trim().to_string();
    let search = &state.settings.search;

    if query.chars().count() < search.quick_min_query_len {
        return Ok(Json(SearchResults { query, players: Vec::new() }));
    }

    let players = state.store.search_players(&query, search.result_limit).await?;
    Ok(Json(SearchResults { query, players }))
}
