use std::time::Duration;

use async_trait::async_trait;
use reqwest::{header, Client, RequestBuilder, Response};
use serde::de::DeserializeOwned;
use serde_json::json;
use tracing::{debug, warn};

use crate::config::BackendSettings;
use crate::models::{
    Player, PlayerSummary, Result, SnowfallPlayer, TierAssignment, TierBoardError,
};
use super::PlayerStore;

/// [`PlayerStore`] backed by a hosted PostgREST-style backend.
#[derive(Debug, Clone)]
pub struct RestStore {
    client: Client,
    base_url: String,
    api_key: String,
}

impl RestStore {
    pub fn new(settings: &BackendSettings) -> Result<Self> {
        if settings.url.trim().is_empty() {
            return Err(TierBoardError::ConfigError("backend.url is empty".to_string()));
        }

        let client = Client::builder()
            .timeout(Duration::from_secs(settings.timeout_seconds))
            .build()?;

        Ok(Self {
            client,
            base_url: settings.url.trim_end_matches('/').to_string(),
            api_key: settings.api_key.clone(),
        })
    }

    fn table_url(&self, table: &str) -> String {
        format!("{}/rest/v1/{}", self.base_url, table)
    }

    fn authorized(&self, request: RequestBuilder) -> RequestBuilder {
        request
            .header("apikey", &self.api_key)
            .header(header::AUTHORIZATION, format!("Bearer {}", self.api_key))
    }

    async fn send(&self, request: RequestBuilder) -> Result<Response> {
        let response = self.authorized(request).send().await?;
        let status = response.status();

        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            warn!("Backend request failed with {}: {}", status, message);
            return Err(TierBoardError::BackendError {
                status: status.as_u16(),
                message,
            });
        }

        Ok(response)
    }

    async fn fetch_rows<T: DeserializeOwned>(&self, request: RequestBuilder) -> Result<Vec<T>> {
        let response = self.send(request).await?;
        let body = response.text().await?;
        Ok(serde_json::from_str(&body)?)
    }
}

/// Total from a `Content-Range` header such as `0-49/1234` or `*/0`.
fn parse_content_range(value: &str) -> Option<u64> {
    value.rsplit('/').next()?.trim().parse().ok()
}

/// Strip characters PostgREST treats as filter syntax.
fn sanitize_search(query: &str) -> String {
    query
        .trim()
        .chars()
        .filter(|c| !matches!(c, '*' | '%' | ',' | '(' | ')' | '"'))
        .collect()
}

#[async_trait]
impl PlayerStore for RestStore {
    async fn upsert_snowfall_player(&self, player: &SnowfallPlayer) -> Result<SnowfallPlayer> {
        debug!("Upserting snowfall record for {} via backend", player.minecraft_username);

        let request = self
            .client
            .post(self.table_url("snowfall_players"))
            .query(&[("on_conflict", "minecraft_username")])
            .header("Prefer", "resolution=merge-duplicates,return=representation")
            .json(player);

        let rows: Vec<SnowfallPlayer> = self.fetch_rows(request).await?;
        Ok(rows.into_iter().next().unwrap_or_else(|| player.clone()))
    }

    async fn get_snowfall_player(&self, minecraft_username: &str) -> Result<Option<SnowfallPlayer>> {
        let request = self
            .client
            .get(self.table_url("snowfall_players"))
            .query(&[
                ("select", "*".to_string()),
                ("minecraft_username", format!("eq.{}", minecraft_username)),
            ]);

        let rows: Vec<SnowfallPlayer> = self.fetch_rows(request).await?;
        Ok(rows.into_iter().next())
    }

    async fn get_player(&self, player_id: &str) -> Result<Option<Player>> {
        let request = self
            .client
            .get(self.table_url("players"))
            .query(&[
                ("select", "id,display_name,points,tier_assignments(gamemode,tier,score)".to_string()),
                ("id", format!("eq.{}", player_id)),
            ]);

        let rows: Vec<Player> = self.fetch_rows(request).await?;
        Ok(rows.into_iter().next())
    }

    async fn tier_assignments(&self, player_id: &str) -> Result<Vec<TierAssignment>> {
        let request = self
            .client
            .get(self.table_url("tier_assignments"))
            .query(&[
                ("select", "gamemode,tier,score".to_string()),
                ("player_id", format!("eq.{}", player_id)),
                ("order", "id.asc".to_string()),
            ]);

        self.fetch_rows(request).await
    }

    async fn set_points(&self, player_id: &str, points: i64) -> Result<()> {
        let request = self
            .client
            .patch(self.table_url("players"))
            .query(&[("id", format!("eq.{}", player_id))])
            .header("Prefer", "return=representation")
            .json(&json!({ "points": points }));

        let rows: Vec<PlayerSummary> = self.fetch_rows(request).await?;
        if rows.is_empty() {
            return Err(TierBoardError::NotFound(format!("player {}", player_id)));
        }
        Ok(())
    }

    async fn count_players(&self) -> Result<u64> {
        let request = self
            .client
            .head(self.table_url("players"))
            .query(&[("select", "id")])
            .header("Prefer", "count=exact");

        let response = self.send(request).await?;
        response
            .headers()
            .get(header::CONTENT_RANGE)
            .and_then(|v| v.to_str().ok())
            .and_then(parse_content_range)
            .ok_or_else(|| TierBoardError::BackendError {
                status: response.status().as_u16(),
                message: "missing Content-Range total".to_string(),
            })
    }

    async fn list_players(&self, offset: u64, limit: u64) -> Result<Vec<PlayerSummary>> {
        let request = self
            .client
            .get(self.table_url("players"))
            .query(&[
                ("select", "id,display_name,points".to_string()),
                ("order", "points.desc,display_name.asc".to_string()),
                ("offset", offset.to_string()),
                ("limit", limit.to_string()),
            ]);

        self.fetch_rows(request).await
    }

    async fn search_players(&self, query: &str, limit: usize) -> Result<Vec<PlayerSummary>> {
        let request = self
            .client
            .get(self.table_url("players"))
            .query(&[
                ("select", "id,display_name,points".to_string()),
                ("display_name", format!("ilike.*{}*", sanitize_search(query))),
                ("order", "points.desc,display_name.asc".to_string()),
                ("limit", limit.to_string()),
            ]);

        self.fetch_rows(request).await
    }
}
