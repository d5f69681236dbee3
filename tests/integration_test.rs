use std::sync::Arc;

use axum::{
    body::{to_bytes, Body},
    http::{header, Method, Request, StatusCode},
};
use serde_json::{json, Value};
use tower::ServiceExt;

use tier_board::{
    api::{router, AppState},
    config::Settings,
    models::{GameMode, Player, TierAssignment},
    ranking::{
        GamemodeTierAggregator, Paginator, RankClassifier, SnowfallTierCalculator, SubScores,
        TierColorResolver,
    },
    store::{
        realtime::TIER_TABLE, ChangeEvent, ChangeKind, PlayerStore, PointsRecomputer, SqliteStore,
    },
};

async fn read_json(response: axum::response::Response) -> Value {
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

#[test]
fn test_rank_scenarios() {
    let classifier = RankClassifier::new();
    assert_eq!(classifier.classify(0.0).title, "Rookie");
    assert_eq!(classifier.classify(5.0).title, "Combat Novice");
    assert_eq!(classifier.classify(200.0).title, "Combat Grandmaster");
    assert_eq!(classifier.classify(-10.0).title, "Rookie");
}

#[test]
fn test_snowfall_scenarios() {
    let cases = [(97.0, "HT1"), (50.0, "LT4"), (10.0, "Not Ranked")];
    for (value, expected) in cases {
        let scores = SubScores::new(value, value, value, value, value);
        let result = SnowfallTierCalculator::calculate(&scores).unwrap();
        assert_eq!(result.overall_display(), value);
        assert_eq!(result.tier.to_string(), expected);
    }
}

#[test]
fn test_aggregation_scenario() {
    let assignments = vec![TierAssignment::new("crystal", "HT2", 80.0)];
    let lookup = GamemodeTierAggregator::aggregate(&assignments, &GameMode::ALL);
    let crystal = lookup[&GameMode::Crystal].as_ref().unwrap();
    assert_eq!(crystal.tier, "HT2");
    assert_eq!(crystal.score, 80.0);
}

#[test]
fn test_pagination_scenario() {
    let total = Paginator::total_pages(0, 50);
    assert_eq!(total, 0);
    assert_eq!(Paginator::clamp_page(1, total), 1);
}

#[test]
fn test_tier_colors_are_stable() {
    let first = TierColorResolver::color_for("MT3");
    assert_eq!(TierColorResolver::color_for("MT3"), first);
}

#[tokio::test]
async fn test_submission_is_stored() {
    let store = Arc::new(SqliteStore::in_memory().await.unwrap());
    let app = router(AppState::new(store.clone(), Settings::default()));

    let body = json!({
        "minecraft_username": "Notch",
        "playstyle": 90,
        "movement": 85,
        "pvp": 88,
        "building": 70,
        "projectiles": 80
    });
    let request = Request::builder()
        .method(Method::POST)
        .uri("/api/snowfall/submit")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap();

    let response = app.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    // mean 82.6
    let json = read_json(response).await;
    assert_eq!(json["player"]["tier"], "MT2");

    let stored = store.get_snowfall_player("Notch").await.unwrap().unwrap();
    assert_eq!(stored.overall_score, 82.6);
    assert_eq!(stored.tier, "MT2");
    assert_eq!(stored.building, 70);
}

#[tokio::test]
async fn test_realtime_recompute_feeds_leaderboard() {
    let store = Arc::new(SqliteStore::in_memory().await.unwrap());

    store.insert_player(&Player::new("p1", "Alice")).await.unwrap();
    store.insert_player(&Player::new("p2", "Bob")).await.unwrap();
    store
        .add_tier_assignment("p1", &TierAssignment::new("Crystal", "HT1", 60.0))
        .await
        .unwrap();
    store
        .add_tier_assignment("p1", &TierAssignment::new("sumo", "HT3", 10.0))
        .await
        .unwrap();
    store
        .add_tier_assignment("p2", &TierAssignment::new("bridge", "LT5", 1.0))
        .await
        .unwrap();

    let recomputer = PointsRecomputer::new(store.clone());
    let events = futures::stream::iter(vec![
        ChangeEvent::new(TIER_TABLE, ChangeKind::Insert, "p1"),
        ChangeEvent::new(TIER_TABLE, ChangeKind::Insert, "p1"),
        ChangeEvent::new(TIER_TABLE, ChangeKind::Insert, "p2"),
    ]);
    assert_eq!(recomputer.run(events).await, 3);

    let app = router(AppState::new(store.clone(), Settings::default()));
    let request = Request::builder().uri("/api/leaderboard").body(Body::empty()).unwrap();
    let json = read_json(app.clone().oneshot(request).await.unwrap()).await;

    assert_eq!(json["total_players"], 2);
    assert_eq!(json["pagination"]["total_pages"], 1);
    assert_eq!(json["players"][0]["id"], "p1");
    assert_eq!(json["players"][0]["points"], 70);
    assert_eq!(json["players"][0]["rank"], "Combat Specialist");
    assert_eq!(json["players"][1]["rank"], "Rookie");

    let request = Request::builder().uri("/api/players/p1").body(Body::empty()).unwrap();
    let json = read_json(app.oneshot(request).await.unwrap()).await;
    assert_eq!(json["tiers"][0]["tier"], "HT1");
    assert_eq!(json["tiers"][5]["gamemode"], "sumo");
    assert_eq!(json["tiers"][5]["tier"], "HT3");
}
