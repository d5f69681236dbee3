use std::sync::Arc;
use std::time::Duration;

use axum::{
    routing::{get, post},
    Router,
};
use tokio::{net::TcpListener, signal};
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};
use tracing::info;

pub mod error;
pub mod handlers;

use crate::config::Settings;
use crate::models::Result;
use crate::ranking::RankClassifier;
use crate::store::PlayerStore;
use handlers::{
    leaderboard, method_not_allowed, player_profile, quick_search, submit_snowfall,
    submit_snowfall_keyed,
};

#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn PlayerStore>,
    pub settings: Arc<Settings>,
    pub classifier: RankClassifier,
}

impl AppState {
    pub fn new(store: Arc<dyn PlayerStore>, settings: Settings) -> Self {
        Self {
            store,
            settings: Arc::new(settings),
            classifier: RankClassifier::new(),
        }
    }
}

pub fn router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any)
        .max_age(Duration::from_secs(60 * 60));

    Router::new()
        .route(
            "/api/snowfall/submit",
            post(submit_snowfall).fallback(method_not_allowed),
        )
        .route(
            "/api/snowfall/submit-keyed",
            post(submit_snowfall_keyed).fallback(method_not_allowed),
        )
        .route("/api/leaderboard", get(leaderboard))
        .route("/api/players/:id", get(player_profile))
        .route("/api/search", get(quick_search))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}

pub async fn serve(state: AppState) -> Result<()> {
    let address = format!("{}:{}", state.settings.api.host, state.settings.api.port);
    let app = router(state);

    info!("Binding to {address}");
    let listener = TcpListener::bind(&address).await?;
    info!("Server running on {address}");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server shut down");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if signal::ctrl_c().await.is_ok() {
            info!("Received Ctrl+C, shutting down");
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
                info!("Received terminate signal, shutting down");
            }
            Err(_) => std::future::pending::<()>().await,
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
