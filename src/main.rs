use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::sync::Arc;
use tier_board::{
    api::{self, AppState},
    config::{Environment, Settings, StoreKind},
    ranking::{GamemodeTierAggregator, ModeTier, Paginator, RankClassifier, SnowfallTierCalculator, SubScores},
    store::{
        realtime::TIER_TABLE, ChangeEvent, ChangeKind, ClientState, PlayerStore, PointsRecomputer,
        RestStore, SqliteStore,
    },
};
use tracing::{error, info, warn};
use tracing_subscriber::{fmt, EnvFilter};

#[derive(Parser)]
#[clap(name = "tier-board")]
#[clap(about = "Minecraft tier leaderboard backend", long_about = None)]
struct Cli {
    /// Config file to load instead of config/default and config/local
    #[clap(short, long, global = true)]
    config: Option<PathBuf>,

    #[clap(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the API server
    Serve {
        /// Port to listen on (overrides api.port)
        #[clap(short, long)]
        port: Option<u16>,
    },

    /// Show the rank tier for a point total
    Rank {
        #[clap(allow_negative_numbers = true)]
        points: f64,
    },

    /// Classify five snowfall sub-scores
    Snowfall {
        playstyle: f64,
        movement: f64,
        pvp: f64,
        building: f64,
        projectiles: f64,
    },

    /// Print one leaderboard page
    Leaderboard {
        #[clap(short, long, default_value = "1", allow_negative_numbers = true)]
        page: i64,
    },

    /// Show a player's rank and per-mode tiers
    Player {
        id: String,
    },

    /// Recompute aggregate points for the given players
    Recompute {
        #[clap(required = true)]
        player_ids: Vec<String>,
    },

    /// Record a visit in the local client state
    Visit,
}

async fn open_store(settings: &Settings) -> anyhow::Result<Arc<dyn PlayerStore>> {
    let store: Arc<dyn PlayerStore> = match settings.backend.store {
        StoreKind::Sqlite => Arc::new(SqliteStore::connect(&settings.database).await?),
        StoreKind::Rest => Arc::new(RestStore::new(&settings.backend)?),
    };
    Ok(store)
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Load configuration. An explicit file must load; the implicit
    // config/ directory may fall back to defaults.
    let (mut settings, fell_back) = match &cli.config {
        Some(path) => (Settings::from_file(path)?, false),
        None => match Settings::new() {
            Ok(settings) => (settings, false),
            Err(_) => (Settings::default(), true),
        },
    };

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&settings.app.log_level));
    fmt().with_env_filter(filter).init();

    info!(
        "{} v{} ({:?})",
        settings.app.name, settings.app.version, settings.app.environment
    );
    if fell_back {
        info!("Using default settings");
    }
    if settings.app.environment == Environment::Production && settings.api.submission_key.is_none() {
        warn!("No submission key configured; keyed submissions will be rejected");
    }

    if let Err(e) = settings.validate() {
        error!("Invalid settings: {}", e);
        return Err(anyhow::anyhow!(e));
    }

    match cli.command {
        Commands::Serve { port } => {
            if let Some(port) = port {
                settings.api.port = port;
            }
            let store = open_store(&settings).await?;
            api::serve(AppState::new(store, settings)).await?;
        }

        Commands::Rank { points } => {
            let classifier = RankClassifier::new();
            let rank = classifier.classify(points);

            println!("Rank: {} ({})", rank.title, rank.color);
            match classifier.next_rank(points) {
                Some(next) => println!(
                    "Next: {} at {} points ({}% there)",
                    next.title,
                    next.min_points,
                    classifier.progress_to_next(points)
                ),
                None => println!("Top rank reached"),
            }
        }

        Commands::Snowfall { playstyle, movement, pvp, building, projectiles } => {
            let scores = SubScores::new(playstyle, movement, pvp, building, projectiles);
            let result = SnowfallTierCalculator::calculate(&scores)?;
            println!("Overall: {:.1}", result.overall_display());
            println!("Tier: {}", result.tier);
        }

        Commands::Leaderboard { page } => {
            let store = open_store(&settings).await?;
            let classifier = RankClassifier::new();
            let page_size = settings.leaderboard.page_size;

            let total = store.count_players().await?;
            let pagination = Paginator::state(page, total, page_size);
            let offset = pagination.offset(page_size);

            println!("Page {} of {}", pagination.current_page, pagination.total_pages);
            for (i, player) in store.list_players(offset, page_size).await?.iter().enumerate() {
                println!(
                    "{:>4}. {:<20} {:>6}  {}",
                    offset + i as u64 + 1,
                    player.display_name,
                    player.points,
                    classifier.classify(player.points as f64).title
                );
            }
        }

        Commands::Player { id } => {
            let store = open_store(&settings).await?;
            let Some(player) = store.get_player(&id).await? else {
                error!("Player {} not found", id);
                return Ok(());
            };

            let classifier = RankClassifier::new();
            let points = player.points as f64;
            println!("{} ({} points)", player.display_name, player.points);
            println!(
                "Rank: {} ({}% to next)",
                classifier.classify(points).title,
                classifier.progress_to_next(points)
            );

            let lookup = GamemodeTierAggregator::aggregate_all(&player.tier_assignments);
            for row in ModeTier::from_lookup(&lookup) {
                println!("  {:<10} {:<10} {}", row.gamemode.as_str(), row.tier, row.color.hex());
            }
        }

        Commands::Recompute { player_ids } => {
            let store = open_store(&settings).await?;
            let recomputer = PointsRecomputer::new(store);
            let events = futures::stream::iter(
                player_ids
                    .into_iter()
                    .map(|id| ChangeEvent::new(TIER_TABLE, ChangeKind::Update, id)),
            );
            let applied = recomputer.run(events).await;
            info!("Recomputed points for {} player(s)", applied);
        }

        Commands::Visit => {
            let store = SqliteStore::connect(&settings.database).await?;
            let state = ClientState::load(store.pool().clone()).await?;

            if !state.welcome_shown() {
                println!("Welcome to the tier board!");
                state.mark_welcome_shown().await?;
            }
            println!("Visitors so far: {}", state.record_visit().await?);
        }
    }

    Ok(())
}
