use anyhow::Context;
use arcade_hub::{
    api::{self, AppState},
    config::Settings,
    games::tictactoe::{empty_cells, TicTacToeGame, TicTacToeInput},
    games::GameSession,
    ledger::{AlgodClient, CachedAccountReader, LedgerClientConfig, SimulatedLedger},
    models::{BalanceCache, Difficulty, GameType},
    rewards::{AttemptStatus, RewardQueue},
    scoring::{ScoreSubmission, TierTable},
    service::ArcadeService,
    store::{ArcadeStore, SqliteStore},
};
use clap::{Parser, Subcommand};
use futures::future::join_all;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use std::sync::Arc;
use std::time::Duration;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[clap(name = "arcade-hub")]
#[clap(about = "Play-to-earn arcade: scores, rewards and leaderboard", long_about = None)]
struct Cli {
    #[clap(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the API server
    Serve {
        /// Port to listen on (defaults to api.port)
        #[clap(short, long)]
        port: Option<u16>,
    },

    /// Show the reward a score would earn
    Reward {
        /// Game name (snake, trivia, tictactoe, ...)
        #[clap(short, long)]
        game: String,

        #[clap(short, long, allow_negative_numbers = true)]
        score: i64,
    },

    /// Record a finished game for a player and wait for its rewards
    Submit {
        /// Player wallet address
        #[clap(short, long)]
        address: String,

        #[clap(short, long)]
        game: String,

        #[clap(short, long, allow_negative_numbers = true)]
        score: i64,

        #[clap(short, long)]
        difficulty: Option<String>,

        /// Display name to store with the profile
        #[clap(short, long)]
        name: Option<String>,
    },

    /// Print the leaderboard
    Leaderboard {
        #[clap(short, long, default_value = "10")]
        limit: usize,
    },

    /// Play random moves against the tic-tac-toe AI
    Simulate {
        #[clap(short, long, default_value = "medium")]
        difficulty: String,

        #[clap(short, long, default_value = "100")]
        games: u32,

        #[clap(long)]
        seed: Option<u64>,
    },
}

fn parse_game(game: &str) -> anyhow::Result<GameType> {
    GameType::from_str(game).ok_or_else(|| anyhow::anyhow!("Unknown game: {}", game))
}

async fn open_store(settings: &Settings) -> anyhow::Result<Arc<dyn ArcadeStore>> {
    let store = SqliteStore::connect(&settings.database)
        .await
        .with_context(|| format!("Failed to open database {}", settings.database.url))?;
    Ok(Arc::new(store))
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Load configuration
    let settings = Settings::new().unwrap_or_else(|e| {
        eprintln!("Using default settings: {}", e);
        Settings::default()
    });

    // Initialize logging; RUST_LOG wins over app.log_level
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&settings.app.log_level));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    // Validate settings
    if let Err(e) = settings.validate() {
        error!("Invalid settings: {}", e);
        return Err(anyhow::anyhow!(e));
    }

    let tiers = TierTable::from_settings(&settings.rewards)?;

    match cli.command {
        Commands::Serve { port } => {
            let store = open_store(&settings).await?;
            let ledger = Arc::new(SimulatedLedger::from_settings(&settings.ledger));
            let rewards = Arc::new(RewardQueue::new(ledger, &settings.issuance));
            let service = Arc::new(ArcadeService::new(store, tiers).with_rewards(rewards));

            let algod = AlgodClient::new(LedgerClientConfig::from(&settings.ledger))?;
            let cache = BalanceCache::new(Duration::from_secs(settings.cache.balance_ttl_seconds));
            let accounts = Arc::new(CachedAccountReader::new(algod, cache));

            let port = port.unwrap_or(settings.api.port);
            let listener = tokio::net::TcpListener::bind((settings.api.host.as_str(), port))
                .await
                .with_context(|| format!("Failed to bind {}:{}", settings.api.host, port))?;

            info!("Starting {} v{}", settings.app.name, settings.app.version);
            api::serve(listener, AppState::new(service, accounts)).await?;
        }

        Commands::Reward { game, score } => {
            let game_type = parse_game(&game)?;
            let reward = tiers.evaluate(game_type, score);

            println!("\n=== {} score {} ===", game_type, score.max(0));
            println!("Tokens: {}", reward.tokens);
            match reward.badge {
                Some(badge) => println!("Badge: {}", badge),
                None => println!("Badge: none"),
            }
        }

        Commands::Submit {
            address,
            game,
            score,
            difficulty,
            name,
        } => {
            let game_type = parse_game(&game)?;
            let store = open_store(&settings).await?;
            let ledger = Arc::new(SimulatedLedger::from_settings(&settings.ledger));
            let rewards = Arc::new(RewardQueue::new(ledger, &settings.issuance));
            let service = ArcadeService::new(store, tiers).with_rewards(rewards);

            service.attach(&address, name.as_deref()).await?;
            let mut submission = ScoreSubmission::new(address.clone(), game_type, score);
            if let Some(difficulty) = difficulty {
                submission = submission.with_difficulty(difficulty);
            }
            let outcome = service.submit_score(submission).await?;

            println!("\n=== Score recorded ===");
            println!("Player: {}", address);
            println!("Game: {} ({} points)", outcome.event.game_type, outcome.event.score);
            println!("Tokens earned: {}", outcome.reward.tokens);
            if let Some(badge) = &outcome.new_badge {
                println!("New badge: {}", badge);
            }
            println!(
                "Totals: {} games, {} points, {} tokens",
                outcome.stats.games_played, outcome.stats.total_score, outcome.stats.tokens_earned
            );
            if !outcome.persisted {
                warn!("Score was not saved to {}", settings.database.url);
            }

            let settled = join_all(outcome.tickets.into_iter().map(|ticket| ticket.wait())).await;
            for attempt in settled {
                let attempt = attempt?;
                match attempt.status {
                    AttemptStatus::Confirmed { tx_id } => {
                        println!("✅ {:?} confirmed: {}", attempt.kind, tx_id)
                    }
                    AttemptStatus::Failed { error } => {
                        println!("❌ {:?} failed after {} attempts: {}", attempt.kind, attempt.attempts, error)
                    }
                    AttemptStatus::Pending => {}
                }
            }
        }

        Commands::Leaderboard { limit } => {
            let store = open_store(&settings).await?;
            let service = ArcadeService::new(store, tiers);

            println!("\n=== Leaderboard ===");
            for entry in service.leaderboard(Some(limit)).await? {
                println!(
                    "{:>3}. {:<20} {:>8} pts {:>6} tokens {:>2} badges",
                    entry.rank, entry.display_name, entry.total_score, entry.tokens_earned, entry.badges
                );
            }
        }

        Commands::Simulate {
            difficulty,
            games,
            seed,
        } => {
            let difficulty = Difficulty::from_label(&difficulty);
            let seed = seed.unwrap_or_else(rand::random);
            let mut human = StdRng::seed_from_u64(seed);
            let mut game =
                TicTacToeGame::with_settings(seed, difficulty, settings.rewards.tictactoe.clone());

            for _ in 0..games {
                game.handle(TicTacToeInput::Start);
                loop {
                    let Some(&cell) = empty_cells(game.board()).choose(&mut human) else {
                        break;
                    };
                    if game.handle(TicTacToeInput::Play(cell)).result().is_some() {
                        break;
                    }
                }
            }

            let record = game.record();
            println!("\n=== Tic-tac-toe vs {} AI (seed {}) ===", difficulty, seed);
            println!("Wins: {}", record.wins);
            println!("Losses: {}", record.losses);
            println!("Draws: {}", record.draws);
        }
    }

    Ok(())
}
