// ═══════════════════════════════════════════════════════════════════════
// Runner — CLI entry point for running games and tournaments
// ═══════════════════════════════════════════════════════════════════════

use clap::{Parser, Subcommand};
use conquest_engine::config::GameConfig;
use conquest_tournament::{make_agents, run_game, run_many, AgentKind, Database, GameResult};
use std::collections::BTreeMap;
use std::error::Error;
use std::process::ExitCode;
use tracing::info;
use tracing_subscriber::EnvFilter;

const DEFAULT_LOG_FILTER: &str = "warn,conquest=info";

#[derive(Parser)]
#[command(name = "conquest", about = "Territory conquest rule engine and bot lab")]
struct Cli {
    /// Log filter, e.g. "conquest_engine=debug". Defaults to RUST_LOG.
    #[arg(long, global = true)]
    log: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run a single game between bots
    Play {
        /// Random when omitted
        #[arg(short, long)]
        seed: Option<u64>,
        #[arg(short, long, default_value_t = 4)]
        players: usize,
        /// Comma-separated agent kinds, assigned to seats in turn
        #[arg(short, long, value_delimiter = ',', default_value = "greedy,random")]
        agents: Vec<AgentKind>,
        /// JSON game configuration; overrides --players and --seed
        #[arg(short, long)]
        config: Option<String>,
        #[arg(long, default_value_t = 50_000)]
        max_actions: usize,
        /// Print the result as JSON
        #[arg(long)]
        json: bool,
    },
    /// Run a tournament of N games
    Tournament {
        #[arg(short, long, default_value_t = 100)]
        games: u32,
        #[arg(short, long, default_value_t = 4)]
        players: usize,
        #[arg(short, long, value_delimiter = ',', default_value = "greedy,random")]
        agents: Vec<AgentKind>,
        #[arg(short, long, default_value_t = 42)]
        seed: u64,
        #[arg(short, long)]
        config: Option<String>,
        #[arg(short, long, default_value = "results.db")]
        db: String,
        /// ELO K-factor
        #[arg(short, long, default_value_t = 32.0)]
        k: f64,
        #[arg(long, default_value_t = 50_000)]
        max_actions: usize,
    },
    /// Show leaderboard from database
    Leaderboard {
        #[arg(short, long, default_value = "results.db")]
        db: String,
    },
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.log.as_deref());

    let outcome = match cli.command {
        Commands::Play { seed, players, agents, config, max_actions, json } => {
            let seed = seed.unwrap_or_else(rand::random);
            load_config(config.as_deref(), players, seed)
                .and_then(|config| cmd_play(&config, &agents, max_actions, json))
        }
        Commands::Tournament { games, players, agents, seed, config, db, k, max_actions } => {
            load_config(config.as_deref(), players, seed)
                .and_then(|config| cmd_tournament(&config, games, &agents, &db, k, max_actions))
        }
        Commands::Leaderboard { db } => cmd_leaderboard(&db),
    };

    match outcome {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {e}");
            ExitCode::FAILURE
        }
    }
}

fn init_logging(filter: Option<&str>) {
    let filter = match filter {
        Some(f) => EnvFilter::new(f),
        None => EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER)),
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

fn load_config(path: Option<&str>, players: usize, seed: u64) -> Result<GameConfig, Box<dyn Error>> {
    let config = match path {
        Some(path) => GameConfig::from_json(&std::fs::read_to_string(path)?)?,
        None => GameConfig::with_players(players, seed),
    };
    config.validate()?;
    Ok(config)
}

fn cmd_play(config: &GameConfig, kinds: &[AgentKind], max_actions: usize, json: bool) -> Result<(), Box<dyn Error>> {
    info!(seed = config.seed, players = config.players.len(), "starting game");

    let mut agents = make_agents(kinds, config.players.len(), config.seed);
    let result = run_game(&mut agents, config, max_actions)?;

    if json {
        println!("{}", serde_json::to_string_pretty(&result)?);
        return Ok(());
    }

    println!("=== Conquest ===\n");
    println!("Seed {}, {} players\n", config.seed, config.players.len());
    println!("Winner: {} ({}) after {} turns", result.winner, result.winner_agent, result.turns);
    println!("Actions: {} ({} rejected)\n", result.actions, result.rejected_actions);
    println!("Final standings:");
    for pr in &result.player_results {
        let status = match pr.eliminated_by {
            Some(by) => format!("eliminated by {by}"),
            None => format!("{} territories, {} troops, {} cards", pr.territories, pr.troops, pr.cards),
        };
        println!("  {} {:8} {:<45} [{}]", pr.player, pr.agent_name, status, pr.objective);
    }
    Ok(())
}

fn cmd_tournament(
    config: &GameConfig,
    games: u32,
    kinds: &[AgentKind],
    db_path: &str,
    k: f64,
    max_actions: usize,
) -> Result<(), Box<dyn Error>> {
    println!("=== Tournament: {} games, {} players ===\n", games, config.players.len());

    let db = Database::open(db_path)?;
    let seeds: Vec<u64> = (0..games as u64).map(|g| config.seed.wrapping_add(g * 1000)).collect();
    let results = run_many(config, &seeds, kinds, max_actions);

    let mut wins: BTreeMap<String, u32> = BTreeMap::new();
    let mut seat_wins: BTreeMap<String, u32> = BTreeMap::new();
    let mut errors = 0u32;
    for (seed, outcome) in results {
        match outcome {
            Ok(result) => {
                record(&db, &result, k)?;
                *wins.entry(result.winner_agent.clone()).or_insert(0) += 1;
                *seat_wins.entry(result.winner.to_string()).or_insert(0) += 1;
            }
            Err(e) => {
                errors += 1;
                eprintln!("Game with seed {seed}: ERROR -- {e}");
            }
        }
    }

    println!("--- Summary ({} games, {} errors) ---", games, errors);
    let pct = |w: u32| if games > 0 { w as f64 / games as f64 * 100.0 } else { 0.0 };
    for (name, w) in &wins {
        println!("  {:10}: {:>4} wins ({:.1}%)", name, w, pct(*w));
    }
    println!("\nBy seat:");
    for (seat, w) in &seat_wins {
        println!("  {:10}: {:>4} wins ({:.1}%)", seat, w, pct(*w));
    }
    println!("\nResults saved to: {}", db_path);
    println!("Total games in DB: {}", db.game_count()?);
    Ok(())
}

fn record(db: &Database, result: &GameResult, k: f64) -> Result<(), Box<dyn Error>> {
    db.store_game(result)?;
    db.rate_game(result, k)?;
    Ok(())
}

fn cmd_leaderboard(db_path: &str) -> Result<(), Box<dyn Error>> {
    let db = Database::open(db_path)?;
    let board = db.leaderboard()?;
    if board.is_empty() {
        println!("No agents found. Run some tournaments first.");
        return Ok(());
    }
    println!("=== Leaderboard ===\n");
    println!("{:<20} {:>8} {:>8} {:>8}", "Agent", "ELO", "Games", "Wins");
    println!("{}", "-".repeat(48));
    for entry in &board {
        println!("{:<20} {:>8.1} {:>8} {:>8}", entry.name, entry.elo, entry.games, entry.wins);
    }
    Ok(())
}
