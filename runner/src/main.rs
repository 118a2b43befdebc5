// ═══════════════════════════════════════════════════════════════════════
// Runner — CLI entry point for running games and tournaments
// ═══════════════════════════════════════════════════════════════════════

use clap::{Parser, Subcommand};
use std::collections::HashMap;
use std::io::{self, BufRead};
use std::path::PathBuf;
use warzone_agents::{HumanStrategy, StdinSource, Strategy};
use warzone_engine::engine::submit_command;
use warzone_engine::map::{builtin, MapGraph, BUILTIN_MAPS};
use warzone_engine::setup::create_initial_state;
use warzone_engine::types::*;
use warzone_engine::Rules;
use warzone_tournament::{run_game, run_tournament, Database, GameResult, TournamentConfig};

#[derive(Parser)]
#[command(name = "warzone-runner", about = "Warzone territory-conquest simulator")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Play a single game on a builtin map
    Play {
        #[arg(short, long, default_value = "classic")]
        map: String,
        /// Comma-separated strategies, one per player (human, random,
        /// aggressive, benevolent, cheater)
        #[arg(short, long, default_value = "aggressive,random", value_delimiter = ',')]
        players: Vec<String>,
        #[arg(short, long, default_value_t = 42)]
        seed: u64,
        #[arg(short = 'D', long)]
        max_rounds: Option<u32>,
        /// JSON rules file; missing fields keep their defaults
        #[arg(short, long)]
        rules: Option<PathBuf>,
        /// Print the full game log at the end
        #[arg(long)]
        log: bool,
        /// Write the final game state as JSON
        #[arg(long)]
        save: Option<PathBuf>,
    },
    /// Build a game with startup commands typed on stdin, then play it
    Console {
        /// Start from a builtin map instead of an empty one
        #[arg(short, long)]
        map: Option<String>,
        #[arg(short, long, default_value_t = 42)]
        seed: u64,
    },
    /// Run a tournament: every map × game for one strategy lineup
    Tournament {
        #[arg(short = 'M', long, value_delimiter = ',', default_value = "tiny,classic")]
        maps: Vec<String>,
        #[arg(short = 'P', long, value_delimiter = ',', default_value = "aggressive,benevolent,random,cheater")]
        strategies: Vec<String>,
        #[arg(short = 'G', long, default_value_t = 3)]
        games: u32,
        #[arg(short = 'D', long, default_value_t = 30)]
        max_rounds: u32,
        #[arg(short, long, default_value_t = 42)]
        seed: u64,
        /// JSON tournament config; overrides the flags above
        #[arg(short, long)]
        config: Option<PathBuf>,
        #[arg(long, default_value = "results.db")]
        db: String,
    },
    /// Show leaderboard from database
    Leaderboard {
        #[arg(long, default_value = "results.db")]
        db: String,
    },
    /// Check a builtin map for connectivity
    Validate {
        map: String,
    },
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();

    let outcome = match cli.command {
        Commands::Play { map, players, seed, max_rounds, rules, log, save } => {
            cmd_play(&map, &players, seed, max_rounds, rules, log, save)
        }
        Commands::Console { map, seed } => cmd_console(map.as_deref(), seed),
        Commands::Tournament { maps, strategies, games, max_rounds, seed, config, db } => {
            cmd_tournament(maps, &strategies, games, max_rounds, seed, config, &db)
        }
        Commands::Leaderboard { db } => cmd_leaderboard(&db),
        Commands::Validate { map } => cmd_validate(&map),
    };

    if let Err(e) = outcome {
        eprintln!("error: {}", e);
        std::process::exit(1);
    }
}

fn parse_kinds(names: &[String]) -> Result<Vec<StrategyKind>, String> {
    names.iter().map(|n| n.trim().parse::<StrategyKind>()).collect()
}

fn cmd_play(
    map_name: &str,
    players: &[String],
    seed: u64,
    max_rounds: Option<u32>,
    rules_path: Option<PathBuf>,
    show_log: bool,
    save: Option<PathBuf>,
) -> Result<(), String> {
    let mut rules = match rules_path {
        Some(path) => Rules::from_file(&path).map_err(|e| e.to_string())?,
        None => Rules::default(),
    };
    if let Some(n) = max_rounds {
        rules.max_rounds = n;
    }
    let kinds = parse_kinds(players)?;

    println!("=== Warzone ===\n");
    println!("Map: {}, seed: {}, players: {}\n", map_name, seed, players.join(", "));

    let map = builtin(map_name).map_err(|e| e.to_string())?;
    let lineup = warzone_tournament::runner::lineup_names(&kinds);
    let mut state = create_initial_state(map, &lineup, rules, seed).map_err(|e| e.to_string())?;
    let mut strategies = make_strategies(&lineup, seed)?;

    let limit = usize::MAX;
    let result = run_game(&mut state, &mut strategies, limit)?;
    print_result(&result);

    if show_log {
        println!("\n--- Game log ---");
        for entry in &state.log {
            println!("{}", entry);
        }
    }
    if let Some(path) = save {
        let json = serde_json::to_string_pretty(&state).map_err(|e| e.to_string())?;
        std::fs::write(&path, json).map_err(|e| format!("cannot write {}: {}", path.display(), e))?;
        println!("\nFinal state saved to {}", path.display());
    }
    Ok(())
}

fn cmd_console(map_name: Option<&str>, seed: u64) -> Result<(), String> {
    let map = match map_name {
        Some(name) => builtin(name).map_err(|e| e.to_string())?,
        None => MapGraph::new("console"),
    };
    let mut state = GameState::new(map, Rules::default(), seed);

    println!("Startup commands: editcontinent, editcountry, editneighbor, validatemap,");
    println!("gameplayer, assigncountries. Players added here are human.\n");

    let stdin = io::stdin();
    let mut lines = stdin.lock().lines();
    while state.phase == Phase::Startup {
        let Some(Ok(line)) = lines.next() else { return Ok(()) };
        if line.trim().is_empty() {
            continue;
        }
        let before = state.log.len();
        let _ = submit_command(&mut state, "console", &line);
        for entry in &state.log[before..] {
            println!("  {}", entry);
        }
    }
    drop(lines);

    let mut strategies: HashMap<String, Box<dyn Strategy>> = HashMap::new();
    for p in state.players.iter().filter(|p| !p.is_neutral()) {
        strategies.insert(p.name.clone(), Box::new(HumanStrategy::new(&p.name, StdinSource)));
    }
    let result = run_game(&mut state, &mut strategies, usize::MAX)?;
    print_result(&result);
    Ok(())
}

fn cmd_tournament(
    maps: Vec<String>,
    strategies: &[String],
    games: u32,
    max_rounds: u32,
    seed: u64,
    config_path: Option<PathBuf>,
    db_path: &str,
) -> Result<(), String> {
    let config = match config_path {
        Some(path) => {
            let json = std::fs::read_to_string(&path).map_err(|e| format!("cannot read {}: {}", path.display(), e))?;
            TournamentConfig::from_json_str(&json)?
        }
        None => TournamentConfig {
            maps,
            strategies: parse_kinds(strategies)?,
            games_per_map: games,
            max_rounds,
            base_seed: seed,
        },
    };

    println!(
        "=== Tournament: {} maps × {} games, {} strategies ===\n",
        config.maps.len(),
        config.games_per_map,
        config.strategies.len()
    );

    let report = run_tournament(&config)?;
    println!("{}", report.table());

    let db = Database::new(db_path).map_err(|e| e.to_string())?;
    for result in report.results() {
        let id = db.store_game(result).map_err(|e| e.to_string())?;
        tracing::debug!(target: "warzone::runner", game_id = id, map = %result.map, seed = result.seed, "stored");
    }

    let total = report.cells.len();
    println!("--- Summary ({} games, {} errors) ---", total, report.errors());
    for (label, wins) in report.tally() {
        let pct = if total > 0 { wins as f64 / total as f64 * 100.0 } else { 0.0 };
        println!("  {:12}: {:>4} ({:.1}%)", label, wins, pct);
    }
    println!("\nResults saved to: {}", db_path);
    println!("Total games in DB: {}", db.game_count().map_err(|e| e.to_string())?);
    Ok(())
}

fn cmd_leaderboard(db_path: &str) -> Result<(), String> {
    let db = Database::new(db_path).map_err(|e| e.to_string())?;
    let board = db.leaderboard().map_err(|e| e.to_string())?;
    if board.is_empty() {
        println!("No strategies found. Run some tournaments first.");
        return Ok(());
    }
    println!("=== Leaderboard ===\n");
    println!("{:<14} {:>8} {:>8} {:>8} {:>8}", "Strategy", "ELO", "Games", "Wins", "Draws");
    println!("{}", "-".repeat(50));
    for row in &board {
        println!(
            "{:<14} {:>8.1} {:>8} {:>8} {:>8}",
            row.strategy, row.elo, row.games, row.wins, row.draws
        );
    }
    Ok(())
}

fn cmd_validate(map_name: &str) -> Result<(), String> {
    let map = builtin(map_name).map_err(|e| format!("{} (available: {})", e, BUILTIN_MAPS.join(", ")))?;
    match map.validate() {
        Ok(()) => {
            println!(
                "'{}' is valid: {} countries, {} continents",
                map.name,
                map.country_count(),
                map.continents().len()
            );
            Ok(())
        }
        Err(e) => Err(e.to_string()),
    }
}

fn make_strategies(
    lineup: &[(String, StrategyKind)],
    seed: u64,
) -> Result<HashMap<String, Box<dyn Strategy>>, String> {
    let mut strategies: HashMap<String, Box<dyn Strategy>> = HashMap::new();
    for (i, (name, kind)) in lineup.iter().enumerate() {
        let strategy: Box<dyn Strategy> = match kind {
            StrategyKind::Human => Box::new(HumanStrategy::new(name, StdinSource)),
            _ => warzone_agents::build(*kind, name, seed.wrapping_add(i as u64 + 1))?,
        };
        strategies.insert(name.clone(), strategy);
    }
    Ok(strategies)
}

fn print_result(result: &GameResult) {
    println!("Game finished!");
    match &result.winner {
        Some(w) => println!("  Winner: {} ({})", w, result.winner_label()),
        None => println!("  Result: Draw"),
    }
    println!("  Rounds played: {}", result.rounds_played);
    println!();
    println!("  Final standings:");
    for pr in &result.player_results {
        println!(
            "    {:16} -- countries: {:>3}, armies: {:>5}, cards: {}{}",
            pr.player,
            pr.final_countries,
            pr.final_armies,
            pr.final_cards,
            if pr.eliminated { "  (eliminated)" } else { "" }
        );
    }
}
