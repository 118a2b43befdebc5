// ═══════════════════════════════════════════════════════════════════════
// Database — SQLite storage for tournament results and ELO ratings
//
// Ratings are kept per strategy, not per player name: `Aggressive-1` and
// `Aggressive-3` in one game both count for "Aggressive".
// ═══════════════════════════════════════════════════════════════════════

use crate::runner::{GameResult, DRAW};
use rusqlite::{params, Connection, Result};

pub const DEFAULT_K: f64 = 32.0;

pub struct Database {
    conn: Connection,
}

#[derive(Debug, Clone, PartialEq)]
pub struct LeaderboardRow {
    pub strategy: String,
    pub elo: f64,
    pub games: u32,
    pub wins: u32,
    pub draws: u32,
}

impl Database {
    /// Open (or create) a database at the given path.
    pub fn new(path: &str) -> Result<Self> {
        let db = Database { conn: Connection::open(path)? };
        db.create_schema()?;
        Ok(db)
    }

    /// In-memory database (useful for tests).
    pub fn in_memory() -> Result<Self> {
        let db = Database { conn: Connection::open_in_memory()? };
        db.create_schema()?;
        Ok(db)
    }

    fn create_schema(&self) -> Result<()> {
        self.conn.execute_batch(
            "
            CREATE TABLE IF NOT EXISTS strategies (
                id          INTEGER PRIMARY KEY,
                name        TEXT NOT NULL UNIQUE,
                elo         REAL NOT NULL DEFAULT 1500.0,
                games       INTEGER NOT NULL DEFAULT 0,
                wins        INTEGER NOT NULL DEFAULT 0,
                draws       INTEGER NOT NULL DEFAULT 0
            );

            CREATE TABLE IF NOT EXISTS games (
                id          INTEGER PRIMARY KEY,
                map         TEXT NOT NULL,
                seed        INTEGER NOT NULL,
                rounds      INTEGER NOT NULL,
                winner      TEXT NOT NULL,
                winner_player TEXT,
                played_at   TEXT NOT NULL DEFAULT (datetime('now'))
            );

            CREATE TABLE IF NOT EXISTS game_players (
                id          INTEGER PRIMARY KEY,
                game_id     INTEGER NOT NULL REFERENCES games(id),
                strategy_id INTEGER NOT NULL REFERENCES strategies(id),
                player      TEXT NOT NULL,
                countries   INTEGER NOT NULL,
                armies      INTEGER NOT NULL,
                cards       INTEGER NOT NULL,
                eliminated  INTEGER NOT NULL
            );
        ",
        )
    }

    /// Register a strategy (or return its existing ID).
    pub fn register_strategy(&self, name: &str) -> Result<i64> {
        self.conn
            .execute("INSERT OR IGNORE INTO strategies (name) VALUES (?1)", params![name])?;
        self.conn
            .query_row("SELECT id FROM strategies WHERE name = ?1", params![name], |row| row.get(0))
    }

    /// Store a completed game, update per-strategy stats and ratings.
    pub fn store_game(&self, result: &GameResult) -> Result<i64> {
        let label = result.winner_label();
        self.conn.execute(
            "INSERT INTO games (map, seed, rounds, winner, winner_player) VALUES (?1, ?2, ?3, ?4, ?5)",
            params![result.map, result.seed as i64, result.rounds_played as i64, label, result.winner],
        )?;
        let game_id = self.conn.last_insert_rowid();

        let mut ids: Vec<(String, i64)> = Vec::new();
        for pr in &result.player_results {
            let name = pr.strategy.to_string();
            let strategy_id = self.register_strategy(&name)?;
            self.conn.execute(
                "INSERT INTO game_players (game_id, strategy_id, player, countries, armies, cards, eliminated)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
                params![
                    game_id,
                    strategy_id,
                    pr.player,
                    pr.final_countries as i64,
                    pr.final_armies as i64,
                    pr.final_cards as i64,
                    pr.eliminated,
                ],
            )?;
            if !ids.iter().any(|(n, _)| *n == name) {
                ids.push((name, strategy_id));
            }
        }

        let is_draw = label == DRAW;
        for (name, id) in &ids {
            let won = !is_draw && *name == label;
            self.conn.execute(
                "UPDATE strategies SET games = games + 1, wins = wins + ?1, draws = draws + ?2 WHERE id = ?3",
                params![won as i64, is_draw as i64, id],
            )?;
        }

        if is_draw {
            let all: Vec<i64> = ids.iter().map(|(_, id)| *id).collect();
            self.record_draw(&all, DEFAULT_K)?;
        } else if let Some((_, winner_id)) = ids.iter().find(|(n, _)| *n == label) {
            let losers: Vec<i64> = ids.iter().filter(|(n, _)| *n != label).map(|(_, id)| *id).collect();
            self.update_elo(*winner_id, &losers, DEFAULT_K)?;
        }

        Ok(game_id)
    }

    fn elo(&self, id: i64) -> Result<f64> {
        self.conn
            .query_row("SELECT elo FROM strategies WHERE id = ?1", params![id], |row| row.get(0))
    }

    /// Move both ratings toward `score_a` (1 win, 0.5 draw, 0 loss for `a`).
    fn rate_pair(&self, a: i64, b: i64, score_a: f64, k: f64) -> Result<()> {
        let (elo_a, elo_b) = (self.elo(a)?, self.elo(b)?);
        let expected_a = 1.0 / (1.0 + 10f64.powf((elo_b - elo_a) / 400.0));
        let delta = k * (score_a - expected_a);
        self.conn
            .execute("UPDATE strategies SET elo = elo + ?1 WHERE id = ?2", params![delta, a])?;
        self.conn
            .execute("UPDATE strategies SET elo = elo - ?1 WHERE id = ?2", params![delta, b])?;
        Ok(())
    }

    /// Simple multiplayer ELO: winner gains from each loser.
    pub fn update_elo(&self, winner_id: i64, loser_ids: &[i64], k: f64) -> Result<()> {
        for &loser_id in loser_ids {
            self.rate_pair(winner_id, loser_id, 1.0, k)?;
        }
        Ok(())
    }

    /// Every pair scores half a point.
    pub fn record_draw(&self, ids: &[i64], k: f64) -> Result<()> {
        for (i, &a) in ids.iter().enumerate() {
            for &b in &ids[i + 1..] {
                self.rate_pair(a, b, 0.5, k)?;
            }
        }
        Ok(())
    }

    /// Strategies by rating, best first.
    pub fn leaderboard(&self) -> Result<Vec<LeaderboardRow>> {
        let mut stmt = self
            .conn
            .prepare("SELECT name, elo, games, wins, draws FROM strategies ORDER BY elo DESC, name")?;
        let rows = stmt.query_map([], |row| {
            Ok(LeaderboardRow {
                strategy: row.get(0)?,
                elo: row.get(1)?,
                games: row.get(2)?,
                wins: row.get(3)?,
                draws: row.get(4)?,
            })
        })?;
        rows.collect()
    }

    /// Get total number of games stored.
    pub fn game_count(&self) -> Result<u32> {
        self.conn.query_row("SELECT COUNT(*) FROM games", [], |row| row.get(0))
    }

    /// Winner labels of stored games for one map, oldest first.
    pub fn winners_on(&self, map: &str) -> Result<Vec<String>> {
        let mut stmt = self.conn.prepare("SELECT winner FROM games WHERE map = ?1 ORDER BY id")?;
        let rows = stmt.query_map(params![map], |row| row.get(0))?;
        rows.collect()
    }
}
