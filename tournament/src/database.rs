// ═══════════════════════════════════════════════════════════════════════
// Database — SQLite storage for tournament results and ELO ratings
// ═══════════════════════════════════════════════════════════════════════

use crate::runner::GameResult;
use rusqlite::{params, Connection};
use thiserror::Error;

pub const DEFAULT_ELO: f64 = 1500.0;

#[derive(Debug, Error)]
pub enum DbError {
    #[error("sqlite: {0}")]
    Sqlite(#[from] rusqlite::Error),
}

#[derive(Debug, Clone, PartialEq)]
pub struct LeaderboardEntry {
    pub name: String,
    pub elo: f64,
    pub games: u32,
    pub wins: u32,
}

pub struct Database {
    conn: Connection,
}

impl Database {
    /// Open (or create) a database at the given path.
    pub fn open(path: &str) -> Result<Self, DbError> {
        let db = Database { conn: Connection::open(path)? };
        db.create_schema()?;
        Ok(db)
    }

    /// In-memory database (useful for tests).
    pub fn in_memory() -> Result<Self, DbError> {
        let db = Database { conn: Connection::open_in_memory()? };
        db.create_schema()?;
        Ok(db)
    }

    fn create_schema(&self) -> Result<(), DbError> {
        self.conn.execute_batch("
            CREATE TABLE IF NOT EXISTS agents (
                id          INTEGER PRIMARY KEY,
                name        TEXT NOT NULL UNIQUE,
                elo         REAL NOT NULL DEFAULT 1500.0,
                games       INTEGER NOT NULL DEFAULT 0,
                wins        INTEGER NOT NULL DEFAULT 0
            );

            CREATE TABLE IF NOT EXISTS games (
                id          INTEGER PRIMARY KEY,
                seed        INTEGER NOT NULL,
                turns       INTEGER NOT NULL,
                actions     INTEGER NOT NULL,
                rejected    INTEGER NOT NULL,
                winner_seat INTEGER NOT NULL,
                played_at   TEXT NOT NULL DEFAULT (datetime('now'))
            );

            CREATE TABLE IF NOT EXISTS game_players (
                id            INTEGER PRIMARY KEY,
                game_id       INTEGER NOT NULL REFERENCES games(id),
                agent_id      INTEGER NOT NULL REFERENCES agents(id),
                seat          INTEGER NOT NULL,
                territories   INTEGER NOT NULL,
                troops        INTEGER NOT NULL,
                cards         INTEGER NOT NULL,
                eliminated_by INTEGER,
                objective     TEXT NOT NULL
            );
        ")?;
        Ok(())
    }

    /// Register an agent (or return existing ID).
    pub fn register_agent(&self, name: &str) -> Result<i64, DbError> {
        self.conn.execute(
            "INSERT OR IGNORE INTO agents (name) VALUES (?1)",
            params![name],
        )?;
        let id = self.conn.query_row(
            "SELECT id FROM agents WHERE name = ?1",
            params![name],
            |row| row.get(0),
        )?;
        Ok(id)
    }

    /// Store a completed game and bump per-agent game/win counters.
    /// Agents are registered on the fly by name.
    pub fn store_game(&self, result: &GameResult) -> Result<i64, DbError> {
        let tx = self.conn.unchecked_transaction()?;
        tx.execute(
            "INSERT INTO games (seed, turns, actions, rejected, winner_seat) VALUES (?1, ?2, ?3, ?4, ?5)",
            params![
                result.seed as i64,
                result.turns,
                result.actions as i64,
                result.rejected_actions as i64,
                result.winner.0,
            ],
        )?;
        let game_id = tx.last_insert_rowid();

        for pr in &result.player_results {
            let agent_id = self.register_agent(&pr.agent_name)?;
            tx.execute(
                "INSERT INTO game_players (game_id, agent_id, seat, territories, troops, cards, eliminated_by, objective)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
                params![
                    game_id,
                    agent_id,
                    pr.player.0,
                    pr.territories as i64,
                    pr.troops,
                    pr.cards as i64,
                    pr.eliminated_by.map(|p| p.0),
                    pr.objective,
                ],
            )?;
            let won = pr.player == result.winner;
            tx.execute(
                "UPDATE agents SET games = games + 1, wins = wins + ?1 WHERE id = ?2",
                params![won as i64, agent_id],
            )?;
        }

        tx.commit()?;
        Ok(game_id)
    }

    /// Update ELO ratings for a set of agents after a game.
    /// Simple multiplayer ELO: winner gains K points from each loser.
    pub fn update_elo(&self, winner_id: i64, loser_ids: &[i64], k: f64) -> Result<(), DbError> {
        for &loser_id in loser_ids {
            let winner_elo = self.elo(winner_id)?;
            let loser_elo = self.elo(loser_id)?;

            let expected_winner = 1.0 / (1.0 + 10f64.powf((loser_elo - winner_elo) / 400.0));
            let expected_loser = 1.0 - expected_winner;

            let delta_w = k * (1.0 - expected_winner);
            let delta_l = k * (0.0 - expected_loser);

            self.conn.execute(
                "UPDATE agents SET elo = elo + ?1 WHERE id = ?2",
                params![delta_w, winner_id],
            )?;
            self.conn.execute(
                "UPDATE agents SET elo = elo + ?1 WHERE id = ?2",
                params![delta_l, loser_id],
            )?;
        }
        Ok(())
    }

    /// ELO update for a stored result: the winning agent against every
    /// other distinct agent at the table.
    pub fn rate_game(&self, result: &GameResult, k: f64) -> Result<(), DbError> {
        let winner_id = self.register_agent(&result.winner_agent)?;
        let mut loser_ids = Vec::new();
        for pr in &result.player_results {
            let id = self.register_agent(&pr.agent_name)?;
            if id != winner_id && !loser_ids.contains(&id) {
                loser_ids.push(id);
            }
        }
        self.update_elo(winner_id, &loser_ids, k)
    }

    fn elo(&self, agent_id: i64) -> Result<f64, DbError> {
        let elo = self.conn.query_row(
            "SELECT elo FROM agents WHERE id = ?1",
            params![agent_id],
            |row| row.get(0),
        );
        match elo {
            Ok(v) => Ok(v),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(DEFAULT_ELO),
            Err(e) => Err(e.into()),
        }
    }

    /// Get ELO leaderboard.
    pub fn leaderboard(&self) -> Result<Vec<LeaderboardEntry>, DbError> {
        let mut stmt = self.conn.prepare(
            "SELECT name, elo, games, wins FROM agents ORDER BY elo DESC"
        )?;
        let rows = stmt.query_map([], |row| {
            Ok(LeaderboardEntry {
                name: row.get(0)?,
                elo: row.get(1)?,
                games: row.get(2)?,
                wins: row.get(3)?,
            })
        })?;
        let entries = rows.collect::<Result<Vec<_>, _>>()?;
        Ok(entries)
    }

    /// Get total number of games stored.
    pub fn game_count(&self) -> Result<u32, DbError> {
        let count = self.conn.query_row("SELECT COUNT(*) FROM games", [], |row| row.get(0))?;
        Ok(count)
    }
}
