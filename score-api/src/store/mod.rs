#[cfg(test)]
mod tests;

use std::{
    collections::HashSet,
    fs,
    path::Path,
    sync::{Mutex, MutexGuard},
};

use rusqlite::{params, Connection, OptionalExtension};
use serde::Serialize;

pub(crate) const DATABASE_FILE: &str = "game.db";

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PlayerRecord {
    pub id: i64,
    pub player_name: String,
    pub high_score: i64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RegisterOutcome {
    Registered,
    AlreadyExists,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubmitOutcome {
    /// The submitted score beat the stored high score.
    Raised { high_score: i64 },
    Kept { high_score: i64 },
    UnknownPlayer,
}

/// SQLite-backed player table. One connection, serialized behind a mutex.
pub struct PlayerStore {
    conn: Mutex<Connection>,
}

const PLAYERS_SCHEMA_MIGRATIONS: [(&str, &str); 1] = [(
    "high_score",
    "ALTER TABLE players ADD COLUMN high_score INTEGER NOT NULL DEFAULT 0;",
)];

impl PlayerStore {
    /// Open (or create) `{data_dir}/game.db` and bring the schema up to date.
    pub fn open(data_dir: &Path) -> Result<Self, String> {
        fs::create_dir_all(data_dir)
            .map_err(|e| format!("failed to create data dir {}: {e}", data_dir.display()))?;

        let db_path = data_dir.join(DATABASE_FILE);
        let conn = Connection::open(&db_path)
            .map_err(|e| format!("failed to open SQLite at {}: {e}", db_path.display()))?;

        conn.execute_batch(
            "PRAGMA journal_mode=WAL;
             PRAGMA busy_timeout=5000;
             PRAGMA synchronous=NORMAL;",
        )
        .map_err(|e| format!("failed to set pragmas: {e}"))?;

        conn.execute_batch(
            "CREATE TABLE IF NOT EXISTS players (
                id          INTEGER PRIMARY KEY AUTOINCREMENT,
                player_name TEXT UNIQUE NOT NULL,
                high_score  INTEGER NOT NULL DEFAULT 0
            );",
        )
        .map_err(|e| format!("failed to create schema: {e}"))?;

        Self::ensure_players_schema(&conn)?;

        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    fn lock(&self) -> Result<MutexGuard<'_, Connection>, String> {
        self.conn
            .lock()
            .map_err(|_| "player store mutex poisoned".to_string())
    }

    fn ensure_players_schema(conn: &Connection) -> Result<(), String> {
        let mut columns = Self::players_columns(conn)?;
        for (column, migration_sql) in PLAYERS_SCHEMA_MIGRATIONS {
            if columns.contains(column) {
                continue;
            }

            tracing::warn!(column, "applying players table migration");
            conn.execute_batch(migration_sql)
                .map_err(|e| format!("failed to add players.{column}: {e}"))?;
            columns.insert(column.to_string());
        }
        Ok(())
    }

    fn players_columns(conn: &Connection) -> Result<HashSet<String>, String> {
        let mut stmt = conn
            .prepare("PRAGMA table_info(players)")
            .map_err(|e| format!("failed to read players table info: {e}"))?;
        let rows = stmt
            .query_map([], |row| row.get::<_, String>(1))
            .map_err(|e| format!("failed to iterate players columns: {e}"))?;

        let mut columns = HashSet::new();
        for row in rows {
            columns.insert(row.map_err(|e| format!("failed to parse players column info: {e}"))?);
        }
        Ok(columns)
    }

    /// Insert a new player with a zero high score. Names are unique.
    pub fn register(&self, player_name: &str) -> Result<RegisterOutcome, String> {
        let conn = self.lock()?;
        let inserted = conn
            .execute(
                "INSERT INTO players (player_name, high_score) VALUES (?1, 0)
                 ON CONFLICT(player_name) DO NOTHING",
                params![player_name],
            )
            .map_err(|e| format!("register player failed: {e}"))?;

        Ok(if inserted == 0 {
            RegisterOutcome::AlreadyExists
        } else {
            RegisterOutcome::Registered
        })
    }

    pub fn get(&self, player_name: &str) -> Result<Option<PlayerRecord>, String> {
        let conn = self.lock()?;
        Self::get_with(&conn, player_name)
    }

    fn get_with(conn: &Connection, player_name: &str) -> Result<Option<PlayerRecord>, String> {
        conn.query_row(
            "SELECT id, player_name, high_score FROM players WHERE player_name = ?1",
            params![player_name],
            |row| {
                Ok(PlayerRecord {
                    id: row.get(0)?,
                    player_name: row.get(1)?,
                    high_score: row.get(2)?,
                })
            },
        )
        .optional()
        .map_err(|e| format!("get player failed: {e}"))
    }

    /// Raise the stored high score to `score` if it is higher.
    pub fn submit_score(&self, player_name: &str, score: i64) -> Result<SubmitOutcome, String> {
        let conn = self.lock()?;
        let raised = conn
            .execute(
                "UPDATE players SET high_score = ?2 WHERE player_name = ?1 AND high_score < ?2",
                params![player_name, score],
            )
            .map_err(|e| format!("submit score failed: {e}"))?;

        if raised > 0 {
            return Ok(SubmitOutcome::Raised { high_score: score });
        }

        Ok(match Self::get_with(&conn, player_name)? {
            Some(record) => SubmitOutcome::Kept {
                high_score: record.high_score,
            },
            None => SubmitOutcome::UnknownPlayer,
        })
    }

    pub fn count(&self) -> Result<usize, String> {
        let conn = self.lock()?;
        conn.query_row("SELECT COUNT(*) FROM players", [], |row| row.get::<_, i64>(0))
            .map(|count| count as usize)
            .map_err(|e| format!("count players failed: {e}"))
    }
}
