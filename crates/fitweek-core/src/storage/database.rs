//! SQLite-backed ledger storage and standings queries.
//!
//! Implements the [`UserStore`]/[`TeamStore`] persistence interfaces the
//! ledger writer consumes, plus registration, team membership, and the
//! read-only standings queries used for display. Display queries never
//! mutate ledgers.

use chrono::{DateTime, Utc};
use rusqlite::{params, Connection, Row};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::DatabaseError;
use crate::gate::SubmissionPolicy;
use crate::ledger::{StoreError, TeamLedger, TeamStore, UserLedger, UserStore};
use crate::points::PointBreakdown;

use super::data_dir;

/// Minimum scoring members before a team appears in the rankings.
const RANKING_MIN_MEMBERS: u32 = 3;
/// How many teams the ranking lists.
const RANKING_LIMIT: u32 = 15;

/// One row of the team leaderboard.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TeamRanking {
    pub name: String,
    pub total_points: u32,
    pub members: u32,
    /// Average total per scoring member, rounded to one decimal.
    pub average_points: f64,
}

/// One member's standing within their own team.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MemberRanking {
    pub name: String,
    pub total_points: u32,
    pub team_name: String,
}

/// Per-guild aggregate across all scoring participants.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GuildStanding {
    pub guild: String,
    pub participants: u32,
    /// Per-category point sums across the guild.
    pub points: PointBreakdown,
    pub average_total: f64,
}

/// One row of the individual leaderboard.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserRank {
    pub name: String,
    pub guild: Option<String>,
    pub total_points: u32,
}

/// SQLite database holding user and team ledgers.
pub struct Database {
    conn: Connection,
}

impl Database {
    /// Get a reference to the underlying SQLite connection.
    pub fn conn(&self) -> &Connection {
        &self.conn
    }

    /// Open the database at `<data_dir>/fitweek.db`, creating the file
    /// and schema as needed.
    ///
    /// # Errors
    /// Returns an error if the database cannot be opened or migrated.
    pub fn open() -> Result<Self, DatabaseError> {
        let path = data_dir()
            .map_err(|e| DatabaseError::QueryFailed(e.to_string()))?
            .join("fitweek.db");
        let conn = Connection::open(&path).map_err(|source| DatabaseError::OpenFailed {
            path: path.clone(),
            source,
        })?;
        let db = Self { conn };
        db.migrate()
            .map_err(|e| DatabaseError::MigrationFailed(e.to_string()))?;
        Ok(db)
    }

    /// Open an in-memory database (for tests).
    pub fn open_memory() -> Result<Self, DatabaseError> {
        let conn = Connection::open_in_memory().map_err(DatabaseError::from)?;
        let db = Self { conn };
        db.migrate()
            .map_err(|e| DatabaseError::MigrationFailed(e.to_string()))?;
        Ok(db)
    }

    fn migrate(&self) -> Result<(), rusqlite::Error> {
        self.conn.execute_batch(
            "CREATE TABLE IF NOT EXISTS users (
                user_id         INTEGER PRIMARY KEY,
                name            TEXT NOT NULL,
                guild           TEXT,
                team_id         TEXT,
                exercise        INTEGER NOT NULL DEFAULT 0,
                sports_turn     INTEGER NOT NULL DEFAULT 0,
                try_sport       INTEGER NOT NULL DEFAULT 0,
                try_recipe      INTEGER NOT NULL DEFAULT 0,
                good_sleep      INTEGER NOT NULL DEFAULT 0,
                meditate        INTEGER NOT NULL DEFAULT 0,
                less_alc        INTEGER NOT NULL DEFAULT 0,
                total           INTEGER NOT NULL DEFAULT 0,
                last_submission TEXT
            );

            CREATE TABLE IF NOT EXISTS teams (
                id          TEXT PRIMARY KEY,
                name        TEXT NOT NULL UNIQUE,
                exercise    INTEGER NOT NULL DEFAULT 0,
                sports_turn INTEGER NOT NULL DEFAULT 0,
                try_sport   INTEGER NOT NULL DEFAULT 0,
                try_recipe  INTEGER NOT NULL DEFAULT 0,
                good_sleep  INTEGER NOT NULL DEFAULT 0,
                meditate    INTEGER NOT NULL DEFAULT 0,
                less_alc    INTEGER NOT NULL DEFAULT 0,
                total       INTEGER NOT NULL DEFAULT 0
            );

            -- Standings scan by membership and total.
            CREATE INDEX IF NOT EXISTS idx_users_team_id ON users(team_id);
            CREATE INDEX IF NOT EXISTS idx_users_total ON users(total);",
        )
    }

    // ── Registration & membership ────────────────────────────────────

    /// Register a new user with a zeroed ledger.
    ///
    /// # Errors
    /// Fails if the identity is already registered.
    pub fn create_user(
        &self,
        user_id: i64,
        name: &str,
        guild: Option<&str>,
    ) -> Result<UserLedger, DatabaseError> {
        let ledger = UserLedger::new(user_id, name, guild.map(str::to_string));
        self.conn.execute(
            "INSERT INTO users (user_id, name, guild) VALUES (?1, ?2, ?3)",
            params![ledger.user_id, ledger.name, ledger.guild],
        )?;
        Ok(ledger)
    }

    /// Remove a user's ledger entirely. Returns whether a row existed.
    /// Team totals are deliberately untouched: they are maintained
    /// incrementally, not recomputed from members.
    pub fn delete_user(&self, user_id: i64) -> Result<bool, DatabaseError> {
        let affected = self
            .conn
            .execute("DELETE FROM users WHERE user_id = ?1", params![user_id])?;
        Ok(affected > 0)
    }

    /// Create a team with a zeroed ledger and a fresh id.
    pub fn create_team(&self, name: &str) -> Result<TeamLedger, DatabaseError> {
        let ledger = TeamLedger::new(name);
        self.conn.execute(
            "INSERT INTO teams (id, name) VALUES (?1, ?2)",
            params![ledger.id.to_string(), ledger.name],
        )?;
        Ok(ledger)
    }

    pub fn find_team_by_name(&self, name: &str) -> Result<Option<TeamLedger>, DatabaseError> {
        let mut stmt = self
            .conn
            .prepare("SELECT id, name, exercise, sports_turn, try_sport, try_recipe, good_sleep, meditate, less_alc, total FROM teams WHERE name = ?1")?;
        let mut rows = stmt.query_map(params![name], team_from_row)?;
        rows.next().transpose().map_err(DatabaseError::from)
    }

    /// Point a user's ledger at a team.
    pub fn join_team(&self, user_id: i64, team_id: Uuid) -> Result<(), DatabaseError> {
        let affected = self.conn.execute(
            "UPDATE users SET team_id = ?1 WHERE user_id = ?2",
            params![team_id.to_string(), user_id],
        )?;
        if affected == 0 {
            return Err(DatabaseError::QueryFailed(format!(
                "no user {user_id} to add to a team"
            )));
        }
        Ok(())
    }

    // ── Standings (read-only) ────────────────────────────────────────

    /// Teams ranked by average points per scoring member. Only teams with
    /// more than [`RANKING_MIN_MEMBERS`] scoring members appear, capped at
    /// [`RANKING_LIMIT`] rows.
    pub fn team_rankings(&self) -> Result<Vec<TeamRanking>, DatabaseError> {
        let mut stmt = self.conn.prepare(
            "SELECT t.name, SUM(u.total), COUNT(u.user_id), AVG(u.total)
             FROM users u JOIN teams t ON t.id = u.team_id
             WHERE u.total > 0
             GROUP BY u.team_id
             HAVING COUNT(u.user_id) > ?1
             ORDER BY AVG(u.total) DESC
             LIMIT ?2",
        )?;
        let rows = stmt.query_map(params![RANKING_MIN_MEMBERS, RANKING_LIMIT], |row| {
            Ok(TeamRanking {
                name: row.get(0)?,
                total_points: row.get(1)?,
                members: row.get(2)?,
                average_points: round1(row.get(3)?),
            })
        })?;
        rows.collect::<Result<_, _>>().map_err(DatabaseError::from)
    }

    /// Members of the given user's team, highest total first. Empty when
    /// the user has no team.
    pub fn team_member_rankings(&self, user_id: i64) -> Result<Vec<MemberRanking>, DatabaseError> {
        let mut stmt = self.conn.prepare(
            "SELECT u.name, u.total, t.name
             FROM users u JOIN teams t ON t.id = u.team_id
             WHERE u.team_id = (SELECT team_id FROM users WHERE user_id = ?1)
             ORDER BY u.total DESC",
        )?;
        let rows = stmt.query_map(params![user_id], |row| {
            Ok(MemberRanking {
                name: row.get(0)?,
                total_points: row.get(1)?,
                team_name: row.get(2)?,
            })
        })?;
        rows.collect::<Result<_, _>>().map_err(DatabaseError::from)
    }

    /// A user's cumulative breakdown, if registered.
    pub fn user_summary(&self, user_id: i64) -> Result<Option<PointBreakdown>, DatabaseError> {
        Ok(self
            .find_user_ledger(user_id)?
            .map(|ledger| ledger.points))
    }

    /// Guilds with per-category totals and average total per participant,
    /// best average first. Only users with points count as participants.
    pub fn guild_standings(&self) -> Result<Vec<GuildStanding>, DatabaseError> {
        let mut stmt = self.conn.prepare(
            "SELECT guild, COUNT(*),
                    SUM(exercise), SUM(sports_turn), SUM(try_sport), SUM(try_recipe),
                    SUM(good_sleep), SUM(meditate), SUM(less_alc), SUM(total),
                    AVG(total)
             FROM users
             WHERE total > 0 AND guild IS NOT NULL
             GROUP BY guild
             ORDER BY AVG(total) DESC",
        )?;
        let rows = stmt.query_map([], |row| {
            Ok(GuildStanding {
                guild: row.get(0)?,
                participants: row.get(1)?,
                points: PointBreakdown {
                    exercise: row.get(2)?,
                    sports_turn: row.get(3)?,
                    try_sport: row.get(4)?,
                    try_recipe: row.get(5)?,
                    good_sleep: row.get(6)?,
                    meditate: row.get(7)?,
                    less_alc: row.get(8)?,
                    total: row.get(9)?,
                },
                average_total: round1(row.get(10)?),
            })
        })?;
        rows.collect::<Result<_, _>>().map_err(DatabaseError::from)
    }

    /// The top scoring individuals.
    pub fn top_users(&self, limit: u32) -> Result<Vec<UserRank>, DatabaseError> {
        let mut stmt = self.conn.prepare(
            "SELECT name, guild, total FROM users
             WHERE total > 0
             ORDER BY total DESC
             LIMIT ?1",
        )?;
        let rows = stmt.query_map(params![limit], |row| {
            Ok(UserRank {
                name: row.get(0)?,
                guild: row.get(1)?,
                total_points: row.get(2)?,
            })
        })?;
        rows.collect::<Result<_, _>>().map_err(DatabaseError::from)
    }

    /// Users the weekly reminder should go to: everyone the submission
    /// gate would still let through at `now`.
    pub fn users_needing_reminder(
        &self,
        policy: &SubmissionPolicy,
        now: DateTime<Utc>,
    ) -> Result<Vec<UserLedger>, DatabaseError> {
        let mut stmt = self.conn.prepare(&format!(
            "SELECT {USER_COLUMNS} FROM users ORDER BY user_id"
        ))?;
        let rows = stmt.query_map([], user_from_row)?;
        let mut due = Vec::new();
        for row in rows {
            let ledger = row?;
            if policy.check(ledger.last_submission, now).allowed {
                due.push(ledger);
            }
        }
        Ok(due)
    }

    // ── Row access ───────────────────────────────────────────────────

    fn find_user_ledger(&self, user_id: i64) -> Result<Option<UserLedger>, DatabaseError> {
        let mut stmt = self.conn.prepare(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE user_id = ?1"
        ))?;
        let mut rows = stmt.query_map(params![user_id], user_from_row)?;
        rows.next().transpose().map_err(DatabaseError::from)
    }

    fn find_team_ledger(&self, team_id: Uuid) -> Result<Option<TeamLedger>, DatabaseError> {
        let mut stmt = self.conn.prepare(
            "SELECT id, name, exercise, sports_turn, try_sport, try_recipe, good_sleep, meditate, less_alc, total FROM teams WHERE id = ?1",
        )?;
        let mut rows = stmt.query_map(params![team_id.to_string()], team_from_row)?;
        rows.next().transpose().map_err(DatabaseError::from)
    }

    fn upsert_user(&self, ledger: &UserLedger) -> Result<(), DatabaseError> {
        self.conn.execute(
            "INSERT INTO users (user_id, name, guild, team_id, exercise, sports_turn,
                                try_sport, try_recipe, good_sleep, meditate, less_alc,
                                total, last_submission)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13)
             ON CONFLICT(user_id) DO UPDATE SET
                name = excluded.name,
                guild = excluded.guild,
                team_id = excluded.team_id,
                exercise = excluded.exercise,
                sports_turn = excluded.sports_turn,
                try_sport = excluded.try_sport,
                try_recipe = excluded.try_recipe,
                good_sleep = excluded.good_sleep,
                meditate = excluded.meditate,
                less_alc = excluded.less_alc,
                total = excluded.total,
                last_submission = excluded.last_submission",
            params![
                ledger.user_id,
                ledger.name,
                ledger.guild,
                ledger.team.map(|id| id.to_string()),
                ledger.points.exercise,
                ledger.points.sports_turn,
                ledger.points.try_sport,
                ledger.points.try_recipe,
                ledger.points.good_sleep,
                ledger.points.meditate,
                ledger.points.less_alc,
                ledger.points.total,
                ledger.last_submission.map(|t| t.to_rfc3339()),
            ],
        )?;
        Ok(())
    }

    fn upsert_team(&self, ledger: &TeamLedger) -> Result<(), DatabaseError> {
        self.conn.execute(
            "INSERT INTO teams (id, name, exercise, sports_turn, try_sport, try_recipe,
                                good_sleep, meditate, less_alc, total)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)
             ON CONFLICT(id) DO UPDATE SET
                name = excluded.name,
                exercise = excluded.exercise,
                sports_turn = excluded.sports_turn,
                try_sport = excluded.try_sport,
                try_recipe = excluded.try_recipe,
                good_sleep = excluded.good_sleep,
                meditate = excluded.meditate,
                less_alc = excluded.less_alc,
                total = excluded.total",
            params![
                ledger.id.to_string(),
                ledger.name,
                ledger.points.exercise,
                ledger.points.sports_turn,
                ledger.points.try_sport,
                ledger.points.try_recipe,
                ledger.points.good_sleep,
                ledger.points.meditate,
                ledger.points.less_alc,
                ledger.points.total,
            ],
        )?;
        Ok(())
    }
}

const USER_COLUMNS: &str = "user_id, name, guild, team_id, exercise, sports_turn, try_sport, \
                            try_recipe, good_sleep, meditate, less_alc, total, last_submission";

fn user_from_row(row: &Row<'_>) -> rusqlite::Result<UserLedger> {
    let team: Option<String> = row.get(3)?;
    let last_submission: Option<String> = row.get(12)?;
    Ok(UserLedger {
        user_id: row.get(0)?,
        name: row.get(1)?,
        guild: row.get(2)?,
        team: team
            .map(|raw| Uuid::parse_str(&raw))
            .transpose()
            .map_err(|e| conversion_error(3, e))?,
        points: PointBreakdown {
            exercise: row.get(4)?,
            sports_turn: row.get(5)?,
            try_sport: row.get(6)?,
            try_recipe: row.get(7)?,
            good_sleep: row.get(8)?,
            meditate: row.get(9)?,
            less_alc: row.get(10)?,
            total: row.get(11)?,
        },
        last_submission: last_submission
            .map(|raw| {
                DateTime::parse_from_rfc3339(&raw).map(|t| t.with_timezone(&Utc))
            })
            .transpose()
            .map_err(|e| conversion_error(12, e))?,
    })
}

fn team_from_row(row: &Row<'_>) -> rusqlite::Result<TeamLedger> {
    let id: String = row.get(0)?;
    Ok(TeamLedger {
        id: Uuid::parse_str(&id).map_err(|e| conversion_error(0, e))?,
        name: row.get(1)?,
        points: PointBreakdown {
            exercise: row.get(2)?,
            sports_turn: row.get(3)?,
            try_sport: row.get(4)?,
            try_recipe: row.get(5)?,
            good_sleep: row.get(6)?,
            meditate: row.get(7)?,
            less_alc: row.get(8)?,
            total: row.get(9)?,
        },
    })
}

fn conversion_error(
    column: usize,
    err: impl std::error::Error + Send + Sync + 'static,
) -> rusqlite::Error {
    rusqlite::Error::FromSqlConversionFailure(
        column,
        rusqlite::types::Type::Text,
        Box::new(err),
    )
}

fn round1(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

impl UserStore for Database {
    fn find_user(&self, user_id: i64) -> Result<Option<UserLedger>, StoreError> {
        self.find_user_ledger(user_id).map_err(StoreError::from)
    }

    fn save_user(&self, ledger: &UserLedger) -> Result<(), StoreError> {
        self.upsert_user(ledger).map_err(StoreError::from)
    }
}

impl TeamStore for Database {
    fn find_team(&self, team_id: Uuid) -> Result<Option<TeamLedger>, StoreError> {
        self.find_team_ledger(team_id).map_err(StoreError::from)
    }

    fn save_team(&self, ledger: &TeamLedger) -> Result<(), StoreError> {
        self.upsert_team(ledger).map_err(StoreError::from)
    }
}
