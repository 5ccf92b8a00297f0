//! Cumulative point ledgers and the commit path.
//!
//! `UserLedger` and `TeamLedger` are the only shared mutable records in
//! the system. They are mutated exclusively by [`LedgerWriter::commit`],
//! never by the scoring session directly.
//!
//! ## Dual write
//!
//! There is no cross-entity transaction primitive: the user save and the
//! team save are independently failable. The writer performs a best-effort
//! two-phase sequence — user first, then team — and if the team write
//! fails after the user write succeeded, the user-side state is retained,
//! the inconsistency is logged, and an error is reported.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::LedgerError;
use crate::points::PointBreakdown;

/// Persisted per-user cumulative record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserLedger {
    /// Opaque identity supplied by the chat transport.
    pub user_id: i64,
    pub name: String,
    /// Display-only grouping, independent of teams.
    pub guild: Option<String>,
    /// Current team membership, if any.
    pub team: Option<Uuid>,
    pub points: PointBreakdown,
    /// Stamp of the most recent committed submission; drives the weekly gate.
    pub last_submission: Option<DateTime<Utc>>,
}

impl UserLedger {
    /// Fresh ledger for a newly registered user.
    pub fn new(user_id: i64, name: impl Into<String>, guild: Option<String>) -> Self {
        Self {
            user_id,
            name: name.into(),
            guild,
            team: None,
            points: PointBreakdown::zeroed(),
            last_submission: None,
        }
    }
}

/// Persisted per-team cumulative record, maintained incrementally.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TeamLedger {
    pub id: Uuid,
    pub name: String,
    pub points: PointBreakdown,
}

impl TeamLedger {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
            points: PointBreakdown::zeroed(),
        }
    }
}

/// Error type for store implementations.
///
/// Stores differ (SQLite in production, doubles in tests), so the traits
/// erase the concrete error.
pub type StoreError = Box<dyn std::error::Error + Send + Sync>;

/// Identity lookup and user persistence, durable once `Ok`.
pub trait UserStore {
    fn find_user(&self, user_id: i64) -> Result<Option<UserLedger>, StoreError>;
    fn save_user(&self, ledger: &UserLedger) -> Result<(), StoreError>;
}

/// Team persistence, durable once `Ok`. Independently failable from
/// [`UserStore`].
pub trait TeamStore {
    fn find_team(&self, team_id: Uuid) -> Result<Option<TeamLedger>, StoreError>;
    fn save_team(&self, ledger: &TeamLedger) -> Result<(), StoreError>;
}

/// Applies a finalized breakdown to the user and team ledgers.
pub struct LedgerWriter<'a, S: UserStore + TeamStore> {
    store: &'a S,
}

impl<'a, S: UserStore + TeamStore> LedgerWriter<'a, S> {
    pub fn new(store: &'a S) -> Self {
        Self { store }
    }

    /// Fold `breakdown` into the user's cumulative record, stamp
    /// `last_submission = now`, and apply the identical delta to the
    /// user's team (if any). Returns the updated user ledger.
    ///
    /// # Errors
    ///
    /// - [`LedgerError::InconsistentBreakdown`] if the finalized-total
    ///   invariant does not hold; nothing is written.
    /// - [`LedgerError::UserNotFound`] / [`LedgerError::UserWrite`] if the
    ///   user side fails; nothing is written.
    /// - [`LedgerError::TeamWrite`] if the team side fails after the user
    ///   write succeeded; the user write is retained.
    pub fn commit(
        &self,
        user_id: i64,
        breakdown: &PointBreakdown,
        now: DateTime<Utc>,
    ) -> Result<UserLedger, LedgerError> {
        if !breakdown.is_consistent() {
            return Err(LedgerError::InconsistentBreakdown {
                total: breakdown.total,
                sum: breakdown.category_sum(),
            });
        }

        let mut user = self
            .store
            .find_user(user_id)
            .map_err(LedgerError::UserWrite)?
            .ok_or(LedgerError::UserNotFound { user_id })?;

        user.points.absorb(breakdown);
        user.last_submission = Some(now);
        self.store.save_user(&user).map_err(LedgerError::UserWrite)?;

        if let Some(team_id) = user.team {
            self.apply_to_team(team_id, breakdown).map_err(|message| {
                tracing::warn!(
                    user_id,
                    team_id = %team_id,
                    %message,
                    "team ledger write failed after user write; totals now diverge"
                );
                LedgerError::TeamWrite {
                    team_id: team_id.to_string(),
                    message,
                }
            })?;
        }

        Ok(user)
    }

    fn apply_to_team(&self, team_id: Uuid, breakdown: &PointBreakdown) -> Result<(), String> {
        let mut team = self
            .store
            .find_team(team_id)
            .map_err(|e| e.to_string())?
            .ok_or_else(|| "team record missing".to_string())?;
        team.points.absorb(breakdown);
        self.store.save_team(&team).map_err(|e| e.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rules::Category;
    use std::cell::RefCell;
    use std::collections::HashMap;

    /// In-memory store double with an optional failure switch per side.
    struct MemoryStore {
        users: RefCell<HashMap<i64, UserLedger>>,
        teams: RefCell<HashMap<Uuid, TeamLedger>>,
        fail_team_saves: bool,
        team_saves: RefCell<u32>,
        user_saves: RefCell<u32>,
    }

    impl MemoryStore {
        fn new() -> Self {
            Self {
                users: RefCell::new(HashMap::new()),
                teams: RefCell::new(HashMap::new()),
                fail_team_saves: false,
                team_saves: RefCell::new(0),
                user_saves: RefCell::new(0),
            }
        }

        fn insert_user(&self, user: UserLedger) {
            self.users.borrow_mut().insert(user.user_id, user);
        }

        fn insert_team(&self, team: TeamLedger) {
            self.teams.borrow_mut().insert(team.id, team);
        }
    }

    impl UserStore for MemoryStore {
        fn find_user(&self, user_id: i64) -> Result<Option<UserLedger>, StoreError> {
            Ok(self.users.borrow().get(&user_id).cloned())
        }

        fn save_user(&self, ledger: &UserLedger) -> Result<(), StoreError> {
            *self.user_saves.borrow_mut() += 1;
            self.users.borrow_mut().insert(ledger.user_id, ledger.clone());
            Ok(())
        }
    }

    impl TeamStore for MemoryStore {
        fn find_team(&self, team_id: Uuid) -> Result<Option<TeamLedger>, StoreError> {
            Ok(self.teams.borrow().get(&team_id).cloned())
        }

        fn save_team(&self, ledger: &TeamLedger) -> Result<(), StoreError> {
            if self.fail_team_saves {
                return Err("disk full".into());
            }
            *self.team_saves.borrow_mut() += 1;
            self.teams.borrow_mut().insert(ledger.id, ledger.clone());
            Ok(())
        }
    }

    fn breakdown(exercise: u32, sports: u32) -> PointBreakdown {
        let mut b = PointBreakdown::zeroed();
        b.set(Category::Exercise, exercise);
        b.set(Category::SportsTurn, sports);
        b
    }

    #[test]
    fn commit_updates_user_and_team_identically() {
        let store = MemoryStore::new();
        let team = TeamLedger::new("Lifters");
        let team_id = team.id;
        store.insert_team(team);
        let mut user = UserLedger::new(7, "Maija", Some("Engineering".into()));
        user.team = Some(team_id);
        store.insert_user(user);

        let now = Utc::now();
        let updated = LedgerWriter::new(&store)
            .commit(7, &breakdown(5, 10), now)
            .unwrap();

        assert_eq!(updated.points.exercise, 5);
        assert_eq!(updated.points.sports_turn, 10);
        assert_eq!(updated.points.total, 15);
        assert_eq!(updated.last_submission, Some(now));

        let team = store.find_team(team_id).unwrap().unwrap();
        assert_eq!(team.points.exercise, 5);
        assert_eq!(team.points.sports_turn, 10);
        assert_eq!(team.points.total, 15);
    }

    #[test]
    fn commit_without_team_touches_only_user() {
        let store = MemoryStore::new();
        store.insert_user(UserLedger::new(7, "Maija", None));

        LedgerWriter::new(&store)
            .commit(7, &breakdown(2, 0), Utc::now())
            .unwrap();

        assert_eq!(*store.team_saves.borrow(), 0);
        assert_eq!(store.find_user(7).unwrap().unwrap().points.exercise, 2);
    }

    #[test]
    fn commit_accumulates_across_submissions() {
        let store = MemoryStore::new();
        store.insert_user(UserLedger::new(7, "Maija", None));
        let writer = LedgerWriter::new(&store);

        writer.commit(7, &breakdown(3, 5), Utc::now()).unwrap();
        writer.commit(7, &breakdown(4, 0), Utc::now()).unwrap();

        let user = store.find_user(7).unwrap().unwrap();
        assert_eq!(user.points.exercise, 7);
        assert_eq!(user.points.sports_turn, 5);
        assert_eq!(user.points.total, 12);
    }

    #[test]
    fn unknown_user_is_an_error_and_writes_nothing() {
        let store = MemoryStore::new();
        let err = LedgerWriter::new(&store)
            .commit(404, &breakdown(1, 0), Utc::now())
            .unwrap_err();
        assert!(matches!(err, LedgerError::UserNotFound { user_id: 404 }));
        assert_eq!(*store.user_saves.borrow(), 0);
    }

    #[test]
    fn inconsistent_breakdown_is_rejected_before_any_write() {
        let store = MemoryStore::new();
        store.insert_user(UserLedger::new(7, "Maija", None));

        let mut bad = breakdown(5, 0);
        bad.total = 99;
        let err = LedgerWriter::new(&store)
            .commit(7, &bad, Utc::now())
            .unwrap_err();
        assert!(matches!(
            err,
            LedgerError::InconsistentBreakdown { total: 99, sum: 5 }
        ));
        assert_eq!(*store.user_saves.borrow(), 0);
    }

    #[test]
    fn team_failure_retains_user_write() {
        let mut store = MemoryStore::new();
        store.fail_team_saves = true;
        let team = TeamLedger::new("Lifters");
        let team_id = team.id;
        store.insert_team(team);
        let mut user = UserLedger::new(7, "Maija", None);
        user.team = Some(team_id);
        store.insert_user(user);

        let err = LedgerWriter::new(&store)
            .commit(7, &breakdown(5, 0), Utc::now())
            .unwrap_err();
        assert!(matches!(err, LedgerError::TeamWrite { .. }));

        // User side was written and is kept.
        let user = store.find_user(7).unwrap().unwrap();
        assert_eq!(user.points.exercise, 5);
        assert!(user.last_submission.is_some());
        // Team side never changed.
        let team = store.find_team(team_id).unwrap().unwrap();
        assert_eq!(team.points.total, 0);
    }
}
