//! Session lifecycle coordinator.
//!
//! Wires the submission gate, the scoring state machine, and the ledger
//! writer together for one user. The transport drives it: `begin` runs
//! the pre-session checks and yields the first prompt, `handle` feeds
//! each normalized answer through and performs the commit when the
//! conversation confirms.

use chrono::{DateTime, Utc};

use super::engine::{ScoringSession, Turn};
use super::prompt::{Answer, Prompt};
use crate::error::CoreError;
use crate::gate::SubmissionPolicy;
use crate::ledger::{LedgerWriter, TeamStore, UserLedger, UserStore};
use crate::rules::PointRules;

/// Generic failure message shown in-conversation; internals go to the log.
const COMMIT_FAILED_MESSAGE: &str =
    "Something went wrong while saving your points. Please try again later.";

/// Outcome of the pre-session checks.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StartOutcome {
    /// Session started; show the first prompt.
    Prompt(Prompt),
    /// Submission gate denied the attempt; session never started.
    Denied(String),
    /// No ledger for this identity; user must register first.
    Unregistered,
}

/// Outcome of applying one answer to an active session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FlowTurn {
    Prompt(Prompt),
    Retry { prompt: Prompt, hint: String },
    Restarted(Prompt),
    /// Breakdown committed; receipt is the updated user ledger.
    Committed(UserLedger),
    Cancelled,
    /// Commit failed; session is over and nothing further may be assumed
    /// about persisted state.
    Failed(String),
}

/// One user's scoring conversation, from gate check to terminal state.
pub struct ScoringFlow<'a, S: UserStore + TeamStore> {
    store: &'a S,
    rules: PointRules,
    policy: SubmissionPolicy,
    user_id: i64,
    session: Option<ScoringSession>,
}

impl<'a, S: UserStore + TeamStore> ScoringFlow<'a, S> {
    pub fn new(store: &'a S, rules: PointRules, policy: SubmissionPolicy, user_id: i64) -> Self {
        Self {
            store,
            rules,
            policy,
            user_id,
            session: None,
        }
    }

    /// Run the identity and eligibility checks; on success instantiate a
    /// fresh session and return its first prompt.
    pub fn begin(&mut self, now: DateTime<Utc>) -> Result<StartOutcome, CoreError> {
        let Some(user) = self.store.find_user(self.user_id)? else {
            return Ok(StartOutcome::Unregistered);
        };

        let eligibility = self.policy.check(user.last_submission, now);
        if !eligibility.allowed {
            return Ok(StartOutcome::Denied(
                eligibility
                    .reason
                    .unwrap_or_else(|| "You cannot submit again yet.".to_string()),
            ));
        }

        let session = ScoringSession::new(self.rules.clone());
        let prompt = session.prompt();
        self.session = Some(session);
        tracing::debug!(user_id = self.user_id, "scoring session started");
        Ok(StartOutcome::Prompt(prompt))
    }

    /// Feed one answer through the state machine; commits on confirm.
    pub fn handle(&mut self, answer: &Answer, now: DateTime<Utc>) -> Result<FlowTurn, CoreError> {
        let Some(session) = self.session.as_mut() else {
            return Err(CoreError::Custom("no active scoring session".to_string()));
        };

        match session.apply(answer) {
            Turn::Next(prompt) => Ok(FlowTurn::Prompt(prompt)),
            Turn::Retry { prompt, hint } => Ok(FlowTurn::Retry { prompt, hint }),
            Turn::Restarted(prompt) => Ok(FlowTurn::Restarted(prompt)),
            Turn::Cancelled => {
                self.session = None;
                tracing::debug!(user_id = self.user_id, "scoring session cancelled");
                Ok(FlowTurn::Cancelled)
            }
            Turn::Finalized(breakdown) => {
                self.session = None;
                match LedgerWriter::new(self.store).commit(self.user_id, &breakdown, now) {
                    Ok(ledger) => Ok(FlowTurn::Committed(ledger)),
                    Err(err) => {
                        tracing::error!(
                            user_id = self.user_id,
                            error = %err,
                            "scoring commit failed"
                        );
                        Ok(FlowTurn::Failed(COMMIT_FAILED_MESSAGE.to_string()))
                    }
                }
            }
        }
    }

    /// Whether a session is currently in flight.
    pub fn is_active(&self) -> bool {
        self.session.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::Database;
    use chrono::{Duration, TimeZone};

    fn all_answers_no() -> Vec<Answer> {
        vec![
            Answer::text("0"),
            Answer::select("no"),
            Answer::select("no"),
            Answer::select("no"),
            Answer::select("skip"),
        ]
    }

    fn setup() -> Database {
        let db = Database::open_memory().unwrap();
        db.create_user(7, "Maija", Some("Engineering")).unwrap();
        db
    }

    fn start(flow: &mut ScoringFlow<'_, Database>, now: DateTime<Utc>) {
        match flow.begin(now).unwrap() {
            StartOutcome::Prompt(_) => {}
            other => panic!("expected session start, got {other:?}"),
        }
    }

    #[test]
    fn unregistered_user_never_starts() {
        let db = Database::open_memory().unwrap();
        let mut flow =
            ScoringFlow::new(&db, PointRules::standard(), SubmissionPolicy::default(), 404);
        assert_eq!(flow.begin(Utc::now()).unwrap(), StartOutcome::Unregistered);
        assert!(!flow.is_active());
    }

    #[test]
    fn recent_submission_is_denied() {
        let db = setup();
        // A Monday, so two days later is still the same scoring period.
        let now = Utc.with_ymd_and_hms(2024, 3, 4, 10, 0, 0).unwrap();
        let mut flow =
            ScoringFlow::new(&db, PointRules::standard(), SubmissionPolicy::default(), 7);

        // First submission goes through.
        start(&mut flow, now);
        for answer in all_answers_no() {
            flow.handle(&answer, now).unwrap();
        }
        let turn = flow.handle(&Answer::select("confirm"), now).unwrap();
        assert!(matches!(turn, FlowTurn::Committed(_)));

        // Two days later, same period: denied.
        match flow.begin(now + Duration::days(2)) {
            Ok(StartOutcome::Denied(reason)) => {
                assert!(reason.contains("already submitted"))
            }
            other => panic!("expected denial, got {other:?}"),
        }
    }

    #[test]
    fn full_session_commits_to_user_and_team() {
        let db = setup();
        let team = db.create_team("Lifters").unwrap();
        db.join_team(7, team.id).unwrap();

        let mut flow =
            ScoringFlow::new(&db, PointRules::standard(), SubmissionPolicy::default(), 7);
        let now = Utc::now();
        start(&mut flow, now);

        let answers = [
            Answer::text("5"),
            Answer::select("yes"),
            Answer::text("2"),
            Answer::select("no"),
            Answer::select("no"),
            Answer::select("skip"),
        ];
        for answer in &answers {
            flow.handle(answer, now).unwrap();
        }
        let turn = flow.handle(&Answer::select("confirm"), now).unwrap();

        match turn {
            FlowTurn::Committed(ledger) => {
                assert_eq!(ledger.points.exercise, 5);
                assert_eq!(ledger.points.sports_turn, 10);
                assert_eq!(ledger.points.total, 15);
            }
            other => panic!("expected commit, got {other:?}"),
        }
        assert!(!flow.is_active());

        let team = db.find_team(team.id).unwrap().unwrap();
        assert_eq!(team.points.total, 15);
        assert_eq!(team.points.sports_turn, 10);
    }

    #[test]
    fn cancel_performs_zero_ledger_writes() {
        let db = setup();
        let mut flow =
            ScoringFlow::new(&db, PointRules::standard(), SubmissionPolicy::default(), 7);
        let now = Utc::now();
        start(&mut flow, now);

        flow.handle(&Answer::text("5"), now).unwrap();
        flow.handle(&Answer::select("yes"), now).unwrap();
        let turn = flow.handle(&Answer::select("cancel"), now).unwrap();
        assert_eq!(turn, FlowTurn::Cancelled);
        assert!(!flow.is_active());

        let user = db.find_user(7).unwrap().unwrap();
        assert_eq!(user.points.total, 0);
        assert!(user.last_submission.is_none());
    }

    #[test]
    fn restart_then_all_no_commits_zero_total() {
        let db = setup();
        let mut flow =
            ScoringFlow::new(&db, PointRules::standard(), SubmissionPolicy::default(), 7);
        let now = Utc::now();
        start(&mut flow, now);

        // Partially answer with real points, reach Confirm, then restart.
        let partial = [
            Answer::text("5"),
            Answer::select("yes"),
            Answer::text("3"),
            Answer::select("yes"),
            Answer::select("no"),
            Answer::select("skip"),
        ];
        for answer in &partial {
            flow.handle(answer, now).unwrap();
        }
        let turn = flow.handle(&Answer::select("restart"), now).unwrap();
        assert!(matches!(turn, FlowTurn::Restarted(_)));

        for answer in all_answers_no() {
            flow.handle(&answer, now).unwrap();
        }
        match flow.handle(&Answer::select("confirm"), now).unwrap() {
            FlowTurn::Committed(ledger) => {
                assert_eq!(ledger.points.total, 0);
                assert!(ledger.last_submission.is_some());
            }
            other => panic!("expected commit, got {other:?}"),
        }
    }

    #[test]
    fn handle_without_session_is_an_error() {
        let db = setup();
        let mut flow =
            ScoringFlow::new(&db, PointRules::standard(), SubmissionPolicy::default(), 7);
        assert!(flow.handle(&Answer::select("yes"), Utc::now()).is_err());
    }
}
