//! # Fitweek Core Library
//!
//! Core business logic for Fitweek, a chat-driven fitness-competition
//! tracker: participants submit weekly self-reported activity through a
//! guided conversation, earn points by category, and see aggregated
//! standings. The library is transport-agnostic; the CLI binary (and any
//! chat frontend) is a thin layer that renders prompts and feeds back
//! normalized answers.
//!
//! ## Key Components
//!
//! - [`ScoringSession`]: the branching conversational state machine for
//!   one weekly submission
//! - [`ScoringFlow`]: session lifecycle — gate check, answer handling,
//!   ledger commit
//! - [`SubmissionPolicy`]: once-per-week submission gate
//! - [`LedgerWriter`]: dual write into user and team cumulative ledgers
//! - [`PointRules`]: injected category point values and answer bounds
//! - [`Database`]: SQLite ledger storage and standings queries
//! - [`Config`]: TOML application configuration

pub mod error;
pub mod gate;
pub mod ledger;
pub mod points;
pub mod rules;
pub mod session;
pub mod storage;

pub use error::{ConfigError, CoreError, DatabaseError, LedgerError, ValidationError};
pub use gate::{Eligibility, SubmissionPolicy};
pub use ledger::{LedgerWriter, TeamLedger, TeamStore, UserLedger, UserStore};
pub use points::PointBreakdown;
pub use rules::{Category, PointRules};
pub use session::{
    Answer, Choice, Expects, FlowTurn, Prompt, ScoringFlow, ScoringSession, SessionState,
    StartOutcome, Step, Turn,
};
pub use storage::{Config, Database};
