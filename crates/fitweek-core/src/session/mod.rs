//! Weekly scoring conversation: state machine, session state, prompts,
//! and the lifecycle coordinator.

pub mod engine;
pub mod flow;
pub mod prompt;
pub mod state;
pub mod summary;

pub use engine::{ScoringSession, Step, Turn};
pub use flow::{FlowTurn, ScoringFlow, StartOutcome};
pub use prompt::{Answer, Choice, Expects, Prompt, CANCEL_TOKEN};
pub use state::SessionState;
