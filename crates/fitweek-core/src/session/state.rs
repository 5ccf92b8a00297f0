//! Per-conversation session state.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::points::PointBreakdown;
use crate::rules::Category;

/// Mutable record owned by one in-flight scoring conversation.
///
/// Created when a session starts, mutated only by the state machine's
/// transition handlers, discarded at any terminal state. Never persisted.
/// Restart replaces the whole value, so no flag can leak across attempts.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionState {
    /// In-progress point collection.
    pub breakdown: PointBreakdown,
    /// "Yes" to the sports-session question inserts the count step.
    pub extra_sports_pending: bool,
    /// "Yes" to the recipe question inserts the count step.
    pub extra_recipe_pending: bool,
    /// Currently toggled-on health options.
    pub health_selected: BTreeSet<Category>,
    /// In-flight prompt message id, for transports that edit a sent
    /// message in place instead of sending a new one.
    pub prompt_message_id: Option<i64>,
}

impl SessionState {
    /// Blank state for a fresh session (or a restart).
    pub fn fresh() -> Self {
        Self::default()
    }

    /// Remember the transport message currently showing the prompt.
    pub fn note_prompt_message(&mut self, message_id: i64) {
        self.prompt_message_id = Some(message_id);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fresh_state_is_all_zero() {
        let state = SessionState::fresh();
        assert_eq!(state.breakdown.total, 0);
        assert!(!state.extra_sports_pending);
        assert!(!state.extra_recipe_pending);
        assert!(state.health_selected.is_empty());
        assert!(state.prompt_message_id.is_none());
    }

    #[test]
    fn prompt_message_is_tracked() {
        let mut state = SessionState::fresh();
        state.note_prompt_message(42);
        assert_eq!(state.prompt_message_id, Some(42));
    }
}
