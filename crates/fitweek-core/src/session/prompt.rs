//! Render requests and normalized answers.
//!
//! The transport boundary: each step hands the transport a [`Prompt`]
//! describing what to show, and the transport hands back an [`Answer`].
//! Nothing here assumes a particular rendering surface.

use serde::{Deserialize, Serialize};

/// What the current step wants the transport to display.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Prompt {
    pub text: String,
    pub expects: Expects,
}

/// The kind of input the step accepts.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Expects {
    /// A selection from an enumerated option set.
    Options { choices: Vec<Choice> },
    /// A whole number within an inclusive range. The cancel token is also
    /// accepted, as at every step.
    Number { min: u32, max: u32 },
}

/// One selectable option.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Choice {
    /// Stable token the transport echoes back on selection.
    pub token: String,
    /// Human label to display.
    pub label: String,
}

impl Choice {
    pub fn new(token: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            token: token.into(),
            label: label.into(),
        }
    }
}

/// Normalized inbound event from the transport.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Answer {
    /// A selected option token.
    Select(String),
    /// Raw text, used by the free-form numeric steps.
    Text(String),
}

impl Answer {
    pub fn select(token: impl Into<String>) -> Self {
        Answer::Select(token.into())
    }

    pub fn text(raw: impl Into<String>) -> Self {
        Answer::Text(raw.into())
    }
}

/// Token accepted at every step to abandon the session.
pub const CANCEL_TOKEN: &str = "cancel";

impl Prompt {
    pub fn options(text: impl Into<String>, choices: Vec<Choice>) -> Self {
        Self {
            text: text.into(),
            expects: Expects::Options { choices },
        }
    }

    pub fn number(text: impl Into<String>, min: u32, max: u32) -> Self {
        Self {
            text: text.into(),
            expects: Expects::Number { min, max },
        }
    }
}
