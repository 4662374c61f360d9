use derive_more::Display;
use serde::{Deserialize, Serialize};

#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    strum_macros::Display,
    strum_macros::EnumString,
)]
pub enum Speaker {
    User,
    Bot,
}

/// One line of the conversation, rendered as `Speaker: text`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Display)]
#[display("{speaker}: {text}")]
pub struct Turn {
    pub speaker: Speaker,
    pub text: String,
}

impl Turn {
    pub fn user(text: impl ToString) -> Self {
        Self { speaker: Speaker::User, text: text.to_string() }
    }

    pub fn bot(text: impl ToString) -> Self {
        Self { speaker: Speaker::Bot, text: text.to_string() }
    }
}

/// Turns of a single session in chronological order.
///
/// Only [`ConversationHistory::push`] and [`ConversationHistory::clear`]
/// mutate it: turns are never edited, reordered, or removed one at a time.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConversationHistory {
    turns: Vec<Turn>,
}

impl ConversationHistory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, turn: Turn) -> &mut Self {
        self.turns.push(turn);
        self
    }

    /// Drops every turn.
    pub fn clear(&mut self) {
        self.turns.clear();
    }

    pub fn turns(&self) -> &[Turn] {
        &self.turns
    }

    pub fn len(&self) -> usize {
        self.turns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.turns.is_empty()
    }

    /// Serializes the history as one `Speaker: text` line per turn.
    pub fn to_text(&self) -> String {
        self.turns
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join("\n")
    }

    /// The serialized history, or `None` when there is nothing to send.
    pub fn as_prompt(&self) -> Option<String> {
        if self.is_empty() {
            None
        } else {
            Some(self.to_text())
        }
    }
}
