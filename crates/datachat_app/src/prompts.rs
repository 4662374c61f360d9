//! Render contexts for the prompt templates under `templates/`.
//!
//! Optional fields are always serialized (as `null` when absent) so the
//! strict-mode template engine can test them with `{{#if}}`.

use datachat_domain::Template;
use serde::Serialize;
use serde_json::Value;

/// Intent classification: is the request read-only?
#[derive(Debug, Clone, Serialize)]
pub struct IntentPrompt {
    pub user_input: String,
    /// JSON schema the verdict must conform to
    pub response_schema: Value,
}

impl IntentPrompt {
    pub fn template() -> Template<Self> {
        Template::new("datachat-intent.md")
    }
}

/// Query synthesis against the materialized table.
#[derive(Debug, Clone, Serialize)]
pub struct QueryPrompt {
    pub user_input: String,
    pub table_name: String,
    pub table_schema: String,
    pub chat_history: Option<String>,
    /// Execution error of a previous attempt in the same turn
    pub prior_error: Option<String>,
}

impl QueryPrompt {
    pub fn template() -> Template<Self> {
        Template::new("datachat-sql.md")
    }
}

/// Refusal of a request that would modify data.
#[derive(Debug, Clone, Serialize)]
pub struct RefusalPrompt {
    pub user_input: String,
    pub chat_history: Option<String>,
}

impl RefusalPrompt {
    pub fn template() -> Template<Self> {
        Template::new("datachat-refusal.md")
    }
}

/// Grounded answer built from query result rows.
#[derive(Debug, Clone, Serialize)]
pub struct AnswerPrompt {
    pub user_input: String,
    pub chat_history: Option<String>,
    /// Result rows serialized as a JSON array
    pub data: String,
}

impl AnswerPrompt {
    pub fn template() -> Template<Self> {
        Template::new("datachat-answer.md")
    }
}
