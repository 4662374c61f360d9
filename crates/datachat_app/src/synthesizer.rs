use std::sync::Arc;
use std::time::Duration;

use datachat_domain::{GenerationConfig, OracleRequest, OracleService, TableSchema};
use tracing::debug;

use crate::oracle::generate;
use crate::{QueryPrompt, TemplateEngine};

/// Produces an SQL query answering the user's question over one table.
pub struct QuerySynthesizer<S> {
    services: Arc<S>,
    config: GenerationConfig,
    timeout: Duration,
}

impl<S: OracleService> QuerySynthesizer<S> {
    pub fn new(services: Arc<S>, config: GenerationConfig, timeout: Duration) -> Self {
        Self { services, config, timeout }
    }

    /// Asks the oracle for a query and returns it without surrounding code
    /// fences.
    ///
    /// `prior_error` carries the execution error of an earlier attempt in the
    /// same turn so the oracle can correct itself.
    pub async fn synthesize(
        &self,
        user_input: &str,
        schema: &TableSchema,
        chat_history: Option<&str>,
        prior_error: Option<&str>,
    ) -> anyhow::Result<String> {
        let prompt = TemplateEngine::default().render(
            &QueryPrompt::template(),
            &QueryPrompt {
                user_input: user_input.to_string(),
                table_name: schema.table_name().to_string(),
                table_schema: schema.to_string(),
                chat_history: chat_history.map(str::to_string),
                prior_error: prior_error.map(str::to_string),
            },
        )?;

        let request = OracleRequest::new(prompt, self.config).timeout(self.timeout);
        let reply = generate(self.services.as_ref(), request).await?;

        let query = strip_code_fence(&reply);
        debug!(query = %query, "Synthesized query");
        Ok(query)
    }
}

/// Removes a surrounding markdown code fence, including an optional language
/// tag on the opening fence. Text without a fence is only trimmed.
pub fn strip_code_fence(reply: &str) -> String {
    let text = reply.trim();
    let Some(body) = text.strip_prefix("```") else {
        return text.to_string();
    };

    let body = match body.split_once('\n') {
        Some((tag, rest)) if is_language_tag(tag) => rest,
        _ => body,
    };
    let body = body.trim_end();
    let body = body.strip_suffix("```").unwrap_or(body);

    body.trim().to_string()
}

fn is_language_tag(tag: &str) -> bool {
    tag.trim()
        .chars()
        .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '_' || c == '-')
}
