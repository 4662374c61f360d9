use std::sync::Arc;
use std::time::Duration;

use datachat_domain::{
    Error, GenerationConfig, OracleRequest, OracleService, response_schema,
};
use tracing::debug;

use crate::oracle::generate;
use crate::{IntentPrompt, TemplateEngine};

/// Decides whether a request only reads data.
///
/// The decision is made from the user input alone; conversation history is
/// never sent along.
pub struct IntentClassifier<S> {
    services: Arc<S>,
    config: GenerationConfig,
    timeout: Duration,
}

impl<S: OracleService> IntentClassifier<S> {
    pub fn new(services: Arc<S>, config: GenerationConfig, timeout: Duration) -> Self {
        Self { services, config, timeout }
    }

    /// Returns `true` for read-only requests and `false` for requests that
    /// would modify data.
    ///
    /// # Errors
    /// - [`Error::Classification`] when the reply is not a JSON boolean
    /// - [`Error::OracleUnavailable`] when the oracle cannot be reached
    pub async fn classify(&self, user_input: &str) -> anyhow::Result<bool> {
        let prompt = TemplateEngine::default().render(
            &IntentPrompt::template(),
            &IntentPrompt {
                user_input: user_input.to_string(),
                response_schema: response_schema::<bool>(),
            },
        )?;

        let request = OracleRequest::new(prompt, self.config)
            .structured::<bool>()
            .timeout(self.timeout);
        let reply = generate(self.services.as_ref(), request).await?;

        let verdict = parse_verdict(&reply)?;
        debug!(read_only = verdict, "Classified request");
        Ok(verdict)
    }
}

/// Parses the oracle's structured reply. Only the JSON literals `true` and
/// `false` are accepted.
pub fn parse_verdict(reply: &str) -> Result<bool, Error> {
    serde_json::from_str::<bool>(reply.trim()).map_err(|_| {
        Error::Classification(format!("expected a JSON boolean, got {:?}", reply.trim()))
    })
}
