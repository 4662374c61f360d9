use std::time::Duration;

use derive_setters::Setters;
use schemars::JsonSchema;
use serde::Serialize;
use serde_json::Value;

use crate::GenerationConfig;

/// A single round-trip to the generative oracle.
#[derive(Debug, Clone, PartialEq, Serialize, Setters)]
#[setters(into, strip_option)]
pub struct OracleRequest {
    /// Fully rendered prompt
    pub prompt: String,

    pub config: GenerationConfig,

    /// JSON schema the reply must conform to. `None` asks for free text.
    pub response_schema: Option<Value>,

    /// Deadline for the whole round-trip
    #[serde(skip)]
    pub timeout: Option<Duration>,
}

impl OracleRequest {
    pub fn new(prompt: impl ToString, config: GenerationConfig) -> Self {
        Self {
            prompt: prompt.to_string(),
            config,
            response_schema: None,
            timeout: None,
        }
    }

    /// Constrains the reply to the JSON schema of `T`.
    pub fn structured<T: JsonSchema>(self) -> Self {
        self.response_schema(response_schema::<T>())
    }

    pub fn is_structured(&self) -> bool {
        self.response_schema.is_some()
    }
}

/// JSON schema of `T` as sent to the oracle.
pub fn response_schema<T: JsonSchema>() -> Value {
    schemars::schema_for!(T).to_value()
}

/// Black-box text generator.
///
/// Implementations report transport and service failures as
/// [`crate::Error::OracleUnavailable`].
#[async_trait::async_trait]
pub trait OracleService: Send + Sync + 'static {
    /// Returns the text of the reply. For structured requests the text is the
    /// JSON document produced under the request's schema.
    async fn generate(&self, request: OracleRequest) -> anyhow::Result<String>;
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn test_boolean_response_schema() {
        let actual = response_schema::<bool>();
        assert_eq!(actual["type"], "boolean");
    }

    #[test]
    fn test_structured_request_carries_schema() {
        let fixture = OracleRequest::new("is this read only?", GenerationConfig::classification());

        let actual = fixture.structured::<bool>();

        assert!(actual.is_structured());
        assert_eq!(actual.config.max_output_tokens, 10);
        assert_eq!(actual.timeout, None);
    }

    #[test]
    fn test_timeout_setter() {
        let actual = OracleRequest::new("hello", GenerationConfig::default())
            .timeout(Duration::from_secs(5));

        assert_eq!(actual.timeout, Some(Duration::from_secs(5)));
        assert!(!actual.is_structured());
    }
}
