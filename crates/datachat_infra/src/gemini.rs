use std::time::Duration;

use anyhow::Context as _;
use datachat_config::DataChatConfig;
use datachat_domain::{Error, OracleRequest, OracleService};
use reqwest::header::{CONTENT_TYPE, HeaderMap, HeaderValue};
use reqwest::{Client, StatusCode};
use tracing::debug;
use url::Url;

use crate::dto::{ErrorResponse, Request, Response};
use crate::http::{build_client, sanitize_headers};

const API_KEY_HEADER: &str = "x-goog-api-key";

/// Oracle backed by the Gemini `generateContent` REST endpoint.
pub struct GeminiOracle {
    client: Client,
    url: Url,
    api_key: String,
    timeout: Duration,
}

impl GeminiOracle {
    /// Creates a client for the configured model.
    ///
    /// Fails when no API key is configured.
    pub fn new(config: &DataChatConfig) -> anyhow::Result<Self> {
        let api_key = config
            .api_key
            .clone()
            .filter(|key| !key.trim().is_empty())
            .context("No API key configured. Set DATACHAT_API_KEY or GEMINI_API_KEY")?;

        Ok(Self {
            client: build_client(&config.http)?,
            url: generate_url(&config.api_url, &config.model)?,
            api_key,
            timeout: config.oracle_timeout(),
        })
    }

    fn headers(&self) -> anyhow::Result<HeaderMap> {
        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        headers.insert(
            API_KEY_HEADER,
            HeaderValue::from_str(&self.api_key).context("API key is not a valid header value")?,
        );
        debug!(headers = ?sanitize_headers(&headers), "Request Headers");
        Ok(headers)
    }

    async fn call(&self, request: &OracleRequest) -> anyhow::Result<String> {
        let body = serde_json::to_vec(&Request::from(request))
            .context("Failed to serialize request")?;
        let timeout = request.timeout.unwrap_or(self.timeout);

        debug!(url = %self.url, structured = request.is_structured(), "Connecting Upstream");
        let response = self
            .client
            .post(self.url.clone())
            .headers(self.headers()?)
            .timeout(timeout)
            .body(body)
            .send()
            .await
            .with_context(|| format!("POST request to {} failed", self.url))?;

        let status = response.status();
        let text = response
            .text()
            .await
            .with_context(|| format!("Failed to read response body ({status})"))?;

        if !status.is_success() {
            anyhow::bail!(describe_failure(status, &text));
        }

        let response: Response =
            serde_json::from_str(&text).context("Failed to deserialize response")?;
        response
            .text()
            .with_context(|| response.missing_text_reason())
    }
}

#[async_trait::async_trait]
impl OracleService for GeminiOracle {
    async fn generate(&self, request: OracleRequest) -> anyhow::Result<String> {
        self.call(&request)
            .await
            .map_err(|err| Error::OracleUnavailable(format!("{err:#}")).into())
    }
}

fn generate_url(api_url: &Url, model: &str) -> anyhow::Result<Url> {
    let model = model.strip_prefix("models/").unwrap_or(model);
    let base = if api_url.path().ends_with('/') {
        api_url.clone()
    } else {
        Url::parse(&format!("{api_url}/"))?
    };
    base.join(&format!("models/{model}:generateContent"))
        .with_context(|| format!("Failed to construct API URL for model {model}"))
}

fn describe_failure(status: StatusCode, body: &str) -> String {
    match serde_json::from_str::<ErrorResponse>(body) {
        Ok(ErrorResponse { error }) => {
            let code = error.code.unwrap_or(status.as_u16());
            match error.status {
                Some(kind) => format!("{code} {kind}: {}", error.message),
                None => format!("{code}: {}", error.message),
            }
        }
        Err(_) => format!("{status}: {}", body.trim()),
    }
}
