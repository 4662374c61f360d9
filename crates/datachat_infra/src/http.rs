use anyhow::{Context, Result};
use datachat_config::HttpConfig;
use reqwest::header::{HeaderMap, HeaderValue};
use reqwest::{Client, ClientBuilder};

/// Headers whose values never appear in logs.
const SENSITIVE_HEADERS: [&str; 2] = ["x-goog-api-key", "authorization"];

/// Builds the HTTP client used for oracle calls.
pub fn build_client(config: &HttpConfig) -> Result<Client> {
    ClientBuilder::new()
        .connect_timeout(config.connect_timeout())
        .read_timeout(config.read_timeout())
        .use_rustls_tls()
        .build()
        .context("Failed to build HTTP client")
}

/// Copy of `headers` with credentials replaced by `[REDACTED]`.
pub fn sanitize_headers(headers: &HeaderMap) -> HeaderMap {
    headers
        .iter()
        .map(|(name, value)| {
            let value = if SENSITIVE_HEADERS.contains(&name.as_str()) {
                HeaderValue::from_static("[REDACTED]")
            } else {
                value.clone()
            };
            (name.clone(), value)
        })
        .collect()
}
