use datachat_domain::{Error, OracleRequest, OracleService};
use tracing::debug;

/// Performs one oracle round-trip, enforcing the request's timeout.
///
/// Every failure leaves here as a domain [`Error`]: errors the service did not
/// classify itself are reported as [`Error::OracleUnavailable`].
pub(crate) async fn generate<S: OracleService + ?Sized>(
    services: &S,
    request: OracleRequest,
) -> anyhow::Result<String> {
    let timeout = request.timeout;
    debug!(
        structured = request.is_structured(),
        max_output_tokens = request.config.max_output_tokens,
        prompt = %request.prompt,
        "Calling oracle"
    );

    let result = match timeout {
        Some(limit) => tokio::time::timeout(limit, services.generate(request))
            .await
            .map_err(|_| {
                Error::OracleUnavailable(format!("no reply within {} seconds", limit.as_secs()))
            })?,
        None => services.generate(request).await,
    };

    result.map_err(|err| {
        if err.downcast_ref::<Error>().is_some() {
            err
        } else {
            Error::OracleUnavailable(format!("{err:#}")).into()
        }
    })
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use datachat_domain::GenerationConfig;
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::test_utils::{Reply, ScriptedOracle};

    fn request() -> OracleRequest {
        OracleRequest::new("hello", GenerationConfig::default())
    }

    #[tokio::test]
    async fn test_generate_returns_reply_text() {
        let oracle = ScriptedOracle::new([Reply::text("hi there")]);

        let actual = generate(&oracle, request()).await.unwrap();

        assert_eq!(actual, "hi there");
        assert_eq!(oracle.requests().await, vec![request()]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_generate_times_out() {
        let oracle = ScriptedOracle::new([Reply::Hang]);

        let actual = generate(&oracle, request().timeout(Duration::from_secs(3)))
            .await
            .unwrap_err();

        assert!(matches!(
            actual.downcast_ref::<Error>(),
            Some(Error::OracleUnavailable(message)) if message.contains("3 seconds")
        ));
    }

    #[tokio::test]
    async fn test_untyped_failures_become_oracle_unavailable() {
        let oracle = ScriptedOracle::new([Reply::Fail(anyhow::anyhow!("connection reset"))]);

        let actual = generate(&oracle, request()).await.unwrap_err();

        assert!(matches!(
            actual.downcast_ref::<Error>(),
            Some(Error::OracleUnavailable(message)) if message.contains("connection reset")
        ));
    }
}
