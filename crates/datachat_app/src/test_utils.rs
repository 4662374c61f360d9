use std::collections::VecDeque;

use datachat_domain::{Error, OracleRequest, OracleService, Record};
use tokio::sync::Mutex;

/// What the scripted oracle does for one call.
pub enum Reply {
    Text(String),
    /// Returns the rendered prompt, which makes prompt contents observable in
    /// the final answer
    EchoPrompt,
    /// Never completes
    Hang,
    Fail(anyhow::Error),
}

impl Reply {
    pub fn text(text: impl ToString) -> Self {
        Reply::Text(text.to_string())
    }
}

/// Oracle that replays a fixed script and records every request it receives.
/// Calls beyond the script fail with [`Error::OracleUnavailable`].
pub struct ScriptedOracle {
    replies: Mutex<VecDeque<Reply>>,
    requests: Mutex<Vec<OracleRequest>>,
}

impl ScriptedOracle {
    pub fn new(replies: impl IntoIterator<Item = Reply>) -> Self {
        Self {
            replies: Mutex::new(replies.into_iter().collect()),
            requests: Mutex::new(Vec::new()),
        }
    }

    pub async fn requests(&self) -> Vec<OracleRequest> {
        self.requests.lock().await.clone()
    }

    pub async fn call_count(&self) -> usize {
        self.requests.lock().await.len()
    }
}

#[async_trait::async_trait]
impl OracleService for ScriptedOracle {
    async fn generate(&self, request: OracleRequest) -> anyhow::Result<String> {
        self.requests.lock().await.push(request.clone());
        let reply = self.replies.lock().await.pop_front();
        match reply {
            Some(Reply::Text(text)) => Ok(text),
            Some(Reply::EchoPrompt) => Ok(request.prompt),
            Some(Reply::Hang) => std::future::pending().await,
            Some(Reply::Fail(err)) => Err(err),
            None => Err(Error::OracleUnavailable("no scripted reply left".to_string()).into()),
        }
    }
}

/// Parses records from JSON text, keeping the key order of the document.
pub fn records(json: &str) -> Vec<Record> {
    serde_json::from_str(json).unwrap()
}

/// The two-item dataset used across the pipeline tests.
pub fn items() -> Vec<Record> {
    records(r#"[{"name": "A", "price": 10}, {"name": "B", "price": 60}]"#)
}
