use datachat_domain::{ConversationHistory, Error, OracleService, Record, Turn};
use tracing::info;

use crate::{DataChat, MaterializedTable};

/// State of one conversation: the loaded table and the turns so far.
///
/// Only successful turns are recorded. Loading a new dataset replaces the
/// previous table but keeps the history.
#[derive(Default)]
pub struct ChatSession {
    table: Option<MaterializedTable>,
    history: ConversationHistory,
}

impl ChatSession {
    pub fn new() -> Self {
        Self::default()
    }

    /// Materializes `records` and makes them the session's dataset. On failure
    /// the previously loaded table stays in place.
    pub fn load<S: OracleService>(
        &mut self,
        chat: &DataChat<S>,
        records: &[Record],
    ) -> anyhow::Result<&MaterializedTable> {
        let table = chat.materializer().materialize(records)?;
        info!(rows = table.row_count(), "Dataset loaded into session");
        Ok(self.table.insert(table))
    }

    /// Answers `user_input` against the loaded table with the session's
    /// history, then records the exchange.
    pub async fn ask<S: OracleService>(
        &mut self,
        chat: &DataChat<S>,
        user_input: &str,
    ) -> anyhow::Result<String> {
        let table = self.table.as_ref().ok_or(Error::EmptyDataset)?;
        let chat_history = self.history.as_prompt();

        let answer = chat
            .answer(user_input, table, chat_history.as_deref())
            .await?;

        self.history
            .push(Turn::user(user_input))
            .push(Turn::bot(&answer));
        Ok(answer)
    }

    /// Forgets every turn. The loaded table is kept.
    pub fn clear(&mut self) {
        self.history.clear();
    }

    pub fn history(&self) -> &ConversationHistory {
        &self.history
    }

    pub fn table(&self) -> Option<&MaterializedTable> {
        self.table.as_ref()
    }
}
