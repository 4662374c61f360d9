use std::sync::Arc;
use std::time::Duration;

use datachat_config::DataChatConfig;
use datachat_domain::{GenerationConfig, OracleRequest, OracleService, Record, Row};
use tracing::info;

use crate::oracle::generate;
use crate::{
    AnswerPrompt, DatasetMaterializer, IntentClassifier, MaterializedTable, QueryExecutor,
    QuerySynthesizer, RefusalPrompt, TemplateEngine,
};

/// Answers natural-language questions about a dataset.
///
/// Each turn classifies the request, then either refuses it or synthesizes a
/// query, runs it, and phrases an answer from the resulting rows. Nothing is
/// carried from one turn to the next.
pub struct DataChat<S> {
    services: Arc<S>,
    config: GenerationConfig,
    timeout: Duration,
    materializer: DatasetMaterializer,
    classifier: IntentClassifier<S>,
    synthesizer: QuerySynthesizer<S>,
    executor: QueryExecutor,
}

impl<S: OracleService> DataChat<S> {
    pub fn new(services: Arc<S>, config: &DataChatConfig) -> Self {
        let timeout = config.oracle_timeout();
        Self {
            classifier: IntentClassifier::new(services.clone(), config.intent_generation, timeout),
            synthesizer: QuerySynthesizer::new(services.clone(), config.generation, timeout),
            materializer: DatasetMaterializer::new(config.table_name.clone()),
            executor: QueryExecutor::default(),
            config: config.generation,
            timeout,
            services,
        }
    }

    pub fn materializer(&self) -> &DatasetMaterializer {
        &self.materializer
    }

    /// Runs one turn over raw records.
    ///
    /// The records are materialized first, so an empty dataset fails before
    /// the oracle is contacted.
    pub async fn data_chat(
        &self,
        user_input: &str,
        source_data: &[Record],
        chat_history: Option<&str>,
    ) -> anyhow::Result<String> {
        let table = self.materializer.materialize(source_data)?;
        self.answer(user_input, &table, chat_history).await
    }

    /// Runs one turn over an already materialized table.
    pub async fn answer(
        &self,
        user_input: &str,
        table: &MaterializedTable,
        chat_history: Option<&str>,
    ) -> anyhow::Result<String> {
        info!(table = %table.table_name(), rows = table.row_count(), "Classifying request");
        let read_only = self.classifier.classify(user_input).await?;

        if !read_only {
            info!("Request would modify data, refusing");
            return self.refuse(user_input, chat_history).await;
        }

        info!("Synthesizing query");
        let query = self
            .synthesizer
            .synthesize(user_input, table.schema(), chat_history, None)
            .await?;

        info!(query = %query, "Executing query");
        let rows = self.executor.execute(&query, table).await?;

        info!(rows = rows.len(), "Generating answer");
        self.respond(user_input, chat_history, &rows).await
    }

    async fn refuse(&self, user_input: &str, chat_history: Option<&str>) -> anyhow::Result<String> {
        let prompt = TemplateEngine::default().render(
            &RefusalPrompt::template(),
            &RefusalPrompt {
                user_input: user_input.to_string(),
                chat_history: chat_history.map(str::to_string),
            },
        )?;
        self.generate(prompt).await
    }

    async fn respond(
        &self,
        user_input: &str,
        chat_history: Option<&str>,
        rows: &[Row],
    ) -> anyhow::Result<String> {
        let prompt = TemplateEngine::default().render(
            &AnswerPrompt::template(),
            &AnswerPrompt {
                user_input: user_input.to_string(),
                chat_history: chat_history.map(str::to_string),
                data: serde_json::to_string(rows)?,
            },
        )?;
        self.generate(prompt).await
    }

    async fn generate(&self, prompt: String) -> anyhow::Result<String> {
        let request = OracleRequest::new(prompt, self.config).timeout(self.timeout);
        generate(self.services.as_ref(), request).await
    }
}
