use datachat_domain::{Error, Row};
use datafusion::arrow::json::writer::{JsonArray, WriterBuilder};
use datafusion::arrow::record_batch::RecordBatch;
use datafusion::execution::context::SQLOptions;
use tracing::debug;

use crate::MaterializedTable;

/// Runs generated queries against a materialized table.
///
/// Only queries are accepted: statements that would create, alter, or modify
/// tables are rejected by the engine before anything runs.
#[derive(Clone)]
pub struct QueryExecutor {
    options: SQLOptions,
}

impl Default for QueryExecutor {
    fn default() -> Self {
        Self {
            options: SQLOptions::new()
                .with_allow_ddl(false)
                .with_allow_dml(false)
                .with_allow_statements(false),
        }
    }
}

impl QueryExecutor {
    /// Executes `query` and returns the result rows with their column names.
    ///
    /// An empty result is not an error.
    ///
    /// # Errors
    /// Any parse, planning, or runtime failure is reported as
    /// [`Error::QueryExecution`] carrying the query text.
    pub async fn execute(
        &self,
        query: &str,
        table: &MaterializedTable,
    ) -> anyhow::Result<Vec<Row>> {
        debug!(query = %query, table = %table.table_name(), "Executing query");

        let batches = self
            .run(query, table)
            .await
            .map_err(|err| Error::QueryExecution {
                query: query.to_string(),
                message: err.to_string(),
            })?;

        let rows = to_rows(&batches).map_err(|err| Error::QueryExecution {
            query: query.to_string(),
            message: format!("{err:#}"),
        })?;

        debug!(rows = rows.len(), "Query completed");
        Ok(rows)
    }

    async fn run(
        &self,
        query: &str,
        table: &MaterializedTable,
    ) -> datafusion::error::Result<Vec<RecordBatch>> {
        let frame = table
            .context()
            .sql_with_options(query, self.options)
            .await?;
        frame.collect().await
    }
}

fn to_rows(batches: &[RecordBatch]) -> anyhow::Result<Vec<Row>> {
    let mut writer = WriterBuilder::new()
        .with_explicit_nulls(true)
        .build::<_, JsonArray>(Vec::new());
    let refs = batches.iter().collect::<Vec<_>>();
    writer.write_batches(&refs)?;
    writer.finish()?;

    let bytes = writer.into_inner();
    if bytes.is_empty() {
        return Ok(Vec::new());
    }
    Ok(serde_json::from_slice(&bytes)?)
}
