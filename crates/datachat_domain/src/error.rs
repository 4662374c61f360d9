/// Turn-level failures of the data chat pipeline.
///
/// None of these are retried; each one ends the turn and is reported to the
/// caller, which must leave the conversation history untouched.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("No data is loaded. Load a dataset before asking questions")]
    EmptyDataset,

    #[error(
        "Record {index} has columns [{found}] but the dataset has columns [{expected}]. All records must share the same columns"
    )]
    SchemaMismatch {
        index: usize,
        expected: String,
        found: String,
    },

    #[error("Could not determine whether the request is read-only: {0}")]
    Classification(String),

    #[error("The generated query could not be executed: {message}\nQuery: {query}")]
    QueryExecution { query: String, message: String },

    #[error("The language model is unavailable: {0}")]
    OracleUnavailable(String),

    #[error("Failed to render prompt template '{name}': {message}")]
    Template { name: String, message: String },
}

pub type Result<A> = std::result::Result<A, Error>;
