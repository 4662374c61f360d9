use std::fmt;

use derive_setters::Setters;
use serde::{Deserialize, Serialize};

/// Type of a materialized column as shown to the oracle.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, strum_macros::Display,
)]
#[serde(rename_all = "snake_case")]
pub enum ColumnType {
    /// Every value in the column is null
    #[strum(serialize = "null")]
    Null,
    #[strum(serialize = "bool")]
    Bool,
    #[strum(serialize = "int64")]
    Int64,
    #[strum(serialize = "double")]
    Double,
    #[strum(serialize = "string")]
    String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Setters)]
#[setters(into)]
pub struct Column {
    pub name: String,
    pub column_type: ColumnType,
}

impl Column {
    pub fn new(name: impl Into<String>, column_type: ColumnType) -> Self {
        Self { name: name.into(), column_type }
    }
}

/// Schema derived once when a dataset is materialized.
///
/// The `Display` form is one `name: type` line per column in column order, and
/// is what gets embedded in the query synthesis prompt.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TableSchema {
    table_name: String,
    columns: Vec<Column>,
}

impl TableSchema {
    pub fn new(table_name: impl Into<String>, columns: Vec<Column>) -> Self {
        Self { table_name: table_name.into(), columns }
    }

    pub fn table_name(&self) -> &str {
        &self.table_name
    }

    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    pub fn column(&self, name: &str) -> Option<&Column> {
        self.columns.iter().find(|column| column.name == name)
    }

    pub fn column_names(&self) -> Vec<&str> {
        self.columns.iter().map(|column| column.name.as_str()).collect()
    }
}

impl fmt::Display for TableSchema {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let lines = self
            .columns
            .iter()
            .map(|column| format!("{}: {}", column.name, column.column_type))
            .collect::<Vec<_>>();
        write!(f, "{}", lines.join("\n"))
    }
}
