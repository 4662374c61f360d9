use std::sync::Arc;

use datachat_domain::{Column, ColumnType, Error, Record, TableSchema, column_list};
use datafusion::arrow::datatypes::{DataType, Schema, SchemaRef};
use datafusion::arrow::error::ArrowError;
use datafusion::arrow::json::ReaderBuilder;
use datafusion::arrow::json::reader::infer_json_schema_from_iterator;
use datafusion::arrow::record_batch::RecordBatch;
use datafusion::catalog::memory::MemTable;
use datafusion::common::TableReference;
use datafusion::prelude::SessionContext;
use tracing::{debug, info};

const BATCH_SIZE: usize = 8192;

/// A dataset loaded into the embedded query engine.
///
/// Holds the engine session with the dataset registered as its only table, and
/// the schema derived when the table was built. Neither changes afterwards.
#[derive(Clone, derive_more::Debug)]
pub struct MaterializedTable {
    schema: TableSchema,
    #[debug(skip)]
    context: SessionContext,
    row_count: usize,
}

impl MaterializedTable {
    pub fn schema(&self) -> &TableSchema {
        &self.schema
    }

    pub fn table_name(&self) -> &str {
        self.schema.table_name()
    }

    pub fn row_count(&self) -> usize {
        self.row_count
    }

    pub(crate) fn context(&self) -> &SessionContext {
        &self.context
    }
}

/// Turns uniform records into a columnar, queryable table.
#[derive(Debug, Clone)]
pub struct DatasetMaterializer {
    table_name: String,
}

impl DatasetMaterializer {
    /// The table name is stored lowercase, the way the engine folds unquoted
    /// identifiers, so `Sales`, `sales` and `"sales"` all resolve to it.
    pub fn new(table_name: impl Into<String>) -> Self {
        Self { table_name: table_name.into().to_lowercase() }
    }

    pub fn table_name(&self) -> &str {
        &self.table_name
    }

    /// Builds the table and its schema.
    ///
    /// # Errors
    /// - [`Error::EmptyDataset`] when there are no records, or the records
    ///   have no columns
    /// - [`Error::SchemaMismatch`] when a record's columns differ from the
    ///   first record's
    pub fn materialize(&self, records: &[Record]) -> anyhow::Result<MaterializedTable> {
        let first = records
            .first()
            .filter(|record| !record.is_empty())
            .ok_or(Error::EmptyDataset)?;
        ensure_uniform(first, records)?;

        let schema = infer_schema(first, records)?;
        let batches = to_batches(schema.clone(), records)?;

        let table = MemTable::try_new(schema.clone(), vec![batches])?;
        let context = SessionContext::new();
        context.register_table(TableReference::bare(self.table_name.as_str()), Arc::new(table))?;

        let schema = TableSchema::new(
            self.table_name.clone(),
            schema
                .fields()
                .iter()
                .map(|field| Column::new(field.name(), column_type(field.data_type())))
                .collect(),
        );

        info!(
            table = %self.table_name,
            rows = records.len(),
            columns = schema.columns().len(),
            "Materialized dataset"
        );
        debug!(schema = %schema, "Derived table schema");

        Ok(MaterializedTable { schema, context, row_count: records.len() })
    }
}

fn ensure_uniform(first: &Record, records: &[Record]) -> Result<(), Error> {
    for (index, record) in records.iter().enumerate().skip(1) {
        let same_columns =
            record.len() == first.len() && first.keys().all(|key| record.contains_key(key));
        if !same_columns {
            return Err(Error::SchemaMismatch {
                index,
                expected: column_list(first),
                found: column_list(record),
            });
        }
    }
    Ok(())
}

/// Infers the arrow schema from all records, in the first record's column
/// order.
fn infer_schema(first: &Record, records: &[Record]) -> anyhow::Result<SchemaRef> {
    let values = records
        .iter()
        .map(serde_json::to_value)
        .collect::<Result<Vec<_>, _>>()?;
    let inferred = infer_json_schema_from_iterator(values.iter().map(Ok::<_, ArrowError>))?;

    let fields = first
        .keys()
        .map(|name| inferred.field_with_name(name).cloned())
        .collect::<Result<Vec<_>, _>>()?;

    Ok(Arc::new(Schema::new(fields)))
}

fn to_batches(schema: SchemaRef, records: &[Record]) -> anyhow::Result<Vec<RecordBatch>> {
    let mut decoder = ReaderBuilder::new(schema)
        .with_batch_size(BATCH_SIZE)
        .with_coerce_primitive(true)
        .build_decoder()?;

    let mut batches = Vec::new();
    for chunk in records.chunks(BATCH_SIZE) {
        decoder.serialize(chunk)?;
        if let Some(batch) = decoder.flush()? {
            batches.push(batch);
        }
    }
    Ok(batches)
}

fn column_type(data_type: &DataType) -> ColumnType {
    match data_type {
        DataType::Null => ColumnType::Null,
        DataType::Boolean => ColumnType::Bool,
        DataType::Int8
        | DataType::Int16
        | DataType::Int32
        | DataType::Int64
        | DataType::UInt8
        | DataType::UInt16
        | DataType::UInt32
        | DataType::UInt64 => ColumnType::Int64,
        DataType::Float16 | DataType::Float32 | DataType::Float64 => ColumnType::Double,
        _ => ColumnType::String,
    }
}
