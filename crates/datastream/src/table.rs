//! Reading CSV files into record batches and stacking them.

use std::io::{Read, Seek};
use std::sync::Arc;

use arrow::compute::cast;
use arrow_array::{ArrayRef, RecordBatch, new_null_array};
use arrow_csv::ReaderBuilder;
use arrow_schema::{DataType, Field, Schema, SchemaRef};
use arrow_select::concat::concat_batches;

use crate::error::Result;
use crate::options::CsvOptions;

/// Zero columns, zero rows.
pub fn empty_table() -> RecordBatch {
    RecordBatch::new_empty(Arc::new(Schema::empty()))
}

/// Parse a whole CSV file into one batch, inferring its schema.
pub fn read_csv<R: Read + Seek>(mut reader: R, options: &CsvOptions) -> Result<RecordBatch> {
    let (schema, _) = options
        .format()
        .infer_schema(&mut reader, Some(options.schema_infer_max_records))?;
    let schema = Arc::new(schema);
    reader.rewind()?;

    let csv = ReaderBuilder::new(schema.clone())
        .with_format(options.format())
        .with_batch_size(options.batch_size)
        .build(reader)?;

    let batches = csv.collect::<std::result::Result<Vec<_>, _>>()?;
    Ok(concat_batches(&schema, &batches)?)
}

/// Stack tables in order.
///
/// Columns are matched by name, in first-seen order. A column absent from
/// a table is filled with nulls there. When the same column was inferred
/// with different types, integers and floats meet at Float64 and anything
/// else falls back to Utf8.
pub fn concat_tables(tables: &[RecordBatch]) -> Result<RecordBatch> {
    let schema = unified_schema(tables);
    if schema.fields().is_empty() {
        return Ok(empty_table());
    }

    let aligned = tables
        .iter()
        .map(|table| align(table, &schema))
        .collect::<Result<Vec<_>>>()?;
    Ok(concat_batches(&schema, &aligned)?)
}

fn unified_schema(tables: &[RecordBatch]) -> SchemaRef {
    let mut fields: Vec<Field> = Vec::new();

    for table in tables {
        for field in table.schema().fields() {
            match fields.iter_mut().find(|f| f.name() == field.name()) {
                Some(existing) => {
                    let widened = widen(existing.data_type(), field.data_type());
                    *existing = Field::new(field.name(), widened, true);
                }
                None => fields.push(Field::new(field.name(), field.data_type().clone(), true)),
            }
        }
    }
    Arc::new(Schema::new(fields))
}

fn widen(a: &DataType, b: &DataType) -> DataType {
    match (a, b) {
        _ if a == b => a.clone(),
        (DataType::Null, other) | (other, DataType::Null) => other.clone(),
        (DataType::Int64, DataType::Float64) | (DataType::Float64, DataType::Int64) => {
            DataType::Float64
        }
        _ => DataType::Utf8,
    }
}

fn align(table: &RecordBatch, schema: &SchemaRef) -> Result<RecordBatch> {
    let columns = schema
        .fields()
        .iter()
        .map(|field| -> Result<ArrayRef> {
            match table.column_by_name(field.name()) {
                Some(column) if column.data_type() == field.data_type() => Ok(column.clone()),
                Some(column) => Ok(cast(column, field.data_type())?),
                None => Ok(new_null_array(field.data_type(), table.num_rows())),
            }
        })
        .collect::<Result<Vec<_>>>()?;
    Ok(RecordBatch::try_new(schema.clone(), columns)?)
}
