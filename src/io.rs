//! Copyright © 2025-2026 Wenze Wei. All Rights Reserved.
//!
//! This file is part of Tally.
//! The Tally project belongs to the Dunimd Team.
//!
//! Licensed under the Apache License, Version 2.0 (the "License");
//! You may not use this file except in compliance with the License.
//! You may obtain a copy of the License at
//!
//!     http://www.apache.org/licenses/LICENSE-2.0
//!
//! Unless required by applicable law or agreed to in writing, software
//! distributed under the License is distributed on an "AS IS" BASIS,
//! WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
//! See the License for the specific language governing permissions and
//! limitations under the License.

use std::io::Cursor;

use arrow2::array::{
    Array, MutableArray, MutableListArray, MutablePrimitiveArray, MutableUtf8Array, TryExtend,
};
use arrow2::chunk::Chunk;
use arrow2::datatypes::{Field, Schema};
use arrow2::io::parquet::read::{infer_schema, read_metadata, FileReader as ParquetFileReader};
use arrow2::io::parquet::write::{
    transverse, CompressionOptions, Encoding, FileWriter as ParquetFileWriter, RowGroupIterator,
    Version, WriteOptions,
};
use serde_json::Value;

use crate::errors::{Result, TlError};
use crate::record::{TlRawRecord, TlValue};
use crate::schema::{TlColumnType, TlSilverColumn, TlSilverTable};

/// Page compression of Silver Parquet files.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TlParquetCompression {
    Uncompressed,
    #[cfg(feature = "snappy")]
    Snappy,
}

impl Default for TlParquetCompression {
    #[cfg(feature = "snappy")]
    fn default() -> Self {
        TlParquetCompression::Snappy
    }

    #[cfg(not(feature = "snappy"))]
    fn default() -> Self {
        TlParquetCompression::Uncompressed
    }
}

impl From<TlParquetCompression> for CompressionOptions {
    fn from(value: TlParquetCompression) -> Self {
        match value {
            TlParquetCompression::Uncompressed => CompressionOptions::Uncompressed,
            #[cfg(feature = "snappy")]
            TlParquetCompression::Snappy => CompressionOptions::Snappy,
        }
    }
}

/// Column names and row count of a Parquet file, read back from its bytes.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TlParquetSummary {
    pub column_names: Vec<String>,
    pub num_rows: usize,
}

/// Data ingestion and output façade for the Bronze and Silver layers.
pub struct TlIO;

impl TlIO {
    /// Parses a Bronze document into its raw records.
    ///
    /// A missing or null `results` yields no records. A top level that is not
    /// an object, or a `results` that is not an array, is a schema error.
    pub fn parse_bronze(body: &[u8]) -> Result<Vec<TlRawRecord>> {
        let document: Value = serde_json::from_slice(body)?;
        let mut object = match document {
            Value::Object(object) => object,
            other => {
                return Err(TlError::schema(format!(
                    "bronze document must be an object, got {}",
                    TlRawRecord::new(other).kind()
                )))
            }
        };

        match object.remove("results") {
            None | Some(Value::Null) => Ok(Vec::new()),
            Some(Value::Array(items)) => Ok(items.into_iter().map(TlRawRecord::new).collect()),
            Some(other) => Err(TlError::schema(format!(
                "bronze 'results' must be an array, got {}",
                TlRawRecord::new(other).kind()
            ))),
        }
    }

    /// Encodes a Silver table as a single-row-group Parquet file.
    ///
    /// Coerced columns get their declared physical type. Columns the schema
    /// enforcer left uncoerced are written as nullable utf8 text.
    pub fn encode_silver_parquet(
        table: &TlSilverTable,
        compression: TlParquetCompression,
    ) -> Result<Vec<u8>> {
        let mut fields = Vec::with_capacity(table.columns().len());
        let mut arrays: Vec<Box<dyn Array>> = Vec::with_capacity(table.columns().len());

        for column in table.columns() {
            let array = _column_array(column)?;
            let nullable = column.spec.nullable || !column.coerced || array.null_count() > 0;
            fields.push(Field::new(column.spec.name, array.data_type().clone(), nullable));
            arrays.push(array);
        }

        let schema = Schema::from(fields);
        let chunk = Chunk::try_new(arrays)?;

        let options = WriteOptions {
            write_statistics: true,
            compression: compression.into(),
            version: Version::V2,
            data_pagesize_limit: Some(1024 * 1024),
        };

        let encodings: Vec<Vec<Encoding>> = schema
            .fields
            .iter()
            .map(|field| transverse(&field.data_type, |_| Encoding::Plain))
            .collect();

        let row_groups = RowGroupIterator::try_new(
            vec![arrow2::error::Result::Ok(chunk)].into_iter(),
            &schema,
            options,
            encodings,
        )?;

        let mut buffer = Vec::new();
        {
            let mut writer = ParquetFileWriter::try_new(&mut buffer, schema, options)?;
            for group in row_groups {
                writer.write(group?)?;
            }
            writer.end(None)?;
        }
        Ok(buffer)
    }

    /// Reads back the column names and row count of an encoded Parquet file.
    pub fn inspect_parquet(body: &[u8]) -> Result<TlParquetSummary> {
        let mut cursor = Cursor::new(body);
        let metadata = read_metadata(&mut cursor)?;
        let schema = infer_schema(&metadata)?;
        let column_names = schema.fields.iter().map(|f| f.name.clone()).collect();

        let row_groups = metadata.row_groups;
        let reader = ParquetFileReader::new(cursor, row_groups, schema, None, None, None);
        let mut num_rows = 0;
        for chunk in reader {
            num_rows += chunk?.len();
        }

        Ok(TlParquetSummary {
            column_names,
            num_rows,
        })
    }
}

fn _column_array(column: &TlSilverColumn) -> Result<Box<dyn Array>> {
    if !column.coerced {
        return Ok(_text_array(&column.values));
    }

    let array = match column.spec.column_type {
        TlColumnType::Int64 => {
            let mut out = MutablePrimitiveArray::<i64>::with_capacity(column.values.len());
            for value in &column.values {
                out.push(_int_cell(value));
            }
            out.as_box()
        }
        TlColumnType::Float64 => {
            let mut out = MutablePrimitiveArray::<f64>::with_capacity(column.values.len());
            for value in &column.values {
                out.push(match value {
                    TlValue::Float(float) => Some(*float),
                    _ => None,
                });
            }
            out.as_box()
        }
        TlColumnType::Utf8 => _text_array(&column.values),
        TlColumnType::Int64List => {
            let mut out = MutableListArray::<i32, MutablePrimitiveArray<i64>>::new();
            out.try_extend(column.values.iter().map(|value| match value {
                TlValue::List(items) => Some(items.iter().map(_int_cell).collect::<Vec<_>>()),
                _ => None,
            }))?;
            out.as_box()
        }
        TlColumnType::Utf8List => {
            let mut out = MutableListArray::<i32, MutableUtf8Array<i32>>::new();
            out.try_extend(column.values.iter().map(|value| match value {
                TlValue::List(items) => Some(items.iter().map(_text_cell).collect::<Vec<_>>()),
                _ => None,
            }))?;
            out.as_box()
        }
    };
    Ok(array)
}

fn _text_array(values: &[TlValue]) -> Box<dyn Array> {
    let mut out = MutableUtf8Array::<i32>::with_capacity(values.len());
    for value in values {
        out.push(_text_cell(value));
    }
    out.as_box()
}

fn _int_cell(value: &TlValue) -> Option<i64> {
    match value {
        TlValue::Int(int) => Some(*int),
        _ => None,
    }
}

fn _text_cell(value: &TlValue) -> Option<String> {
    match value {
        TlValue::Null => None,
        other => Some(other.to_string()),
    }
}
