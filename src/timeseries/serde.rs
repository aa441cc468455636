// Licensed to the Apache Software Foundation (ASF) under one
// or more contributor license agreements.  See the NOTICE file
// distributed with this work for additional information
// regarding copyright ownership.  The ASF licenses this file
// to you under the Apache License, Version 2.0 (the
// "License"); you may not use this file except in compliance
// with the License.  You may obtain a copy of the License at
//
//   http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing,
// software distributed under the License is distributed on an
// "AS IS" BASIS, WITHOUT WARRANTIES OR CONDITIONS OF ANY
// KIND, either express or implied.  See the License for the
// specific language governing permissions and limitations
// under the License.
//! Serde between time-series blocks and the generic row-table wire format.
//!
//! A block becomes a table with one string column per tag name plus a
//! trailing float-array column. Row 0 describes the time axis; each later
//! row is one series:
//!
//! ```text
//! +-----------+---------+----------------------------------+
//! | tag-0     | tag-n   | __ts_values                      |
//! +-----------+---------+----------------------------------+
//! | null      | null    | [start, bucket_secs, num_buckets]|
//! | Chicago   | ...     | [value-0, ... value-x]           |
//! +-----------+---------+----------------------------------+
//! ```
//!
//! Group keys are not transmitted: decode regroups every series under the
//! hash of its tag values, so the keys that existed before encoding are not
//! preserved across a round trip.

use std::sync::Arc;
use std::time::Duration;

use arrow::array::{
    Array, ArrayRef, Float64Array, Float64Builder, ListArray, ListBuilder, RecordBatch,
    StringArray, StringBuilder,
};
use arrow::datatypes::{DataType, Field, Schema};

use crate::exec::row_table::RowTable;
use crate::timeseries::{TimeBuckets, TimeSeries, TimeSeriesBlock};

/// Stands in for "null" inside the primitive float wire array, which cannot
/// hold nulls. The minimum finite value rather than NaN: NaN must stay
/// available to signal genuine arithmetic errors (e.g. divide by zero)
/// downstream.
const NULL_PLACEHOLDER: f64 = f64::MIN;

const VALUES_COLUMN: &str = "__ts_values";

pub fn serialize_time_series_block(block: &TimeSeriesBlock) -> Result<Vec<u8>, String> {
    let time_buckets = block
        .time_buckets()
        .ok_or_else(|| "cannot serialize a time-series block without a time axis".to_string())?;
    let tag_names: Vec<String> = match sample_series(block)? {
        Some(series) => series.tag_names().as_ref().clone(),
        None => Vec::new(),
    };

    let mut tag_builders: Vec<StringBuilder> =
        tag_names.iter().map(|_| StringBuilder::new()).collect();
    let mut values_builder = ListBuilder::new(Float64Builder::new());

    // Header row: no series data, only the axis.
    for builder in &mut tag_builders {
        builder.append_value("null");
    }
    values_builder
        .values()
        .append_value(time_buckets.first_bucket_value() as f64);
    values_builder
        .values()
        .append_value(time_buckets.bucket_size().as_secs() as f64);
    values_builder
        .values()
        .append_value(time_buckets.num_buckets() as f64);
    values_builder.append(true);

    for series_list in block.series_map().values() {
        for series in series_list {
            if series.tag_values().len() != tag_names.len() {
                return Err(format!(
                    "series has {} tag values but the block schema has {} tag columns",
                    series.tag_values().len(),
                    tag_names.len()
                ));
            }
            for (index, builder) in tag_builders.iter_mut().enumerate() {
                match &series.tag_values()[index] {
                    Some(value) => builder.append_value(value),
                    None => builder.append_value("null"),
                }
            }
            for value in series.values() {
                values_builder
                    .values()
                    .append_value(value.unwrap_or(NULL_PLACEHOLDER));
            }
            values_builder.append(true);
        }
    }

    let mut fields: Vec<Field> = tag_names
        .iter()
        .map(|name| Field::new(name, DataType::Utf8, true))
        .collect();
    fields.push(Field::new(
        VALUES_COLUMN,
        DataType::List(Arc::new(Field::new("item", DataType::Float64, true))),
        true,
    ));
    let mut arrays: Vec<ArrayRef> = tag_builders
        .into_iter()
        .map(|mut builder| Arc::new(builder.finish()) as ArrayRef)
        .collect();
    arrays.push(Arc::new(values_builder.finish()));

    let batch = RecordBatch::try_new(Arc::new(Schema::new(fields)), arrays)
        .map_err(|e| format!("failed to assemble wire table: {e}"))?;
    RowTable::new(batch).to_bytes()
}

pub fn deserialize_time_series_block(bytes: &[u8]) -> Result<TimeSeriesBlock, String> {
    let table = RowTable::from_bytes(bytes)?;
    let schema = table.schema();
    let num_columns = schema.fields().len();
    if num_columns == 0 {
        return Err("wire table has no columns".to_string());
    }
    if table.num_rows() == 0 {
        return Err("wire table is missing the time-bucket header row".to_string());
    }

    let tag_names: Arc<Vec<String>> = Arc::new(
        schema.fields()[..num_columns - 1]
            .iter()
            .map(|f| f.name().clone())
            .collect(),
    );
    let values_column = table.columns()[num_columns - 1]
        .as_any()
        .downcast_ref::<ListArray>()
        .ok_or_else(|| format!("column {VALUES_COLUMN} is not a float-array column"))?;
    let tag_columns: Vec<&StringArray> = (0..num_columns - 1)
        .map(|index| {
            table.columns()[index]
                .as_any()
                .downcast_ref::<StringArray>()
                .ok_or_else(|| {
                    format!(
                        "tag column {} is not a string column",
                        schema.field(index).name()
                    )
                })
        })
        .collect::<Result<_, _>>()?;

    let time_buckets = time_buckets_from_header(&values_column.value(0))?;

    let mut block = TimeSeriesBlock::new(time_buckets.clone());
    for row in 1..table.num_rows() {
        let tag_values: Vec<Option<String>> = tag_columns
            .iter()
            .map(|column| Some(column.value(row).to_string()))
            .collect();
        let values = float_values_from_cell(&values_column.value(row))?;
        let series_id = TimeSeries::hash_tag_values(&tag_values);
        let series = TimeSeries::new(
            series_id.to_string(),
            Arc::clone(&tag_names),
            tag_values,
            values,
            &time_buckets,
        )?;
        block.insert_series(series_id, series);
    }
    Ok(block)
}

fn sample_series(block: &TimeSeriesBlock) -> Result<Option<&TimeSeries>, String> {
    let Some(series_list) = block.series_map().values().next() else {
        return Ok(None);
    };
    series_list
        .first()
        .map(Some)
        .ok_or_else(|| "found empty time-series list in block".to_string())
}

fn time_buckets_from_header(cell: &ArrayRef) -> Result<TimeBuckets, String> {
    let header = cell
        .as_any()
        .downcast_ref::<Float64Array>()
        .ok_or_else(|| "time-bucket header row holds no float array".to_string())?;
    if header.len() < 3 {
        return Err(format!(
            "time-bucket header needs 3 elements, got {}",
            header.len()
        ));
    }
    let first_bucket_value = header.value(0) as i64;
    let bucket_size = Duration::from_secs(header.value(1) as u64);
    let num_buckets = header.value(2) as usize;
    Ok(TimeBuckets::of_seconds(
        first_bucket_value,
        bucket_size,
        num_buckets,
    ))
}

fn float_values_from_cell(cell: &ArrayRef) -> Result<Vec<Option<f64>>, String> {
    let raw = cell
        .as_any()
        .downcast_ref::<Float64Array>()
        .ok_or_else(|| "series row holds no float array".to_string())?;
    Ok((0..raw.len())
        .map(|index| {
            let value = raw.value(index);
            if value == NULL_PLACEHOLDER {
                None
            } else {
                Some(value)
            }
        })
        .collect())
}
