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
//! Generic row-oriented wire table carried between stages.
//!
//! Responsibilities:
//! - Wraps an Arrow `RecordBatch` as the single tabular representation every
//!   block payload is transported in.
//! - Encodes/decodes tables to the Arrow IPC stream format for the wire.

use std::io::Cursor;

use arrow::array::{ArrayRef, RecordBatch};
use arrow::datatypes::SchemaRef;
use arrow::ipc::reader::StreamReader;
use arrow::ipc::writer::StreamWriter;

/// A row table: ordered, named, typed columns plus rows.
#[derive(Debug, Clone)]
pub struct RowTable {
    pub batch: RecordBatch,
}

impl RowTable {
    pub fn new(batch: RecordBatch) -> Self {
        Self { batch }
    }

    pub fn schema(&self) -> SchemaRef {
        self.batch.schema()
    }

    pub fn num_rows(&self) -> usize {
        self.batch.num_rows()
    }

    pub fn num_columns(&self) -> usize {
        self.batch.num_columns()
    }

    pub fn is_empty(&self) -> bool {
        self.batch.num_rows() == 0
    }

    pub fn columns(&self) -> &[ArrayRef] {
        self.batch.columns()
    }

    /// Encode to the Arrow IPC stream format.
    pub fn to_bytes(&self) -> Result<Vec<u8>, String> {
        let mut buffer = Vec::new();
        let schema = self.batch.schema();
        let mut writer = StreamWriter::try_new(&mut buffer, &schema)
            .map_err(|e| format!("failed to create Arrow IPC writer: {e}"))?;
        writer
            .write(&self.batch)
            .map_err(|e| format!("failed to write batch: {e}"))?;
        writer
            .finish()
            .map_err(|e| format!("failed to finish Arrow IPC writer: {e}"))?;
        Ok(buffer)
    }

    /// Decode from the Arrow IPC stream format. A payload must carry at
    /// least one batch; multiple batches are concatenated.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, String> {
        if bytes.is_empty() {
            return Err("empty wire payload: missing schema".to_string());
        }

        let mut cursor = Cursor::new(bytes);
        let reader = StreamReader::try_new(&mut cursor, None)
            .map_err(|e| format!("failed to create Arrow IPC reader: {e}"))?;
        let schema = reader.schema();

        let mut batches = Vec::new();
        for batch_result in reader {
            let batch = batch_result.map_err(|e| format!("failed to read batch: {e}"))?;
            batches.push(batch);
        }

        let batch = match batches.len() {
            0 => return Err("wire payload carried no row batch".to_string()),
            1 => batches.into_iter().next().expect("one batch"),
            _ => arrow::compute::concat_batches(&schema, &batches)
                .map_err(|e| format!("failed to concatenate batches: {e}"))?,
        };
        Ok(Self::new(batch))
    }
}
