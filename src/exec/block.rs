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
//! Block classification for inter-stage transport.
//!
//! Responsibilities:
//! - Defines the tagged block variant every operator poll returns: real data,
//!   end-of-stream, transient no-op, or an error-tagged terminal block.
//! - Error blocks carry a numeric-kind-to-messages map so consumers can apply
//!   kind-specific retry policy.

use std::collections::HashMap;

use crate::exec::row_table::RowTable;

/// Failure classification carried by error blocks.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub enum ErrorKind {
    /// The operator's absolute deadline lapsed before upstream finished.
    ExecutionTimeout,
    /// An upstream sender failed without a more specific classification.
    UnknownUpstream,
}

impl ErrorKind {
    pub fn code(self) -> i32 {
        match self {
            ErrorKind::ExecutionTimeout => 240,
            ErrorKind::UnknownUpstream => 450,
        }
    }

    pub fn from_code(code: i32) -> Option<Self> {
        match code {
            240 => Some(ErrorKind::ExecutionTimeout),
            450 => Some(ErrorKind::UnknownUpstream),
            _ => None,
        }
    }
}

/// Map from numeric error kind to the messages reported under it.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ErrorBlock {
    exceptions: HashMap<i32, Vec<String>>,
}

impl ErrorBlock {
    pub fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        let mut exceptions = HashMap::new();
        exceptions.insert(kind.code(), vec![message.into()]);
        Self { exceptions }
    }

    pub fn contains(&self, kind: ErrorKind) -> bool {
        self.exceptions.contains_key(&kind.code())
    }

    pub fn messages(&self, kind: ErrorKind) -> &[String] {
        self.exceptions
            .get(&kind.code())
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    pub fn exceptions(&self) -> &HashMap<i32, Vec<String>> {
        &self.exceptions
    }
}

/// One unit of inter-stage transport.
#[derive(Clone, Debug)]
pub enum TransferBlock {
    Data(RowTable),
    EndOfStream,
    /// Nothing available this instant; the caller should poll again.
    NoOp,
    Error(ErrorBlock),
}

impl TransferBlock {
    pub fn data(table: RowTable) -> Self {
        TransferBlock::Data(table)
    }

    pub fn end_of_stream() -> Self {
        TransferBlock::EndOfStream
    }

    pub fn noop() -> Self {
        TransferBlock::NoOp
    }

    pub fn error(kind: ErrorKind, message: impl Into<String>) -> Self {
        TransferBlock::Error(ErrorBlock::new(kind, message))
    }

    pub fn is_data(&self) -> bool {
        matches!(self, TransferBlock::Data(_))
    }

    pub fn is_end_of_stream(&self) -> bool {
        matches!(self, TransferBlock::EndOfStream)
    }

    pub fn is_noop(&self) -> bool {
        matches!(self, TransferBlock::NoOp)
    }

    pub fn is_error(&self) -> bool {
        matches!(self, TransferBlock::Error(_))
    }

    pub fn error_block(&self) -> Option<&ErrorBlock> {
        match self {
            TransferBlock::Error(e) => Some(e),
            _ => None,
        }
    }
}
