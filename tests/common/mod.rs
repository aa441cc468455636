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
//! Common fixtures for integration tests: scripted mailboxes with
//! deterministic per-probe outcomes, plus small row-table helpers.
#![allow(dead_code)]

use std::collections::{HashMap, VecDeque};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use arrow::array::{Int32Array, RecordBatch};
use arrow::datatypes::{DataType, Field, Schema};

use chronoflow::common::types::VirtualServerAddress;
use chronoflow::exec::block::TransferBlock;
use chronoflow::exec::row_table::RowTable;
use chronoflow::runtime::mailbox::{MailboxId, MailboxService, ReceivingMailbox, TryRecv};

/// One pre-scripted probe outcome.
pub enum Step {
    Block(TransferBlock),
    NotReady,
    Fail(String),
}

/// Mailbox that replays a fixed script, one entry per `try_receive` call,
/// and records how often it was probed.
pub struct ScriptedMailbox {
    steps: Mutex<VecDeque<Step>>,
    closed: AtomicBool,
    receive_calls: AtomicUsize,
    released: AtomicBool,
}

impl ScriptedMailbox {
    pub fn new(steps: Vec<Step>) -> Arc<Self> {
        Arc::new(Self {
            steps: Mutex::new(steps.into()),
            closed: AtomicBool::new(false),
            receive_calls: AtomicUsize::new(0),
            released: AtomicBool::new(false),
        })
    }

    pub fn closed() -> Arc<Self> {
        let mailbox = Self::new(Vec::new());
        mailbox.closed.store(true, Ordering::SeqCst);
        mailbox
    }

    pub fn receive_calls(&self) -> usize {
        self.receive_calls.load(Ordering::SeqCst)
    }

    pub fn was_released(&self) -> bool {
        self.released.load(Ordering::SeqCst)
    }
}

impl ReceivingMailbox for ScriptedMailbox {
    fn is_closed(&self) -> bool {
        self.closed.load(Ordering::SeqCst)
    }

    fn try_receive(&self) -> Result<TryRecv, String> {
        self.receive_calls.fetch_add(1, Ordering::SeqCst);
        let step = self.steps.lock().expect("script lock").pop_front();
        match step {
            Some(Step::Block(block)) => Ok(TryRecv::Block(block)),
            Some(Step::NotReady) | None => Ok(TryRecv::NotReady),
            Some(Step::Fail(message)) => Err(message),
        }
    }

    fn release(&self) {
        self.released.store(true, Ordering::SeqCst);
    }
}

/// Mailbox service whose registry the test mutates between polls.
pub struct StubMailboxService {
    hostname: String,
    port: u16,
    mailboxes: Mutex<HashMap<MailboxId, Arc<ScriptedMailbox>>>,
}

impl StubMailboxService {
    pub fn new(hostname: &str, port: u16) -> Arc<Self> {
        Arc::new(Self {
            hostname: hostname.to_string(),
            port,
            mailboxes: Mutex::new(HashMap::new()),
        })
    }

    pub fn register(&self, id: MailboxId, mailbox: Arc<ScriptedMailbox>) {
        self.mailboxes
            .lock()
            .expect("registry lock")
            .insert(id, mailbox);
    }
}

impl MailboxService for StubMailboxService {
    fn hostname(&self) -> &str {
        &self.hostname
    }

    fn mailbox_port(&self) -> u16 {
        self.port
    }

    fn receiving_mailbox(&self, id: &MailboxId) -> Option<Arc<dyn ReceivingMailbox>> {
        self.mailboxes
            .lock()
            .expect("registry lock")
            .get(id)
            .cloned()
            .map(|m| m as Arc<dyn ReceivingMailbox>)
    }
}

pub fn addr(hostname: &str, port: u16, virtual_id: u32) -> VirtualServerAddress {
    VirtualServerAddress::new(hostname, port, virtual_id)
}

/// A one-row (col1, col2) Int32 table, the smallest useful payload.
pub fn int_row_table(col1: i32, col2: i32) -> RowTable {
    let schema = Arc::new(Schema::new(vec![
        Field::new("col1", DataType::Int32, false),
        Field::new("col2", DataType::Int32, false),
    ]));
    let batch = RecordBatch::try_new(
        schema,
        vec![
            Arc::new(Int32Array::from(vec![col1])),
            Arc::new(Int32Array::from(vec![col2])),
        ],
    )
    .expect("test batch");
    RowTable::new(batch)
}

pub fn data_block(col1: i32, col2: i32) -> TransferBlock {
    TransferBlock::Data(int_row_table(col1, col2))
}

/// First value of `col1` in a data block, for asserting arrival order.
pub fn first_value(block: &TransferBlock) -> i32 {
    match block {
        TransferBlock::Data(table) => {
            let column = table.columns()[0]
                .as_any()
                .downcast_ref::<Int32Array>()
                .expect("col1 is Int32");
            column.value(0)
        }
        other => panic!("expected a data block, got {other:?}"),
    }
}
