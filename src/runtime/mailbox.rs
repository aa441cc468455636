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
//! Mailbox abstraction for one sender-to-receiver data path.
//!
//! Responsibilities:
//! - Names a channel endpoint (`MailboxId`) and defines the receive-side
//!   contract the operators poll against.
//! - The service that physically moves bytes between servers lives behind
//!   `MailboxService`; this module only defines the seams.
//!
//! Key exported interfaces:
//! - Types: `MailboxId`, `TryRecv`.
//! - Traits: `ReceivingMailbox`, `MailboxService`.

use std::fmt;
use std::sync::Arc;

use crate::common::types::VirtualServerAddress;
use crate::exec::block::TransferBlock;

/// Uniquely names one sender-to-receiver channel within a query run.
#[derive(Clone, Debug, Eq, PartialEq, Hash)]
pub struct MailboxId {
    pub request_id: u64,
    pub sender_stage_id: u32,
    pub sender: VirtualServerAddress,
    pub receiver: VirtualServerAddress,
    pub partition: u32,
}

impl MailboxId {
    pub fn new(
        request_id: u64,
        sender_stage_id: u32,
        sender: VirtualServerAddress,
        receiver: VirtualServerAddress,
        partition: u32,
    ) -> Self {
        Self {
            request_id,
            sender_stage_id,
            sender,
            receiver,
            partition,
        }
    }
}

impl fmt::Display for MailboxId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}_{}:{}->{}:p{}",
            self.request_id, self.sender_stage_id, self.sender, self.receiver, self.partition
        )
    }
}

/// Outcome of one non-blocking receive probe.
#[derive(Clone, Debug)]
pub enum TryRecv {
    /// A block is ready: data, an end marker, or an error-tagged block.
    Block(TransferBlock),
    /// The channel exists but holds nothing at this instant.
    NotReady,
}

/// Receive side of one channel. Filled concurrently by the transport layer;
/// consumers only probe its current state and never wait on it.
pub trait ReceivingMailbox: Send + Sync {
    /// True once the sender closed the channel and the buffer drained.
    fn is_closed(&self) -> bool;

    /// Non-blocking probe. `Err` is a channel-level I/O failure.
    fn try_receive(&self) -> Result<TryRecv, String>;

    /// Drop any interest/resources the receiver holds on this channel.
    fn release(&self) {}
}

/// Registry of receiving mailboxes on one server.
pub trait MailboxService: Send + Sync {
    fn hostname(&self) -> &str;

    fn mailbox_port(&self) -> u16;

    /// `None` means the sender has not registered the channel yet; callers
    /// must treat that as "try again later", never as exhaustion or error.
    fn receiving_mailbox(&self, id: &MailboxId) -> Option<Arc<dyn ReceivingMailbox>>;
}
