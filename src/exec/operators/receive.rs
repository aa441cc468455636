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
//! Receive operator: fans in blocks from upstream stage instances.
//!
//! Responsibilities:
//! - Polls one mailbox per retained sender in round-robin order with cursor
//!   resume, so no early prolific sender starves the others.
//! - Enforces the execution deadline, converts upstream failures into
//!   in-band error blocks, and latches a terminal state exactly once.
//!
//! Key exported interfaces:
//! - Types: `ReceiveContext`, `ReceiveOperator`.
//!
//! Current limitations:
//! - Range-based distributions are rejected at construction; the planner
//!   never emits them for this runtime.

use std::sync::Arc;
use std::time::Instant;

use crate::chronoflow_logging::debug;
use crate::common::types::{DistributionType, VirtualServerAddress};
use crate::exec::block::{ErrorBlock, ErrorKind, TransferBlock};
use crate::exec::operators::Operator;
use crate::runtime::mailbox::{MailboxId, MailboxService, ReceivingMailbox, TryRecv};

const OPERATOR_NAME: &str = "MAILBOX_RECEIVE";

/// Execution-scoped inputs shared by every receive operator of one fragment.
#[derive(Clone)]
pub struct ReceiveContext {
    pub mailbox_service: Arc<dyn MailboxService>,
    pub request_id: u64,
    pub receiver: VirtualServerAddress,
    /// Absolute point past which polls stop waiting and fail.
    pub deadline: Instant,
}

struct SenderChannel {
    id: MailboxId,
    mailbox: Option<Arc<dyn ReceivingMailbox>>,
    exhausted: bool,
}

impl SenderChannel {
    fn new(id: MailboxId) -> Self {
        Self {
            id,
            mailbox: None,
            exhausted: false,
        }
    }
}

enum Terminal {
    EndOfStream,
    Errored(ErrorBlock),
}

/// Pull-based fan-in over one mailbox per upstream sender.
///
/// Single-caller: the poller thread owns the cursor and the per-channel
/// exhaustion flags; multiple callers must serialize polls externally.
pub struct ReceiveOperator {
    mailbox_service: Arc<dyn MailboxService>,
    sender_stage_id: u32,
    deadline: Instant,
    senders: Vec<SenderChannel>,
    cursor: usize,
    terminal: Option<Terminal>,
    closed: bool,
}

impl ReceiveOperator {
    pub fn new(
        context: &ReceiveContext,
        candidates: Vec<VirtualServerAddress>,
        distribution: DistributionType,
        sender_stage_id: u32,
        partition: u32,
    ) -> Result<Self, String> {
        let service = &context.mailbox_service;
        let retained = match distribution {
            DistributionType::Singleton => {
                let mut matched: Vec<VirtualServerAddress> = candidates
                    .into_iter()
                    .filter(|s| {
                        s.hostname == service.hostname() && s.port == service.mailbox_port()
                    })
                    .collect();
                match matched.len() {
                    0 => {
                        return Err(format!(
                            "failed to find singleton sender instance for {}:{}",
                            service.hostname(),
                            service.mailbox_port()
                        ));
                    }
                    1 => vec![matched.remove(0)],
                    n => {
                        return Err(format!(
                            "multiple singleton sender instances ({n}) match {}:{}",
                            service.hostname(),
                            service.mailbox_port()
                        ));
                    }
                }
            }
            DistributionType::HashDistributed | DistributionType::BroadcastDistributed => {
                candidates
            }
            DistributionType::RangeDistributed => {
                return Err(format!("unsupported distribution type: {distribution}"));
            }
        };

        let senders: Vec<SenderChannel> = retained
            .into_iter()
            .map(|sender| {
                SenderChannel::new(MailboxId::new(
                    context.request_id,
                    sender_stage_id,
                    sender,
                    context.receiver.clone(),
                    partition,
                ))
            })
            .collect();

        debug!(
            "{} created: request_id={} sender_stage_id={} partition={} distribution={} senders={}",
            OPERATOR_NAME,
            context.request_id,
            sender_stage_id,
            partition,
            distribution,
            senders.len()
        );

        Ok(Self {
            mailbox_service: Arc::clone(service),
            sender_stage_id,
            deadline: context.deadline,
            senders,
            cursor: 0,
            terminal: None,
            closed: false,
        })
    }

    fn terminal_block(&self) -> Option<TransferBlock> {
        match self.terminal.as_ref()? {
            Terminal::EndOfStream => Some(TransferBlock::EndOfStream),
            Terminal::Errored(e) => Some(TransferBlock::Error(e.clone())),
        }
    }

    fn latch_end_of_stream(&mut self) -> TransferBlock {
        debug!(
            "{} end of stream: sender_stage_id={} senders={}",
            OPERATOR_NAME,
            self.sender_stage_id,
            self.senders.len()
        );
        self.terminal = Some(Terminal::EndOfStream);
        TransferBlock::EndOfStream
    }

    fn latch_error(&mut self, error: ErrorBlock) -> TransferBlock {
        debug!(
            "{} terminal error: sender_stage_id={} exceptions={:?}",
            OPERATOR_NAME,
            self.sender_stage_id,
            error.exceptions().keys().collect::<Vec<_>>()
        );
        self.terminal = Some(Terminal::Errored(error.clone()));
        TransferBlock::Error(error)
    }

    fn latch_timeout(&mut self) -> TransferBlock {
        let message = format!(
            "timed out waiting for data from sender stage {}",
            self.sender_stage_id
        );
        self.latch_error(ErrorBlock::new(ErrorKind::ExecutionTimeout, message))
    }

    fn all_exhausted(&self) -> bool {
        self.senders.iter().all(|s| s.exhausted)
    }

    /// One full round-robin pass starting at the cursor. Returns `None` when
    /// the pass found neither data nor a failure.
    fn scan_once(&mut self) -> Option<TransferBlock> {
        let sender_count = self.senders.len();
        for offset in 0..sender_count {
            // One scan must stay bounded even when channels are slow to
            // answer, so the deadline applies between attempts too.
            if offset > 0 && Instant::now() >= self.deadline {
                return Some(self.latch_timeout());
            }

            let index = (self.cursor + offset) % sender_count;
            if self.senders[index].exhausted {
                continue;
            }

            if self.senders[index].mailbox.is_none() {
                let resolved = self
                    .mailbox_service
                    .receiving_mailbox(&self.senders[index].id);
                self.senders[index].mailbox = resolved;
            }
            let mailbox = match self.senders[index].mailbox.as_ref() {
                Some(mailbox) => Arc::clone(mailbox),
                // Sender not registered yet: same as "nothing available".
                None => continue,
            };

            if mailbox.is_closed() {
                self.senders[index].exhausted = true;
                continue;
            }

            match mailbox.try_receive() {
                Err(message) => {
                    return Some(
                        self.latch_error(ErrorBlock::new(ErrorKind::UnknownUpstream, message)),
                    );
                }
                Ok(TryRecv::NotReady) => continue,
                Ok(TryRecv::Block(TransferBlock::EndOfStream)) => {
                    self.senders[index].exhausted = true;
                    continue;
                }
                Ok(TryRecv::Block(TransferBlock::Error(error))) => {
                    return Some(self.latch_error(error));
                }
                Ok(TryRecv::Block(TransferBlock::NoOp)) => continue,
                Ok(TryRecv::Block(TransferBlock::Data(table))) => {
                    self.cursor = (index + 1) % sender_count;
                    return Some(TransferBlock::Data(table));
                }
            }
        }
        None
    }
}

impl Operator for ReceiveOperator {
    fn name(&self) -> &str {
        OPERATOR_NAME
    }

    fn next_block(&mut self) -> TransferBlock {
        if let Some(block) = self.terminal_block() {
            return block;
        }

        if Instant::now() >= self.deadline {
            return self.latch_timeout();
        }

        if self.all_exhausted() {
            return self.latch_end_of_stream();
        }

        if let Some(block) = self.scan_once() {
            return block;
        }

        // The pass may have newly exhausted the last live channel.
        if self.all_exhausted() {
            return self.latch_end_of_stream();
        }

        TransferBlock::NoOp
    }

    fn close(&mut self) {
        if self.closed {
            return;
        }
        self.closed = true;
        for sender in &mut self.senders {
            if let Some(mailbox) = sender.mailbox.take() {
                mailbox.release();
            }
        }
        debug!(
            "{} closed: sender_stage_id={} senders={}",
            OPERATOR_NAME,
            self.sender_stage_id,
            self.senders.len()
        );
    }
}

impl Drop for ReceiveOperator {
    fn drop(&mut self) {
        self.close();
    }
}
