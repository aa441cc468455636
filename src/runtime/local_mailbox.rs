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
//! In-process mailbox service for same-host stage boundaries and tests.
//!
//! Senders `open` a mailbox (creating it on first use) and push blocks into
//! its queue; receivers resolve the same id and probe the queue without
//! blocking. A resolve before the sender opened the channel returns `None`.

use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex, Weak};

use crate::chronoflow_logging::debug;
use crate::exec::block::TransferBlock;
use crate::runtime::mailbox::{MailboxId, MailboxService, ReceivingMailbox, TryRecv};

type Registry = Mutex<HashMap<MailboxId, Arc<LocalMailbox>>>;

#[derive(Default)]
struct MailboxState {
    queue: VecDeque<TransferBlock>,
    closed: bool,
}

/// One in-process channel: a FIFO of blocks plus a closed flag.
pub struct LocalMailbox {
    id: MailboxId,
    registry: Weak<Registry>,
    state: Mutex<MailboxState>,
}

impl LocalMailbox {
    /// Sender side: enqueue one block. Fails once the channel is closed.
    pub fn push(&self, block: TransferBlock) -> Result<(), String> {
        let mut state = self.state.lock().expect("local mailbox lock");
        if state.closed {
            return Err(format!("mailbox already closed: {}", self.id));
        }
        state.queue.push_back(block);
        Ok(())
    }

    /// Sender side: no more blocks will arrive. Queued blocks stay readable.
    pub fn close(&self) {
        let mut state = self.state.lock().expect("local mailbox lock");
        state.closed = true;
        debug!("local mailbox closed: id={} queued={}", self.id, state.queue.len());
    }

    pub fn id(&self) -> &MailboxId {
        &self.id
    }
}

impl ReceivingMailbox for LocalMailbox {
    fn is_closed(&self) -> bool {
        let state = self.state.lock().expect("local mailbox lock");
        state.closed && state.queue.is_empty()
    }

    fn try_receive(&self) -> Result<TryRecv, String> {
        let mut state = self.state.lock().expect("local mailbox lock");
        match state.queue.pop_front() {
            Some(block) => Ok(TryRecv::Block(block)),
            None => Ok(TryRecv::NotReady),
        }
    }

    fn release(&self) {
        if let Some(registry) = self.registry.upgrade() {
            let removed = registry
                .lock()
                .expect("local mailbox registry lock")
                .remove(&self.id)
                .is_some();
            if removed {
                debug!("local mailbox released: id={}", self.id);
            }
        }
    }
}

/// Registry of in-process mailboxes for one receiving server.
pub struct LocalMailboxService {
    hostname: String,
    port: u16,
    registry: Arc<Registry>,
}

impl LocalMailboxService {
    pub fn new(hostname: impl Into<String>, port: u16) -> Self {
        Self {
            hostname: hostname.into(),
            port,
            registry: Arc::new(Mutex::new(HashMap::new())),
        }
    }

    /// Sender side: get or create the mailbox for `id`.
    pub fn open(&self, id: MailboxId) -> Arc<LocalMailbox> {
        let mut registry = self.registry.lock().expect("local mailbox registry lock");
        if let Some(existing) = registry.get(&id) {
            return Arc::clone(existing);
        }
        let mailbox = Arc::new(LocalMailbox {
            id: id.clone(),
            registry: Arc::downgrade(&self.registry),
            state: Mutex::new(MailboxState::default()),
        });
        registry.insert(id.clone(), Arc::clone(&mailbox));
        debug!("local mailbox created: id={}", id);
        mailbox
    }

    pub fn len(&self) -> usize {
        self.registry.lock().expect("local mailbox registry lock").len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl MailboxService for LocalMailboxService {
    fn hostname(&self) -> &str {
        &self.hostname
    }

    fn mailbox_port(&self) -> u16 {
        self.port
    }

    fn receiving_mailbox(&self, id: &MailboxId) -> Option<Arc<dyn ReceivingMailbox>> {
        let registry = self.registry.lock().expect("local mailbox registry lock");
        registry
            .get(id)
            .cloned()
            .map(|m| m as Arc<dyn ReceivingMailbox>)
    }
}

#[cfg(test)]
mod tests {
    use super::LocalMailboxService;
    use crate::common::types::VirtualServerAddress;
    use crate::exec::block::TransferBlock;
    use crate::runtime::mailbox::{MailboxId, MailboxService, ReceivingMailbox, TryRecv};

    fn sample_id() -> MailboxId {
        MailboxId::new(
            1,
            2,
            VirtualServerAddress::new("localhost", 9070, 0),
            VirtualServerAddress::new("localhost", 9070, 1),
            0,
        )
    }

    #[test]
    fn resolve_before_open_returns_none() {
        let service = LocalMailboxService::new("localhost", 9070);
        assert!(service.receiving_mailbox(&sample_id()).is_none());
    }

    #[test]
    fn push_then_receive_is_fifo() {
        let service = LocalMailboxService::new("localhost", 9070);
        let mailbox = service.open(sample_id());
        mailbox.push(TransferBlock::noop()).expect("push");
        mailbox.push(TransferBlock::end_of_stream()).expect("push");

        match mailbox.try_receive().expect("recv") {
            TryRecv::Block(b) => assert!(b.is_noop()),
            TryRecv::NotReady => panic!("expected a block"),
        }
        match mailbox.try_receive().expect("recv") {
            TryRecv::Block(b) => assert!(b.is_end_of_stream()),
            TryRecv::NotReady => panic!("expected a block"),
        }
        assert!(matches!(
            mailbox.try_receive().expect("recv"),
            TryRecv::NotReady
        ));
    }

    #[test]
    fn closed_only_after_drained() {
        let service = LocalMailboxService::new("localhost", 9070);
        let mailbox = service.open(sample_id());
        mailbox.push(TransferBlock::end_of_stream()).expect("push");
        mailbox.close();
        assert!(!mailbox.is_closed());
        let _ = mailbox.try_receive().expect("recv");
        assert!(mailbox.is_closed());
    }

    #[test]
    fn push_after_close_fails() {
        let service = LocalMailboxService::new("localhost", 9070);
        let mailbox = service.open(sample_id());
        mailbox.close();
        assert!(mailbox.push(TransferBlock::noop()).is_err());
    }

    #[test]
    fn release_unregisters_from_service() {
        let service = LocalMailboxService::new("localhost", 9070);
        let mailbox = service.open(sample_id());
        assert_eq!(service.len(), 1);
        mailbox.release();
        assert!(service.is_empty());
        assert!(service.receiving_mailbox(&sample_id()).is_none());
    }
}
