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
//! Operator contracts for the transport runtime.

use crate::exec::block::TransferBlock;

pub mod receive;

/// Pull contract the engine's drivers use against transport operators.
///
/// `next_block` is bounded: it performs non-blocking probes only and returns
/// a no-op block when nothing is ready, so one caller thread can drive many
/// operators cooperatively. Runtime failures come back as in-band error
/// blocks, never panics or `Err`.
pub trait Operator: Send {
    fn name(&self) -> &str;

    fn next_block(&mut self) -> TransferBlock;

    /// Release held resources. Safe to call more than once.
    fn close(&mut self);
}
