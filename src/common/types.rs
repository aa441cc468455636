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
use std::fmt;

/// Address of one stage instance on one server. The `virtual_id` separates
/// multiple instances of the same stage that share a physical host/port.
#[derive(Clone, Debug, Eq, PartialEq, Hash)]
pub struct VirtualServerAddress {
    pub hostname: String,
    pub port: u16,
    pub virtual_id: u32,
}

impl VirtualServerAddress {
    pub fn new(hostname: impl Into<String>, port: u16, virtual_id: u32) -> Self {
        Self {
            hostname: hostname.into(),
            port,
            virtual_id,
        }
    }
}

impl fmt::Display for VirtualServerAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}@{}#{}", self.hostname, self.port, self.virtual_id)
    }
}

/// Fan-out/fan-in topology the plan declares for a stage boundary.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub enum DistributionType {
    Singleton,
    HashDistributed,
    BroadcastDistributed,
    /// Declared by the planner but not executable by this runtime.
    RangeDistributed,
}

impl fmt::Display for DistributionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            DistributionType::Singleton => "SINGLETON",
            DistributionType::HashDistributed => "HASH_DISTRIBUTED",
            DistributionType::BroadcastDistributed => "BROADCAST_DISTRIBUTED",
            DistributionType::RangeDistributed => "RANGE_DISTRIBUTED",
        };
        f.write_str(s)
    }
}
