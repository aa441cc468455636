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
use std::time::Duration;

/// Shared time axis of one time-series result: every series in the result
/// indexes the same buckets. Immutable once constructed.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TimeBuckets {
    first_bucket_value: i64,
    bucket_size: Duration,
    num_buckets: usize,
}

impl TimeBuckets {
    pub fn of_seconds(first_bucket_value: i64, bucket_size: Duration, num_buckets: usize) -> Self {
        Self {
            first_bucket_value,
            bucket_size,
            num_buckets,
        }
    }

    /// Start of the first bucket, in epoch seconds.
    pub fn first_bucket_value(&self) -> i64 {
        self.first_bucket_value
    }

    pub fn bucket_size(&self) -> Duration {
        self.bucket_size
    }

    pub fn num_buckets(&self) -> usize {
        self.num_buckets
    }
}
