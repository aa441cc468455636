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
use std::collections::HashMap;
use std::sync::Arc;

use twox_hash::XxHash3_64;

use crate::timeseries::TimeBuckets;

/// One labeled series over the result's shared time axis.
///
/// The identity is derived from the tag values, never transmitted: two
/// series with the same tag-value array hash to the same id.
#[derive(Clone, Debug, PartialEq)]
pub struct TimeSeries {
    id: String,
    tag_names: Arc<Vec<String>>,
    tag_values: Vec<Option<String>>,
    values: Vec<Option<f64>>,
}

impl TimeSeries {
    pub fn new(
        id: String,
        tag_names: Arc<Vec<String>>,
        tag_values: Vec<Option<String>>,
        values: Vec<Option<f64>>,
        time_buckets: &TimeBuckets,
    ) -> Result<Self, String> {
        if values.len() != time_buckets.num_buckets() {
            return Err(format!(
                "series has {} values but the time axis has {} buckets",
                values.len(),
                time_buckets.num_buckets()
            ));
        }
        if tag_values.len() != tag_names.len() {
            return Err(format!(
                "series has {} tag values for {} tag names",
                tag_values.len(),
                tag_names.len()
            ));
        }
        Ok(Self {
            id,
            tag_names,
            tag_values,
            values,
        })
    }

    /// 64-bit hash over the raw tag-value array. An absent value hashes
    /// differently from any present string, including the string "null".
    pub fn hash_tag_values(tag_values: &[Option<String>]) -> i64 {
        let mut buf = Vec::new();
        for value in tag_values {
            match value {
                Some(s) => {
                    buf.push(1u8);
                    buf.extend_from_slice(&(s.len() as u64).to_le_bytes());
                    buf.extend_from_slice(s.as_bytes());
                }
                None => buf.push(0u8),
            }
        }
        XxHash3_64::oneshot(&buf) as i64
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn tag_names(&self) -> &Arc<Vec<String>> {
        &self.tag_names
    }

    pub fn tag_values(&self) -> &[Option<String>] {
        &self.tag_values
    }

    pub fn values(&self) -> &[Option<f64>] {
        &self.values
    }
}

/// A time-series result: the shared axis plus series grouped by an opaque
/// key owned by the caller.
#[derive(Clone, Debug, Default)]
pub struct TimeSeriesBlock {
    time_buckets: Option<TimeBuckets>,
    series_map: HashMap<i64, Vec<TimeSeries>>,
}

impl TimeSeriesBlock {
    pub fn new(time_buckets: TimeBuckets) -> Self {
        Self {
            time_buckets: Some(time_buckets),
            series_map: HashMap::new(),
        }
    }

    pub fn with_series(time_buckets: TimeBuckets, series_map: HashMap<i64, Vec<TimeSeries>>) -> Self {
        Self {
            time_buckets: Some(time_buckets),
            series_map,
        }
    }

    pub fn insert_series(&mut self, group_key: i64, series: TimeSeries) {
        self.series_map.entry(group_key).or_default().push(series);
    }

    pub fn time_buckets(&self) -> Option<&TimeBuckets> {
        self.time_buckets.as_ref()
    }

    pub fn series_map(&self) -> &HashMap<i64, Vec<TimeSeries>> {
        &self.series_map
    }

    pub fn num_series(&self) -> usize {
        self.series_map.values().map(Vec::len).sum()
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::time::Duration;

    use super::{TimeSeries, TimeSeriesBlock};
    use crate::timeseries::TimeBuckets;

    fn axis() -> TimeBuckets {
        TimeBuckets::of_seconds(100, Duration::from_secs(10), 3)
    }

    #[test]
    fn tag_hash_is_stable_and_discriminating() {
        let a = vec![Some("Chicago".to_string()), Some("60607".to_string())];
        let b = vec![Some("Chicago".to_string()), Some("60607".to_string())];
        let c = vec![Some("Chicago".to_string()), None];
        let d = vec![Some("Chicago".to_string()), Some("null".to_string())];
        assert_eq!(TimeSeries::hash_tag_values(&a), TimeSeries::hash_tag_values(&b));
        assert_ne!(TimeSeries::hash_tag_values(&a), TimeSeries::hash_tag_values(&c));
        // An absent tag is not the same identity as the literal string.
        assert_ne!(TimeSeries::hash_tag_values(&c), TimeSeries::hash_tag_values(&d));
    }

    #[test]
    fn value_length_must_match_axis() {
        let names = Arc::new(vec!["city".to_string()]);
        let result = TimeSeries::new(
            "0".to_string(),
            names,
            vec![Some("Chicago".to_string())],
            vec![Some(1.0)],
            &axis(),
        );
        assert!(result.is_err());
    }

    #[test]
    fn tag_value_length_must_match_names() {
        let names = Arc::new(vec!["city".to_string(), "zip".to_string()]);
        let result = TimeSeries::new(
            "0".to_string(),
            names,
            vec![Some("Chicago".to_string())],
            vec![Some(1.0), None, Some(2.0)],
            &axis(),
        );
        assert!(result.is_err());
    }

    #[test]
    fn insert_groups_under_key() {
        let names = Arc::new(vec!["city".to_string()]);
        let series = TimeSeries::new(
            "0".to_string(),
            Arc::clone(&names),
            vec![Some("Chicago".to_string())],
            vec![Some(1.0), None, Some(2.0)],
            &axis(),
        )
        .expect("series");
        let mut block = TimeSeriesBlock::new(axis());
        block.insert_series(7, series.clone());
        block.insert_series(7, series);
        assert_eq!(block.num_series(), 2);
        assert_eq!(block.series_map().len(), 1);
    }
}
