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
use std::sync::Mutex;

/// Thread-safe exact counter keyed by window bytes.
///
/// Every mutation serializes on one exclusive lock shared by all workers.
/// That lock is the documented scalability ceiling of the exact path; a
/// sharded table is the known follow-up if contention ever dominates.
///
/// Reads taken while a mining pass is in flight observe whatever prefix of
/// the pass has been merged so far; call them only between passes when a
/// consistent view is needed.
#[derive(Debug, Default)]
pub struct FrequencyTable {
    data: Mutex<HashMap<Vec<u8>, u64>>,
}

impl FrequencyTable {
    /// Creates an empty table.
    pub fn new() -> Self {
        Self::default()
    }

    /// Increments the count for `window`, seeding it to 1 if absent.
    pub fn increment(&self, window: &[u8]) {
        let mut data = self.data.lock().expect("frequency table lock poisoned");
        match data.get_mut(window) {
            Some(count) => *count += 1,
            None => {
                data.insert(window.to_vec(), 1);
            }
        }
    }

    /// Returns the count recorded for `window`, or 0 if absent.
    pub fn count(&self, window: &[u8]) -> u64 {
        let data = self.data.lock().expect("frequency table lock poisoned");
        data.get(window).copied().unwrap_or(0)
    }

    /// Returns true if `window` has been recorded.
    pub fn contains(&self, window: &[u8]) -> bool {
        let data = self.data.lock().expect("frequency table lock poisoned");
        data.contains_key(window)
    }

    /// Returns the number of distinct windows recorded.
    pub fn len(&self) -> usize {
        let data = self.data.lock().expect("frequency table lock poisoned");
        data.len()
    }

    /// Returns true if no windows have been recorded.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Empties the table into a list of `(window, count)` pairs sorted
    /// descending by count, ascending by window bytes on ties.
    ///
    /// The extraction is destructive so peak memory is bounded by one copy
    /// of the entries; the table is empty afterwards.
    pub fn drain_sorted_desc(&self) -> Vec<(Vec<u8>, u64)> {
        let mut data = self.data.lock().expect("frequency table lock poisoned");
        let mut entries: Vec<(Vec<u8>, u64)> = data.drain().collect();
        drop(data);

        entries.sort_unstable_by(|(a_window, a_count), (b_window, b_count)| {
            b_count.cmp(a_count).then_with(|| a_window.cmp(b_window))
        });
        entries
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn increment_seeds_then_counts() {
        let table = FrequencyTable::new();
        assert!(table.is_empty());
        assert!(!table.contains(b"ab"));

        table.increment(b"ab");
        table.increment(b"ab");
        table.increment(b"cd");

        assert_eq!(table.count(b"ab"), 2);
        assert_eq!(table.count(b"cd"), 1);
        assert_eq!(table.count(b"zz"), 0);
        assert_eq!(table.len(), 2);
    }

    #[test]
    fn drain_sorts_descending_and_empties() {
        let table = FrequencyTable::new();
        for _ in 0..3 {
            table.increment(b"bb");
        }
        table.increment(b"aa");
        for _ in 0..2 {
            table.increment(b"cc");
        }

        let drained = table.drain_sorted_desc();
        assert_eq!(
            drained,
            vec![
                (b"bb".to_vec(), 3),
                (b"cc".to_vec(), 2),
                (b"aa".to_vec(), 1),
            ]
        );
        assert!(table.is_empty());
    }

    #[test]
    fn drain_breaks_count_ties_by_window_bytes() {
        let table = FrequencyTable::new();
        table.increment(b"dd");
        table.increment(b"aa");
        table.increment(b"bb");

        let drained = table.drain_sorted_desc();
        assert_eq!(
            drained,
            vec![
                (b"aa".to_vec(), 1),
                (b"bb".to_vec(), 1),
                (b"dd".to_vec(), 1),
            ]
        );
    }

    #[test]
    fn concurrent_increments_all_land() {
        let table = FrequencyTable::new();
        std::thread::scope(|scope| {
            for _ in 0..4 {
                scope.spawn(|| {
                    for _ in 0..250 {
                        table.increment(b"xy");
                    }
                });
            }
        });
        assert_eq!(table.count(b"xy"), 1000);
    }
}
