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

//! Order-statistics selection over `(identity, count)` pairs.
//!
//! The hashed mining path produces one pair per occupied sketch bucket,
//! far too many to sort outright, so the top k are isolated with a
//! Hoare-style quickselect in O(n) average time. The exact path's table is
//! bounded by observed cardinality and is fully sorted instead (see
//! [`FrequencyTable::drain_sorted_desc`](crate::freq::FrequencyTable::drain_sorted_desc)).

/// Retains the `k` entries with the largest counts, truncating the rest.
///
/// Every kept entry's count is >= every discarded entry's count. Order
/// within the kept prefix is unspecified, as is which entries survive a
/// count tie at the boundary.
pub fn select_top_k<T>(entries: &mut Vec<(T, u64)>, k: usize) {
    if k >= entries.len() {
        return;
    }
    if k == 0 {
        entries.clear();
        return;
    }

    let mut lo = 0;
    let mut hi = entries.len() - 1;
    while lo < hi {
        let p = partition_desc(entries, lo, hi);
        if k <= p + 1 {
            hi = p;
        } else {
            lo = p + 1;
        }
    }
    entries.truncate(k);
}

/// Drops entries whose support does not clear the majority threshold:
/// anything counted in at most half of the scanned files.
pub fn retain_majority<T>(entries: &mut Vec<(T, u64)>, num_files: usize) {
    let threshold = (num_files / 2) as u64;
    entries.retain(|(_, count)| *count > threshold);
}

/// Hoare partition for descending order: afterwards every count in
/// `entries[lo..=p]` is >= every count in `entries[p + 1..=hi]`.
fn partition_desc<T>(entries: &mut [(T, u64)], lo: usize, hi: usize) -> usize {
    let pivot = entries[lo + (hi - lo) / 2].1;
    let mut i = lo;
    let mut j = hi;
    loop {
        while entries[i].1 > pivot {
            i += 1;
        }
        while entries[j].1 < pivot {
            j -= 1;
        }
        if i >= j {
            return j;
        }
        entries.swap(i, j);
        i += 1;
        j -= 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn keeps_the_two_largest() {
        let mut entries = vec![("a", 5), ("b", 9), ("c", 1), ("d", 7)];
        select_top_k(&mut entries, 2);

        let kept: HashSet<&str> = entries.iter().map(|(id, _)| *id).collect();
        assert_eq!(kept, HashSet::from(["b", "d"]));
    }

    #[test]
    fn kept_counts_dominate_excluded_counts() {
        let all: Vec<(usize, u64)> = (0..257)
            .map(|i| (i, ((i * 7919) % 251) as u64))
            .collect();

        for k in [1, 2, 13, 250, 257, 300] {
            let mut working = all.clone();
            select_top_k(&mut working, k);
            assert_eq!(working.len(), k.min(all.len()));

            let min_kept = working.iter().map(|(_, c)| *c).min().unwrap();
            let kept_ids: HashSet<usize> = working.iter().map(|(id, _)| *id).collect();
            for (id, count) in &all {
                if !kept_ids.contains(id) {
                    assert!(*count <= min_kept, "excluded {count} > kept min {min_kept}");
                }
            }
        }
    }

    #[test]
    fn k_zero_clears() {
        let mut entries = vec![("a", 1u64)];
        select_top_k(&mut entries, 0);
        assert!(entries.is_empty());
    }

    #[test]
    fn k_beyond_len_keeps_everything() {
        let mut entries = vec![("a", 1u64), ("b", 2)];
        select_top_k(&mut entries, 10);
        assert_eq!(entries.len(), 2);
    }

    #[test]
    fn uniform_counts_still_select_k() {
        let mut entries: Vec<(usize, u64)> = (0..64).map(|i| (i, 3)).collect();
        select_top_k(&mut entries, 10);
        assert_eq!(entries.len(), 10);
    }

    #[test]
    fn majority_filter_drops_half_or_less() {
        let mut entries = vec![(0usize, 5u64), (1, 6), (2, 10), (3, 0)];
        // 10 files scanned: threshold is count > 5.
        retain_majority(&mut entries, 10);
        assert_eq!(entries, vec![(1, 6), (2, 10)]);
    }
}
