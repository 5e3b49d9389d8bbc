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

use std::sync::Mutex;

use crate::error::{Error, ErrorKind};
use crate::fingerprint::{FingerprintScheme, WindowFingerprinter};

/// Upper bound on the counter array length, keeping indices addressable
/// as i32-compatible values.
pub const MAX_SKETCH_LEN: u32 = 0x7fff_ffff;

/// Fixed-size approximate counter array for the hashed mining path.
///
/// Distinct windows whose fingerprints collide modulo the array length share
/// a counter, so any bucket value is an upper bound on the true frequency of
/// any single window mapped to it, never a lower bound.
///
/// Updates serialize on one lock; see [`FrequencyTable`](super::FrequencyTable)
/// for the contention caveat, which applies here identically.
pub struct CountSketch {
    counters: Mutex<Vec<u32>>,
    len: u32,
    fingerprinter: Box<dyn WindowFingerprinter>,
    skip: u32,
}

impl CountSketch {
    /// Creates a zeroed sketch of `len` counters using the given
    /// fingerprinting scheme and skip factor.
    ///
    /// A `skip` of 0 or 1 disables sub-sampling.
    pub fn new(len: u32, scheme: FingerprintScheme, skip: u32) -> Result<Self, Error> {
        if len == 0 || len > MAX_SKETCH_LEN {
            return Err(
                Error::new(ErrorKind::ConfigInvalid, "sketch length out of range")
                    .with_context("len", len)
                    .with_context("max", MAX_SKETCH_LEN),
            );
        }
        Ok(Self {
            counters: Mutex::new(vec![0; len as usize]),
            len,
            fingerprinter: scheme.fingerprinter(),
            skip,
        })
    }

    /// Returns the counter array length.
    pub fn len(&self) -> u32 {
        self.len
    }

    /// Returns the bucket index `window` maps to.
    pub fn bucket_of(&self, window: &[u8]) -> u32 {
        self.fingerprinter.fingerprint(window) % self.len
    }

    /// Returns true if `window` passes the skip-gram sub-sampling probe.
    ///
    /// The probe reads the window's first 4 bytes as a big-endian unsigned
    /// integer and keeps the window when that value divides evenly by the
    /// skip factor. Windows narrower than the probe are never sub-sampled;
    /// mining configuration validation rules them out up front.
    pub fn sampled(&self, window: &[u8]) -> bool {
        if self.skip <= 1 || window.len() < 4 {
            return true;
        }
        let probe = u32::from_be_bytes([window[0], window[1], window[2], window[3]]);
        probe % self.skip == 0
    }

    /// Counts `window` into its bucket if it passes the sampling probe.
    pub fn accumulate(&self, window: &[u8]) {
        if !self.sampled(window) {
            return;
        }
        let bucket = self.bucket_of(window) as usize;
        let mut counters = self.counters.lock().expect("sketch lock poisoned");
        counters[bucket] = counters[bucket].saturating_add(1);
    }

    /// Empties the sketch and returns the counter array.
    pub fn drain_counts(&self) -> Vec<u32> {
        let mut counters = self.counters.lock().expect("sketch lock poisoned");
        std::mem::take(&mut *counters)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_zero_length() {
        assert!(CountSketch::new(0, FingerprintScheme::Polynomial, 1).is_err());
    }

    #[test]
    fn accumulate_lands_in_fingerprint_bucket() {
        let sketch = CountSketch::new(1024, FingerprintScheme::Polynomial, 1).unwrap();
        let window = b"\x01\x02\x03\x04";
        let bucket = sketch.bucket_of(window) as usize;

        sketch.accumulate(window);
        sketch.accumulate(window);

        let counts = sketch.drain_counts();
        assert_eq!(counts[bucket], 2);
        assert_eq!(counts.iter().map(|&c| u64::from(c)).sum::<u64>(), 2);
    }

    #[test]
    fn skip_probe_keeps_divisible_prefixes_only() {
        let sketch = CountSketch::new(64, FingerprintScheme::Murmur, 2).unwrap();
        // First 4 bytes 0x00000004 = 4, divisible by 2.
        assert!(sketch.sampled(b"\x00\x00\x00\x04xx"));
        // First 4 bytes 0x00000005 = 5, not divisible by 2.
        assert!(!sketch.sampled(b"\x00\x00\x00\x05xx"));
    }

    #[test]
    fn skipped_windows_are_not_counted() {
        let sketch = CountSketch::new(64, FingerprintScheme::Polynomial, 2).unwrap();
        sketch.accumulate(b"\x00\x00\x00\x05");
        assert_eq!(
            sketch.drain_counts().iter().map(|&c| u64::from(c)).sum::<u64>(),
            0
        );
    }

    #[test]
    fn colliding_windows_share_a_bucket_upper_bound() {
        // Length 1 forces every window into bucket 0.
        let sketch = CountSketch::new(1, FingerprintScheme::Polynomial, 1).unwrap();
        sketch.accumulate(b"aaaa");
        sketch.accumulate(b"bbbb");
        let counts = sketch.drain_counts();
        // The shared bucket over-estimates each individual window.
        assert_eq!(counts[0], 2);
    }
}
