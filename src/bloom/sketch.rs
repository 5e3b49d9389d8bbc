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

use std::borrow::Cow;

use crate::common::random::{RandomSource, XorShift64};
use crate::error::{Error, ErrorKind};
use crate::hash::{content_digest, mix64};

/// Counter-decoding radix shared by every filter this crate writes.
///
/// The radix pair is a process-wide constant: changing it would silently
/// re-scale every persisted counter, so both values are frozen here.
pub const DEFAULT_BASE: f64 = 1.090878326190223750496427194244941608437246127397209913749;

/// Precomputed natural log of [`DEFAULT_BASE`].
pub const DEFAULT_LOG_BASE: f64 =
    0.086983175599679411377848736810437843836925507056973208359;

/// Largest storable counter exponent; counters saturate here.
pub const MAX_EXPONENT: u8 = 255;

/// Converts an item into its canonical byte representation for hashing.
///
/// Callers supply the encoding explicitly; an item that has no canonical
/// byte form fails with [`ErrorKind::EncodingFailed`], which `put` and
/// `get` surface without touching the filter.
pub trait FilterItem {
    /// Returns the canonical bytes of this item.
    fn item_bytes(&self) -> Result<Cow<'_, [u8]>, Error>;
}

impl FilterItem for [u8] {
    fn item_bytes(&self) -> Result<Cow<'_, [u8]>, Error> {
        Ok(Cow::Borrowed(self))
    }
}

impl FilterItem for Vec<u8> {
    fn item_bytes(&self) -> Result<Cow<'_, [u8]>, Error> {
        Ok(Cow::Borrowed(self.as_slice()))
    }
}

impl FilterItem for str {
    fn item_bytes(&self) -> Result<Cow<'_, [u8]>, Error> {
        Ok(Cow::Borrowed(self.as_bytes()))
    }
}

impl FilterItem for String {
    fn item_bytes(&self) -> Result<Cow<'_, [u8]>, Error> {
        Ok(Cow::Borrowed(self.as_bytes()))
    }
}

impl FilterItem for u64 {
    fn item_bytes(&self) -> Result<Cow<'_, [u8]>, Error> {
        Ok(Cow::Owned(self.to_be_bytes().to_vec()))
    }
}

impl<T: FilterItem + ?Sized> FilterItem for &T {
    fn item_bytes(&self) -> Result<Cow<'_, [u8]>, Error> {
        (**self).item_bytes()
    }
}

/// A counting Bloom filter over k hashed counter slots.
///
/// Construction draws k independent 32-bit hash seeds; an item's digest is
/// combined with each seed and avalanche-mixed to derive k slot indices.
/// `put` raises each slot to at least the inserted count's exponent,
/// `get` reads the minimum across the k slots (the conservative,
/// collision-suppressing read).
///
/// Use [`CountingBloomBuilder`] to construct instances.
#[derive(Debug, Clone, PartialEq)]
pub struct CountingBloomFilter {
    /// Radix decoding a stored exponent back into an approximate count.
    pub(super) base: f64,
    /// Natural log of `base`; the exponent encoder divides by this.
    pub(super) log_base: f64,
    /// Number of successful `put` calls over the filter's lifetime.
    pub(super) inserted: u32,
    /// Reserved scaling field carried through persistence; always 0 here.
    pub(super) divisor: i64,
    /// The k per-hash seeds, fixed at construction.
    pub(super) seeds: Vec<i32>,
    /// One saturating exponent byte per slot.
    pub(super) counters: Vec<u8>,
}

impl CountingBloomFilter {
    /// Returns a builder for creating a counting Bloom filter.
    pub fn builder() -> CountingBloomBuilder {
        CountingBloomBuilder::default()
    }

    /// Records `item` as occurring `raw_count` times.
    ///
    /// Every derived slot is raised to at least the count's exponent; slots
    /// never decrease. Repeated puts with the same count are idempotent on
    /// the counters (only the insert tally moves).
    ///
    /// # Errors
    ///
    /// [`ErrorKind::EncodingFailed`] if the item has no canonical byte form.
    pub fn put<T: FilterItem + ?Sized>(&mut self, item: &T, raw_count: u64) -> Result<(), Error> {
        let bytes = item.item_bytes()?;
        let digest = content_digest(&bytes);
        let exponent = self.exponent_for(raw_count);

        for i in 0..self.seeds.len() {
            let slot = self.slot_index(self.seeds[i], digest);
            self.counters[slot] = self.counters[slot].max(exponent);
        }

        self.inserted += 1;
        Ok(())
    }

    /// Returns the approximate count recorded for `item`, or 0 if the item
    /// was (probably) never inserted.
    ///
    /// The result is never below the true decoded maximum inserted for this
    /// exact item; hash collisions can only inflate it.
    ///
    /// # Errors
    ///
    /// [`ErrorKind::EncodingFailed`] if the item has no canonical byte form.
    pub fn get<T: FilterItem + ?Sized>(&self, item: &T) -> Result<u64, Error> {
        let bytes = item.item_bytes()?;
        let digest = content_digest(&bytes);

        let mut min_exponent = u8::MAX;
        for &seed in &self.seeds {
            let slot = self.slot_index(seed, digest);
            min_exponent = min_exponent.min(self.counters[slot]);
        }

        if min_exponent == 0 {
            return Ok(0);
        }
        Ok(self.base.powi(i32::from(min_exponent)).round() as u64)
    }

    /// Returns the number of successful `put` calls.
    pub fn inserted(&self) -> u32 {
        self.inserted
    }

    /// Returns the number of counter slots.
    pub fn num_slots(&self) -> usize {
        self.counters.len()
    }

    /// Returns the number of hash functions (k).
    pub fn num_hashes(&self) -> usize {
        self.seeds.len()
    }

    /// Returns the per-hash seeds.
    pub fn seeds(&self) -> &[i32] {
        &self.seeds
    }

    /// Returns the counter-decoding radix.
    pub fn base(&self) -> f64 {
        self.base
    }

    /// Returns the stored natural log of the radix.
    pub fn log_base(&self) -> f64 {
        self.log_base
    }

    /// Returns the raw counter bytes.
    pub fn counters(&self) -> &[u8] {
        &self.counters
    }

    /// Encodes `raw_count` as a saturating counter exponent.
    ///
    /// The formula is `clamp(ceil(ln(raw_count / log_base)), 0, 255)`,
    /// deliberately *not* `ceil(ln(raw_count) / ln(base))`. The first form
    /// is what every persisted filter was written with, so it is part of
    /// the artifact contract and must not be "corrected".
    pub(super) fn exponent_for(&self, raw_count: u64) -> u8 {
        let scaled = raw_count as f64 / self.log_base;
        scaled.ln().ceil().clamp(0.0, f64::from(MAX_EXPONENT)) as u8
    }

    /// Derives the counter slot for one seed and an item digest.
    fn slot_index(&self, seed: i32, digest: u64) -> usize {
        let key = (u64::from(seed as u32) << 32) | digest;
        (mix64(key) % self.counters.len() as u64) as usize
    }
}

/// Builder for creating [`CountingBloomFilter`] instances.
///
/// Provides two construction modes:
/// - [`with_accuracy()`](Self::with_accuracy): target insert count and false
///   positive rate (recommended)
/// - [`with_size()`](Self::with_size): exact slot and hash counts (manual)
#[derive(Debug, Clone, Default)]
pub struct CountingBloomBuilder {
    num_slots: Option<u32>,
    num_hashes: Option<u32>,
    rng_seed: Option<u64>,
}

impl CountingBloomBuilder {
    /// Creates a builder sized for `max_items` inserts at false positive
    /// rate `fpp`, via [`suggest_num_slots`](Self::suggest_num_slots) and
    /// [`suggest_num_hashes`](Self::suggest_num_hashes).
    pub fn with_accuracy(max_items: u64, fpp: f64) -> Self {
        let num_slots = Self::suggest_num_slots(max_items, fpp);
        let num_hashes = Self::suggest_num_hashes(max_items, num_slots);
        CountingBloomBuilder {
            num_slots: Some(num_slots),
            num_hashes: Some(num_hashes),
            rng_seed: None,
        }
    }

    /// Creates a builder with manual slot and hash counts.
    pub fn with_size(num_slots: u32, num_hashes: u32) -> Self {
        CountingBloomBuilder {
            num_slots: Some(num_slots),
            num_hashes: Some(num_hashes),
            rng_seed: None,
        }
    }

    /// Seeds the generator that draws the per-hash seeds, making
    /// construction deterministic. Filters built with different draws
    /// address different slots and cannot read each other's artifacts.
    pub fn rng_seed(mut self, seed: u64) -> Self {
        self.rng_seed = Some(seed);
        self
    }

    /// Suggests the slot count for a target accuracy.
    ///
    /// Formula: `m = ceil(-n * ln(p) / (ln 2)^2)`.
    pub fn suggest_num_slots(max_items: u64, fpp: f64) -> u32 {
        let n = max_items as f64;
        let ln2_squared = std::f64::consts::LN_2 * std::f64::consts::LN_2;
        (-(n) * fpp.ln() / ln2_squared).ceil() as u32
    }

    /// Suggests the hash count for a slot count.
    ///
    /// Formula: `k = round(m / n * ln 2)`, at least 1.
    pub fn suggest_num_hashes(max_items: u64, num_slots: u32) -> u32 {
        let k = (f64::from(num_slots) / max_items as f64 * std::f64::consts::LN_2).round();
        (k as u32).max(1)
    }

    /// Builds the filter: zeroed counters and freshly drawn hash seeds.
    ///
    /// # Errors
    ///
    /// [`ErrorKind::ConfigInvalid`] unless both counts are at least 1.
    pub fn build(self) -> Result<CountingBloomFilter, Error> {
        let num_slots = self.num_slots.unwrap_or(0);
        let num_hashes = self.num_hashes.unwrap_or(0);
        if num_slots == 0 {
            return Err(Error::new(
                ErrorKind::ConfigInvalid,
                "filter needs at least one counter slot",
            ));
        }
        if num_hashes == 0 {
            return Err(Error::new(
                ErrorKind::ConfigInvalid,
                "filter needs at least one hash function",
            ));
        }

        let mut rng = match self.rng_seed {
            Some(seed) => XorShift64::seeded(seed),
            None => XorShift64::default(),
        };
        let seeds = (0..num_hashes).map(|_| rng.next_i32()).collect();

        Ok(CountingBloomFilter {
            base: DEFAULT_BASE,
            log_base: DEFAULT_LOG_BASE,
            inserted: 0,
            divisor: 0,
            seeds,
            counters: vec![0; num_slots as usize],
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn small_filter() -> CountingBloomFilter {
        CountingBloomBuilder::with_size(4096, 3)
            .rng_seed(99)
            .build()
            .unwrap()
    }

    #[test]
    fn builder_with_accuracy_sizes_sensibly() {
        let filter = CountingBloomBuilder::with_accuracy(1000, 0.01)
            .rng_seed(1)
            .build()
            .unwrap();
        // ~9585 slots, 7 hashes for 1000 items at 1%.
        assert!(filter.num_slots() > 9000 && filter.num_slots() < 10000);
        assert_eq!(filter.num_hashes(), 7);
    }

    #[test]
    fn build_rejects_empty_configuration() {
        assert!(CountingBloomBuilder::with_size(0, 3).build().is_err());
        assert!(CountingBloomBuilder::with_size(64, 0).build().is_err());
    }

    #[test]
    fn deterministic_seeding_reproduces_seeds() {
        let a = small_filter();
        let b = small_filter();
        assert_eq!(a.seeds(), b.seeds());
    }

    #[test]
    fn put_then_get_reports_presence() {
        let mut filter = small_filter();
        filter.put("apple", 1).unwrap();

        assert!(filter.get("apple").unwrap() > 0);
        assert_eq!(filter.inserted(), 1);
    }

    #[test]
    fn get_decodes_the_exponent_without_collisions() {
        let mut filter = small_filter();
        let raw = 1000u64;
        filter.put(b"windowed".as_slice(), raw).unwrap();

        let expected_exponent = filter.exponent_for(raw);
        let expected = filter.base().powi(i32::from(expected_exponent)).round() as u64;
        assert_eq!(filter.get(b"windowed".as_slice()).unwrap(), expected);
    }

    #[test]
    fn counters_are_monotone_under_max_merge() {
        let mut filter = small_filter();
        filter.put("item", 1000).unwrap();
        let high = filter.get("item").unwrap();

        // A later put with a smaller count must not lower the estimate.
        filter.put("item", 1).unwrap();
        assert_eq!(filter.get("item").unwrap(), high);
        assert_eq!(filter.inserted(), 2);
    }

    #[test]
    fn repeated_puts_do_not_inflate_the_estimate() {
        let mut filter = small_filter();
        filter.put("stable", 50).unwrap();
        let first = filter.get("stable").unwrap();
        for _ in 0..10 {
            filter.put("stable", 50).unwrap();
        }
        assert_eq!(filter.get("stable").unwrap(), first);
    }

    #[test]
    fn exponent_saturates_at_the_counter_ceiling() {
        let filter = small_filter();
        assert_eq!(filter.exponent_for(u64::MAX), MAX_EXPONENT);
        assert_eq!(filter.exponent_for(0), 0);
    }

    #[test]
    fn exponent_uses_the_as_built_formula() {
        let filter = small_filter();
        let raw = 1000u64;
        let expected = (raw as f64 / DEFAULT_LOG_BASE).ln().ceil() as u8;
        assert_eq!(filter.exponent_for(raw), expected);
        // The as-built formula differs from ln(raw)/ln(base).
        let algebraic = ((raw as f64).ln() / DEFAULT_LOG_BASE).ceil() as u8;
        assert_ne!(filter.exponent_for(raw), algebraic);
    }

    #[test]
    fn never_inserted_items_mostly_read_zero() {
        let mut filter = CountingBloomBuilder::with_accuracy(200, 0.01)
            .rng_seed(7)
            .build()
            .unwrap();
        for i in 0u64..200 {
            filter.put(&format!("present-{i}"), 1).unwrap();
        }

        let mut false_positives = 0;
        let probes = 1000;
        for i in 0u64..probes {
            if filter.get(&format!("absent-{i}")).unwrap() > 0 {
                false_positives += 1;
            }
        }
        // 1% target rate; allow generous slack for hash variance.
        assert!(
            false_positives < probes / 20,
            "false positive count too high: {false_positives}"
        );
    }
}
