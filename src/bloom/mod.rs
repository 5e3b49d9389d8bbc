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

//! Counting Bloom filter with saturating log-scale counters.
//!
//! Unlike a classic additive counting Bloom filter, counter updates are
//! max-merge: each slot stores the largest count *exponent* ever inserted
//! through it, so the filter answers "has this item's count ever reached at
//! least X", not "how many times was it inserted".
//!
//! # Usage
//!
//! ```rust
//! use bytegrams::bloom::{CountingBloomBuilder, CountingBloomFilter};
//!
//! let mut filter = CountingBloomBuilder::with_accuracy(1000, 0.01)
//!     .rng_seed(42)
//!     .build()
//!     .unwrap();
//!
//! filter.put("apple", 100).unwrap();
//! assert!(filter.get("apple").unwrap() > 0);
//! assert_eq!(filter.get("grape").unwrap(), 0); // never inserted (probably)
//!
//! let restored = CountingBloomFilter::deserialize(&filter.serialize()).unwrap();
//! assert_eq!(restored.inserted(), filter.inserted());
//! ```

mod serialization;

mod sketch;
pub use self::sketch::CountingBloomBuilder;
pub use self::sketch::CountingBloomFilter;
pub use self::sketch::DEFAULT_BASE;
pub use self::sketch::DEFAULT_LOG_BASE;
pub use self::sketch::FilterItem;
pub use self::sketch::MAX_EXPONENT;
