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

//! Mining primitives for discriminative byte n-grams.
//!
//! bytegrams scans corpora of raw files for the most broadly frequent
//! fixed-length byte sequences and builds two compact artifacts from them,
//! both feeding downstream feature-vector generation for malware/goodware
//! classification:
//!
//! - a [`keeplist`](crate::keeplist): the exact ordered set of top-K
//!   n-grams with mining metadata, persisted in a binary format;
//! - a [`counting Bloom filter`](crate::bloom): an approximate,
//!   disk-persisted frequency sketch with saturating log-scale counters.
//!
//! Mining runs either exactly (literal windows in a
//! [frequency table](crate::freq::FrequencyTable)) or approximately (window
//! fingerprints in a fixed-size [sketch](crate::freq::CountSketch), with a
//! second corpus pass recovering the literal bytes of the winning buckets).
//! The [`mine`](crate::mine) module drives either path across a pool of
//! workers.
//!
//! # Usage
//!
//! ```rust,no_run
//! use bytegrams::corpus::{collect_files, FsContentSource};
//! use bytegrams::mine::{CancelToken, MineConfig, Miner, MiningMethod};
//!
//! let miner = Miner::new(
//!     MineConfig {
//!         ngram_size: 6,
//!         keep: 1000,
//!         method: MiningMethod::hashed(),
//!         ..MineConfig::default()
//!     },
//!     FsContentSource,
//! )
//! .unwrap();
//!
//! let files = collect_files(&["samples/malware"]);
//! let keeplist = miner
//!     .mine_keeplist(&files, &CancelToken::new())
//!     .unwrap();
//! keeplist.save("malware.grams").unwrap();
//! ```

pub mod bloom;
pub mod common;
pub mod corpus;
pub mod error;
pub mod fingerprint;
pub mod freq;
pub mod hash;
pub mod keeplist;
pub mod mine;
pub mod select;

mod codec;
