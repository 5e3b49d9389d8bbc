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

//! The mining orchestrator: corpus in, top-K windows out.
//!
//! A run partitions the file list into contiguous per-worker chunks and
//! slides a fixed-width window over every file. The exact path counts
//! literal windows in a [`FrequencyTable`](crate::freq::FrequencyTable);
//! the hashed path counts window fingerprints in a
//! [`CountSketch`](crate::freq::CountSketch) and runs a second,
//! barrier-separated pass to recover the literal bytes of the winning
//! buckets, because pass 1 keeps only aggregate counts.
//!
//! # Usage
//!
//! ```rust,no_run
//! use bytegrams::corpus::{collect_files, FsContentSource};
//! use bytegrams::mine::{CancelToken, MineConfig, Miner, MiningMethod};
//!
//! let config = MineConfig {
//!     ngram_size: 6,
//!     keep: 1000,
//!     threads: 8,
//!     method: MiningMethod::Exact,
//!     name: "goodware".to_string(),
//! };
//! let miner = Miner::new(config, FsContentSource).unwrap();
//!
//! let files = collect_files(&["samples/goodware"]);
//! let keeplist = miner.mine_keeplist(&files, &CancelToken::new()).unwrap();
//! keeplist.save("goodware.grams").unwrap();
//! ```

mod miner;

pub use self::miner::Miner;

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use crate::error::{Error, ErrorKind};
use crate::fingerprint::FingerprintScheme;
use crate::freq::MAX_SKETCH_LEN;

/// Default counter-array length for the hashed path.
pub const DEFAULT_SKETCH_LEN: u32 = 1 << 26;

/// How windows are counted during pass 1.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MiningMethod {
    /// Count literal windows exactly; memory grows with distinct windows.
    Exact,
    /// Count window fingerprints in a fixed-size sketch, then recover the
    /// literal bytes in a second pass; memory stays fixed.
    Hashed {
        /// Skip-gram sub-sampling factor; 0 or 1 counts every window.
        skip: u32,
        /// Counter-array length.
        sketch_len: u32,
        /// Fingerprinting strategy, identical across both passes.
        scheme: FingerprintScheme,
    },
}

impl MiningMethod {
    /// Default hashed configuration: no sub-sampling, default sketch size,
    /// polynomial fingerprints.
    pub fn hashed() -> Self {
        MiningMethod::Hashed {
            skip: 1,
            sketch_len: DEFAULT_SKETCH_LEN,
            scheme: FingerprintScheme::Polynomial,
        }
    }
}

/// Parameters for one mining run.
#[derive(Debug, Clone)]
pub struct MineConfig {
    /// Window width in bytes (the N in n-gram).
    pub ngram_size: u32,
    /// Number of top windows to keep.
    pub keep: usize,
    /// Worker count for both passes.
    pub threads: usize,
    /// Counting strategy.
    pub method: MiningMethod,
    /// Dataset label recorded in the produced keeplist.
    pub name: String,
}

impl Default for MineConfig {
    fn default() -> Self {
        Self {
            ngram_size: 6,
            keep: 1000,
            threads: std::thread::available_parallelism()
                .map(|n| n.get())
                .unwrap_or(1),
            method: MiningMethod::Exact,
            name: "unnamed".to_string(),
        }
    }
}

impl MineConfig {
    /// Checks the run parameters; failures are fatal before any mining
    /// work begins.
    pub fn validate(&self) -> Result<(), Error> {
        if self.ngram_size < 2 {
            return Err(
                Error::new(ErrorKind::ConfigInvalid, "ngram size below two makes no sense")
                    .with_context("ngram_size", self.ngram_size),
            );
        }
        if self.keep < 2 {
            return Err(
                Error::new(ErrorKind::ConfigInvalid, "keep count below two makes no sense")
                    .with_context("keep", self.keep),
            );
        }
        if self.threads < 1 {
            return Err(Error::new(
                ErrorKind::ConfigInvalid,
                "at least one worker is required",
            ));
        }
        if let MiningMethod::Hashed {
            skip, sketch_len, ..
        } = self.method
        {
            if sketch_len == 0 || sketch_len > MAX_SKETCH_LEN {
                return Err(
                    Error::new(ErrorKind::ConfigInvalid, "sketch length out of range")
                        .with_context("sketch_len", sketch_len),
                );
            }
            if skip > 1 && self.ngram_size < 4 {
                return Err(Error::new(
                    ErrorKind::ConfigInvalid,
                    "skip-grams read the window's first 4 bytes; ngram size must be at least 4",
                )
                .with_context("ngram_size", self.ngram_size)
                .with_context("skip", skip));
            }
        }
        Ok(())
    }
}

/// Cooperative cancellation signal checked at file boundaries.
///
/// Cancelling does not abort mid-file: workers drain cleanly, and the
/// partial counts merged so far remain valid, just incomplete.
#[derive(Debug, Clone, Default)]
pub struct CancelToken {
    flag: Arc<AtomicBool>,
}

impl CancelToken {
    /// Creates a token in the not-cancelled state.
    pub fn new() -> Self {
        Self::default()
    }

    /// Requests cancellation.
    pub fn cancel(&self) {
        self.flag.store(true, Ordering::Relaxed);
    }

    /// Returns true once cancellation has been requested.
    pub fn is_cancelled(&self) -> bool {
        self.flag.load(Ordering::Relaxed)
    }
}
