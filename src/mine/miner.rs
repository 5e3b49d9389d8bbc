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

use std::collections::HashSet;
use std::path::PathBuf;
use std::sync::Mutex;
use std::thread;

use tracing::{debug, info, warn};

use crate::bloom::CountingBloomFilter;
use crate::corpus::ContentSource;
use crate::error::{Error, ErrorKind};
use crate::fingerprint::FingerprintScheme;
use crate::freq::{CountSketch, FrequencyTable};
use crate::keeplist::{CollectionMethod, KeepList};
use crate::select::{retain_majority, select_top_k};

use super::{CancelToken, MineConfig, MiningMethod};

/// Windows recovered by pass 2, deduplicated by exact byte content while
/// preserving first-seen order.
#[derive(Default)]
struct RecoveredSet {
    seen: HashSet<Vec<u8>>,
    ordered: Vec<Vec<u8>>,
}

impl RecoveredSet {
    fn insert(&mut self, window: &[u8]) {
        if !self.seen.contains(window) {
            self.seen.insert(window.to_vec());
            self.ordered.push(window.to_vec());
        }
    }
}

/// Drives mining runs against a corpus.
///
/// One miner holds a validated configuration and a content source; each
/// `mine*` call is an independent batch run over the file list it is given.
pub struct Miner<S> {
    config: MineConfig,
    source: S,
}

impl<S: ContentSource> Miner<S> {
    /// Creates a miner after validating the configuration.
    pub fn new(config: MineConfig, source: S) -> Result<Self, Error> {
        config.validate()?;
        Ok(Self { config, source })
    }

    /// Returns the run configuration.
    pub fn config(&self) -> &MineConfig {
        &self.config
    }

    /// Mines `files` and returns the top-K literal windows, best first on
    /// the exact path.
    ///
    /// Unreadable files are logged and skipped. Fewer than K qualifying
    /// windows is a warning, not an error; the shorter result is returned.
    pub fn mine(&self, files: &[PathBuf], cancel: &CancelToken) -> Result<Vec<Vec<u8>>, Error> {
        if files.is_empty() {
            warn!("no files to mine");
            return Ok(Vec::new());
        }

        let windows = match self.config.method {
            MiningMethod::Exact => self.mine_exact(files, cancel),
            MiningMethod::Hashed {
                skip,
                sketch_len,
                scheme,
            } => self.mine_hashed(files, skip, sketch_len, scheme, cancel)?,
        };

        if cancel.is_cancelled() {
            warn!("run was cancelled; results cover only the files scanned so far");
        }
        if windows.len() < self.config.keep {
            warn!(
                found = windows.len(),
                requested = self.config.keep,
                "found fewer qualifying ngrams than requested"
            );
        }
        Ok(windows)
    }

    /// Mines `files` into a keeplist carrying this run's metadata.
    pub fn mine_keeplist(&self, files: &[PathBuf], cancel: &CancelToken) -> Result<KeepList, Error> {
        let windows = self.mine(files, cancel)?;
        let (method, skip) = match self.config.method {
            MiningMethod::Exact => (CollectionMethod::Exact, 1),
            MiningMethod::Hashed { skip, .. } => (CollectionMethod::Hashed, skip.max(1)),
        };
        Ok(KeepList::new(
            self.config.name.clone(),
            self.config.ngram_size,
            skip,
            method,
            windows,
        ))
    }

    /// Mines `files` on the hashed path and stores every surviving window
    /// in `filter` with a raw count of 1.
    pub fn mine_to_filter(
        &self,
        files: &[PathBuf],
        filter: &mut CountingBloomFilter,
        cancel: &CancelToken,
    ) -> Result<(), Error> {
        if matches!(self.config.method, MiningMethod::Exact) {
            return Err(Error::new(
                ErrorKind::ConfigInvalid,
                "filter population requires the hashed mining method",
            ));
        }
        let windows = self.mine(files, cancel)?;
        for window in &windows {
            filter.put(window.as_slice(), 1)?;
        }
        info!(stored = windows.len(), "populated counting bloom filter");
        Ok(())
    }

    /// Single-pass exact mining: count literal windows, then drain-sort.
    fn mine_exact(&self, files: &[PathBuf], cancel: &CancelToken) -> Vec<Vec<u8>> {
        info!(files = files.len(), "starting exact ngramming pass");
        let table = FrequencyTable::new();

        self.fan_out(files, cancel, &|chunk, cancel| {
            self.count_chunk_exact(chunk, &table, cancel);
        });

        if table.is_empty() {
            warn!("no windows were counted; corpus may be unreadable or too small");
        }

        let mut entries = table.drain_sorted_desc();
        entries.truncate(self.config.keep);
        entries.into_iter().map(|(window, _)| window).collect()
    }

    /// Two-pass hashed mining: sketch fingerprints, select surviving
    /// buckets, then rescan to recover literal bytes.
    fn mine_hashed(
        &self,
        files: &[PathBuf],
        skip: u32,
        sketch_len: u32,
        scheme: FingerprintScheme,
        cancel: &CancelToken,
    ) -> Result<Vec<Vec<u8>>, Error> {
        info!(files = files.len(), sketch_len, "starting hashed ngramming pass");
        let sketch = CountSketch::new(sketch_len, scheme, skip)?;

        // Pass 1. The scope join is the hard barrier: selection must not
        // read the sketch while any worker can still write it.
        self.fan_out(files, cancel, &|chunk, cancel| {
            self.count_chunk_hashed(chunk, &sketch, cancel);
        });

        let counts = sketch.drain_counts();
        let mut entries: Vec<(u32, u64)> = counts
            .into_iter()
            .enumerate()
            .filter(|&(_, count)| count > 0)
            .map(|(bucket, count)| (bucket as u32, u64::from(count)))
            .collect();

        retain_majority(&mut entries, files.len());
        select_top_k(&mut entries, self.config.keep);
        let surviving: HashSet<u32> = entries.into_iter().map(|(bucket, _)| bucket).collect();
        debug!(buckets = surviving.len(), "selected surviving buckets");
        if surviving.is_empty() {
            return Ok(Vec::new());
        }

        // Pass 2: recover the literal bytes behind the surviving buckets.
        info!("starting recovery pass for surviving buckets");
        let recovered = Mutex::new(RecoveredSet::default());
        self.fan_out(files, cancel, &|chunk, cancel| {
            self.recover_chunk(chunk, &sketch, &surviving, &recovered, cancel);
        });

        let mut windows = recovered
            .into_inner()
            .expect("recovered set lock poisoned")
            .ordered;
        // Colliding windows can outnumber the surviving buckets.
        windows.truncate(self.config.keep);
        Ok(windows)
    }

    /// Splits `files` into contiguous chunks and runs `work` over them on
    /// scoped workers, degrading to in-place execution when there is not
    /// enough work to split. Returns only after every worker finished.
    fn fan_out(
        &self,
        files: &[PathBuf],
        cancel: &CancelToken,
        work: &(dyn Fn(&[PathBuf], &CancelToken) + Sync),
    ) {
        let chunk_size = files.len().div_ceil(self.config.threads);
        if self.config.threads < 2 || files.len() <= chunk_size {
            work(files, cancel);
            return;
        }

        thread::scope(|scope| {
            for chunk in files.chunks(chunk_size) {
                scope.spawn(move || work(chunk, cancel));
            }
        });
    }

    fn count_chunk_exact(&self, files: &[PathBuf], table: &FrequencyTable, cancel: &CancelToken) {
        let size = self.config.ngram_size as usize;
        for path in files {
            if cancel.is_cancelled() {
                warn!("mining cancelled; worker draining");
                return;
            }
            let content = match self.source.read(path) {
                Ok(content) => content,
                Err(err) => {
                    warn!(path = %path.display(), %err, "unable to read file, skipping");
                    continue;
                }
            };
            for window in content.windows(size) {
                table.increment(window);
            }
        }
    }

    fn count_chunk_hashed(&self, files: &[PathBuf], sketch: &CountSketch, cancel: &CancelToken) {
        let size = self.config.ngram_size as usize;
        for path in files {
            if cancel.is_cancelled() {
                warn!("mining cancelled; worker draining");
                return;
            }
            let content = match self.source.read(path) {
                Ok(content) => content,
                Err(err) => {
                    warn!(path = %path.display(), %err, "unable to read file, skipping");
                    continue;
                }
            };
            for window in content.windows(size) {
                sketch.accumulate(window);
            }
        }
    }

    fn recover_chunk(
        &self,
        files: &[PathBuf],
        sketch: &CountSketch,
        surviving: &HashSet<u32>,
        recovered: &Mutex<RecoveredSet>,
        cancel: &CancelToken,
    ) {
        let size = self.config.ngram_size as usize;
        for path in files {
            if cancel.is_cancelled() {
                warn!("recovery cancelled; worker draining");
                return;
            }
            let content = match self.source.read(path) {
                Ok(content) => content,
                Err(err) => {
                    warn!(path = %path.display(), %err, "unable to read file, skipping");
                    continue;
                }
            };
            for window in content.windows(size) {
                if surviving.contains(&sketch.bucket_of(window)) {
                    recovered
                        .lock()
                        .expect("recovered set lock poisoned")
                        .insert(window);
                }
            }
        }
    }
}
