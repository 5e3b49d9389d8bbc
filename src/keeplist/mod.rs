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

//! The keeplist artifact: an ordered set of selected top-K n-grams.
//!
//! A keeplist records the dataset it was mined from, the window and skip
//! parameters, the collection method, and the literal window bytes. The
//! binary format is big-endian throughout; see [`KeepList::encode`].
//!
//! # Usage
//!
//! ```rust
//! use bytegrams::keeplist::{CollectionMethod, KeepList};
//!
//! let list = KeepList::new(
//!     "demo",
//!     4,
//!     1,
//!     CollectionMethod::Exact,
//!     vec![b"\x00\x01\x02\x03".to_vec(), b"\xca\xfe\xba\xbe".to_vec()],
//! );
//!
//! assert_eq!(list.index_of(b"\xca\xfe\xba\xbe"), Some(1));
//! assert_eq!(list.index_of(b"\xde\xad\xbe\xef"), None);
//!
//! let decoded = KeepList::decode(&list.encode()).unwrap();
//! assert_eq!(decoded.windows(), list.windows());
//! ```

mod serialization;

use std::fmt::Write as _;

/// How the windows in a keeplist were collected.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CollectionMethod {
    /// Exact counting over literal windows.
    Exact,
    /// Approximate counting over window fingerprints with a recovery pass.
    Hashed,
    /// A method byte this implementation does not recognize.
    Unknown,
}

impl CollectionMethod {
    /// Decodes a method byte.
    pub fn from_byte(byte: u8) -> Self {
        match byte {
            0x00 => CollectionMethod::Exact,
            0x01 => CollectionMethod::Hashed,
            _ => CollectionMethod::Unknown,
        }
    }

    /// Encodes this method as its format byte.
    pub fn as_byte(self) -> u8 {
        match self {
            CollectionMethod::Exact => 0x00,
            CollectionMethod::Hashed => 0x01,
            CollectionMethod::Unknown => 0xff,
        }
    }
}

/// Persisted ordered set of top-K n-grams with mining metadata.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeepList {
    name: String,
    ngram_size: u32,
    skip_size: u32,
    declared: u32,
    method: CollectionMethod,
    windows: Vec<Vec<u8>>,
}

impl KeepList {
    /// Creates a keeplist over the given windows; the declared count is the
    /// actual window count.
    pub fn new(
        name: impl Into<String>,
        ngram_size: u32,
        skip_size: u32,
        method: CollectionMethod,
        windows: Vec<Vec<u8>>,
    ) -> Self {
        let declared = windows.len() as u32;
        Self {
            name: name.into(),
            ngram_size,
            skip_size,
            declared,
            method,
            windows,
        }
    }

    /// Returns the dataset label.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the window size in bytes.
    pub fn ngram_size(&self) -> u32 {
        self.ngram_size
    }

    /// Returns the skip-gram factor the windows were mined with.
    pub fn skip_size(&self) -> u32 {
        self.skip_size
    }

    /// Returns the window count the header declared.
    ///
    /// May exceed [`len`](Self::len) for a keeplist read from a truncated
    /// file; readers must treat the stored windows as authoritative.
    pub fn declared_count(&self) -> u32 {
        self.declared
    }

    /// Returns the collection method.
    pub fn method(&self) -> CollectionMethod {
        self.method
    }

    /// Returns the stored windows in order.
    pub fn windows(&self) -> &[Vec<u8>] {
        &self.windows
    }

    /// Returns the number of stored windows.
    pub fn len(&self) -> usize {
        self.windows.len()
    }

    /// Returns true if no windows are stored.
    pub fn is_empty(&self) -> bool {
        self.windows.is_empty()
    }

    /// Returns the position of `window` in the list, if present.
    ///
    /// Feature-vector builders use the returned index as the feature id.
    pub fn index_of(&self, window: &[u8]) -> Option<usize> {
        self.windows.iter().position(|gram| gram == window)
    }

    /// Renders a human-readable report of the list's metadata.
    pub fn summary(&self) -> String {
        let mut out = String::new();
        let _ = writeln!(out, "Dataset name: {}", self.name);
        let _ = writeln!(out, "Ngram size: {}", self.ngram_size);
        let _ = writeln!(out, "Skip size: {}", self.skip_size);
        let _ = writeln!(out, "Declared ngrams: {}", self.declared);
        let _ = writeln!(out, "Stored ngrams: {}", self.windows.len());
        let method = match self.method {
            CollectionMethod::Exact => "exact counting",
            CollectionMethod::Hashed => "hashed counting",
            CollectionMethod::Unknown => "unknown",
        };
        let _ = writeln!(out, "Collection method: {method}");
        out
    }

    /// Returns the percentage of windows shared with `other`, measured
    /// against the smaller list, or `None` when the ngram sizes differ.
    pub fn similarity(&self, other: &KeepList) -> Option<f64> {
        if self.ngram_size != other.ngram_size {
            return None;
        }
        let smaller = self.windows.len().min(other.windows.len());
        if smaller == 0 {
            return Some(0.0);
        }
        let shared = self
            .windows
            .iter()
            .filter(|gram| other.index_of(gram).is_some())
            .count();
        Some(shared as f64 / smaller as f64 * 100.0)
    }
}
