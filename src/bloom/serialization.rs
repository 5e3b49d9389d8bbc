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

use std::fs;
use std::path::Path;

use crate::codec::{ArtifactBytes, ArtifactSlice, FIELD_WIDTH};
use crate::error::{Error, ErrorKind};

use super::CountingBloomFilter;

impl CountingBloomFilter {
    /// Serializes the filter to its binary form.
    ///
    /// Layout, big-endian with fixed 8-byte header fields: base (f64 bits),
    /// log base (f64 bits), insert count (u32 in the field's leading 4
    /// bytes), the reserved divisor (zigzag varint field), seed count (u32
    /// field), one varint field per seed, counter length (u32 field), then
    /// the raw counter bytes.
    pub fn serialize(&self) -> Vec<u8> {
        let mut bytes =
            ArtifactBytes::with_capacity(FIELD_WIDTH * (6 + self.seeds.len()) + self.counters.len());

        bytes.write_f64_be(self.base);
        bytes.write_f64_be(self.log_base);
        bytes.write_u32_field(self.inserted);
        bytes.write_varint_field(self.divisor);
        bytes.write_u32_field(self.seeds.len() as u32);
        for &seed in &self.seeds {
            bytes.write_varint_field(i64::from(seed));
        }
        bytes.write_u32_field(self.counters.len() as u32);
        bytes.write(&self.counters);

        bytes.into_bytes()
    }

    /// Deserializes a filter from its binary form.
    ///
    /// # Errors
    ///
    /// [`ErrorKind::MalformedDeserializeData`] when the input is truncated,
    /// a varint field is unterminated, or a seed falls outside the i32
    /// range.
    pub fn deserialize(bytes: &[u8]) -> Result<Self, Error> {
        let mut slice = ArtifactSlice::new(bytes);

        let base = slice
            .read_f64_be()
            .map_err(|_| Error::insufficient_data("base"))?;
        let log_base = slice
            .read_f64_be()
            .map_err(|_| Error::insufficient_data("log_base"))?;
        let inserted = slice
            .read_u32_field()
            .map_err(|_| Error::insufficient_data("inserted"))?;
        let divisor = slice
            .read_varint_field()
            .map_err(|_| Error::insufficient_data("divisor"))?;

        let seed_count = slice
            .read_u32_field()
            .map_err(|_| Error::insufficient_data("seed_count"))?;
        if (seed_count as usize) * FIELD_WIDTH > slice.remaining() {
            return Err(Error::insufficient_data("seeds"));
        }
        let mut seeds = Vec::with_capacity(seed_count as usize);
        for _ in 0..seed_count {
            let value = slice
                .read_varint_field()
                .map_err(|_| Error::insufficient_data("seed"))?;
            let seed = i32::try_from(value).map_err(|_| {
                Error::new(ErrorKind::MalformedDeserializeData, "hash seed exceeds 32 bits")
                    .with_context("seed", value)
            })?;
            seeds.push(seed);
        }

        let counter_len = slice
            .read_u32_field()
            .map_err(|_| Error::insufficient_data("counter_length"))?;
        if counter_len == 0 {
            return Err(Error::new(
                ErrorKind::MalformedDeserializeData,
                "filter has no counter slots",
            ));
        }
        if (counter_len as usize) > slice.remaining() {
            return Err(Error::insufficient_data("counters"));
        }
        let mut counters = vec![0u8; counter_len as usize];
        slice
            .read_exact(&mut counters)
            .map_err(|_| Error::insufficient_data("counters"))?;

        Ok(CountingBloomFilter {
            base,
            log_base,
            inserted,
            divisor,
            seeds,
            counters,
        })
    }

    /// Writes the filter to `path`, replacing any existing file.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), Error> {
        let path = path.as_ref();
        fs::write(path, self.serialize())
            .map_err(|err| Error::io("unable to write filter", err).with_context("path", path.display()))
    }

    /// Reads a filter from `path`.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, Error> {
        let path = path.as_ref();
        let bytes = fs::read(path)
            .map_err(|err| Error::io("unable to read filter", err).with_context("path", path.display()))?;
        Self::deserialize(&bytes)
    }
}
