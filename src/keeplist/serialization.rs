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

use crate::codec::{ArtifactBytes, ArtifactSlice};
use crate::error::{Error, ErrorKind};
use crate::keeplist::{CollectionMethod, KeepList};

/// Magic bytes identifying a keeplist file.
pub(super) const MAGIC: [u8; 8] = [0x47, 0x4f, 0x5f, 0x47, 0x72, 0x61, 0x6d, 0x73];

impl KeepList {
    /// Encodes the keeplist to its binary form.
    ///
    /// Layout, big-endian throughout: 8 magic bytes, u32 name length, the
    /// name bytes, u32 ngram size, u32 skip size, u32 window count, one
    /// method byte, then `count * ngram_size` window bytes.
    pub fn encode(&self) -> Vec<u8> {
        let window_bytes = self.windows().len() * self.ngram_size() as usize;
        let mut bytes = ArtifactBytes::with_capacity(
            MAGIC.len() + 4 + self.name().len() + 4 + 4 + 4 + 1 + window_bytes,
        );

        bytes.write(&MAGIC);
        bytes.write_u32_be(self.name().len() as u32);
        bytes.write(self.name().as_bytes());
        bytes.write_u32_be(self.ngram_size());
        bytes.write_u32_be(self.skip_size());
        bytes.write_u32_be(self.windows().len() as u32);
        bytes.write_u8(self.method().as_byte());
        for window in self.windows() {
            bytes.write(window);
        }
        bytes.into_bytes()
    }

    /// Decodes a keeplist from its binary form.
    ///
    /// A declared window count larger than the bytes actually present is
    /// not an error: decoding stops at end of input and yields the shorter
    /// list, with the declared count preserved as read. A trailing partial
    /// window is ignored.
    pub fn decode(bytes: &[u8]) -> Result<Self, Error> {
        let mut slice = ArtifactSlice::new(bytes);

        let mut magic = [0u8; 8];
        slice
            .read_exact(&mut magic)
            .map_err(|_| Error::insufficient_data("magic"))?;
        if magic != MAGIC {
            return Err(Error::new(
                ErrorKind::MalformedDeserializeData,
                "input is not a keeplist",
            ));
        }

        let name_len = slice
            .read_u32_be()
            .map_err(|_| Error::insufficient_data("name_length"))?;
        if name_len as usize > slice.remaining() {
            return Err(Error::insufficient_data("name"));
        }
        let mut name_bytes = vec![0u8; name_len as usize];
        slice
            .read_exact(&mut name_bytes)
            .map_err(|_| Error::insufficient_data("name"))?;
        let name = String::from_utf8(name_bytes).map_err(|err| {
            Error::new(ErrorKind::MalformedDeserializeData, "dataset name is not UTF-8")
                .set_source(err)
        })?;

        let ngram_size = slice
            .read_u32_be()
            .map_err(|_| Error::insufficient_data("ngram_size"))?;
        let skip_size = slice
            .read_u32_be()
            .map_err(|_| Error::insufficient_data("skip_size"))?;
        let declared = slice
            .read_u32_be()
            .map_err(|_| Error::insufficient_data("ngram_count"))?;
        let method_byte = slice
            .read_u8()
            .map_err(|_| Error::insufficient_data("method"))?;
        let method = CollectionMethod::from_byte(method_byte);

        if ngram_size == 0 && declared > 0 {
            return Err(Error::new(
                ErrorKind::MalformedDeserializeData,
                "declared windows with zero ngram size",
            ));
        }

        let mut windows = Vec::with_capacity(declared.min(1 << 20) as usize);
        for _ in 0..declared {
            if slice.remaining() < ngram_size as usize {
                break;
            }
            let mut window = vec![0u8; ngram_size as usize];
            slice
                .read_exact(&mut window)
                .map_err(|_| Error::insufficient_data("window"))?;
            windows.push(window);
        }

        let mut list = KeepList::new(name, ngram_size, skip_size, method, windows);
        list.declared = declared;
        Ok(list)
    }

    /// Writes the keeplist to `path`.
    ///
    /// Refuses to overwrite: an existing path is a configuration error.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), Error> {
        let path = path.as_ref();
        if path.exists() {
            return Err(
                Error::new(ErrorKind::ConfigInvalid, "output file already exists")
                    .with_context("path", path.display()),
            );
        }
        fs::write(path, self.encode())
            .map_err(|err| Error::io("unable to write keeplist", err).with_context("path", path.display()))
    }

    /// Reads a keeplist from `path`.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, Error> {
        let path = path.as_ref();
        let bytes = fs::read(path)
            .map_err(|err| Error::io("unable to read keeplist", err).with_context("path", path.display()))?;
        Self::decode(&bytes)
    }
}
