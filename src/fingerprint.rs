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

//! Window fingerprinting strategies for the approximate mining path.
//!
//! A fingerprint maps a window's bytes to an unsigned integer used to index
//! the fixed-size counter array. Two interchangeable strategies exist; the
//! orchestration and top-K logic never depend on which one is configured,
//! only that pass 1 and pass 2 of a run use the same one.

/// Degree-10 polynomial constant for the rolling checksum.
const POLY: u64 = 1_101_100_001;

/// Fixed seed for the murmur strategy.
const MURMUR_SEED: u32 = 0;

/// Maps a window's bytes to a fingerprint.
///
/// Implementations must be pure: the same bytes always produce the same
/// fingerprint, with no state carried between windows.
pub trait WindowFingerprinter: Send + Sync {
    /// Computes the fingerprint of `window`.
    fn fingerprint(&self, window: &[u8]) -> u32;
}

/// Rolling polynomial checksum over the window bytes.
#[derive(Debug, Clone, Copy, Default)]
pub struct PolynomialFingerprinter;

impl WindowFingerprinter for PolynomialFingerprinter {
    fn fingerprint(&self, window: &[u8]) -> u32 {
        let mut acc: u64 = 0;
        for &byte in window {
            acc = acc.wrapping_mul(POLY).wrapping_add(u64::from(byte));
        }
        (acc ^ (acc >> 32)) as u32
    }
}

/// Murmur3 x86 32-bit checksum of the window bytes.
#[derive(Debug, Clone, Copy, Default)]
pub struct MurmurFingerprinter;

impl WindowFingerprinter for MurmurFingerprinter {
    fn fingerprint(&self, window: &[u8]) -> u32 {
        mur3::murmurhash3_x86_32(window, MURMUR_SEED)
    }
}

/// Configuration-time choice of fingerprinting strategy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FingerprintScheme {
    /// Rolling polynomial checksum.
    #[default]
    Polynomial,
    /// Murmur3 32-bit checksum.
    Murmur,
}

impl FingerprintScheme {
    /// Instantiates the configured strategy.
    pub fn fingerprinter(self) -> Box<dyn WindowFingerprinter> {
        match self {
            FingerprintScheme::Polynomial => Box::new(PolynomialFingerprinter),
            FingerprintScheme::Murmur => Box::new(MurmurFingerprinter),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn polynomial_is_pure_and_content_sensitive() {
        let fp = PolynomialFingerprinter;
        assert_eq!(fp.fingerprint(b"abcd"), fp.fingerprint(b"abcd"));
        assert_ne!(fp.fingerprint(b"abcd"), fp.fingerprint(b"abce"));
        assert_ne!(fp.fingerprint(b"abcd"), fp.fingerprint(b"dcba"));
    }

    #[test]
    fn murmur_is_pure_and_content_sensitive() {
        let fp = MurmurFingerprinter;
        assert_eq!(fp.fingerprint(b"abcd"), fp.fingerprint(b"abcd"));
        assert_ne!(fp.fingerprint(b"abcd"), fp.fingerprint(b"abce"));
    }

    #[test]
    fn scheme_selects_strategy() {
        let window = b"\x00\x01\x02\x03";
        let poly = FingerprintScheme::Polynomial.fingerprinter();
        let murmur = FingerprintScheme::Murmur.fingerprinter();
        assert_eq!(
            poly.fingerprint(window),
            PolynomialFingerprinter.fingerprint(window)
        );
        assert_eq!(
            murmur.fingerprint(window),
            MurmurFingerprinter.fingerprint(window)
        );
    }
}
