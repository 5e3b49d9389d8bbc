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

//! Hash primitives shared by the counting Bloom filter.

/// 64-bit avalanche mixer used to derive counter slots from a seeded digest.
///
/// The exact constant chain is part of the persisted-filter contract: slot
/// placement must match across runs and implementations reading the same
/// artifact, so this function must not change.
pub fn mix64(mut key: u64) -> u64 {
    key = (1 ^ key).wrapping_add(key << 18);
    key ^= key >> 31;
    key = key.wrapping_mul(21);
    key ^= key >> 11;
    key = key.wrapping_add(key << 6);
    key ^= key >> 22;
    key
}

/// 64-bit content digest of an item's canonical byte form.
pub fn content_digest(bytes: &[u8]) -> u64 {
    let (h1, _) = mur3::murmurhash3_x64_128(bytes, 0);
    h1
}
