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

use bytegrams::error::ErrorKind;
use bytegrams::keeplist::{CollectionMethod, KeepList};
use googletest::assert_that;
use googletest::prelude::contains_substring;

fn sample_list() -> KeepList {
    KeepList::new(
        "integration",
        4,
        2,
        CollectionMethod::Hashed,
        vec![
            b"\xde\xad\xbe\xef".to_vec(),
            b"\xca\xfe\xba\xbe".to_vec(),
            b"\x00\x11\x22\x33".to_vec(),
        ],
    )
}

#[test]
fn round_trip_preserves_metadata_and_windows() {
    let original = sample_list();
    let decoded = KeepList::decode(&original.encode()).unwrap();

    assert_eq!(decoded.name(), "integration");
    assert_eq!(decoded.ngram_size(), 4);
    assert_eq!(decoded.skip_size(), 2);
    assert_eq!(decoded.method(), CollectionMethod::Hashed);
    assert_eq!(decoded.windows(), original.windows());

    assert_eq!(decoded.index_of(b"\xde\xad\xbe\xef"), Some(0));
    assert_eq!(decoded.index_of(b"\x00\x11\x22\x33"), Some(2));
    assert_eq!(decoded.index_of(b"\x99\x99\x99\x99"), None);
}

#[test]
fn under_declared_files_decode_without_error() {
    // A header declaring more windows than the file stores must decode to
    // the shorter list, not a format error.
    let mut bytes = sample_list().encode();
    bytes.truncate(bytes.len() - 8);

    let list = KeepList::decode(&bytes).unwrap();
    assert_eq!(list.declared_count(), 3);
    assert_eq!(list.len(), 1);
    assert_eq!(list.windows()[0], b"\xde\xad\xbe\xef");
}

#[test]
fn non_keeplist_input_is_a_format_error() {
    let err = KeepList::decode(b"definitely not a keeplist").unwrap_err();
    assert_eq!(err.kind(), ErrorKind::MalformedDeserializeData);
    assert_that!(err.message(), contains_substring("not a keeplist"));
}

#[test]
fn save_load_round_trip_and_overwrite_refusal() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("integration.grams");
    let original = sample_list();

    original.save(&path).unwrap();
    let loaded = KeepList::load(&path).unwrap();
    assert_eq!(loaded, original);

    let err = original.save(&path).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::ConfigInvalid);
}

#[test]
fn similarity_reports_overlap_between_lists() {
    let a = sample_list();
    let b = KeepList::new(
        "other",
        4,
        1,
        CollectionMethod::Exact,
        vec![b"\xca\xfe\xba\xbe".to_vec(), b"\x44\x55\x66\x77".to_vec()],
    );

    // One of the smaller list's two windows is shared.
    assert_eq!(a.similarity(&b), Some(50.0));
    // Lists with different window sizes are incomparable.
    let c = KeepList::new("six", 6, 1, CollectionMethod::Exact, vec![]);
    assert_eq!(a.similarity(&c), None);
}

#[test]
fn summary_names_the_collection_method() {
    let report = sample_list().summary();
    assert!(report.contains("hashed counting"));
    assert!(report.contains("Declared ngrams: 3"));
}
