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

//! Frequency accounting for mined windows.
//!
//! Two structures back the two mining paths: [`FrequencyTable`] keeps exact
//! counts keyed by literal window bytes, [`CountSketch`] keeps approximate
//! counts in a fixed-size array indexed by a window fingerprint. Both are
//! updated from many workers under one coarse lock apiece; all updates are
//! commutative, so final counts do not depend on worker scheduling.

mod sketch;
mod table;

pub use self::sketch::CountSketch;
pub use self::sketch::MAX_SKETCH_LEN;
pub use self::table::FrequencyTable;
