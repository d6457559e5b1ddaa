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

//! Wire layout constants for Space-Saving sketches.
//!
//! ```text
//! capacity: u32 | entry_count: u32 | entry_count x { item_len: u32, item: [u8; item_len], count: f64, error: f64 }
//! ```
//!
//! All values are little-endian. A signed sketch is its positive half followed by
//! its negative half, with no header of its own.

/// Bytes of the `capacity` and `entry_count` header.
pub(super) const HEADER_BYTES: usize = 8;
/// Bytes of one entry besides the item payload: length prefix, count and error.
pub(super) const ENTRY_FIXED_BYTES: usize = 4 + 8 + 8;
