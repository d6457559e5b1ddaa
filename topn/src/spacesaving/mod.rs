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

//! Space-Saving sketches for the heaviest items of weighted streams.
//!
//! A [`SpaceSavingSketch`] keeps at most `capacity` counters. An unseen item arriving
//! at a full sketch replaces the counter with the smallest count and inherits that
//! count as its error, so every reported count overstates the item's true weight by
//! at most its error. Sketches built over separate shards of a stream merge into one
//! summary of the whole stream.
//!
//! A [`SignedSketch`] tracks positive and negative weights in two independent halves.
//! [`TopNAggregator`] folds many partial summaries through a larger accumulator.
//!
//! # Usage
//!
//! ```rust
//! # use topn::spacesaving::SpaceSavingSketch;
//! let mut sketch = SpaceSavingSketch::new(2).unwrap();
//! sketch.offer("a".to_string(), 3.0).unwrap();
//! sketch.offer("b".to_string(), 1.0).unwrap();
//! sketch.offer("c".to_string(), 2.0).unwrap();
//!
//! // "c" evicted "b" and inherited its count as error.
//! let top = sketch.top_k(2);
//! assert_eq!(top[0].item(), "a");
//! assert_eq!(top[1].item(), "c");
//! assert_eq!(top[1].count(), 3.0);
//! assert_eq!(top[1].error(), 1.0);
//! ```
//!
//! # Merging
//!
//! ```rust
//! # use topn::spacesaving::SpaceSavingSketch;
//! let mut left = SpaceSavingSketch::new(16).unwrap();
//! let mut right = SpaceSavingSketch::new(16).unwrap();
//! left.offer(7u64, 5.0).unwrap();
//! right.offer(7u64, 2.0).unwrap();
//! right.offer(9u64, 1.0).unwrap();
//!
//! left.merge(right).unwrap();
//! assert_eq!(left.estimate(&7), 7.0);
//! assert_eq!(left.len(), 2);
//! ```
//!
//! # Serialization
//!
//! ```rust
//! # use topn::spacesaving::SpaceSavingSketch;
//! let mut sketch = SpaceSavingSketch::new(64).unwrap();
//! sketch.offer(42i64, 2.5).unwrap();
//!
//! let bytes = sketch.serialize();
//! let decoded = SpaceSavingSketch::<i64>::decode(&bytes).unwrap();
//! assert_eq!(decoded, sketch);
//! ```

mod aggregator;
mod counter;
mod counter_map;
mod item;
mod serialization;
mod signed;
mod sketch;

pub use self::aggregator::TopNAggregator;
pub use self::aggregator::TopNSummary;
pub use self::counter::Counter;
pub use self::item::SketchItem;
pub use self::signed::SignedSketch;
pub use self::signed::SignedTopK;
pub use self::sketch::SpaceSavingSketch;

/// Minimum capacity of a sketch.
pub const MIN_CAPACITY: usize = 1;
/// Maximum capacity of a sketch, bounded by the `u32` capacity field on the wire.
pub const MAX_CAPACITY: usize = u32::MAX as usize;
/// Capacity used by `Default`.
pub const DEFAULT_CAPACITY: usize = 1000;
/// Counters to track per item that should be reported accurately.
pub const EXTRA_SPACE_RATE: usize = 25;
/// Default ratio between the aggregator's accumulator and its input capacity.
pub const DEFAULT_CAPACITY_FACTOR: usize = 2;
