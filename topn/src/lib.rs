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

//! Bounded-memory Top-N summaries of weighted streams.
//!
//! This crate provides the Space-Saving sketch, a signed variant tracking positive and
//! negative weights separately, a quickselect based order statistic selector, and a
//! compact binary encoding for sketches.

pub mod error;
pub mod select;
pub mod spacesaving;

mod codec;
mod common;

pub use self::spacesaving::Counter;
pub use self::spacesaving::SignedSketch;
pub use self::spacesaving::SignedTopK;
pub use self::spacesaving::SketchItem;
pub use self::spacesaving::SpaceSavingSketch;
pub use self::spacesaving::TopNAggregator;
