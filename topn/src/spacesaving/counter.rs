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

/// A tracked item with its estimated weight and the most that estimate may overstate.
///
/// For streams with non-negative weights, `error <= count` and the item's true
/// accumulated weight lies in `[count - error, count]`.
#[derive(Debug, Clone, PartialEq)]
pub struct Counter<T> {
    pub(super) item: T,
    pub(super) count: f64,
    pub(super) error: f64,
}

impl<T> Counter<T> {
    pub(super) fn new(item: T, count: f64, error: f64) -> Self {
        Self { item, count, error }
    }

    /// Returns the item value.
    pub fn item(&self) -> &T {
        &self.item
    }

    /// Returns the estimated accumulated weight.
    pub fn count(&self) -> f64 {
        self.count
    }

    /// Returns the maximum overstatement of [`count`](Self::count).
    pub fn error(&self) -> f64 {
        self.error
    }

    /// Returns the guaranteed part of the weight, `count - error`.
    pub fn lower_bound(&self) -> f64 {
        self.count - self.error
    }

    /// Consumes the counter and returns the item.
    pub fn into_item(self) -> T {
        self.item
    }
}

impl<T> From<Counter<T>> for (T, f64, f64) {
    fn from(counter: Counter<T>) -> Self {
        (counter.item, counter.count, counter.error)
    }
}
