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

#![allow(dead_code)]

use std::collections::HashMap;
use std::hash::Hash;

use rand::Rng;
use rand::SeedableRng;
use rand::rngs::StdRng;

/// Draws keys in `[0, key_space)` where key `i` has weight `1 / (i + 1)^exponent`.
pub struct Zipf {
    cdf: Vec<f64>,
    rng: StdRng,
}

impl Zipf {
    pub fn new(key_space: usize, exponent: f64, seed: u64) -> Self {
        let mut cdf = Vec::with_capacity(key_space);
        let mut total = 0.0;
        for rank in 1..=key_space {
            total += 1.0 / (rank as f64).powf(exponent);
            cdf.push(total);
        }
        for value in &mut cdf {
            *value /= total;
        }
        Self {
            cdf,
            rng: StdRng::seed_from_u64(seed),
        }
    }

    pub fn next_key(&mut self) -> u64 {
        let u: f64 = self.rng.random();
        let idx = self.cdf.partition_point(|&p| p < u);
        idx.min(self.cdf.len() - 1) as u64
    }

    pub fn take(&mut self, n: usize) -> Vec<u64> {
        (0..n).map(|_| self.next_key()).collect()
    }
}

/// Exact per-item totals to check sketches against.
#[derive(Debug, Default)]
pub struct ExactCounter<T> {
    totals: HashMap<T, f64>,
}

impl<T: Clone + Eq + Hash + Ord> ExactCounter<T> {
    pub fn new() -> Self {
        Self {
            totals: HashMap::new(),
        }
    }

    pub fn add(&mut self, item: T, delta: f64) {
        *self.totals.entry(item).or_insert(0.0) += delta;
    }

    pub fn get(&self, item: &T) -> f64 {
        self.totals.get(item).copied().unwrap_or(0.0)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&T, f64)> {
        self.totals.iter().map(|(item, total)| (item, *total))
    }

    /// The `k` heaviest items, by total descending and then by item.
    pub fn top_k(&self, k: usize) -> Vec<(T, f64)> {
        let mut rows: Vec<(T, f64)> = self
            .totals
            .iter()
            .map(|(item, total)| (item.clone(), *total))
            .collect();
        rows.sort_by(|a, b| b.1.total_cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
        rows.truncate(k);
        rows
    }
}
