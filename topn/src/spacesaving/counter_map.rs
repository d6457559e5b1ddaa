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

//! Counter storage for Space-Saving sketches.
//!
//! Counters live in a dense vector of slots. A slot is assigned when an item is first
//! inserted and is reused by whichever item evicts it, so slot order is stable between
//! compactions and independent of hashing. A hash index maps items to slots, and a
//! lazily cleaned min-heap finds the eviction victim in logarithmic time.

use std::cmp::Ordering;
use std::cmp::Reverse;
use std::collections::BinaryHeap;
use std::collections::HashMap;
use std::hash::Hash;

use super::counter::Counter;

/// Stale heap entries tolerated per live counter before the heap is rebuilt.
const HEAP_SLACK_FACTOR: usize = 2;
const HEAP_SLACK_MIN: usize = 64;

/// Heap key: smallest count first, lowest slot among equal counts.
#[derive(Debug, Clone, Copy)]
struct MinEntry {
    count: f64,
    slot: usize,
    version: u64,
}

impl PartialEq for MinEntry {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for MinEntry {}

impl PartialOrd for MinEntry {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for MinEntry {
    fn cmp(&self, other: &Self) -> Ordering {
        self.count
            .total_cmp(&other.count)
            .then_with(|| self.slot.cmp(&other.slot))
            .then_with(|| self.version.cmp(&other.version))
    }
}

#[derive(Debug, Clone)]
pub(super) struct CounterMap<T> {
    counters: Vec<Counter<T>>,
    // Version of the heap entry that currently describes each slot.
    versions: Vec<u64>,
    index: HashMap<T, usize>,
    min_heap: BinaryHeap<Reverse<MinEntry>>,
    next_version: u64,
}

impl<T> Default for CounterMap<T> {
    fn default() -> Self {
        Self {
            counters: Vec::new(),
            versions: Vec::new(),
            index: HashMap::new(),
            min_heap: BinaryHeap::new(),
            next_version: 0,
        }
    }
}

impl<T> PartialEq for CounterMap<T>
where
    T: PartialEq,
{
    fn eq(&self, other: &Self) -> bool {
        self.counters == other.counters
    }
}

impl<T: Eq + Hash + Clone> CounterMap<T> {
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            counters: Vec::with_capacity(capacity),
            versions: Vec::with_capacity(capacity),
            index: HashMap::with_capacity(capacity),
            min_heap: BinaryHeap::with_capacity(capacity),
            next_version: 0,
        }
    }

    /// Builds a map whose slots follow the order of `counters`. Items must be unique.
    pub fn from_counters(counters: Vec<Counter<T>>) -> Self {
        let mut map = Self::with_capacity(counters.len());
        for counter in counters {
            map.push(counter);
        }
        map
    }

    pub fn len(&self) -> usize {
        self.counters.len()
    }

    pub fn is_empty(&self) -> bool {
        self.counters.is_empty()
    }

    pub fn slot_of(&self, item: &T) -> Option<usize> {
        self.index.get(item).copied()
    }

    pub fn get(&self, item: &T) -> Option<&Counter<T>> {
        self.slot_of(item).map(|slot| &self.counters[slot])
    }

    pub fn counter(&self, slot: usize) -> &Counter<T> {
        &self.counters[slot]
    }

    /// Counters in slot order.
    pub fn iter(&self) -> std::slice::Iter<'_, Counter<T>> {
        self.counters.iter()
    }

    /// Appends a counter for an item that is not tracked yet.
    pub fn push(&mut self, counter: Counter<T>) {
        debug_assert!(!self.index.contains_key(&counter.item), "duplicate item");
        let slot = self.counters.len();
        self.index.insert(counter.item.clone(), slot);
        self.counters.push(counter);
        self.versions.push(0);
        self.touch(slot);
    }

    pub fn set_count(&mut self, slot: usize, count: f64) {
        self.counters[slot].count = count;
        self.touch(slot);
    }

    /// Puts `counter` into `slot` and returns the counter it displaced.
    pub fn replace(&mut self, slot: usize, counter: Counter<T>) -> Counter<T> {
        debug_assert!(!self.index.contains_key(&counter.item), "duplicate item");
        let evicted = std::mem::replace(&mut self.counters[slot], counter);
        self.index.remove(&evicted.item);
        self.index.insert(self.counters[slot].item.clone(), slot);
        self.touch(slot);
        evicted
    }

    /// Slot of the smallest count, the lowest slot among ties.
    pub fn min_slot(&mut self) -> Option<usize> {
        while let Some(Reverse(top)) = self.min_heap.peek() {
            let (slot, version) = (top.slot, top.version);
            if self.versions.get(slot) == Some(&version) {
                return Some(slot);
            }
            self.min_heap.pop();
        }
        None
    }

    /// Removes every counter and returns them in slot order.
    pub fn take_counters(&mut self) -> Vec<Counter<T>> {
        let counters = std::mem::take(&mut self.counters);
        self.clear();
        counters
    }

    pub fn clear(&mut self) {
        self.counters.clear();
        self.versions.clear();
        self.index.clear();
        self.min_heap.clear();
    }

    /// Splits the map into its counters and the item-to-slot index.
    pub fn into_parts(self) -> (Vec<Counter<T>>, HashMap<T, usize>) {
        (self.counters, self.index)
    }

    fn touch(&mut self, slot: usize) {
        let version = self.next_version;
        self.next_version += 1;
        self.versions[slot] = version;
        self.min_heap.push(Reverse(MinEntry {
            count: self.counters[slot].count,
            slot,
            version,
        }));

        if self.min_heap.len() > self.counters.len() * HEAP_SLACK_FACTOR + HEAP_SLACK_MIN {
            self.rebuild_heap();
        }
    }

    fn rebuild_heap(&mut self) {
        let entries: Vec<_> = self
            .counters
            .iter()
            .enumerate()
            .map(|(slot, counter)| {
                Reverse(MinEntry {
                    count: counter.count,
                    slot,
                    version: self.versions[slot],
                })
            })
            .collect();
        self.min_heap = BinaryHeap::from(entries);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn counter(item: &str, count: f64) -> Counter<String> {
        Counter::new(item.to_string(), count, 0.0)
    }

    #[test]
    fn test_min_slot_prefers_lowest_slot_on_ties() {
        let mut map = CounterMap::with_capacity(4);
        map.push(counter("a", 3.0));
        map.push(counter("b", 1.0));
        map.push(counter("c", 1.0));
        assert_eq!(map.min_slot(), Some(1));

        map.set_count(1, 5.0);
        assert_eq!(map.min_slot(), Some(2));

        let evicted = map.replace(2, counter("d", 9.0));
        assert_eq!(evicted.item(), "c");
        assert_eq!(map.slot_of(&"d".to_string()), Some(2));
        assert_eq!(map.slot_of(&"c".to_string()), None);
        assert_eq!(map.min_slot(), Some(0));
    }

    #[test]
    fn test_heap_stays_bounded() {
        let mut map = CounterMap::with_capacity(2);
        map.push(counter("a", 0.0));
        map.push(counter("b", 0.0));
        for i in 0..10_000 {
            map.set_count(i % 2, i as f64);
        }
        assert!(map.min_heap.len() <= 2 * HEAP_SLACK_FACTOR + HEAP_SLACK_MIN + 1);
        assert_eq!(map.min_slot(), Some(0));
        assert_eq!(map.counter(0).count(), 9998.0);
    }

    #[test]
    fn test_take_counters_keeps_slot_order() {
        let mut map = CounterMap::from_counters(vec![counter("x", 2.0), counter("y", 1.0)]);
        let counters = map.take_counters();
        assert!(map.is_empty());
        assert_eq!(map.min_slot(), None);
        let items: Vec<_> = counters.iter().map(|c| c.item().as_str()).collect();
        assert_eq!(items, ["x", "y"]);
    }
}
