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

use std::cmp::Ordering;

use super::DEFAULT_CAPACITY;
use super::EXTRA_SPACE_RATE;
use super::MAX_CAPACITY;
use super::MIN_CAPACITY;
use super::counter::Counter;
use super::counter_map::CounterMap;
use super::item::SketchItem;
use super::serialization::ENTRY_FIXED_BYTES;
use super::serialization::HEADER_BYTES;
use crate::codec::SketchSlice;
use crate::codec::SketchWriter;
use crate::error::Error;
use crate::select::select_nth_by;

/// Counters reserved up front by [`SpaceSavingSketch::new`]; storage grows past this on demand.
const PREALLOCATED_COUNTERS: usize = 1024;

/// Space-Saving sketch for the heaviest items of a weighted stream.
///
/// See the [spacesaving module level documentation](crate::spacesaving) for more.
#[derive(Debug, Clone, PartialEq)]
pub struct SpaceSavingSketch<T> {
    capacity: usize,
    map: CounterMap<T>,
}

impl<T: SketchItem> Default for SpaceSavingSketch<T> {
    fn default() -> Self {
        Self::make(DEFAULT_CAPACITY, CounterMap::default())
    }
}

impl<T: SketchItem> SpaceSavingSketch<T> {
    /// Creates an empty sketch that tracks at most `capacity` items.
    ///
    /// # Errors
    ///
    /// Returns [`ErrorKind::InvalidArgument`](crate::error::ErrorKind::InvalidArgument)
    /// if `capacity` is not in `[MIN_CAPACITY, MAX_CAPACITY]`.
    ///
    /// # Examples
    ///
    /// ```
    /// # use topn::spacesaving::SpaceSavingSketch;
    /// let sketch = SpaceSavingSketch::<u64>::new(100).unwrap();
    /// assert_eq!(sketch.capacity(), 100);
    /// assert!(SpaceSavingSketch::<u64>::new(0).is_err());
    /// ```
    pub fn new(capacity: usize) -> Result<Self, Error> {
        check_capacity(capacity)?;
        let reserved = capacity.min(PREALLOCATED_COUNTERS);
        Ok(Self::make(capacity, CounterMap::with_capacity(reserved)))
    }

    /// Suggests a capacity for reporting the top `top_n` items accurately.
    ///
    /// Tracks [`EXTRA_SPACE_RATE`] counters per reported item.
    pub fn capacity_for_top(top_n: usize) -> usize {
        top_n
            .saturating_mul(EXTRA_SPACE_RATE)
            .clamp(MIN_CAPACITY, MAX_CAPACITY)
    }

    /// Returns the maximum number of tracked items.
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Returns the number of tracked items.
    pub fn len(&self) -> usize {
        self.map.len()
    }

    /// Returns true if no item is tracked.
    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }

    /// Returns true if the sketch tracks `capacity` items, so the next unseen item
    /// evicts one.
    pub fn is_full(&self) -> bool {
        self.map.len() >= self.capacity
    }

    /// Returns the counter of a tracked item.
    pub fn get(&self, item: &T) -> Option<&Counter<T>> {
        self.map.get(item)
    }

    /// Returns the estimated weight of an item, 0 if it is not tracked.
    pub fn estimate(&self, item: &T) -> f64 {
        self.get(item).map_or(0.0, Counter::count)
    }

    /// Returns the guaranteed weight of an item, 0 if it is not tracked.
    pub fn lower_bound(&self, item: &T) -> f64 {
        self.get(item).map_or(0.0, Counter::lower_bound)
    }

    /// Returns the most weight an item can have received.
    ///
    /// For an untracked item this is the smallest tracked count when the sketch is
    /// full, and 0 otherwise.
    pub fn upper_bound(&self, item: &T) -> f64 {
        match self.get(item) {
            Some(counter) => counter.count,
            None if self.is_full() => self.min_count().unwrap_or(0.0),
            None => 0.0,
        }
    }

    /// Returns the smallest tracked count.
    pub fn min_count(&self) -> Option<f64> {
        self.map.iter().map(Counter::count).min_by(f64::total_cmp)
    }

    /// Returns the tracked counters in storage order.
    pub fn iter(&self) -> impl Iterator<Item = &Counter<T>> {
        self.map.iter()
    }

    /// Returns every tracked count in ascending order.
    pub fn counts(&self) -> Vec<f64> {
        let mut counts: Vec<f64> = self.map.iter().map(Counter::count).collect();
        counts.sort_by(f64::total_cmp);
        counts
    }

    /// Adds one to the weight of `item`.
    pub fn offer_one(&mut self, item: T) -> Result<(), Error> {
        self.offer(item, 1.0)
    }

    /// Adds `delta` to the weight of `item`.
    ///
    /// An untracked item takes a free counter if there is one. Otherwise it evicts the
    /// counter with the smallest count (the earliest storage slot among equal counts)
    /// and inherits that count as both its starting weight and its error.
    ///
    /// # Errors
    ///
    /// Returns [`ErrorKind::InvalidValue`](crate::error::ErrorKind::InvalidValue) if
    /// `delta` or the resulting count is not finite. The sketch is unchanged then.
    pub fn offer(&mut self, item: T, delta: f64) -> Result<(), Error> {
        check_finite(delta)?;

        if let Some(slot) = self.map.slot_of(&item) {
            let count = self.map.counter(slot).count + delta;
            check_finite(count)?;
            self.map.set_count(slot, count);
            return Ok(());
        }

        if !self.is_full() {
            self.map.push(Counter::new(item, delta, 0.0));
            return Ok(());
        }

        let slot = self
            .map
            .min_slot()
            .expect("a full sketch always has a smallest counter");
        let floor = self.map.counter(slot).count;
        let count = floor + delta;
        check_finite(count)?;
        self.map.replace(slot, Counter::new(item, count, floor));
        tracing::trace!(target: "topn", slot, floor, "space_saving_evict");
        Ok(())
    }

    /// Merges another sketch into this one, consuming it.
    ///
    /// Counts and errors of common items add up. An item tracked by only one side may
    /// have received up to the other side's bound (its smallest count if it was full,
    /// else 0) in the other stream, so that bound is added to both its count and its
    /// error. If the union exceeds this sketch's capacity, the heaviest `capacity`
    /// items are kept as by [`retain`](Self::retain).
    ///
    /// # Errors
    ///
    /// Returns [`ErrorKind::InvalidValue`](crate::error::ErrorKind::InvalidValue) if a
    /// merged count or error is not finite. This sketch is unchanged then.
    pub fn merge(&mut self, other: Self) -> Result<(), Error> {
        if let Some(map) = self.merged(other)? {
            self.map = map;
        }
        Ok(())
    }

    /// Shrinks the sketch to at most `new_capacity` counters and lowers its capacity
    /// accordingly. The capacity is never raised.
    ///
    /// The cutoff is the `new_capacity`-th largest count, found by selection rather
    /// than sorting. Counters below it are dropped; counters equal to it are kept in
    /// storage order until exactly `new_capacity` remain.
    ///
    /// # Errors
    ///
    /// Returns [`ErrorKind::InvalidArgument`](crate::error::ErrorKind::InvalidArgument)
    /// if `new_capacity` is 0.
    pub fn retain(&mut self, new_capacity: usize) -> Result<(), Error> {
        check_capacity(new_capacity.min(MAX_CAPACITY))?;
        self.capacity = self.capacity.min(new_capacity);
        if self.map.len() <= self.capacity {
            return Ok(());
        }

        let counters = self.map.take_counters();
        let before = counters.len();
        self.map = CounterMap::from_counters(keep_heaviest(counters, self.capacity));
        tracing::trace!(
            target: "topn",
            before,
            after = self.map.len(),
            capacity = self.capacity,
            "space_saving_retain"
        );
        Ok(())
    }

    /// Returns the `k` heaviest counters, by count descending and then by item.
    ///
    /// Returns every counter if fewer than `k` are tracked.
    pub fn top_k(&self, k: usize) -> Vec<Counter<T>> {
        if k == 0 {
            return Vec::new();
        }
        let mut ranked: Vec<&Counter<T>> = self.map.iter().collect();
        if k < ranked.len() {
            select_nth_by(&mut ranked, k - 1, |a, b| rank_order(*a, *b))
                .expect("k - 1 is below the number of counters");
            ranked.truncate(k);
        }
        ranked.sort_by(|a, b| rank_order(*a, *b));
        ranked.into_iter().cloned().collect()
    }

    /// Drops every counter. The capacity is kept.
    pub fn clear(&mut self) {
        self.map.clear();
    }

    /// Returns the number of bytes [`encode`](Self::encode) writes.
    pub fn serialized_size(&self) -> usize {
        HEADER_BYTES
            + self
                .map
                .iter()
                .map(|counter| ENTRY_FIXED_BYTES + counter.item.encoded_len())
                .sum::<usize>()
    }

    /// Encodes the sketch into `buf` and returns the number of bytes written.
    ///
    /// # Errors
    ///
    /// Returns [`ErrorKind::BufferOverflow`](crate::error::ErrorKind::BufferOverflow)
    /// if `buf` is shorter than [`serialized_size`](Self::serialized_size); nothing is
    /// written then. Returns
    /// [`ErrorKind::InvalidArgument`](crate::error::ErrorKind::InvalidArgument) if an
    /// item encodes to more than `u32::MAX` bytes.
    pub fn encode(&self, buf: &mut [u8]) -> Result<usize, Error> {
        let size = self.serialized_size();
        if buf.len() < size {
            return Err(Error::buffer_overflow(size, buf.len()));
        }
        let mut writer = SketchWriter::new(buf);
        self.write_to(&mut writer)?;
        Ok(writer.position())
    }

    /// Serializes the sketch to a new byte vector.
    ///
    /// # Panics
    ///
    /// Panics if an item encodes to more than `u32::MAX` bytes.
    pub fn serialize(&self) -> Vec<u8> {
        let mut bytes = vec![0u8; self.serialized_size()];
        let written = self
            .encode(&mut bytes)
            .expect("buffer is sized by serialized_size");
        debug_assert_eq!(written, bytes.len());
        bytes
    }

    /// Decodes a sketch produced by [`encode`](Self::encode).
    ///
    /// # Errors
    ///
    /// Returns [`ErrorKind::CorruptData`](crate::error::ErrorKind::CorruptData) if the
    /// bytes are truncated, declare more entries than the capacity, hold non-finite
    /// values or duplicate items, or continue past the encoded sketch.
    pub fn decode(bytes: &[u8]) -> Result<Self, Error> {
        let mut input = SketchSlice::new(bytes);
        let sketch = Self::read_from(&mut input)?;
        check_fully_consumed(&input)?;
        Ok(sketch)
    }

    pub(super) fn write_to(&self, out: &mut SketchWriter<'_>) -> Result<(), Error> {
        out.write_u32_le(self.capacity as u32)?;
        out.write_u32_le(self.map.len() as u32)?;
        for counter in self.map.iter() {
            let len = counter.item.encoded_len();
            let prefix = u32::try_from(len).map_err(|_| {
                Error::invalid_argument("item is too large to encode").with_context("len", len)
            })?;
            out.write_u32_le(prefix)?;
            counter.item.encode_item(out.reserve(len)?);
            out.write_f64_le(counter.count)?;
            out.write_f64_le(counter.error)?;
        }
        Ok(())
    }

    pub(super) fn read_from(input: &mut SketchSlice<'_>) -> Result<Self, Error> {
        fn make_error(tag: &'static str) -> impl FnOnce(std::io::Error) -> Error {
            move |err| Error::insufficient_data(tag).set_source(err)
        }

        let capacity = input.read_u32_le().map_err(make_error("capacity"))? as usize;
        let entry_count = input.read_u32_le().map_err(make_error("entry_count"))? as usize;
        if capacity < MIN_CAPACITY {
            return Err(Error::corrupt_data("capacity must be positive"));
        }
        if entry_count > capacity {
            return Err(Error::corrupt_data("entry count exceeds capacity")
                .with_context("entry_count", entry_count)
                .with_context("capacity", capacity));
        }
        if entry_count > input.remaining() / ENTRY_FIXED_BYTES {
            return Err(Error::insufficient_data("entries").with_context("entry_count", entry_count));
        }

        let mut map = CounterMap::with_capacity(entry_count);
        for _ in 0..entry_count {
            let len = input.read_u32_le().map_err(make_error("item_len"))? as usize;
            let payload = input.read_slice(len).map_err(make_error("item"))?;
            let item = T::decode_item(payload)?;
            let count = input.read_f64_le().map_err(make_error("count"))?;
            let error = input.read_f64_le().map_err(make_error("error"))?;
            if !count.is_finite() || !error.is_finite() {
                return Err(Error::corrupt_data("counter values must be finite")
                    .with_context("count", count)
                    .with_context("error", error));
            }
            if map.slot_of(&item).is_some() {
                return Err(Error::corrupt_data("duplicate item in sketch"));
            }
            map.push(Counter::new(item, count, error));
        }
        Ok(Self::make(capacity, map))
    }

    /// Computes the merge of `other` into this sketch without applying it.
    ///
    /// Returns `None` when `other` is empty and nothing changes.
    pub(super) fn merged(&mut self, mut other: Self) -> Result<Option<CounterMap<T>>, Error> {
        if other.is_empty() {
            return Ok(None);
        }

        let self_bound = self.unobserved_bound();
        let other_bound = other.unobserved_bound();
        let (theirs, their_slots) = std::mem::take(&mut other.map).into_parts();

        let mut matched = vec![false; theirs.len()];
        let mut merged = Vec::with_capacity(self.map.len() + theirs.len());
        for mine in self.map.iter() {
            let counter = match their_slots.get(&mine.item) {
                Some(&slot) => {
                    matched[slot] = true;
                    let their = &theirs[slot];
                    Counter::new(
                        mine.item.clone(),
                        mine.count + their.count,
                        mine.error + their.error,
                    )
                }
                None => Counter::new(
                    mine.item.clone(),
                    mine.count + other_bound,
                    mine.error + other_bound,
                ),
            };
            check_finite(counter.count)?;
            check_finite(counter.error)?;
            merged.push(counter);
        }
        for (their, matched) in theirs.into_iter().zip(matched) {
            if matched {
                continue;
            }
            let counter = Counter::new(
                their.item,
                their.count + self_bound,
                their.error + self_bound,
            );
            check_finite(counter.count)?;
            check_finite(counter.error)?;
            merged.push(counter);
        }

        let union = merged.len();
        let kept = keep_heaviest(merged, self.capacity);
        tracing::debug!(
            target: "topn",
            union,
            kept = kept.len(),
            capacity = self.capacity,
            self_bound,
            other_bound,
            "space_saving_merge"
        );
        Ok(Some(CounterMap::from_counters(kept)))
    }

    pub(super) fn install(&mut self, map: CounterMap<T>) {
        debug_assert!(map.len() <= self.capacity);
        self.map = map;
    }

    /// The most weight an untracked item can have received in this sketch's stream.
    fn unobserved_bound(&mut self) -> f64 {
        if !self.is_full() {
            return 0.0;
        }
        self.map
            .min_slot()
            .map_or(0.0, |slot| self.map.counter(slot).count)
    }

    fn make(capacity: usize, map: CounterMap<T>) -> Self {
        Self { capacity, map }
    }
}

/// Ranking order: heavier first, then by item.
fn rank_order<T: Ord>(a: &Counter<T>, b: &Counter<T>) -> Ordering {
    b.count
        .total_cmp(&a.count)
        .then_with(|| a.item.cmp(&b.item))
}

/// Keeps the `n` heaviest counters, preserving their relative order.
///
/// Counters tied with the cutoff count are kept first come, first served.
fn keep_heaviest<T>(counters: Vec<Counter<T>>, n: usize) -> Vec<Counter<T>> {
    if counters.len() <= n {
        return counters;
    }

    let mut counts: Vec<f64> = counters.iter().map(Counter::count).collect();
    let cutoff = *select_nth_by(&mut counts, n - 1, |a: &f64, b: &f64| b.total_cmp(a))
        .expect("n - 1 is below the number of counters");

    let above = counters
        .iter()
        .filter(|counter| counter.count.total_cmp(&cutoff) == Ordering::Greater)
        .count();
    let mut ties = n - above;
    counters
        .into_iter()
        .filter(|counter| match counter.count.total_cmp(&cutoff) {
            Ordering::Greater => true,
            Ordering::Equal if ties > 0 => {
                ties -= 1;
                true
            }
            _ => false,
        })
        .collect()
}

fn check_capacity(capacity: usize) -> Result<(), Error> {
    if (MIN_CAPACITY..=MAX_CAPACITY).contains(&capacity) {
        Ok(())
    } else {
        Err(Error::invalid_argument(format!(
            "capacity must be in [{MIN_CAPACITY}, {MAX_CAPACITY}], got {capacity}"
        )))
    }
}

pub(super) fn check_finite(value: f64) -> Result<(), Error> {
    if value.is_finite() {
        Ok(())
    } else {
        Err(Error::invalid_value(value))
    }
}

pub(super) fn check_fully_consumed(input: &SketchSlice<'_>) -> Result<(), Error> {
    match input.remaining() {
        0 => Ok(()),
        trailing => Err(Error::corrupt_data("trailing bytes after sketch")
            .with_context("trailing", trailing)),
    }
}
