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

use super::counter::Counter;
use super::item::SketchItem;
use super::sketch::SpaceSavingSketch;
use super::sketch::check_finite;
use super::sketch::check_fully_consumed;
use crate::codec::SketchSlice;
use crate::codec::SketchWriter;
use crate::error::Error;

/// Tracks the most positively and the most negatively weighted items of one stream.
///
/// Non-negative deltas go to the positive half, negative deltas go to the negative half
/// by magnitude. The halves never cancel each other, so an item can show up in both.
///
/// # Examples
///
/// ```
/// # use topn::spacesaving::SignedSketch;
/// let mut sketch = SignedSketch::new(10).unwrap();
/// sketch.offer("gain".to_string(), 5.0).unwrap();
/// sketch.offer("loss".to_string(), -3.0).unwrap();
///
/// let top = sketch.top_k(1);
/// assert_eq!(top.positive()[0].item(), "gain");
/// assert_eq!(top.negative()[0].count(), -3.0);
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct SignedSketch<T> {
    positive: SpaceSavingSketch<T>,
    negative: SpaceSavingSketch<T>,
}

/// The result of [`SignedSketch::top_k`].
#[derive(Debug, Clone, PartialEq)]
pub struct SignedTopK<T> {
    positive: Vec<Counter<T>>,
    negative: Vec<Counter<T>>,
}

impl<T> SignedTopK<T> {
    /// Heaviest positive items, largest count first.
    pub fn positive(&self) -> &[Counter<T>] {
        &self.positive
    }

    /// Heaviest negative items, most negative count first. Counts and errors carry a
    /// negative sign.
    pub fn negative(&self) -> &[Counter<T>] {
        &self.negative
    }

    /// Splits into the positive and negative lists.
    pub fn into_parts(self) -> (Vec<Counter<T>>, Vec<Counter<T>>) {
        (self.positive, self.negative)
    }
}

impl<T: SketchItem> Default for SignedSketch<T> {
    fn default() -> Self {
        Self {
            positive: SpaceSavingSketch::default(),
            negative: SpaceSavingSketch::default(),
        }
    }
}

impl<T: SketchItem> SignedSketch<T> {
    /// Creates an empty sketch whose halves each track at most `capacity` items.
    ///
    /// # Errors
    ///
    /// Returns [`ErrorKind::InvalidArgument`](crate::error::ErrorKind::InvalidArgument)
    /// if `capacity` is not in `[MIN_CAPACITY, MAX_CAPACITY]`.
    pub fn new(capacity: usize) -> Result<Self, Error> {
        Ok(Self {
            positive: SpaceSavingSketch::new(capacity)?,
            negative: SpaceSavingSketch::new(capacity)?,
        })
    }

    /// The half holding non-negative weights.
    pub fn positive(&self) -> &SpaceSavingSketch<T> {
        &self.positive
    }

    /// The half holding the magnitudes of negative weights.
    pub fn negative(&self) -> &SpaceSavingSketch<T> {
        &self.negative
    }

    /// Returns the capacity of each half.
    pub fn capacity(&self) -> usize {
        self.positive.capacity()
    }

    /// Returns the number of counters across both halves.
    pub fn len(&self) -> usize {
        self.positive.len() + self.negative.len()
    }

    pub fn is_empty(&self) -> bool {
        self.positive.is_empty() && self.negative.is_empty()
    }

    /// Routes `delta` to the half matching its sign.
    ///
    /// # Errors
    ///
    /// Returns [`ErrorKind::InvalidValue`](crate::error::ErrorKind::InvalidValue) if
    /// `delta` or the resulting count is not finite.
    pub fn offer(&mut self, item: T, delta: f64) -> Result<(), Error> {
        check_finite(delta)?;
        if delta >= 0.0 {
            self.positive.offer(item, delta)
        } else {
            self.negative.offer(item, -delta)
        }
    }

    /// Adds one to the positive weight of `item`.
    pub fn offer_one(&mut self, item: T) -> Result<(), Error> {
        self.offer(item, 1.0)
    }

    /// Merges each half of `other` into the matching half of this sketch.
    ///
    /// Both halves are computed before either is installed, so on error this sketch
    /// is unchanged.
    pub fn merge(&mut self, other: Self) -> Result<(), Error> {
        let Self { positive, negative } = other;
        let merged_positive = self.positive.merged(positive)?;
        let merged_negative = self.negative.merged(negative)?;
        if let Some(map) = merged_positive {
            self.positive.install(map);
        }
        if let Some(map) = merged_negative {
            self.negative.install(map);
        }
        Ok(())
    }

    /// Shrinks both halves, see [`SpaceSavingSketch::retain`].
    pub fn retain(&mut self, new_capacity: usize) -> Result<(), Error> {
        self.positive.retain(new_capacity)?;
        self.negative.retain(new_capacity)
    }

    /// Returns up to `k` heaviest items per half, with negative counts signed.
    pub fn top_k(&self, k: usize) -> SignedTopK<T> {
        let negative = self
            .negative
            .top_k(k)
            .into_iter()
            .map(|counter| Counter::new(counter.item, -counter.count, -counter.error))
            .collect();
        SignedTopK {
            positive: self.positive.top_k(k),
            negative,
        }
    }

    /// Drops every counter of both halves.
    pub fn clear(&mut self) {
        self.positive.clear();
        self.negative.clear();
    }

    pub fn serialized_size(&self) -> usize {
        self.positive.serialized_size() + self.negative.serialized_size()
    }

    /// Encodes the positive half followed by the negative half.
    ///
    /// # Errors
    ///
    /// Returns [`ErrorKind::BufferOverflow`](crate::error::ErrorKind::BufferOverflow)
    /// if `buf` is shorter than [`serialized_size`](Self::serialized_size); nothing is
    /// written then.
    pub fn encode(&self, buf: &mut [u8]) -> Result<usize, Error> {
        let size = self.serialized_size();
        if buf.len() < size {
            return Err(Error::buffer_overflow(size, buf.len()));
        }
        let mut writer = SketchWriter::new(buf);
        self.positive.write_to(&mut writer)?;
        self.negative.write_to(&mut writer)?;
        Ok(writer.position())
    }

    /// Serializes the sketch to a new byte vector.
    ///
    /// # Panics
    ///
    /// Panics if an item encodes to more than `u32::MAX` bytes.
    pub fn serialize(&self) -> Vec<u8> {
        let mut bytes = vec![0u8; self.serialized_size()];
        self.encode(&mut bytes)
            .expect("buffer is sized by serialized_size");
        bytes
    }

    /// Decodes a sketch produced by [`encode`](Self::encode).
    ///
    /// # Errors
    ///
    /// Returns [`ErrorKind::CorruptData`](crate::error::ErrorKind::CorruptData) under
    /// the same conditions as [`SpaceSavingSketch::decode`], or if the two halves
    /// disagree on capacity.
    pub fn decode(bytes: &[u8]) -> Result<Self, Error> {
        let mut input = SketchSlice::new(bytes);
        let positive = SpaceSavingSketch::read_from(&mut input)?;
        let negative = SpaceSavingSketch::read_from(&mut input)?;
        check_fully_consumed(&input)?;
        if positive.capacity() != negative.capacity() {
            return Err(Error::corrupt_data("signed sketch halves differ in capacity")
                .with_context("positive", positive.capacity())
                .with_context("negative", negative.capacity()));
        }
        Ok(Self { positive, negative })
    }
}
