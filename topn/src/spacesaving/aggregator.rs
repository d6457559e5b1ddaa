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

use super::DEFAULT_CAPACITY_FACTOR;
use super::MAX_CAPACITY;
use super::item::SketchItem;
use super::signed::SignedSketch;
use super::sketch::SpaceSavingSketch;
use crate::error::Error;

/// A mergeable, shrinkable Top-N summary.
pub trait TopNSummary: Sized {
    /// Creates an empty summary.
    fn with_capacity(capacity: usize) -> Result<Self, Error>;

    fn capacity(&self) -> usize;

    fn len(&self) -> usize;

    /// Merges `other` into `self`, consuming it.
    fn merge(&mut self, other: Self) -> Result<(), Error>;

    /// Shrinks to at most `new_capacity` entries.
    fn retain(&mut self, new_capacity: usize) -> Result<(), Error>;
}

impl<T: SketchItem> TopNSummary for SpaceSavingSketch<T> {
    fn with_capacity(capacity: usize) -> Result<Self, Error> {
        SpaceSavingSketch::new(capacity)
    }

    fn capacity(&self) -> usize {
        SpaceSavingSketch::capacity(self)
    }

    fn len(&self) -> usize {
        SpaceSavingSketch::len(self)
    }

    fn merge(&mut self, other: Self) -> Result<(), Error> {
        SpaceSavingSketch::merge(self, other)
    }

    fn retain(&mut self, new_capacity: usize) -> Result<(), Error> {
        SpaceSavingSketch::retain(self, new_capacity)
    }
}

impl<T: SketchItem> TopNSummary for SignedSketch<T> {
    fn with_capacity(capacity: usize) -> Result<Self, Error> {
        SignedSketch::new(capacity)
    }

    fn capacity(&self) -> usize {
        SignedSketch::capacity(self)
    }

    fn len(&self) -> usize {
        SignedSketch::len(self)
    }

    fn merge(&mut self, other: Self) -> Result<(), Error> {
        SignedSketch::merge(self, other)
    }

    fn retain(&mut self, new_capacity: usize) -> Result<(), Error> {
        SignedSketch::retain(self, new_capacity)
    }
}

/// Folds partial summaries into one.
///
/// The first summary fixes the target capacity `c`. Everything is merged into an
/// accumulator of capacity `c * factor`, which is shrunk back to `c` when the state is
/// read. The extra room keeps items that are light in some partials but heavy overall
/// from being evicted early.
///
/// # Examples
///
/// ```
/// # use topn::spacesaving::SpaceSavingSketch;
/// # use topn::spacesaving::TopNAggregator;
/// let mut aggregator = TopNAggregator::new();
/// for shard in 0..4u64 {
///     let mut sketch = SpaceSavingSketch::new(8).unwrap();
///     sketch.offer(shard, 1.0).unwrap();
///     sketch.offer(100, 10.0).unwrap();
///     aggregator.aggregate(sketch).unwrap();
/// }
///
/// let state = aggregator.state().unwrap().unwrap();
/// assert_eq!(state.capacity(), 8);
/// assert_eq!(state.estimate(&100), 40.0);
/// ```
#[derive(Debug, Clone)]
pub struct TopNAggregator<S> {
    factor: usize,
    capacity: usize,
    sum: Option<S>,
}

impl<S: TopNSummary> Default for TopNAggregator<S> {
    fn default() -> Self {
        Self::new()
    }
}

impl<S: TopNSummary> TopNAggregator<S> {
    /// Creates an aggregator using [`DEFAULT_CAPACITY_FACTOR`].
    pub fn new() -> Self {
        Self {
            factor: DEFAULT_CAPACITY_FACTOR,
            capacity: 0,
            sum: None,
        }
    }

    /// Creates an aggregator whose accumulator is `factor` times the input capacity.
    ///
    /// # Errors
    ///
    /// Returns [`ErrorKind::InvalidArgument`](crate::error::ErrorKind::InvalidArgument)
    /// if `factor` is 0.
    pub fn with_capacity_factor(factor: usize) -> Result<Self, Error> {
        if factor == 0 {
            return Err(Error::invalid_argument("capacity factor must be positive"));
        }
        Ok(Self {
            factor,
            capacity: 0,
            sum: None,
        })
    }

    /// Returns the capacity fixed by the first aggregated summary.
    pub fn target_capacity(&self) -> Option<usize> {
        self.sum.as_ref().map(|_| self.capacity)
    }

    /// Forgets every aggregated summary.
    pub fn reset(&mut self) {
        self.capacity = 0;
        self.sum = None;
    }

    /// Merges `value` into the accumulator.
    ///
    /// On error the aggregator is unchanged.
    pub fn aggregate(&mut self, value: S) -> Result<(), Error> {
        if let Some(sum) = self.sum.as_mut() {
            return sum.merge(value);
        }

        let capacity = value.capacity();
        let mut sum = S::with_capacity(capacity.saturating_mul(self.factor).min(MAX_CAPACITY))?;
        sum.merge(value)?;
        tracing::debug!(
            target: "topn",
            capacity,
            accumulator = sum.capacity(),
            "topn_aggregator_start"
        );
        self.capacity = capacity;
        self.sum = Some(sum);
        Ok(())
    }

    /// Merges two summaries through an accumulator of twice the capacity of `a`, then
    /// shrinks the result to the capacity of `a`.
    pub fn aggregate_pair(a: S, b: S) -> Result<S, Error> {
        let capacity = a.capacity();
        let mut aggregated = S::with_capacity(capacity.saturating_mul(2).min(MAX_CAPACITY))?;
        aggregated.merge(a)?;
        aggregated.merge(b)?;
        aggregated.retain(capacity)?;
        Ok(aggregated)
    }

    /// Shrinks the accumulator to the target capacity and returns it.
    ///
    /// Returns `None` if nothing was aggregated yet.
    pub fn state(&mut self) -> Result<Option<&S>, Error> {
        match self.sum.as_mut() {
            Some(sum) => {
                sum.retain(self.capacity)?;
                Ok(Some(&*sum))
            }
            None => Ok(None),
        }
    }

    /// Consumes the aggregator and returns the shrunk accumulator.
    pub fn into_state(mut self) -> Result<Option<S>, Error> {
        self.state()?;
        Ok(self.sum)
    }
}
