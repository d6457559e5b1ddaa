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

mod common;

use common::ExactCounter;
use rand::Rng;
use rand::SeedableRng;
use rand::rngs::StdRng;
use topn::SignedSketch;
use topn::TopNAggregator;
use topn::error::ErrorKind;

fn signed_rows(counters: &[topn::Counter<String>]) -> Vec<(&str, f64)> {
    counters
        .iter()
        .map(|counter| (counter.item().as_str(), counter.count()))
        .collect()
}

#[test]
fn test_routing_by_sign() {
    let mut sketch = SignedSketch::new(10).unwrap();
    sketch.offer("a".to_string(), 5.0).unwrap();
    sketch.offer("a".to_string(), -3.0).unwrap();
    sketch.offer("b".to_string(), -2.0).unwrap();
    sketch.offer("c".to_string(), 0.0).unwrap();
    sketch.offer_one("c".to_string()).unwrap();

    assert_eq!(sketch.len(), 4);
    assert_eq!(sketch.positive().estimate(&"a".to_string()), 5.0);
    assert_eq!(sketch.positive().estimate(&"c".to_string()), 1.0);
    assert_eq!(sketch.negative().estimate(&"a".to_string()), 3.0);
    assert_eq!(sketch.negative().estimate(&"b".to_string()), 2.0);
    assert!(sketch.negative().get(&"c".to_string()).is_none());

    let top = sketch.top_k(5);
    assert_eq!(signed_rows(top.positive()), [("a", 5.0), ("c", 1.0)]);
    assert_eq!(signed_rows(top.negative()), [("a", -3.0), ("b", -2.0)]);
}

#[test]
fn test_no_cross_contamination() {
    let mut rng = StdRng::seed_from_u64(17);
    let mut sketch = SignedSketch::new(64).unwrap();
    let mut gains = ExactCounter::new();
    let mut losses = ExactCounter::new();

    for _ in 0..10_000 {
        let key: u64 = rng.random_range(0..50);
        let delta = f64::from(rng.random_range(-20i32..=20));
        sketch.offer(key, delta).unwrap();
        if delta >= 0.0 {
            gains.add(key, delta);
        } else {
            losses.add(key, -delta);
        }
    }

    for counter in sketch.positive().iter() {
        assert_eq!(counter.count(), gains.get(counter.item()));
    }
    for counter in sketch.negative().iter() {
        assert_eq!(counter.count(), losses.get(counter.item()));
    }
    assert!(sketch.negative().iter().all(|counter| counter.count() > 0.0));

    let top = sketch.top_k(3);
    assert!(top.positive().iter().all(|counter| counter.count() >= 0.0));
    assert!(top.negative().iter().all(|counter| counter.count() < 0.0));
    let (_, negative) = top.into_parts();
    assert_eq!(negative.len(), 3);
}

#[test]
fn test_evictions_stay_within_each_half() {
    let mut sketch = SignedSketch::new(2).unwrap();
    sketch.offer(1u64, -1.0).unwrap();
    sketch.offer(2u64, -1.0).unwrap();
    sketch.offer(3u64, -5.0).unwrap();
    sketch.offer(9u64, 1.0).unwrap();

    assert_eq!(sketch.positive().len(), 1);
    assert_eq!(sketch.negative().len(), 2);
    let evicted_into = sketch.negative().get(&3).unwrap();
    assert_eq!(evicted_into.count(), 6.0);
    assert_eq!(evicted_into.error(), 1.0);

    let top = sketch.top_k(1);
    assert_eq!(top.negative()[0].count(), -6.0);
    assert_eq!(top.negative()[0].error(), -1.0);
}

#[test]
fn test_merge_and_retain_apply_to_both_halves() {
    let mut a = SignedSketch::new(4).unwrap();
    let mut b = SignedSketch::new(4).unwrap();
    for (item, delta) in [(1u64, 2.0), (2, -3.0), (3, 1.0)] {
        a.offer(item, delta).unwrap();
    }
    for (item, delta) in [(1u64, 1.0), (2, -1.0), (4, -7.0)] {
        b.offer(item, delta).unwrap();
    }

    a.merge(b).unwrap();
    assert_eq!(a.positive().estimate(&1), 3.0);
    assert_eq!(a.negative().estimate(&2), 4.0);
    assert_eq!(a.negative().estimate(&4), 7.0);

    a.retain(1).unwrap();
    assert_eq!(a.capacity(), 1);
    assert_eq!(a.positive().capacity(), 1);
    assert_eq!(a.negative().capacity(), 1);
    assert_eq!(a.len(), 2);
    assert_eq!(a.negative().estimate(&4), 7.0);

    a.clear();
    assert!(a.is_empty());
    assert_eq!(a.capacity(), 1);
}

#[test]
fn test_failed_merge_leaves_both_halves_untouched() {
    let mut a = SignedSketch::new(4).unwrap();
    a.offer(1u64, 1.0).unwrap();
    a.offer(2u64, -f64::MAX).unwrap();
    let mut b = SignedSketch::new(4).unwrap();
    b.offer(1u64, 1.0).unwrap();
    b.offer(2u64, -f64::MAX).unwrap();
    let before = a.clone();

    let err = a.merge(b).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::InvalidValue);
    assert_eq!(a, before);
    assert_eq!(a.positive().estimate(&1), 1.0);
}

#[test]
fn test_invalid_arguments() {
    let err = SignedSketch::<u64>::new(0).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::InvalidArgument);

    let mut sketch = SignedSketch::<u64>::new(2).unwrap();
    let err = sketch.offer(1, f64::NAN).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::InvalidValue);
    let err = sketch.offer(1, f64::NEG_INFINITY).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::InvalidValue);
    let err = sketch.retain(0).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::InvalidArgument);
    assert!(sketch.is_empty());
}

#[test]
fn test_aggregator_over_signed_sketches() {
    let mut aggregator = TopNAggregator::new();
    for shard in 0..3u64 {
        let mut sketch = SignedSketch::new(2).unwrap();
        sketch.offer(shard, 1.0).unwrap();
        sketch.offer(7, -2.0).unwrap();
        aggregator.aggregate(sketch).unwrap();
    }

    let state = aggregator.into_state().unwrap().unwrap();
    assert_eq!(state.capacity(), 2);
    assert_eq!(state.negative().estimate(&7), 6.0);
    assert_eq!(state.positive().len(), 2);
}
