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

use googletest::assert_that;
use googletest::prelude::contains_substring;
use googletest::prelude::le;
use rand::Rng;
use rand::SeedableRng;
use rand::rngs::StdRng;
use topn::error::ErrorKind;
use topn::select::select_nth;
use topn::select::select_nth_by;
use topn::select::select_nth_with_hint;

fn assert_partitioned(seq: &[i64], k: usize) {
    let pivot = seq[k];
    assert!(seq[..k].iter().all(|v| *v <= pivot), "left side of {k}");
    assert!(seq[k + 1..].iter().all(|v| *v >= pivot), "right side of {k}");
}

#[test]
fn test_every_k_matches_sorted_order() {
    let mut rng = StdRng::seed_from_u64(7);
    let original: Vec<i64> = (0..200).map(|_| rng.random_range(-50..50)).collect();
    let mut sorted = original.clone();
    sorted.sort();

    for k in 0..original.len() {
        let mut seq = original.clone();
        let value = *select_nth(&mut seq, k).unwrap();
        assert_eq!(value, sorted[k], "k = {k}");
        assert_partitioned(&seq, k);
    }
}

#[test]
fn test_presorted_and_reversed_input() {
    let ascending: Vec<i64> = (0..100_000).collect();
    let mut seq = ascending.clone();
    assert_eq!(*select_nth(&mut seq, 12_345).unwrap(), 12_345);

    let mut seq: Vec<i64> = ascending.into_iter().rev().collect();
    assert_eq!(*select_nth(&mut seq, 99_999).unwrap(), 99_999);
    assert_eq!(*select_nth(&mut seq, 0).unwrap(), 0);
}

#[test]
fn test_all_equal_elements() {
    let mut seq = vec![3i64; 1000];
    assert_eq!(*select_nth(&mut seq, 500).unwrap(), 3);
}

#[test]
fn test_ties_take_linear_comparisons() {
    let n = 100_000;
    for k in [0, n / 10, n / 2, n - 1] {
        let mut seq = vec![1.0f64; n];
        let mut calls = 0usize;
        let value = *select_nth_by(&mut seq, k, |a: &f64, b: &f64| {
            calls += 1;
            b.total_cmp(a)
        })
        .unwrap();
        assert_eq!(value, 1.0);
        assert_that!(calls, le(n));
    }
}

#[test]
fn test_mostly_tied_counts() {
    // A long tail of equal small counts under a few heavy ones.
    let mut seq: Vec<i64> = vec![1; 50_000];
    seq.extend((0..100).map(|i| 1_000 + i));
    seq.extend(vec![2; 20_000]);
    let mut sorted = seq.clone();
    sorted.sort();

    for k in [0, 49_999, 50_000, 69_999, 70_000, 70_099] {
        let mut work = seq.clone();
        assert_eq!(*select_nth(&mut work, k).unwrap(), sorted[k], "k = {k}");
        assert_partitioned(&work, k);
    }
}

#[test]
fn test_custom_order_selects_kth_largest() {
    let mut seq = vec![4.0, 1.5, 9.0, -2.0, 7.25];
    let third_largest = *select_nth_by(&mut seq, 2, |a: &f64, b: &f64| b.total_cmp(a)).unwrap();
    assert_eq!(third_largest, 4.0);
}

#[test]
fn test_out_of_range() {
    let mut seq = vec![1i64, 2, 3];
    let err = select_nth(&mut seq, 3).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::OutOfRange);
    assert_that!(err.message(), contains_substring("index 3 out of range"));

    let mut empty: Vec<i64> = Vec::new();
    let err = select_nth(&mut empty, 0).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::OutOfRange);
}

#[test]
fn test_hint_takes_part_in_selection() {
    let mut seq = vec![10i64, 30, 20];
    let value = *select_nth_with_hint(&mut seq, 0, Some(5), i64::cmp).unwrap();
    assert_eq!(value, 5);
    assert_eq!(seq.len(), 4);

    let mut seq = vec![10i64, 30, 20];
    let value = *select_nth_with_hint(&mut seq, 2, None, i64::cmp).unwrap();
    assert_eq!(value, 30);
    assert_eq!(seq.len(), 3);
}

#[test]
fn test_hint_does_not_extend_valid_range() {
    let mut seq = vec![10i64, 30, 20];
    let err = select_nth_with_hint(&mut seq, 3, Some(40), i64::cmp).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::OutOfRange);
    assert_eq!(seq, [10, 30, 20]);

    let mut empty: Vec<i64> = Vec::new();
    let err = select_nth_with_hint(&mut empty, 0, Some(1), i64::cmp).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::OutOfRange);
}
