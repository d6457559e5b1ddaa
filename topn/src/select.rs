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

//! Order statistics without sorting.
//!
//! [`select_nth_by`] moves the k-th smallest element (0-based) of a sequence to
//! position `k` with a quickselect: each round splits the active range into the
//! elements less than, equal to and greater than a pivot, stops if `k` lands among the
//! equal ones, and otherwise continues only in the side that holds `k`. Expected time
//! is linear, including inputs made mostly of ties such as the tail counts of a sketch.
//!
//! # Usage
//!
//! ```rust
//! # use topn::select::select_nth_by;
//! let mut counts = vec![4.0, 1.0, 9.0, 7.0, 3.0];
//! // The second largest count.
//! let kth = *select_nth_by(&mut counts, 1, |a: &f64, b: &f64| b.total_cmp(a)).unwrap();
//! assert_eq!(kth, 7.0);
//! assert!(counts[..1].iter().all(|c| *c >= 7.0));
//! assert!(counts[2..].iter().all(|c| *c <= 7.0));
//! ```

use std::cmp::Ordering;

use crate::common::XorShift64;
use crate::error::Error;

const PIVOT_SEED: u64 = 0x2545_f491_4f6c_dd1d;

/// Partitions `seq` in place so that `seq[k]` is its k-th smallest element under `cmp`.
///
/// Afterwards every element before `k` compares less than or equal to `seq[k]` and
/// every element after it compares greater than or equal. Neither side is sorted.
/// Equal elements may land on either side of `k`.
///
/// # Errors
///
/// Returns [`ErrorKind::OutOfRange`](crate::error::ErrorKind::OutOfRange) if `k` is not
/// in `[0, seq.len())`, which includes every `k` for an empty sequence.
pub fn select_nth_by<T, F>(seq: &mut [T], k: usize, mut cmp: F) -> Result<&T, Error>
where
    F: FnMut(&T, &T) -> Ordering,
{
    if k >= seq.len() {
        return Err(Error::out_of_range(k, seq.len()));
    }

    let mut rng = XorShift64::seeded(PIVOT_SEED);
    let mut left = 0;
    let mut right = seq.len() - 1;
    while left < right {
        // Move a random element into the pivot slot so presorted input stays linear.
        let pivot = left + rng.next_index(right - left + 1);
        seq.swap(pivot, right);

        let (lt, gt) = partition(seq, left, right, &mut cmp);
        if k < lt {
            right = lt - 1;
        } else if k > gt {
            left = gt + 1;
        } else {
            break;
        }
    }
    Ok(&seq[k])
}

/// Like [`select_nth_by`], after appending `hint` to the working sequence.
///
/// The hint takes part in the selection as one more candidate. `k` is checked against
/// the length of `seq` before the hint is appended.
pub fn select_nth_with_hint<T, F>(
    seq: &mut Vec<T>,
    k: usize,
    hint: Option<T>,
    cmp: F,
) -> Result<&T, Error>
where
    F: FnMut(&T, &T) -> Ordering,
{
    if k >= seq.len() {
        return Err(Error::out_of_range(k, seq.len()));
    }
    if let Some(hint) = hint {
        seq.push(hint);
    }
    select_nth_by(seq, k, cmp)
}

/// [`select_nth_by`] under the natural order of `T`.
pub fn select_nth<T: Ord>(seq: &mut [T], k: usize) -> Result<&T, Error> {
    select_nth_by(seq, k, T::cmp)
}

/// Three-way partition of `seq[left..=right]` around `seq[right]`.
///
/// Returns `(lt, gt)` such that `seq[left..lt]` is less than the pivot, `seq[lt..=gt]`
/// equals it and `seq[gt + 1..=right]` is greater.
fn partition<T, F>(seq: &mut [T], left: usize, right: usize, cmp: &mut F) -> (usize, usize)
where
    F: FnMut(&T, &T) -> Ordering,
{
    seq.swap(left, right);
    // seq[lt] always holds an element equal to the pivot.
    let mut lt = left;
    let mut i = left + 1;
    let mut gt = right;
    while i <= gt {
        match cmp(&seq[i], &seq[lt]) {
            Ordering::Less => {
                seq.swap(lt, i);
                lt += 1;
                i += 1;
            }
            Ordering::Greater => {
                seq.swap(i, gt);
                gt -= 1;
            }
            Ordering::Equal => i += 1,
        }
    }
    (lt, gt)
}
