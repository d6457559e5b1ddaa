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

//! Item types that can be tracked and encoded by the sketches.

use std::hash::Hash;

use byteorder::ByteOrder;
use byteorder::LittleEndian;

use crate::error::Error;

/// Trait implemented by item types supported by the Space-Saving sketches.
///
/// Items need equality and hashing for lookup, a total order to break ranking ties
/// reproducibly, and a byte codec. The sketch codec writes the length prefix, so an
/// item only encodes its own payload.
pub trait SketchItem: Clone + Eq + Hash + Ord {
    /// Encoded size in bytes.
    fn encoded_len(&self) -> usize;

    /// Writes the item into `out`, which is exactly [`encoded_len`](Self::encoded_len)
    /// bytes long.
    fn encode_item(&self, out: &mut [u8]);

    /// Reads an item from its complete payload.
    fn decode_item(bytes: &[u8]) -> Result<Self, Error>;
}

impl SketchItem for String {
    fn encoded_len(&self) -> usize {
        self.len()
    }

    fn encode_item(&self, out: &mut [u8]) {
        out.copy_from_slice(self.as_bytes());
    }

    fn decode_item(bytes: &[u8]) -> Result<Self, Error> {
        String::from_utf8(bytes.to_vec())
            .map_err(|err| Error::corrupt_data("invalid utf-8 string").set_source(err))
    }
}

impl SketchItem for Vec<u8> {
    fn encoded_len(&self) -> usize {
        self.len()
    }

    fn encode_item(&self, out: &mut [u8]) {
        out.copy_from_slice(self);
    }

    fn decode_item(bytes: &[u8]) -> Result<Self, Error> {
        Ok(bytes.to_vec())
    }
}

macro_rules! impl_fixed_width_item {
    ($ty:ty, $width:expr, $write:path, $read:path) => {
        impl SketchItem for $ty {
            fn encoded_len(&self) -> usize {
                $width
            }

            fn encode_item(&self, out: &mut [u8]) {
                $write(out, *self);
            }

            fn decode_item(bytes: &[u8]) -> Result<Self, Error> {
                if bytes.len() != $width {
                    return Err(Error::corrupt_data(format!(
                        "expected {} bytes for {}, got {}",
                        $width,
                        stringify!($ty),
                        bytes.len()
                    )));
                }
                Ok($read(bytes))
            }
        }
    };
}

impl_fixed_width_item!(i32, 4, LittleEndian::write_i32, LittleEndian::read_i32);
impl_fixed_width_item!(u32, 4, LittleEndian::write_u32, LittleEndian::read_u32);
impl_fixed_width_item!(i64, 8, LittleEndian::write_i64, LittleEndian::read_i64);
impl_fixed_width_item!(u64, 8, LittleEndian::write_u64, LittleEndian::read_u64);
