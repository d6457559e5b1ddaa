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

//! Little-endian byte cursors shared by the sketch encoders and decoders.

use std::io;
use std::io::Cursor;

use byteorder::ByteOrder;
use byteorder::LittleEndian;
use byteorder::ReadBytesExt;

use crate::error::Error;

/// Bounded writer over a caller-supplied buffer.
///
/// Every write checks the remaining room first, so a failed write never leaves a
/// partially written value behind.
pub(crate) struct SketchWriter<'a> {
    buf: &'a mut [u8],
    pos: usize,
}

impl<'a> SketchWriter<'a> {
    pub fn new(buf: &'a mut [u8]) -> Self {
        Self { buf, pos: 0 }
    }

    /// Number of bytes written so far.
    pub fn position(&self) -> usize {
        self.pos
    }

    /// Hands out the next `len` bytes of the buffer for the caller to fill.
    pub fn reserve(&mut self, len: usize) -> Result<&mut [u8], Error> {
        let start = self.pos;
        let end = start
            .checked_add(len)
            .filter(|&end| end <= self.buf.len())
            .ok_or_else(|| Error::buffer_overflow(start.saturating_add(len), self.buf.len()))?;
        self.pos = end;
        Ok(&mut self.buf[start..end])
    }

    pub fn write_u32_le(&mut self, n: u32) -> Result<(), Error> {
        LittleEndian::write_u32(self.reserve(4)?, n);
        Ok(())
    }

    pub fn write_f64_le(&mut self, n: f64) -> Result<(), Error> {
        LittleEndian::write_f64(self.reserve(8)?, n);
        Ok(())
    }
}

/// Cursor reader over encoded sketch bytes.
pub(crate) struct SketchSlice<'a> {
    slice: Cursor<&'a [u8]>,
}

impl<'a> SketchSlice<'a> {
    pub fn new(slice: &'a [u8]) -> Self {
        Self {
            slice: Cursor::new(slice),
        }
    }

    /// Number of bytes consumed so far.
    pub fn position(&self) -> usize {
        self.slice.position() as usize
    }

    /// Number of bytes left to read.
    pub fn remaining(&self) -> usize {
        self.slice.get_ref().len().saturating_sub(self.position())
    }

    pub fn read_u32_le(&mut self) -> io::Result<u32> {
        self.slice.read_u32::<LittleEndian>()
    }

    pub fn read_f64_le(&mut self) -> io::Result<f64> {
        self.slice.read_f64::<LittleEndian>()
    }

    /// Borrows the next `len` bytes without copying them.
    pub fn read_slice(&mut self, len: usize) -> io::Result<&'a [u8]> {
        let data: &'a [u8] = *self.slice.get_ref();
        let start = self.position();
        let end = start
            .checked_add(len)
            .filter(|&end| end <= data.len())
            .ok_or_else(|| io::Error::from(io::ErrorKind::UnexpectedEof))?;
        self.slice.set_position(end as u64);
        Ok(&data[start..end])
    }
}
