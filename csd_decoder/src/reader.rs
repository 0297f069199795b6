/***************************************************************************************************
 * Copyright (c) 2023, 2024 Qualcomm Innovation Center, Inc. All rights reserved.
 *
 * Permission is hereby granted, free of charge, to any person obtaining a copy of this software
 * and associated documentation files (the “Software”), to deal in the Software without
 * restriction, including without limitation the rights to use, copy, modify, merge, publish,
 * distribute, sublicense, and/or sell copies of the Software, and to permit persons to whom the
 * Software is furnished to do so, subject to the following conditions:
 *
 * The above copyright notice and this permission notice shall be included in all copies or
 * substantial portions of the Software.
 *
 * THE SOFTWARE IS PROVIDED “AS IS”, WITHOUT WARRANTY OF ANY KIND, EXPRESS OR IMPLIED, INCLUDING
 * BUT NOT LIMITED TO THE WARRANTIES OF MERCHANTABILITY, FITNESS FOR A PARTICULAR PURPOSE AND
 * NONINFRINGEMENT. IN NO EVENT SHALL THE AUTHORS OR COPYRIGHT HOLDERS BE LIABLE FOR ANY CLAIM,
 * DAMAGES OR OTHER LIABILITY, WHETHER IN AN ACTION OF CONTRACT, TORT OR OTHERWISE, ARISING FROM,
 * OUT OF OR IN CONNECTION WITH THE SOFTWARE OR THE USE OR OTHER DEALINGS IN THE SOFTWARE.
 **************************************************************************************************/
/***************************************************************************************************
 * csd_decoder byte source
 *
 * A buffered byte source over any `std::io::Read`. The decoder needs three primitives from its
 * input: read exactly one byte, look at the next byte without consuming it, and read exactly N
 * bytes or fail. The reader also tracks the absolute stream offset so truncation errors can
 * report where the stream ran dry.
 **************************************************************************************************/
use std::io::{self, BufRead, BufReader, Read};

use crate::error::{DecodeError, Result};

// Declared string lengths are attacker-controlled, so the payload buffer grows in bounded steps
// instead of a single up-front allocation of the declared size.
const READ_STEP: usize = 64 * 1024;

/// A buffered byte source for the decoder, wrapping any [`Read`] implementation.
///
/// The source may block (for example a tailed file which polls past end of file); the reader
/// simply blocks with it. End of stream is only acceptable between items, which callers detect
/// with [`StreamReader::peek_u8`]; every other read failing short produces
/// [`DecodeError::Truncated`].
pub struct StreamReader<R: Read> {
    src: BufReader<R>,
    offset: u64,
}

impl<R: Read> StreamReader<R> {
    /// Construct a new instance of `StreamReader` over a byte source.
    pub fn new(src: R) -> StreamReader<R> {
        StreamReader {
            src: BufReader::new(src),
            offset: 0,
        }
    }

    /// Absolute offset of the next unread byte.
    #[inline]
    pub fn offset(&self) -> u64 {
        self.offset
    }

    /// Look at the next byte without consuming it. `None` means the stream has ended.
    pub fn peek_u8(&mut self) -> Result<Option<u8>> {
        loop {
            match self.src.fill_buf() {
                Ok(buf) => return Ok(buf.first().copied()),
                Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
                Err(e) => return Err(DecodeError::Io(e)),
            }
        }
    }

    /// Read one byte, failing if the stream has ended.
    pub fn read_u8(&mut self) -> Result<u8> {
        let mut byte = [0u8; 1];
        self.fill(&mut byte, 1)?;
        Ok(byte[0])
    }

    /// Read exactly `buf.len()` bytes into `buf`.
    pub fn read_into(&mut self, buf: &mut [u8]) -> Result<()> {
        let wanted = buf.len();
        self.fill(buf, wanted)
    }

    /// Read exactly `n` bytes into a fresh buffer.
    pub fn read_exact_n(&mut self, n: usize) -> Result<Vec<u8>> {
        let mut bytes = Vec::with_capacity(n.min(READ_STEP));
        while bytes.len() < n {
            let take = (n - bytes.len()).min(READ_STEP);
            let start = bytes.len();
            bytes.resize(start + take, 0);
            self.fill(&mut bytes[start..], n)?;
        }
        Ok(bytes)
    }

    /// Fill `buf` completely, reporting `wanted` as the size of the read the item required.
    fn fill(&mut self, buf: &mut [u8], wanted: usize) -> Result<()> {
        let mut filled = 0;
        while filled < buf.len() {
            match self.src.read(&mut buf[filled..]) {
                Ok(0) => {
                    return Err(DecodeError::Truncated {
                        wanted,
                        offset: self.offset,
                    })
                }
                Ok(count) => {
                    filled += count;
                    self.offset += count as u64;
                }
                Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
                Err(e) => return Err(DecodeError::Io(e)),
            }
        }
        Ok(())
    }
}
