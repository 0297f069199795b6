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
 * csd_decoder wire format constants
 *
 * The constants of the CBOR initial byte: major type codes, additional information encodings and
 * the simple value sub-codes of major type 7, per RFC8949 section 3.
 **************************************************************************************************/

/// Mask selecting the additional information bits of an initial byte.
pub(crate) const AI_MASK: u8 = 0x1f;

// Major types, as obtained by shifting the initial byte right by five.
pub(crate) const MAJOR_UINT: u8 = 0;
pub(crate) const MAJOR_NINT: u8 = 1;
pub(crate) const MAJOR_BSTR: u8 = 2;
pub(crate) const MAJOR_TSTR: u8 = 3;
pub(crate) const MAJOR_ARRAY: u8 = 4;
pub(crate) const MAJOR_MAP: u8 = 5;
pub(crate) const MAJOR_TAG: u8 = 6;
pub(crate) const MAJOR_SIMPLE: u8 = 7;

// Additional information values selecting the width of the trailing length/value bytes.
// 0..=23 carry the value directly; 28..=30 are reserved and always malformed.
pub(crate) const AI_ONE_BYTE: u8 = 24;
pub(crate) const AI_TWO_BYTES: u8 = 25;
pub(crate) const AI_FOUR_BYTES: u8 = 26;
pub(crate) const AI_EIGHT_BYTES: u8 = 27;
pub(crate) const AI_INDEFINITE: u8 = 31;

// Simple value and float sub-codes of major type 7.
pub(crate) const SIMPLE_FALSE: u8 = 20;
pub(crate) const SIMPLE_TRUE: u8 = 21;
pub(crate) const SIMPLE_NULL: u8 = 22;
pub(crate) const SIMPLE_F16: u8 = 25;
pub(crate) const SIMPLE_F32: u8 = 26;
pub(crate) const SIMPLE_F64: u8 = 27;
pub(crate) const SIMPLE_BREAK: u8 = 31;

/// The encoded break marker terminating an indefinite-length container: major type 7 with
/// additional information 31.
pub(crate) const BREAK_BYTE: u8 = 0xff;

/// Lowercase hex digits used when rendering binary blobs and hardware addresses.
pub(crate) const HEX_DIGITS: &[u8; 16] = b"0123456789abcdef";

/// Containers nested beyond this depth abort decoding rather than exhaust the call stack.
pub(crate) const MAX_NESTING: usize = 512;
