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
 * csd_decoder Error API
 *
 * Error definitions for the CBOR to JSON streaming decoder. Decoding fails at the first error and
 * the error is propagated to the caller at every recursion level; there is no recovery within a
 * stream.
 **************************************************************************************************/
use std::io;
use std::result;

use thiserror::Error;

/// An alias for Result<T, DecodeError> used throughout this crate.
pub type Result<T> = result::Result<T, DecodeError>;

/// `DecodeError` describes every way a CBOR record can fail to become JSON.
#[derive(Error, Debug)]
pub enum DecodeError {
    /// The source ended in the middle of an item.
    #[error("tried to read {wanted} bytes but the stream ended at offset {offset}")]
    Truncated {
        /// Number of bytes the current item required.
        wanted: usize,
        /// Byte offset at which the stream ended.
        offset: u64,
    },
    /// Additional information values 28..30 are reserved.
    #[error("reserved additional information value {0}")]
    ReservedAdditional(u8),
    /// Indefinite length on an item type which requires a definite one.
    #[error("indefinite length is not valid for this item")]
    UnexpectedIndefinite,
    /// Context required one major type and the stream supplied another.
    #[error("expected {expected}, found major type {found}")]
    UnexpectedType {
        /// Description of what the surrounding item required.
        expected: &'static str,
        /// The major type actually read.
        found: u8,
    },
    /// A break marker appeared with no indefinite-length container open.
    #[error("break marker outside an indefinite-length container")]
    UnexpectedBreak,
    /// A simple value with no JSON rendering.
    #[error("unsupported simple value {0}")]
    UnsupportedSimple(u8),
    /// A tag number outside the recognized registry.
    #[error("unsupported tag {0}")]
    UnknownTag(u64),
    /// JSON has no encoding for NaN or the infinities.
    #[error("non-finite float has no JSON representation")]
    NonFiniteFloat,
    /// Integer magnitude does not fit the signed 64-bit decode target.
    #[error("integer magnitude exceeds the signed 64-bit range")]
    IntegerOverflow,
    /// A tag 260/261 address payload of a length other than 4, 6 or 16.
    #[error("network address must be 4, 6 or 16 bytes, found {0}")]
    BadAddressLength(usize),
    /// A tag 261 payload which is not a 1-entry map of address to length.
    #[error("network prefix is not a single-entry map of address to prefix length")]
    MalformedPrefix,
    /// A tag 1 payload outside the representable time range.
    #[error("timestamp out of range")]
    BadTimestamp,
    /// A tag 263 payload which does not parse as JSON (in-memory decoding only;
    /// the streaming transcoder splices the payload verbatim).
    #[error("embedded JSON payload does not parse: {0}")]
    BadEmbeddedJson(#[from] serde_json::Error),
    /// Containers nested beyond the supported depth.
    #[error("containers nested deeper than {0} levels")]
    NestingTooDeep(usize),
    /// Reading the source or writing the sink failed.
    #[error(transparent)]
    Io(#[from] io::Error),
}
