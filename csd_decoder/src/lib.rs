/***************************************************************************************************
 * Copyright (c) 2023, 2024 Qualcomm Innovation Center, Inc. All rights reserved.
 *
 * Permission is hereby granted, free of charge, to any person obtaining a copy of this software
 * and associated documentation files (the “Software”), to deal in the Software without
 * restriction, including without limitation the rights to use, copy, modify, merge, publish,
 * distribute, sublicense, and/or sell copies of the Software, and to permit persons to whom the
 * Software is furnished to do so, subject to the following conditions:
 *
 * The above copyright notice and this permission notice (including the next
 * paragraph) shall be included in all copies or substantial portions of the
 * Software.
 *
 * THE SOFTWARE IS PROVIDED “AS IS”, WITHOUT WARRANTY OF ANY KIND, EXPRESS OR IMPLIED, INCLUDING
 * BUT NOT LIMITED TO THE WARRANTIES OF MERCHANTABILITY, FITNESS FOR A PARTICULAR PURPOSE AND
 * NONINFRINGEMENT. IN NO EVENT SHALL THE AUTHORS OR COPYRIGHT HOLDERS BE LIABLE FOR ANY CLAIM,
 * DAMAGES OR OTHER LIABILITY, WHETHER IN AN ACTION OF CONTRACT, TORT OR OTHERWISE, ARISING FROM,
 * OUT OF OR IN CONNECTION WITH THE SOFTWARE OR THE USE OR OTHER DEALINGS IN THE SOFTWARE.
 **************************************************************************************************/
/***************************************************************************************************
 * csd_decoder module definition
 *
 * A streaming decoder which reads a sequence of self-delimited CBOR items (RFC8949) from a byte
 * source and renders each of them as one line of minified JSON text.
 **************************************************************************************************/

#![warn(missing_docs)]

//! # CSD_DECODER
//!
//! The `csd_decoder` crate decodes binary log streams encoded as a CBOR sequence
//! ([RFC 8949](https://datatracker.ietf.org/doc/rfc8949/)) into line-delimited JSON, so that
//! structured binary logs can be piped through conventional text tooling. The typical producer is
//! a structured logging library writing one CBOR map per log event; the decoder turns each
//! top-level item into exactly one JSON record terminated by a newline.
//!
//! Decoding is single-pass and strictly forward: items are read from any [`std::io::Read`]
//! implementation through a [`decoder::StreamReader`] and rendered directly into any
//! [`std::io::Write`] sink. Peak memory is bounded by the deepest nesting level and the largest
//! single string payload, so arbitrarily long streams (including streams that never end, such as
//! a tailed log file) decode in constant space.
//!
//! ## Features
//!
//! - All CBOR major types: positive and negative integers, `bstr`, `tstr`, arrays, maps, tags
//!   and the simple/float space, including `f16` values.
//! - Indefinite-length strings, arrays and maps, terminated by the break marker.
//! - A curated tag registry for log payloads: epoch timestamps (tag 1), network addresses
//!   (tag 260), network prefixes (tag 261), hex-rendered binary blobs (tag 262) and embedded
//!   pre-rendered JSON (tag 263).
//! - Map keys appear in the JSON output in the order they were encountered on the wire.
//! - Timestamps render in a configurable IANA timezone, UTC by default.
//! - An in-memory variant, [`decoder::Unmarshaler`], which produces a [`serde_json::Value`] per
//!   record instead of text.
//!
//! Malformed input fails fast: the first truncated, reserved or unsupported encoding aborts the
//! stream with a [`error::DecodeError`] and nothing further is written to the sink.
//!
//! ## Example
//!
//! ```
//! use csd_decoder::decoder::{StreamReader, Transcoder};
//!
//! fn main() -> Result<(), csd_decoder::error::DecodeError> {
//!     // {"IETF": -1, "Array": [-1, 0, 200, 20]} as an indefinite-length CBOR map.
//!     let cbor: &[u8] = &[
//!         0xbf, 0x64, 0x49, 0x45, 0x54, 0x46, 0x20, 0x65, 0x41, 0x72, 0x72, 0x61, 0x79, 0x9f,
//!         0x20, 0x00, 0x18, 0xc8, 0x14, 0xff, 0xff,
//!     ];
//!
//!     let mut src = StreamReader::new(cbor);
//!     let mut json = Vec::new();
//!     Transcoder::new().transcode_stream(&mut src, &mut json)?;
//!
//!     assert_eq!(
//!         String::from_utf8(json).unwrap(),
//!         "{\"IETF\":-1,\"Array\":[-1,0,200,20]}\n"
//!     );
//!     Ok(())
//! }
//! ```

pub(crate) mod constants;
mod decode;
mod reader;
mod tag;
mod unmarshal;

/// The `error` module contains error definitions used throughout `csd_decoder`.
pub mod error;

/// The `decoder` module exports the types used to decode a CBOR byte stream: the
/// [`decoder::StreamReader`] byte source, the [`decoder::Transcoder`] which renders JSON text and
/// the [`decoder::Unmarshaler`] which builds in-memory values.
pub mod decoder {
    pub use super::decode::Transcoder;
    pub use super::reader::StreamReader;
    pub use super::tag::SemanticTag;
    pub use super::unmarshal::Unmarshaler;
}
