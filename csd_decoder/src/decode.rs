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
 * csd_decoder CBOR to JSON transcoder
 *
 * The streaming core: a recursive, single-pass decoder over the CBOR major type taxonomy which
 * renders each top-level item as minified JSON text. Bytes flow strictly forward from the
 * [`StreamReader`] into the sink; nothing is buffered beyond the current string payload and the
 * rendering of map keys.
 **************************************************************************************************/
use std::io::{Read, Write};

use chrono_tz::Tz;
use half::f16;

use crate::constants::*;
use crate::error::{DecodeError, Result};
use crate::reader::StreamReader;

/***************************************************************************************************
 * Item header parsing
 **************************************************************************************************/

/// Length declared by a string, array or map header.
pub(crate) enum Length {
    Definite(u64),
    Indefinite,
}

/// Read one initial byte and split it into major type and additional information.
#[inline]
pub(crate) fn read_header<R: Read>(src: &mut StreamReader<R>) -> Result<(u8, u8)> {
    let byte = src.read_u8()?;
    Ok((byte >> 5, byte & AI_MASK))
}

/// Read the unsigned value implied by the additional information bits: either the bits
/// themselves, or 1/2/4/8 trailing big-endian bytes.
pub(crate) fn read_uint_value<R: Read>(src: &mut StreamReader<R>, ai: u8) -> Result<u64> {
    match ai {
        0..=23 => Ok(u64::from(ai)),
        AI_ONE_BYTE => Ok(u64::from(src.read_u8()?)),
        AI_TWO_BYTES => {
            let mut bytes = [0u8; 2];
            src.read_into(&mut bytes)?;
            Ok(u64::from(u16::from_be_bytes(bytes)))
        }
        AI_FOUR_BYTES => {
            let mut bytes = [0u8; 4];
            src.read_into(&mut bytes)?;
            Ok(u64::from(u32::from_be_bytes(bytes)))
        }
        AI_EIGHT_BYTES => {
            let mut bytes = [0u8; 8];
            src.read_into(&mut bytes)?;
            Ok(u64::from_be_bytes(bytes))
        }
        AI_INDEFINITE => Err(DecodeError::UnexpectedIndefinite),
        reserved => Err(DecodeError::ReservedAdditional(reserved)),
    }
}

/// Read the declared length of a string, array or map.
pub(crate) fn read_length<R: Read>(src: &mut StreamReader<R>, ai: u8) -> Result<Length> {
    if ai == AI_INDEFINITE {
        Ok(Length::Indefinite)
    } else {
        Ok(Length::Definite(read_uint_value(src, ai)?))
    }
}

/***************************************************************************************************
 * Scalar decoding shared with the in-memory unmarshaler
 **************************************************************************************************/

/// Decode a major type 0/1 item into a signed 64-bit value. A negative item encodes -1 - N.
/// Magnitudes beyond `i64::MAX` have no representation in the decode target and fail.
pub(crate) fn integer_value<R: Read>(src: &mut StreamReader<R>, major: u8, ai: u8) -> Result<i64> {
    let magnitude = read_uint_value(src, ai)?;
    let magnitude = i64::try_from(magnitude).map_err(|_| DecodeError::IntegerOverflow)?;
    if major == MAJOR_NINT {
        Ok(-1 - magnitude)
    } else {
        Ok(magnitude)
    }
}

/// Decode a major type 7 float of any width into an `f64`.
pub(crate) fn float_value<R: Read>(src: &mut StreamReader<R>, ai: u8) -> Result<f64> {
    match ai {
        SIMPLE_F16 => Ok(f64::from(read_f16(src)?)),
        SIMPLE_F32 => Ok(f64::from(read_f32(src)?)),
        SIMPLE_F64 => read_f64(src),
        other => Err(DecodeError::UnsupportedSimple(other)),
    }
}

fn read_f16<R: Read>(src: &mut StreamReader<R>) -> Result<f32> {
    let mut bytes = [0u8; 2];
    src.read_into(&mut bytes)?;
    Ok(f16::from_be_bytes(bytes).to_f32())
}

fn read_f32<R: Read>(src: &mut StreamReader<R>) -> Result<f32> {
    let mut bytes = [0u8; 4];
    src.read_into(&mut bytes)?;
    Ok(f32::from_be_bytes(bytes))
}

fn read_f64<R: Read>(src: &mut StreamReader<R>) -> Result<f64> {
    let mut bytes = [0u8; 8];
    src.read_into(&mut bytes)?;
    Ok(f64::from_be_bytes(bytes))
}

/// Read a complete `bstr`/`tstr` payload into an owned buffer. The item header has not been
/// consumed yet.
pub(crate) fn read_string_payload<R: Read>(src: &mut StreamReader<R>) -> Result<Vec<u8>> {
    let (major, ai) = read_header(src)?;
    read_string_payload_of(src, major, ai)
}

/// Read the payload of a `bstr`/`tstr` whose header (`major`, `ai`) was already consumed.
///
/// A definite length reads exactly N bytes. An indefinite length concatenates definite-length
/// chunks of the same major type until the break marker; a chunk of any other shape is an error.
pub(crate) fn read_string_payload_of<R: Read>(
    src: &mut StreamReader<R>,
    major: u8,
    ai: u8,
) -> Result<Vec<u8>> {
    if major != MAJOR_BSTR && major != MAJOR_TSTR {
        return Err(DecodeError::UnexpectedType {
            expected: "byte or text string",
            found: major,
        });
    }
    match read_length(src, ai)? {
        Length::Definite(n) => src.read_exact_n(checked_len(n)?),
        Length::Indefinite => {
            let mut payload = Vec::new();
            loop {
                match src.peek_u8()? {
                    Some(BREAK_BYTE) => {
                        src.read_u8()?;
                        return Ok(payload);
                    }
                    Some(_) => {}
                    None => {
                        return Err(DecodeError::Truncated {
                            wanted: 1,
                            offset: src.offset(),
                        })
                    }
                }
                let (chunk_major, chunk_ai) = read_header(src)?;
                if chunk_major != major {
                    return Err(DecodeError::UnexpectedType {
                        expected: "string chunk of the enclosing major type",
                        found: chunk_major,
                    });
                }
                if chunk_ai == AI_INDEFINITE {
                    return Err(DecodeError::UnexpectedIndefinite);
                }
                let n = read_uint_value(src, chunk_ai)?;
                payload.extend_from_slice(&src.read_exact_n(checked_len(n)?)?);
            }
        }
    }
}

fn checked_len(n: u64) -> Result<usize> {
    usize::try_from(n).map_err(|_| DecodeError::IntegerOverflow)
}

/// Inside an open indefinite-length container: consume the break marker if it is next.
/// The stream ending here is a truncation, not a clean end of stream.
pub(crate) fn at_break<R: Read>(src: &mut StreamReader<R>) -> Result<bool> {
    match src.peek_u8()? {
        Some(BREAK_BYTE) => {
            src.read_u8()?;
            Ok(true)
        }
        Some(_) => Ok(false),
        None => Err(DecodeError::Truncated {
            wanted: 1,
            offset: src.offset(),
        }),
    }
}

/***************************************************************************************************
 * JSON text rendering
 **************************************************************************************************/

/// JSON-escape `bytes` into `out`, without the surrounding quotes.
///
/// Control characters take their short escapes where JSON defines one and `\u00xx` otherwise;
/// every byte from 0x20 upward passes through verbatim, including multi-byte UTF-8 sequences.
pub(crate) fn escape_json(bytes: &[u8], out: &mut dyn Write) -> Result<()> {
    for &b in bytes {
        match b {
            b'"' => out.write_all(b"\\\"")?,
            b'\\' => out.write_all(b"\\\\")?,
            b'\n' => out.write_all(b"\\n")?,
            b'\r' => out.write_all(b"\\r")?,
            b'\t' => out.write_all(b"\\t")?,
            0x08 => out.write_all(b"\\b")?,
            0x0c => out.write_all(b"\\f")?,
            0x00..=0x1f => {
                let escaped = [
                    b'\\',
                    b'u',
                    b'0',
                    b'0',
                    HEX_DIGITS[usize::from(b >> 4)],
                    HEX_DIGITS[usize::from(b & 0x0f)],
                ];
                out.write_all(&escaped)?;
            }
            _ => out.write_all(&[b])?,
        }
    }
    Ok(())
}

fn float32_to_json(out: &mut dyn Write, value: f32) -> Result<()> {
    if !value.is_finite() {
        return Err(DecodeError::NonFiniteFloat);
    }
    write!(out, "{}", value)?;
    Ok(())
}

fn float64_to_json(out: &mut dyn Write, value: f64) -> Result<()> {
    if !value.is_finite() {
        return Err(DecodeError::NonFiniteFloat);
    }
    write!(out, "{}", value)?;
    Ok(())
}

/***************************************************************************************************
 * The transcoder
 **************************************************************************************************/

/// Streaming CBOR to JSON transcoder.
///
/// One instance carries the render configuration (currently the timestamp timezone) and may be
/// reused across any number of streams. Decoding holds no other state; everything else lives in
/// the [`StreamReader`] passed to each call.
///
/// ## Example
///
/// ```
/// use csd_decoder::decoder::{StreamReader, Transcoder};
///
/// let cbor = [0x83u8, 0x01, 0x02, 0x03];
/// let mut src = StreamReader::new(cbor.as_slice());
/// let mut json = Vec::new();
/// Transcoder::new().transcode_one(&mut src, &mut json).unwrap();
/// assert_eq!(json, b"[1,2,3]");
/// ```
pub struct Transcoder {
    tz: Tz,
}

impl Default for Transcoder {
    fn default() -> Self {
        Transcoder::new()
    }
}

impl Transcoder {
    /// Construct a transcoder rendering timestamps in UTC.
    pub fn new() -> Transcoder {
        Transcoder { tz: Tz::UTC }
    }

    /// Construct a transcoder rendering timestamps in the given timezone.
    pub fn with_timezone(tz: Tz) -> Transcoder {
        Transcoder { tz }
    }

    /// The timezone used to render epoch timestamps.
    pub fn timezone(&self) -> Tz {
        self.tz
    }

    /// Transcode every item in `src` into `out`, one line of minified JSON per top-level item.
    ///
    /// The sink is flushed after each record so that a consumer tailing the output sees records
    /// as they decode. Stops cleanly when the source ends on an item boundary; ending anywhere
    /// else, or any malformed item, aborts with the first error and writes nothing further.
    pub fn transcode_stream<R: Read>(
        &self,
        src: &mut StreamReader<R>,
        out: &mut dyn Write,
    ) -> Result<()> {
        while src.peek_u8()?.is_some() {
            self.transcode_one(src, out)?;
            out.write_all(b"\n")?;
            out.flush()?;
        }
        Ok(())
    }

    /// Transcode a single complete item from `src` into `out`, with no trailing newline.
    pub fn transcode_one<R: Read>(
        &self,
        src: &mut StreamReader<R>,
        out: &mut dyn Write,
    ) -> Result<()> {
        self.item_to_json(src, out, 0)
    }

    /// Transcode one item of any major type. This is the recursion point for containers.
    pub(crate) fn item_to_json<R: Read>(
        &self,
        src: &mut StreamReader<R>,
        out: &mut dyn Write,
        depth: usize,
    ) -> Result<()> {
        if depth > MAX_NESTING {
            return Err(DecodeError::NestingTooDeep(MAX_NESTING));
        }
        let (major, ai) = read_header(src)?;
        match major {
            MAJOR_UINT | MAJOR_NINT => {
                let value = integer_value(src, major, ai)?;
                write!(out, "{}", value)?;
                Ok(())
            }
            MAJOR_BSTR | MAJOR_TSTR => self.string_to_json(src, out, major, ai),
            MAJOR_ARRAY => self.array_to_json(src, out, ai, depth),
            MAJOR_MAP => self.map_to_json(src, out, ai, depth),
            MAJOR_TAG => self.tag_to_json(src, out, ai),
            // Major type 7: simple values and floats.
            _ => self.simple_to_json(src, out, ai),
        }
    }

    /// Byte strings and UTF-8 strings render identically: quoted, JSON-escaped payload bytes.
    /// Binary data needing a text-safe form is expected to arrive under tag 262 instead.
    fn string_to_json<R: Read>(
        &self,
        src: &mut StreamReader<R>,
        out: &mut dyn Write,
        major: u8,
        ai: u8,
    ) -> Result<()> {
        let payload = read_string_payload_of(src, major, ai)?;
        out.write_all(b"\"")?;
        escape_json(&payload, out)?;
        out.write_all(b"\"")?;
        Ok(())
    }

    fn array_to_json<R: Read>(
        &self,
        src: &mut StreamReader<R>,
        out: &mut dyn Write,
        ai: u8,
        depth: usize,
    ) -> Result<()> {
        out.write_all(b"[")?;
        match read_length(src, ai)? {
            Length::Definite(count) => {
                for i in 0..count {
                    if i > 0 {
                        out.write_all(b",")?;
                    }
                    self.item_to_json(src, out, depth + 1)?;
                }
            }
            Length::Indefinite => {
                let mut first = true;
                while !at_break(src)? {
                    if !first {
                        out.write_all(b",")?;
                    }
                    first = false;
                    self.item_to_json(src, out, depth + 1)?;
                }
            }
        }
        out.write_all(b"]")?;
        Ok(())
    }

    fn map_to_json<R: Read>(
        &self,
        src: &mut StreamReader<R>,
        out: &mut dyn Write,
        ai: u8,
        depth: usize,
    ) -> Result<()> {
        out.write_all(b"{")?;
        match read_length(src, ai)? {
            Length::Definite(count) => {
                for i in 0..count {
                    if i > 0 {
                        out.write_all(b",")?;
                    }
                    self.key_to_json(src, out, depth + 1)?;
                    out.write_all(b":")?;
                    self.item_to_json(src, out, depth + 1)?;
                }
            }
            Length::Indefinite => {
                let mut first = true;
                while !at_break(src)? {
                    if !first {
                        out.write_all(b",")?;
                    }
                    first = false;
                    self.key_to_json(src, out, depth + 1)?;
                    out.write_all(b":")?;
                    self.item_to_json(src, out, depth + 1)?;
                }
            }
        }
        out.write_all(b"}")?;
        Ok(())
    }

    /// Map keys must land in the output as JSON strings. A key which is already a string renders
    /// as-is; any other item is rendered through the value path and quoted after the fact.
    fn key_to_json<R: Read>(
        &self,
        src: &mut StreamReader<R>,
        out: &mut dyn Write,
        depth: usize,
    ) -> Result<()> {
        let mut rendered = Vec::new();
        self.item_to_json(src, &mut rendered, depth)?;
        if rendered.first() == Some(&b'"') {
            out.write_all(&rendered)?;
        } else {
            out.write_all(b"\"")?;
            out.write_all(&rendered)?;
            out.write_all(b"\"")?;
        }
        Ok(())
    }

    fn simple_to_json<R: Read>(
        &self,
        src: &mut StreamReader<R>,
        out: &mut dyn Write,
        ai: u8,
    ) -> Result<()> {
        match ai {
            SIMPLE_FALSE => out.write_all(b"false")?,
            SIMPLE_TRUE => out.write_all(b"true")?,
            SIMPLE_NULL => out.write_all(b"null")?,
            SIMPLE_F16 => float32_to_json(out, read_f16(src)?)?,
            SIMPLE_F32 => float32_to_json(out, read_f32(src)?)?,
            SIMPLE_F64 => float64_to_json(out, read_f64(src)?)?,
            SIMPLE_BREAK => return Err(DecodeError::UnexpectedBreak),
            other => return Err(DecodeError::UnsupportedSimple(other)),
        }
        Ok(())
    }
}
