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
 * csd_decoder CBOR tag registry
 *
 * The semantic tags recognized in log streams, and their renderings. Both the streaming
 * transcoder and the in-memory unmarshaler dispatch through [`SemanticTag`]; the formatting
 * helpers below are the single source of each rendering.
 **************************************************************************************************/
use std::convert::TryFrom;
use std::io::{Read, Write};
use std::net::{Ipv4Addr, Ipv6Addr};

use chrono::{LocalResult, SecondsFormat, TimeZone};
use chrono_tz::Tz;

use crate::constants::*;
use crate::decode::{
    float_value, integer_value, read_header, read_length, read_string_payload,
    read_string_payload_of, read_uint_value, Length, Transcoder,
};
use crate::error::{DecodeError, Result};
use crate::reader::StreamReader;

/// The tag numbers this decoder gives a JSON rendering. Anything else on the wire is a decode
/// error; there is no pass-through for unrecognized tags.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum SemanticTag {
    /// Tag 1: POSIX epoch timestamp, integer or fractional seconds.
    EpochTimestamp,
    /// Tag 260: network address octets (IPv4, MAC or IPv6, by length).
    NetworkAddress,
    /// Tag 261: network prefix, a 1-entry map of address octets to prefix length.
    NetworkPrefix,
    /// Tag 262: byte string rendered as lowercase hex pairs.
    HexString,
    /// Tag 263: byte string holding a pre-rendered JSON document.
    EmbeddedJson,
}

impl TryFrom<u64> for SemanticTag {
    type Error = DecodeError;

    fn try_from(tag: u64) -> Result<SemanticTag> {
        match tag {
            1 => Ok(SemanticTag::EpochTimestamp),
            260 => Ok(SemanticTag::NetworkAddress),
            261 => Ok(SemanticTag::NetworkPrefix),
            262 => Ok(SemanticTag::HexString),
            263 => Ok(SemanticTag::EmbeddedJson),
            other => Err(DecodeError::UnknownTag(other)),
        }
    }
}

/***************************************************************************************************
 * Tag payload decoding
 **************************************************************************************************/

/// Decoded payload of a tag 1 item, preserving whether the producer sent whole or fractional
/// seconds.
#[derive(Debug, Copy, Clone, PartialEq)]
pub(crate) enum Epoch {
    Seconds(i64),
    Fractional(f64),
}

/// Read a tag 1 payload. The payload is an integer (major 0/1) or a float (major 7); anything
/// else is malformed.
pub(crate) fn read_epoch<R: Read>(src: &mut StreamReader<R>) -> Result<Epoch> {
    let byte = match src.peek_u8()? {
        Some(byte) => byte,
        None => {
            return Err(DecodeError::Truncated {
                wanted: 1,
                offset: src.offset(),
            })
        }
    };
    match byte >> 5 {
        MAJOR_UINT | MAJOR_NINT => {
            let (major, ai) = read_header(src)?;
            Ok(Epoch::Seconds(integer_value(src, major, ai)?))
        }
        MAJOR_SIMPLE => {
            let (_, ai) = read_header(src)?;
            Ok(Epoch::Fractional(float_value(src, ai)?))
        }
        other => Err(DecodeError::UnexpectedType {
            expected: "epoch seconds (integer or float)",
            found: other,
        }),
    }
}

/// Read a tag 261 payload: a 1-entry map whose key is the address octets and whose value is an
/// unsigned prefix length.
pub(crate) fn read_prefix<R: Read>(src: &mut StreamReader<R>) -> Result<(Vec<u8>, u64)> {
    let (major, ai) = read_header(src)?;
    if major != MAJOR_MAP {
        return Err(DecodeError::MalformedPrefix);
    }
    match read_length(src, ai)? {
        Length::Definite(1) => {}
        _ => return Err(DecodeError::MalformedPrefix),
    }
    let octets = read_string_payload(src)?;
    let (value_major, value_ai) = read_header(src)?;
    if value_major != MAJOR_UINT {
        return Err(DecodeError::MalformedPrefix);
    }
    let length = read_uint_value(src, value_ai)?;
    Ok((octets, length))
}

/// Read a tag 263 payload. Unlike the other string-carrying tags this one requires a byte
/// string; the bytes are already a rendered JSON document.
pub(crate) fn read_embedded_json<R: Read>(src: &mut StreamReader<R>) -> Result<Vec<u8>> {
    let (major, ai) = read_header(src)?;
    if major != MAJOR_BSTR {
        return Err(DecodeError::UnexpectedType {
            expected: "byte string of embedded JSON",
            found: major,
        });
    }
    read_string_payload_of(src, major, ai)
}

/***************************************************************************************************
 * Rendering
 **************************************************************************************************/

/// Render an epoch as RFC 3339 in `tz`. Whole seconds render without a fractional part;
/// fractional seconds render with microsecond precision.
pub(crate) fn format_epoch(tz: Tz, epoch: Epoch) -> Result<String> {
    match epoch {
        Epoch::Seconds(secs) => match tz.timestamp_opt(secs, 0) {
            LocalResult::Single(dt) => Ok(dt.to_rfc3339_opts(SecondsFormat::Secs, true)),
            _ => Err(DecodeError::BadTimestamp),
        },
        Epoch::Fractional(value) => {
            if !value.is_finite() {
                return Err(DecodeError::NonFiniteFloat);
            }
            let mut secs = value.floor() as i64;
            let mut nanos = ((value - value.floor()) * 1e9).round() as u32;
            if nanos >= 1_000_000_000 {
                secs += 1;
                nanos -= 1_000_000_000;
            }
            match tz.timestamp_opt(secs, nanos) {
                LocalResult::Single(dt) => Ok(dt.to_rfc3339_opts(SecondsFormat::Micros, true)),
                _ => Err(DecodeError::BadTimestamp),
            }
        }
    }
}

/// Render address octets by length: 4 is an IPv4 dotted quad, 6 a colon-separated MAC, 16 a
/// canonical IPv6 with zero compression.
pub(crate) fn format_address(octets: &[u8]) -> Result<String> {
    match octets.len() {
        4 => {
            let quad: [u8; 4] = octets.try_into().map_err(|_| DecodeError::BadAddressLength(octets.len()))?;
            Ok(Ipv4Addr::from(quad).to_string())
        }
        6 => {
            let mut mac = String::with_capacity(17);
            for (i, &b) in octets.iter().enumerate() {
                if i > 0 {
                    mac.push(':');
                }
                mac.push(HEX_DIGITS[usize::from(b >> 4)] as char);
                mac.push(HEX_DIGITS[usize::from(b & 0x0f)] as char);
            }
            Ok(mac)
        }
        16 => {
            let groups: [u8; 16] = octets.try_into().map_err(|_| DecodeError::BadAddressLength(octets.len()))?;
            Ok(Ipv6Addr::from(groups).to_string())
        }
        other => Err(DecodeError::BadAddressLength(other)),
    }
}

/// Render a network prefix as `ADDR/LEN`.
pub(crate) fn format_prefix(octets: &[u8], length: u64) -> Result<String> {
    Ok(format!("{}/{}", format_address(octets)?, length))
}

/// Render bytes as lowercase hex pairs.
pub(crate) fn hex_string(bytes: &[u8]) -> String {
    let mut rendered = String::with_capacity(bytes.len() * 2);
    for &b in bytes {
        rendered.push(HEX_DIGITS[usize::from(b >> 4)] as char);
        rendered.push(HEX_DIGITS[usize::from(b & 0x0f)] as char);
    }
    rendered
}

/***************************************************************************************************
 * Streaming dispatch
 **************************************************************************************************/

impl Transcoder {
    /// Transcode a tagged item: read the tag number, dispatch to the typed handler, render.
    /// The tag's additional information bits have already been split from the initial byte.
    pub(crate) fn tag_to_json<R: Read>(
        &self,
        src: &mut StreamReader<R>,
        out: &mut dyn Write,
        ai: u8,
    ) -> Result<()> {
        let number = read_uint_value(src, ai)?;
        match SemanticTag::try_from(number)? {
            SemanticTag::EpochTimestamp => {
                let epoch = read_epoch(src)?;
                write_quoted(out, &format_epoch(self.timezone(), epoch)?)
            }
            SemanticTag::NetworkAddress => {
                let octets = read_string_payload(src)?;
                write_quoted(out, &format_address(&octets)?)
            }
            SemanticTag::NetworkPrefix => {
                let (octets, length) = read_prefix(src)?;
                write_quoted(out, &format_prefix(&octets, length)?)
            }
            SemanticTag::HexString => {
                let bytes = read_string_payload(src)?;
                write_quoted(out, &hex_string(&bytes))
            }
            SemanticTag::EmbeddedJson => {
                // The payload is a document some producer already rendered; splice it without
                // re-parsing.
                let document = read_embedded_json(src)?;
                out.write_all(&document)?;
                Ok(())
            }
        }
    }
}

fn write_quoted(out: &mut dyn Write, rendered: &str) -> Result<()> {
    out.write_all(b"\"")?;
    out.write_all(rendered.as_bytes())?;
    out.write_all(b"\"")?;
    Ok(())
}
