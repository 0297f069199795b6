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
 * csd_decoder in-memory unmarshaler
 *
 * The in-memory twin of the streaming transcoder: the same token machinery and tag registry, but
 * each top-level item becomes a `serde_json::Value` instead of rendered text. Map entries keep
 * their wire order (`serde_json` with `preserve_order`).
 **************************************************************************************************/
use std::convert::TryFrom;
use std::io::Read;

use chrono_tz::Tz;
use serde_json::{Map, Number, Value};

use crate::constants::*;
use crate::decode::{
    at_break, float_value, integer_value, read_header, read_length, read_string_payload,
    read_string_payload_of, read_uint_value, Length,
};
use crate::error::{DecodeError, Result};
use crate::reader::StreamReader;
use crate::tag::{
    format_address, format_epoch, format_prefix, hex_string, read_embedded_json, read_epoch,
    read_prefix, SemanticTag,
};

/// Decoder producing one native JSON value per CBOR record.
///
/// ## Example
///
/// ```
/// use csd_decoder::decoder::{StreamReader, Unmarshaler};
///
/// let cbor = [0xa1u8, 0x61, 0x61, 0x01];
/// let mut src = StreamReader::new(cbor.as_slice());
/// let record = Unmarshaler::new().unmarshal_one(&mut src).unwrap();
/// assert_eq!(record["a"], 1);
/// ```
pub struct Unmarshaler {
    tz: Tz,
}

impl Default for Unmarshaler {
    fn default() -> Self {
        Unmarshaler::new()
    }
}

impl Unmarshaler {
    /// Construct an unmarshaler rendering timestamps in UTC.
    pub fn new() -> Unmarshaler {
        Unmarshaler { tz: Tz::UTC }
    }

    /// Construct an unmarshaler rendering timestamps in the given timezone.
    pub fn with_timezone(tz: Tz) -> Unmarshaler {
        Unmarshaler { tz }
    }

    /// Decode every item in `src`, one value per top-level item, stopping cleanly at end of
    /// stream on an item boundary.
    pub fn unmarshal_stream<R: Read>(&self, src: &mut StreamReader<R>) -> Result<Vec<Value>> {
        let mut records = Vec::new();
        while src.peek_u8()?.is_some() {
            records.push(self.unmarshal_one(src)?);
        }
        Ok(records)
    }

    /// Decode a single complete item from `src`.
    pub fn unmarshal_one<R: Read>(&self, src: &mut StreamReader<R>) -> Result<Value> {
        self.item_value(src, 0)
    }

    fn item_value<R: Read>(&self, src: &mut StreamReader<R>, depth: usize) -> Result<Value> {
        if depth > MAX_NESTING {
            return Err(DecodeError::NestingTooDeep(MAX_NESTING));
        }
        let (major, ai) = read_header(src)?;
        match major {
            MAJOR_UINT | MAJOR_NINT => Ok(Value::from(integer_value(src, major, ai)?)),
            MAJOR_BSTR | MAJOR_TSTR => {
                let payload = read_string_payload_of(src, major, ai)?;
                Ok(Value::String(
                    String::from_utf8_lossy(&payload).into_owned(),
                ))
            }
            MAJOR_ARRAY => self.array_value(src, ai, depth),
            MAJOR_MAP => self.map_value(src, ai, depth),
            MAJOR_TAG => self.tag_value(src, ai),
            // Major type 7: simple values and floats.
            _ => self.simple_value(src, ai),
        }
    }

    fn array_value<R: Read>(
        &self,
        src: &mut StreamReader<R>,
        ai: u8,
        depth: usize,
    ) -> Result<Value> {
        let mut items = Vec::new();
        match read_length(src, ai)? {
            Length::Definite(count) => {
                for _ in 0..count {
                    items.push(self.item_value(src, depth + 1)?);
                }
            }
            Length::Indefinite => {
                while !at_break(src)? {
                    items.push(self.item_value(src, depth + 1)?);
                }
            }
        }
        Ok(Value::Array(items))
    }

    fn map_value<R: Read>(
        &self,
        src: &mut StreamReader<R>,
        ai: u8,
        depth: usize,
    ) -> Result<Value> {
        let mut entries = Map::new();
        match read_length(src, ai)? {
            Length::Definite(count) => {
                for _ in 0..count {
                    let key = self.key_value(src, depth + 1)?;
                    let value = self.item_value(src, depth + 1)?;
                    entries.insert(key, value);
                }
            }
            Length::Indefinite => {
                while !at_break(src)? {
                    let key = self.key_value(src, depth + 1)?;
                    let value = self.item_value(src, depth + 1)?;
                    entries.insert(key, value);
                }
            }
        }
        Ok(Value::Object(entries))
    }

    /// Map keys are strings in the output; a non-string key becomes its compact JSON text,
    /// matching what the streaming transcoder emits.
    fn key_value<R: Read>(&self, src: &mut StreamReader<R>, depth: usize) -> Result<String> {
        match self.item_value(src, depth)? {
            Value::String(key) => Ok(key),
            other => Ok(other.to_string()),
        }
    }

    fn simple_value<R: Read>(&self, src: &mut StreamReader<R>, ai: u8) -> Result<Value> {
        match ai {
            SIMPLE_FALSE => Ok(Value::Bool(false)),
            SIMPLE_TRUE => Ok(Value::Bool(true)),
            SIMPLE_NULL => Ok(Value::Null),
            SIMPLE_F16 | SIMPLE_F32 | SIMPLE_F64 => {
                let value = float_value(src, ai)?;
                match Number::from_f64(value) {
                    Some(number) => Ok(Value::Number(number)),
                    None => Err(DecodeError::NonFiniteFloat),
                }
            }
            SIMPLE_BREAK => Err(DecodeError::UnexpectedBreak),
            other => Err(DecodeError::UnsupportedSimple(other)),
        }
    }

    fn tag_value<R: Read>(&self, src: &mut StreamReader<R>, ai: u8) -> Result<Value> {
        let number = read_uint_value(src, ai)?;
        match SemanticTag::try_from(number)? {
            SemanticTag::EpochTimestamp => {
                let epoch = read_epoch(src)?;
                Ok(Value::String(format_epoch(self.tz, epoch)?))
            }
            SemanticTag::NetworkAddress => {
                let octets = read_string_payload(src)?;
                Ok(Value::String(format_address(&octets)?))
            }
            SemanticTag::NetworkPrefix => {
                let (octets, length) = read_prefix(src)?;
                Ok(Value::String(format_prefix(&octets, length)?))
            }
            SemanticTag::HexString => {
                let bytes = read_string_payload(src)?;
                Ok(Value::String(hex_string(&bytes)))
            }
            SemanticTag::EmbeddedJson => {
                let document = read_embedded_json(src)?;
                Ok(serde_json::from_slice(&document)?)
            }
        }
    }
}
