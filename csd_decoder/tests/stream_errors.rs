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
 * Failure-path test cases: truncated streams, reserved encodings, stray break markers,
 * unsupported values and the no-output-after-error guarantee.
 **************************************************************************************************/

use csd_decoder::decoder::{StreamReader, Transcoder};
use csd_decoder::error::DecodeError;

/// Run the whole-stream driver, returning everything written plus the terminating result.
fn transcode_stream(bytes: &[u8]) -> (String, Result<(), DecodeError>) {
    let mut src = StreamReader::new(bytes);
    let mut out = Vec::new();
    let result = Transcoder::new().transcode_stream(&mut src, &mut out);
    (String::from_utf8(out).unwrap(), result)
}

fn transcode_err(bytes: &[u8]) -> DecodeError {
    let (_, result) = transcode_stream(bytes);
    result.expect_err("decode unexpectedly succeeded")
}

#[test]
fn truncated_streams_report_the_wanted_count() {
    // A definite map whose 2-byte length field swallows the would-be key bytes; decoding
    // eventually asks for an 18-byte string the stream cannot supply
    match transcode_err(b"\xb9\x64IETF\x20\x65Array\x9f\x20\x00\x18\xc8\x14") {
        DecodeError::Truncated { wanted, .. } => assert_eq!(wanted, 18),
        other => panic!("expected Truncated, got {:?}", other),
    }
    // A mid-map key whose declared length runs far past the end of the stream
    match transcode_err(b"\xbf\x14IETF\x20\x65Array\x9f\x20\x00\x18\xc8\x14") {
        DecodeError::Truncated { wanted, .. } => assert_eq!(wanted, 40736),
        other => panic!("expected Truncated, got {:?}", other),
    }
    // A string header alone, with none of its payload
    match transcode_err(b"\xbf\x64") {
        DecodeError::Truncated { wanted, .. } => assert_eq!(wanted, 4),
        other => panic!("expected Truncated, got {:?}", other),
    }
    // Streams ending with containers still open
    for bytes in [
        &b"\xbf\x64IETF\x20\x65Array\x9f\x20\x00\x18\xc8\x14"[..],
        &b"\xbf\x64IETF"[..],
        &b"\xbf\x64IETF\x20\x65Array"[..],
        &b"\x82\x01"[..],
        &b"\x9f\x01\x02"[..],
        &b"\x7f\x62ab"[..],
    ] {
        assert!(
            matches!(transcode_err(bytes), DecodeError::Truncated { .. }),
            "input {:02x?}",
            bytes
        );
    }
    // Fixed-width payloads cut short
    for (bytes, wanted) in [
        (&b"\x19\x01"[..], 2usize),
        (&b"\x1a\x00\x01"[..], 4),
        (&b"\x1b\x00"[..], 8),
        (&b"\xf9\x7c"[..], 2),
        (&b"\xfa\x00\x00"[..], 4),
        (&b"\xfb\x00\x00\x00\x00"[..], 8),
        (&b"\x62a"[..], 2),
    ] {
        match transcode_err(bytes) {
            DecodeError::Truncated { wanted: got, .. } => {
                assert_eq!(got, wanted, "input {:02x?}", bytes)
            }
            other => panic!("input {:02x?}: expected Truncated, got {:?}", bytes, other),
        }
    }
}

#[test]
fn truncation_reports_the_stream_offset() {
    // 0x62 declares a 2-byte string; one payload byte arrives before the end
    match transcode_err(b"\x62a") {
        DecodeError::Truncated { wanted, offset } => {
            assert_eq!(wanted, 2);
            assert_eq!(offset, 2);
        }
        other => panic!("expected Truncated, got {:?}", other),
    }
}

#[test]
fn reserved_additional_information_is_rejected() {
    for (bytes, value) in [
        (&b"\x1c"[..], 28u8),
        (&b"\x1d"[..], 29),
        (&b"\x1e"[..], 30),
        (&b"\x3c"[..], 28),
        (&b"\x5d"[..], 29),
        (&b"\x7e"[..], 30),
        (&b"\x9c"[..], 28),
        (&b"\xbd"[..], 29),
        (&b"\xde"[..], 30),
    ] {
        match transcode_err(bytes) {
            DecodeError::ReservedAdditional(ai) => assert_eq!(ai, value, "input {:02x?}", bytes),
            other => panic!("input {:02x?}: expected ReservedAdditional, got {:?}", bytes, other),
        }
    }
}

#[test]
fn indefinite_length_is_rejected_where_a_value_is_required() {
    // Integers and tag numbers have no indefinite form
    for bytes in [&b"\x1f"[..], &b"\x3f"[..], &b"\xdf\x00"[..]] {
        assert!(
            matches!(transcode_err(bytes), DecodeError::UnexpectedIndefinite),
            "input {:02x?}",
            bytes
        );
    }
    // An indefinite chunk inside an indefinite string
    assert!(matches!(
        transcode_err(b"\x7f\x7f\x61a\xff\xff"),
        DecodeError::UnexpectedIndefinite
    ));
}

#[test]
fn stray_break_markers_are_rejected() {
    // Top level
    assert!(matches!(transcode_err(b"\xff"), DecodeError::UnexpectedBreak));
    // Inside a definite-length array, which does not use the break protocol
    assert!(matches!(
        transcode_err(b"\x82\x01\xff"),
        DecodeError::UnexpectedBreak
    ));
}

#[test]
fn indefinite_string_chunks_must_match_the_enclosing_major_type() {
    // A byte-string chunk inside an indefinite text string
    assert!(matches!(
        transcode_err(b"\x7f\x42\x01\x02\xff"),
        DecodeError::UnexpectedType { .. }
    ));
    // A non-string item inside an indefinite byte string
    assert!(matches!(
        transcode_err(b"\x5f\x01\xff"),
        DecodeError::UnexpectedType { .. }
    ));
}

#[test]
fn unsupported_simple_values_are_rejected() {
    for (bytes, value) in [
        (&b"\xe0"[..], 0u8),
        (&b"\xf0"[..], 16),
        (&b"\xf7"[..], 23),
        (&b"\xf8\x20"[..], 24),
    ] {
        match transcode_err(bytes) {
            DecodeError::UnsupportedSimple(code) => assert_eq!(code, value, "input {:02x?}", bytes),
            other => panic!("input {:02x?}: expected UnsupportedSimple, got {:?}", bytes, other),
        }
    }
}

#[test]
fn non_finite_floats_are_rejected() {
    for bytes in [
        &b"\xf9\x7c\x00"[..],                         // +inf (half)
        &b"\xf9\xfc\x00"[..],                         // -inf (half)
        &b"\xf9\x7e\x00"[..],                         // NaN (half)
        &b"\xfa\x7f\x80\x00\x00"[..],                 // +inf (single)
        &b"\xfa\x7f\xc0\x00\x00"[..],                 // NaN (single)
        &b"\xfb\x7f\xf0\x00\x00\x00\x00\x00\x00"[..], // +inf (double)
        &b"\xfb\xff\xf0\x00\x00\x00\x00\x00\x00"[..], // -inf (double)
    ] {
        assert!(
            matches!(transcode_err(bytes), DecodeError::NonFiniteFloat),
            "input {:02x?}",
            bytes
        );
    }
}

#[test]
fn integers_beyond_the_signed_64_bit_range_are_rejected() {
    for bytes in [
        &b"\x1b\x80\x00\x00\x00\x00\x00\x00\x00"[..],
        &b"\x1b\xff\xff\xff\xff\xff\xff\xff\xff"[..],
        &b"\x3b\x80\x00\x00\x00\x00\x00\x00\x00"[..],
        &b"\x3b\xff\xff\xff\xff\xff\xff\xff\xff"[..],
    ] {
        assert!(
            matches!(transcode_err(bytes), DecodeError::IntegerOverflow),
            "input {:02x?}",
            bytes
        );
    }
    // The boundary values themselves decode
    let (json, result) = transcode_stream(b"\x1b\x7f\xff\xff\xff\xff\xff\xff\xff");
    assert!(result.is_ok());
    assert_eq!(json, "9223372036854775807\n");
    let (json, result) = transcode_stream(b"\x3b\x7f\xff\xff\xff\xff\xff\xff\xff");
    assert!(result.is_ok());
    assert_eq!(json, "-9223372036854775808\n");
}

#[test]
fn nesting_beyond_the_depth_limit_is_rejected() {
    let mut bytes = vec![0x81u8; 600];
    bytes.push(0x00);
    assert!(matches!(
        transcode_err(&bytes),
        DecodeError::NestingTooDeep(_)
    ));
    // A comfortably deep structure still decodes
    let mut bytes = vec![0x81u8; 100];
    bytes.push(0x00);
    let (_, result) = transcode_stream(&bytes);
    assert!(result.is_ok());
}

#[test]
fn no_output_follows_the_first_error() {
    // The first record decodes and is emitted; the stray break after it kills the stream
    // before the following well-formed map is touched
    let (json, result) = transcode_stream(b"\xa1\x61a\x01\xff\xa1\x61b\x02");
    assert!(matches!(result, Err(DecodeError::UnexpectedBreak)));
    assert_eq!(json, "{\"a\":1}\n");

    // Same for a record which closes its containers and then some
    let (json, result) =
        transcode_stream(b"\xbf\x64IETF\x20\x65Array\x9f\x20\x00\x18\xc8\xff\xff\xff");
    assert!(matches!(result, Err(DecodeError::UnexpectedBreak)));
    assert_eq!(json, "{\"IETF\":-1,\"Array\":[-1,0,200]}\n");
}
