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
 * csd command line front end
 *
 * Wires a byte source (file or stdin, optionally zlib-compressed, optionally tailed) and a sink
 * (file or stdout) around the streaming transcoder. Exits zero on clean end of stream and
 * non-zero on the first decode or I/O error.
 **************************************************************************************************/
use std::fs::File;
use std::io::{self, BufWriter, Read, Write};
use std::process;

use anyhow::{anyhow, Context, Result};
use chrono_tz::Tz;
use clap::Parser;
use flate2::read::ZlibDecoder;
use tracing::{debug, error};

use csd_decoder::decoder::{StreamReader, Transcoder};

mod tail;
use tail::FollowReader;

/// Decode a stream of CBOR-encoded log records into line-delimited JSON.
#[derive(Parser)]
#[command(name = "csd", version, about)]
struct Args {
    /// Input file holding CBOR items; `-` reads standard input.
    #[arg(long = "in", value_name = "PATH", default_value = "-")]
    input: String,
    /// Output file for the decoded JSON (overwritten if present); `-` writes standard output.
    #[arg(long = "out", value_name = "PATH", default_value = "-")]
    output: String,
    /// Treat the input as a zlib-compressed stream.
    #[arg(short, long)]
    compress: bool,
    /// Keep polling the input file for appended records after end of file.
    #[arg(short, long)]
    follow: bool,
    /// IANA timezone used to render decoded timestamps.
    #[arg(long, value_name = "ZONE", default_value = "UTC")]
    timezone: String,
}

fn run(args: &Args) -> Result<()> {
    let tz: Tz = args
        .timezone
        .parse()
        .map_err(|e| anyhow!("unknown timezone {:?}: {}", args.timezone, e))?;

    let source: Box<dyn Read> = if args.input == "-" {
        Box::new(io::stdin())
    } else {
        let reader = FollowReader::open(&args.input, args.follow)
            .with_context(|| format!("cannot open {}", args.input))?;
        Box::new(reader)
    };
    let source: Box<dyn Read> = if args.compress {
        Box::new(ZlibDecoder::new(source))
    } else {
        source
    };

    let mut sink: Box<dyn Write> = if args.output == "-" {
        Box::new(io::stdout())
    } else {
        let file = File::create(&args.output)
            .with_context(|| format!("cannot create {}", args.output))?;
        Box::new(BufWriter::new(file))
    };

    debug!(input = %args.input, output = %args.output, timezone = %tz, "decoding");

    let mut src = StreamReader::new(source);
    Transcoder::with_timezone(tz)
        .transcode_stream(&mut src, &mut sink)
        .context("decode failed")?;
    sink.flush()?;
    Ok(())
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(io::stderr)
        .init();

    let args = Args::parse();
    if let Err(err) = run(&args) {
        error!("{:#}", err);
        process::exit(1);
    }
}
