// Rearrange Tool
// Copyright (c) 2024 The Project Rearrange Developers.
//
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

#![warn(rust_2018_idioms)]
#![forbid(unsafe_code)]

use std::fs::File;
use std::io::{self, BufReader, BufWriter, Read, Write};
use std::path::Path;

use rearrange_core::buffer::{PcmBuffer, Sink};
use rearrange_core::caps::{Caps, FrameFormat};
use rearrange_core::config::Config;
use rearrange_core::element::Rearrange;
use rearrange_core::errors::{Error, Result};
use rearrange_core::sample::SampleFormat;

use clap::parser::ValueSource;
use clap::{value_parser, Arg, ArgAction, ArgMatches, Command};
use log::{debug, error, info, warn};

mod sink;

use sink::WriterSink;

/// Read until `buf` is full or the end of the stream is reached. Returns the number of bytes read.
fn read_chunk<R: Read>(reader: &mut R, buf: &mut [u8]) -> io::Result<usize> {
    let mut len = 0;

    while len < buf.len() {
        match reader.read(&mut buf[len..]) {
            Ok(0) => break,
            Ok(n) => len += n,
            Err(err) if err.kind() == io::ErrorKind::Interrupted => continue,
            Err(err) => return Err(err),
        }
    }

    Ok(len)
}

fn open_input(path: &str) -> Result<Box<dyn Read>> {
    // If the path string is '-' then read from standard input.
    if path == "-" {
        Ok(Box::new(io::stdin().lock()))
    }
    else {
        Ok(Box::new(BufReader::new(File::open(Path::new(path))?)))
    }
}

fn open_output(path: &str) -> Result<Box<dyn Write>> {
    if path == "-" {
        Ok(Box::new(io::stdout().lock()))
    }
    else {
        Ok(Box::new(BufWriter::new(File::create(Path::new(path))?)))
    }
}

fn load_config(path: &str) -> Result<Config> {
    let file = File::open(Path::new(path))?;

    let config: Config = serde_json::from_reader(BufReader::new(file))
        .map_err(|err| Error::from(io::Error::from(err)))?;

    config.validate()?;
    Ok(config)
}

fn get_config(args: &ArgMatches) -> Result<Config> {
    if let Some(path) = args.get_one::<String>("config") {
        for name in ["channels", "pos"] {
            if args.value_source(name) == Some(ValueSource::CommandLine) {
                warn!("--{} is overridden by the configuration file", name);
            }
        }

        debug!("loading configuration from {}", path);
        return load_config(path);
    }

    // Both values are range checked by clap. Odd channel counts and the combination are not.
    let channels = *args.get_one::<u32>("channels").unwrap();
    let pos = *args.get_one::<u32>("pos").unwrap();

    Config::try_new(channels, pos)
}

fn get_input_caps(args: &ArgMatches) -> Caps {
    let sample_format = match args.get_one::<String>("format").map(|s| s.as_str()) {
        Some("f32") => SampleFormat::F32,
        Some("f64") => SampleFormat::F64,
        _ => SampleFormat::S16,
    };

    Caps::new()
        .with_encoding(sample_format.encoding())
        .with_width(sample_format.bits_per_sample())
        .with_channels(*args.get_one::<u32>("in-channels").unwrap())
        .with_rate(*args.get_one::<u32>("rate").unwrap())
}

/// Push whole-frame buffers read from `reader` through the element. Returns the number of input
/// bytes processed.
///
/// The length of `chunk` must be a multiple of `frame_bytes`. A partial frame at the end of the
/// stream is dropped.
fn rearrange_stream<R: Read, S: Sink>(
    element: &Rearrange,
    caps: &Caps,
    chunk: &mut [u8],
    frame_bytes: usize,
    reader: &mut R,
    sink: &mut S,
) -> Result<u64> {
    let mut n_in_bytes = 0u64;

    loop {
        let len = read_chunk(reader, chunk)?;
        let whole = len - len % frame_bytes;

        if whole < len {
            warn!("dropping {} trailing bytes of a partial frame", len - whole);
        }

        if whole == 0 {
            break;
        }

        let buf = PcmBuffer::new(&chunk[..whole], caps.clone());
        element.chain(&buf, sink)?;

        n_in_bytes += whole as u64;

        // Only the final read can be short.
        if len < chunk.len() {
            break;
        }
    }

    Ok(n_in_bytes)
}

fn run(args: &ArgMatches) -> Result<i32> {
    let input_path = args.get_one::<String>("INPUT").unwrap();
    let output_path = args.get_one::<String>("OUTPUT").unwrap();
    let is_quiet = args.get_flag("quiet");

    let element = Rearrange::new(get_config(args)?);

    let caps = get_input_caps(args);

    if !element.accept_caps(&caps) {
        return Err(Error::Unsupported("input format"));
    }

    let input_format = FrameFormat::try_from_caps(&caps)?;

    info!("input caps: {}", caps);
    info!("rearranging to {} channels at {}", element.channels(), element.placement());

    let frames = *args.get_one::<u32>("frames").unwrap() as usize;
    let mut chunk = vec![0u8; frames * input_format.bytes_per_frame()];

    let mut reader = open_input(input_path)?;
    let mut sink = WriterSink::new(open_output(output_path)?);

    let frame_bytes = input_format.bytes_per_frame();
    let n_in_bytes =
        rearrange_stream(&element, &caps, &mut chunk, frame_bytes, &mut reader, &mut sink)?;

    sink.flush()?;

    if !is_quiet {
        // Keep standard output clean if it carries the audio.
        let mut report: Box<dyn Write> =
            if output_path == "-" { Box::new(io::stderr()) } else { Box::new(io::stdout()) };

        writeln!(report, "Rearrange Results")?;
        writeln!(report, "=================================================")?;
        writeln!(report)?;
        writeln!(report, "  Buffers:       {:>12}", sink.n_buffers())?;
        writeln!(report, "  Input Bytes:   {:>12}", n_in_bytes)?;
        writeln!(report, "  Output Bytes:  {:>12}", sink.n_bytes())?;
        writeln!(report)?;
        writeln!(report, "  Input Caps:    {}", caps)?;

        if let Some(out_caps) = sink.caps() {
            writeln!(report, "  Output Caps:   {}", out_caps)?;
        }
    }

    Ok(0)
}

fn cli() -> Command {
    Command::new("Rearrange Tool")
        .version("1.0")
        .about("Route a mono or stereo raw PCM stream into one channel pair of a multichannel stream")
        .arg(
            Arg::new("format")
                .long("format")
                .short('f')
                .value_name("FORMAT")
                .value_parser(["s16", "f32", "f64"])
                .default_value("s16")
                .help("The sample format of the input"),
        )
        .arg(
            Arg::new("in-channels")
                .long("in-channels")
                .short('i')
                .value_name("COUNT")
                .value_parser(value_parser!(u32).range(1..=2))
                .default_value("2")
                .help("The channel count of the input"),
        )
        .arg(
            Arg::new("rate")
                .long("rate")
                .short('r')
                .value_name("HZ")
                .value_parser(value_parser!(u32).range(1..=i32::MAX as i64))
                .default_value("44100")
                .help("The sample rate of the input"),
        )
        .arg(
            Arg::new("channels")
                .long("channels")
                .short('c')
                .value_name("COUNT")
                .value_parser(value_parser!(u32).range(2..=8))
                .default_value("8")
                .help("The channel count of the output"),
        )
        .arg(
            Arg::new("pos")
                .long("pos")
                .short('p')
                .value_name("POS")
                .value_parser(value_parser!(u32).range(0..=3))
                .default_value("0")
                .help("Position of the signal (0: front, 1: rear, 2: center/lfe, 3: side)"),
        )
        .arg(
            Arg::new("frames")
                .long("frames")
                .value_name("FRAMES")
                .value_parser(value_parser!(u32).range(1..=65536))
                .default_value("1024")
                .help("The number of frames per buffer"),
        )
        .arg(
            Arg::new("config")
                .long("config")
                .value_name("FILE")
                .help("Read the channels and pos settings from a JSON file (overrides -c and -p)"),
        )
        .arg(
            Arg::new("quiet")
                .long("quiet")
                .short('q')
                .action(ArgAction::SetTrue)
                .help("Do not print results"),
        )
        .arg(
            Arg::new("INPUT")
                .help("The input file path, or - to use standard input")
                .required(true)
                .index(1),
        )
        .arg(
            Arg::new("OUTPUT")
                .help("The output file path, or - to use standard output")
                .required(true)
                .index(2),
        )
}

fn main() {
    pretty_env_logger::init();

    let args = cli().get_matches();

    // For any error, return an exit code -1. Otherwise return the exit code provided.
    let code = match run(&args) {
        Ok(code) => code,
        Err(err) => {
            error!("{}", err.to_string().to_lowercase());
            -1
        }
    };

    std::process::exit(code)
}
