//! CLI: feed a serial port or file into [`oem4_decode::Decoder`] and print decoded events as
//! JSON, one line per updated epoch or ephemeris.

use std::fs::File;
use std::io::{self, BufReader, Read};
use std::time::Duration;

use clap::Parser;
use oem4_decode::{Decoder, NavStore, ObsBuffer};
use serde::Serialize;

#[derive(Parser)]
#[command(name = "oem_dump", about = "Decode Unicore/NovAtel OEM4-style telemetry to JSON")]
struct Args {
    /// Path to a serial device (e.g. /dev/ttyUSB0) to read from.
    #[arg(long, conflicts_with = "file")]
    port: Option<String>,

    /// Baud rate, used only with --port.
    #[arg(long, default_value_t = 115_200)]
    baud: u32,

    /// Path to a recorded binary log to read from.
    #[arg(long)]
    file: Option<String>,

    /// Decoder options string (§6), e.g. "-EPHALL -GALINAV".
    #[arg(long, default_value = "")]
    options: String,

    /// Print the verbose per-frame diagnostic line to stderr.
    #[arg(long)]
    verbose: bool,
}

#[derive(Serialize)]
#[serde(tag = "event")]
enum Event {
    #[serde(rename = "obs")]
    Observation {
        time: oem4_decode::GpsTime,
        count: usize,
    },
    #[serde(rename = "ephemeris")]
    Ephemeris { time: oem4_decode::GpsTime },
    #[serde(rename = "error")]
    Error { code: i32 },
}

fn main() {
    let args = Args::parse();

    let mut decoder = Decoder::new();
    decoder.set_options(&args.options);
    decoder.set_verbose(args.verbose);

    let mut obs = ObsBuffer::new();
    let mut nav = NavStore::new();

    let result = if let Some(port) = &args.port {
        run_stream(port, args.baud, &mut decoder, &mut obs, &mut nav)
    } else if let Some(path) = &args.file {
        run_file(path, &mut decoder, &mut obs, &mut nav)
    } else {
        run_stream_reader(&mut io::stdin().lock(), &mut decoder, &mut obs, &mut nav)
    };

    if let Err(err) = result {
        eprintln!("oem_dump: {err}");
        std::process::exit(1);
    }
}

fn run_stream(
    port: &str,
    baud: u32,
    decoder: &mut Decoder,
    obs: &mut ObsBuffer,
    nav: &mut NavStore,
) -> io::Result<()> {
    let mut serial = serialport::new(port, baud)
        .timeout(Duration::from_secs(1))
        .open()
        .map_err(|err| io::Error::new(io::ErrorKind::Other, err))?;
    run_stream_reader(&mut serial, decoder, obs, nav)
}

fn run_file(
    path: &str,
    decoder: &mut Decoder,
    obs: &mut ObsBuffer,
    nav: &mut NavStore,
) -> io::Result<()> {
    let mut reader = BufReader::new(File::open(path)?);
    loop {
        match decoder.input_file(&mut reader, obs, nav) {
            -2 => return Ok(()),
            code => report(decoder, code, obs),
        }
    }
}

fn run_stream_reader(
    reader: &mut impl Read,
    decoder: &mut Decoder,
    obs: &mut ObsBuffer,
    nav: &mut NavStore,
) -> io::Result<()> {
    let mut byte = [0u8; 1];
    loop {
        if reader.read(&mut byte)? == 0 {
            return Ok(());
        }
        let code = decoder.input_stream(byte[0], obs, nav);
        if code != 0 {
            report(decoder, code, obs);
        }
    }
}

fn report(decoder: &Decoder, code: i32, obs: &ObsBuffer) {
    if let Some(line) = decoder.last_diagnostic() {
        eprintln!("{line}");
    }

    let event = match code {
        1 => Some(Event::Observation {
            time: decoder.time(),
            count: obs.entries().len(),
        }),
        2 => Some(Event::Ephemeris { time: decoder.time() }),
        -1 => Some(Event::Error { code }),
        _ => None,
    };

    if let Some(event) = event {
        if let Ok(json) = serde_json::to_string(&event) {
            println!("{json}");
        }
    }
}
