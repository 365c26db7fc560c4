// ear-detect: Detect acoustic events in a stream of feature vectors.
//
// Reads feature vectors (one per line, whitespace-separated) from a file or
// stdin and prints each detected event once the decoder has settled back
// into the background. Each event is printed as:
//   RESULT;<duration s>;<score>;<rms>;<event name>;
//
// Usage:
//   ear-detect [-c CONFIG] [OPTIONS] [FEATURES]
//
// Options:
//   -c, --config PATH   Configuration file (default: $EAR_CONFIG or ./ear.config)
//   --json              Print one JSON object per event
//   --no-flush          Do not report unsettled events at end of input
//   -h, --help          Print help

use std::fs::File;
use std::io::{self, BufRead, BufReader, Write};

use ear_cli::{CliError, Detector, FeatureReader, features};
use ear_core::Detection;
use ear_search::{AcousticScorer, DetectorSession, Search, SessionOptions};
use serde::Serialize;

/// JSON form of a reported event.
#[derive(Serialize)]
struct Report<'a> {
    event: u32,
    name: &'a str,
    start_frame: i64,
    duration_frames: i64,
    start_s: f32,
    duration_s: f32,
    score: f32,
    rms: f32,
}

fn main() {
    let args: Vec<String> = std::env::args().skip(1).collect();
    let (config_path, args) = ear_cli::parse_config_path(&args);

    if ear_cli::wants_help(&args) {
        println!("ear-detect: Detect acoustic events in a stream of feature vectors.");
        println!();
        println!("Usage: ear-detect [-c CONFIG] [OPTIONS] [FEATURES]");
        println!();
        println!("Reads one feature vector per line from FEATURES or stdin.");
        println!("An empty line ends the input. Prints:");
        println!("  RESULT;<duration s>;<score>;<rms>;<event name>;");
        println!();
        println!("Options:");
        println!("  -c, --config PATH   Configuration file (default: $EAR_CONFIG or ./ear.config)");
        println!("  --json              Print one JSON object per event");
        println!("  --no-flush          Do not report unsettled events at end of input");
        println!("  -h, --help          Print this help");
        return;
    }

    ear_cli::init_logging();

    let json = args.iter().any(|a| a == "--json");
    let flush = !args.iter().any(|a| a == "--no-flush");
    let input = args.iter().find(|a| !a.starts_with('-'));

    let config_path = ear_cli::resolve_config_path(config_path.as_deref());
    let detector =
        Detector::load(&config_path).unwrap_or_else(|e| ear_cli::fatal(&e.to_string()));

    let input: Box<dyn BufRead> = match input {
        Some(path) => match File::open(path) {
            Ok(f) => Box::new(BufReader::new(f)),
            Err(e) => ear_cli::fatal(&format!("failed to open {path}: {e}")),
        },
        None => Box::new(io::stdin().lock()),
    };

    if let Err(e) = run(&detector, input, json, flush) {
        ear_cli::fatal(&e.to_string());
    }
}

fn run(
    detector: &Detector,
    input: Box<dyn BufRead>,
    json: bool,
    flush: bool,
) -> Result<(), CliError> {
    let config = &detector.config;
    let scorer = AcousticScorer::new(&detector.model.acoustic, config.strip_offset);
    let search = Search::new(&detector.model.network, scorer, config.insert_penalty)?;
    let options = SessionOptions {
        background_event: config.background_event,
        background_frames: config.background_frames,
    };
    let mut session = DetectorSession::new(search, options);

    let stdout = io::stdout();
    let mut out = io::BufWriter::new(stdout.lock());
    let mut reader = FeatureReader::new(input);
    let mut vector = Vec::new();
    let mut rms = 0.0;

    while reader.read_into(&mut vector)? {
        let events = session.push(&vector)?;
        rms = features::rms(&vector);
        for d in &events {
            print_event(&mut out, detector, d, rms, json);
        }
    }
    if flush {
        for d in &session.flush() {
            print_event(&mut out, detector, d, rms, json);
        }
    }
    tracing::info!(frames = session.frames(), "end of input");
    let _ = out.flush();
    Ok(())
}

fn print_event(out: &mut impl Write, detector: &Detector, d: &Detection, rms: f32, json: bool) {
    let shift = detector.config.frame_shift_ms;
    let name = detector.event_name(d.event);
    if json {
        let report = Report {
            event: d.event,
            name: &name,
            start_frame: d.start_frame,
            duration_frames: d.duration,
            start_s: d.start_secs(shift),
            duration_s: d.duration_secs(shift),
            score: d.score,
            rms,
        };
        match serde_json::to_string(&report) {
            Ok(line) => {
                let _ = writeln!(out, "{line}");
            }
            Err(e) => tracing::error!(%e, "failed to encode event"),
        }
    } else {
        let _ = writeln!(
            out,
            "RESULT;{};{};{};{};",
            d.duration_secs(shift),
            d.score,
            rms,
            name
        );
    }
}
