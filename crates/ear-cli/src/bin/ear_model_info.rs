// ear-model-info: Describe the model named by a detector configuration.
//
// Prints the acoustic model dimensions, the search network size and the
// event index.
//
// Usage:
//   ear-model-info [-c CONFIG]
//
// Options:
//   -c, --config PATH   Configuration file (default: $EAR_CONFIG or ./ear.config)
//   -h, --help          Print help

use std::io::{self, Write};

use ear_cli::Detector;
use ear_model::transition::Target;

fn main() {
    let args: Vec<String> = std::env::args().skip(1).collect();
    let (config_path, args) = ear_cli::parse_config_path(&args);

    if ear_cli::wants_help(&args) {
        println!("ear-model-info: Describe the model named by a detector configuration.");
        println!();
        println!("Usage: ear-model-info [-c CONFIG]");
        println!();
        println!("Options:");
        println!("  -c, --config PATH   Configuration file (default: $EAR_CONFIG or ./ear.config)");
        println!("  -h, --help          Print this help");
        return;
    }

    ear_cli::init_logging();

    let config_path = ear_cli::resolve_config_path(config_path.as_deref());
    let detector =
        Detector::load(&config_path).unwrap_or_else(|e| ear_cli::fatal(&e.to_string()));
    let acoustic = &detector.model.acoustic;
    let network = &detector.model.network;

    let stdout = io::stdout();
    let mut out = io::BufWriter::new(stdout.lock());

    let _ = writeln!(out, "config:          {}", config_path.display());
    let _ = writeln!(out, "model:           {}", detector.config.model_path.display());
    let _ = writeln!(out, "vector size:     {}", acoustic.vector_size());
    let _ = writeln!(out, "acoustic states: {}", acoustic.state_count());
    let _ = writeln!(out, "pdfs:            {}", acoustic.pdf_count());
    let _ = writeln!(out, "pdfs per state:  {}", acoustic.pdfs_per_state());
    let _ = writeln!(out, "transitions:     {}", network.len());

    let finals = network
        .transitions()
        .iter()
        .filter(|t| t.target == Target::End)
        .count();
    let _ = writeln!(out, "final arcs:      {finals}");
    match network.max_start_state() {
        Some(max) => {
            let _ = writeln!(out, "end state:       {}", max + 1);
        }
        None => {
            let _ = writeln!(out, "end state:       - (empty network)");
        }
    }

    let _ = writeln!(out, "events:          {}", detector.index.len());
    for (id, name) in detector.index.entries() {
        let marker = if id == detector.config.background_event {
            " (background)"
        } else {
            ""
        };
        let _ = writeln!(out, "  {id:>4}  {name}{marker}");
    }
}
