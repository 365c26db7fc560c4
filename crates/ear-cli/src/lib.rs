// ear-cli: shared utilities for the detector command-line tools.

pub mod config;
pub mod features;

use std::path::{Path, PathBuf};
use std::process;

use ear_model::ModelError;
use ear_model::ModelFile;
use ear_model::index::EventIndex;
use ear_search::SearchError;

pub use config::{ConfigMap, DetectorConfig};
pub use features::FeatureReader;

/// Configuration file used when none is given.
const DEFAULT_CONFIG: &str = "ear.config";

/// Environment variable naming the configuration file.
const CONFIG_ENV: &str = "EAR_CONFIG";

/// Error type for the command-line tools.
#[derive(Debug, thiserror::Error)]
pub enum CliError {
    #[error("failed to read {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("failed to read feature input: {source}")]
    Read { source: std::io::Error },
    #[error("invalid model: {0}")]
    Model(#[from] ModelError),
    #[error("decoding failed: {0}")]
    Search(#[from] SearchError),
    #[error("invalid feature value {value:?} on line {line}")]
    InvalidFeature { line: usize, value: String },
}

/// Model, event names and settings loaded from one configuration file.
pub struct Detector {
    pub config: DetectorConfig,
    pub model: ModelFile,
    pub index: EventIndex,
}

impl Detector {
    /// Read the configuration at `config_path` and the files it names.
    ///
    /// A missing event index is tolerated; events are then shown by number.
    pub fn load(config_path: &Path) -> Result<Self, CliError> {
        let text = read_to_string(config_path)?;
        let config = DetectorConfig::parse(&text, config_path);
        tracing::debug!(?config, "loaded configuration");

        let data = std::fs::read(&config.model_path).map_err(|source| CliError::Io {
            path: config.model_path.clone(),
            source,
        })?;
        let model = ModelFile::from_bytes(&data)?;

        let index = if config.index_path.is_file() {
            EventIndex::parse(&read_to_string(&config.index_path)?)?
        } else {
            tracing::warn!(path = %config.index_path.display(), "event index not found");
            EventIndex::default()
        };

        Ok(Self {
            config,
            model,
            index,
        })
    }

    /// Display name of event `id`.
    pub fn event_name(&self, id: u32) -> String {
        match self.index.name(id) {
            Some(name) => name.to_string(),
            None => format!("#{id}"),
        }
    }
}

fn read_to_string(path: &Path) -> Result<String, CliError> {
    std::fs::read_to_string(path).map_err(|source| CliError::Io {
        path: path.to_path_buf(),
        source,
    })
}

/// Pick the configuration file.
///
/// Search order:
/// 1. `explicit` argument (if provided)
/// 2. `EAR_CONFIG` environment variable
/// 3. `ear.config` in the current directory
pub fn resolve_config_path(explicit: Option<&str>) -> PathBuf {
    if let Some(p) = explicit {
        return PathBuf::from(p);
    }
    if let Ok(p) = std::env::var(CONFIG_ENV) {
        return PathBuf::from(p);
    }
    PathBuf::from(DEFAULT_CONFIG)
}

/// Parse a `--config=PATH` or `-c PATH` argument from command line args.
///
/// Returns `(config_path, remaining_args)`.
pub fn parse_config_path(args: &[String]) -> (Option<String>, Vec<String>) {
    let mut config_path = None;
    let mut remaining = Vec::new();
    let mut skip_next = false;

    for (i, arg) in args.iter().enumerate() {
        if skip_next {
            skip_next = false;
            continue;
        }
        if let Some(val) = arg.strip_prefix("--config=") {
            config_path = Some(val.to_string());
        } else if arg == "--config" || arg == "-c" {
            if i + 1 < args.len() {
                config_path = Some(args[i + 1].clone());
                skip_next = true;
            } else {
                fatal(&format!("{arg} requires a value"));
            }
        } else {
            remaining.push(arg.clone());
        }
    }

    (config_path, remaining)
}

/// Install the stderr log subscriber. `RUST_LOG` overrides the `warn` default.
pub fn init_logging() {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

/// Print an error message and exit with code 1.
pub fn fatal(msg: &str) -> ! {
    eprintln!("error: {msg}");
    process::exit(1);
}

/// Check if `--help` or `-h` is in the args.
pub fn wants_help(args: &[String]) -> bool {
    args.iter().any(|a| a == "--help" || a == "-h")
}
