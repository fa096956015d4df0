use std::fs::OpenOptions;
use std::io;
use std::path::Path;

use env_logger::{Builder, Env, Target};

const DEFAULT_FILTER: &str = "lapwatch=info,lap_core=info";

/// Sends log records to `log_file`, or only errors to stderr when there is
/// none: anything else on stderr would tear the full-screen UI.
pub fn init(log_file: Option<&Path>) -> io::Result<()> {
    let mut builder = match log_file {
        Some(path) => {
            let file = OpenOptions::new().create(true).append(true).open(path)?;
            let mut builder = Builder::from_env(Env::default().default_filter_or(DEFAULT_FILTER));
            builder.target(Target::Pipe(Box::new(file)));
            builder
        }
        None => {
            let mut builder = Builder::new();
            builder.filter_level(log::LevelFilter::Error).target(Target::Stderr);
            builder
        }
    };
    builder
        .try_init()
        .map_err(|e| io::Error::new(io::ErrorKind::Other, e))
}
