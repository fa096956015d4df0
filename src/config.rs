use std::path::PathBuf;

pub const DEFAULT_TICK_MS: u64 = 100;

const ENV_TICK_MS: &str = "LAPWATCH_TICK_MS";
const ENV_LOG_FILE: &str = "LAPWATCH_LOG_FILE";

#[derive(Clone, Debug)]
pub struct Config {
    /// Redraw cadence while the stopwatch runs.
    pub tick_ms: u64,
    /// Where log records go; the terminal belongs to the UI.
    pub log_file: Option<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            tick_ms: DEFAULT_TICK_MS,
            log_file: None,
        }
    }
}

impl Config {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let tick_ms = lookup(ENV_TICK_MS)
            .and_then(|v| v.trim().parse::<u64>().ok())
            .filter(|&ms| ms > 0)
            .unwrap_or(DEFAULT_TICK_MS);
        let log_file = lookup(ENV_LOG_FILE)
            .filter(|v| !v.trim().is_empty())
            .map(PathBuf::from);
        Self { tick_ms, log_file }
    }
}
