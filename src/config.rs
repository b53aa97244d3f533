use std::path::PathBuf;
use std::time::Duration;

use log::LevelFilter;

/// Key under which saved ranges are persisted.
pub const STORAGE_KEY: &str = "poker-trainer-saved-ranges";
/// Hands drawn per spot drill batch.
pub const DRILL_BATCH: usize = 5;
/// Pause between answering a drill hand and revealing the next one.
pub const REVEAL_DELAY: Duration = Duration::from_millis(1000);
pub const DEFAULT_STORE_DIR: &str = ".range-trainer";

#[derive(Debug, Clone)]
pub struct Config {
    pub store_dir: PathBuf,
    /// `None` uses the presets bundled with the binary.
    pub presets_path: Option<PathBuf>,
    pub drill_batch: usize,
    pub reveal_delay: Duration,
    pub log_level: LevelFilter,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            store_dir: PathBuf::from(DEFAULT_STORE_DIR),
            presets_path: None,
            drill_batch: DRILL_BATCH,
            reveal_delay: REVEAL_DELAY,
            log_level: LevelFilter::Warn,
        }
    }
}

impl Config {
    /// Maps `-v`/`-q` counts onto a log level, starting from `warn`.
    pub fn level_from_flags(verbose: u8, quiet: bool) -> LevelFilter {
        if quiet {
            return LevelFilter::Off;
        }
        match verbose {
            0 => LevelFilter::Warn,
            1 => LevelFilter::Info,
            2 => LevelFilter::Debug,
            _ => LevelFilter::Trace,
        }
    }
}

/// Installs the terminal logger. Safe to call more than once; later calls are ignored.
pub fn init_logging(level: LevelFilter) {
    let config = simplelog::ConfigBuilder::new()
        .set_location_level(LevelFilter::Off)
        .set_target_level(LevelFilter::Off)
        .set_thread_level(LevelFilter::Off)
        .build();
    let _ = simplelog::TermLogger::init(
        level,
        config,
        simplelog::TerminalMode::Stderr,
        simplelog::ColorChoice::Auto,
    );
}
