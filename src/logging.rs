use std::fmt::Display;

use tracing_subscriber::fmt;
use tracing_subscriber::filter::LevelFilter;

pub fn init(quiet: bool, verbose: bool) {
    if quiet {
        return;
    }
    let level = if verbose {
        LevelFilter::DEBUG
    } else {
        LevelFilter::INFO
    };
    let _ = fmt()
        .with_writer(std::io::stderr)
        .with_max_level(level)
        .with_target(false)
        .with_level(true)
        .with_thread_ids(false)
        .with_thread_names(false)
        .try_init();
}

/// Per-run switch for informational notes. Passed explicitly to the stages
/// that report progress instead of living in a global.
#[derive(Debug, Clone, Copy, Default)]
pub struct Verbosity {
    pub quiet: bool,
}

impl Verbosity {
    pub fn new(quiet: bool) -> Self {
        Self { quiet }
    }

    pub fn info(&self, message: impl Display) {
        if !self.quiet {
            tracing::info!("{}", message);
        }
    }

    pub fn warn(&self, message: impl Display) {
        if !self.quiet {
            tracing::warn!("{}", message);
        }
    }
}
