//! Stderr logging for the `planar-homography` tools.
//!
//! What the workspace logs through the `log` facade:
//! - `debug`: DLT singular values, the least-squares minimum pivot, solver
//!   evaluations and cost per refinement, pipeline reprojection summaries.
//! - `warn`: degenerate null spaces, singular normal equations, refinements
//!   that stop without converging or get discarded.
//!
//! Library code never installs a logger. The CLI calls [`init_with_level`]
//! with its `--log-level`; with the `tracing` feature, `init_tracing` adds
//! span timings for the instrumented estimators.

use std::io::Write;
use std::sync::OnceLock;
use std::time::Instant;

use log::{LevelFilter, Log, Metadata, Record};

#[cfg(feature = "tracing")]
use tracing_subscriber::{fmt::format::FmtSpan, util::SubscriberInitExt, EnvFilter};

/// Prints `[  0.012s DEBUG planar_homography_core::dlt] message`.
struct StderrLogger {
    level: LevelFilter,
    started: Instant,
}

impl StderrLogger {
    fn write_record(&self, record: &Record) -> std::io::Result<()> {
        let mut out = std::io::stderr().lock();
        writeln!(
            out,
            "[{:7.3}s {:>5} {}] {}",
            self.started.elapsed().as_secs_f64(),
            record.level(),
            record.target(),
            record.args()
        )
    }
}

impl Log for StderrLogger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() <= self.level
    }

    fn log(&self, record: &Record) {
        if self.enabled(record.metadata()) {
            let _ = self.write_record(record);
        }
    }

    fn flush(&self) {
        let _ = std::io::stderr().flush();
    }
}

static LOGGER: OnceLock<StderrLogger> = OnceLock::new();

/// Install the stderr logger at `level`.
///
/// Only the first call has an effect; later calls return `Ok(())` and keep
/// the original level. Fails if another `log` implementation is installed.
pub fn init_with_level(level: LevelFilter) -> Result<(), log::SetLoggerError> {
    if LOGGER.get().is_some() {
        return Ok(());
    }
    let logger = LOGGER.get_or_init(|| StderrLogger {
        level,
        started: Instant::now(),
    });
    log::set_logger(logger)?;
    log::set_max_level(logger.level);
    Ok(())
}

/// Install a `tracing-subscriber` fmt subscriber filtered by `RUST_LOG`
/// (default `info`), emitting one event per closed span.
#[cfg(feature = "tracing")]
pub fn init_tracing(json: bool) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_span_events(FmtSpan::CLOSE);
    let _ = if json {
        builder.json().flatten_event(true).finish().try_init()
    } else {
        builder
            .with_timer(tracing_subscriber::fmt::time::Uptime::default())
            .finish()
            .try_init()
    };
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn repeated_init_keeps_first_level() {
        init_with_level(LevelFilter::Warn).expect("first init");
        init_with_level(LevelFilter::Trace).expect("second init is ignored");
        assert_eq!(LOGGER.get().map(|l| l.level), Some(LevelFilter::Warn));
        assert_eq!(log::max_level(), LevelFilter::Warn);
    }

    #[test]
    fn records_above_the_level_are_dropped() {
        let logger = StderrLogger {
            level: LevelFilter::Info,
            started: Instant::now(),
        };
        let meta = |level: log::Level| {
            Metadata::builder()
                .level(level)
                .target("planar_homography_core::dlt")
                .build()
        };
        assert!(logger.enabled(&meta(log::Level::Warn)));
        assert!(logger.enabled(&meta(log::Level::Info)));
        assert!(!logger.enabled(&meta(log::Level::Debug)));
    }
}
