//! Minimal stderr logger for the inspection tools.
//!
//! Prints `[elapsed LEVEL target] message`, or `[elapsed LEVEL target eK]`
//! while the thread holds an [`extruder_scope`]. Install once at startup with
//! [`init_with_level`]; with the `tracing` feature, [`init_tracing`] installs a
//! `tracing-subscriber` instead.

use std::cell::Cell;
use std::fmt;
use std::io::Write;
use std::sync::OnceLock;
use std::time::Instant;

use log::{Level, LevelFilter, Log, Metadata, Record};

#[cfg(feature = "tracing")]
use tracing_subscriber::fmt::format::FmtSpan;
#[cfg(feature = "tracing")]
use tracing_subscriber::util::SubscriberInitExt;
#[cfg(feature = "tracing")]
use tracing_subscriber::EnvFilter;

thread_local! {
    static EXTRUDER: Cell<Option<usize>> = const { Cell::new(None) };
}

/// Guard from [`extruder_scope`]; restores the previous tag on drop.
#[derive(Debug)]
#[must_use = "the tag is removed when the scope is dropped"]
pub struct ExtruderScope {
    previous: Option<usize>,
}

impl Drop for ExtruderScope {
    fn drop(&mut self) {
        EXTRUDER.with(|c| c.set(self.previous));
    }
}

/// Tag every line logged from this thread with `extruder` until the guard drops.
///
/// Scopes nest. Extruders inspected on worker threads each carry their own tag.
pub fn extruder_scope(extruder: usize) -> ExtruderScope {
    let previous = EXTRUDER.with(|c| c.replace(Some(extruder)));
    ExtruderScope { previous }
}

/// Extruder tag of the calling thread, if any.
pub fn current_extruder() -> Option<usize> {
    EXTRUDER.with(Cell::get)
}

fn format_line(
    elapsed: f64,
    level: Level,
    target: &str,
    extruder: Option<usize>,
    args: &fmt::Arguments<'_>,
) -> String {
    let target = target.rsplit("::").next().unwrap_or_default();
    match extruder {
        Some(k) => format!("[{elapsed:8.3}s {level:>5} {target} e{k}] {args}"),
        None => format!("[{elapsed:8.3}s {level:>5} {target}] {args}"),
    }
}

struct InspectLogger {
    level: LevelFilter,
    started: Instant,
}

impl Log for InspectLogger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() <= self.level
    }

    fn log(&self, record: &Record) {
        if !self.enabled(record.metadata()) {
            return;
        }

        let line = format_line(
            self.started.elapsed().as_secs_f64(),
            record.level(),
            record.target(),
            current_extruder(),
            record.args(),
        );
        let _ = writeln!(std::io::stderr().lock(), "{line}");
    }

    fn flush(&self) {
        let _ = std::io::stderr().flush();
    }
}

static LOGGER: OnceLock<InspectLogger> = OnceLock::new();

/// Install the logger with the provided level filter.
///
/// Calling this more than once is a no-op after the first successful
/// initialization.
pub fn init_with_level(level: LevelFilter) -> Result<(), log::SetLoggerError> {
    if LOGGER.get().is_none() {
        let logger = LOGGER.get_or_init(|| InspectLogger {
            level,
            started: Instant::now(),
        });
        log::set_logger(logger)?;
        log::set_max_level(level);
    }
    Ok(())
}

#[cfg(feature = "tracing")]
pub fn init_tracing(json: bool) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_span_events(FmtSpan::CLOSE);
    if json {
        let _ = builder.json().flatten_event(true).finish().try_init();
    } else {
        let _ = builder
            .with_timer(tracing_subscriber::fmt::time::Uptime::default())
            .finish()
            .try_init();
    }
}
