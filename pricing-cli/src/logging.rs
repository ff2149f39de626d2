//! Log output for the simulator.
//!
//! Records go to stderr so that CSV written to stdout stays clean. A log
//! file can be attached after startup, once the config file has been read.

use std::fmt::{self, Display};
use std::fs::File;
use std::io::{self, IsTerminal, Write};
use std::path::Path;
use std::sync::{Arc, Mutex, MutexGuard, OnceLock, PoisonError};

use anyhow::{Context, Result};
use chrono::Local;
use tracing::{Event, Level, Subscriber};
use tracing_subscriber::fmt::format::{FormatEvent, FormatFields, Writer};
use tracing_subscriber::fmt::{FmtContext, MakeWriter};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::registry::LookupSpan;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, Registry, reload};

pub const DEFAULT_LEVEL: &str = "info";

const TIMESTAMP: &str = "%Y-%m-%d %H:%M:%S%.3f";
const DIM: &str = "\x1b[2m";
const CYAN: &str = "\x1b[36m";
const RESET: &str = "\x1b[0m";

static LEVEL_HANDLE: OnceLock<reload::Handle<EnvFilter, Registry>> = OnceLock::new();
static LOG_FILE: OnceLock<LogFile> = OnceLock::new();

/// One line per event:
///
/// ```text
/// 2026-10-15 09:12:44.031  WARN pricing_data::loader: column missing column="ICMS"
/// ```
pub(crate) struct CliFormat;

fn level_style(level: &Level) -> &'static str {
    match *level {
        Level::ERROR => "\x1b[1;31m",
        Level::WARN => "\x1b[1;33m",
        Level::INFO => "\x1b[32m",
        Level::DEBUG => "\x1b[34m",
        Level::TRACE => "\x1b[35m",
    }
}

/// Writes `text`, wrapped in `style` when the writer accepts ANSI escapes.
fn paint(
    writer: &mut Writer<'_>,
    style: &str,
    text: impl Display,
) -> fmt::Result {
    if writer.has_ansi_escapes() {
        write!(writer, "{style}{text}{RESET}")
    } else {
        write!(writer, "{text}")
    }
}

impl<S, N> FormatEvent<S, N> for CliFormat
where
    S: Subscriber + for<'a> LookupSpan<'a>,
    N: for<'a> FormatFields<'a> + 'static,
{
    fn format_event(
        &self,
        ctx: &FmtContext<'_, S, N>,
        mut writer: Writer<'_>,
        event: &Event<'_>,
    ) -> fmt::Result {
        let meta = event.metadata();

        paint(&mut writer, DIM, Local::now().format(TIMESTAMP))?;
        write!(writer, " ")?;
        paint(&mut writer, level_style(meta.level()), format_args!("{:>5}", meta.level()))?;
        write!(writer, " ")?;
        paint(&mut writer, CYAN, format_args!("{}:", meta.target()))?;
        write!(writer, " ")?;

        ctx.field_format().format_fields(writer.by_ref(), event)?;
        writeln!(writer)
    }
}

/// Log file target that can be attached after the subscriber is installed.
/// Writes are dropped until a file is attached.
#[derive(Clone, Default)]
pub(crate) struct LogFile(Arc<Mutex<Option<File>>>);

pub(crate) struct LogFileGuard<'a>(MutexGuard<'a, Option<File>>);

impl LogFile {
    fn current(&self) -> MutexGuard<'_, Option<File>> {
        self.0.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn replace(
        &self,
        file: File,
    ) {
        *self.current() = Some(file);
    }
}

impl Write for LogFileGuard<'_> {
    fn write(
        &mut self,
        buf: &[u8],
    ) -> io::Result<usize> {
        self.0.as_mut().map_or(Ok(buf.len()), |file| file.write(buf))
    }

    fn flush(&mut self) -> io::Result<()> {
        self.0.as_mut().map_or(Ok(()), |file| file.flush())
    }
}

impl<'a> MakeWriter<'a> for LogFile {
    type Writer = LogFileGuard<'a>;

    fn make_writer(&'a self) -> Self::Writer {
        LogFileGuard(self.current())
    }
}

/// True when `RUST_LOG` is set; it then wins over every other level source.
pub fn env_filter_set() -> bool {
    std::env::var_os(EnvFilter::DEFAULT_ENV).is_some()
}

fn make_filter(default_level: &str) -> EnvFilter {
    EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(default_level))
        .unwrap_or_else(|_| EnvFilter::new(DEFAULT_LEVEL))
}

/// Replaces the active filter. Takes a bare level such as `"debug"` or any
/// `EnvFilter` directive.
pub fn set_log_level(level: &str) -> Result<()> {
    let handle = LEVEL_HANDLE.get().context("logging not yet initialized")?;
    let filter =
        EnvFilter::try_new(level).with_context(|| format!("invalid log level '{level}'"))?;
    handle.reload(filter).context("log filter reload failed")
}

/// Starts appending log output to `path`, replacing any open log file.
pub fn enable_file_logging(path: &Path) -> Result<()> {
    let log_file = LOG_FILE.get().context("logging not yet initialized")?;
    let file = File::options()
        .create(true)
        .append(true)
        .open(path)
        .with_context(|| format!("cannot open log file '{}'", path.display()))?;
    log_file.replace(file);
    Ok(())
}

/// Installs the global subscriber. Later calls leave the first one in place.
///
/// Stderr output is colored only on a terminal. `RUST_LOG`, when set,
/// overrides `default_level`.
pub fn init_logging(default_level: &str) {
    let log_file = LOG_FILE.get_or_init(LogFile::default).clone();
    let (level_filter, level_handle) = reload::Layer::new(make_filter(default_level));

    let stderr_layer = tracing_subscriber::fmt::layer()
        .event_format(CliFormat)
        .with_ansi(io::stderr().is_terminal())
        .with_writer(io::stderr);
    let file_layer = tracing_subscriber::fmt::layer()
        .event_format(CliFormat)
        .with_ansi(false)
        .with_writer(log_file);

    let installed = tracing_subscriber::registry()
        .with(level_filter)
        .with(stderr_layer)
        .with(file_layer)
        .try_init();
    if installed.is_ok() {
        let _ = LEVEL_HANDLE.set(level_handle);
    }
}
