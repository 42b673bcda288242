//! Terminal output — status logging, spinners, and captured command output.
//!
//! # Logging
//!
//! [`Reporter`] is the one logger of the tool.  It wraps a `tracing`
//! subscriber in a [`Dispatch`] that is *never* installed globally; every
//! component that reports progress receives a `Reporter` (cheap to clone) and
//! logs through it.  Tests build one with [`Reporter::with_writer`] to capture
//! the lines they want to assert on.
//!
//! | Method       | Level  | Colour     |
//! |--------------|--------|------------|
//! | `debug`      | DEBUG  | dim        |
//! | `info`       | INFO   | blue       |
//! | `success`    | INFO   | green      |
//! | `warn`       | WARN   | yellow     |
//! | `critical`   | ERROR  | red, bold  |
//!
//! # Captured execution
//!
//! External programs run behind a spinner with stdout and stderr buffered, so
//! the terminal stays clean.  Callers decide what to replay from the captured
//! output once the exit code is known.

use std::{
    fmt::Display,
    process::{Command, Output, Stdio},
    str::FromStr,
    time::Duration,
};

use anyhow::{Context, Result};
use console::style;
use indicatif::{ProgressBar, ProgressStyle};
use tracing::{Dispatch, dispatcher, level_filters::LevelFilter};
use tracing_subscriber::fmt::MakeWriter;

/// Braille spinner frames.
static SPINNER_CHARS: &str = "⠋⠙⠹⠸⠼⠴⠦⠧⠇⠏";

// ─── Log level ────────────────────────────────────────────────────────────────

/// Minimum severity that gets printed.
///
/// Parsed case-insensitively from the usual names; `warn` and `warning` are
/// the same level, and `critical` prints only critical lines.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogLevel {
    Debug,
    #[default]
    Info,
    Warning,
    Error,
    Critical,
}

impl LogLevel {
    fn filter(self) -> LevelFilter {
        match self {
            Self::Debug => LevelFilter::DEBUG,
            Self::Info => LevelFilter::INFO,
            Self::Warning => LevelFilter::WARN,
            Self::Error | Self::Critical => LevelFilter::ERROR,
        }
    }
}

impl FromStr for LogLevel {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "debug" => Ok(Self::Debug),
            "info" => Ok(Self::Info),
            "warn" | "warning" => Ok(Self::Warning),
            "error" => Ok(Self::Error),
            "critical" => Ok(Self::Critical),
            other => Err(format!(
                "unknown log level '{other}' (expected debug, info, warning, error or critical)"
            )),
        }
    }
}

// ─── Reporter ─────────────────────────────────────────────────────────────────

/// Injected status logger.
#[derive(Clone)]
pub struct Reporter {
    dispatch: Dispatch,
    colored: bool,
}

impl Reporter {
    /// Log to stderr, coloured when stderr is a terminal.
    pub fn new(level: LogLevel) -> Self {
        let colored = console::colors_enabled_stderr();
        Self::build(level, std::io::stderr, colored)
    }

    /// Log to an arbitrary writer, uncoloured.
    #[cfg(test)]
    pub fn with_writer<W>(level: LogLevel, writer: W) -> Self
    where
        W: for<'w> MakeWriter<'w> + Send + Sync + 'static,
    {
        Self::build(level, writer, false)
    }

    fn build<W>(level: LogLevel, writer: W, colored: bool) -> Self
    where
        W: for<'w> MakeWriter<'w> + Send + Sync + 'static,
    {
        let subscriber = tracing_subscriber::fmt()
            .with_max_level(level.filter())
            .with_writer(writer)
            .with_ansi(colored)
            .with_target(false)
            .without_time()
            .finish();

        Self {
            dispatch: Dispatch::new(subscriber),
            colored,
        }
    }

    pub fn debug(&self, msg: impl Display) {
        let msg = style(msg).dim().force_styling(self.colored);
        dispatcher::with_default(&self.dispatch, || tracing::debug!("{msg}"));
    }

    pub fn info(&self, msg: impl Display) {
        let msg = style(msg).blue().force_styling(self.colored);
        dispatcher::with_default(&self.dispatch, || tracing::info!("{msg}"));
    }

    pub fn success(&self, msg: impl Display) {
        let msg = style(msg).green().force_styling(self.colored);
        dispatcher::with_default(&self.dispatch, || tracing::info!("{msg}"));
    }

    pub fn warn(&self, msg: impl Display) {
        let msg = style(msg).yellow().force_styling(self.colored);
        dispatcher::with_default(&self.dispatch, || tracing::warn!("{msg}"));
    }

    pub fn critical(&self, msg: impl Display) {
        let msg = style(msg).red().bold().force_styling(self.colored);
        dispatcher::with_default(&self.dispatch, || tracing::error!("{msg}"));
    }
}

// ─── Spinner ──────────────────────────────────────────────────────────────────

/// Create and start an indeterminate spinner for `label`.
///
/// indicatif draws to stderr and hides itself when stderr is not a terminal.
fn make_spinner(label: &str) -> ProgressBar {
    let pb = ProgressBar::new_spinner();
    let spinner_style = ProgressStyle::with_template("  {spinner:.cyan}  {msg}")
        .unwrap_or_else(|_| ProgressStyle::default_spinner())
        .tick_chars(SPINNER_CHARS);
    pb.set_style(spinner_style);
    pb.set_message(format!("{}", style(label).dim()));
    pb.enable_steady_tick(Duration::from_millis(80));
    pb
}

/// Run `f` behind a spinner labelled `label`.
pub fn with_spinner<T>(label: &str, f: impl FnOnce() -> T) -> T {
    let spinner = make_spinner(label);
    let result = f();
    spinner.finish_and_clear();
    result
}

// ─── Captured execution ───────────────────────────────────────────────────────

/// Exit code reported for a child killed by a signal.
const SIGNALLED_EXIT_CODE: i32 = 2;

/// What a finished child process left behind.
#[derive(Debug)]
pub struct Captured {
    pub code: i32,
    pub stdout: String,
    pub stderr: String,
}

/// Run a command, capturing both stdout and stderr.
///
/// Errors only if the program cannot be spawned; a non-zero exit is reported
/// through [`Captured::code`].
pub fn run_captured(args: &[String]) -> Result<Captured> {
    let (prog, rest) = args.split_first().context("cannot run an empty command")?;

    let output: Output = Command::new(prog)
        .args(rest)
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .output()
        .with_context(|| format!("failed to spawn: {}", args.join(" ")))?;

    Ok(Captured {
        code: output.status.code().unwrap_or(SIGNALLED_EXIT_CODE),
        stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
        stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
    })
}

/// [`run_captured`] behind a spinner.
pub fn run_stage(label: &str, args: &[String]) -> Result<Captured> {
    with_spinner(label, || run_captured(args))
}

// ─── Test support ─────────────────────────────────────────────────────────────

/// In-memory log sink for [`Reporter::with_writer`].
#[cfg(test)]
#[derive(Clone, Default)]
pub struct LogCapture(std::sync::Arc<std::sync::Mutex<Vec<u8>>>);

#[cfg(test)]
impl LogCapture {
    pub fn contents(&self) -> String {
        String::from_utf8_lossy(&self.0.lock().unwrap()).into_owned()
    }
}

#[cfg(test)]
impl std::io::Write for LogCapture {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        self.0.lock().unwrap().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> std::io::Result<()> {
        Ok(())
    }
}

#[cfg(test)]
impl<'a> MakeWriter<'a> for LogCapture {
    type Writer = LogCapture;

    fn make_writer(&'a self) -> Self::Writer {
        self.clone()
    }
}

// ─── Tests ────────────────────────────────────────────────────────────────────
