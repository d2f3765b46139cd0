//! Terminal output for the CLI.
//!
//! All human-readable output goes through [`Shell`] and lands on stderr as
//! right-aligned status lines, e.g.
//!
//! ```text
//!    Resolving workspace links of `app`
//!      Staging 2 packages into /ws/apps/app/.firebase-pnpm-workspaces
//!    Rewriting 3 manifests
//!       Staged 2 packages into ... (3 manifest entries rewritten)
//! ```
//!
//! A progress bar is drawn over the copies in normal mode only.

use std::fmt::Display;
use std::io::{self, IsTerminal};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use indicatif::{ProgressBar, ProgressStyle};

const STATUS_WIDTH: usize = 12;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Verbosity {
    /// Errors only.
    Quiet,
    #[default]
    Normal,
    /// Per-item lines instead of progress bars.
    Verbose,
}

/// When to emit ANSI colors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ColorChoice {
    #[default]
    Auto,
    Always,
    Never,
}

impl std::str::FromStr for ColorChoice {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "auto" => Ok(ColorChoice::Auto),
            "always" => Ok(ColorChoice::Always),
            "never" => Ok(ColorChoice::Never),
            _ => Err(format!(
                "invalid color choice '{}'; expected 'auto', 'always', or 'never'",
                s
            )),
        }
    }
}

/// Label of a status line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Status {
    Resolving,
    Staging,
    Rewriting,
    Updated,
    Staged,
    Finished,
    Info,
}

impl Status {
    fn label(self) -> &'static str {
        match self {
            Status::Resolving => "Resolving",
            Status::Staging => "Staging",
            Status::Rewriting => "Rewriting",
            Status::Updated => "Updated",
            Status::Staged => "Staged",
            Status::Finished => "Finished",
            Status::Info => "Info",
        }
    }

    fn color(self) -> &'static str {
        match self {
            // in progress
            Status::Resolving | Status::Staging | Status::Rewriting => "\x1b[1;36m",
            // done
            Status::Updated | Status::Staged | Status::Finished => "\x1b[1;32m",
            Status::Info => "\x1b[1;34m",
        }
    }
}

#[derive(Debug)]
pub struct Shell {
    verbosity: Verbosity,
    use_color: bool,
}

impl Shell {
    pub fn new(verbosity: Verbosity, color: ColorChoice) -> Self {
        let use_color = match color {
            ColorChoice::Auto => io::stderr().is_terminal(),
            ColorChoice::Always => true,
            ColorChoice::Never => false,
        };
        Shell {
            verbosity,
            use_color,
        }
    }

    /// Build from `--quiet`/`--verbose`. Quiet wins when both are given.
    pub fn from_flags(quiet: bool, verbose: bool, color: ColorChoice) -> Self {
        let verbosity = match (quiet, verbose) {
            (true, _) => Verbosity::Quiet,
            (false, true) => Verbosity::Verbose,
            (false, false) => Verbosity::Normal,
        };
        Shell::new(verbosity, color)
    }

    pub fn verbosity(&self) -> Verbosity {
        self.verbosity
    }

    pub fn is_verbose(&self) -> bool {
        self.verbosity == Verbosity::Verbose
    }

    pub fn use_color(&self) -> bool {
        self.use_color
    }

    /// Print `{status:>12} {msg}`. Nothing is printed in quiet mode.
    pub fn status(&self, status: Status, msg: impl Display) {
        if self.verbosity == Verbosity::Quiet {
            return;
        }
        eprintln!("{} {}", self.label(status), msg);
    }

    pub fn note(&self, msg: impl Display) {
        self.status(Status::Info, msg);
    }

    fn label(&self, status: Status) -> String {
        let padded = format!("{:>width$}", status.label(), width = STATUS_WIDTH);
        if self.use_color {
            format!("{}{}\x1b[0m", status.color(), padded)
        } else {
            padded
        }
    }

    /// Start timing an operation; see [`Span::finish`].
    pub fn span(self: &Arc<Self>, msg: impl Display) -> Span {
        Span {
            shell: Arc::clone(self),
            message: msg.to_string(),
            start: Instant::now(),
        }
    }

    /// Track `total` items. A bar is only drawn in normal mode.
    pub fn progress(self: &Arc<Self>, total: u64, msg: impl Display) -> Progress {
        Progress::new(Arc::clone(self), total, msg.to_string())
    }
}

impl Default for Shell {
    fn default() -> Self {
        Shell::new(Verbosity::Normal, ColorChoice::Auto)
    }
}

/// A timed operation. Dropping it without [`Span::finish`] prints nothing.
pub struct Span {
    shell: Arc<Shell>,
    message: String,
    start: Instant,
}

impl Span {
    /// Print `Finished <message> in <elapsed>`.
    pub fn finish(self) {
        self.shell.status(
            Status::Finished,
            format!("{} in {}", self.message, format_duration(self.start.elapsed())),
        );
    }
}

/// Item counter with an optional progress bar, shared across threads.
pub struct Progress {
    shell: Arc<Shell>,
    bar: Option<ProgressBar>,
    total: u64,
    done: AtomicU64,
    message: String,
}

impl Progress {
    fn new(shell: Arc<Shell>, total: u64, message: String) -> Self {
        let bar = (shell.verbosity() == Verbosity::Normal && total > 1).then(|| {
            let bar = ProgressBar::new(total);
            if let Ok(style) =
                ProgressStyle::default_bar().template("{spinner:.green} {msg} [{bar:40.cyan/blue}] {pos}/{len}")
            {
                bar.set_style(style.progress_chars("#>-"));
            }
            bar.set_message(message.clone());
            bar
        });

        Progress {
            shell,
            bar,
            total,
            done: AtomicU64::new(0),
            message,
        }
    }

    /// Count one finished item. Verbose mode prints `item` on its own line.
    pub fn inc(&self, item: impl Display) {
        let done = self.done.fetch_add(1, Ordering::SeqCst) + 1;
        if let Some(bar) = &self.bar {
            bar.inc(1);
        }
        if self.shell.is_verbose() {
            eprintln!("  {} {} [{}/{}]", self.message, item, done, self.total);
        }
    }

    pub fn finish(&self) {
        if let Some(bar) = &self.bar {
            bar.finish_and_clear();
        }
    }
}

fn format_duration(duration: Duration) -> String {
    let secs = duration.as_secs_f64();
    if secs < 60.0 {
        format!("{:.2}s", secs)
    } else {
        format!("{:.1}m", secs / 60.0)
    }
}
