//! Error reports printed by the CLI.
//!
//! A [`Diagnostic`] is the terminal rendering of a [`StageError`]: a headline,
//! the path involved (if any), detail lines taken from the underlying
//! failure, and hints for fixing it.
//!
//! [`StageError`]: crate::core::error::StageError

use std::fmt::Write as _;
use std::path::{Path, PathBuf};

const RED: &str = "\x1b[1;31m";
const GREEN: &str = "\x1b[1;32m";
const BLUE: &str = "\x1b[1;34m";
const RESET: &str = "\x1b[0m";

/// A failure report for the terminal.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Diagnostic {
    pub message: String,
    /// File or directory the failure concerns.
    pub location: Option<PathBuf>,
    /// Detail lines, e.g. the package manager's stderr.
    pub details: Vec<String>,
    pub hints: Vec<String>,
}

impl Diagnostic {
    pub fn error(message: impl Into<String>) -> Self {
        Diagnostic {
            message: message.into(),
            ..Default::default()
        }
    }

    pub fn with_location(mut self, path: impl AsRef<Path>) -> Self {
        self.location = Some(path.as_ref().to_path_buf());
        self
    }

    /// Add detail text. Multi-line text becomes one detail per non-empty line.
    pub fn with_context(mut self, text: impl AsRef<str>) -> Self {
        self.details.extend(
            text.as_ref()
                .lines()
                .map(str::trim_end)
                .filter(|line| !line.is_empty())
                .map(String::from),
        );
        self
    }

    pub fn with_suggestion(mut self, hint: impl Into<String>) -> Self {
        self.hints.push(hint.into());
        self
    }

    /// Render for the terminal, with ANSI colors if `color` is set.
    pub fn format(&self, color: bool) -> String {
        let paint = |code: &str, text: &str| {
            if color {
                format!("{}{}{}", code, text, RESET)
            } else {
                text.to_string()
            }
        };

        let mut out = String::new();
        let _ = writeln!(out, "{}: {}", paint(RED, "error"), self.message);

        if let Some(path) = &self.location {
            let _ = writeln!(out, "  {} {}", paint(BLUE, "-->"), path.display());
        }
        for line in &self.details {
            let _ = writeln!(out, "  {} {}", paint(BLUE, "|"), line);
        }

        match self.hints.as_slice() {
            [] => {}
            [hint] => {
                let _ = writeln!(out, "\n{}: {}", paint(GREEN, "help"), hint);
            }
            hints => {
                let _ = writeln!(out, "\n{}: consider:", paint(GREEN, "help"));
                for (i, hint) in hints.iter().enumerate() {
                    let _ = writeln!(out, "  {}. {}", i + 1, hint);
                }
            }
        }

        out
    }
}

/// Print a diagnostic to stderr.
pub fn emit(diagnostic: &Diagnostic, color: bool) {
    eprint!("{}", diagnostic.format(color));
}
