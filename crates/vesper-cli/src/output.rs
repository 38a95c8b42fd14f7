//! Colored console output for the CLI.
//!
//! Uses `termcolor` for cross-platform colored terminal output and
//! respects the `NO_COLOR` environment variable.

use std::io::Write;

use termcolor::{Color, ColorChoice, ColorSpec, StandardStream, WriteColor};
use vesper_pm::{InstallOutcome, ProgressReporter, RunSummary};

/// Resolve `ColorChoice` from environment: `NO_COLOR` wins, otherwise
/// auto-detect.
pub fn resolve_color_choice() -> ColorChoice {
    if std::env::var_os("NO_COLOR").is_some() {
        ColorChoice::Never
    } else {
        ColorChoice::Auto
    }
}

/// Progress reporter that renders planner events to the terminal.
pub struct ConsoleReporter {
    stdout: StandardStream,
    stderr: StandardStream,
}

impl ConsoleReporter {
    pub fn new(choice: ColorChoice) -> Self {
        Self {
            stdout: StandardStream::stdout(choice),
            stderr: StandardStream::stderr(choice),
        }
    }

    fn write_styled(&mut self, text: &str, color: Option<Color>, bold: bool) {
        let mut spec = ColorSpec::new();
        spec.set_fg(color).set_bold(bold);
        let _ = self.stdout.set_color(&spec);
        let _ = write!(self.stdout, "{}", text);
        let _ = self.stdout.reset();
    }

    /// Render the end-of-run summary and per-entry failures.
    pub fn summary(&mut self, summary: &RunSummary) {
        if summary.is_empty() {
            let _ = writeln!(self.stdout, "nothing to install");
            return;
        }
        let _ = writeln!(self.stdout);
        if summary.all_succeeded() {
            self.write_styled("done", Some(Color::Green), true);
            let _ = writeln!(self.stdout, ": {} dependencies", summary.succeeded());
        } else {
            self.write_styled("done with errors", Some(Color::Red), true);
            let _ = writeln!(
                self.stdout,
                ": {} succeeded, {} failed",
                summary.succeeded(),
                summary.failed()
            );
            for name in summary.failures() {
                let _ = writeln!(self.stdout, "  failed: {}", name);
            }
        }
        let _ = self.stdout.flush();
    }
}

impl ProgressReporter for ConsoleReporter {
    fn entry_started(&mut self, name: &str, constraint: &str) {
        self.write_styled(name, None, true);
        let _ = write!(self.stdout, " {} ... ", constraint);
        let _ = self.stdout.flush();
    }

    fn entry_finished(&mut self, _name: &str, outcome: &InstallOutcome) {
        match outcome {
            InstallOutcome::Failed(_) => {
                self.write_styled(&outcome.to_string(), Some(Color::Red), false);
            }
            InstallOutcome::UpToDate => {
                self.write_styled(&outcome.to_string(), Some(Color::Cyan), false);
            }
            _ => {
                self.write_styled(&outcome.to_string(), Some(Color::Green), false);
            }
        }
        let _ = writeln!(self.stdout);
    }

    fn warning(&mut self, message: &str) {
        let mut spec = ColorSpec::new();
        spec.set_fg(Some(Color::Yellow)).set_bold(true);
        let _ = self.stderr.set_color(&spec);
        let _ = write!(self.stderr, "warning");
        let _ = self.stderr.reset();
        let _ = writeln!(self.stderr, ": {}", message);
    }
}
