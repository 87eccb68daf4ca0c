//! Stage status lines.
//!
//! On a terminal each stage gets one spinner line with its item count. Off a
//! terminal every line is hidden and the batch runner logs progress instead.

use std::io::IsTerminal;
use std::time::Duration;

use indicatif::{MultiProgress, ProgressBar, ProgressStyle};

const STAGE_TEMPLATE: &str = "{spinner:.green} {prefix:<10.cyan.bold} {pos:>6} {wide_msg:.dim}";
const TICK: Duration = Duration::from_millis(80);

/// Owns the terminal area shared by stage lines and log output.
pub struct ProgressContext {
    multi: MultiProgress,
    is_tty: bool,
}

impl ProgressContext {
    /// Draws only when stderr is a terminal.
    pub fn new() -> Self {
        Self::with_tty(std::io::stderr().is_terminal())
    }

    /// Never draws.
    pub fn hidden() -> Self {
        Self::with_tty(false)
    }

    fn with_tty(is_tty: bool) -> Self {
        Self {
            multi: MultiProgress::new(),
            is_tty,
        }
    }

    /// Spinner line for one stage, labelled `name`.
    ///
    /// The runner bumps the position per item and clears the line when done.
    pub fn stage_line(&self, name: &str) -> ProgressBar {
        if !self.is_tty {
            return ProgressBar::hidden();
        }
        let line = self.multi.add(ProgressBar::new_spinner());
        if let Ok(style) = ProgressStyle::with_template(STAGE_TEMPLATE) {
            line.set_style(style);
        }
        line.set_prefix(name.to_string());
        line.enable_steady_tick(TICK);
        line
    }

    pub fn is_tty(&self) -> bool {
        self.is_tty
    }

    /// Needed by the logger to print above the stage lines.
    pub fn multi(&self) -> &MultiProgress {
        &self.multi
    }
}

impl Default for ProgressContext {
    fn default() -> Self {
        Self::new()
    }
}

/// `1234567` -> `"1,234,567"`
pub fn fmt_num(n: usize) -> String {
    let digits = n.to_string();
    let head = digits.len() % 3;
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, c) in digits.char_indices() {
        if i > 0 && (i + 3 - head) % 3 == 0 {
            out.push(',');
        }
        out.push(c);
    }
    out
}
