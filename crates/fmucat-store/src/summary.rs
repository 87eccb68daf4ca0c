//! Summary of a result table: session counts and outstanding failures.

use std::fmt;

use comfy_table::{Cell, Color, Table, modifiers::UTF8_ROUND_CORNERS, presets::UTF8_FULL};
use fmucat_core::fmt_num;

use crate::store::SessionStats;

/// One failed record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Failure {
    pub key: String,
    pub message: String,
}

/// Structured counts for a table. Rendering is left to the caller:
/// `Display` for plain text, [`format_table`](Summary::format_table) on a TTY,
/// [`log`](Summary::log) otherwise.
#[derive(Debug, Clone)]
pub struct Summary {
    pub session: SessionStats,
    /// Records in the whole table
    pub total: usize,
    /// Succeeded records in the whole table
    pub total_succeeded: usize,
    /// Every failed record in the table, not only this session's
    pub failures: Vec<Failure>,
}

impl fmt::Display for Summary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "{} succeeded, {} failed, {} skipped (already recorded)",
            self.session.succeeded, self.session.failed, self.session.skipped
        )?;
        write!(
            f,
            "The table now has {} succeeded of {} records",
            self.total_succeeded, self.total
        )?;
        if !self.failures.is_empty() {
            write!(f, "\nErrors:")?;
            for failure in &self.failures {
                write!(f, "\n  {}: {}", failure.key, failure.message)?;
            }
        }
        Ok(())
    }
}

impl Summary {
    /// Format as a table (TTY mode). Failures are listed below the counts.
    pub fn format_table(&self, title: &str) -> String {
        let mut table = Table::new();
        table
            .load_preset(UTF8_FULL)
            .apply_modifier(UTF8_ROUND_CORNERS)
            .set_header(vec![
                Cell::new(title)
                    .fg(Color::Cyan)
                    .add_attribute(comfy_table::Attribute::Bold),
                Cell::new("Value").fg(Color::Cyan),
            ]);

        table.add_row(vec![
            Cell::new("Succeeded (this run)"),
            Cell::new(fmt_num(self.session.succeeded)),
        ]);
        table.add_row(vec![
            Cell::new("Failed (this run)"),
            Cell::new(fmt_num(self.session.failed)).fg(if self.session.failed > 0 {
                Color::Red
            } else {
                Color::Reset
            }),
        ]);
        table.add_row(vec![
            Cell::new("Skipped (already recorded)"),
            Cell::new(fmt_num(self.session.skipped)),
        ]);
        table.add_row(vec![
            Cell::new("Table succeeded / total"),
            Cell::new(format!(
                "{} / {}",
                fmt_num(self.total_succeeded),
                fmt_num(self.total)
            )),
        ]);

        let mut out = table.to_string();
        if !self.failures.is_empty() {
            let mut errors = Table::new();
            errors
                .load_preset(UTF8_FULL)
                .apply_modifier(UTF8_ROUND_CORNERS)
                .set_header(vec![
                    Cell::new("Failed key").fg(Color::Red),
                    Cell::new("Diagnostic").fg(Color::Red),
                ]);
            for failure in &self.failures {
                errors.add_row(vec![failure.key.as_str(), failure.message.as_str()]);
            }
            out.push('\n');
            out.push_str(&errors.to_string());
        }
        out
    }

    /// Print table to stderr (TTY mode).
    pub fn print(&self, title: &str) {
        eprintln!("\n{}", self.format_table(title));
    }

    /// Log summary lines (non-TTY mode).
    pub fn log(&self, title: &str) {
        log::info!(
            "{title}: {} succeeded, {} failed, {} skipped; table {}/{} succeeded",
            fmt_num(self.session.succeeded),
            fmt_num(self.session.failed),
            fmt_num(self.session.skipped),
            fmt_num(self.total_succeeded),
            fmt_num(self.total)
        );
        for failure in &self.failures {
            log::info!("{title}: error {}: {}", failure.key, failure.message);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample(failures: Vec<Failure>) -> Summary {
        Summary {
            session: SessionStats {
                succeeded: 3,
                failed: 1,
                skipped: 2,
            },
            total: 10,
            total_succeeded: 10 - failures.len(),
            failures,
        }
    }

    #[test]
    fn display_without_failures() {
        let text = sample(vec![]).to_string();
        assert_eq!(
            text,
            "3 succeeded, 1 failed, 2 skipped (already recorded)\n\
             The table now has 10 succeeded of 10 records"
        );
    }

    #[test]
    fn display_lists_each_failure_on_one_line() {
        let text = sample(vec![
            Failure {
                key: "acme/models".into(),
                message: "Error: HTTP 404: Not Found".into(),
            },
            Failure {
                key: "bad.fmu".into(),
                message: "Missing modelDescription.xml".into(),
            },
        ])
        .to_string();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines.len(), 5);
        assert_eq!(lines[2], "Errors:");
        assert_eq!(lines[3], "  acme/models: Error: HTTP 404: Not Found");
        assert_eq!(lines[4], "  bad.fmu: Missing modelDescription.xml");
    }

    #[test]
    fn table_contains_failure_keys() {
        let out = sample(vec![Failure {
            key: "bad.fmu".into(),
            message: "zip error".into(),
        }])
        .format_table("validate");
        assert!(out.contains("validate"));
        assert!(out.contains("bad.fmu"));
        assert!(out.contains("zip error"));
    }
}
