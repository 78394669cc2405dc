//! Diagnostic printing.
//!
//! Separate from the engine so the library stays free of printing side
//! effects; the CLI calls this once after all files are scanned.

use colored::Colorize;

use crate::diagnostics::{Diagnostics, Issue, Severity};

/// Print all collected issues to stderr, deterministically ordered, with a
/// one-line summary when anything was reported.
pub fn print_report(diagnostics: &Diagnostics) {
    let mut sorted: Vec<&Issue> = diagnostics.issues().iter().collect();
    sorted.sort();

    for issue in &sorted {
        let severity_str = match issue.severity {
            Severity::Error => "error".bold().red(),
            Severity::Warning => "warning".bold().yellow(),
        };
        match (&issue.file, issue.line) {
            (Some(file), Some(line)) => eprintln!(
                "{}:{}: {}: {}  {}",
                file,
                line,
                severity_str,
                issue.message,
                issue.category.to_string().dimmed().cyan()
            ),
            _ => eprintln!(
                "{}: {}  {}",
                severity_str,
                issue.message,
                issue.category.to_string().dimmed().cyan()
            ),
        }
    }

    if !sorted.is_empty() {
        let warnings = diagnostics.warning_count();
        let errors = sorted.len() - warnings;
        let mut parts = Vec::new();
        if errors > 0 {
            parts.push(format!(
                "{} error{}",
                errors,
                if errors == 1 { "" } else { "s" }
            ));
        }
        if warnings > 0 {
            parts.push(format!(
                "{} warning{}",
                warnings,
                if warnings == 1 { "" } else { "s" }
            ));
        }
        eprintln!("{}", parts.join(", ").bold());
    }
}
