//! CLI output formatting for pipeline runs.
//!
//! # Output Format
//!
//! ## Run
//!
//! ```text
//! ============================================================
//! Executing operation #0: renumber
//! ============================================================
//!     Processed 3 records (0 skipped)
//! ============================================================
//! Executing operation #1: update-metadata
//! ============================================================
//!     Processed 1 records (2 skipped)
//!
//! Completed 2 of 2 steps
//! ```
//!
//! A step that fails prints `Operation #<index> (<name>) failed: <error>` in place of
//! its summary. The index is the number of operations that had completed before it.
//!
//! ## Check
//!
//! ```text
//! 001 renumber
//!     start_from_id = 10
//! 002 format-metadata
//! ```
//!
//! ## Operations
//!
//! ```text
//! renumber
//!     start_from_id: int (required)
//!         First token id to assign
//! ```
//!
//! # Architecture
//!
//! Each view has a `format_*` function (returns `Vec<String>`) for testability
//! and a `print_*` wrapper that writes to stdout. Format functions are pure.

use crate::config::StepConfig;
use crate::manager::OperationSummary;
use crate::operation::OperationKind;
use crate::options::{FROM_ID, TO_ID};
use std::fmt::Display;

const RULE_WIDTH: usize = 60;

/// Format a 1-based positional index as 3-digit zero-padded.
fn format_index(pos: usize) -> String {
    format!("{:0>3}", pos)
}

/// Return indentation string: 4 spaces per depth level.
fn indent(depth: usize) -> String {
    "    ".repeat(depth)
}

fn rule() -> String {
    "=".repeat(RULE_WIDTH)
}

// ============================================================================
// Run output
// ============================================================================

/// Banner printed before an operation starts.
pub fn format_banner(index: usize, operation: &str) -> Vec<String> {
    vec![
        rule(),
        format!("Executing operation #{}: {}", index, operation),
        rule(),
    ]
}

pub fn print_banner(index: usize, operation: &str) {
    for line in format_banner(index, operation) {
        println!("{}", line);
    }
}

pub fn format_summary(summary: &OperationSummary) -> Vec<String> {
    vec![format!(
        "{}Processed {} records ({} skipped)",
        indent(1),
        summary.executed,
        summary.skipped
    )]
}

pub fn print_summary(summary: &OperationSummary) {
    for line in format_summary(summary) {
        println!("{}", line);
    }
}

pub fn format_failure(index: usize, operation: &str, error: &dyn Display) -> Vec<String> {
    vec![format!(
        "Operation #{} ({}) failed: {}",
        index, operation, error
    )]
}

pub fn print_failure(index: usize, operation: &str, error: &dyn Display) {
    for line in format_failure(index, operation, error) {
        println!("{}", line);
    }
}

/// Closing line of a `run`: how many steps succeeded.
pub fn format_run_total(succeeded: usize, total: usize) -> Vec<String> {
    vec![String::new(), format!("Completed {} of {} steps", succeeded, total)]
}

pub fn print_run_total(succeeded: usize, total: usize) {
    for line in format_run_total(succeeded, total) {
        println!("{}", line);
    }
}

// ============================================================================
// Check output
// ============================================================================

/// Numbered step list with each step's configured options.
pub fn format_steps(steps: &[StepConfig]) -> Vec<String> {
    if steps.is_empty() {
        return vec!["No steps configured".to_string()];
    }

    let mut lines = Vec::new();
    for (i, step) in steps.iter().enumerate() {
        lines.push(format!("{} {}", format_index(i + 1), step.operation));
        for (key, value) in &step.options {
            lines.push(format!("{}{} = {}", indent(1), key, value));
        }
    }
    lines
}

pub fn print_steps(steps: &[StepConfig]) {
    for line in format_steps(steps) {
        println!("{}", line);
    }
}

// ============================================================================
// Operation catalog
// ============================================================================

/// Every operation with its declared options.
pub fn format_operation_catalog(kinds: &[OperationKind]) -> Vec<String> {
    let mut lines = Vec::new();

    for kind in kinds {
        lines.push(kind.to_string());
        let schema = kind.build().configure_options();
        let mut empty = true;
        for (name, spec) in schema.options() {
            empty = false;
            let default = match &spec.default {
                Some(value) => format!("default {}", value),
                None => "required".to_string(),
            };
            lines.push(format!(
                "{}{}: {} ({})",
                indent(1),
                name,
                spec.allowed_types(),
                default
            ));
            lines.push(format!("{}{}", indent(2), spec.description));
        }
        if empty {
            lines.push(format!("{}(no options)", indent(1)));
        }
    }

    lines.push(String::new());
    lines.push(format!(
        "Every operation also accepts {} and {} (int) to limit it to a token id range.",
        FROM_ID, TO_ID
    ));
    lines
}

pub fn print_operation_catalog(kinds: &[OperationKind]) {
    for line in format_operation_catalog(kinds) {
        println!("{}", line);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn format_index_pads_to_three() {
        assert_eq!(format_index(1), "001");
        assert_eq!(format_index(100), "100");
    }

    #[test]
    fn banner_names_operation_and_index() {
        let lines = format_banner(2, "shuffle");
        assert_eq!(lines.len(), 3);
        assert_eq!(lines[0], "=".repeat(60));
        assert_eq!(lines[1], "Executing operation #2: shuffle");
        assert_eq!(lines[2], lines[0]);
    }

    #[test]
    fn summary_counts_records() {
        let summary = OperationSummary {
            index: 0,
            operation: "renumber",
            executed: 3,
            skipped: 1,
        };
        assert_eq!(
            format_summary(&summary),
            vec!["    Processed 3 records (1 skipped)"]
        );
    }

    #[test]
    fn failure_line_includes_error() {
        let lines = format_failure(1, "obfuscate", &"File does not exist: x.png");
        assert_eq!(
            lines,
            vec!["Operation #1 (obfuscate) failed: File does not exist: x.png"]
        );
    }

    #[test]
    fn run_total_has_blank_separator() {
        assert_eq!(
            format_run_total(1, 2),
            vec!["".to_string(), "Completed 1 of 2 steps".to_string()]
        );
    }

    #[test]
    fn steps_list_options_under_each_step() {
        let steps: Vec<StepConfig> = vec![
            StepConfig {
                operation: OperationKind::Renumber,
                options: toml::from_str("start_from_id = 10").unwrap(),
            },
            StepConfig {
                operation: OperationKind::FormatMetadata,
                options: toml::Table::new(),
            },
        ];
        assert_eq!(
            format_steps(&steps),
            vec!["001 renumber", "    start_from_id = 10", "002 format-metadata"]
        );
    }

    #[test]
    fn no_steps_says_so() {
        assert_eq!(format_steps(&[]), vec!["No steps configured"]);
    }

    #[test]
    fn catalog_marks_required_and_defaults() {
        let lines = format_operation_catalog(&OperationKind::ALL);
        assert!(lines.contains(&"renumber".to_string()));
        assert!(lines.contains(&"    start_from_id: int (required)".to_string()));
        assert!(lines.contains(&"    placeholder_value: string (default \"?\")".to_string()));
        assert!(lines.contains(&"    (no options)".to_string()));
        assert!(lines.last().unwrap().contains("from_id"));
    }
}
