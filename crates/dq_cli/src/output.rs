use anyhow::Result;
use colored::*;
use dq_core::{ConstraintOutcome, ValidationResult, Violation};
use serde_json::json;

/// Offending rows listed per constraint in the text table.
const MAX_LISTED_ROWS: usize = 10;

pub fn print_validation_report(result: &ValidationResult, format: &str) -> Result<()> {
    match format {
        "json" => print_json_report(result),
        _ => {
            print_text_report(result);
            Ok(())
        }
    }
}

fn print_text_report(result: &ValidationResult) {
    println!("\n{}", "═".repeat(78));
    println!("{}", "  VALIDATION REPORT".bold());
    println!("{}", "═".repeat(78));

    if result.passed() {
        println!(
            "\n{} {}",
            "✓".green().bold(),
            "Validation PASSED".green().bold()
        );
    } else {
        println!(
            "\n{} {}",
            "✗".red().bold(),
            "Validation FAILED".red().bold()
        );
    }

    println!(
        "\n  {:<20} {:<16} {:>8} {:>8}  {}",
        "Column".bold(),
        "Constraint".bold(),
        "Passed".bold(),
        "Failed".bold(),
        "Offending rows".bold()
    );
    println!("  {}", "─".repeat(76));
    for outcome in &result.outcomes {
        print_outcome_row(outcome);
    }

    let failing: Vec<_> = result.failing().collect();
    if !failing.is_empty() {
        println!("\n{}", "Failures:".red().bold());
        for outcome in failing {
            for failure in outcome.failures.iter().take(MAX_LISTED_ROWS) {
                let location = failure
                    .row
                    .map_or("dataset".to_string(), |row| format!("row {}", row));
                println!(
                    "  {} [{}] {}: {}",
                    outcome.column,
                    outcome.constraint,
                    location,
                    failure.message.red()
                );
            }
        }
    }

    println!("\n{}", "Summary:".bold());
    println!("  Rows validated:        {}", result.stats.rows_validated);
    println!("  Constraints evaluated: {}", result.stats.constraints_evaluated);
    println!("  Total passed:          {}", result.total_passed());
    println!("  Total failed:          {}", result.total_failed());
    println!("  Duration:              {} ms", result.stats.duration_ms);
    println!("{}", "═".repeat(78));
}

fn print_outcome_row(outcome: &ConstraintOutcome) {
    let rows = outcome.offending_rows();
    let mut listed: Vec<String> = rows
        .iter()
        .take(MAX_LISTED_ROWS)
        .map(usize::to_string)
        .collect();
    if outcome.failed > listed.len() {
        listed.push("…".to_string());
    }

    let failed = if outcome.is_passing() {
        outcome.failed.to_string().green()
    } else {
        outcome.failed.to_string().red()
    };
    println!(
        "  {:<20} {:<16} {:>8} {:>8}  {}",
        outcome.column,
        outcome.constraint,
        outcome.passed,
        failed,
        listed.join(", ")
    );
}

fn print_json_report(result: &ValidationResult) -> Result<()> {
    let output = json!({
        "passed": result.passed(),
        "outcomes": &result.outcomes,
        "summary": {
            "total_passed": result.total_passed(),
            "total_failed": result.total_failed(),
            "rows_validated": result.stats.rows_validated,
            "constraints_evaluated": result.stats.constraints_evaluated,
            "duration_ms": result.stats.duration_ms,
        }
    });

    println!("{}", serde_json::to_string_pretty(&output)?);
    Ok(())
}

/// Reports the violation that stopped a fail-fast run.
pub fn print_violation(violation: &Violation, format: &str) -> Result<()> {
    if format == "json" {
        let output = json!({
            "passed": false,
            "violation": violation,
        });
        println!("{}", serde_json::to_string_pretty(&output)?);
    } else {
        println!(
            "\n{} {}",
            "✗".red().bold(),
            "Validation FAILED (fail-fast)".red().bold()
        );
        println!("  {}", violation.to_string().red());
    }
    Ok(())
}

pub fn print_success(message: &str) {
    println!("{} {}", "✓".green().bold(), message.green());
}

pub fn print_warning(message: &str) {
    println!("{} {}", "⚠".yellow().bold(), message.yellow());
}

pub fn print_info(message: &str) {
    println!("{} {}", "ℹ".blue().bold(), message);
}
