use anyhow::{Context, Result};
use dq_parser::{DatasetOptions, parse_file, read_dataset};
use dq_validator::{ValidationError, ValidationOptions, Validator};
use std::path::Path;
use tracing::info;

use crate::output;

pub fn execute(
    constraints_path: &str,
    data_path: &str,
    fail_fast: bool,
    format: &str,
    parse_timestamps: bool,
) -> Result<()> {
    info!("Validating {} against {}", data_path, constraints_path);
    info!("Fail-fast mode: {}", fail_fast);

    let set = parse_file(Path::new(constraints_path))
        .with_context(|| format!("Failed to parse constraint file: {}", constraints_path))?;

    let dataset_options = DatasetOptions::new().with_parse_timestamps(parse_timestamps);
    let dataset = read_dataset(Path::new(data_path), &dataset_options)
        .with_context(|| format!("Failed to read dataset: {}", data_path))?;

    if format != "json" {
        output::print_info(&format!(
            "Loaded {} constraints and {} rows",
            set.len(),
            dataset.len()
        ));
    }

    let options = if fail_fast {
        ValidationOptions::fail_fast()
    } else {
        ValidationOptions::new()
    };

    match Validator::new().with_options(options).validate(&set, &dataset) {
        Ok(result) => {
            output::print_validation_report(&result, format)?;
            if !result.passed() {
                std::process::exit(1);
            }
        }
        Err(ValidationError::Violation(violation)) => {
            output::print_violation(&violation, format)?;
            std::process::exit(1);
        }
        Err(err) => {
            return Err(err).context("Constraint set cannot be validated");
        }
    }

    Ok(())
}
