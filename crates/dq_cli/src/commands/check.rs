use anyhow::{Context, Result};
use dq_core::{ConstraintKind, ConstraintSet, DATASET_KEY};
use dq_parser::parse_file;
use serde_json::json;
use std::path::Path;
use tracing::info;

use crate::output;

pub fn execute(constraints_path: &str, format: &str) -> Result<()> {
    info!("Checking constraint file: {}", constraints_path);

    // Parsing re-checks every definition
    let path = Path::new(constraints_path);
    let set = parse_file(path)
        .with_context(|| format!("Failed to parse constraint file: {}", constraints_path))?;

    let unbound = custom_predicates(&set);

    if format == "json" {
        let columns: serde_json::Map<String, serde_json::Value> = set
            .column_names()
            .map(|column| (column.to_string(), json!(set.constraints_for(column).len())))
            .collect();
        let output = json!({
            "valid": true,
            "allow_extra_columns": set.allow_extra_columns(),
            "constraints": set.len(),
            "dataset_constraints": set.constraints_for(DATASET_KEY).len(),
            "columns": columns,
            "custom_predicates": unbound,
        });
        println!("{}", serde_json::to_string_pretty(&output)?);
        return Ok(());
    }

    output::print_success("Constraint file is valid");

    println!("\nConstraint Summary:");
    println!("  Constraints:         {}", set.len());
    println!("  Columns:             {}", set.column_names().count());
    println!("  Extra columns:       {}", if set.allow_extra_columns() { "allowed" } else { "rejected" });

    let dataset_level = set.constraints_for(DATASET_KEY);
    if !dataset_level.is_empty() {
        println!("\nDataset:");
        for kind in dataset_level {
            println!("  - {}", kind);
        }
    }

    println!("\nColumns:");
    for column in set.column_names() {
        let kinds: Vec<String> = set
            .constraints_for(column)
            .iter()
            .map(ToString::to_string)
            .collect();
        if kinds.is_empty() {
            println!("  {}: (declared only)", column);
        } else {
            println!("  {}: {}", column, kinds.join("; "));
        }
    }

    if !unbound.is_empty() {
        println!();
        output::print_warning(&format!(
            "Custom predicates must be registered by the embedding program: {}",
            unbound.join(", ")
        ));
    }

    Ok(())
}

/// Names of custom predicates referenced by the set, in declared order.
fn custom_predicates(set: &ConstraintSet) -> Vec<String> {
    let mut names: Vec<String> = Vec::new();
    for (_, kind) in set.iter() {
        if let ConstraintKind::Custom { name, .. } = kind {
            if !names.contains(name) {
                names.push(name.clone());
            }
        }
    }
    names
}
