use anyhow::{Context, Result};
use dq_parser::{DatasetOptions, read_dataset, to_json, write_file};
use dq_validator::{Discoverer, DiscoveryOptions};
use std::path::Path;
use tracing::info;

use crate::output;

pub fn execute(
    data_path: &str,
    output_path: Option<&str>,
    options: DiscoveryOptions,
    parse_timestamps: bool,
) -> Result<()> {
    info!("Discovering constraints from: {}", data_path);

    let dataset_options = DatasetOptions::new().with_parse_timestamps(parse_timestamps);
    let dataset = read_dataset(Path::new(data_path), &dataset_options)
        .with_context(|| format!("Failed to read dataset: {}", data_path))?;

    if dataset.is_empty() {
        info!("Dataset is empty, no constraints discovered");
    }

    let set = Discoverer::new().with_options(options).discover(&dataset);

    match output_path {
        Some(path) => {
            write_file(Path::new(path), &set)
                .with_context(|| format!("Failed to write constraint file: {}", path))?;
            output::print_success(&format!(
                "Discovered {} constraints over {} columns ({} rows) -> {}",
                set.len(),
                set.column_names().count(),
                dataset.len(),
                path
            ));
        }
        None => {
            let json = to_json(&set).context("Failed to serialize constraint set")?;
            println!("{}", json);
        }
    }

    Ok(())
}
