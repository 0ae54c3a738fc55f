mod commands;
mod output;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "dq")]
#[command(version, about = "Declarative data quality checks for tabular data", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Validate a dataset against a constraint file
    Validate {
        /// Path to the constraint file (JSON, YAML or TOML)
        constraints: String,

        /// Path to the dataset (JSON array or JSON Lines)
        data: String,

        /// Stop at the first failing value
        #[arg(long)]
        fail_fast: bool,

        /// Output format: text, json
        #[arg(short, long, default_value = "text", value_parser = ["text", "json"])]
        format: String,

        /// Read RFC 3339 strings as timestamps
        #[arg(long)]
        parse_timestamps: bool,
    },

    /// Check a constraint file without validating data
    Check {
        /// Path to the constraint file (JSON, YAML or TOML)
        constraints: String,

        /// Output format: text, json
        #[arg(short, long, default_value = "text", value_parser = ["text", "json"])]
        format: String,
    },

    /// Discover constraints from a reference dataset
    Discover {
        /// Path to the dataset (JSON array or JSON Lines)
        data: String,

        /// Output file path, format chosen by extension (defaults to JSON on stdout)
        #[arg(short, long)]
        output: Option<String>,

        /// Largest number of distinct strings turned into allowed values
        #[arg(long, default_value_t = 20)]
        max_allowed_values: usize,

        /// Do not infer uniqueness
        #[arg(long)]
        no_unique: bool,

        /// Record the observed column count as a shape constraint
        #[arg(long)]
        infer_shape: bool,

        /// Reject columns that the discovered set does not declare
        #[arg(long)]
        strict_columns: bool,

        /// Read RFC 3339 strings as timestamps
        #[arg(long)]
        parse_timestamps: bool,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize tracing
    let log_level = if cli.verbose {
        tracing::Level::DEBUG
    } else {
        tracing::Level::INFO
    };

    // stdout is reserved for reports
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(false)
                .with_level(true)
                .compact(),
        )
        .with(tracing_subscriber::filter::LevelFilter::from_level(
            log_level,
        ))
        .init();

    // Execute command
    match cli.command {
        Commands::Validate {
            constraints,
            data,
            fail_fast,
            format,
            parse_timestamps,
        } => commands::validate::execute(&constraints, &data, fail_fast, &format, parse_timestamps),

        Commands::Check {
            constraints,
            format,
        } => commands::check::execute(&constraints, &format),

        Commands::Discover {
            data,
            output,
            max_allowed_values,
            no_unique,
            infer_shape,
            strict_columns,
            parse_timestamps,
        } => {
            let options = dq_validator::DiscoveryOptions::new()
                .with_max_allowed_values(max_allowed_values)
                .with_uniqueness(!no_unique)
                .with_shape(infer_shape)
                .with_allow_extra_columns(!strict_columns);
            commands::discover::execute(&data, output.as_deref(), options, parse_timestamps)
        }
    }
}
