//! Command-line argument definitions

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

#[derive(Parser)]
#[command(
    name = "flatfile-bridge",
    version,
    about = "Move tabular data between ClickHouse and delimited flat files",
    long_about = "Drives the ingestion workflow non-interactively.\n\n\
                  Database sources are exported to a local delimited file;\n\
                  file sources are uploaded and imported into a table."
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// TOML configuration file
    #[arg(long, value_name = "PATH", global = true)]
    pub config: Option<PathBuf>,

    /// Base URL of the ingestion API (overrides config and environment)
    #[arg(long = "api-url", value_name = "URL", global = true)]
    pub api_url: Option<String>,

    /// Increase log verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    #[command(flatten)]
    pub connection: ConnectionArgs,
}

/// Overrides for the configured connection
#[derive(Args, Default)]
pub struct ConnectionArgs {
    #[arg(long, global = true)]
    pub host: Option<String>,

    /// Port; only leading digits are used
    #[arg(long, global = true)]
    pub port: Option<String>,

    #[arg(long, global = true)]
    pub database: Option<String>,

    #[arg(long, global = true)]
    pub user: Option<String>,

    /// Password or JWT token
    #[arg(
        long,
        env = "FLATFILE_BRIDGE_CREDENTIAL",
        hide_env_values = true,
        global = true
    )]
    pub credential: Option<String>,
}

#[derive(Subcommand)]
pub enum Command {
    /// Connect and list tables
    Tables,

    /// List the columns of a table or a file header
    Columns(ColumnsArgs),

    /// Print a sample of rows
    Preview(PreviewArgs),

    /// Export table columns to a local delimited file
    Export(ExportArgs),

    /// Upload a delimited file and import it into a table
    Import(ImportArgs),
}

/// Either a table or a file to read from
#[derive(Args)]
#[group(required = true, multiple = false)]
pub struct SourceArgs {
    /// Source table
    #[arg(long)]
    pub table: Option<String>,

    /// Source file
    #[arg(long, value_name = "PATH")]
    pub file: Option<PathBuf>,
}

#[derive(Args)]
pub struct ColumnsArgs {
    #[command(flatten)]
    pub source: SourceArgs,

    /// Field delimiter of the file
    #[arg(long)]
    pub delimiter: Option<char>,
}

#[derive(Args)]
pub struct PreviewArgs {
    #[command(flatten)]
    pub source: SourceArgs,

    /// Columns to include (default: all)
    #[arg(long, value_delimiter = ',')]
    pub columns: Vec<String>,

    #[arg(long)]
    pub delimiter: Option<char>,
}

#[derive(Args)]
pub struct ExportArgs {
    /// Table to export
    #[arg(long)]
    pub table: String,

    /// Destination file
    #[arg(long, value_name = "PATH")]
    pub output: String,

    /// Columns to export (default: all)
    #[arg(long, value_delimiter = ',')]
    pub columns: Vec<String>,

    /// Field delimiter of the written file
    #[arg(long)]
    pub delimiter: Option<char>,
}

#[derive(Args)]
pub struct ImportArgs {
    /// File to import
    #[arg(long, value_name = "PATH")]
    pub file: PathBuf,

    /// Destination table (default: derived from the file name)
    #[arg(long = "target-table")]
    pub target_table: Option<String>,

    /// Columns to import (default: all)
    #[arg(long, value_delimiter = ',')]
    pub columns: Vec<String>,

    #[arg(long)]
    pub delimiter: Option<char>,
}
