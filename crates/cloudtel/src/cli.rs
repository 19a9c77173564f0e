//! Clap derive structures for the `cloudtel` CLI.
//!
//! Defines the command tree, global flags, and shared types. Kept free of
//! crate-internal imports so `build.rs` can compile it for man pages.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};

// ── Top-Level CLI ────────────────────────────────────────────────────

/// cloudtel -- acquire and inspect readings from a cloud-connected sensor
#[derive(Debug, Parser)]
#[command(
    name = "cloudtel",
    version,
    about = "Poll a cloud-connected sensor and inspect its readings",
    long_about = "Fetches the live status of one device from the vendor cloud API,\n\
        maps its data points into readings, backfills gaps from the report\n\
        log and stores the result. Diagnostics compare what the device\n\
        reports with what its specification declares.",
    propagate_version = true,
    subcommand_required = true,
    arg_required_else_help = true
)]
pub struct Cli {
    #[command(flatten)]
    pub global: GlobalOpts,

    #[command(subcommand)]
    pub command: Command,
}

// ── Global Options ───────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct GlobalOpts {
    /// Config file (defaults to the platform config dir)
    #[arg(long, env = "CLOUDTEL_CONFIG", global = true)]
    pub config: Option<PathBuf>,

    /// Vendor API root, e.g. https://openapi.tuyaus.com
    #[arg(long, global = true)]
    pub base_url: Option<String>,

    /// Cloud project client id
    #[arg(long, global = true)]
    pub client_id: Option<String>,

    /// Device to poll
    #[arg(long, short = 'd', global = true)]
    pub device_id: Option<String>,

    /// Reading store (JSON file)
    #[arg(long, env = "CLOUDTEL_STORE", global = true)]
    pub store: Option<PathBuf>,

    /// Output format
    #[arg(
        long,
        short = 'o',
        env = "CLOUDTEL_OUTPUT",
        default_value = "table",
        global = true
    )]
    pub output: OutputFormat,

    /// When to use color output
    #[arg(long, default_value = "auto", global = true)]
    pub color: ColorMode,

    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(long, short = 'v', action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress non-error output
    #[arg(long, short = 'q', global = true)]
    pub quiet: bool,

    /// Skip confirmation prompts
    #[arg(long, short = 'y', global = true)]
    pub yes: bool,

    /// Request timeout in seconds
    #[arg(long, global = true)]
    pub timeout: Option<u64>,

    /// Emit log lines as JSON
    #[arg(long, global = true)]
    pub log_json: bool,
}

// ── Output & Color Enums ─────────────────────────────────────────────

#[derive(Debug, Clone, ValueEnum)]
pub enum OutputFormat {
    /// Pretty table (default, interactive)
    Table,
    /// Pretty-printed JSON
    Json,
    /// Compact single-line JSON
    JsonCompact,
    /// YAML
    Yaml,
    /// Plain text, one value per line (scripting)
    Plain,
}

#[derive(Debug, Clone, ValueEnum)]
pub enum ColorMode {
    /// Auto-detect (color if terminal is interactive)
    Auto,
    /// Always emit color codes
    Always,
    /// Never emit color codes
    Never,
}

// ── Top-Level Command Enum ───────────────────────────────────────────

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Poll on a fixed interval until interrupted
    Run(RunArgs),

    /// Run one acquisition now and print the stored reading
    Poll,

    /// Show the raw status codes the device currently reports
    Raw,

    /// Show the device's declared specification
    Spec,

    /// Compare reported codes with the declared specification
    Compare,

    /// Summarize stored readings and their completeness
    Status,

    /// Manage stored readings
    #[command(alias = "r")]
    Readings(ReadingsArgs),

    /// Manage the configuration file
    Config(ConfigArgs),

    /// Generate shell completions
    Completions(CompletionsArgs),
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
//  RUN
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Args)]
pub struct RunArgs {
    /// Poll interval in milliseconds (overrides poll.interval_ms)
    #[arg(long)]
    pub interval_ms: Option<u64>,

    /// Disable report-log backfill for this run
    #[arg(long)]
    pub no_enrich: bool,
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
//  READINGS
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Args)]
pub struct ReadingsArgs {
    #[command(subcommand)]
    pub command: ReadingsCommand,
}

#[derive(Debug, Subcommand)]
pub enum ReadingsCommand {
    /// List stored readings, oldest first
    #[command(alias = "ls")]
    List {
        /// Only the newest N readings
        #[arg(long, short = 'l')]
        limit: Option<usize>,
    },

    /// Show the newest readings with per-channel trends
    Latest {
        /// Number of readings
        #[arg(long, short = 'n', default_value = "10")]
        count: usize,
    },

    /// Show one reading
    Get {
        /// Reading id (UUID)
        id: String,
    },

    /// Store a manually supplied reading
    Add(ReadingFields),

    /// Replace every field of a stored reading
    Update {
        /// Reading id (UUID)
        id: String,

        #[command(flatten)]
        fields: ReadingFields,
    },

    /// Delete a stored reading
    #[command(alias = "rm")]
    Delete {
        /// Reading id (UUID)
        id: String,
    },
}

#[derive(Debug, Args)]
pub struct ReadingFields {
    /// Reading label (defaults to "Manual Sensor")
    #[arg(long)]
    pub label: Option<String>,

    /// Temperature in °C
    #[arg(long, allow_negative_numbers = true)]
    pub temperature: Option<f64>,

    #[arg(long)]
    pub ph: Option<f64>,

    /// Oxidation-reduction potential in mV
    #[arg(long, allow_negative_numbers = true)]
    pub orp: Option<f64>,

    /// Conductivity in mS/cm
    #[arg(long)]
    pub conductivity: Option<f64>,

    /// Dissolved solids in ppm
    #[arg(long)]
    pub dissolved_solids: Option<f64>,

    /// Salinity in ppm
    #[arg(long)]
    pub salinity: Option<f64>,

    /// RFC 3339 timestamp (defaults to now)
    #[arg(long)]
    pub timestamp: Option<String>,

    /// Read the reading from a JSON file instead of flags
    #[arg(
        long,
        short = 'F',
        conflicts_with_all = [
            "label", "temperature", "ph", "orp", "conductivity",
            "dissolved_solids", "salinity", "timestamp",
        ]
    )]
    pub from_file: Option<PathBuf>,
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
//  CONFIG
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Args)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub command: ConfigCommand,
}

#[derive(Debug, Subcommand)]
pub enum ConfigCommand {
    /// Display the resolved configuration (secrets redacted)
    Show,

    /// Print the config file path
    Path,

    /// Write a starter config file
    Init {
        /// Overwrite an existing file without asking
        #[arg(long)]
        force: bool,
    },

    /// Store the client secret in the system keyring
    SetSecret,
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
//  COMPLETIONS
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Args)]
pub struct CompletionsArgs {
    /// Shell to generate completions for
    pub shell: clap_complete::Shell,
}
