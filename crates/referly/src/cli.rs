//! Clap derive structures for the `referly` CLI.
//!
//! Defines the command tree, global flags, and shared value enums.

use clap::{Args, Parser, Subcommand, ValueEnum};

// ── Top-Level CLI ────────────────────────────────────────────────────

/// referly -- affiliate referral analytics from the command line
#[derive(Debug, Parser)]
#[command(
    name = "referly",
    version,
    about = "Inspect affiliate referral codes, earnings, and conversion trends",
    long_about = "A CLI dashboard for affiliate referral analytics.\n\n\
        Authenticates against the affiliate backend, fetches referral-code\n\
        and purchase-history data, and renders aggregated statistics,\n\
        filterable code tables, and daily conversion time series.",
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
    /// Backend profile to use
    #[arg(long, short = 'p', env = "REFERLY_PROFILE", global = true)]
    pub profile: Option<String>,

    /// Backend base URL (overrides profile)
    #[arg(long, short = 'b', env = "REFERLY_BACKEND", global = true)]
    pub backend: Option<String>,

    /// Affiliate scope for data fetches ("system" for system-level codes)
    #[arg(long, env = "REFERLY_AFFILIATE", global = true)]
    pub affiliate: Option<String>,

    /// Output format
    #[arg(
        long,
        short = 'o',
        env = "REFERLY_OUTPUT",
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

    /// Accept self-signed TLS certificates
    #[arg(long, short = 'k', env = "REFERLY_INSECURE", global = true)]
    pub insecure: bool,

    /// Request timeout in seconds
    #[arg(long, env = "REFERLY_TIMEOUT", default_value = "30", global = true)]
    pub timeout: u64,
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
    /// Log in and cache the session
    Login(LoginArgs),

    /// Clear the cached session
    Logout,

    /// Show the cached session identity
    Whoami,

    /// List referral codes with filtering and sorting
    #[command(alias = "c")]
    Codes(CodesArgs),

    /// Show aggregated dashboard statistics
    #[command(alias = "s")]
    Stats,

    /// Show the daily conversion time series
    Series(SeriesArgs),

    /// Manage configuration profiles
    Config(ConfigArgs),
}

// ── Per-Command Args ─────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct LoginArgs {
    /// Login email (prompted for password unless --password is given)
    #[arg(long, short = 'e')]
    pub email: Option<String>,

    /// Login password (prefer the interactive prompt or REFERLY_PASSWORD)
    #[arg(long, hide = true)]
    pub password: Option<String>,
}

#[derive(Debug, Args)]
pub struct CodesArgs {
    /// Case-insensitive substring filter over code, id, and status
    #[arg(long, short = 'f')]
    pub filter: Option<String>,

    /// Sort column (code, status, created-at, signups, total-conversions,
    /// earnings, total-referrals, quota, start-date, end-date)
    #[arg(long, short = 's')]
    pub sort: Option<String>,

    /// Sort descending instead of ascending
    #[arg(long, short = 'd')]
    pub desc: bool,
}

#[derive(Debug, Args)]
pub struct SeriesArgs {
    /// Range start (YYYY-MM-DD); defaults to the earliest signup
    #[arg(long)]
    pub start: Option<String>,

    /// Range end (YYYY-MM-DD); defaults to today
    #[arg(long)]
    pub end: Option<String>,

    /// Widen the range start to the earliest referral-code start date
    #[arg(long, conflicts_with = "start")]
    pub from_code_history: bool,
}

#[derive(Debug, Args)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub command: ConfigCommand,
}

#[derive(Debug, Subcommand)]
pub enum ConfigCommand {
    /// Print the config file path
    Path,

    /// Show the active configuration (passwords redacted)
    Show,

    /// Create or update a profile
    Init(ConfigInitArgs),
}

#[derive(Debug, Args)]
pub struct ConfigInitArgs {
    /// Backend base URL
    #[arg(long)]
    pub backend: String,

    /// Login email
    #[arg(long)]
    pub email: Option<String>,

    /// Profile name to create or update
    #[arg(long, default_value = "default")]
    pub name: String,

    /// Make this the default profile
    #[arg(long)]
    pub default: bool,
}
