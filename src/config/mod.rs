pub mod cli;
pub mod toml_config;

#[cfg(feature = "cli")]
use chrono::NaiveDate;
#[cfg(feature = "cli")]
use clap::Parser;

#[cfg(feature = "cli")]
#[derive(Debug, Clone, Parser)]
#[command(name = "ga-pageviews")]
#[command(about = "Aggregate analytics pageviews per document over a date range")]
pub struct CliConfig {
    /// Path to TOML configuration file
    #[arg(short, long, default_value = "ga-pageviews.toml")]
    pub config: String,

    /// First day of the range (YYYY-MM-DD); defaults to 90 days before the end date
    #[arg(long)]
    pub start_date: Option<NaiveDate>,

    /// Last day of the range (YYYY-MM-DD); defaults to today
    #[arg(long)]
    pub end_date: Option<NaiveDate>,

    /// Override output directory from config
    #[arg(long)]
    pub output: Option<String>,

    /// Override output format from config (csv or json)
    #[arg(long)]
    pub format: Option<String>,

    /// Log as JSON lines instead of compact text
    #[arg(long)]
    pub json_logs: bool,

    /// Show the query windows without calling the API
    #[arg(long)]
    pub dry_run: bool,

    #[arg(short, long, help = "Enable verbose output")]
    pub verbose: bool,
}
