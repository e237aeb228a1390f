use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::sync::LazyLock;

use tracity_core::LlmProviderType;

static VERSION_INFO: LazyLock<String> = LazyLock::new(|| {
    let version = env!("CARGO_PKG_VERSION");

    let commit = option_env!("VERGEN_GIT_SHA")
        .map(|s| s.chars().take(7).collect::<String>())
        .unwrap_or_else(|| "unknown".to_string());

    let built = option_env!("VERGEN_BUILD_DATE").unwrap_or("unknown"); // YYYY-MM-DD
    let target = option_env!("VERGEN_CARGO_TARGET_TRIPLE").unwrap_or("unknown");
    let rustc = option_env!("VERGEN_RUSTC_SEMVER").unwrap_or("unknown");

    format!("{version}\ncommit: {commit}\nbuilt: {built}\ntarget: {target}\nrustc: {rustc}")
});

pub fn version_info() -> &'static str {
    &VERSION_INFO
}

/// CLI configuration parsed from command line arguments and environment variables
#[derive(Parser, Debug)]
#[command(name = "tracity")]
#[command(
    author,
    version = version_info(),
    about = "Explore and import statistical datasets for Indian states"
)]
#[command(after_help = "Examples:
  tracity explore
  tracity import crimes data/crimes.json
  tracity filter crimes --state Kerala --year 2020 --sort-by cases_reported --sort-order desc
  tracity insights covid_stats
  tracity stats

Completion providers:
  LLM_PROVIDER=openai (default) - OpenAI chat completions
  LLM_PROVIDER=gemini           - Google Gemini
  LLM_PROVIDER=none             - static insights only")]
pub struct Config {
    /// PostgreSQL database connection URL
    #[arg(long, env = "DATABASE_URL")]
    pub database_url: String,

    /// Completion provider for insights: openai, gemini or none
    #[arg(long, env = "LLM_PROVIDER", default_value = "openai")]
    pub llm_provider: LlmProviderType,

    /// OpenAI API key (required when llm_provider=openai)
    #[arg(long, env = "OPENAI_API_KEY", hide_env_values = true)]
    pub openai_api_key: Option<String>,

    /// Google Gemini API key (required when llm_provider=gemini)
    #[arg(long, env = "GEMINI_API_KEY", hide_env_values = true)]
    pub gemini_api_key: Option<String>,

    /// Completion model name (provider-specific, uses default if not set)
    #[arg(long, env = "LLM_MODEL")]
    pub llm_model: Option<String>,

    /// Custom path to collections.toml catalog
    #[arg(long, env = "CATALOG_CONFIG", value_name = "PATH")]
    pub catalog_config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

/// Available CLI commands
#[derive(Subcommand, Debug)]
pub enum Command {
    /// List dataset collections with record counts
    Explore,
    /// Import records from a JSON array or JSON Lines file
    #[command(after_help = "Examples:
  tracity import crimes crimes.json
  tracity import covid_stats covid.jsonl --replace")]
    Import {
        /// Target collection
        collection: String,
        /// File holding a JSON array of objects, or one object per line
        file: PathBuf,
        /// Remove existing records of the collection first
        #[arg(long)]
        replace: bool,
    },
    /// Filter a collection and print the matching records as JSON
    Filter {
        /// Collection to query
        collection: String,
        /// Restrict to a state (repeatable)
        #[arg(short, long = "state", value_name = "STATE")]
        states: Vec<String>,
        /// Restrict to a year (repeatable)
        #[arg(short, long = "year", value_name = "YEAR")]
        years: Vec<i64>,
        /// Restrict to a category value, e.g. a crime type (repeatable)
        #[arg(short, long = "category", value_name = "VALUE")]
        categories: Vec<String>,
        /// Field to sort by
        #[arg(long)]
        sort_by: Option<String>,
        /// "asc" for ascending, anything else for descending
        #[arg(long, default_value = "asc")]
        sort_order: String,
        /// Maximum number of records
        #[arg(short, long, default_value = "100")]
        limit: usize,
        /// Attach a completion-backed insight
        #[arg(long)]
        insights: bool,
    },
    /// Generate insights for a collection
    Insights {
        /// Collection to analyze
        collection: String,
    },
    /// Show platform statistics
    Stats,
}
