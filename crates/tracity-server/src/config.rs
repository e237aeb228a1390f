use clap::Parser;
use std::path::PathBuf;

use tracity_core::LlmProviderType;

/// Server configuration parsed from command line arguments and environment variables
#[derive(Parser, Debug, Clone)]
#[command(name = "tracity-server")]
#[command(author, version, about = "REST API server for Tracity datasets")]
pub struct ServerConfig {
    /// PostgreSQL database connection URL
    #[arg(long, env = "DATABASE_URL")]
    pub database_url: String,

    /// Maximum number of pooled database connections
    #[arg(long, env = "DB_MAX_CONNECTIONS", default_value = "10")]
    pub db_max_connections: u32,

    /// Completion provider for insights: openai, gemini or none
    #[arg(long, env = "LLM_PROVIDER", default_value = "openai")]
    pub llm_provider: LlmProviderType,

    /// OpenAI API key
    #[arg(long, env = "OPENAI_API_KEY", hide_env_values = true)]
    pub openai_api_key: Option<String>,

    /// Google Gemini API key
    #[arg(long, env = "GEMINI_API_KEY", hide_env_values = true)]
    pub gemini_api_key: Option<String>,

    /// Override the provider's default completion model
    #[arg(long, env = "LLM_MODEL")]
    pub llm_model: Option<String>,

    /// Server port to listen on
    #[arg(short, long, env = "PORT", default_value = "8001")]
    pub port: u16,

    /// Server host to bind to
    #[arg(long, env = "HOST", default_value = "0.0.0.0")]
    pub host: String,

    /// Path to collections.toml catalog
    #[arg(long, env = "CATALOG_CONFIG")]
    pub catalog_config: Option<PathBuf>,

    /// Allowed CORS origins, comma-separated, or "*"
    #[arg(long, env = "CORS_ORIGINS", default_value = "*")]
    pub cors_origins: String,

    /// Requests per second allowed per client IP (0 disables rate limiting)
    #[arg(long, env = "RATE_LIMIT_RPS", default_value = "10")]
    pub rate_limit_rps: u32,

    /// Burst size for rate limiting
    #[arg(long, env = "RATE_LIMIT_BURST", default_value = "30")]
    pub rate_limit_burst: u32,

    /// Upper bound applied to the `limit` of filter and visualize requests
    #[arg(long, env = "MAX_FILTER_LIMIT", default_value = "1000")]
    pub max_filter_limit: usize,
}
