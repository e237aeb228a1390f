//! Configuration types for Tracity components.
//!
//! Runtime settings come from environment variables (see the server and CLI
//! crates). The collection catalog lives in a TOML file, by default
//! `~/.config/tracity/collections.toml`.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::time::Duration;

use crate::error::AppError;

// =============================================================================
// Completion Provider Configuration
// =============================================================================

/// Completion provider type.
///
/// Determines which completion API produces insights.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LlmProviderType {
    /// OpenAI chat completions.
    #[default]
    OpenAI,
    /// Google Gemini generateContent.
    Gemini,
    /// No provider; every insight uses the static fallback.
    None,
}

impl fmt::Display for LlmProviderType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::OpenAI => write!(f, "openai"),
            Self::Gemini => write!(f, "gemini"),
            Self::None => write!(f, "none"),
        }
    }
}

impl FromStr for LlmProviderType {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "openai" => Ok(Self::OpenAI),
            "gemini" => Ok(Self::Gemini),
            "none" | "disabled" => Ok(Self::None),
            _ => Err(AppError::ConfigError(format!(
                "Unknown completion provider: '{}'. Valid options: openai, gemini, none",
                s
            ))),
        }
    }
}

/// Default chat model for a provider.
pub fn default_completion_model(provider: LlmProviderType) -> &'static str {
    match provider {
        LlmProviderType::OpenAI => "gpt-3.5-turbo",
        LlmProviderType::Gemini => "gemini-2.0-flash",
        LlmProviderType::None => "none",
    }
}

/// Database connection pool configuration.
pub struct DbConfig {
    pub max_connections: u32,
}

impl Default for DbConfig {
    fn default() -> Self {
        Self { max_connections: 5 }
    }
}

/// HTTP client configuration for completion API calls.
pub struct HttpConfig {
    pub timeout: Duration,
    /// Upper bound on generated tokens per reply.
    pub max_tokens: u32,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(30),
            max_tokens: 500,
        }
    }
}

// =============================================================================
// Collection Catalog (collections.toml)
// =============================================================================

fn default_state_field() -> String {
    "state".to_string()
}

fn default_year_field() -> String {
    "year".to_string()
}

fn default_category_param() -> String {
    "categories".to_string()
}

/// Field layout of one collection.
///
/// Tells the filter builder where the state, year and category values live.
/// A collection with a `date_field` is date-keyed: its temporal dimension is a
/// free-text date and year filters become prefix matches.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CollectionSchema {
    /// Collection name in the document store.
    pub name: String,

    /// Human description shown in dataset listings.
    pub description: Option<String>,

    #[serde(default = "default_state_field")]
    pub state_field: String,

    /// Integer year field. Ignored when `date_field` is set.
    #[serde(default = "default_year_field")]
    pub year_field: String,

    /// Free-text date field of date-keyed collections.
    pub date_field: Option<String>,

    /// Field matched by category filters. Collections without one ignore them.
    pub category_field: Option<String>,

    /// Request parameter the category filter answers to (`crime_types` for crimes).
    #[serde(default = "default_category_param")]
    pub category_param: String,
}

impl CollectionSchema {
    /// Default layout: `state` and integer `year`, no category filter.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: None,
            state_field: default_state_field(),
            year_field: default_year_field(),
            date_field: None,
            category_field: None,
            category_param: default_category_param(),
        }
    }

    pub fn date_keyed(mut self, date_field: impl Into<String>) -> Self {
        self.date_field = Some(date_field.into());
        self
    }

    pub fn with_category(mut self, field: impl Into<String>, param: impl Into<String>) -> Self {
        self.category_field = Some(field.into());
        self.category_param = param.into();
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn is_date_keyed(&self) -> bool {
        self.date_field.is_some()
    }

    /// The field that carries the temporal dimension.
    pub fn temporal_field(&self) -> &str {
        self.date_field.as_deref().unwrap_or(&self.year_field)
    }
}

/// Root configuration structure for collections.toml.
///
/// # Example
///
/// ```toml
/// [[collections]]
/// name = "crimes"
/// description = "Crime statistics and safety data"
/// category_field = "crime_type"
/// category_param = "crime_types"
///
/// [[collections]]
/// name = "covid_stats"
/// date_field = "date"
/// ```
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CollectionCatalog {
    #[serde(default)]
    pub collections: Vec<CollectionSchema>,
}

impl CollectionCatalog {
    /// The datasets shipped with Tracity.
    pub fn builtin() -> Self {
        Self {
            collections: vec![
                CollectionSchema::new("crimes")
                    .with_description("Crime statistics and safety data")
                    .with_category("crime_type", "crime_types"),
                CollectionSchema::new("covid_stats")
                    .with_description("COVID-19 statistics and trends data")
                    .date_keyed("date"),
                CollectionSchema::new("air_quality")
                    .with_description("Air quality index readings by state"),
                CollectionSchema::new("literacy")
                    .with_description("Education and literacy statistics"),
            ],
        }
    }

    /// Find a declared collection by exact name.
    pub fn find(&self, name: &str) -> Option<&CollectionSchema> {
        self.collections.iter().find(|c| c.name == name)
    }

    /// Schema for `name`, falling back to the default layout for undeclared collections.
    pub fn schema_for(&self, name: &str) -> CollectionSchema {
        self.find(name)
            .cloned()
            .unwrap_or_else(|| CollectionSchema::new(name))
    }
}

/// Default configuration file name.
pub const CONFIG_FILE_NAME: &str = "collections.toml";

/// Returns the default configuration directory path: `~/.config/tracity/`
pub fn default_config_dir() -> Option<PathBuf> {
    dirs::config_dir().map(|p| p.join("tracity"))
}

/// Returns the default configuration file path: `~/.config/tracity/collections.toml`
pub fn default_config_path() -> Option<PathBuf> {
    default_config_dir().map(|p| p.join(CONFIG_FILE_NAME))
}

const DEFAULT_CONFIG_TEMPLATE: &str = r#"# Tracity Collection Catalog
#
# Declares how each collection stores its filterable fields.
# Collections not listed here use state_field = "state" and year_field = "year".
#
#   date_field     = free-text date; year filters match its first four characters
#   category_field = field matched by category filters
#   category_param = request parameter name for category filters

[[collections]]
name = "crimes"
description = "Crime statistics and safety data"
category_field = "crime_type"
category_param = "crime_types"

[[collections]]
name = "covid_stats"
description = "COVID-19 statistics and trends data"
date_field = "date"

[[collections]]
name = "air_quality"
description = "Air quality index readings by state"

[[collections]]
name = "literacy"
description = "Education and literacy statistics"
"#;

/// Load the collection catalog from a TOML file.
///
/// # Arguments
/// * `path` - Optional custom path. If `None`, uses the default XDG path.
///
/// # Behavior
/// When the default file is missing a template is written there. If that
/// fails, or no config directory exists, the built-in catalog is returned.
/// A custom path that does not exist is an error.
pub fn load_catalog(path: Option<PathBuf>) -> Result<CollectionCatalog, AppError> {
    let using_default_path = path.is_none();
    let config_path = match path {
        Some(p) => p,
        None => match default_config_path() {
            Some(p) => p,
            None => return Ok(CollectionCatalog::builtin()),
        },
    };

    if !config_path.exists() {
        if using_default_path {
            if let Err(e) = create_default_config(&config_path) {
                tracing::warn!("Could not create default catalog template: {}", e);
                return Ok(CollectionCatalog::builtin());
            }
        } else {
            return Err(AppError::ConfigError(format!(
                "Catalog file not found: {}",
                config_path.display()
            )));
        }
    }

    let content = std::fs::read_to_string(&config_path).map_err(|e| {
        AppError::ConfigError(format!(
            "Failed to read catalog file '{}': {}",
            config_path.display(),
            e
        ))
    })?;

    let catalog: CollectionCatalog = toml::from_str(&content).map_err(|e| {
        AppError::ConfigError(format!(
            "Invalid TOML in '{}': {}",
            config_path.display(),
            e
        ))
    })?;

    tracing::debug!(
        "Loaded {} collection schemas from {}",
        catalog.collections.len(),
        config_path.display()
    );

    Ok(catalog)
}

fn create_default_config(path: &Path) -> std::io::Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }

    std::fs::write(path, DEFAULT_CONFIG_TEMPLATE)?;
    tracing::info!("Created default catalog template at: {}", path.display());

    Ok(())
}
