//! Tracity Core - Domain types, query building, and services.
//!
//! This crate provides the core functionality for Tracity, including:
//!
//! - **Domain models**: [`Document`], [`DatasetInfo`], [`PlatformStats`]
//! - **Query building**: [`filter::build`] turns a [`FilterRequest`] into a
//!   [`QueryClause`] and a [`SortSpec`]
//! - **Chart advice**: [`chart::recommend`] picks a chart kind for a page of records
//! - **Services**: [`InsightService`] for completion-backed insights,
//!   [`DataService`] for every read operation of the API and CLI
//! - **Traits**: [`DocumentStore`], [`CompletionProvider`] for dependency injection
//!
//! # Architecture
//!
//! This crate is reused by the server and the CLI. Business logic is
//! decoupled from I/O through traits:
//!
//! - [`DocumentStore`] - abstracts record storage (e.g., PostgreSQL JSONB)
//! - [`CompletionProvider`] - abstracts completion APIs (e.g., OpenAI, Gemini)
//!
//! # Example
//!
//! ```ignore
//! use tracity_core::{DataService, FilterRequest, load_catalog};
//!
//! let service = DataService::new(store, provider, load_catalog(None)?);
//! let request = FilterRequest::new("crimes").with_states(["Kerala"]);
//! let outcome = service.filter(&request, false).await?;
//! println!("{} records, chart {}", outcome.count, outcome.chart_recommendations.chart);
//! ```

pub mod chart;
pub mod config;
pub mod error;
pub mod filter;
pub mod insight;
pub mod models;
pub mod service;
pub mod traits;

// Configuration
pub use config::{
    CollectionCatalog, CollectionSchema, DbConfig, HttpConfig, LlmProviderType,
    default_completion_model, default_config_path, load_catalog,
};

// Error handling
pub use error::{AppError, LlmErrorDetails, LlmErrorKind};

// Domain models
pub use models::{DatasetInfo, Document, PlatformStats};

// Pure utilities
pub use chart::{ChartKind, ChartRecommendation};
pub use filter::{FilterRequest, QueryClause, SortDirection, SortSpec};

// Traits for dependency injection
pub use traits::{CompletionProvider, DocumentStore};

// Services (generic over trait implementations)
pub use insight::{Insight, InsightService};
pub use service::{
    ChatOutcome, ChatResult, DataService, DatasetInsights, FilterOptions, FilterOutcome,
    Visualization,
};
