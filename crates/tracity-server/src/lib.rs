//! Tracity Server - REST API for Tracity datasets
//!
//! This crate provides an HTTP API over the dataset collections:
//!
//! - **Datasets**: listing, platform statistics
//! - **Filter**: state/year/category filtering with chart advice
//! - **Visualize & Insights**: record pages with completion-backed insights
//! - **Chat**: natural-language questions across datasets
//!
//! # API Documentation
//!
//! When running the server, interactive API documentation is available
//! at `/swagger-ui`.

pub mod config;
pub mod dto;
pub mod error;
pub mod handlers;
pub mod openapi;
pub mod router;
pub mod state;

pub use config::ServerConfig;
pub use error::ApiError;
pub use router::create_router;
pub use state::AppState;
