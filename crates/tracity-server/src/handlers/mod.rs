//! HTTP request handlers for API endpoints.

pub mod chat;
pub mod datasets;
pub mod filter;
pub mod health;
pub mod insights;
pub mod root;
pub mod stats;
pub mod visualize;
