//! Trait definitions for external dependencies.
//!
//! The services in this crate only talk to the outside world through these
//! traits: a document store holding dataset records and a completion API
//! producing insights. Tests swap in in-memory mocks.
//!
//! # Example
//!
//! ```
//! use tracity_core::filter::{self, FilterRequest};
//! use tracity_core::traits::DocumentStore;
//! use tracity_core::{AppError, CollectionSchema, Document};
//!
//! // Business logic uses traits, not concrete types
//! async fn first_page<S: DocumentStore>(
//!     store: &S,
//!     request: &FilterRequest,
//!     schema: &CollectionSchema,
//! ) -> Result<Vec<Document>, AppError> {
//!     let (clause, sort) = filter::build(request, schema);
//!     store.find(&request.collection, &clause, &sort, request.limit).await
//! }
//! ```

use std::future::Future;

use serde_json::Value;

use crate::filter::{QueryClause, SortSpec};
use crate::{AppError, Document};

/// Store of schemaless records grouped in named collections.
pub trait DocumentStore: Send + Sync + Clone {
    /// Names of every collection holding at least one record, sorted.
    fn list_collections(&self) -> impl Future<Output = Result<Vec<String>, AppError>> + Send;

    /// Counts the records of `collection` matching `clause`.
    fn count(
        &self,
        collection: &str,
        clause: &QueryClause,
    ) -> impl Future<Output = Result<u64, AppError>> + Send;

    /// Returns up to `limit` records matching `clause`, ordered by `sort`.
    ///
    /// An empty sort returns records in insertion order.
    fn find(
        &self,
        collection: &str,
        clause: &QueryClause,
        sort: &SortSpec,
        limit: usize,
    ) -> impl Future<Output = Result<Vec<Document>, AppError>> + Send;

    /// Distinct non-null values of `field` across `collection`.
    fn distinct(
        &self,
        collection: &str,
        field: &str,
    ) -> impl Future<Output = Result<Vec<Value>, AppError>> + Send;

    /// Inserts records into `collection`, returning how many were written.
    fn insert_many(
        &self,
        collection: &str,
        docs: &[Document],
    ) -> impl Future<Output = Result<u64, AppError>> + Send;

    /// Verifies the store is reachable.
    fn health_check(&self) -> impl Future<Output = Result<(), AppError>> + Send;
}

/// Provider of JSON-formatted completions.
pub trait CompletionProvider: Send + Sync + Clone {
    /// Short provider identifier ("openai", "gemini").
    fn name(&self) -> &'static str;

    /// Model used for completions.
    fn model(&self) -> &str;

    /// False when no backend is configured and every call would fail.
    fn is_enabled(&self) -> bool {
        true
    }

    /// Sends a system and user message and parses the reply as JSON.
    fn complete_json(
        &self,
        system: &str,
        prompt: &str,
    ) -> impl Future<Output = Result<Value, AppError>> + Send;
}
