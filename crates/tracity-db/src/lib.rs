//! Tracity DB - Document store on PostgreSQL JSONB
//!
//! Dataset records are schemaless documents grouped in named collections.
//! They live in a single `documents` table with a `JSONB` body; query clauses
//! built by `tracity-core` are compiled to parameterized SQL.
//!
//! # Overview
//!
//! - [`DocumentRepository`] - implements `DocumentStore` plus schema setup
//! - [`MIGRATIONS`] - statements creating the table and its indexes

mod repository;

pub use repository::{DocumentRepository, MIGRATIONS};
