//! Tracity Client - HTTP clients for completion APIs
//!
//! This crate provides clients for:
//!
//! - [`openai`] - OpenAI chat completions
//! - [`gemini`] - Google Gemini `generateContent`
//! - [`provider`] - runtime selection between them
//!
//! # Overview
//!
//! The clients handle authentication, request building, response parsing,
//! and error classification. Every client asks for a JSON reply and returns
//! it parsed as a [`serde_json::Value`].

pub mod gemini;
pub mod openai;
pub mod provider;
pub mod reply;

// Re-export main client types
pub use gemini::GeminiClient;
pub use openai::OpenAIClient;
pub use provider::CompletionProviderEnum;
