//! LLM Provider Clients and Abstractions
//!
//! This module provides a unified interface for chat completion providers.
//! Provider-specific implementations sit behind the [`LLMClient`] trait so the
//! rest of the application (and its tests) never depend on a concrete vendor.
//!
//! # Example
//!
//! ```ignore
//! use patlaw::llm::Provider;
//!
//! let client = provider.create_client(reqwest::Client::new());
//! let text = client.generate_with_system("Answer tersely.", "What is Art. 54 EPC?").await?;
//! let queries = client.search_queries("Is a public lecture prior art?").await?;
//! ```

/// Core LLM client trait and provider selection.
pub mod client;
/// Cohere chat API client.
pub mod cohere;

pub use client::{LLMClient, Provider};
pub use cohere::CohereClient;
