//! Database clients and search backends.
//!
//! This module provides:
//! - **Turso/SQLite**: relational storage for agents and their tool metadata
//! - **Hybrid search**: keyword + vector retrieval with reranking (Weaviate)
//!
//! Enable remote Turso via Cargo features:
//! ```toml
//! patlaw-server = { version = "*", features = ["turso"] }
//! ```

// Search abstraction layer
pub mod vectorstore;
pub mod weaviate;

// Relational database
pub mod traits;
pub mod turso;

// Re-exports
pub use traits::{DatabaseClient, DatabaseProvider};
pub use turso::TursoClient;
pub use vectorstore::{HybridSearch, SearchProvider};
pub use weaviate::WeaviateClient;
