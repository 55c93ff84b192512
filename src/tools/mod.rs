//! Retrieval tools exposed to agents
//!
//! # Module Structure
//!
//! - [`eplaw`](crate::tools::eplaw) - European patent law search (query expansion, hybrid search, rerank)
//! - [`patent_claims`](crate::tools::patent_claims) - English claims of a publication via EPO OPS
//! - [`registry`](crate::tools::registry) - Tool registration and discovery
//!
//! # Tool Registry
//!
//! ```ignore
//! let registry = ToolRegistry::from_config(&config)?;
//! let definitions = registry.get_tool_definitions();
//! let docs = registry
//!     .call("patent_claims", json!({"patent_number": "EP1000000"}))
//!     .await?;
//! ```
//!
//! Every tool returns a list of [`ToolDocument`](crate::types::ToolDocument)s,
//! so callers can hand the result straight to a chat model as grounding text.

/// European patent law retrieval pipeline.
pub mod eplaw;
/// EPO Open Patent Services claims lookup.
pub mod patent_claims;
/// Tool registry for managing available tools.
pub mod registry;

pub use registry::{Tool, ToolRegistry};
