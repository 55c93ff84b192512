//! API request handlers.

/// Agent and tool metadata CRUD handlers.
pub mod agents;
/// Tool listing and invocation handlers.
pub mod tools;
