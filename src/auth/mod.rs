//! Caller identification
//!
//! Requests identify their user with a `User-Id` header. Token issuance and
//! verification happen upstream of this service; handlers only need the id to
//! stamp new records and to check ownership on updates and deletes.
//!
//! ## Extracting the user in handlers
//!
//! ```ignore
//! async fn handler(AuthUser(user_id): AuthUser) -> impl IntoResponse {
//!     format!("Hello, {}!", user_id)
//! }
//! ```

/// `User-Id` header extractor.
pub mod middleware;

pub use middleware::AuthUser;
