//! Data models
//!
//! Shared between the server and staff devices (via API).
//! All IDs are `i64` snowflakes, timestamps are Unix millis.

pub mod assignment;
pub mod audit;
pub mod service_request;
pub mod staff;

// Re-exports
pub use assignment::*;
pub use audit::*;
pub use service_request::*;
pub use staff::*;
