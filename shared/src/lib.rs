//! Shared types for Tableside
//!
//! Wire and data model types used by both the server and its clients:
//! service requests, table assignments, the action/takeover protocol and
//! the error kinds surfaced to staff devices.

pub mod action;
pub mod error;
pub mod models;
pub mod util;

// Re-exports
pub use action::{ActionOutcome, ActionPayload, RequestAction, StaffRef, TakeoverChoice};
pub use error::ErrorKind;
pub use serde::{Deserialize, Serialize};
