//! Tableside Client - staff device side of the coordination protocol
//!
//! - [`HttpClient`] - typed calls to the server API
//! - [`PollingSynchronizer`] - fixed-interval re-fetch with optimistic updates
//! - [`TakeoverPrompt`] - "handle only / take over table" decision

pub mod api;
pub mod config;
pub mod error;
pub mod http;
pub mod sync;
pub mod takeover;

pub use api::FloorApi;
pub use config::ClientConfig;
pub use error::{ClientError, ClientResult};
pub use http::HttpClient;
pub use sync::{FloorCache, PollingSynchronizer, SyncFailure};
pub use takeover::{ActResult, TakeoverPrompt};

// Re-export shared types for convenience
pub use shared::{ActionOutcome, ActionPayload, ErrorKind, RequestAction, StaffRef, TakeoverChoice};
