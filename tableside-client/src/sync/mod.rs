//! Polling synchronizer
//!
//! Devices never receive pushes: every `poll_interval` the synchronizer
//! re-fetches the request list and the caller's own assignments and replaces
//! the local cache wholesale. Optimistic updates made after an action only
//! live until the next poll.

mod cache;
mod poller;

pub use cache::{FloorCache, SyncFailure};
pub use poller::{PollingSynchronizer, SyncOptions};
