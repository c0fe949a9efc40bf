//! anonboard/crates/ab-core/src/lib.rs
//!
//! The central domain logic and interface definitions for anonboard.

pub mod error;
pub mod lifecycle;
pub mod listing;
pub mod models;
pub mod traits;

// Re-exporting for easier access in other crates
pub use error::*;
pub use lifecycle::ThreadLifecycle;
pub use listing::{BoardListing, DEFAULT_REPLY_LIMIT, DEFAULT_THREAD_LIMIT};
pub use models::*;
pub use traits::*;
