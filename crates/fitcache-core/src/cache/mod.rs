//! In-memory query cache over the REST backend.
//!
//! This module provides the `QueryCache`, a keyed cache of server collections.
//! Each entry is addressed by a `QueryKey` of `(resource kind, user id)` and is
//! in exactly one `QueryState`: pending, success or error.
//!
//! - Reads of the same key share one in-flight request
//! - Successful mutations invalidate the key holding the mutated resource
//! - Failed fetches only affect their own key and are never retried automatically
//! - Successful data older than `CacheOptions::stale_after` is re-fetched on read

pub mod manager;
pub mod query;
pub mod subscription;

pub use manager::{CacheOptions, Mutation, MutationOutcome, QueryCache};
pub use query::{CachedData, QueryKey, QueryState};
pub use subscription::{CancelToken, QuerySubscription};
