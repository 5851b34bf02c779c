//! fitcache-core - data access for a fitness tracker.
//!
//! This crate provides the REST client for the workout, exercise, nutrition and
//! measurement endpoints, typed models with pre-flight validation, and the
//! `QueryCache` that de-duplicates reads and invalidates collections after
//! successful mutations.

pub mod api;
pub mod cache;
pub mod config;
pub mod models;
pub mod summaries;
pub mod utils;

pub use api::{ApiClient, ApiError};
pub use cache::{CacheOptions, CancelToken, Mutation, MutationOutcome, QueryCache, QueryKey, QueryState};
pub use config::Config;
