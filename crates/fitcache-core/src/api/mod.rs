//! REST API client module for the fitness-tracker backend.
//!
//! This module provides the `ApiClient` for listing, creating, updating and
//! deleting workouts, exercises, nutrition entries and measurements, plus the
//! `/users` endpoints.
//!
//! Every request targets `{base_url}/{resource}` and exchanges JSON bodies.
//! Failures are reported as `ApiError` and never retried here.

pub mod client;
pub mod error;

pub use client::ApiClient;
pub use error::ApiError;
