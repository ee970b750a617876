//! # ABCD Analysis Backend
//!
//! Classifies per-date element numbers into ABCD and BCD sets across a
//! four-date window (A, B, C, D) of a user's catalogue of complete dates.
//!
//! ## Architecture
//!
//! - [`models`]: domain types (topics, planets, matrices, analysis runs)
//! - [`algorithms`]: pure computation (token parsing, extraction, window
//!   resolution, classification)
//! - [`db`]: repository traits, in-memory repository, configuration and the
//!   service layer
//! - [`services`]: aggregation, run caching, batch workers and job tracking
//! - [`http`]: axum REST API (feature `http-server`)

// Allow large error types - RepositoryError contains rich context for debugging
#![allow(clippy::result_large_err)]

pub mod algorithms;
pub mod db;
pub mod models;
pub mod services;

#[cfg(feature = "http-server")]
pub mod http;
