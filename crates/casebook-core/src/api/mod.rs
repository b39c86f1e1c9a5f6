//! REST backend for the remote deployment.
//!
//! This module provides `HttpStorage`, a `StorageAdapter` that reads each
//! collection with `GET {base}/{endpoint}` and replaces it with
//! `POST {base}/{endpoint}`. Requests optionally carry a bearer token.

pub mod client;
pub mod error;

pub use client::HttpStorage;
pub use error::HttpError;
