//! Custom error types specific to the `adapters` crate.
//!
//! This module defines errors that can occur while talking to the hosted
//! database or object storage, providing a unified error type for every
//! adapter implementation.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum AdapterError {
    #[error("Request to backing service failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("Backing service responded with {status}: {body}")]
    Status { status: u16, body: String },

    #[error("Unexpected response payload: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("Unique constraint violated: {0}")]
    Conflict(String),

    #[error("Object not found: {0}")]
    NotFound(String),

    #[error("Invalid adapter configuration: {0}")]
    InvalidConfig(String),
}
