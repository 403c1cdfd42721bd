//! Shared error types for the services crate.

use thiserror::Error;

use crate::api::ServerErrorItem;

/// Errors surfaced by the remote step service client.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum StepApiError {
    /// The service answered with a non-success status and no usable
    /// validation body.
    #[error("HTTP {status} | {url}")]
    Status { status: u16, url: String },

    /// The service rejected the submitted answers with per-field messages.
    #[error("HTTP {status} | {url}")]
    Validation {
        status: u16,
        url: String,
        errors: Vec<ServerErrorItem>,
    },

    #[error(transparent)]
    Http(#[from] reqwest::Error),
}

/// Errors surfaced by the step flow orchestration.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum FlowError {
    /// A synchronization was required before the session identifier was
    /// obtained; no network call is attempted.
    #[error("missing session identifier")]
    MissingSession,

    #[error(transparent)]
    Api(#[from] StepApiError),
}
