//! Failure categories surfaced to the presentation layer.
//!
//! Every failed store action is reported with one of these kinds so the
//! UI can pick a title and hints without parsing messages.

use serde::{Deserialize, Serialize};

/// Categories of fetch failures for user-friendly display.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureKind {
    /// Network unreachable, connection refused, or body read failure.
    Transport,

    /// The request exceeded its timeout.
    Timeout,

    /// The server answered with a non-2xx status other than 404.
    HttpStatus,

    /// The server answered 404.
    NotFound,

    /// The response body did not match the expected shape.
    Decode,

    /// The request could not be built from the given input.
    InvalidRequest,
}

impl FailureKind {
    /// Returns user-friendly suggestions for this failure kind.
    #[must_use]
    pub const fn suggestions(&self) -> &[&'static str] {
        match self {
            Self::Transport => &[
                "Check if the API server is running",
                "Verify the configured API URL",
                "Check your network connection",
            ],
            Self::Timeout => &[
                "The server may be slow or overloaded",
                "Try again in a moment",
            ],
            Self::HttpStatus => &[
                "The server reported an error",
                "Try again, or check the server logs",
            ],
            Self::NotFound => &["No record exists for this identifier"],
            Self::Decode => &[
                "The server returned data in an unexpected format",
                "Check that client and server versions match",
            ],
            Self::InvalidRequest => &["Check the values you entered"],
        }
    }

    /// Returns a human-readable title for this failure kind.
    #[must_use]
    pub const fn title(&self) -> &'static str {
        match self {
            Self::Transport => "Connection Failed",
            Self::Timeout => "Request Timeout",
            Self::HttpStatus => "Server Error",
            Self::NotFound => "Not Found",
            Self::Decode => "Unexpected Response",
            Self::InvalidRequest => "Invalid Request",
        }
    }
}
