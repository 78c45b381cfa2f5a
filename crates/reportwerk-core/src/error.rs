// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Unified error types for Reportwerk.

use thiserror::Error;

/// Top-level error type for all Reportwerk operations.
///
/// Every variant renders as a human-readable message; callers surface that
/// message as-is and do not rely on structured codes.
#[derive(Debug, Error)]
pub enum ReportError {
    // -- Caller input --
    #[error("missing input: {0}")]
    MissingInput(String),

    #[error("malformed table: {0}")]
    MalformedTable(String),

    #[error("invalid metadata: {0}")]
    InvalidMetadata(String),

    #[error("invalid CSV: {0}")]
    InvalidCsv(String),

    // -- Layout / rendering --
    #[error("unreadable image: {0}")]
    UnreadableImage(String),

    #[error("rendering backend failed: {0}")]
    RenderingBackend(String),

    // -- Service --
    #[error("report server error: {0}")]
    Server(String),

    #[error("file I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl ReportError {
    /// Whether the failure was caused by the caller's input rather than by
    /// the engine or its collaborators.
    pub fn is_client_error(&self) -> bool {
        matches!(
            self,
            Self::MissingInput(_)
                | Self::MalformedTable(_)
                | Self::InvalidMetadata(_)
                | Self::InvalidCsv(_)
        )
    }
}

/// Alias used throughout the codebase.
pub type Result<T> = std::result::Result<T, ReportError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn input_errors_are_client_errors() {
        assert!(ReportError::MissingInput("image".into()).is_client_error());
        assert!(ReportError::MalformedTable("1 row".into()).is_client_error());
        assert!(ReportError::InvalidMetadata("not json".into()).is_client_error());
        assert!(ReportError::InvalidCsv("bad quote".into()).is_client_error());
    }

    #[test]
    fn engine_errors_are_server_errors() {
        assert!(!ReportError::UnreadableImage("garbage".into()).is_client_error());
        assert!(!ReportError::RenderingBackend("save".into()).is_client_error());
        assert!(!ReportError::Server("bind".into()).is_client_error());
    }

    #[test]
    fn display_carries_the_detail() {
        let err = ReportError::UnreadableImage("could not identify image".into());
        assert_eq!(err.to_string(), "unreadable image: could not identify image");
    }
}
