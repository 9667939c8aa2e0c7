//! Error kinds of the analysis pipeline.
//!
//! Classification is required and its failures propagate
//! ([`AnalysisError`]). Recommendation failures ([`RecommendationError`])
//! never leave this crate: the pipeline swaps in fallback advice instead.

use serde::Serialize;
use std::fmt;
use thiserror::Error;

/// Machine-readable code returned to retry callers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum ErrorCode {
    Unauthenticated,
    PermissionDenied,
    NotFound,
    InvalidArgument,
    Internal,
}

impl ErrorCode {
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorCode::Unauthenticated => "unauthenticated",
            ErrorCode::PermissionDenied => "permission-denied",
            ErrorCode::NotFound => "not-found",
            ErrorCode::InvalidArgument => "invalid-argument",
            ErrorCode::Internal => "internal",
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Error)]
pub enum AnalysisError {
    #[error("mood entry has no text to analyze")]
    EmptyText,
    #[error("classifier request failed: {0:#}")]
    Transport(anyhow::Error),
    #[error("classifier returned no content")]
    EmptyResponse,
    #[error("classifier response is not valid JSON: {0}")]
    Unparsable(String),
    #[error("classifier response has no emotion label")]
    MissingEmotion,
}

#[derive(Debug, Error)]
pub enum RecommendationError {
    #[error("recommendation request failed: {0:#}")]
    Transport(anyhow::Error),
    #[error("recommendation generator returned no content")]
    EmptyResponse,
    #[error("invalid recommendations format: {0}")]
    Malformed(String),
}

#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("{message}")]
    Validation { code: ErrorCode, message: String },
    #[error("{message}")]
    Authorization { code: ErrorCode, message: String },
    #[error("failed to analyze mood entry: {0}")]
    Analysis(#[from] AnalysisError),
    #[error("failed to persist analysis: {0:#}")]
    Persistence(anyhow::Error),
}

impl PipelineError {
    pub fn invalid_argument(message: impl Into<String>) -> Self {
        Self::Validation {
            code: ErrorCode::InvalidArgument,
            message: message.into(),
        }
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::Validation {
            code: ErrorCode::NotFound,
            message: message.into(),
        }
    }

    pub fn unauthenticated(message: impl Into<String>) -> Self {
        Self::Authorization {
            code: ErrorCode::Unauthenticated,
            message: message.into(),
        }
    }

    pub fn permission_denied(message: impl Into<String>) -> Self {
        Self::Authorization {
            code: ErrorCode::PermissionDenied,
            message: message.into(),
        }
    }

    pub fn code(&self) -> ErrorCode {
        match self {
            PipelineError::Validation { code, .. } | PipelineError::Authorization { code, .. } => {
                *code
            }
            PipelineError::Analysis(_) | PipelineError::Persistence(_) => ErrorCode::Internal,
        }
    }
}
