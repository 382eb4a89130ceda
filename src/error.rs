use std::path::PathBuf;
use thiserror::Error;

/// Failures that abort an analysis run.
///
/// Per-file and per-directory problems never show up here; those degrade
/// into a [`crate::analysis::SkipReason`] or an empty contribution instead.
#[derive(Debug, Error)]
pub enum AnalyzerError {
    #[error("Invalid GitHub repository URL")]
    InvalidRepositoryUrl(String),

    #[error("Repository is private. Please use a public repository.")]
    PrivateRepository,

    #[error("GitHub API rate limit exceeded. Please try again later.")]
    RateLimited,

    #[error("Directory not found: {}", .0.display())]
    DirectoryNotFound(PathBuf),

    #[error("GitHub API error: {0}")]
    Api(String),

    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("Failed to parse response: {0}")]
    Parse(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl AnalyzerError {
    /// Transport failures and non-success statuses are worth another attempt.
    /// Rate limiting is not: retrying only burns more of the quota.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Network(_) | Self::Api(_))
    }
}

#[derive(Debug, Error)]
pub enum GenerationError {
    #[error("Network error: {0}")]
    NetworkError(String),

    #[error("Parse error: {0}")]
    ParseError(String),

    #[error("Validation error: {0}")]
    ValidationError(String),

    #[error("Authentication error: {0}")]
    AuthenticationError(String),

    #[error("Rate limit error: {0}")]
    RateLimitError(String),

    #[error("API error: {0}")]
    APIError(String),
}

impl GenerationError {
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            Self::NetworkError(_) | Self::RateLimitError(_) | Self::ParseError(_)
        )
    }
}

impl From<serde_json::Error> for GenerationError {
    fn from(error: serde_json::Error) -> Self {
        GenerationError::ParseError(format!("JSON serialization error: {}", error))
    }
}
