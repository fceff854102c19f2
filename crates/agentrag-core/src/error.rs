//! Error types for agentrag

use thiserror::Error;

/// Result type alias using AgentRagError
pub type Result<T> = std::result::Result<T, AgentRagError>;

/// Error type alias for convenience
pub type Error = AgentRagError;

/// Exit codes for CLI
pub mod exit_codes {
    pub const SUCCESS: i32 = 0;
    pub const GENERAL_ERROR: i32 = 1;
    pub const NOT_FOUND: i32 = 2;
    pub const INVALID_INPUT: i32 = 3;
}

/// Main error type for agentrag
#[derive(Debug, Error)]
pub enum AgentRagError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Walk directory error: {0}")]
    WalkDir(#[from] walkdir::Error),

    #[error("LLM error: {0}")]
    Llm(String),

    /// The model answered, but not in a shape we can use
    #[error("Malformed model output: {0}")]
    ModelOutput(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Index error: {0}")]
    Index(String),

    #[error("Parse error: {0}")]
    Parse(String),

    #[error("Timed out: {0}")]
    Timeout(String),

    #[error("Rate limited: {0}")]
    RateLimited(String),

    #[error("Tool {tool} failed: {message}")]
    Tool { tool: String, message: String },

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Regex error: {0}")]
    Regex(#[from] regex::Error),

    #[error("Glob pattern error: {0}")]
    GlobPattern(#[from] glob::PatternError),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("External service error: {0}")]
    ExternalError(String),

    #[error("{0}")]
    Other(#[from] anyhow::Error),
}

impl AgentRagError {
    /// Get the exit code for this error
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::Index(_) => exit_codes::NOT_FOUND,
            Self::InvalidInput(_) | Self::Config(_) => exit_codes::INVALID_INPUT,
            _ => exit_codes::GENERAL_ERROR,
        }
    }

    /// Whether retrying later could succeed (timeouts, rate limits, dropped connections)
    pub fn is_transient(&self) -> bool {
        match self {
            Self::Timeout(_) | Self::RateLimited(_) => true,
            Self::Http(e) => e.is_timeout() || e.is_connect(),
            _ => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_transient_classification() {
        assert!(AgentRagError::Timeout("tavily".into()).is_transient());
        assert!(AgentRagError::RateLimited("arxiv".into()).is_transient());
        assert!(!AgentRagError::ModelOutput("garbage".into()).is_transient());
        assert!(!AgentRagError::Config("missing key".into()).is_transient());
    }

    #[test]
    fn test_exit_codes() {
        assert_eq!(
            AgentRagError::Config("x".into()).exit_code(),
            exit_codes::INVALID_INPUT
        );
        assert_eq!(
            AgentRagError::Index("empty".into()).exit_code(),
            exit_codes::NOT_FOUND
        );
        assert_eq!(
            AgentRagError::Llm("x".into()).exit_code(),
            exit_codes::GENERAL_ERROR
        );
    }

    #[test]
    fn test_tool_error_display() {
        let err = AgentRagError::Tool {
            tool: "wikipedia".into(),
            message: "HTTP 503".into(),
        };
        assert_eq!(err.to_string(), "Tool wikipedia failed: HTTP 503");
    }
}
