use chrono::{DateTime, Utc};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("GitHub rejected the credential ({0}); check GITHUB_TOKEN or pass --token")]
    Auth(String),

    #[error("Not found: {0}; check the owner and repository names")]
    NotFound(String),

    #[error("Access forbidden: {0}; the token may lack the required scope")]
    Forbidden(String),

    #[error("{}", rate_limit_message(.reset_at))]
    RateLimited { reset_at: Option<DateTime<Utc>> },

    #[error("Invalid input: {0}")]
    Validation(String),

    #[error("GitHub API request failed with HTTP {status}: {message}")]
    Request { status: u16, message: String },

    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid header value: {0}")]
    InvalidHeader(#[from] reqwest::header::InvalidHeaderValue),
}

pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    /// Both plain 403s and exhausted quotas are reported by GitHub as forbidden.
    pub fn is_forbidden(&self) -> bool {
        matches!(self, Error::Forbidden(_) | Error::RateLimited { .. })
    }
}

fn rate_limit_message(reset_at: &Option<DateTime<Utc>>) -> String {
    match reset_at {
        Some(reset) => format!(
            "GitHub API rate limit exceeded; quota resets at {}",
            reset.format("%Y-%m-%d %H:%M:%S UTC")
        ),
        None => "GitHub API rate limit exceeded; try again later".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_rate_limit_message_includes_reset() {
        let reset_at = Utc.with_ymd_and_hms(2024, 3, 1, 12, 30, 0).unwrap();
        let err = Error::RateLimited {
            reset_at: Some(reset_at),
        };
        assert_eq!(
            err.to_string(),
            "GitHub API rate limit exceeded; quota resets at 2024-03-01 12:30:00 UTC"
        );
        assert!(err.is_forbidden());
    }

    #[test]
    fn test_request_error_message() {
        let err = Error::Request {
            status: 502,
            message: "Bad Gateway".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "GitHub API request failed with HTTP 502: Bad Gateway"
        );
        assert!(!err.is_forbidden());
    }
}
