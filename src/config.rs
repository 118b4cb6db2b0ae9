use crate::error::{Error, Result};
use std::env;

pub const DEFAULT_API_URL: &str = "https://api.github.com";

#[derive(Clone)]
pub struct Config {
    pub github_token: Option<String>,
    pub api_url: String,
}

impl Config {
    pub fn from_env() -> Self {
        let github_token = env::var("GITHUB_TOKEN")
            .ok()
            .filter(|token| !token.trim().is_empty());

        let api_url = env::var("GITHUB_API_URL")
            .ok()
            .filter(|url| !url.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_API_URL.to_string());

        Self {
            github_token,
            api_url,
        }
    }

    /// A token given on the command line wins over the environment.
    pub fn with_token_override(mut self, token: Option<String>) -> Self {
        if let Some(token) = token.filter(|t| !t.trim().is_empty()) {
            self.github_token = Some(token);
        }
        self
    }

    pub fn require_token(&self) -> Result<&str> {
        self.github_token.as_deref().ok_or_else(|| {
            Error::Auth(
                "no token found; set GITHUB_TOKEN in the environment or a .env file".to_string(),
            )
        })
    }
}

// Keeps the token out of logs.
impl std::fmt::Debug for Config {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Config")
            .field("github_token", &self.github_token.as_ref().map(|_| "<redacted>"))
            .field("api_url", &self.api_url)
            .finish()
    }
}
