pub mod client;
pub mod fetcher;
pub mod rate_limiter;
pub mod paginator;

pub use client::GitHubClient;
pub use fetcher::IssueFilter;
pub use rate_limiter::{RateLimitStatus, RateLimiter};
pub use paginator::Paginator;
