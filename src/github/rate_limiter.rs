use std::sync::Mutex;

use chrono::{DateTime, TimeZone, Utc};
use reqwest::header::HeaderMap;

/// Quota reported by the `x-ratelimit-*` headers of one response.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RateLimitStatus {
    pub limit: Option<u32>,
    pub remaining: u32,
    pub reset_at: Option<DateTime<Utc>>,
}

impl RateLimitStatus {
    pub fn from_headers(headers: &HeaderMap) -> Option<Self> {
        let remaining = header_value::<u32>(headers, "x-ratelimit-remaining")?;
        let limit = header_value::<u32>(headers, "x-ratelimit-limit");
        let reset_at = header_value::<i64>(headers, "x-ratelimit-reset")
            .and_then(|secs| Utc.timestamp_opt(secs, 0).single());

        Some(Self {
            limit,
            remaining,
            reset_at,
        })
    }

    pub fn is_exhausted(&self) -> bool {
        self.remaining == 0
    }

    /// Less than a tenth of the quota left.
    pub fn is_low(&self) -> bool {
        match self.limit {
            Some(limit) if limit > 0 => u64::from(self.remaining) * 10 < u64::from(limit),
            _ => false,
        }
    }
}

fn header_value<T: std::str::FromStr>(headers: &HeaderMap, name: &str) -> Option<T> {
    headers
        .get(name)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.trim().parse().ok())
}

/// Remembers the most recent quota seen. Purely observational: requests are
/// never delayed, an exhausted quota surfaces as an error instead.
#[derive(Debug, Default)]
pub struct RateLimiter {
    last: Mutex<Option<RateLimitStatus>>,
}

impl RateLimiter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn update_from_headers(&self, headers: &HeaderMap) -> Option<RateLimitStatus> {
        let status = RateLimitStatus::from_headers(headers)?;

        tracing::debug!(
            "Rate limit: {} requests remaining",
            status.remaining
        );
        if status.is_low() && !status.is_exhausted() {
            tracing::warn!(
                "GitHub API quota is running low: {} of {} requests left",
                status.remaining,
                status.limit.unwrap_or_default()
            );
        }

        if let Ok(mut last) = self.last.lock() {
            *last = Some(status);
        }
        Some(status)
    }

    pub fn last_status(&self) -> Option<RateLimitStatus> {
        self.last.lock().ok().and_then(|last| *last)
    }
}
