use reqwest::{header, Client, Response, StatusCode, Url};
use serde::Deserialize;

use crate::config::DEFAULT_API_URL;
use crate::error::{Error, Result};
use crate::github::fetcher::IssueFilter;
use crate::github::paginator::Paginator;
use crate::github::rate_limiter::{RateLimitStatus, RateLimiter};
use crate::models::{
    CreatedIssue, FilterCriteria, GitHubIssue, IssueRecord, IssueTitle, NewIssue, RepoRef,
};

pub const PER_PAGE: u32 = 100;

pub struct GitHubClient {
    client: Client,
    rate_limiter: RateLimiter,
    base_url: String,
}

impl GitHubClient {
    pub fn new(token: &str) -> Result<Self> {
        Self::with_base_url(token, DEFAULT_API_URL)
    }

    pub fn with_base_url(token: &str, base_url: &str) -> Result<Self> {
        let mut auth = header::HeaderValue::from_str(&format!("Bearer {}", token))?;
        auth.set_sensitive(true);

        let mut headers = header::HeaderMap::new();
        headers.insert(header::AUTHORIZATION, auth);
        headers.insert(
            header::ACCEPT,
            header::HeaderValue::from_static("application/vnd.github+json"),
        );
        headers.insert(
            "X-GitHub-Api-Version",
            header::HeaderValue::from_static("2022-11-28"),
        );
        headers.insert(
            header::USER_AGENT,
            header::HeaderValue::from_static(concat!("gh-issue-tools/", env!("CARGO_PKG_VERSION"))),
        );

        let client = Client::builder().default_headers(headers).build()?;

        Ok(Self {
            client,
            rate_limiter: RateLimiter::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    /// Fetches every issue matching `criteria`, following pagination until the
    /// cursor runs out or the date window has been scanned past.
    pub async fn fetch_issues(&self, criteria: &FilterCriteria) -> Result<Vec<IssueRecord>> {
        let url = self.issues_list_url(criteria)?;
        let mut paginator = Paginator::new(
            &self.client,
            &self.rate_limiter,
            url.to_string(),
            format!("repository {}", criteria.repo),
        );
        let mut filter = IssueFilter::new(criteria);

        while let Some(page) = paginator.next_page::<GitHubIssue>().await? {
            let page_len = page.len();
            let kept = filter.accept_page(page);
            tracing::info!(
                "Fetched page {} ({} issues, {} matching)",
                paginator.pages_fetched(),
                page_len,
                kept
            );

            if !filter.should_continue() {
                tracing::debug!("Reached issues older than the date window, stopping");
                break;
            }
        }

        Ok(filter.into_records())
    }

    /// Titles of all open issues (pull requests excluded) in `repo`.
    pub async fn open_issue_titles(&self, repo: &RepoRef) -> Result<Vec<String>> {
        let url = Url::parse_with_params(
            &self.issues_url(repo),
            &[
                ("state", "open".to_string()),
                ("per_page", PER_PAGE.to_string()),
                ("page", "1".to_string()),
            ],
        )
        .map_err(|e| Error::Validation(format!("invalid API URL: {}", e)))?;

        tracing::info!("Fetching open issues for duplicate check: {}", repo);
        let paginator = Paginator::new(
            &self.client,
            &self.rate_limiter,
            url.to_string(),
            format!("repository {}", repo),
        );
        let issues: Vec<IssueTitle> = paginator.fetch_all().await?;

        Ok(issues
            .into_iter()
            .filter(|issue| issue.pull_request.is_none())
            .map(|issue| issue.title)
            .collect())
    }

    pub async fn create_issue(&self, repo: &RepoRef, issue: &NewIssue) -> Result<CreatedIssue> {
        tracing::debug!("Creating issue in {}: {}", repo, issue.title);
        let response = self
            .client
            .post(self.issues_url(repo))
            .json(issue)
            .send()
            .await?;
        let response =
            check_response(response, &self.rate_limiter, &format!("repository {}", repo)).await?;

        Ok(response.json().await?)
    }

    /// Quota reported by the most recent response, if any.
    pub fn rate_limit_status(&self) -> Option<RateLimitStatus> {
        self.rate_limiter.last_status()
    }

    fn issues_url(&self, repo: &RepoRef) -> String {
        format!("{}/repos/{}/{}/issues", self.base_url, repo.owner, repo.name)
    }

    fn issues_list_url(&self, criteria: &FilterCriteria) -> Result<Url> {
        let mut params = vec![
            ("state", criteria.state.as_query().to_string()),
            (
                "since",
                criteria.window.since.format("%Y-%m-%dT%H:%M:%SZ").to_string(),
            ),
            ("sort", "updated".to_string()),
            ("direction", "desc".to_string()),
            ("per_page", PER_PAGE.to_string()),
            ("page", "1".to_string()),
        ];

        // GitHub ANDs multiple labels; match-any is applied client-side.
        if let [label] = criteria.labels.as_slice() {
            params.push(("labels", label.clone()));
        }

        Url::parse_with_params(&self.issues_url(&criteria.repo), &params)
            .map_err(|e| Error::Validation(format!("invalid API URL: {}", e)))
    }
}

#[derive(Deserialize)]
struct ApiErrorBody {
    message: String,
}

/// Maps a non-success response onto the error taxonomy. `subject` names what
/// was being accessed, for 404 messages.
pub(crate) async fn check_response(
    response: Response,
    rate_limiter: &RateLimiter,
    subject: &str,
) -> Result<Response> {
    let quota = rate_limiter.update_from_headers(response.headers());
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let body = response.text().await.unwrap_or_default();
    let message = api_message(&body, status);

    let rate_limited = status == StatusCode::TOO_MANY_REQUESTS
        || (status == StatusCode::FORBIDDEN && quota.is_some_and(|q| q.is_exhausted()));

    let err = match status {
        _ if rate_limited => Error::RateLimited {
            reset_at: quota.and_then(|q| q.reset_at),
        },
        StatusCode::UNAUTHORIZED => Error::Auth(format!("HTTP 401: {}", message)),
        StatusCode::NOT_FOUND => Error::NotFound(subject.to_string()),
        StatusCode::FORBIDDEN => Error::Forbidden(message),
        _ => Error::Request {
            status: status.as_u16(),
            message,
        },
    };
    Err(err)
}

fn api_message(body: &str, status: StatusCode) -> String {
    if let Ok(parsed) = serde_json::from_str::<ApiErrorBody>(body) {
        return parsed.message;
    }
    let trimmed = body.trim();
    if trimmed.is_empty() {
        status.canonical_reason().unwrap_or("no response body").to_string()
    } else {
        trimmed.to_string()
    }
}
