use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Login used when GitHub returns no user (deleted accounts).
pub const GHOST_LOGIN: &str = "ghost";

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RepoRef {
    pub owner: String,
    pub name: String,
}

impl RepoRef {
    pub fn new(owner: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            owner: owner.into(),
            name: name.into(),
        }
    }
}

impl std::fmt::Display for RepoRef {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}/{}", self.owner, self.name)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GitHubIssue {
    pub number: u64,
    pub title: String,
    pub user: Option<IssueUser>,
    #[serde(default)]
    pub assignees: Vec<IssueUser>,
    #[serde(default)]
    pub labels: Vec<IssueLabel>,
    pub state: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub closed_at: Option<DateTime<Utc>>,
    pub html_url: String,
    #[serde(default)]
    pub pull_request: Option<serde_json::Value>,
}

impl GitHubIssue {
    /// The issues endpoint also lists pull requests.
    pub fn is_pull_request(&self) -> bool {
        self.pull_request.is_some()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IssueUser {
    pub login: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IssueLabel {
    pub name: String,
}

/// One issue as consumed by the aggregator and reporters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IssueRecord {
    pub number: u64,
    pub title: String,
    pub author: String,
    pub assignees: Vec<String>,
    pub labels: Vec<String>,
    pub state: String,
    pub created_at: DateTime<Utc>,
    pub closed_at: Option<DateTime<Utc>>,
    pub updated_at: DateTime<Utc>,
    pub url: String,
}

impl IssueRecord {
    /// Whole days between creation and closure, rounded down.
    pub fn days_to_close(&self) -> Option<i64> {
        self.closed_at
            .map(|closed| (closed - self.created_at).num_seconds().div_euclid(86_400))
    }

    pub fn primary_assignee(&self) -> Option<&str> {
        self.assignees.first().map(String::as_str)
    }

    /// Closure time for closed issues, creation time otherwise.
    pub fn window_timestamp(&self) -> DateTime<Utc> {
        self.closed_at.unwrap_or(self.created_at)
    }

    pub fn has_any_label(&self, wanted: &[String]) -> bool {
        wanted.is_empty() || self.labels.iter().any(|label| wanted.contains(label))
    }
}

impl From<GitHubIssue> for IssueRecord {
    fn from(issue: GitHubIssue) -> Self {
        Self {
            number: issue.number,
            title: issue.title,
            author: issue
                .user
                .map(|u| u.login)
                .unwrap_or_else(|| GHOST_LOGIN.to_string()),
            assignees: issue.assignees.into_iter().map(|a| a.login).collect(),
            labels: issue.labels.into_iter().map(|l| l.name).collect(),
            state: issue.state,
            created_at: issue.created_at,
            closed_at: issue.closed_at,
            updated_at: issue.updated_at,
            url: issue.html_url,
        }
    }
}

/// Body of a create-issue request.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NewIssue {
    pub title: String,
    pub body: String,
    pub labels: Vec<String>,
    pub assignees: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub milestone: Option<u64>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CreatedIssue {
    pub number: u64,
    pub html_url: String,
}

/// Minimal view used by the duplicate check.
#[derive(Debug, Clone, Deserialize)]
pub struct IssueTitle {
    pub title: String,
    #[serde(default)]
    pub pull_request: Option<serde_json::Value>,
}
