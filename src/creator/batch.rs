use std::collections::HashSet;

use async_trait::async_trait;

use crate::creator::template::CreatorConfig;
use crate::error::Result;
use crate::github::GitHubClient;
use crate::models::{CreatedIssue, NewIssue, RepoRef};

/// The two tracker operations the creator needs.
#[async_trait]
pub trait IssueTracker: Send + Sync {
    async fn open_issue_titles(&self, repo: &RepoRef) -> Result<Vec<String>>;
    async fn create_issue(&self, repo: &RepoRef, issue: &NewIssue) -> Result<CreatedIssue>;
}

#[async_trait]
impl IssueTracker for GitHubClient {
    async fn open_issue_titles(&self, repo: &RepoRef) -> Result<Vec<String>> {
        GitHubClient::open_issue_titles(self, repo).await
    }

    async fn create_issue(&self, repo: &RepoRef, issue: &NewIssue) -> Result<CreatedIssue> {
        GitHubClient::create_issue(self, repo, issue).await
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum ItemOutcome {
    Created { number: u64, url: String },
    WouldCreate,
    SkippedDuplicate,
    Failed(String),
}

#[derive(Debug, Clone, PartialEq)]
pub struct ItemReport {
    pub item: String,
    pub issue: NewIssue,
    pub outcome: ItemOutcome,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BatchSummary {
    pub created: usize,
    pub would_create: usize,
    pub skipped: usize,
    pub failed: usize,
}

impl BatchSummary {
    fn record(&mut self, outcome: &ItemOutcome) {
        match outcome {
            ItemOutcome::Created { .. } => self.created += 1,
            ItemOutcome::WouldCreate => self.would_create += 1,
            ItemOutcome::SkippedDuplicate => self.skipped += 1,
            ItemOutcome::Failed(_) => self.failed += 1,
        }
    }

    pub fn has_failures(&self) -> bool {
        self.failed > 0
    }
}

/// Titles compare trimmed and case-insensitively.
pub fn normalize_title(title: &str) -> String {
    title.trim().to_lowercase()
}

pub struct BatchCreator<'a, T: IssueTracker + ?Sized> {
    tracker: &'a T,
    config: &'a CreatorConfig,
    dry_run: bool,
}

impl<'a, T: IssueTracker + ?Sized> BatchCreator<'a, T> {
    pub fn new(tracker: &'a T, config: &'a CreatorConfig, dry_run: bool) -> Self {
        Self {
            tracker,
            config,
            dry_run,
        }
    }

    /// Processes every item in order. Only the initial duplicate-check fetch
    /// can fail the whole batch; per-item failures are reported and skipped.
    pub async fn run<F>(&self, items: &[String], mut on_item: F) -> Result<BatchSummary>
    where
        F: FnMut(&ItemReport),
    {
        let repo = &self.config.repository;
        let mut existing: HashSet<String> = self
            .tracker
            .open_issue_titles(repo)
            .await?
            .iter()
            .map(|title| normalize_title(title))
            .collect();
        tracing::info!("{} open issues in {}", existing.len(), repo);

        let mut summary = BatchSummary::default();
        for item in items {
            let report = self.process(item, &mut existing).await;
            summary.record(&report.outcome);
            on_item(&report);
        }

        Ok(summary)
    }

    async fn process(&self, item: &str, existing: &mut HashSet<String>) -> ItemReport {
        let issue = self.config.render(item);
        let key = normalize_title(&issue.title);

        let outcome = if existing.contains(&key) {
            ItemOutcome::SkippedDuplicate
        } else if self.dry_run {
            existing.insert(key);
            ItemOutcome::WouldCreate
        } else {
            match self.tracker.create_issue(&self.config.repository, &issue).await {
                Ok(created) => {
                    existing.insert(key);
                    ItemOutcome::Created {
                        number: created.number,
                        url: created.html_url,
                    }
                }
                Err(e) => {
                    tracing::warn!("Failed to create '{}': {}", issue.title, e);
                    ItemOutcome::Failed(e.to_string())
                }
            }
        };

        ItemReport {
            item: item.to_string(),
            issue,
            outcome,
        }
    }
}
