use std::collections::HashSet;

use crate::models::{FilterCriteria, GitHubIssue, IssueRecord};

/// Client-side half of the issue fetch: applies the filters GitHub cannot
/// express, drops repeats, and decides when paging can stop.
///
/// Pages arrive sorted by `updated_at` descending. An issue's window timestamp
/// is never later than its `updated_at`, so once a page holds an issue updated
/// before the window start nothing older can match. One more page is still
/// read past that point in case the ordering is not strict.
pub struct IssueFilter<'a> {
    criteria: &'a FilterCriteria,
    seen: HashSet<u64>,
    records: Vec<IssueRecord>,
    boundary_reached: bool,
    pages_past_boundary: u32,
}

impl<'a> IssueFilter<'a> {
    pub fn new(criteria: &'a FilterCriteria) -> Self {
        Self {
            criteria,
            seen: HashSet::new(),
            records: Vec::new(),
            boundary_reached: false,
            pages_past_boundary: 0,
        }
    }

    /// Returns how many issues of the page were kept.
    pub fn accept_page(&mut self, page: Vec<GitHubIssue>) -> usize {
        if self.boundary_reached {
            self.pages_past_boundary += 1;
        }

        let since = self.criteria.window.since;
        if page.iter().any(|issue| issue.updated_at < since) {
            self.boundary_reached = true;
        }

        let before = self.records.len();
        for issue in page {
            if issue.is_pull_request() {
                continue;
            }
            let record = IssueRecord::from(issue);
            if !self.criteria.window.contains(record.window_timestamp())
                || !record.has_any_label(&self.criteria.labels)
            {
                continue;
            }
            if self.seen.insert(record.number) {
                self.records.push(record);
            }
        }
        self.records.len() - before
    }

    pub fn should_continue(&self) -> bool {
        !(self.boundary_reached && self.pages_past_boundary >= 1)
    }

    pub fn into_records(self) -> Vec<IssueRecord> {
        self.records
    }
}
