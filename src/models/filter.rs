use chrono::{DateTime, Duration, NaiveDate, NaiveTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use super::issue::RepoRef;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum IssueState {
    Open,
    #[default]
    Closed,
    All,
}

impl IssueState {
    pub fn as_query(&self) -> &'static str {
        match self {
            IssueState::Open => "open",
            IssueState::Closed => "closed",
            IssueState::All => "all",
        }
    }
}

impl std::fmt::Display for IssueState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_query())
    }
}

/// Inclusive time window applied to each issue's window timestamp.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct DateWindow {
    pub since: DateTime<Utc>,
    pub until: Option<DateTime<Utc>>,
}

impl DateWindow {
    /// An explicit `since` date takes precedence over `days`. Without one,
    /// the window reaches `days` back from `until`, or from `now` when no
    /// end date is given. `until` covers the whole of the given day.
    pub fn resolve(
        days: u32,
        since: Option<NaiveDate>,
        until: Option<NaiveDate>,
        now: DateTime<Utc>,
    ) -> Result<Self> {
        let until = until.map(|date| {
            let end_of_day = NaiveTime::from_hms_opt(23, 59, 59).unwrap_or_default();
            date.and_time(end_of_day).and_utc()
        });

        let since = match since {
            Some(date) => date.and_time(NaiveTime::default()).and_utc(),
            None => until
                .unwrap_or(now)
                .checked_sub_signed(Duration::days(i64::from(days)))
                .ok_or_else(|| {
                    Error::Validation(format!(
                        "--days {} reaches past the earliest supported date",
                        days
                    ))
                })?,
        };

        if let Some(until) = until {
            if since > until {
                return Err(Error::Validation(format!(
                    "--since {} is after --until {}",
                    since.format("%Y-%m-%d"),
                    until.format("%Y-%m-%d")
                )));
            }
        }

        Ok(Self { since, until })
    }

    pub fn contains(&self, timestamp: DateTime<Utc>) -> bool {
        timestamp >= self.since && self.until.map_or(true, |until| timestamp <= until)
    }

    pub fn describe(&self) -> String {
        format!(
            "{} to {}",
            self.since.format("%Y-%m-%d"),
            self.until
                .map(|u| u.format("%Y-%m-%d").to_string())
                .unwrap_or_else(|| "now".to_string())
        )
    }
}

#[derive(Debug, Clone)]
pub struct FilterCriteria {
    pub repo: RepoRef,
    /// Match-any; empty means no label filter.
    pub labels: Vec<String>,
    pub state: IssueState,
    pub window: DateWindow,
}

impl FilterCriteria {
    pub fn new(repo: RepoRef, window: DateWindow) -> Self {
        Self {
            repo,
            labels: Vec::new(),
            state: IssueState::default(),
            window,
        }
    }

    pub fn with_labels(mut self, labels: Vec<String>) -> Self {
        self.labels = labels;
        self
    }

    pub fn with_state(mut self, state: IssueState) -> Self {
        self.state = state;
        self
    }
}

/// Splits a comma-separated label list, dropping empty entries.
pub fn parse_label_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|label| !label.is_empty())
        .map(str::to_string)
        .collect()
}
