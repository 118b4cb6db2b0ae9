pub mod console;
pub mod csv;
pub mod json;

use std::io::Write;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::models::{AggregateReport, DateWindow, IssueRecord, RepoRef};

pub const DEFAULT_TOP: usize = 10;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    #[default]
    Console,
    Csv,
    Json,
}

impl OutputFormat {
    fn file_extension(&self) -> Option<&'static str> {
        match self {
            OutputFormat::Console => None,
            OutputFormat::Csv => Some("csv"),
            OutputFormat::Json => Some("json"),
        }
    }
}

impl std::fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OutputFormat::Console => write!(f, "console"),
            OutputFormat::Csv => write!(f, "csv"),
            OutputFormat::Json => write!(f, "json"),
        }
    }
}

/// Run metadata that is not part of the aggregate itself.
#[derive(Debug, Clone)]
pub struct ReportContext {
    pub repo: RepoRef,
    pub window: DateWindow,
    pub generated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Destination {
    Stdout,
    File(PathBuf),
}

impl std::fmt::Display for Destination {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Destination::Stdout => write!(f, "standard output"),
            Destination::File(path) => write!(f, "{}", path.display()),
        }
    }
}

/// Serializes a report and writes it out. The only component that performs
/// output side effects for the analyzer.
#[derive(Debug, Clone)]
pub struct Reporter {
    format: OutputFormat,
    top: usize,
}

impl Reporter {
    pub fn new(format: OutputFormat) -> Self {
        Self {
            format,
            top: DEFAULT_TOP,
        }
    }

    pub fn with_top(mut self, top: usize) -> Self {
        self.top = top;
        self
    }

    pub fn render(
        &self,
        ctx: &ReportContext,
        issues: &[IssueRecord],
        report: &AggregateReport,
    ) -> Result<String> {
        match self.format {
            OutputFormat::Console => Ok(console::render(ctx, report, self.top)),
            OutputFormat::Csv => csv::render(issues),
            OutputFormat::Json => json::render(ctx, issues, report),
        }
    }

    /// `-` means standard output. Without an explicit path, console output goes
    /// to stdout and file formats get a timestamped name.
    pub fn destination(&self, ctx: &ReportContext, output: Option<&Path>) -> Destination {
        match output {
            Some(path) if path.as_os_str() == "-" => Destination::Stdout,
            Some(path) => Destination::File(path.to_path_buf()),
            None => match self.format.file_extension() {
                Some(ext) => Destination::File(PathBuf::from(format!(
                    "github_issues_report_{}_{}_{}.{}",
                    ctx.repo.owner,
                    ctx.repo.name,
                    ctx.generated_at.format("%Y%m%d_%H%M%S"),
                    ext
                ))),
                None => Destination::Stdout,
            },
        }
    }

    pub fn emit(
        &self,
        ctx: &ReportContext,
        issues: &[IssueRecord],
        report: &AggregateReport,
        output: Option<&Path>,
    ) -> Result<Destination> {
        let rendered = self.render(ctx, issues, report)?;
        let destination = self.destination(ctx, output);

        match &destination {
            Destination::Stdout => {
                let mut stdout = std::io::stdout().lock();
                stdout.write_all(rendered.as_bytes())?;
                stdout.flush()?;
            }
            Destination::File(path) => {
                std::fs::write(path, &rendered)?;
                tracing::info!("{} report written to: {}", self.format, path.display());
            }
        }

        Ok(destination)
    }
}

#[cfg(test)]
pub(crate) mod fixtures {
    use super::*;
    use chrono::{Duration, TimeZone};

    pub fn context() -> ReportContext {
        ReportContext {
            repo: RepoRef::new("acme", "widgets"),
            window: DateWindow {
                since: Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap(),
                until: Some(Utc.with_ymd_and_hms(2024, 1, 31, 23, 59, 59).unwrap()),
            },
            generated_at: Utc.with_ymd_and_hms(2024, 2, 1, 10, 30, 0).unwrap(),
        }
    }

    pub fn issues() -> Vec<IssueRecord> {
        let created = Utc.with_ymd_and_hms(2024, 1, 3, 8, 0, 0).unwrap();
        vec![
            IssueRecord {
                number: 7,
                title: "Crash, on \"save\"".to_string(),
                author: "alice".to_string(),
                assignees: vec!["bob".to_string(), "carol".to_string()],
                labels: vec!["bug".to_string(), "p1".to_string()],
                state: "closed".to_string(),
                created_at: created,
                closed_at: Some(created + Duration::days(5)),
                updated_at: created + Duration::days(5),
                url: "https://github.com/acme/widgets/issues/7".to_string(),
            },
            IssueRecord {
                number: 9,
                title: "Docs typo".to_string(),
                author: "dave".to_string(),
                assignees: vec![],
                labels: vec![],
                state: "open".to_string(),
                created_at: created,
                closed_at: None,
                updated_at: created,
                url: "https://github.com/acme/widgets/issues/9".to_string(),
            },
        ]
    }
}
