use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::error::Result;
use crate::models::{AggregateReport, IssueRecord};
use super::ReportContext;

#[derive(Serialize)]
struct JsonReport<'a> {
    metadata: Metadata,
    summary: &'a AggregateReport,
    issues: Vec<JsonIssue<'a>>,
}

#[derive(Serialize)]
struct Metadata {
    repository: String,
    generated_at: DateTime<Utc>,
    since: DateTime<Utc>,
    until: Option<DateTime<Utc>>,
    total_issues: usize,
    avg_days_to_close: Option<f64>,
}

#[derive(Serialize)]
struct JsonIssue<'a> {
    #[serde(flatten)]
    record: &'a IssueRecord,
    days_to_close: Option<i64>,
}

pub fn render(
    ctx: &ReportContext,
    issues: &[IssueRecord],
    report: &AggregateReport,
) -> Result<String> {
    let document = JsonReport {
        metadata: Metadata {
            repository: ctx.repo.to_string(),
            generated_at: ctx.generated_at,
            since: ctx.window.since,
            until: ctx.window.until,
            total_issues: report.total,
            avg_days_to_close: report.resolution.average_days,
        },
        summary: report,
        issues: issues
            .iter()
            .map(|record| JsonIssue {
                record,
                days_to_close: record.days_to_close(),
            })
            .collect(),
    };

    let mut rendered = serde_json::to_string_pretty(&document)?;
    rendered.push('\n');
    Ok(rendered)
}
