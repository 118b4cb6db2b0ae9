use serde::Serialize;

use crate::error::{Error, Result};
use crate::models::IssueRecord;

/// One CSV line per issue; field order is the column order.
#[derive(Serialize)]
struct CsvRow<'a> {
    number: u64,
    title: &'a str,
    author: &'a str,
    assignees: String,
    labels: String,
    created_at: String,
    closed_at: String,
    days_to_close: Option<i64>,
    url: &'a str,
}

impl<'a> From<&'a IssueRecord> for CsvRow<'a> {
    fn from(issue: &'a IssueRecord) -> Self {
        Self {
            number: issue.number,
            title: &issue.title,
            author: &issue.author,
            assignees: issue.assignees.join(";"),
            labels: issue.labels.join(";"),
            created_at: issue.created_at.format("%Y-%m-%d").to_string(),
            closed_at: issue
                .closed_at
                .map(|closed| closed.format("%Y-%m-%d").to_string())
                .unwrap_or_default(),
            days_to_close: issue.days_to_close(),
            url: &issue.url,
        }
    }
}

pub fn write<W: std::io::Write>(issues: &[IssueRecord], writer: W) -> Result<()> {
    let mut csv_writer = ::csv::Writer::from_writer(writer);
    for issue in issues {
        csv_writer.serialize(CsvRow::from(issue))?;
    }
    if issues.is_empty() {
        csv_writer.write_record(HEADER)?;
    }
    csv_writer.flush()?;
    Ok(())
}

pub fn render(issues: &[IssueRecord]) -> Result<String> {
    let mut buffer = Vec::new();
    write(issues, &mut buffer)?;
    String::from_utf8(buffer).map_err(|e| Error::Validation(format!("CSV output is not UTF-8: {}", e)))
}

const HEADER: [&str; 9] = [
    "number",
    "title",
    "author",
    "assignees",
    "labels",
    "created_at",
    "closed_at",
    "days_to_close",
    "url",
];
