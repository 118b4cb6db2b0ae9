use crate::models::{AggregateReport, BucketCount};
use super::ReportContext;

const RULE_WIDTH: usize = 60;

pub fn render(ctx: &ReportContext, report: &AggregateReport, top: usize) -> String {
    let rule = "=".repeat(RULE_WIDTH);
    let mut output = String::new();

    output.push_str(&format!("{}\n", rule));
    output.push_str("GITHUB ISSUES ANALYSIS REPORT\n");
    output.push_str(&format!("Repository: {}\n", ctx.repo));
    output.push_str(&format!("Date range: {}\n", ctx.window.describe()));
    output.push_str(&format!(
        "Generated: {}\n",
        ctx.generated_at.format("%Y-%m-%d %H:%M:%S UTC")
    ));
    output.push_str(&format!("{}\n", rule));

    if report.total == 0 {
        output.push_str("\nNo issues found matching the criteria\n");
        output.push_str(&format!("\n{}\n", rule));
        return output;
    }

    // Summary
    let resolution = &report.resolution;
    output.push_str("\nSUMMARY\n");
    output.push_str(&format!("  Total issues: {}\n", report.total));
    output.push_str(&format!("  Closed: {}\n", resolution.resolved));
    if resolution.still_open > 0 {
        output.push_str(&format!("  Still open: {}\n", resolution.still_open));
    }
    match resolution.average_days {
        Some(avg) => output.push_str(&format!("  Average days to close: {:.2}\n", avg)),
        None => output.push_str("  Average days to close: n/a\n"),
    }

    push_buckets(&mut output, "ISSUES BY LABEL", &report.by_label, None);
    push_buckets(&mut output, "ISSUES BY ASSIGNEE", &report.by_assignee, Some(top));
    push_buckets(&mut output, "ISSUES BY AUTHOR", &report.by_author, Some(top));

    if resolution.resolved > 0 {
        output.push_str("\nRESOLUTION TIME\n");
        if let Some(median) = resolution.median_days {
            output.push_str(&format!("  Median: {:.1} days\n", median));
        }
        if let (Some(min), Some(max)) = (resolution.min_days, resolution.max_days) {
            output.push_str(&format!("  Fastest: {} days, slowest: {} days\n", min, max));
        }
        for range in &resolution.distribution {
            output.push_str(&format!("  {}: {}\n", range.range, range.count));
        }
    }

    if !report.trend.points.is_empty() {
        output.push_str(&format!("\nTREND (by {})\n", report.trend.granularity));
        for point in &report.trend.points {
            output.push_str(&format!("  {}: {}\n", point.period, point.count));
        }
    }

    if !report.label_combinations.is_empty() {
        output.push_str("\nTOP LABEL COMBINATIONS\n");
        for combination in report.label_combinations.iter().take(top) {
            output.push_str(&format!(
                "  [{}]: {} ({:.1}%)\n",
                combination.display_key(),
                combination.count,
                combination.percentage
            ));
        }
    }

    output.push_str(&format!("\n{}\n", rule));
    output
}

fn push_buckets(output: &mut String, header: &str, buckets: &[BucketCount], limit: Option<usize>) {
    if buckets.is_empty() {
        return;
    }
    output.push_str(&format!("\n{}\n", header));
    let limit = limit.unwrap_or(buckets.len());
    for bucket in buckets.iter().take(limit) {
        output.push_str(&format!(
            "  {}: {} ({:.1}%)\n",
            bucket.key, bucket.count, bucket.percentage
        ));
    }
}
