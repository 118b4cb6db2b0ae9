use std::collections::{BTreeMap, BTreeSet};

use chrono::{DateTime, Datelike, Utc};

use crate::models::{
    AggregateReport, BucketCount, IssueRecord, LabelCombination, LatencyRange, ResolutionStats,
    Trend, TrendGranularity, TrendPoint, UNASSIGNED,
};

/// Upper bounds (inclusive, in days) of the latency distribution ranges.
const LATENCY_RANGES: [(&str, Option<i64>); 5] = [
    ("same day", Some(0)),
    ("1-7 days", Some(7)),
    ("8-30 days", Some(30)),
    ("31-90 days", Some(90)),
    ("over 90 days", None),
];

/// Builds the summary statistics for a set of issues. Pure and deterministic:
/// every ranking is ordered by count descending, then key ascending.
pub fn aggregate(issues: &[IssueRecord], granularity: TrendGranularity) -> AggregateReport {
    let total = issues.len();

    let mut by_label: BTreeMap<String, usize> = BTreeMap::new();
    let mut by_assignee: BTreeMap<String, usize> = BTreeMap::new();
    let mut by_author: BTreeMap<String, usize> = BTreeMap::new();
    let mut combinations: BTreeMap<Vec<String>, usize> = BTreeMap::new();
    let mut trend: BTreeMap<String, usize> = BTreeMap::new();
    let mut latencies: Vec<i64> = Vec::new();
    let mut still_open = 0;

    for issue in issues {
        let labels: BTreeSet<&str> = issue.labels.iter().map(String::as_str).collect();
        for label in &labels {
            *by_label.entry(label.to_string()).or_default() += 1;
        }

        let combination: Vec<String> = labels.iter().map(|l| l.to_string()).collect();
        *combinations.entry(combination).or_default() += 1;

        let assignee = issue.primary_assignee().unwrap_or(UNASSIGNED);
        *by_assignee.entry(assignee.to_string()).or_default() += 1;

        *by_author.entry(issue.author.clone()).or_default() += 1;

        match (issue.days_to_close(), issue.closed_at) {
            (Some(days), Some(closed_at)) => {
                latencies.push(days);
                *trend.entry(period_key(closed_at, granularity)).or_default() += 1;
            }
            _ => still_open += 1,
        }
    }

    AggregateReport {
        total,
        by_label: ranked(by_label, total),
        by_assignee: ranked(by_assignee, total),
        by_author: ranked(by_author, total),
        label_combinations: ranked_combinations(combinations, total),
        resolution: resolution_stats(latencies, still_open),
        trend: Trend {
            granularity,
            points: trend
                .into_iter()
                .map(|(period, count)| TrendPoint { period, count })
                .collect(),
        },
    }
}

pub fn percentage(count: usize, total: usize) -> f64 {
    if total == 0 {
        0.0
    } else {
        count as f64 * 100.0 / total as f64
    }
}

/// `YYYY-MM` for months, ISO `YYYY-Www` for weeks. Both sort chronologically.
pub fn period_key(timestamp: DateTime<Utc>, granularity: TrendGranularity) -> String {
    match granularity {
        TrendGranularity::Month => timestamp.format("%Y-%m").to_string(),
        TrendGranularity::Week => {
            let week = timestamp.iso_week();
            format!("{}-W{:02}", week.year(), week.week())
        }
    }
}

fn ranked(counts: BTreeMap<String, usize>, total: usize) -> Vec<BucketCount> {
    let mut buckets: Vec<BucketCount> = counts
        .into_iter()
        .map(|(key, count)| BucketCount {
            key,
            count,
            percentage: percentage(count, total),
        })
        .collect();
    // Stable sort keeps the map's ascending key order among equal counts.
    buckets.sort_by(|a, b| b.count.cmp(&a.count));
    buckets
}

fn ranked_combinations(
    counts: BTreeMap<Vec<String>, usize>,
    total: usize,
) -> Vec<LabelCombination> {
    let mut combinations: Vec<LabelCombination> = counts
        .into_iter()
        .map(|(labels, count)| LabelCombination {
            labels,
            count,
            percentage: percentage(count, total),
        })
        .collect();
    combinations.sort_by(|a, b| b.count.cmp(&a.count));
    combinations
}

fn resolution_stats(mut latencies: Vec<i64>, still_open: usize) -> ResolutionStats {
    latencies.sort_unstable();

    let distribution = LATENCY_RANGES
        .iter()
        .enumerate()
        .map(|(i, (range, upper))| {
            let lower = if i == 0 {
                i64::MIN
            } else {
                LATENCY_RANGES[i - 1].1.map_or(i64::MIN, |prev| prev + 1)
            };
            let count = latencies
                .iter()
                .filter(|&&days| days >= lower && upper.map_or(true, |u| days <= u))
                .count();
            LatencyRange {
                range: range.to_string(),
                count,
            }
        })
        .collect();

    let resolved = latencies.len();
    let (average_days, median_days) = if resolved == 0 {
        (None, None)
    } else {
        let sum: i64 = latencies.iter().sum();
        let average = round2(sum as f64 / resolved as f64);
        let mid = resolved / 2;
        let median = if resolved % 2 == 0 {
            (latencies[mid - 1] + latencies[mid]) as f64 / 2.0
        } else {
            latencies[mid] as f64
        };
        (Some(average), Some(median))
    };

    ResolutionStats {
        resolved,
        still_open,
        average_days,
        median_days,
        min_days: latencies.first().copied(),
        max_days: latencies.last().copied(),
        distribution,
    }
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::NO_LABELS;
    use chrono::{Duration, TimeZone};

    fn d0() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 1, 1, 9, 0, 0).unwrap()
    }

    fn issue(
        number: u64,
        author: &str,
        assignees: &[&str],
        labels: &[&str],
        created: DateTime<Utc>,
        closed: Option<DateTime<Utc>>,
    ) -> IssueRecord {
        IssueRecord {
            number,
            title: format!("Issue {number}"),
            author: author.to_string(),
            assignees: assignees.iter().map(|a| a.to_string()).collect(),
            labels: labels.iter().map(|l| l.to_string()).collect(),
            state: if closed.is_some() { "closed" } else { "open" }.to_string(),
            created_at: created,
            closed_at: closed,
            updated_at: closed.unwrap_or(created),
            url: format!("https://github.com/acme/widgets/issues/{number}"),
        }
    }

    fn sample() -> Vec<IssueRecord> {
        vec![
            issue(1, "alice", &["bob"], &["bug", "p1"], d0(), Some(d0() + Duration::days(2))),
            issue(2, "alice", &[], &["p1", "bug"], d0(), Some(d0() + Duration::days(10))),
            issue(3, "carol", &["dave", "bob"], &["docs"], d0(), Some(d0() + Duration::days(40))),
            issue(4, "bob", &[], &[], d0(), Some(d0() + Duration::hours(3))),
            issue(5, "carol", &["bob"], &["bug"], d0(), Some(d0() + Duration::days(120))),
        ]
    }

    #[test]
    fn test_assignee_buckets_sum_to_total() {
        let report = aggregate(&sample(), TrendGranularity::Month);
        let sum: usize = report.by_assignee.iter().map(|b| b.count).sum();
        assert_eq!(sum, report.total);

        let unassigned = report.by_assignee.iter().find(|b| b.key == UNASSIGNED).unwrap();
        assert_eq!(unassigned.count, 2);

        let pct: f64 = report.by_assignee.iter().map(|b| b.percentage).sum();
        assert!((pct - 100.0).abs() < 1e-9);
        let pct: f64 = report.by_author.iter().map(|b| b.percentage).sum();
        assert!((pct - 100.0).abs() < 1e-9);
    }

    #[test]
    fn test_label_tallies_may_exceed_total() {
        let report = aggregate(&sample(), TrendGranularity::Month);
        let sum: usize = report.by_label.iter().map(|b| b.count).sum();
        assert_eq!(sum, 6);
        assert_eq!(report.by_label[0].key, "bug");
        assert_eq!(report.by_label[0].count, 3);
        assert!((report.by_label[0].percentage - 60.0).abs() < 1e-9);

        let pct: f64 = report.by_label.iter().map(|b| b.percentage).sum();
        assert!(pct > 100.0);
    }

    #[test]
    fn test_label_combinations_order_independent() {
        let report = aggregate(&sample(), TrendGranularity::Month);
        let top = &report.label_combinations[0];
        assert_eq!(top.labels, vec!["bug", "p1"]);
        assert_eq!(top.count, 2);

        let unlabeled = report
            .label_combinations
            .iter()
            .find(|c| c.labels.is_empty())
            .unwrap();
        assert_eq!(unlabeled.count, 1);
        assert_eq!(unlabeled.display_key(), NO_LABELS);
    }

    #[test]
    fn test_ties_broken_by_key() {
        let issues = vec![
            issue(1, "zed", &[], &["zeta"], d0(), None),
            issue(2, "amy", &[], &["alpha"], d0(), None),
            issue(3, "mia", &[], &["mu"], d0(), None),
        ];
        let report = aggregate(&issues, TrendGranularity::Month);
        let labels: Vec<&str> = report.by_label.iter().map(|b| b.key.as_str()).collect();
        assert_eq!(labels, vec!["alpha", "mu", "zeta"]);
        let authors: Vec<&str> = report.by_author.iter().map(|b| b.key.as_str()).collect();
        assert_eq!(authors, vec!["amy", "mia", "zed"]);
    }

    #[test]
    fn test_open_issue_excluded_from_average() {
        let issues = vec![
            issue(1, "alice", &[], &[], d0(), Some(d0() + Duration::days(5))),
            issue(2, "alice", &[], &[], d0(), None),
        ];
        let report = aggregate(&issues, TrendGranularity::Month);

        assert_eq!(report.total, 2);
        assert_eq!(report.resolution.resolved, 1);
        assert_eq!(report.resolution.still_open, 1);
        assert_eq!(report.resolution.average_days, Some(5.0));
        assert_eq!(report.trend.points.len(), 1);
    }

    #[test]
    fn test_resolution_statistics() {
        let report = aggregate(&sample(), TrendGranularity::Month);
        let res = &report.resolution;

        // Latencies: 0, 2, 10, 40, 120
        assert_eq!(res.average_days, Some(34.4));
        assert_eq!(res.median_days, Some(10.0));
        assert_eq!(res.min_days, Some(0));
        assert_eq!(res.max_days, Some(120));

        let counts: Vec<usize> = res.distribution.iter().map(|r| r.count).collect();
        assert_eq!(counts, vec![1, 1, 1, 1, 1]);
    }

    #[test]
    fn test_empty_input() {
        let report = aggregate(&[], TrendGranularity::Week);
        assert_eq!(report.total, 0);
        assert!(report.by_label.is_empty());
        assert_eq!(report.resolution.average_days, None);
        assert_eq!(report.resolution.distribution.len(), 5);
        assert!(report.trend.points.is_empty());
    }

    #[test]
    fn test_trend_ascending() {
        let issues = vec![
            issue(1, "a", &[], &[], d0(), Some(Utc.with_ymd_and_hms(2024, 3, 2, 0, 0, 0).unwrap())),
            issue(2, "a", &[], &[], d0(), Some(Utc.with_ymd_and_hms(2024, 1, 20, 0, 0, 0).unwrap())),
            issue(3, "a", &[], &[], d0(), Some(Utc.with_ymd_and_hms(2024, 3, 30, 0, 0, 0).unwrap())),
        ];
        let report = aggregate(&issues, TrendGranularity::Month);
        let points: Vec<(&str, usize)> = report
            .trend
            .points
            .iter()
            .map(|p| (p.period.as_str(), p.count))
            .collect();
        assert_eq!(points, vec![("2024-01", 1), ("2024-03", 2)]);
    }

    #[test]
    fn test_week_keys_use_iso_year() {
        // 2024-12-30 falls in ISO week 1 of 2025.
        let ts = Utc.with_ymd_and_hms(2024, 12, 30, 0, 0, 0).unwrap();
        assert_eq!(period_key(ts, TrendGranularity::Week), "2025-W01");
        let ts = Utc.with_ymd_and_hms(2024, 2, 14, 0, 0, 0).unwrap();
        assert_eq!(period_key(ts, TrendGranularity::Week), "2024-W07");
    }

    #[test]
    fn test_deterministic_output() {
        let issues = sample();
        let first = serde_json::to_string(&aggregate(&issues, TrendGranularity::Week)).unwrap();
        let second = serde_json::to_string(&aggregate(&issues, TrendGranularity::Week)).unwrap();
        assert_eq!(first, second);
    }
}
