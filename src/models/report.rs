use serde::{Deserialize, Serialize};

pub const UNASSIGNED: &str = "unassigned";
pub const NO_LABELS: &str = "no labels";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum TrendGranularity {
    #[default]
    Month,
    Week,
}

impl std::fmt::Display for TrendGranularity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TrendGranularity::Month => write!(f, "month"),
            TrendGranularity::Week => write!(f, "week"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BucketCount {
    pub key: String,
    pub count: usize,
    pub percentage: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LabelCombination {
    /// Sorted and de-duplicated; empty for unlabeled issues.
    pub labels: Vec<String>,
    pub count: usize,
    pub percentage: f64,
}

impl LabelCombination {
    pub fn display_key(&self) -> String {
        if self.labels.is_empty() {
            NO_LABELS.to_string()
        } else {
            self.labels.join(", ")
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LatencyRange {
    pub range: String,
    pub count: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResolutionStats {
    pub resolved: usize,
    pub still_open: usize,
    pub average_days: Option<f64>,
    pub median_days: Option<f64>,
    pub min_days: Option<i64>,
    pub max_days: Option<i64>,
    pub distribution: Vec<LatencyRange>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrendPoint {
    pub period: String,
    pub count: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Trend {
    pub granularity: TrendGranularity,
    pub points: Vec<TrendPoint>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AggregateReport {
    pub total: usize,
    pub by_label: Vec<BucketCount>,
    pub by_assignee: Vec<BucketCount>,
    pub by_author: Vec<BucketCount>,
    pub label_combinations: Vec<LabelCombination>,
    pub resolution: ResolutionStats,
    pub trend: Trend,
}
