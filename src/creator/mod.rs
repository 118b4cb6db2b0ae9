pub mod template;
pub mod batch;

pub use template::{parse_items, read_items, CreatorConfig, IssueTemplate, PLACEHOLDER};
pub use batch::{BatchCreator, BatchSummary, IssueTracker, ItemOutcome, ItemReport};
