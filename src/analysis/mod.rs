pub mod aggregator;

pub use aggregator::{aggregate, percentage, period_key};
