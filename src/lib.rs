pub mod config;
pub mod error;
pub mod models;
pub mod github;
pub mod analysis;
pub mod report;
pub mod creator;

pub use config::Config;
pub use error::{Error, Result};
pub use github::GitHubClient;
pub use analysis::aggregate;
pub use report::{OutputFormat, Reporter};
pub use creator::{BatchCreator, CreatorConfig, IssueTracker};
