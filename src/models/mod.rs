pub mod issue;
pub mod filter;
pub mod report;

pub use issue::*;
pub use filter::*;
pub use report::*;
