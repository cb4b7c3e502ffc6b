//! CLI command handlers, one file per command.

mod completions;
mod get;
mod url;

pub use completions::run_completions;
pub use get::run_get;
pub use url::run_url;
