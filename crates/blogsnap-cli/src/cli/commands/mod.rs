//! CLI command handlers, one file per command.

mod fetch;
mod localize;
mod status;

pub use fetch::{run_fetch, FetchArgs, UrlSource};
pub use localize::run_localize;
pub use status::run_status;
