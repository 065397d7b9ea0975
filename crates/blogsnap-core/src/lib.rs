//! Asset archiving for a static blog mirror.
//!
//! Pipeline: [`extract`] asset URLs from a saved HTML corpus, [`dispatcher`]
//! fetches them into a local asset store (resumable through the [`ledger`]),
//! and [`rewrite`] points the pages at the local copies.

pub mod config;
pub mod logging;

pub mod dispatcher;
pub mod error;
pub mod extract;
pub mod fetcher;
pub mod ledger;
pub mod rewrite;
pub mod storage;
pub mod url_model;

pub use error::{ArchiveError, FetchError};
