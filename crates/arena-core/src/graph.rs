//! Boundary the engine uses to resolve page titles to pages and their
//! outgoing links. The backing lookup (live wiki API, database snapshot,
//! in-memory fixture) lives behind this trait.

use std::future::Future;
use std::pin::Pin;

use crate::models::Page;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PageError {
    /// The title does not resolve to a page.
    NotFound(String),
    /// The backing lookup could not be reached.
    Unreachable(String),
}

impl std::fmt::Display for PageError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PageError::NotFound(title) => write!(f, "page not found: {title}"),
            PageError::Unreachable(reason) => write!(f, "page source unreachable: {reason}"),
        }
    }
}

impl std::error::Error for PageError {}

/// Authoritative source for pages and their link sets.
pub trait PageSource: Send + Sync {
    fn get_page<'a>(
        &'a self,
        title: &'a str,
    ) -> Pin<Box<dyn Future<Output = Result<Page, PageError>> + Send + 'a>>;
}
