//! Cursor pagination aggregator.
//!
//! Collection endpoints return one page at a time with an opaque `links.next`
//! cursor. [`aggregate`] walks that chain from an already fetched first page
//! and concatenates every page's items into a single page of the same type,
//! so every resource collection shares one implementation.

use std::collections::HashSet;
use std::future::Future;

use thiserror::Error;
use tracing::debug;

use crate::models::ListDocument;

/// Default cap on pages fetched in one walk, first page included.
pub const DEFAULT_MAX_PAGES: usize = 10_000;

/// Minimal capability the aggregator needs from a page type.
pub trait Page: Sized {
    /// Resource type held by the page.
    type Item;

    /// Items in server order.
    fn items(&self) -> &[Self::Item];

    /// Cursor for the following page; `None` on the last page.
    fn next_link(&self) -> Option<&str>;

    /// Replace the next-page cursor.
    fn set_next_link(&mut self, link: Option<String>);

    /// Append items after the existing ones.
    fn append_items(&mut self, items: Vec<Self::Item>);

    /// Consume the page, keeping only its items.
    fn into_items(self) -> Vec<Self::Item>;
}

impl<T> Page for ListDocument<T> {
    type Item = T;

    fn items(&self) -> &[T] {
        &self.data
    }

    fn next_link(&self) -> Option<&str> {
        self.links.next.as_deref()
    }

    fn set_next_link(&mut self, link: Option<String>) {
        self.links.next = link;
    }

    fn append_items(&mut self, items: Vec<T>) {
        self.data.extend(items);
    }

    fn into_items(self) -> Vec<T> {
        self.data
    }
}

/// Limits applied while walking a pagination chain.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PaginationOptions {
    /// Maximum number of pages, first page included.
    pub max_pages: usize,
}

impl Default for PaginationOptions {
    fn default() -> Self {
        Self {
            max_pages: DEFAULT_MAX_PAGES,
        }
    }
}

impl PaginationOptions {
    /// Options with a custom page cap (at least one page).
    #[must_use]
    pub fn with_max_pages(max_pages: usize) -> Self {
        Self {
            max_pages: max_pages.max(1),
        }
    }
}

/// A pagination chain that does not terminate on its own.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum PaginationError {
    /// More pages than the configured cap.
    #[error("pagination stopped after {limit} pages; the result set is larger than the page cap")]
    PageLimitExceeded { limit: usize },

    /// The server handed back a cursor already followed in this walk.
    #[error("pagination cycle detected: next link {link} was already fetched")]
    RepeatedLink { link: String },
}

/// Follow `next` links from `first` until the chain ends.
///
/// `fetch_next` performs exactly one page fetch per call. Items are
/// concatenated in server order and the returned page has no next link. Any
/// error from `fetch_next`, or a tripped safeguard, aborts the walk and the
/// items gathered so far are dropped.
pub async fn aggregate<P, E, F, Fut>(
    first: P,
    options: &PaginationOptions,
    mut fetch_next: F,
) -> Result<P, E>
where
    P: Page,
    E: From<PaginationError>,
    F: FnMut(String) -> Fut,
    Fut: Future<Output = Result<P, E>>,
{
    let mut aggregate = first;
    let mut next = aggregate.next_link().map(str::to_owned);
    aggregate.set_next_link(None);

    let mut visited: HashSet<String> = HashSet::new();
    let mut pages = 1usize;

    while let Some(link) = next {
        if pages >= options.max_pages {
            return Err(PaginationError::PageLimitExceeded {
                limit: options.max_pages,
            }
            .into());
        }
        if !visited.insert(link.clone()) {
            return Err(PaginationError::RepeatedLink { link }.into());
        }

        let page = fetch_next(link).await?;
        pages += 1;

        next = page.next_link().map(str::to_owned);
        let items = page.into_items();
        debug!(page = pages, items = items.len(), more = next.is_some(), "Fetched page");
        aggregate.append_items(items);
    }

    Ok(aggregate)
}
