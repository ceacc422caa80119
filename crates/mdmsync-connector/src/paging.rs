//! Pagination drivers
//!
//! Two styles are supported:
//! - offset/rows against search endpoints that declare `totalCount` on the
//!   first page ([`collect_offset_pages`]);
//! - next-link walking against the secondary directory ([`collect_linked`]).
//!
//! Both skip failed pages instead of aborting and surface the tally in
//! [`Collected`].

use async_trait::async_trait;
use std::collections::HashSet;
use tracing::{debug, warn};

use crate::error::ConnectorResult;

/// One page of an offset-paginated search.
#[derive(Debug, Clone, PartialEq)]
pub struct Page<T> {
    pub records: Vec<T>,
    /// Total matches declared by the endpoint.
    pub total_count: u64,
    /// Offset the endpoint reports for this page.
    pub offset: u64,
}

/// One page of a link-paginated listing.
#[derive(Debug, Clone, PartialEq)]
pub struct LinkPage<T> {
    pub records: Vec<T>,
    /// Absolute URL of the following page, if any.
    pub next: Option<String>,
}

/// A search whose filters are fixed and only `start`/`rows` vary.
#[async_trait]
pub trait OffsetPageSource: Send + Sync {
    type Record: Send;

    /// Fetch one page.
    async fn fetch_page(&self, start: u64, rows: u32) -> ConnectorResult<Page<Self::Record>>;

    /// Label for log lines.
    fn describe(&self) -> String;
}

/// A listing walked by following `next` links.
#[async_trait]
pub trait LinkPageSource: Send + Sync {
    type Record: Send;

    /// Fetch the page at `url`, or the first page when `url` is `None`.
    async fn fetch_link_page(&self, url: Option<&str>) -> ConnectorResult<LinkPage<Self::Record>>;
}

/// Records gathered by a pagination walk plus what went missing.
#[derive(Debug, Clone, PartialEq)]
pub struct Collected<T> {
    pub records: Vec<T>,
    /// Count declared on the first page; `None` for link pagination or when
    /// the first page itself failed.
    pub declared_total: Option<u64>,
    /// Pages that returned an error and were skipped.
    pub failed_pages: u32,
}

impl<T> Default for Collected<T> {
    fn default() -> Self {
        Self {
            records: Vec::new(),
            declared_total: None,
            failed_pages: 0,
        }
    }
}

impl<T> Collected<T> {
    /// Declared minus collected (zero when nothing was declared).
    pub fn discrepancy(&self) -> u64 {
        self.declared_total
            .map_or(0, |total| total.saturating_sub(self.records.len() as u64))
    }

    /// True when every page was fetched.
    pub fn is_complete(&self) -> bool {
        self.failed_pages == 0
    }

    /// Transform each record, keeping the tallies.
    pub fn map<U>(self, f: impl FnMut(T) -> U) -> Collected<U> {
        Collected {
            records: self.records.into_iter().map(f).collect(),
            declared_total: self.declared_total,
            failed_pages: self.failed_pages,
        }
    }

    /// Fold another walk's results into this one.
    pub fn absorb(&mut self, other: Collected<T>) {
        self.records.extend(other.records);
        self.failed_pages += other.failed_pages;
        if let Some(total) = other.declared_total {
            self.declared_total = Some(self.declared_total.unwrap_or(0) + total);
        }
    }
}

/// Number of pages needed for `total` records at `page_size` per page.
pub fn page_count(total: u64, page_size: u32) -> u64 {
    if page_size == 0 {
        return 0;
    }
    total.div_ceil(u64::from(page_size))
}

/// Fetch every page of an offset-paginated search, in increasing offset order.
///
/// Page 0 supplies `totalCount` and the base offset; page `i` is requested at
/// `offset + i * page_size`. A page that fails is logged, counted and skipped.
/// If page 0 fails nothing is known about the total and the walk ends there.
pub async fn collect_offset_pages<S>(source: &S, page_size: u32) -> Collected<S::Record>
where
    S: OffsetPageSource + ?Sized,
{
    let label = source.describe();
    let mut collected = Collected::default();

    let first = match source.fetch_page(0, page_size).await {
        Ok(page) => page,
        Err(e) => {
            warn!(query = %label, start = 0, error = %e, "First page failed, nothing collected");
            collected.failed_pages = 1;
            return collected;
        }
    };

    let total = first.total_count;
    let base_offset = first.offset;
    let pages = page_count(total, page_size);

    debug!(query = %label, total = total, pages = pages, "Collecting pages");

    collected.declared_total = Some(total);
    collected.records = first.records;

    for index in 1..pages {
        let start = base_offset + index * u64::from(page_size);
        match source.fetch_page(start, page_size).await {
            Ok(page) => {
                debug!(query = %label, start = start, rows = page.records.len(), "Fetched page");
                collected.records.extend(page.records);
            }
            Err(e) => {
                warn!(query = %label, start = start, error = %e, "Page failed, skipping");
                collected.failed_pages += 1;
            }
        }
    }

    if collected.discrepancy() > 0 {
        warn!(
            query = %label,
            declared = total,
            collected = collected.records.len(),
            failed_pages = collected.failed_pages,
            "Collected fewer records than declared"
        );
    }

    collected
}

/// Follow `next` links until a page has none.
///
/// A failed page ends the walk (there is no link to continue from) and is
/// counted. A link that was already visited also ends it.
pub async fn collect_linked<S>(source: &S) -> Collected<S::Record>
where
    S: LinkPageSource + ?Sized,
{
    let mut collected = Collected::default();
    let mut visited: HashSet<String> = HashSet::new();
    let mut next: Option<String> = None;

    loop {
        let page = match source.fetch_link_page(next.as_deref()).await {
            Ok(page) => page,
            Err(e) => {
                warn!(url = ?next, error = %e, "Linked page failed, stopping walk");
                collected.failed_pages += 1;
                break;
            }
        };

        debug!(url = ?next, rows = page.records.len(), "Fetched linked page");
        collected.records.extend(page.records);

        match page.next.filter(|link| !link.trim().is_empty()) {
            Some(link) => {
                if !visited.insert(link.clone()) {
                    warn!(url = %link, "Next link repeats a visited page, stopping walk");
                    break;
                }
                next = Some(link);
            }
            None => break,
        }
    }

    collected
}
