//! Paginated retrieval: drives a remote listing capability until every page is read.

use async_trait::async_trait;
use serde::Deserialize;

use crate::errors::AdsError;
use crate::selector::Selector;

/// One page of entities returned by a remote `get` call.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Page<R> {
    /// Entities on this page. A response without `entries` decodes as empty.
    #[serde(default = "Vec::new")]
    pub entries: Vec<R>,
    /// Server-side count of all entities matching the selector.
    #[serde(default)]
    pub total_num_entries: u64,
    /// Start index this page was requested at (not part of the wire response).
    #[serde(skip)]
    pub start_index: u64,
}

impl<R> Page<R> {
    pub fn new(entries: Vec<R>, total_num_entries: u64) -> Self {
        Self {
            entries,
            total_num_entries,
            start_index: 0,
        }
    }
}

/// Remote listing capability ("get(selector) -> Page").
#[async_trait]
pub trait ListingService<R>: Send + Sync {
    async fn get(&self, selector: &Selector) -> Result<Page<R>, AdsError>;
}

/// Retrieves every entity matching `selector`.
///
/// Non-paginated selectors issue exactly one call and return its entries verbatim.
/// Paginated selectors start at index 0 and advance by the selector's page size,
/// stopping on an empty page or once the cursor reaches the latest total-count hint.
///
/// Any remote failure aborts the fetch and discards what was accumulated so far.
pub async fn fetch_all<R, S>(service: &S, selector: &Selector) -> Result<Vec<R>, AdsError>
where
    S: ListingService<R> + ?Sized,
{
    selector.validate()?;

    if !selector.is_paginated() {
        let page = service.get(selector).await?;
        tracing::debug!("Fetched {} entities in a single call", page.entries.len());
        return Ok(page.entries);
    }

    let page_size = u64::from(selector.page_size());
    let mut results = Vec::new();
    let mut cursor: u64 = 0;

    loop {
        let paged = selector.with_paging(cursor);
        let page = service.get(&paged).await?;

        if page.entries.is_empty() {
            tracing::debug!("Empty page at start index {}, stopping", cursor);
            break;
        }

        let total = page.total_num_entries;
        tracing::debug!(
            "Fetched {} entities at start index {} (total hint {})",
            page.entries.len(),
            cursor,
            total
        );
        results.extend(page.entries);

        cursor += page_size;
        if cursor >= total {
            break;
        }
    }

    tracing::info!("Fetched {} entities across paginated calls", results.len());
    Ok(results)
}
