//! Paged thumbnail browsing.
//!
//! Documents are shown newest-first (highest id first), [`PAGE_SIZE`] per
//! page. For one page, every thumbnail and every metadata request is issued
//! at once; results land in their entry's slot as they complete, and a
//! failing request only leaves its own slot empty.

use crate::listing::ListingCache;
use futures::StreamExt;
use futures::future::BoxFuture;
use futures::stream::FuturesUnordered;
use paperlink_client::{ApiHandle, Document, DocumentId, Tag};
use tracing::instrument;

pub const PAGE_SIZE: usize = 16;

/// One document in a browse page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BrowseEntry {
    pub id: DocumentId,
    /// `None` when the thumbnail request failed.
    pub thumbnail: Option<Vec<u8>>,
    /// `None` when the metadata request failed.
    pub document: Option<Document>,
    /// The document's tags that are present in the cached tag table.
    pub tags: Vec<Tag>,
}

impl BrowseEntry {
    fn new(id: DocumentId) -> Self {
        Self { id, thumbnail: None, document: None, tags: Vec::new() }
    }

    pub fn title(&self) -> Option<&str> {
        self.document.as_ref().map(|d| d.title.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BrowsePage {
    /// Zero-based page index.
    pub page: usize,
    pub pages: usize,
    pub total: usize,
    pub entries: Vec<BrowseEntry>,
}

/// All cached ids, highest first.
pub fn sorted_ids(listing: &ListingCache) -> Vec<DocumentId> {
    let mut ids = listing.documents().to_vec();
    ids.sort_unstable_by(|a, b| b.cmp(a));
    ids
}

/// Number of pages needed for `total` documents.
pub fn page_count(total: usize, page_size: usize) -> usize {
    total.div_ceil(page_size.max(1))
}

enum Fetched {
    Thumbnail(usize, Option<Vec<u8>>),
    Document(usize, Option<Document>),
}

/// Loads page `page` (zero-based) of the cached listing.
///
/// A page past the end is returned with no entries.
#[instrument(skip(api, listing), fields(generation = listing.generation()))]
pub async fn browse_page(api: &ApiHandle, listing: &ListingCache, page: usize, page_size: usize) -> BrowsePage {
    let page_size = page_size.max(1);
    let ids = sorted_ids(listing);
    let total = ids.len();
    let mut entries: Vec<BrowseEntry> =
        ids.into_iter().skip(page.saturating_mul(page_size)).take(page_size).map(BrowseEntry::new).collect();

    let mut pending: FuturesUnordered<BoxFuture<'_, Fetched>> = FuturesUnordered::new();
    for (slot, entry) in entries.iter().enumerate() {
        let id = entry.id;
        pending.push(Box::pin(async move {
            match api.thumbnail(id).await {
                Ok(bytes) => Fetched::Thumbnail(slot, Some(bytes)),
                Err(err) => {
                    tracing::warn!(?err, document = %id, "Thumbnail unavailable");
                    Fetched::Thumbnail(slot, None)
                },
            }
        }));
        pending.push(Box::pin(async move {
            match api.document(id).await {
                Ok(document) => Fetched::Document(slot, Some(document)),
                Err(err) => {
                    tracing::warn!(?err, document = %id, "Document metadata unavailable");
                    Fetched::Document(slot, None)
                },
            }
        }));
    }

    while let Some(fetched) = pending.next().await {
        match fetched {
            Fetched::Thumbnail(slot, thumbnail) => entries[slot].thumbnail = thumbnail,
            Fetched::Document(slot, document) => {
                let entry = &mut entries[slot];
                if let Some(document) = &document {
                    entry.tags = document.tags.iter().filter_map(|id| listing.tag(*id)).cloned().collect();
                }
                entry.document = document;
            },
        }
    }

    BrowsePage { page, pages: page_count(total, page_size), total, entries }
}
