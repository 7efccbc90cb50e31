//! Cached document and tag listings.

use crate::error::{ErrorKind, Result};
use crate::notify::Notifier;
use exn::ResultExt;
use paperlink_client::{ApiHandle, DocumentId, Tag};
use std::collections::HashMap;
use tracing::instrument;

/// Every document id plus the tag table, fetched together.
///
/// The cache never expires on its own. [`refresh`](Self::refresh) replaces
/// the whole generation at once, and only when both listings were fetched;
/// a failed refresh leaves the previous generation in place.
#[derive(Debug, Clone, Default)]
pub struct ListingCache {
    generation: u64,
    documents: Vec<DocumentId>,
    tags: HashMap<u64, Tag>,
}

impl ListingCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of successful refreshes so far; zero means never loaded.
    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn is_loaded(&self) -> bool {
        self.generation > 0
    }

    /// Document ids in server order.
    pub fn documents(&self) -> &[DocumentId] {
        &self.documents
    }

    pub fn tag(&self, id: u64) -> Option<&Tag> {
        self.tags.get(&id)
    }

    pub fn tag_count(&self) -> usize {
        self.tags.len()
    }

    /// Fetches both listings concurrently and swaps them in.
    ///
    /// Unless `silent`, the outcome is announced through `notifier`.
    #[instrument(skip_all, fields(generation = self.generation))]
    pub async fn refresh(&mut self, api: &ApiHandle, notifier: &dyn Notifier, silent: bool) -> Result<()> {
        let fetched = futures::try_join!(api.list_documents(), api.list_tags());
        let (listing, tags) = match fetched {
            Ok(fetched) => fetched,
            Err(err) => {
                tracing::warn!(?err, "Listing refresh failed; keeping previous generation");
                if !silent {
                    notifier.error("Could not refresh the document listing");
                }
                return Err(err).or_raise(|| ErrorKind::Api);
            },
        };

        self.documents = listing.all;
        self.tags = tags.into_iter().map(|tag| (tag.id, tag)).collect();
        self.generation += 1;
        tracing::info!(
            generation = self.generation,
            documents = self.documents.len(),
            tags = self.tags.len(),
            "Refreshed listing"
        );
        if !silent {
            notifier.info(&format!("Found {} documents and {} tags", self.documents.len(), self.tags.len()));
        }
        Ok(())
    }
}
