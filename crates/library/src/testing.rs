//! Scripted [`DocumentApi`] double for unit tests.

use async_trait::async_trait;
use paperlink_client::error::{ErrorKind, Result};
use paperlink_client::{Document, DocumentApi, DocumentId, DocumentListing, ShareLink, Tag};
use paperlink_config::BaseUrl;
use paperlink_storage::{BackendHandle, StorageBackend};
use std::collections::{HashMap, HashSet, VecDeque};
use std::path::PathBuf;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use url::Url;

pub(crate) const BASE: &str = "https://dms.example.com";

pub(crate) fn permanent(slug: &str) -> ShareLink {
    link(slug, None)
}

pub(crate) fn expiring(slug: &str) -> ShareLink {
    link(slug, Some("2030-01-01T00:00:00Z"))
}

fn link(slug: &str, expiration: Option<&str>) -> ShareLink {
    serde_json::from_value(serde_json::json!({
        "slug": slug,
        "expiration": expiration,
        "file_version": "original",
    }))
    .unwrap()
}

#[derive(Default)]
struct Counters {
    link_checks: AtomicUsize,
    creates: AtomicUsize,
    downloads: AtomicUsize,
    calls: AtomicUsize,
}

/// Replays queued share-link listings and records every call.
///
/// Once the queue of listings is exhausted every further listing is empty.
/// Clones share the script and the counters.
#[derive(Clone)]
pub(crate) struct ScriptedApi {
    base: BaseUrl,
    links: Arc<Mutex<VecDeque<Vec<ShareLink>>>>,
    create_fails: bool,
    links_fail: bool,
    offline: bool,
    listing: DocumentListing,
    tags: Vec<Tag>,
    documents: HashMap<DocumentId, Document>,
    broken: HashSet<DocumentId>,
    racer: Option<(BackendHandle, PathBuf, Vec<u8>)>,
    counters: Arc<Counters>,
}

impl ScriptedApi {
    pub(crate) fn new() -> Self {
        Self {
            base: BaseUrl::parse(BASE).unwrap(),
            links: Arc::default(),
            create_fails: false,
            links_fail: false,
            offline: false,
            listing: DocumentListing::default(),
            tags: Vec::new(),
            documents: HashMap::new(),
            broken: HashSet::new(),
            racer: None,
            counters: Arc::default(),
        }
    }

    pub(crate) fn with_links(self, script: impl IntoIterator<Item = Vec<ShareLink>>) -> Self {
        self.links.lock().unwrap().extend(script);
        self
    }

    pub(crate) fn failing_create(mut self) -> Self {
        self.create_fails = true;
        self
    }

    pub(crate) fn failing_links(mut self) -> Self {
        self.links_fail = true;
        self
    }

    /// `ping` fails as if the server could not be reached.
    pub(crate) fn offline(mut self) -> Self {
        self.offline = true;
        self
    }

    pub(crate) fn with_documents(mut self, ids: impl IntoIterator<Item = u64>) -> Self {
        for id in ids {
            let id = DocumentId::new(id);
            let document = serde_json::from_value(serde_json::json!({
                "id": id.get(),
                "title": format!("Document {id}"),
                "tags": [1, 2, 99],
            }))
            .unwrap();
            self.listing.all.push(id);
            self.documents.insert(id, document);
        }
        self.listing.count = self.listing.all.len() as u64;
        self
    }

    pub(crate) fn with_tags(mut self, names: &[(u64, &str)]) -> Self {
        self.tags = names
            .iter()
            .map(|(id, name)| serde_json::from_value(serde_json::json!({"id": id, "name": name})).unwrap())
            .collect();
        self
    }

    /// Thumbnail and metadata requests for `id` fail.
    pub(crate) fn with_broken(mut self, id: u64) -> Self {
        self.broken.insert(DocumentId::new(id));
        self
    }

    /// Another writer creates `path` in `backend` while a download is in
    /// flight.
    pub(crate) fn with_racing_writer(mut self, backend: BackendHandle, path: &str, bytes: &[u8]) -> Self {
        self.racer = Some((backend, PathBuf::from(path), bytes.to_vec()));
        self
    }

    pub(crate) fn link_checks(&self) -> usize {
        self.counters.link_checks.load(Ordering::SeqCst)
    }

    pub(crate) fn creates(&self) -> usize {
        self.counters.creates.load(Ordering::SeqCst)
    }

    pub(crate) fn downloads(&self) -> usize {
        self.counters.downloads.load(Ordering::SeqCst)
    }

    /// Total number of requests of any kind.
    pub(crate) fn calls(&self) -> usize {
        self.counters.calls.load(Ordering::SeqCst)
    }

    fn count(&self, counter: &AtomicUsize) {
        counter.fetch_add(1, Ordering::SeqCst);
        self.counters.calls.fetch_add(1, Ordering::SeqCst);
    }

    fn check_broken(&self, id: DocumentId) -> Result<()> {
        if self.broken.contains(&id) {
            exn::bail!(ErrorKind::Status { status: 500, body: "boom".to_string() });
        }
        Ok(())
    }
}

#[async_trait]
impl DocumentApi for ScriptedApi {
    fn base_url(&self) -> &BaseUrl {
        &self.base
    }

    async fn list_documents(&self) -> Result<DocumentListing> {
        self.counters.calls.fetch_add(1, Ordering::SeqCst);
        Ok(self.listing.clone())
    }

    async fn list_tags(&self) -> Result<Vec<Tag>> {
        self.counters.calls.fetch_add(1, Ordering::SeqCst);
        Ok(self.tags.clone())
    }

    async fn document(&self, id: DocumentId) -> Result<Document> {
        self.counters.calls.fetch_add(1, Ordering::SeqCst);
        self.check_broken(id)?;
        match self.documents.get(&id) {
            Some(document) => Ok(document.clone()),
            None => exn::bail!(ErrorKind::Status { status: 404, body: String::new() }),
        }
    }

    async fn thumbnail(&self, id: DocumentId) -> Result<Vec<u8>> {
        self.counters.calls.fetch_add(1, Ordering::SeqCst);
        self.check_broken(id)?;
        Ok(format!("thumb-{id}").into_bytes())
    }

    async fn share_links(&self, _id: DocumentId) -> Result<Vec<ShareLink>> {
        self.count(&self.counters.link_checks);
        if self.links_fail {
            exn::bail!(ErrorKind::Network);
        }
        Ok(self.links.lock().unwrap().pop_front().unwrap_or_default())
    }

    async fn create_share_link(&self, _id: DocumentId) -> Result<()> {
        self.count(&self.counters.creates);
        if self.create_fails {
            exn::bail!(ErrorKind::Status { status: 400, body: "{\"document\":[\"Invalid pk\"]}".to_string() });
        }
        Ok(())
    }

    async fn download(&self, url: &Url) -> Result<Vec<u8>> {
        self.count(&self.counters.downloads);
        if let Some((backend, path, bytes)) = &self.racer {
            backend.create(path, bytes).await.unwrap();
        }
        Ok(format!("%PDF-1.7 {url}").into_bytes())
    }

    async fn ping(&self) -> Result<()> {
        self.counters.calls.fetch_add(1, Ordering::SeqCst);
        if self.offline {
            exn::bail!(ErrorKind::Network);
        }
        Ok(())
    }
}

