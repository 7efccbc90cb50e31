use crate::error::Result;
use crate::models::{Document, DocumentId, DocumentListing, ShareLink, Tag};
use async_trait::async_trait;
use paperlink_config::BaseUrl;
use std::sync::Arc;
use url::Url;

pub type ApiHandle = Arc<dyn DocumentApi + Send + Sync>;

/// Everything the editor needs from a Paperless server.
///
/// [`Client`](crate::Client) is the real implementation; tests drive the
/// resolver and materializer with scripted doubles instead.
#[async_trait]
pub trait DocumentApi: Send + Sync {
    /// Root of the server, used to build share and details URLs.
    fn base_url(&self) -> &BaseUrl;

    /// Ids of every document visible to the token.
    async fn list_documents(&self) -> Result<DocumentListing>;

    /// Every tag, across all result pages.
    async fn list_tags(&self) -> Result<Vec<Tag>>;

    /// Metadata for one document.
    async fn document(&self, id: DocumentId) -> Result<Document>;

    /// Thumbnail image bytes (WebP or PNG, depending on server version).
    async fn thumbnail(&self, id: DocumentId) -> Result<Vec<u8>>;

    /// Existing share links for a document, in server order.
    async fn share_links(&self, id: DocumentId) -> Result<Vec<ShareLink>>;

    /// Asks the server to create a non-expiring share link of the original
    /// file. Success here does not mean the link is visible yet.
    async fn create_share_link(&self, id: DocumentId) -> Result<()>;

    /// Fetches the bytes behind an absolute URL (a share link).
    async fn download(&self, url: &Url) -> Result<Vec<u8>>;

    /// Cheap authenticated request used to check URL and token.
    async fn ping(&self) -> Result<()>;
}
