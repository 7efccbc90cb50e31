//! HTTP implementation of [`DocumentApi`] on top of [`reqwest`].

use crate::api::DocumentApi;
use crate::error::{ErrorKind, Result};
use crate::models::{CreateShareLink, Document, DocumentId, DocumentListing, FileVersion, Page, ShareLink, Tag};
use async_trait::async_trait;
use exn::ResultExt;
use paperlink_config::BaseUrl;
use reqwest::header::{ACCEPT, AUTHORIZATION, HeaderValue};
use reqwest::{RequestBuilder, Response};
use serde::de::DeserializeOwned;
use std::time::Duration;
use tracing::instrument;
use url::Url;

/// Paperless wants an explicit API version to return tag colours as hex
/// strings instead of the legacy palette index.
const TAGS_ACCEPT: &str = "application/json; version=5";
/// Safety net for servers that keep handing out a `next` link.
const MAX_TAG_PAGES: u32 = 1000;

/// Authenticated Paperless API client.
///
/// Cheap to clone; the underlying connection pool is shared.
#[derive(Clone)]
pub struct Client {
    http: reqwest::Client,
    base: BaseUrl,
    authorization: HeaderValue,
}

impl Client {
    /// Builds a client for `base`, authenticating with `token`.
    ///
    /// `timeout` bounds every individual request; the library itself never
    /// imposes a wall-clock limit.
    pub fn new(base: BaseUrl, token: &str, timeout: Option<Duration>) -> Result<Self> {
        let mut authorization =
            HeaderValue::from_str(&format!("token {}", token.trim())).or_raise(|| ErrorKind::InvalidToken)?;
        authorization.set_sensitive(true);
        let mut builder = reqwest::Client::builder().user_agent(concat!("paperlink/", env!("CARGO_PKG_VERSION")));
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }
        let http = builder.build().or_raise(|| ErrorKind::Network)?;
        Ok(Self { http, base, authorization })
    }

    fn url(&self, path: &str) -> Result<Url> {
        self.base.join(path).or_raise(|| ErrorKind::Url)
    }

    /// Attaches credentials, sends, and turns non-success statuses into
    /// [`ErrorKind::Status`] carrying the response body.
    async fn send(&self, request: RequestBuilder) -> Result<Response> {
        let response = request
            .header(AUTHORIZATION, self.authorization.clone())
            .send()
            .await
            .or_raise(|| ErrorKind::Network)?;
        let status = response.status();
        if status.is_success() || status.is_redirection() {
            return Ok(response);
        }
        let url = response.url().clone();
        let body = response.text().await.unwrap_or_default();
        tracing::debug!(%url, status = status.as_u16(), %body, "Request rejected by server");
        exn::bail!(ErrorKind::Status { status: status.as_u16(), body })
    }

    async fn get_json<T: DeserializeOwned>(&self, path: &str) -> Result<T> {
        let url = self.url(path)?;
        tracing::trace!(%url, "GET");
        let response = self.send(self.http.get(url)).await?;
        response.json().await.or_raise(|| ErrorKind::Decode)
    }

    async fn get_bytes(&self, url: Url) -> Result<Vec<u8>> {
        tracing::trace!(%url, "GET");
        let response = self.send(self.http.get(url)).await?;
        let bytes = response.bytes().await.or_raise(|| ErrorKind::Network)?;
        Ok(bytes.to_vec())
    }
}

#[async_trait]
impl DocumentApi for Client {
    fn base_url(&self) -> &BaseUrl {
        &self.base
    }

    #[instrument(skip(self))]
    async fn list_documents(&self) -> Result<DocumentListing> {
        self.get_json("/api/documents/?format=json").await
    }

    #[instrument(skip(self))]
    async fn list_tags(&self) -> Result<Vec<Tag>> {
        let mut tags = Vec::new();
        for page in 1..=MAX_TAG_PAGES {
            let url = self.url(&format!("/api/tags/?format=json&page={page}"))?;
            let response = self.send(self.http.get(url).header(ACCEPT, TAGS_ACCEPT)).await?;
            let Page { next, results, .. } = response.json::<Page<Tag>>().await.or_raise(|| ErrorKind::Decode)?;
            let exhausted = results.is_empty();
            tags.extend(results);
            if next.is_none() || exhausted {
                return Ok(tags);
            }
        }
        tracing::warn!(pages = MAX_TAG_PAGES, "Tag listing never ended; keeping what was fetched");
        Ok(tags)
    }

    #[instrument(skip(self), fields(document = %id))]
    async fn document(&self, id: DocumentId) -> Result<Document> {
        self.get_json(&format!("/api/documents/{id}/?format=json")).await
    }

    #[instrument(skip(self), fields(document = %id))]
    async fn thumbnail(&self, id: DocumentId) -> Result<Vec<u8>> {
        self.get_bytes(self.url(&format!("/api/documents/{id}/thumb/"))?).await
    }

    #[instrument(skip(self), fields(document = %id))]
    async fn share_links(&self, id: DocumentId) -> Result<Vec<ShareLink>> {
        self.get_json(&format!("/api/documents/{id}/share_links/?format=json")).await
    }

    #[instrument(skip(self), fields(document = %id))]
    async fn create_share_link(&self, id: DocumentId) -> Result<()> {
        let body = CreateShareLink { document: id, file_version: FileVersion::Original };
        let url = self.url("/api/share_links/")?;
        self.send(self.http.post(url).json(&body)).await?;
        Ok(())
    }

    #[instrument(skip(self), fields(%url))]
    async fn download(&self, url: &Url) -> Result<Vec<u8>> {
        self.get_bytes(url.clone()).await
    }

    #[instrument(skip(self))]
    async fn ping(&self) -> Result<()> {
        let body: serde_json::Value = self.get_json("/api/documents/").await?;
        match body.get("results") {
            Some(_) => Ok(()),
            None => exn::bail!(ErrorKind::Decode),
        }
    }
}
