//! Share-link resolution.
//!
//! Paperless creates share links asynchronously: a successful `POST` does not
//! guarantee the new link is listed by the very next `GET`. Resolution
//! therefore looks for an existing permanent link, asks for one to be
//! created, then polls a bounded number of times.

use paperlink_client::{ApiHandle, DocumentId, ShareLink};
use paperlink_config::{DEFAULT_RETRIES, Settings};
use std::time::Duration;
use tracing::instrument;
use url::Url;

/// How hard [`resolve_share_link`] tries after asking for a new link.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Re-checks performed after the first post-create check.
    pub retries: usize,
    /// Pause between consecutive re-checks. Zero means back-to-back requests.
    pub interval: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self { retries: DEFAULT_RETRIES, interval: Duration::ZERO }
    }
}

impl RetryPolicy {
    pub fn new(retries: usize, interval: Duration) -> Self {
        Self { retries, interval }
    }

    pub fn from_settings(settings: &Settings) -> Self {
        Self::new(settings.retries, settings.retry_interval())
    }

    /// Upper bound on share-link checks made after the create request.
    pub fn max_checks(&self) -> usize {
        self.retries.saturating_add(1)
    }
}

/// A permanent share link together with its public download URL.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedLink {
    pub link: ShareLink,
    pub url: Url,
}

/// Finds or creates a non-expiring share link for `id`.
///
/// Makes at most one create request per call, followed by at most
/// [`RetryPolicy::max_checks`] look-ups. Transport errors along the way are
/// logged and treated as "not there yet"; `None` means the link never showed
/// up. Two concurrent calls for the same document may both create a link.
#[instrument(skip(api, policy), fields(document = %id))]
pub async fn resolve_share_link(api: &ApiHandle, id: DocumentId, policy: &RetryPolicy) -> Option<ResolvedLink> {
    if let Some(found) = find_permanent(api, id).await {
        tracing::debug!(slug = %found.link.slug, "Reusing existing share link");
        return Some(found);
    }

    match api.create_share_link(id).await {
        Ok(()) => tracing::debug!("Requested a new share link"),
        // The link may have been created anyway; keep polling.
        Err(err) => tracing::warn!(?err, "Share link creation failed"),
    }

    for attempt in 0..policy.max_checks() {
        if attempt > 0 && !policy.interval.is_zero() {
            tokio::time::sleep(policy.interval).await;
        }
        if let Some(found) = find_permanent(api, id).await {
            tracing::debug!(slug = %found.link.slug, attempt, "Share link became visible");
            return Some(found);
        }
    }

    tracing::info!(checks = policy.max_checks(), "Share link never became visible");
    None
}

/// First link without an expiration, in server order.
async fn find_permanent(api: &ApiHandle, id: DocumentId) -> Option<ResolvedLink> {
    let links = match api.share_links(id).await {
        Ok(links) => links,
        Err(err) => {
            tracing::warn!(?err, "Could not list share links");
            return None;
        },
    };
    let link = links.into_iter().find(ShareLink::is_permanent)?;
    match link.url(api.base_url()) {
        Ok(url) => Some(ResolvedLink { link, url }),
        Err(err) => {
            tracing::warn!(?err, slug = %link.slug, "Share link slug does not form a valid URL");
            None
        },
    }
}
