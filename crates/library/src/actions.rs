//! Editor commands.
//!
//! Each action runs the pipeline for one user request and writes into a
//! [`TextSurface`]. Problems the user can act on are reported through the
//! [`Notifier`](crate::notify::Notifier); the returned error (if any) is for
//! logging.

use crate::Context;
use crate::error::{ErrorKind, Result};
use crate::listing::ListingCache;
use crate::materialize::{Materialized, materialize};
use crate::notify::{Notifier, NotifierHandle};
use crate::reference::{ReferencePattern, word_at_cursor};
use crate::surface::{Position, Range, TextSurface};
use crate::template::LinkVars;
use exn::ResultExt;
use paperlink_client::{ApiHandle, DocumentId};
use paperlink_config::OnUnresolved;
use paperlink_storage::BackendHandle;
use tracing::instrument;

/// What an insert did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Insertion {
    pub id: DocumentId,
    pub outcome: Materialized,
    /// Text written into the surface; `None` when nothing was inserted.
    pub text: Option<String>,
}

/// Everything the actions need, bundled once per session.
pub struct Editor {
    api: ApiHandle,
    backend: BackendHandle,
    notifier: NotifierHandle,
    ctx: Context,
}

impl Editor {
    pub fn new(api: ApiHandle, backend: BackendHandle, notifier: NotifierHandle, ctx: Context) -> Self {
        Self { api, backend, notifier, ctx }
    }

    pub fn context(&self) -> &Context {
        &self.ctx
    }

    /// Saves document `id` locally and replaces the selection with a link
    /// to it.
    #[instrument(skip(self, surface), fields(document = %id))]
    pub async fn insert_document(&self, surface: &mut dyn TextSurface, id: DocumentId) -> Result<Insertion> {
        let range = surface.selection_range();
        self.insert_into(surface, id, range).await
    }

    /// Replaces a Paperless URL in the note with a link to the saved
    /// document.
    ///
    /// The URL is taken from the selection, or from the word under the cursor
    /// when nothing is selected. Returns `None` when no document URL is
    /// there.
    #[instrument(skip_all)]
    pub async fn replace_reference(&self, surface: &mut dyn TextSurface) -> Result<Option<Insertion>> {
        let (text, range) = match surface.selection() {
            selection if !selection.is_empty() => (selection, surface.selection_range()),
            _ => {
                let cursor = surface.cursor();
                let line = surface.line(cursor.line).unwrap_or_default();
                match word_at_cursor(&line, cursor.ch) {
                    Some(word) => (
                        word.text,
                        Range::new(Position::new(cursor.line, word.start), Position::new(cursor.line, word.end)),
                    ),
                    None => (String::new(), Range::caret(cursor)),
                }
            },
        };

        let pattern = ReferencePattern::new(self.api.base_url())?;
        let Some(id) = pattern.extract(&text) else {
            tracing::debug!(%text, "No document URL under cursor");
            self.notifier.warn("No Paperless document URL found at the cursor");
            return Ok(None);
        };
        self.insert_into(surface, id, range).await.map(Some)
    }

    /// Checks that the configured server answers with the configured token.
    pub async fn test_connection(&self) -> bool {
        test_connection(&self.api, self.notifier.as_ref()).await
    }

    /// Reloads the document listing and announces the result.
    pub async fn refresh(&self, listing: &mut ListingCache) -> Result<()> {
        listing.refresh(&self.api, self.notifier.as_ref(), false).await
    }

    async fn insert_into(&self, surface: &mut dyn TextSurface, id: DocumentId, range: Range) -> Result<Insertion> {
        let outcome = match materialize(&self.api, &self.backend, &self.ctx, id).await {
            Ok(outcome) => outcome,
            Err(err) => {
                self.notifier.error(&format!("Could not save document {id}"));
                return Err(err);
            },
        };
        let text = self.link_text(id, &outcome)?;
        if let Some(text) = &text {
            surface.replace_range(text, range);
        }
        Ok(Insertion { id, outcome, text })
    }

    /// Renders the text for an outcome, honouring the unresolved policy.
    fn link_text(&self, id: DocumentId, outcome: &Materialized) -> Result<Option<String>> {
        let details = id.details_url(self.api.base_url()).or_raise(|| ErrorKind::Configuration)?;
        let template = match outcome.reference() {
            Some(_) => &self.ctx.template,
            None => match self.ctx.unresolved {
                OnUnresolved::Skip => {
                    self.notifier.warn(&format!("Could not get a share link for document {id}; nothing inserted"));
                    return Ok(None);
                },
                OnUnresolved::DetailsLink => {
                    self.notifier.warn(&format!("Could not get a share link for document {id}; linking to it instead"));
                    &self.ctx.fallback
                },
            },
        };
        let vars = LinkVars {
            id: id.to_string(),
            filename: outcome.reference().map(|r| r.filename.clone()).unwrap_or_default(),
            path: outcome.reference().map(|r| r.link_path()).unwrap_or_default(),
            url: outcome.link().map(|l| l.url.to_string()).unwrap_or_default(),
            details,
        };
        template.render(&vars).map(Some)
    }
}

/// Pings the server behind `api` and reports the result.
#[instrument(skip_all, fields(server = %api.base_url()))]
pub async fn test_connection(api: &ApiHandle, notifier: &dyn Notifier) -> bool {
    notifier.info(&format!("Testing connection to {}", api.base_url()));
    match api.ping().await {
        Ok(()) => {
            notifier.info("Successfully connected to Paperless");
            true
        },
        Err(err) => {
            tracing::warn!(?err, "Connection test failed");
            let message = match err.status() {
                Some(status) => format!("Paperless rejected the request (HTTP {status}); check the URL and token"),
                None => format!("Could not reach Paperless at {}; check the URL", api.base_url()),
            };
            notifier.error(&message);
            false
        },
    }
}
