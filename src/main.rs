mod cli;

use crate::cli::{Cli, Command};
use clap::Parser;
use exn::ResultExt;
use paperlink_client::{ApiHandle, Client, DocumentId};
use paperlink_config::Settings;
use paperlink_library::Context;
use paperlink_library::actions::{Editor, test_connection};
use paperlink_library::browse::{PAGE_SIZE, browse_page};
use paperlink_library::error::{ErrorKind, Result};
use paperlink_library::listing::ListingCache;
use paperlink_library::materialize::{Materialized, materialize};
use paperlink_library::notify::{Level, Notifier, NotifierHandle};
use paperlink_library::resolve::resolve_share_link;
use paperlink_library::surface::{Buffer, Position};
use paperlink_storage::backend::{LocalBackend, StorageBackend};
use paperlink_storage::error::ErrorKind as StorageErrorKind;
use paperlink_storage::BackendHandle;
use std::ops::Deref;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

/// Prints notifications on stderr so stdout stays machine-readable.
struct ConsoleNotifier;

impl Notifier for ConsoleNotifier {
    fn notify(&self, level: Level, message: &str) {
        match level {
            Level::Info => eprintln!("{message}"),
            level => eprintln!("{level}: {message}"),
        }
    }
}

/// What every command needs once settings have been validated.
struct Session {
    api: ApiHandle,
    notifier: NotifierHandle,
    ctx: Context,
}

/// The vault, for commands that write into it.
struct Storage {
    vault: PathBuf,
    backend: BackendHandle,
}

impl Session {
    /// Validates the server settings and builds the client.
    ///
    /// Every configuration problem is reported before any request is made.
    fn open(settings: &Settings, notifier: NotifierHandle) -> Result<Self> {
        let configured = |message: String| {
            notifier.error(&message);
            ErrorKind::Configuration
        };
        let base = settings.base_url().or_raise(|| configured(format!("Invalid server URL {:?}", settings.url)))?;
        let token = settings.token().or_raise(|| configured("No API token configured".to_string()))?;
        let ctx = Context::from_settings(settings).inspect_err(|err| {
            notifier.error(&format!("Invalid settings: {}", err.deref()));
        })?;
        let client = Client::new(base, token, Some(settings.timeout()))
            .or_raise(|| configured("The API token contains characters that cannot be sent".to_string()))?;
        Ok(Self { api: Arc::new(client), notifier, ctx })
    }

    /// Validates the vault setting and opens the vault.
    fn storage(&self, settings: &Settings) -> Result<Storage> {
        let vault = settings.vault().or_raise(|| {
            self.notifier.error("The vault must be an absolute path");
            ErrorKind::Configuration
        })?;
        let backend = LocalBackend::new("vault", vault).or_raise(|| ErrorKind::Storage)?;
        Ok(Storage { vault: vault.to_path_buf(), backend: Arc::new(backend) })
    }

    fn editor(self, storage: Storage) -> Editor {
        Editor::new(self.api, storage.backend, self.notifier, self.ctx)
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    let filter = match cli.log_directive() {
        Some(directive) => EnvFilter::new(directive),
        None => EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
    };
    tracing_subscriber::fmt().with_env_filter(filter).with_writer(std::io::stderr).init();

    let notifier: NotifierHandle = Arc::new(ConsoleNotifier);
    match run(cli, notifier).await {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => ExitCode::FAILURE,
        Err(err) => {
            tracing::error!(?err, "Command failed");
            eprintln!("error: {}", err.deref());
            ExitCode::FAILURE
        },
    }
}

/// Runs one command; `Ok(false)` means it completed without achieving its goal.
async fn run(cli: Cli, notifier: NotifierHandle) -> Result<bool> {
    let settings = Settings::load(cli.config.as_deref()).inspect_err(|err| {
        notifier.error(&format!("Could not load settings: {}", err.deref()));
    });
    let settings = settings.or_raise(|| ErrorKind::Configuration)?;
    let session = Session::open(&settings, notifier)?;

    match cli.command {
        Command::Resolve { id } => {
            let id = DocumentId::new(id);
            match resolve_share_link(&session.api, id, &session.ctx.retry).await {
                Some(resolved) => {
                    println!("{}", resolved.url);
                    Ok(true)
                },
                None => {
                    session.notifier.warn(&format!("No share link became available for document {id}"));
                    Ok(false)
                },
            }
        },
        Command::Fetch { id } => {
            let id = DocumentId::new(id);
            let storage = session.storage(&settings)?;
            let outcome = materialize(&session.api, &storage.backend, &session.ctx, id).await?;
            match &outcome {
                Materialized::Existing(reference) | Materialized::Downloaded(reference, _) => {
                    println!("{}", storage.vault.join(&reference.path).display());
                    Ok(true)
                },
                Materialized::Unresolved => {
                    session.notifier.warn(&format!("Could not get a share link for document {id}"));
                    Ok(false)
                },
            }
        },
        Command::Insert { note, line, column, id } => {
            let storage = session.storage(&settings)?;
            insert(session.editor(storage), &note, line, column, id).await
        },
        Command::Refresh => {
            ListingCache::new().refresh(&session.api, session.notifier.as_ref(), false).await?;
            Ok(true)
        },
        Command::Browse { page, thumbnails } => browse(session, page, thumbnails.as_deref()).await,
        Command::Test => Ok(test_connection(&session.api, session.notifier.as_ref()).await),
    }
}

async fn insert(editor: Editor, note: &Path, line: usize, column: usize, id: Option<u64>) -> Result<bool> {
    let text = tokio::fs::read_to_string(note).await.or_raise(|| ErrorKind::Storage)?;
    let cursor = Position::new(line.saturating_sub(1), column.saturating_sub(1));
    let mut buffer = Buffer::new(text).with_cursor(cursor);

    let inserted = match id {
        Some(id) => editor.insert_document(&mut buffer, DocumentId::new(id)).await?.text.is_some(),
        None => editor.replace_reference(&mut buffer).await?.is_some_and(|insertion| insertion.text.is_some()),
    };
    if inserted {
        tokio::fs::write(note, buffer.text()).await.or_raise(|| ErrorKind::Storage)?;
    }
    Ok(inserted)
}

async fn browse(session: Session, page: usize, thumbnails: Option<&Path>) -> Result<bool> {
    let mut listing = ListingCache::new();
    listing.refresh(&session.api, session.notifier.as_ref(), true).await?;
    let view = browse_page(&session.api, &listing, page.saturating_sub(1), PAGE_SIZE).await;

    println!("Page {} of {} ({} documents)", view.page + 1, view.pages.max(1), view.total);
    for entry in &view.entries {
        let tags: Vec<&str> = entry.tags.iter().map(|t| t.name.as_str()).collect();
        println!("{:>8}  {}  [{}]", entry.id.get(), entry.title().unwrap_or("?"), tags.join(", "));
    }

    if let Some(folder) = thumbnails {
        let folder = std::path::absolute(folder).or_raise(|| ErrorKind::Storage)?;
        let store = LocalBackend::new("thumbnails", &folder).or_raise(|| ErrorKind::Storage)?;
        for entry in &view.entries {
            let Some(bytes) = &entry.thumbnail else { continue };
            let name = format!("paperless-{}.{}", entry.id, thumbnail_extension(bytes));
            match store.create(Path::new(&name), bytes).await {
                Ok(()) => {},
                Err(e) if matches!(e.deref(), StorageErrorKind::AlreadyExists(_)) => {},
                Err(e) => return Err(e).or_raise(|| ErrorKind::Storage),
            }
        }
        session.notifier.info(&format!("Saved thumbnails to {}", folder.display()));
    }
    Ok(true)
}

/// Paperless serves WebP thumbnails; older versions served PNG.
fn thumbnail_extension(bytes: &[u8]) -> &'static str {
    match bytes {
        [b'R', b'I', b'F', b'F', _, _, _, _, b'W', b'E', b'B', b'P', ..] => "webp",
        [0x89, b'P', b'N', b'G', ..] => "png",
        [0xFF, 0xD8, ..] => "jpg",
        _ => "bin",
    }
}
