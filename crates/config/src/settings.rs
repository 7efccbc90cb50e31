use crate::error::{ErrorKind, Result};
use crate::base_url::BaseUrl;
use exn::ResultExt;
use figment::Figment;
use figment::providers::{Env, Format, Json, Serialized, Toml, Yaml};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::instrument;

/// Number of extra share-link checks performed after the initial post-create
/// check. Link creation is eventually consistent and usually shows up within
/// a handful of requests.
pub const DEFAULT_RETRIES: usize = 5;
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;
pub const ENV_PREFIX: &str = "PAPERLINK_";

/// What to insert into a note when no share link could be obtained.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum OnUnresolved {
    /// Insert nothing; the user is told the document could not be linked.
    Skip,
    /// Insert a plain link to the document's details page on the server.
    #[default]
    DetailsLink,
}

/// User settings. Never mutated by the library; reload to pick up changes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Full URL of the Paperless instance.
    pub url: String,
    /// API token, sent as `Authorization: token <value>`.
    pub token: String,
    /// Absolute path of the notes vault; the storage folder lives inside it.
    pub vault: Option<PathBuf>,
    /// Folder (relative to the vault) that downloaded documents are saved into.
    pub storage_path: PathBuf,
    /// Template for the text inserted into a note.
    pub link_template: Option<String>,
    pub unresolved: OnUnresolved,
    pub retries: usize,
    pub retry_interval_ms: u64,
    pub timeout_secs: u64,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            url: String::new(),
            token: String::new(),
            vault: None,
            storage_path: PathBuf::new(),
            link_template: None,
            unresolved: OnUnresolved::default(),
            retries: DEFAULT_RETRIES,
            retry_interval_ms: 0,
            timeout_secs: DEFAULT_TIMEOUT_SECS,
        }
    }
}

impl Settings {
    /// Loads settings from defaults, a configuration file and `PAPERLINK_*`
    /// environment variables (later sources win).
    ///
    /// When `path` is `None` the per-user configuration directory is checked
    /// for `config.toml`; a missing default file is not an error, a missing
    /// explicit one is.
    #[instrument(level = "debug")]
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let file = match path {
            Some(path) if !path.is_file() => exn::bail!(ErrorKind::NotFound(path.to_path_buf())),
            Some(path) => Some(path.to_path_buf()),
            None => default_path().filter(|p| p.is_file()),
        };
        let mut figment = Figment::from(Serialized::defaults(Settings::default()));
        if let Some(file) = file {
            tracing::debug!(path = %file.display(), "Merging configuration file");
            figment = merge_file(figment, &file);
        }
        figment.merge(Env::prefixed(ENV_PREFIX)).extract().or_raise(|| ErrorKind::Load)
    }

    /// Loads settings from a single file only, ignoring the environment.
    pub fn from_file(path: &Path) -> Result<Self> {
        if !path.is_file() {
            exn::bail!(ErrorKind::NotFound(path.to_path_buf()));
        }
        merge_file(Figment::from(Serialized::defaults(Settings::default())), path)
            .extract()
            .or_raise(|| ErrorKind::Load)
    }

    /// Validated server URL.
    pub fn base_url(&self) -> Result<BaseUrl> {
        BaseUrl::parse(&self.url)
    }

    /// Non-empty authentication token.
    pub fn token(&self) -> Result<&str> {
        match self.token.trim() {
            "" => exn::bail!(ErrorKind::MissingToken),
            token => Ok(token),
        }
    }

    /// Absolute vault root.
    pub fn vault(&self) -> Result<&Path> {
        match self.vault.as_deref() {
            Some(vault) if vault.is_absolute() => Ok(vault),
            other => exn::bail!(ErrorKind::InvalidVault(other.map(Path::to_path_buf))),
        }
    }

    pub fn retry_interval(&self) -> Duration {
        Duration::from_millis(self.retry_interval_ms)
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

/// `<config dir>/paperlink/config.toml` for the current user, if the platform
/// has a notion of one.
pub fn default_path() -> Option<PathBuf> {
    directories::ProjectDirs::from("", "", "paperlink").map(|dirs| dirs.config_dir().join("config.toml"))
}

fn merge_file(figment: Figment, path: &Path) -> Figment {
    match path.extension().and_then(|e| e.to_str()).map(str::to_ascii_lowercase).as_deref() {
        Some("yaml" | "yml") => figment.merge(Yaml::file(path)),
        Some("json") => figment.merge(Json::file(path)),
        // Anything else gets read as TOML, the documented default.
        _ => figment.merge(Toml::file(path)),
    }
}
