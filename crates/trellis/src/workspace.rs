//! Workspace layout: the `.trellis` directory, its configuration file, and
//! how commands find it from anywhere inside the tree.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::store::StoreBackend;

/// Directory holding workspace state, created by `trellis init`.
pub const TRELLIS_DIR: &str = ".trellis";

/// Configuration file inside [`TRELLIS_DIR`].
pub const CONFIG_FILE: &str = "config.yml";

/// Default data file inside [`TRELLIS_DIR`].
pub const DATA_FILE: &str = "tasks.jsonl";

/// Prefix used when `init` is not given one.
pub const DEFAULT_PREFIX: &str = "task";

const GITIGNORE_FILE: &str = ".gitignore";
const GITIGNORE_BODY: &str = "*.tmp\n";

const MIN_PREFIX_LENGTH: usize = 2;
const MAX_PREFIX_LENGTH: usize = 20;

/// How many parent directories workspace discovery will climb.
const MAX_TRAVERSAL_DEPTH: usize = 256;

/// Contents of `.trellis/config.yml`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorkspaceConfig {
    /// Prefix stamped into every generated id.
    #[serde(rename = "id-prefix")]
    pub id_prefix: String,
    /// Storage backend selection.
    #[serde(default)]
    pub storage: StorageConfig,
}

/// The `storage:` section of the configuration file.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    /// Backend name: `jsonl`, `memory`, or `sql`.
    pub backend: String,
    /// Data file (for `jsonl`) or connection string (for `sql`), relative
    /// paths resolved against the `.trellis` directory.
    #[serde(rename = "data-file")]
    pub data_file: String,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            backend: "jsonl".to_string(),
            data_file: DATA_FILE.to_string(),
        }
    }
}

impl WorkspaceConfig {
    /// A default configuration stamping ids with `prefix`.
    #[must_use]
    pub fn new(prefix: impl Into<String>) -> Self {
        Self {
            id_prefix: prefix.into(),
            storage: StorageConfig::default(),
        }
    }

    /// Reads the configuration from `trellis_dir`.
    pub fn load(trellis_dir: &Path) -> Result<Self> {
        let path = trellis_dir.join(CONFIG_FILE);
        let raw = std::fs::read_to_string(&path).map_err(|e| {
            Error::Config(format!("cannot read {}: {e}", path.display()))
        })?;
        let config: WorkspaceConfig = serde_yaml::from_str(&raw)
            .map_err(|e| Error::Config(format!("cannot parse {}: {e}", path.display())))?;
        validate_prefix(&config.id_prefix).map_err(Error::Config)?;
        Ok(config)
    }

    /// Writes the configuration into `trellis_dir`.
    pub fn save(&self, trellis_dir: &Path) -> Result<()> {
        let path = trellis_dir.join(CONFIG_FILE);
        let raw = serde_yaml::to_string(self)
            .map_err(|e| Error::Config(format!("cannot serialize configuration: {e}")))?;
        std::fs::write(&path, raw)?;
        Ok(())
    }

    /// Resolves the configured backend against `trellis_dir`.
    pub fn backend(&self, trellis_dir: &Path) -> Result<StoreBackend> {
        match self.storage.backend.as_str() {
            "jsonl" => Ok(StoreBackend::Jsonl(
                trellis_dir.join(&self.storage.data_file),
            )),
            "memory" => Ok(StoreBackend::Memory),
            "sql" => Ok(StoreBackend::Sql(self.storage.data_file.clone())),
            other => Err(Error::Config(format!(
                "unknown storage backend '{other}': expected jsonl, memory, or sql"
            ))),
        }
    }
}

/// Checks an id prefix: 2-20 ASCII alphanumerics, starting with a letter.
pub fn validate_prefix(prefix: &str) -> std::result::Result<(), String> {
    if prefix.len() < MIN_PREFIX_LENGTH || prefix.len() > MAX_PREFIX_LENGTH {
        return Err(format!(
            "prefix must be {MIN_PREFIX_LENGTH}-{MAX_PREFIX_LENGTH} characters"
        ));
    }
    if !prefix.chars().next().is_some_and(|c| c.is_ascii_alphabetic()) {
        return Err("prefix must start with a letter".to_string());
    }
    if !prefix.chars().all(|c| c.is_ascii_alphanumeric()) {
        return Err("prefix may contain only ASCII letters and digits".to_string());
    }
    Ok(())
}

/// Walks up from `start` looking for a directory containing [`TRELLIS_DIR`].
#[must_use]
pub fn find_workspace_root(start: &Path) -> Option<PathBuf> {
    let mut current = start;
    for _ in 0..MAX_TRAVERSAL_DEPTH {
        if current.join(TRELLIS_DIR).is_dir() {
            return Some(current.to_path_buf());
        }
        current = current.parent()?;
    }
    None
}

/// True when `dir` already contains an initialized workspace.
#[must_use]
pub fn is_initialized(dir: &Path) -> bool {
    dir.join(TRELLIS_DIR).join(CONFIG_FILE).is_file()
}

/// Outcome of [`init_workspace`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InitOutcome {
    /// A new workspace was created at the contained `.trellis` path.
    Created(PathBuf),
    /// The directory already held a workspace; nothing was touched.
    AlreadyInitialized(PathBuf),
}

/// Creates the `.trellis` directory, configuration, empty data file, and a
/// `.gitignore` covering atomic-write temp files.
pub fn init_workspace(base: &Path, prefix: &str) -> Result<InitOutcome> {
    validate_prefix(prefix).map_err(Error::Config)?;
    let trellis_dir = base.join(TRELLIS_DIR);
    if is_initialized(base) {
        return Ok(InitOutcome::AlreadyInitialized(trellis_dir));
    }
    std::fs::create_dir_all(&trellis_dir)?;
    WorkspaceConfig::new(prefix).save(&trellis_dir)?;
    let data_file = trellis_dir.join(DATA_FILE);
    if !data_file.exists() {
        std::fs::write(&data_file, "")?;
    }
    std::fs::write(trellis_dir.join(GITIGNORE_FILE), GITIGNORE_BODY)?;
    tracing::info!(dir = %trellis_dir.display(), prefix, "initialized workspace");
    Ok(InitOutcome::Created(trellis_dir))
}
