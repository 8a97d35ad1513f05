//! Workspace configuration stored in `.tdg/config.yaml`.
//!
//! `tdg init` creates the `.tdg/` directory; every other command discovers it
//! by walking up from the working directory. The file holds the Trello
//! endpoint and credentials, engine switches, and the last selection so the
//! next invocation can refresh without re-selecting.

use crate::error::{Error, Result};
use crate::session::Selection;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tdg_trello::{ClientConfig, DEFAULT_BASE_URL, DEFAULT_TIMEOUT};
use tokio::fs;

/// Name of the tdg directory
pub const TDG_DIR_NAME: &str = ".tdg";

/// Name of the configuration file
pub const CONFIG_FILE_NAME: &str = "config.yaml";

/// Name of the gitignore file within .tdg
pub const GITIGNORE_FILE_NAME: &str = ".gitignore";

/// Environment variable overriding `api.key`
pub const API_KEY_ENV: &str = "TRELLO_API_KEY";

/// Environment variable overriding `api.token`
pub const TOKEN_ENV: &str = "TRELLO_TOKEN";

/// Maximum directory depth to traverse when searching for the tdg root
pub const MAX_TRAVERSAL_DEPTH: usize = 256;

/// Contents of `.tdg/config.yaml`.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "kebab-case")]
pub struct TdgConfig {
    /// Remote endpoint and credentials
    #[serde(default)]
    pub api: ApiConfig,

    /// Engine switches
    #[serde(default)]
    pub sync: SyncConfig,

    /// Last chosen board and filter
    #[serde(default)]
    pub selection: Selection,
}

/// `api` section
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "kebab-case")]
pub struct ApiConfig {
    /// REST root
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Application key
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub key: Option<String>,

    /// Member token
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub token: Option<String>,

    /// Per-request timeout in seconds
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

fn default_base_url() -> String {
    DEFAULT_BASE_URL.to_string()
}

fn default_timeout_secs() -> u64 {
    DEFAULT_TIMEOUT.as_secs()
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            key: None,
            token: None,
            timeout_secs: default_timeout_secs(),
        }
    }
}

/// `sync` section
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "kebab-case")]
pub struct SyncConfig {
    /// Share concurrent checklist lookups for the same card
    #[serde(default)]
    pub single_flight_checklists: bool,
}

impl TdgConfig {
    /// Load configuration from a file
    pub async fn load(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path).await?;
        serde_yaml::from_str(&content).map_err(|e| Error::Config(e.to_string()))
    }

    /// Save configuration to a file
    pub async fn save(&self, path: &Path) -> Result<()> {
        let content =
            serde_yaml::to_string(self).map_err(|e| Error::Config(format!("YAML error: {e}")))?;
        fs::write(path, content).await?;
        Ok(())
    }

    /// Replace the file credentials with the given overrides where present.
    pub fn with_credential_overrides(mut self, key: Option<String>, token: Option<String>) -> Self {
        if let Some(key) = key.filter(|k| !k.is_empty()) {
            self.api.key = Some(key);
        }
        if let Some(token) = token.filter(|t| !t.is_empty()) {
            self.api.token = Some(token);
        }
        self
    }

    /// Apply `TRELLO_API_KEY` and `TRELLO_TOKEN` from the environment.
    pub fn with_env_overrides(self) -> Self {
        self.with_credential_overrides(std::env::var(API_KEY_ENV).ok(), std::env::var(TOKEN_ENV).ok())
    }

    /// Client settings for [`tdg_trello::HttpTrelloClient`].
    ///
    /// Missing credentials are passed through empty; the client rejects them
    /// when it is built.
    pub fn client_config(&self) -> ClientConfig {
        ClientConfig {
            base_url: self.api.base_url.clone(),
            api_key: self.api.key.clone().unwrap_or_default(),
            token: self.api.token.clone().unwrap_or_default(),
            timeout: Duration::from_secs(self.api.timeout_secs),
        }
    }

    /// Store `selection` in the config file at `path`, keeping the rest of
    /// the file as it is on disk.
    ///
    /// Credentials coming from the environment are not written back.
    pub async fn remember_selection(path: &Path, selection: &Selection) -> Result<()> {
        let mut on_disk = Self::load(path).await?;
        on_disk.selection = selection.clone();
        on_disk.save(path).await
    }
}

/// Result of the init command
#[derive(Debug)]
pub struct InitResult {
    /// Path to the created tdg directory
    pub tdg_dir: PathBuf,
    /// Path to the created config file
    pub config_file: PathBuf,
    /// Path to the created gitignore file
    pub gitignore_file: PathBuf,
}

/// Initialize a new tdg workspace in the given directory.
///
/// # Errors
///
/// Returns an error if:
/// - The `.tdg/` directory already exists
/// - File system operations fail
pub async fn init(base_dir: &Path, config: &TdgConfig) -> Result<InitResult> {
    let tdg_dir = base_dir.join(TDG_DIR_NAME);

    if tdg_dir.exists() {
        return Err(Error::Config(format!(
            "tdg is already initialized in this directory. Found existing '{TDG_DIR_NAME}'"
        )));
    }

    fs::create_dir_all(&tdg_dir).await?;

    let config_file = tdg_dir.join(CONFIG_FILE_NAME);
    config.save(&config_file).await?;

    // The config may carry a member token.
    let gitignore_file = tdg_dir.join(GITIGNORE_FILE_NAME);
    let gitignore_content = format!(
        "\
# Holds Trello credentials and per-user selection
{CONFIG_FILE_NAME}
"
    );
    fs::write(&gitignore_file, gitignore_content).await?;

    Ok(InitResult {
        tdg_dir,
        config_file,
        gitignore_file,
    })
}

/// Find the directory containing `.tdg/` by searching up the directory tree.
///
/// Returns `None` if no workspace is found before the filesystem root or the
/// maximum traversal depth.
pub fn find_tdg_root(start_dir: &Path) -> Option<PathBuf> {
    let mut current = start_dir.to_path_buf();
    let mut depth = 0;

    loop {
        if current.join(TDG_DIR_NAME).exists() {
            return Some(current);
        }

        depth += 1;
        if depth > MAX_TRAVERSAL_DEPTH || !current.pop() {
            return None;
        }
    }
}

/// Path of the config file for a workspace root.
pub fn config_path(root: &Path) -> PathBuf {
    root.join(TDG_DIR_NAME).join(CONFIG_FILE_NAME)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_init_creates_config_and_gitignore() {
        let temp_dir = TempDir::new().unwrap();

        let result = init(temp_dir.path(), &TdgConfig::default()).await.unwrap();

        assert!(result.tdg_dir.is_dir());
        let loaded = TdgConfig::load(&result.config_file).await.unwrap();
        assert_eq!(loaded, TdgConfig::default());
        let gitignore = std::fs::read_to_string(&result.gitignore_file).unwrap();
        assert!(gitignore.lines().any(|line| line == CONFIG_FILE_NAME));
    }

    #[tokio::test]
    async fn test_init_twice_fails() {
        let temp_dir = TempDir::new().unwrap();
        init(temp_dir.path(), &TdgConfig::default()).await.unwrap();

        let result = init(temp_dir.path(), &TdgConfig::default()).await;

        assert!(matches!(result, Err(Error::Config(msg)) if msg.contains("already initialized")));
    }

    #[tokio::test]
    async fn test_find_root_from_nested_directory() {
        let temp_dir = TempDir::new().unwrap();
        init(temp_dir.path(), &TdgConfig::default()).await.unwrap();
        let nested = temp_dir.path().join("a").join("b");
        std::fs::create_dir_all(&nested).unwrap();

        assert_eq!(find_tdg_root(&nested), Some(temp_dir.path().to_path_buf()));
    }

    #[test]
    fn test_find_root_without_workspace() {
        let temp_dir = TempDir::new().unwrap();
        assert_eq!(find_tdg_root(temp_dir.path()), None);
    }

    #[test]
    fn test_parse_kebab_case_file() {
        let yaml = "\
api:
  base-url: http://localhost:9000/1
  key: k
  token: t
sync:
  single-flight-checklists: true
selection:
  board: b1
  label: urgent
";
        let config: TdgConfig = serde_yaml::from_str(yaml).unwrap();

        assert_eq!(config.api.base_url, "http://localhost:9000/1");
        assert_eq!(config.api.timeout_secs, DEFAULT_TIMEOUT.as_secs());
        assert!(config.sync.single_flight_checklists);
        assert_eq!(config.selection.label.as_deref(), Some("urgent"));
        assert_eq!(config.selection.list, None);
    }

    #[test]
    fn test_empty_file_uses_defaults() {
        let config: TdgConfig = serde_yaml::from_str("{}").unwrap();
        assert_eq!(config, TdgConfig::default());
        assert_eq!(config.api.base_url, DEFAULT_BASE_URL);
    }

    #[rstest]
    #[case::override_both(Some("ek"), Some("et"), Some("ek"), Some("et"))]
    #[case::keep_file_values(None, None, Some("fk"), Some("ft"))]
    #[case::empty_env_ignored(Some(""), Some("et"), Some("fk"), Some("et"))]
    fn test_credential_overrides(
        #[case] env_key: Option<&str>,
        #[case] env_token: Option<&str>,
        #[case] expected_key: Option<&str>,
        #[case] expected_token: Option<&str>,
    ) {
        let mut config = TdgConfig::default();
        config.api.key = Some("fk".to_string());
        config.api.token = Some("ft".to_string());

        let config = config.with_credential_overrides(
            env_key.map(str::to_string),
            env_token.map(str::to_string),
        );

        assert_eq!(config.api.key.as_deref(), expected_key);
        assert_eq!(config.api.token.as_deref(), expected_token);
    }

    #[test]
    fn test_client_config_passes_missing_credentials_through_empty() {
        let client = TdgConfig::default().client_config();
        assert!(client.api_key.is_empty());
        assert!(client.token.is_empty());
        assert_eq!(client.timeout, DEFAULT_TIMEOUT);
    }

    #[tokio::test]
    async fn test_remember_selection_keeps_other_sections() {
        let temp_dir = TempDir::new().unwrap();
        let mut config = TdgConfig::default();
        config.api.key = Some("file-key".to_string());
        config.sync.single_flight_checklists = true;
        let result = init(temp_dir.path(), &config).await.unwrap();

        let selection = Selection {
            board: Some("b1".to_string()),
            list: Some("l1".to_string()),
            label: None,
        };
        TdgConfig::remember_selection(&result.config_file, &selection)
            .await
            .unwrap();

        let loaded = TdgConfig::load(&result.config_file).await.unwrap();
        assert_eq!(loaded.selection, selection);
        assert_eq!(loaded.api.key.as_deref(), Some("file-key"));
        assert!(loaded.sync.single_flight_checklists);
    }
}
