//! Application configuration for tomoscrape.
//!
//! User config lives at `~/.tomoscrape/tomoscrape.toml`.
//! CLI flags override config file values, which override defaults.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use url::Url;

use crate::error::{Result, TomoError};

/// Default configuration file name.
const CONFIG_FILE_NAME: &str = "tomoscrape.toml";

/// Default config directory name under the user's home.
const CONFIG_DIR_NAME: &str = ".tomoscrape";

// ---------------------------------------------------------------------------
// Config structs (matching tomoscrape.toml schema)
// ---------------------------------------------------------------------------

/// Top-level application config, deserialized from TOML.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    /// Catalog site settings.
    #[serde(default)]
    pub site: SiteConfig,

    /// Fetch pacing and HTTP client settings.
    #[serde(default)]
    pub scrape: ScrapeSection,

    /// Where and how results are written.
    #[serde(default)]
    pub output: OutputConfig,
}

/// `[site]` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SiteConfig {
    /// Base URL that relative image sources are resolved against.
    #[serde(default = "default_base_url")]
    pub base_url: String,
}

impl Default for SiteConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
        }
    }
}

fn default_base_url() -> String {
    "https://www.listadomanga.es/".into()
}

/// `[scrape]` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScrapeSection {
    /// Pause between two manga fetches, in milliseconds.
    #[serde(default = "default_delay_ms")]
    pub delay_ms: u64,

    /// Per-request timeout in seconds.
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    /// User-Agent header sent with every request.
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
}

impl Default for ScrapeSection {
    fn default() -> Self {
        Self {
            delay_ms: default_delay_ms(),
            timeout_secs: default_timeout_secs(),
            user_agent: default_user_agent(),
        }
    }
}

fn default_delay_ms() -> u64 {
    1000
}
fn default_timeout_secs() -> u64 {
    30
}
fn default_user_agent() -> String {
    concat!("tomoscrape/", env!("CARGO_PKG_VERSION")).into()
}

/// `[output]` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OutputConfig {
    /// Directory receiving the JSON collections and the image tree.
    #[serde(default = "default_output_dir")]
    pub dir: String,

    /// Whether cover and volume images are downloaded.
    #[serde(default = "default_true")]
    pub download_images: bool,

    /// Persist local asset paths (`tomos/{id}/{n}.jpg`) instead of remote image URLs.
    #[serde(default = "default_true")]
    pub local_image_refs: bool,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            dir: default_output_dir(),
            download_images: true,
            local_image_refs: true,
        }
    }
}

fn default_output_dir() -> String {
    ".".into()
}
fn default_true() -> bool {
    true
}

// ---------------------------------------------------------------------------
// Scrape config (runtime, merged from config + CLI flags)
// ---------------------------------------------------------------------------

/// Runtime scrape configuration, merged from config file + CLI flags.
#[derive(Debug, Clone)]
pub struct ScrapeConfig {
    /// Base URL for resolving relative image sources.
    pub site_base: Url,
    /// Pause between manga fetches in milliseconds.
    pub delay_ms: u64,
    /// Per-request timeout in seconds.
    pub timeout_secs: u64,
    /// User-Agent header value.
    pub user_agent: String,
    /// Output directory.
    pub output_dir: PathBuf,
    /// Whether to download images.
    pub download_images: bool,
    /// Whether persisted records use local asset paths.
    pub local_image_refs: bool,
    /// Process at most this many catalog entries.
    pub limit: Option<usize>,
}

impl TryFrom<&AppConfig> for ScrapeConfig {
    type Error = TomoError;

    fn try_from(config: &AppConfig) -> Result<Self> {
        let site_base = Url::parse(&config.site.base_url).map_err(|e| {
            TomoError::config(format!(
                "invalid site.base_url '{}': {e}",
                config.site.base_url
            ))
        })?;

        Ok(Self {
            site_base,
            delay_ms: config.scrape.delay_ms,
            timeout_secs: config.scrape.timeout_secs,
            user_agent: config.scrape.user_agent.clone(),
            output_dir: PathBuf::from(&config.output.dir),
            download_images: config.output.download_images,
            local_image_refs: config.output.local_image_refs,
            limit: None,
        })
    }
}

// ---------------------------------------------------------------------------
// Config loading
// ---------------------------------------------------------------------------

/// Get the path to the config directory (`~/.tomoscrape/`).
pub fn config_dir() -> Result<PathBuf> {
    let home = dirs::home_dir()
        .ok_or_else(|| TomoError::config("could not determine home directory"))?;
    Ok(home.join(CONFIG_DIR_NAME))
}

/// Get the path to the config file (`~/.tomoscrape/tomoscrape.toml`).
pub fn config_file_path() -> Result<PathBuf> {
    Ok(config_dir()?.join(CONFIG_FILE_NAME))
}

/// Load the application config from disk. Returns defaults if the file does not exist.
pub fn load_config() -> Result<AppConfig> {
    let path = config_file_path()?;

    if !path.exists() {
        tracing::debug!(?path, "config file not found, using defaults");
        return Ok(AppConfig::default());
    }

    load_config_from(&path)
}

/// Load the application config from a specific file path.
pub fn load_config_from(path: &Path) -> Result<AppConfig> {
    let content = std::fs::read_to_string(path).map_err(|e| TomoError::io(path, e))?;

    toml::from_str(&content)
        .map_err(|e| TomoError::config(format!("failed to parse {}: {e}", path.display())))
}

/// Create the config directory and write a default config file.
/// Returns the path to the created file.
pub fn init_config() -> Result<PathBuf> {
    let dir = config_dir()?;
    std::fs::create_dir_all(&dir).map_err(|e| TomoError::io(&dir, e))?;

    let path = dir.join(CONFIG_FILE_NAME);
    let config = AppConfig::default();
    let content =
        toml::to_string_pretty(&config).map_err(|e| TomoError::config(e.to_string()))?;

    std::fs::write(&path, content).map_err(|e| TomoError::io(&path, e))?;
    tracing::info!(?path, "created default config file");

    Ok(path)
}
