//! Configuration loading.

use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

/// Which cache backend to use.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CacheBackend {
    None,
    Memory,
    File,
}

impl fmt::Display for CacheBackend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CacheBackend::None => write!(f, "none"),
            CacheBackend::Memory => write!(f, "memory"),
            CacheBackend::File => write!(f, "file"),
        }
    }
}

impl FromStr for CacheBackend {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "none" | "off" => Ok(CacheBackend::None),
            "memory" | "mem" => Ok(CacheBackend::Memory),
            "file" | "disk" => Ok(CacheBackend::File),
            other => Err(format!("unknown cache backend: {other}")),
        }
    }
}

/// The `[cache]` table.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheSettings {
    #[serde(default = "default_backend")]
    pub backend: CacheBackend,
    /// Directory for the file backend.
    #[serde(default = "default_cache_dir")]
    pub dir: PathBuf,
    /// Seconds an entry stays valid after it is written.
    #[serde(default = "default_ttl")]
    pub ttl_secs: u64,
    /// Prepended to every key.
    #[serde(default = "default_prefix")]
    pub prefix: String,
}

fn default_backend() -> CacheBackend {
    CacheBackend::File
}
fn default_cache_dir() -> PathBuf {
    PathBuf::from(".gradebook-cache")
}
fn default_ttl() -> u64 {
    3600
}
fn default_prefix() -> String {
    "gradebook:".to_string()
}

impl Default for CacheSettings {
    fn default() -> Self {
        Self {
            backend: default_backend(),
            dir: default_cache_dir(),
            ttl_secs: default_ttl(),
            prefix: default_prefix(),
        }
    }
}

/// Top-level gradebook configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GradebookConfig {
    /// Student data file read when no `--input` is given.
    #[serde(default = "default_data_path")]
    pub data_path: PathBuf,
    /// Field delimiter of the data file.
    #[serde(default = "default_delimiter")]
    pub delimiter: String,
    /// JSON file holding user accounts.
    #[serde(default = "default_users_file")]
    pub users_file: PathBuf,
    /// Where exports and reports go.
    #[serde(default = "default_output_dir")]
    pub output_dir: PathBuf,
    #[serde(default)]
    pub cache: CacheSettings,
}

fn default_data_path() -> PathBuf {
    PathBuf::from("donnees_eleves.csv")
}
fn default_delimiter() -> String {
    ",".to_string()
}
fn default_users_file() -> PathBuf {
    PathBuf::from("utilisateurs.json")
}
fn default_output_dir() -> PathBuf {
    PathBuf::from("./gradebook-output")
}

impl Default for GradebookConfig {
    fn default() -> Self {
        Self {
            data_path: default_data_path(),
            delimiter: default_delimiter(),
            users_file: default_users_file(),
            output_dir: default_output_dir(),
            cache: CacheSettings::default(),
        }
    }
}

impl GradebookConfig {
    /// The delimiter as a single byte.
    pub fn delimiter_byte(&self) -> Result<u8> {
        match self.delimiter.as_bytes() {
            [byte] => Ok(*byte),
            _ => anyhow::bail!(
                "delimiter must be a single ASCII character, got '{}'",
                self.delimiter
            ),
        }
    }
}

/// Resolve environment variable references like `${VAR_NAME}` in a string.
///
/// Substituted values are not scanned again. An unterminated `${` is kept as is.
fn resolve_env_vars(s: &str) -> String {
    let mut result = String::with_capacity(s.len());
    let mut rest = s;
    while let Some(start) = rest.find("${") {
        let Some(end) = rest[start..].find('}') else {
            break;
        };
        result.push_str(&rest[..start]);
        let var_name = &rest[start + 2..start + end];
        result.push_str(&std::env::var(var_name).unwrap_or_default());
        rest = &rest[start + end + 1..];
    }
    result.push_str(rest);
    result
}

fn resolve_path(path: &Path) -> PathBuf {
    PathBuf::from(resolve_env_vars(&path.to_string_lossy()))
}

/// Load configuration from well-known paths.
///
/// Search order:
/// 1. `gradebook.toml` in the current directory
/// 2. `~/.config/gradebook/config.toml`
///
/// Environment variable overrides: `GRADEBOOK_CACHE_TTL`,
/// `GRADEBOOK_USERS_FILE`, `GRADEBOOK_CACHE_BACKEND`.
pub fn load_config() -> Result<GradebookConfig> {
    load_config_from(None)
}

/// Load config from an explicit path, or search the default locations.
pub fn load_config_from(path: Option<&Path>) -> Result<GradebookConfig> {
    let config_path = if let Some(p) = path {
        if p.exists() {
            Some(p.to_path_buf())
        } else {
            anyhow::bail!("config file not found: {}", p.display());
        }
    } else {
        let local = PathBuf::from("gradebook.toml");
        if local.exists() {
            Some(local)
        } else {
            dirs_path()
                .map(|home| home.join("config.toml"))
                .filter(|global| global.exists())
        }
    };

    let mut config = match config_path {
        Some(path) => {
            let content = std::fs::read_to_string(&path)
                .with_context(|| format!("failed to read config: {}", path.display()))?;
            parse_config_str(&content)
                .with_context(|| format!("failed to parse config: {}", path.display()))?
        }
        None => GradebookConfig::default(),
    };

    apply_env_overrides(&mut config)?;
    Ok(config)
}

/// Parse a TOML string and expand `${VAR}` references in path fields.
pub fn parse_config_str(content: &str) -> Result<GradebookConfig> {
    let mut config: GradebookConfig = toml::from_str(content)?;
    config.data_path = resolve_path(&config.data_path);
    config.users_file = resolve_path(&config.users_file);
    config.output_dir = resolve_path(&config.output_dir);
    config.cache.dir = resolve_path(&config.cache.dir);
    Ok(config)
}

fn apply_env_overrides(config: &mut GradebookConfig) -> Result<()> {
    if let Ok(ttl) = std::env::var("GRADEBOOK_CACHE_TTL") {
        config.cache.ttl_secs = ttl
            .parse()
            .with_context(|| format!("GRADEBOOK_CACHE_TTL is not a number: {ttl}"))?;
    }
    if let Ok(users) = std::env::var("GRADEBOOK_USERS_FILE") {
        config.users_file = PathBuf::from(users);
    }
    if let Ok(backend) = std::env::var("GRADEBOOK_CACHE_BACKEND") {
        config.cache.backend = backend
            .parse()
            .map_err(|e: String| anyhow::anyhow!("GRADEBOOK_CACHE_BACKEND: {e}"))?;
    }
    Ok(())
}

fn dirs_path() -> Option<PathBuf> {
    std::env::var("HOME")
        .ok()
        .map(|h| PathBuf::from(h).join(".config").join("gradebook"))
}

/// Commented sample written by `gradebook init`.
pub const SAMPLE_CONFIG: &str = r#"# gradebook configuration

# Student data file and its field delimiter.
data_path = "donnees_eleves.csv"
delimiter = ","

# User accounts (created with `gradebook users add`).
users_file = "utilisateurs.json"

# Exports and HTML reports.
output_dir = "./gradebook-output"

[cache]
# none, memory or file
backend = "file"
dir = ".gradebook-cache"
ttl_secs = 3600
prefix = "gradebook:"
"#;
