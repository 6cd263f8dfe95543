//! Subcommand implementations and the state they share.

pub mod add;
pub mod cache;
pub mod correct;
pub mod export;
pub mod import;
pub mod init;
pub mod report;
pub mod search;
pub mod show;
pub mod sort;
pub mod stats;
pub mod users;
pub mod validate;

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use comfy_table::{Cell, Table};

use gradebook_core::{loader, RawRow, StudentEntity, StudentRegistry};
use gradebook_store::{
    create_cache, get_json, load_config_from, set_json, CredentialStore, GradebookConfig,
    Permission, Session,
};

/// Configuration and login details for one invocation.
pub struct AppContext {
    pub config: GradebookConfig,
    user: Option<String>,
    password: Option<String>,
}

impl AppContext {
    pub fn load(
        config_path: Option<&Path>,
        user: Option<String>,
        password: Option<String>,
    ) -> Result<Self> {
        Ok(Self {
            config: load_config_from(config_path)?,
            user,
            password,
        })
    }

    /// `--input` if given, else the configured data file.
    pub fn input_path(&self, input: Option<PathBuf>) -> PathBuf {
        input.unwrap_or_else(|| self.config.data_path.clone())
    }

    pub fn read_rows(&self, path: &Path) -> Result<Vec<RawRow>> {
        loader::read_rows(path, self.config.delimiter_byte()?)
    }

    pub fn credentials(&self) -> Result<CredentialStore> {
        CredentialStore::load(&self.config.users_file).with_context(|| {
            format!(
                "failed to open user store: {}",
                self.config.users_file.display()
            )
        })
    }

    /// Log in with `--user`/`--password` and check a permission.
    pub fn session(&self, permission: Permission) -> Result<Session> {
        let (Some(user), Some(password)) = (&self.user, &self.password) else {
            anyhow::bail!("this command needs --user and --password ({permission} permission)");
        };
        let session = self.credentials()?.authenticate(user, password)?;
        session.require(permission)?;
        tracing::debug!(user = %session.username, role = %session.role, "authenticated");
        Ok(session)
    }

    /// Load the registry for a data file, going through the cache when one is configured.
    ///
    /// The cache holds the source rows, so a hit rebuilds exactly the registry
    /// a fresh read would. The key includes the file's modification time, so
    /// an edited file is never served from a stale entry.
    pub async fn load_registry(&self, path: &Path) -> Result<StudentRegistry> {
        let cache = create_cache(&self.config.cache);
        let key = registry_cache_key(path)?;

        if let Some(cache) = cache.as_deref() {
            match get_json::<Vec<RawRow>>(cache, &key).await {
                Ok(Some(rows)) => {
                    tracing::info!(key = %key, backend = cache.name(), "cache hit");
                    let mut registry = StudentRegistry::new();
                    registry.load(&rows);
                    return Ok(registry);
                }
                Ok(None) => tracing::info!(key = %key, backend = cache.name(), "cache miss"),
                Err(e) => tracing::warn!(key = %key, "ignoring unreadable cache entry: {e}"),
            }
        }

        let rows = self.read_rows(path)?;
        let mut registry = StudentRegistry::new();
        registry.load(&rows);

        if let Some(cache) = cache.as_deref() {
            if let Err(e) = set_json(cache, &key, &rows).await {
                tracing::warn!(key = %key, "failed to cache rows: {e}");
            }
        }

        Ok(registry)
    }
}

fn registry_cache_key(path: &Path) -> Result<String> {
    let metadata = std::fs::metadata(path)
        .with_context(|| format!("failed to open data file: {}", path.display()))?;
    let modified = metadata
        .modified()
        .ok()
        .and_then(|t| t.duration_since(std::time::UNIX_EPOCH).ok())
        .map(|d| d.as_nanos())
        .unwrap_or_default();
    let canonical = path.canonicalize().unwrap_or_else(|_| path.to_path_buf());
    Ok(format!(
        "rows:{}:{}:{}",
        canonical.display(),
        metadata.len(),
        modified
    ))
}

fn opt(value: &Option<String>) -> &str {
    value.as_deref().unwrap_or("")
}

fn average_cell(value: Option<f64>) -> String {
    value.map_or_else(|| "-".to_string(), |v| format!("{v:.2}"))
}

/// Tabulate students with their overall average.
pub fn student_table<'a>(students: impl IntoIterator<Item = &'a StudentEntity>) -> Table {
    let mut table = Table::new();
    table.set_header(vec!["Numero", "Nom", "Prenom", "Date de naissance", "Classe", "Moyenne"]);
    for student in students {
        table.add_row(vec![
            Cell::new(opt(&student.numero)),
            Cell::new(opt(&student.nom)),
            Cell::new(opt(&student.prenom)),
            Cell::new(opt(&student.date_naissance)),
            Cell::new(opt(&student.classe)),
            Cell::new(average_cell(student.overall_average)),
        ]);
    }
    table
}
