//! gradebook-store: Configuration, caching and credentials.
//!
//! The collaborators around the core engine: the TOML configuration layer,
//! the [`CacheStore`] backends used to keep loaded student collections
//! between runs, and the [`CredentialStore`] that turns a username and
//! password into an explicit [`Session`].

pub mod auth;
pub mod cache;
pub mod config;
pub mod error;
pub mod file;
pub mod memory;

pub use auth::{CredentialStore, Permission, Role, Session};
pub use cache::{create_cache, get_json, set_json, CacheConfig, CacheStore};
pub use config::{load_config, load_config_from, CacheBackend, CacheSettings, GradebookConfig};
pub use error::{AuthError, StoreError};
pub use file::FileCache;
pub use memory::MemoryCache;
