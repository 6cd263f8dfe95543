//! User accounts, roles and sessions.
//!
//! Accounts live in a JSON file keyed by username. Passwords are stored as
//! `hex(SHA-256(salt ‖ password))` with a random per-user salt. A successful
//! [`CredentialStore::authenticate`] yields a [`Session`], which callers
//! pass to anything that needs a permission check.

use std::collections::BTreeMap;
use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use uuid::Uuid;

use crate::error::AuthError;

/// An action a role may be allowed to perform.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Permission {
    Read,
    Write,
    Delete,
    Export,
    Import,
}

impl fmt::Display for Permission {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Permission::Read => write!(f, "read"),
            Permission::Write => write!(f, "write"),
            Permission::Delete => write!(f, "delete"),
            Permission::Export => write!(f, "export"),
            Permission::Import => write!(f, "import"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Admin,
    Teacher,
    User,
}

impl Role {
    pub fn permissions(self) -> &'static [Permission] {
        match self {
            Role::Admin => &[
                Permission::Read,
                Permission::Write,
                Permission::Delete,
                Permission::Export,
                Permission::Import,
            ],
            Role::Teacher => &[Permission::Read, Permission::Write],
            Role::User => &[Permission::Read],
        }
    }

    pub fn allows(self, permission: Permission) -> bool {
        self.permissions().contains(&permission)
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Role::Admin => write!(f, "admin"),
            Role::Teacher => write!(f, "teacher"),
            Role::User => write!(f, "user"),
        }
    }
}

impl FromStr for Role {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "admin" => Ok(Role::Admin),
            "teacher" | "enseignant" => Ok(Role::Teacher),
            "user" => Ok(Role::User),
            other => Err(format!("unknown role: {other}")),
        }
    }
}

/// A stored account.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserRecord {
    pub salt: String,
    pub password_hash: String,
    pub role: Role,
}

fn hash_password(salt: &str, password: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(salt.as_bytes());
    hasher.update(password.as_bytes());
    hex::encode(hasher.finalize())
}

/// An authenticated user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    pub id: Uuid,
    pub username: String,
    pub role: Role,
    pub started_at: DateTime<Utc>,
}

impl Session {
    pub fn has_permission(&self, permission: Permission) -> bool {
        self.role.allows(permission)
    }

    /// Fail with [`AuthError::PermissionDenied`] unless the role grants `permission`.
    pub fn require(&self, permission: Permission) -> Result<(), AuthError> {
        if self.has_permission(permission) {
            Ok(())
        } else {
            Err(AuthError::PermissionDenied {
                username: self.username.clone(),
                permission,
            })
        }
    }
}

/// Accounts backed by a JSON file.
#[derive(Debug, Clone)]
pub struct CredentialStore {
    path: PathBuf,
    users: BTreeMap<String, UserRecord>,
}

impl CredentialStore {
    /// Open the store at `path`. A missing file is an empty store.
    pub fn load(path: &Path) -> Result<Self, AuthError> {
        let users = match std::fs::read_to_string(path) {
            Ok(content) => serde_json::from_str(&content)?,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => BTreeMap::new(),
            Err(e) => return Err(e.into()),
        };
        Ok(Self {
            path: path.to_path_buf(),
            users,
        })
    }

    /// Write all accounts back to the file, creating its directory if needed.
    pub fn save(&self) -> Result<(), AuthError> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(&self.path, serde_json::to_string_pretty(&self.users)?)?;
        tracing::info!(path = %self.path.display(), users = self.users.len(), "credential store saved");
        Ok(())
    }

    /// Add an account in memory. Call [`save`](Self::save) to persist it.
    pub fn add_user(&mut self, username: &str, password: &str, role: Role) -> Result<(), AuthError> {
        if self.users.contains_key(username) {
            return Err(AuthError::UserExists(username.to_string()));
        }
        let salt = Uuid::new_v4().to_string();
        let record = UserRecord {
            password_hash: hash_password(&salt, password),
            salt,
            role,
        };
        self.users.insert(username.to_string(), record);
        Ok(())
    }

    /// Check a username and password and open a session.
    pub fn authenticate(&self, username: &str, password: &str) -> Result<Session, AuthError> {
        if self.users.is_empty() {
            return Err(AuthError::NoUsers);
        }
        let record = self
            .users
            .get(username)
            .ok_or_else(|| AuthError::UnknownUser(username.to_string()))?;
        if hash_password(&record.salt, password) != record.password_hash {
            return Err(AuthError::WrongPassword);
        }
        Ok(Session {
            id: Uuid::new_v4(),
            username: username.to_string(),
            role: record.role,
            started_at: Utc::now(),
        })
    }

    /// Usernames and roles, sorted by username.
    pub fn users(&self) -> impl Iterator<Item = (&str, Role)> {
        self.users.iter().map(|(name, record)| (name.as_str(), record.role))
    }

    pub fn is_empty(&self) -> bool {
        self.users.is_empty()
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn store() -> (tempfile::TempDir, CredentialStore) {
        let dir = tempfile::tempdir().unwrap();
        let store = CredentialStore::load(&dir.path().join("utilisateurs.json")).unwrap();
        (dir, store)
    }

    #[test]
    fn role_permissions() {
        assert!(Role::Admin.allows(Permission::Import));
        assert!(Role::Teacher.allows(Permission::Write));
        assert!(!Role::Teacher.allows(Permission::Export));
        assert!(Role::User.allows(Permission::Read));
        assert!(!Role::User.allows(Permission::Write));
        assert_eq!("Enseignant".parse::<Role>().unwrap(), Role::Teacher);
        assert!("root".parse::<Role>().is_err());
    }

    #[test]
    fn missing_file_is_empty_store() {
        let (_dir, store) = store();
        assert!(store.is_empty());
        assert!(matches!(store.authenticate("a", "b"), Err(AuthError::NoUsers)));
    }

    #[test]
    fn add_save_reload_authenticate() {
        let (_dir, mut store) = store();
        store.add_user("prof", "secret", Role::Teacher).unwrap();
        store.save().unwrap();

        let reloaded = CredentialStore::load(store.path()).unwrap();
        let session = reloaded.authenticate("prof", "secret").unwrap();
        assert_eq!(session.username, "prof");
        assert_eq!(session.role, Role::Teacher);
        assert!(session.require(Permission::Write).is_ok());
        assert!(matches!(
            session.require(Permission::Delete),
            Err(AuthError::PermissionDenied { permission: Permission::Delete, .. })
        ));
    }

    #[test]
    fn wrong_credentials() {
        let (_dir, mut store) = store();
        store.add_user("admin", "pw", Role::Admin).unwrap();
        let err = store.authenticate("admin", "nope").unwrap_err();
        assert!(matches!(err, AuthError::WrongPassword));
        assert!(err.is_credential_failure());
        assert!(matches!(store.authenticate("ghost", "pw"), Err(AuthError::UnknownUser(_))));
    }

    #[test]
    fn duplicate_user_is_rejected() {
        let (_dir, mut store) = store();
        store.add_user("admin", "pw", Role::Admin).unwrap();
        assert!(matches!(
            store.add_user("admin", "other", Role::User),
            Err(AuthError::UserExists(_))
        ));
    }

    #[test]
    fn passwords_are_salted_and_hashed() {
        let (_dir, mut store) = store();
        store.add_user("a", "same", Role::User).unwrap();
        store.add_user("b", "same", Role::User).unwrap();
        store.save().unwrap();

        let content = std::fs::read_to_string(store.path()).unwrap();
        assert!(!content.contains("\"same\""));
        let raw: BTreeMap<String, UserRecord> = serde_json::from_str(&content).unwrap();
        assert_ne!(raw["a"].password_hash, raw["b"].password_hash);
        assert_eq!(raw["a"].password_hash, hash_password(&raw["a"].salt, "same"));
        assert_eq!(raw["a"].password_hash.len(), 64);
    }

    #[test]
    fn users_are_listed_sorted() {
        let (_dir, mut store) = store();
        store.add_user("zoe", "pw", Role::User).unwrap();
        store.add_user("amadou", "pw", Role::Admin).unwrap();
        let users: Vec<_> = store.users().collect();
        assert_eq!(users, [("amadou", Role::Admin), ("zoe", Role::User)]);
    }
}
