//! Stored login
//!
//! Keeps the user name and bearer token from `--login` in
//! ~/.config/homelens/session.json with restricted permissions (0o600)

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

#[cfg(unix)]
use std::os::unix::fs::PermissionsExt;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoredCredentials {
    pub user_name: String,
    pub auth_token: String,
    pub saved_at: DateTime<Utc>,
}

impl StoredCredentials {
    pub fn new(user_name: impl Into<String>, auth_token: impl Into<String>) -> Self {
        Self {
            user_name: user_name.into(),
            auth_token: auth_token.into(),
            saved_at: Utc::now(),
        }
    }
}

/// Default location of the credentials file
pub fn credentials_file() -> PathBuf {
    crate::config::Config::config_dir().join("session.json")
}

/// Load stored credentials. Missing or unreadable files count as logged out.
pub fn load(path: &Path) -> Option<StoredCredentials> {
    let content = fs::read_to_string(path).ok()?;
    match serde_json::from_str(&content) {
        Ok(creds) => Some(creds),
        Err(e) => {
            tracing::warn!(path = %path.display(), error = %e, "ignoring malformed credentials file");
            None
        }
    }
}

pub fn save(path: &Path, credentials: &StoredCredentials) -> io::Result<()> {
    if let Some(dir) = path.parent() {
        if !dir.exists() {
            fs::create_dir_all(dir)?;
            #[cfg(unix)]
            fs::set_permissions(dir, fs::Permissions::from_mode(0o700))?;
        }
    }

    let content = serde_json::to_string_pretty(credentials)?;
    fs::write(path, content)?;

    #[cfg(unix)]
    fs::set_permissions(path, fs::Permissions::from_mode(0o600))?;

    Ok(())
}

/// Delete stored credentials. Returns false if there was nothing to delete.
pub fn remove(path: &Path) -> io::Result<bool> {
    match fs::remove_file(path) {
        Ok(()) => Ok(true),
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(false),
        Err(e) => Err(e),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_save_load_remove() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("homelens").join("session.json");

        assert!(load(&path).is_none());
        save(&path, &StoredCredentials::new("minji", "tok-123")).unwrap();

        let loaded = load(&path).unwrap();
        assert_eq!(loaded.user_name, "minji");
        assert_eq!(loaded.auth_token, "tok-123");

        assert!(remove(&path).unwrap());
        assert!(!remove(&path).unwrap());
        assert!(load(&path).is_none());
    }

    #[cfg(unix)]
    #[test]
    fn test_file_is_owner_only() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("session.json");
        save(&path, &StoredCredentials::new("a", "b")).unwrap();
        let mode = fs::metadata(&path).unwrap().permissions().mode();
        assert_eq!(mode & 0o777, 0o600);
    }

    #[test]
    fn test_malformed_file_is_ignored() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("session.json");
        fs::write(&path, "not json").unwrap();
        assert!(load(&path).is_none());
    }
}
