//! Session cookie persistence.
//!
//! The API authenticates with a session cookie set by the OAuth login flow.
//! `SessionStore` keeps that cookie in a small file so later runs reuse the
//! session, or only in memory when no file is wanted.

use std::fs;
use std::path::{Path, PathBuf};

use log::{debug, warn};

use crate::config;
use crate::error::Result;

/// Holds the current session cookie and optionally mirrors it to disk.
#[derive(Debug, Clone)]
pub struct SessionStore {
    /// File the cookie is persisted to; `None` keeps it in memory only.
    pub path: Option<PathBuf>,
    cookie: Option<String>,
}

impl SessionStore {
    /// Open a file-backed store, loading any cookie saved earlier.
    ///
    /// If `path` is `None`, uses the platform-appropriate default location.
    /// An unreadable file is treated as no session.
    pub fn open(path: Option<PathBuf>) -> Self {
        let path = path.unwrap_or_else(config::default_session_path);
        let cookie = read_cookie(&path);
        Self {
            path: Some(path),
            cookie,
        }
    }

    /// A store that never touches the filesystem.
    pub fn in_memory(cookie: Option<String>) -> Self {
        Self {
            path: None,
            cookie: cookie.filter(|c| !c.trim().is_empty()),
        }
    }

    pub fn cookie(&self) -> Option<&str> {
        self.cookie.as_deref()
    }

    pub fn is_authenticated(&self) -> bool {
        self.cookie.is_some()
    }

    /// Replace the session cookie and persist it.
    pub fn save(&mut self, cookie: &str) -> Result<()> {
        let cookie = cookie.trim();
        if cookie.is_empty() {
            return self.clear();
        }
        if self.cookie.as_deref() == Some(cookie) {
            return Ok(());
        }
        self.cookie = Some(cookie.to_string());
        if let Some(path) = &self.path {
            if let Some(parent) = path.parent() {
                fs::create_dir_all(parent)?;
            }
            // Write to a temp file first so a crash never leaves half a cookie.
            let tmp = path.with_extension("tmp");
            fs::write(&tmp, cookie)?;
            fs::rename(&tmp, path)?;
            debug!("Saved session cookie to {}", path.display());
        }
        Ok(())
    }

    /// Forget the session and delete the persisted file, if any.
    pub fn clear(&mut self) -> Result<()> {
        self.cookie = None;
        if let Some(path) = &self.path {
            if path.exists() {
                fs::remove_file(path)?;
                debug!("Removed session file {}", path.display());
            }
        }
        Ok(())
    }
}

fn read_cookie(path: &Path) -> Option<String> {
    if !path.exists() {
        return None;
    }
    match fs::read_to_string(path) {
        Ok(contents) => Some(contents.trim().to_string()).filter(|c| !c.is_empty()),
        Err(e) => {
            warn!("Ignoring unreadable session file {}: {}", path.display(), e);
            None
        }
    }
}
