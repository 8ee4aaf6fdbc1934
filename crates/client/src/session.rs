//! The signed-in identity of a client.
//!
//! A [`Session`] is an explicit value handed to the [`ApiClient`]; the
//! [`SessionStore`] persists it between runs and removes it on logout.
//!
//! [`ApiClient`]: crate::client::ApiClient

use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::debug;
use ulendo_core::models::user::{AuthResponse, User};

use crate::error::{ClientError, ClientResult};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Session {
    pub token: String,
    pub user: User,
}

impl From<AuthResponse> for Session {
    fn from(auth: AuthResponse) -> Self {
        Self {
            token: auth.token,
            user: auth.user,
        }
    }
}

/// JSON file holding at most one session.
#[derive(Debug, Clone)]
pub struct SessionStore {
    path: PathBuf,
}

impl SessionStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Reads the saved session; a missing file means nobody is signed in.
    pub fn load(&self) -> ClientResult<Option<Session>> {
        let contents = match fs::read_to_string(&self.path) {
            Ok(contents) => contents,
            Err(err) if err.kind() == ErrorKind::NotFound => return Ok(None),
            Err(err) => return Err(ClientError::Session(err.to_string())),
        };

        let session = serde_json::from_str(&contents)
            .map_err(|err| ClientError::Session(format!("{} is unreadable: {}", self.path.display(), err)))?;
        debug!(path = %self.path.display(), "loaded session");
        Ok(Some(session))
    }

    pub fn save(&self, session: &Session) -> ClientResult<()> {
        let json = serde_json::to_string_pretty(session)
            .map_err(|err| ClientError::Session(err.to_string()))?;
        fs::write(&self.path, json).map_err(|err| ClientError::Session(err.to_string()))
    }

    pub fn clear(&self) -> ClientResult<()> {
        match fs::remove_file(&self.path) {
            Ok(()) => Ok(()),
            Err(err) if err.kind() == ErrorKind::NotFound => Ok(()),
            Err(err) => Err(ClientError::Session(err.to_string())),
        }
    }
}
