#[cfg(test)]
use std::cell::RefCell;
#[cfg(test)]
use std::collections::HashMap;

use gloo::storage::{LocalStorage, Storage};
use serde::{Deserialize, Serialize};

use crate::error::{PortalError, Result};

pub const ACCESS_TOKEN_KEY: &str = "geoportal_access_token";
pub const USER_DATA_KEY: &str = "geoportal_user_data";

/// Profile returned by `GET /users/me`.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct UserProfile {
    #[serde(default)]
    pub id: i64,
    pub username: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub is_active: bool,
    #[serde(default)]
    pub created_at: Option<String>,
    #[serde(default)]
    pub updated_at: Option<String>,
}

/// A logged-in user.
#[derive(Debug, Clone, PartialEq)]
pub struct AuthSession {
    pub access_token: String,
    pub user: UserProfile,
}

/// Key-value persistence of the session.
///
/// The token is stored as a raw string and the profile as JSON, under the
/// same keys the rest of the site reads.
pub trait SessionStore {
    fn get_item(&self, key: &str) -> Option<String>;
    fn set_item(&self, key: &str, value: &str) -> Result<()>;
    fn remove_item(&self, key: &str);

    /// Both keys or nothing.
    fn save(&self, session: &AuthSession) -> Result<()> {
        let user = serde_json::to_string(&session.user)?;
        self.set_item(ACCESS_TOKEN_KEY, &session.access_token)?;
        if let Err(e) = self.set_item(USER_DATA_KEY, &user) {
            self.remove_item(ACCESS_TOKEN_KEY);
            return Err(e);
        }
        Ok(())
    }

    fn load(&self) -> Option<AuthSession> {
        let access_token = self.get_item(ACCESS_TOKEN_KEY)?;
        let Some(user) = user_data(self) else {
            log::warn!("Access token found without user data; ignoring stored session");
            return None;
        };
        Some(AuthSession { access_token, user })
    }

    fn clear(&self) {
        self.remove_item(ACCESS_TOKEN_KEY);
        self.remove_item(USER_DATA_KEY);
    }
}

/// A user counts as authenticated as soon as a token is stored.
pub fn is_authenticated<S: SessionStore + ?Sized>(store: &S) -> bool {
    store.get_item(ACCESS_TOKEN_KEY).is_some()
}

/// The stored profile, if any parses.
pub fn user_data<S: SessionStore + ?Sized>(store: &S) -> Option<UserProfile> {
    let raw = store.get_item(USER_DATA_KEY)?;
    match serde_json::from_str(&raw) {
        Ok(user) => Some(user),
        Err(e) => {
            log::error!("Stored user data is corrupt: {e}");
            None
        }
    }
}

/// Browser `localStorage`.
#[derive(Debug, Clone, Copy, Default)]
pub struct LocalStorageStore;

impl SessionStore for LocalStorageStore {
    fn get_item(&self, key: &str) -> Option<String> {
        LocalStorage::raw().get_item(key).ok().flatten()
    }

    fn set_item(&self, key: &str, value: &str) -> Result<()> {
        LocalStorage::raw()
            .set_item(key, value)
            .map_err(|e| PortalError::Storage(format!("failed to write {key}: {e:?}")))
    }

    fn remove_item(&self, key: &str) {
        if let Err(e) = LocalStorage::raw().remove_item(key) {
            log::error!("Failed to remove {key} from localStorage: {e:?}");
        }
    }
}

/// In-memory store with per-key write failures.
#[cfg(test)]
#[derive(Debug, Default)]
pub struct MemoryStore {
    items: RefCell<HashMap<String, String>>,
    /// Keys whose writes fail.
    read_only: RefCell<Vec<String>>,
}

#[cfg(test)]
impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn fail_writes_to(&self, key: &str) {
        self.read_only.borrow_mut().push(key.to_string());
    }

    pub fn len(&self) -> usize {
        self.items.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.borrow().is_empty()
    }
}

#[cfg(test)]
impl SessionStore for MemoryStore {
    fn get_item(&self, key: &str) -> Option<String> {
        self.items.borrow().get(key).cloned()
    }

    fn set_item(&self, key: &str, value: &str) -> Result<()> {
        if self.read_only.borrow().iter().any(|k| k == key) {
            return Err(PortalError::Storage(format!("{key} is read-only")));
        }
        self.items
            .borrow_mut()
            .insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove_item(&self, key: &str) {
        self.items.borrow_mut().remove(key);
    }
}
