// Session credentials
//
// Access token, refresh token, and role live in a persistent key-value
// store owned by the host. The pipeline only sees it through the
// `SessionStore` trait, injected at construction time.

use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;
use std::sync::{PoisonError, RwLock};

use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};

use crate::error::Error;

/// The three entries a session consists of.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SessionKey {
    Access,
    Refresh,
    Role,
}

impl SessionKey {
    pub const ALL: [Self; 3] = [Self::Access, Self::Refresh, Self::Role];

    /// Storage key name.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Access => "access",
            Self::Refresh => "refresh",
            Self::Role => "role",
        }
    }
}

/// Account role, stored alongside the token pair.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    #[default]
    Individual,
    Company,
}

impl Role {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Individual => "individual",
            Self::Company => "company",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "individual" => Ok(Self::Individual),
            "company" => Ok(Self::Company),
            other => Err(format!("expected 'individual' or 'company', got '{other}'")),
        }
    }
}

// ── Store seam ───────────────────────────────────────────────────────

/// Persistent key-value storage for session credentials.
///
/// Writes are whole-value replacements, so concurrent writers resolve as
/// last-write-wins without further coordination.
pub trait SessionStore: Send + Sync {
    fn get(&self, key: SessionKey) -> Option<String>;

    fn set(&self, key: SessionKey, value: &str) -> Result<(), Error>;

    /// Remove all three entries.
    fn clear(&self) -> Result<(), Error>;
}

/// In-memory store, for tests and short-lived hosts.
#[derive(Debug, Default)]
pub struct MemorySessionStore {
    entries: RwLock<HashMap<SessionKey, String>>,
}

impl MemorySessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.entries
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .is_empty()
    }
}

impl SessionStore for MemorySessionStore {
    fn get(&self, key: SessionKey) -> Option<String> {
        self.entries
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(&key)
            .cloned()
    }

    fn set(&self, key: SessionKey, value: &str) -> Result<(), Error> {
        self.entries
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(key, value.to_owned());
        Ok(())
    }

    fn clear(&self) -> Result<(), Error> {
        self.entries
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .clear();
        Ok(())
    }
}

// ── Session ──────────────────────────────────────────────────────────

/// A full set of credentials, as written at login or signup.
#[derive(Debug, Clone)]
pub struct Session {
    pub access: SecretString,
    pub refresh: SecretString,
    pub role: Option<Role>,
}

impl Session {
    /// Read the stored session. `None` unless both tokens are present.
    pub fn load(store: &dyn SessionStore) -> Option<Self> {
        let access = store.get(SessionKey::Access).filter(|t| !t.is_empty())?;
        let refresh = store.get(SessionKey::Refresh).filter(|t| !t.is_empty())?;
        let role = store
            .get(SessionKey::Role)
            .and_then(|r| r.parse::<Role>().ok());
        Some(Self {
            access: SecretString::from(access),
            refresh: SecretString::from(refresh),
            role,
        })
    }

    pub fn save(&self, store: &dyn SessionStore) -> Result<(), Error> {
        store.set(SessionKey::Access, self.access.expose_secret())?;
        store.set(SessionKey::Refresh, self.refresh.expose_secret())?;
        if let Some(role) = self.role {
            store.set(SessionKey::Role, role.as_str())?;
        }
        Ok(())
    }
}

/// Whether an access token is stored. Hosts check this before dispatching
/// protected requests.
pub fn is_authenticated(store: &dyn SessionStore) -> bool {
    store
        .get(SessionKey::Access)
        .is_some_and(|token| !token.is_empty())
}

// ── Events ───────────────────────────────────────────────────────────

/// Session lifecycle signals published by the pipeline.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionEvent {
    /// A response came back 401; storage has been cleared.
    Expired { url: String },
    SignedIn { role: Role },
    SignedOut,
}
