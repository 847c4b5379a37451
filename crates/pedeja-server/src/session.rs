//! Explicit admin session lifecycle.
//!
//! Sessions are created on login, carried as bearer tokens, and invalidated
//! on logout or expiry. All session state lives in this store; nothing is
//! read ambiently elsewhere.

use std::collections::HashMap;
use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use serde::Serialize;
use sha2::{Digest, Sha256};
use subtle::ConstantTimeEq;
use tokio::sync::Mutex;
use uuid::Uuid;

/// One authenticated admin session, scoped to a single store.
#[derive(Debug, Clone, Serialize)]
pub struct Session {
    pub token: String,
    pub store: String,
    pub created_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
}

impl Session {
    fn is_expired(&self, now: DateTime<Utc>) -> bool {
        now >= self.expires_at
    }
}

/// In-memory session store shared across handlers and the expiry sweep.
#[derive(Debug, Clone)]
pub struct SessionStore {
    inner: Arc<Mutex<HashMap<String, Session>>>,
    ttl: Duration,
}

impl SessionStore {
    /// `ttl_secs` must fit an `i64`; config loading rejects larger values,
    /// and anything still out of `Duration` range saturates to its maximum.
    #[must_use]
    pub fn new(ttl_secs: u64) -> Self {
        let ttl = i64::try_from(ttl_secs)
            .ok()
            .and_then(Duration::try_seconds)
            .unwrap_or(Duration::MAX);
        Self {
            inner: Arc::new(Mutex::new(HashMap::new())),
            ttl,
        }
    }

    /// Mint a session for a store whose credentials already checked out.
    pub async fn login(&self, store: &str) -> Session {
        let now = Utc::now();
        let session = Session {
            token: Uuid::new_v4().simple().to_string(),
            store: store.to_string(),
            created_at: now,
            expires_at: now
                .checked_add_signed(self.ttl)
                .unwrap_or(DateTime::<Utc>::MAX_UTC),
        };
        self.inner
            .lock()
            .await
            .insert(session.token.clone(), session.clone());
        tracing::info!(store, "admin session created");
        session
    }

    /// Resolve a bearer token to its session, refusing expired ones.
    pub async fn validate(&self, token: &str) -> Option<Session> {
        let sessions = self.inner.lock().await;
        let session = sessions.get(token)?;
        if session.is_expired(Utc::now()) {
            return None;
        }
        Some(session.clone())
    }

    pub async fn invalidate(&self, token: &str) {
        if let Some(session) = self.inner.lock().await.remove(token) {
            tracing::info!(store = %session.store, "admin session invalidated");
        }
    }

    /// Drop expired sessions; returns how many were removed.
    pub async fn purge_expired(&self) -> usize {
        let now = Utc::now();
        let mut sessions = self.inner.lock().await;
        let before = sessions.len();
        sessions.retain(|_, session| !session.is_expired(now));
        before - sessions.len()
    }

    /// Stores with at least one live session. The poller only polls these;
    /// no poll occurs while nobody is authenticated.
    pub async fn active_stores(&self) -> Vec<String> {
        let now = Utc::now();
        let sessions = self.inner.lock().await;
        let mut stores: Vec<String> = sessions
            .values()
            .filter(|session| !session.is_expired(now))
            .map(|session| session.store.clone())
            .collect();
        stores.sort();
        stores.dedup();
        stores
    }
}

/// Per-store admin keys, loaded from `PEDEJA_ADMIN_KEYS` as comma-separated
/// `store:key` pairs. Keys are kept only as SHA-256 hashes and compared in
/// constant time.
#[derive(Debug, Clone)]
pub struct AdminKeys {
    hashes: Arc<HashMap<String, [u8; 32]>>,
    pub enabled: bool,
}

impl AdminKeys {
    /// Builds key config from the environment.
    ///
    /// In development, empty/missing keys disable the credential check for
    /// local iteration. In non-development envs, empty/missing keys fail
    /// startup.
    ///
    /// # Errors
    ///
    /// Fails when keys are required but absent, or an entry is not a
    /// `store:key` pair.
    pub fn from_env(is_development: bool) -> anyhow::Result<Self> {
        let raw = std::env::var("PEDEJA_ADMIN_KEYS").unwrap_or_default();
        Self::from_raw(&raw, is_development)
    }

    fn from_raw(raw: &str, is_development: bool) -> anyhow::Result<Self> {
        let mut hashes = HashMap::new();
        for entry in raw.split(',').map(str::trim).filter(|s| !s.is_empty()) {
            let Some((store, key)) = entry.split_once(':') else {
                anyhow::bail!("PEDEJA_ADMIN_KEYS entry '{entry}' is not a store:key pair");
            };
            hashes.insert(store.trim().to_string(), Self::hash(key.trim()));
        }

        if hashes.is_empty() {
            if is_development {
                tracing::warn!(
                    "PEDEJA_ADMIN_KEYS not set; admin login accepts any key in development"
                );
                return Ok(Self {
                    hashes: Arc::new(HashMap::new()),
                    enabled: false,
                });
            }
            anyhow::bail!(
                "PEDEJA_ADMIN_KEYS is required outside development; provide store:key pairs"
            );
        }

        Ok(Self {
            hashes: Arc::new(hashes),
            enabled: true,
        })
    }

    /// Check a login attempt. Always hashes the candidate so the comparison
    /// cost does not depend on whether the store exists.
    #[must_use]
    pub fn verify(&self, store: &str, key: &str) -> bool {
        if !self.enabled {
            return true;
        }
        let candidate = Self::hash(key);
        match self.hashes.get(store) {
            Some(stored) => stored.ct_eq(&candidate).into(),
            None => {
                let _ = candidate.ct_eq(&[0u8; 32]);
                false
            }
        }
    }

    fn hash(key: &str) -> [u8; 32] {
        Sha256::digest(key.as_bytes()).into()
    }
}
