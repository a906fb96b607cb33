//! Server-side visitor sessions keyed by the `hithereimacookie` cookie.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use chrono::{DateTime, Utc};
use rand::Rng;
use tokio::sync::RwLock;
use tracing::{debug, info};

use reps_core::namegen;
use reps_types::session::{AuthState, Flash};

use crate::error::AppError;

pub const COOKIE_NAME: &str = "hithereimacookie";

/// One month, in seconds.
pub const SESSION_MAX_AGE_SECS: i64 = 2_629_744;

/// Idle limit for sessions with nobody logged in.
pub const ANONYMOUS_MAX_IDLE_SECS: i64 = 86_400;

#[derive(Debug, Clone)]
pub struct Session {
    pub auth: AuthState,
    /// Display name used as the poster of anonymous comments.
    pub pseudonym: String,
    pub csrf_token: String,
    pub flashes: Vec<Flash>,
    pub last_seen: DateTime<Utc>,
}

impl Session {
    fn fresh() -> Self {
        Self {
            auth: AuthState::LoggedOut,
            pseudonym: namegen::pseudonym(),
            csrf_token: random_token(),
            flashes: Vec::new(),
            last_seen: Utc::now(),
        }
    }
}

pub fn random_token() -> String {
    let bytes: [u8; 32] = rand::rng().random();
    hex::encode(bytes)
}

/// In-memory session store shared by every request. Requests carrying the
/// same cookie operate on the same entry.
#[derive(Clone, Default)]
pub struct SessionStore {
    sessions: Arc<RwLock<HashMap<String, Arc<Mutex<Session>>>>>,
}

impl SessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Attach to the session for a cookie value, or start a new one when the
    /// cookie is absent or unknown. New sessions are not stored until
    /// [`SessionStore::commit`] sees that the request touched them.
    pub async fn load_or_create(&self, id: Option<&str>) -> SessionHandle {
        if let Some(id) = id {
            if let Some(inner) = self.sessions.read().await.get(id) {
                return SessionHandle::attach(id.to_string(), Arc::clone(inner));
            }
        }

        debug!("Starting new session");
        SessionHandle::new(random_token(), Session::fresh())
    }

    /// Record activity on `handle`. Returns whether the visitor should be
    /// given the session cookie.
    pub async fn commit(&self, handle: &SessionHandle) -> bool {
        handle.lock().last_seen = Utc::now();
        if handle.stored {
            return true;
        }
        if !handle.touched.load(Ordering::Relaxed) {
            return false;
        }

        self.sessions
            .write()
            .await
            .entry(handle.id.clone())
            .or_insert_with(|| Arc::clone(&handle.inner));
        true
    }

    /// Drop sessions idle for longer than `max_idle`, or longer than
    /// `anonymous_idle` when nobody is logged in and no flash is pending.
    /// Returns how many went.
    pub async fn prune(&self, max_idle: chrono::Duration, anonymous_idle: chrono::Duration) -> usize {
        let now = Utc::now();
        let mut sessions = self.sessions.write().await;
        let before = sessions.len();
        sessions.retain(|_, entry| {
            let session = entry.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
            let anonymous = session.auth == AuthState::LoggedOut && session.flashes.is_empty();
            let limit = if anonymous { anonymous_idle } else { max_idle };
            session.last_seen >= now - limit
        });
        before - sessions.len()
    }

    pub async fn len(&self) -> usize {
        self.sessions.read().await.len()
    }
}

/// Background task that expires sessions the cookie would have outlived,
/// and anonymous ones after a day.
pub async fn run_gc_loop(store: SessionStore, interval_secs: u64) {
    let mut interval = tokio::time::interval(Duration::from_secs(interval_secs));
    let max_idle = chrono::Duration::seconds(SESSION_MAX_AGE_SECS);
    let anonymous_idle = chrono::Duration::seconds(ANONYMOUS_MAX_IDLE_SECS);

    loop {
        interval.tick().await;

        let count = store.prune(max_idle, anonymous_idle).await;
        if count > 0 {
            info!("Session GC: pruned {} idle sessions", count);
        }
    }
}

/// The current request's session. Inserted by the session layer.
#[derive(Clone)]
pub struct SessionHandle {
    pub id: String,
    inner: Arc<Mutex<Session>>,
    /// Already in the store.
    stored: bool,
    /// Set once the request reads the CSRF token or changes the session.
    touched: Arc<AtomicBool>,
}

impl SessionHandle {
    pub fn new(id: String, session: Session) -> Self {
        Self {
            id,
            inner: Arc::new(Mutex::new(session)),
            stored: false,
            touched: Arc::new(AtomicBool::new(false)),
        }
    }

    fn attach(id: String, inner: Arc<Mutex<Session>>) -> Self {
        Self { id, inner, stored: true, touched: Arc::new(AtomicBool::new(false)) }
    }

    fn lock(&self) -> MutexGuard<'_, Session> {
        self.inner.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn touch(&self) -> MutexGuard<'_, Session> {
        self.touched.store(true, Ordering::Relaxed);
        self.lock()
    }

    pub fn auth(&self) -> AuthState {
        self.lock().auth.clone()
    }

    pub fn set_auth(&self, auth: AuthState) {
        self.touch().auth = auth;
    }

    /// Mutate the auth state in place and return whatever `f` returns. The
    /// session stays locked while `f` runs.
    pub fn update_auth<T>(&self, f: impl FnOnce(&mut AuthState) -> T) -> T {
        f(&mut self.touch().auth)
    }

    pub fn pseudonym(&self) -> String {
        self.touch().pseudonym.clone()
    }

    pub fn csrf_token(&self) -> String {
        self.touch().csrf_token.clone()
    }

    pub fn flash(&self, flash: Flash) {
        self.touch().flashes.push(flash);
    }

    pub fn take_flashes(&self) -> Vec<Flash> {
        std::mem::take(&mut self.lock().flashes)
    }

    pub fn verify_csrf(&self, submitted: &str) -> Result<(), AppError> {
        if !submitted.is_empty() && self.lock().csrf_token == submitted {
            Ok(())
        } else {
            Err(AppError::Csrf)
        }
    }
}

impl<S: Send + Sync> FromRequestParts<S> for SessionHandle {
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<SessionHandle>()
            .cloned()
            .ok_or_else(|| AppError::Internal(anyhow::anyhow!("session layer not installed")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn month() -> chrono::Duration {
        chrono::Duration::seconds(SESSION_MAX_AGE_SECS)
    }

    fn day() -> chrono::Duration {
        chrono::Duration::seconds(ANONYMOUS_MAX_IDLE_SECS)
    }

    #[tokio::test]
    async fn unknown_cookie_starts_a_new_session() {
        let store = SessionStore::new();
        let handle = store.load_or_create(Some("bogus")).await;
        assert_ne!(handle.id, "bogus");
        assert_eq!(handle.auth(), AuthState::LoggedOut);
        assert_eq!(handle.csrf_token().len(), 64);
    }

    #[tokio::test]
    async fn untouched_sessions_are_not_stored() {
        let store = SessionStore::new();
        let handle = store.load_or_create(None).await;
        assert!(!store.commit(&handle).await);
        assert_eq!(store.len().await, 0);

        let handle = store.load_or_create(None).await;
        handle.csrf_token();
        assert!(store.commit(&handle).await);
        assert_eq!(store.len().await, 1);
    }

    #[tokio::test]
    async fn requests_on_one_cookie_share_state() {
        let store = SessionStore::new();
        let first = store.load_or_create(None).await;
        first.set_auth(AuthState::Verification {
            email: "ha82@hw.ac.uk".into(),
            code: 123456,
            attempts: 0,
        });
        store.commit(&first).await;

        let a = store.load_or_create(Some(&first.id)).await;
        let b = store.load_or_create(Some(&first.id)).await;
        for handle in [&a, &b, &a] {
            handle.update_auth(|auth| {
                if let AuthState::Verification { attempts, .. } = auth {
                    *attempts += 1;
                }
            });
        }

        let again = store.load_or_create(Some(&first.id)).await;
        assert!(matches!(again.auth(), AuthState::Verification { attempts: 3, .. }));
        assert_eq!(again.pseudonym(), first.pseudonym());
    }

    #[tokio::test]
    async fn prune_uses_a_shorter_limit_for_anonymous_sessions() {
        let store = SessionStore::new();

        let anonymous = store.load_or_create(None).await;
        anonymous.csrf_token();
        store.commit(&anonymous).await;

        let rep = store.load_or_create(None).await;
        rep.set_auth(AuthState::LoggedIn { email: "ha82@hw.ac.uk".into() });
        store.commit(&rep).await;

        let two_days_ago = Utc::now() - chrono::Duration::days(2);
        anonymous.lock().last_seen = two_days_ago;
        rep.lock().last_seen = two_days_ago;
        assert_eq!(store.prune(month(), day()).await, 1);
        assert_eq!(store.len().await, 1);

        rep.lock().last_seen = Utc::now() - chrono::Duration::days(40);
        assert_eq!(store.prune(month(), day()).await, 1);
        assert_eq!(store.len().await, 0);
    }

    #[test]
    fn csrf_must_match() {
        let handle = SessionHandle::new("id".into(), Session::fresh());
        let token = handle.csrf_token();
        assert!(handle.verify_csrf(&token).is_ok());
        assert!(handle.verify_csrf("").is_err());
        assert!(handle.verify_csrf("nope").is_err());
    }

    #[test]
    fn flashes_are_taken_once() {
        let handle = SessionHandle::new("id".into(), Session::fresh());
        handle.flash(Flash::info("hello"));
        assert_eq!(handle.take_flashes().len(), 1);
        assert!(handle.take_flashes().is_empty());
    }
}
