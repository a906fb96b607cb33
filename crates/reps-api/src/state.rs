use std::path::PathBuf;
use std::sync::{Arc, RwLock};

use tracing::error;

use reps_db::Database;
use reps_types::config::Configuration;

use crate::error::AppError;
use crate::mailer::Mailer;
use crate::session::SessionStore;

pub type AppState = Arc<AppStateInner>;

pub struct AppStateInner {
    pub db: Database,
    config: RwLock<Arc<Configuration>>,
    /// Where the config editor writes accepted changes.
    pub config_path: PathBuf,
    pub sessions: SessionStore,
    pub mailer: Arc<dyn Mailer>,
}

impl AppStateInner {
    pub fn new(
        db: Database,
        config: Configuration,
        config_path: PathBuf,
        sessions: SessionStore,
        mailer: Arc<dyn Mailer>,
    ) -> Self {
        Self {
            db,
            config: RwLock::new(Arc::new(config)),
            config_path,
            sessions,
            mailer,
        }
    }

    /// Snapshot of the live configuration. Callers keep a consistent view
    /// even if an editor swaps it mid-request.
    pub fn config(&self) -> Arc<Configuration> {
        match self.config.read() {
            Ok(guard) => Arc::clone(&guard),
            Err(poisoned) => Arc::clone(&poisoned.into_inner()),
        }
    }

    pub fn replace_config(&self, next: Configuration) {
        let next = Arc::new(next);
        match self.config.write() {
            Ok(mut guard) => *guard = next,
            Err(poisoned) => *poisoned.into_inner() = next,
        }
    }
}

/// Run a database call on the blocking pool.
pub async fn blocking<F, T>(state: &AppState, f: F) -> Result<T, AppError>
where
    F: FnOnce(&Database) -> anyhow::Result<T> + Send + 'static,
    T: Send + 'static,
{
    let state = Arc::clone(state);
    tokio::task::spawn_blocking(move || f(&state.db))
        .await
        .map_err(|e| {
            error!("spawn_blocking join error: {}", e);
            AppError::Internal(anyhow::anyhow!("blocking task failed: {e}"))
        })?
        .map_err(AppError::Internal)
}
