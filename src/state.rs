use crate::config::AppConfig;
use crate::domain::catalog::Catalog;
use crate::domain::session::QuizSession;
use crate::report::font::FontCache;
use chrono::{DateTime, Duration, Utc};
use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::sync::RwLock;
use uuid::Uuid;

pub struct AppState {
    pub catalog: Arc<Catalog>,
    pub font: FontCache,
    pub results_dir: PathBuf,
    pub session_ttl: Duration,
    pub sessions: Arc<RwLock<HashMap<Uuid, QuizSession>>>, // session_id -> QuizSession
}

impl AppState {
    pub fn new(catalog: Catalog, config: &AppConfig) -> Self {
        Self {
            catalog: Arc::new(catalog),
            font: FontCache::new(config.font_path.clone()),
            results_dir: config.results_dir.clone(),
            session_ttl: Duration::hours(i64::from(config.session_ttl_hours)),
            sessions: Arc::new(RwLock::new(HashMap::new())),
        }
    }

    /// Drops sessions idle for longer than `session_ttl`. Returns how many were removed.
    pub async fn evict_idle_sessions(&self, now: DateTime<Utc>) -> usize {
        let mut sessions = self.sessions.write().await;
        let before = sessions.len();
        sessions.retain(|_, session| now - session.last_active < self.session_ttl);
        before - sessions.len()
    }
}

pub type SharedState = Arc<AppState>;
