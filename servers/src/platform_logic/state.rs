use std::sync::Arc;

use tokio::sync::{Mutex, broadcast};

use lib_platform::access::parse_cookie_header;
use lib_platform::models::{ContentSnapshot, UserProfile};
use lib_platform::store::{Store, StoreError};

use crate::platform_logic::config::Config;

/// Session cookie carrying the signed-in administrator's email. Resolved
/// against `user_profiles` on each admin request; UI-level gating only.
pub const SESSION_COOKIE: &str = "session_email";

/// Application-wide state: the store handle, the server configuration and
/// the current content snapshot. Cloning is cheap; all clones share the
/// same containers.
///
/// Consistency model is refetch-after-write: every mutation re-reads the
/// full tree and broadcasts the fresh snapshot to all subscribers. There
/// is no partial or row-level invalidation.
#[derive(Clone)]
pub struct AppState {
    store: Store,
    config: Arc<Config>,
    // Current snapshot of the whole content tree plus live classes
    content: Arc<Mutex<Arc<ContentSnapshot>>>,
    // Channel broadcasting every refreshed snapshot
    pub snapshot_tx: broadcast::Sender<Arc<ContentSnapshot>>,
}

impl AppState {
    pub fn new(store: Store, config: Config) -> Self {
        let (snapshot_tx, _) = broadcast::channel(16);
        Self {
            store,
            config: Arc::new(config),
            content: Arc::new(Mutex::new(Arc::new(ContentSnapshot::default()))),
            snapshot_tx,
        }
    }

    pub fn store(&self) -> &Store {
        &self.store
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// The snapshot the platform currently serves.
    pub async fn snapshot(&self) -> Arc<ContentSnapshot> {
        self.content.lock().await.clone()
    }

    /// Re-reads the full content tree and the live-class schedule, swaps
    /// the current snapshot and broadcasts it.
    pub async fn reload(&self) -> Result<Arc<ContentSnapshot>, StoreError> {
        let batches = self.store.load_content_tree().await?;
        let live_classes = self.store.list_live_classes().await?;
        let snapshot = Arc::new(ContentSnapshot {
            batches,
            live_classes,
        });
        self.install(snapshot.clone()).await;
        Ok(snapshot)
    }

    /// Installs a snapshot obtained out of band (e.g. returned by a backup
    /// restore) and broadcasts it.
    pub async fn install(&self, snapshot: Arc<ContentSnapshot>) {
        *self.content.lock().await = snapshot.clone();
        // Send fails only when nobody is subscribed, which is fine.
        let _ = self.snapshot_tx.send(snapshot);
    }

    /// Initial hydration at startup. A failure is logged and the empty
    /// snapshot stays in place; the server still comes up.
    pub async fn hydrate(&self) {
        match self.reload().await {
            Ok(snapshot) => {
                tracing::info!(
                    "hydrated content state: {} batches, {} live classes",
                    snapshot.batches.len(),
                    snapshot.live_classes.len()
                );
            }
            Err(e) => {
                tracing::warn!("initial hydration failed, serving empty snapshot: {}", e);
            }
        }
    }

    /// Resolves the acting profile from the session cookie, if any.
    pub async fn identity_from_cookies(
        &self,
        cookie_header: &str,
    ) -> Result<Option<UserProfile>, StoreError> {
        let cookies = parse_cookie_header(cookie_header);
        match cookies.get(SESSION_COOKIE) {
            Some(email) => self.store.find_profile_by_email(email).await,
            None => Ok(None),
        }
    }
}
