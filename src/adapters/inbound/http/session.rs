use std::{collections::HashMap, sync::Arc, time::Duration};
use tokio::{
    sync::{Mutex, RwLock},
    task::JoinHandle,
    time::Instant,
};
use tracing::{debug, info};
use uuid::Uuid;

use crate::{domain::models::OwnerIdentity, services::ListingDraft};

/// A draft shared between requests; the mutex serializes operations on it
pub type SharedDraft = Arc<Mutex<ListingDraft>>;

/// How long an untouched draft session is kept by default
pub const DEFAULT_DRAFT_IDLE_TIMEOUT: Duration = Duration::from_secs(30 * 60);

struct DraftSession {
    owner: OwnerIdentity,
    draft: SharedDraft,
    last_access: Instant,
}

/// Open draft sessions, keyed by draft id
#[derive(Clone, Default)]
pub struct DraftSessions {
    sessions: Arc<RwLock<HashMap<Uuid, DraftSession>>>,
}

impl DraftSessions {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn open(&self, draft: ListingDraft) -> (Uuid, SharedDraft) {
        let id = Uuid::new_v4();
        let owner = draft.owner().clone();
        let shared = Arc::new(Mutex::new(draft));
        let session = DraftSession {
            owner,
            draft: Arc::clone(&shared),
            last_access: Instant::now(),
        };
        self.sessions.write().await.insert(id, session);
        (id, shared)
    }

    /// The draft, if it exists and was opened by `owner`. Counts as activity.
    pub async fn get(&self, id: Uuid, owner: &OwnerIdentity) -> Option<SharedDraft> {
        let mut sessions = self.sessions.write().await;
        let session = sessions
            .get_mut(&id)
            .filter(|session| &session.owner == owner)?;
        session.last_access = Instant::now();
        Some(Arc::clone(&session.draft))
    }

    /// Remove a session; its draft is dropped once no request holds it
    pub async fn close(&self, id: Uuid) -> bool {
        self.sessions.write().await.remove(&id).is_some()
    }

    /// Close every session untouched for at least `idle`; returns how many went away.
    ///
    /// Dropping a closed draft releases its previews.
    pub async fn sweep(&self, idle: Duration) -> usize {
        let mut sessions = self.sessions.write().await;
        let before = sessions.len();
        sessions.retain(|id, session| {
            let keep = session.last_access.elapsed() < idle;
            if !keep {
                debug!(draft_id = %id, owner = %session.owner, "Expiring idle draft");
            }
            keep
        });
        before - sessions.len()
    }

    /// Sweep idle sessions in the background until the runtime shuts down
    pub fn spawn_sweeper(&self, idle: Duration) -> JoinHandle<()> {
        let sessions = self.clone();
        let period = (idle / 4).max(Duration::from_secs(1));

        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(period);
            loop {
                ticker.tick().await;
                let expired = sessions.sweep(idle).await;
                if expired > 0 {
                    info!(expired, "Closed idle draft sessions");
                }
            }
        })
    }

    pub async fn len(&self) -> usize {
        self.sessions.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.sessions.read().await.is_empty()
    }
}
