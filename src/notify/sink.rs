use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

// ============================================================================
// Notification Seams
// ============================================================================
//
// The delivery pipeline (email, web push, mobile) is an external
// collaborator; this crate only enqueues records and pushes best-effort
// realtime events to connected vendor sessions. Both are append-only and
// need no mutual exclusion.
//
// ============================================================================

#[derive(Debug, thiserror::Error)]
pub enum NotifyError {
    #[error("notification sink failure: {0}")]
    Sink(String),

    #[error("realtime push failure: {0}")]
    Push(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum NotificationKind {
    LowStock,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Notification {
    pub id: Uuid,
    pub user_id: Uuid,
    pub kind: NotificationKind,
    pub payload: serde_json::Value,
    pub created_at: DateTime<Utc>,
}

#[async_trait]
pub trait NotificationSink: Send + Sync {
    /// Fire-and-forget enqueue; callers log failures and move on.
    async fn enqueue(
        &self,
        user_id: Uuid,
        kind: NotificationKind,
        payload: serde_json::Value,
    ) -> Result<(), NotifyError>;
}

#[async_trait]
pub trait RealtimePush: Send + Sync {
    /// Best-effort push to the vendor's connected session, if any.
    async fn push_to_vendor(
        &self,
        vendor_id: Uuid,
        event: serde_json::Value,
    ) -> Result<(), NotifyError>;
}

// ============================================================================
// In-Memory Implementations
// ============================================================================

#[derive(Clone, Default)]
pub struct InMemorySink {
    notifications: Arc<RwLock<Vec<Notification>>>,
}

impl InMemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn for_user(&self, user_id: Uuid) -> Vec<Notification> {
        self.notifications
            .read()
            .expect("lock poisoned")
            .iter()
            .filter(|n| n.user_id == user_id)
            .cloned()
            .collect()
    }
}

#[async_trait]
impl NotificationSink for InMemorySink {
    async fn enqueue(
        &self,
        user_id: Uuid,
        kind: NotificationKind,
        payload: serde_json::Value,
    ) -> Result<(), NotifyError> {
        let mut notifications = self.notifications.write().expect("lock poisoned");
        notifications.push(Notification {
            id: Uuid::new_v4(),
            user_id,
            kind,
            payload,
            created_at: Utc::now(),
        });
        Ok(())
    }
}

/// Tracks connected vendor sessions; pushes to absent sessions are
/// silently dropped, as the realtime channel is best-effort.
#[derive(Clone, Default)]
pub struct InMemoryPush {
    sessions: Arc<RwLock<HashMap<Uuid, Vec<serde_json::Value>>>>,
}

impl InMemoryPush {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn connect(&self, vendor_id: Uuid) {
        self.sessions
            .write()
            .expect("lock poisoned")
            .entry(vendor_id)
            .or_default();
    }

    pub fn events_for(&self, vendor_id: Uuid) -> Vec<serde_json::Value> {
        self.sessions
            .read()
            .expect("lock poisoned")
            .get(&vendor_id)
            .cloned()
            .unwrap_or_default()
    }
}

#[async_trait]
impl RealtimePush for InMemoryPush {
    async fn push_to_vendor(
        &self,
        vendor_id: Uuid,
        event: serde_json::Value,
    ) -> Result<(), NotifyError> {
        let mut sessions = self.sessions.write().expect("lock poisoned");
        if let Some(events) = sessions.get_mut(&vendor_id) {
            events.push(event);
        }
        Ok(())
    }
}
