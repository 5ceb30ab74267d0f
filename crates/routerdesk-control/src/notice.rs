//! User-visible notices (the console's toasts)

use chrono::{DateTime, Utc};
use dashmap::DashMap;
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;
use tracing::debug;
use uuid::Uuid;

#[cfg(feature = "openapi")]
use utoipa::ToSchema;

/// Notices kept per user before the oldest are dropped
pub const DEFAULT_NOTICE_CAPACITY: usize = 64;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(ToSchema))]
#[serde(rename_all = "lowercase")]
pub enum NoticeLevel {
    Success,
    Info,
    Warning,
    Error,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(ToSchema))]
pub struct Notice {
    pub level: NoticeLevel,
    pub message: String,
    pub at: DateTime<Utc>,
}

/// Bounded per-user notice queues
pub struct NoticeBoard {
    queues: DashMap<Uuid, VecDeque<Notice>>,
    capacity: usize,
}

impl NoticeBoard {
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_NOTICE_CAPACITY)
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            queues: DashMap::new(),
            capacity: capacity.max(1),
        }
    }

    pub fn push(&self, user_id: Uuid, level: NoticeLevel, message: impl Into<String>) {
        let message = message.into();
        debug!(%user_id, ?level, %message, "Notice");

        let mut queue = self.queues.entry(user_id).or_default();
        if queue.len() == self.capacity {
            queue.pop_front();
        }
        queue.push_back(Notice {
            level,
            message,
            at: Utc::now(),
        });
    }

    pub fn success(&self, user_id: Uuid, message: impl Into<String>) {
        self.push(user_id, NoticeLevel::Success, message);
    }

    pub fn info(&self, user_id: Uuid, message: impl Into<String>) {
        self.push(user_id, NoticeLevel::Info, message);
    }

    pub fn warning(&self, user_id: Uuid, message: impl Into<String>) {
        self.push(user_id, NoticeLevel::Warning, message);
    }

    pub fn error(&self, user_id: Uuid, message: impl Into<String>) {
        self.push(user_id, NoticeLevel::Error, message);
    }

    /// Take every pending notice for a user, oldest first
    pub fn drain(&self, user_id: Uuid) -> Vec<Notice> {
        self.queues
            .remove(&user_id)
            .map(|(_, queue)| queue.into())
            .unwrap_or_default()
    }

    /// Pending notices without consuming them
    pub fn pending(&self, user_id: Uuid) -> Vec<Notice> {
        self.queues
            .get(&user_id)
            .map(|queue| queue.iter().cloned().collect())
            .unwrap_or_default()
    }
}

impl Default for NoticeBoard {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_drain_returns_in_order_and_empties() {
        let board = NoticeBoard::new();
        let user = Uuid::new_v4();

        board.success(user, "first");
        board.error(user, "second");

        let notices = board.drain(user);
        assert_eq!(notices.len(), 2);
        assert_eq!(notices[0].message, "first");
        assert_eq!(notices[1].level, NoticeLevel::Error);
        assert!(board.drain(user).is_empty());
    }

    #[test]
    fn test_notices_are_per_user() {
        let board = NoticeBoard::new();
        let alice = Uuid::new_v4();
        let bob = Uuid::new_v4();

        board.info(alice, "for alice");

        assert!(board.pending(bob).is_empty());
        assert_eq!(board.pending(alice).len(), 1);
    }

    #[test]
    fn test_capacity_drops_oldest() {
        let board = NoticeBoard::with_capacity(2);
        let user = Uuid::new_v4();

        board.warning(user, "a");
        board.warning(user, "b");
        board.warning(user, "c");

        let messages: Vec<_> = board.drain(user).into_iter().map(|n| n.message).collect();
        assert_eq!(messages, vec!["b", "c"]);
    }
}
