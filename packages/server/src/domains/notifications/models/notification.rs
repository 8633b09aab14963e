use anyhow::Result;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;

use crate::common::{NotificationId, UserId};

/// An in-app inbox entry for a user.
///
/// Delivery to external channels (email) is best-effort and separate; the
/// inbox row is the durable record.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Notification {
    pub id: NotificationId,
    pub recipient_id: UserId,
    pub title: String,
    pub body: String,
    pub category: String,
    pub is_read: bool,
    pub created_at: DateTime<Utc>,
}

impl Notification {
    pub fn new(recipient_id: UserId, title: &str, body: &str, category: &str) -> Self {
        Self {
            id: NotificationId::new(),
            recipient_id,
            title: title.to_string(),
            body: body.to_string(),
            category: category.to_string(),
            is_read: false,
            created_at: Utc::now(),
        }
    }
}

// =============================================================================
// SQL Queries - ALL queries must be in models/
// =============================================================================

impl Notification {
    /// Insert a new notification
    pub async fn insert(&self, pool: &PgPool) -> Result<Self> {
        sqlx::query_as::<_, Notification>(
            r#"
            INSERT INTO notifications (id, recipient_id, title, body, category, is_read, created_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            RETURNING *
            "#,
        )
        .bind(self.id)
        .bind(self.recipient_id)
        .bind(&self.title)
        .bind(&self.body)
        .bind(&self.category)
        .bind(self.is_read)
        .bind(self.created_at)
        .fetch_one(pool)
        .await
        .map_err(Into::into)
    }

    /// A user's notifications, newest first
    pub async fn find_for_recipient(
        recipient_id: UserId,
        unread_only: bool,
        limit: i64,
        pool: &PgPool,
    ) -> Result<Vec<Self>> {
        sqlx::query_as::<_, Notification>(
            r#"
            SELECT * FROM notifications
            WHERE recipient_id = $1
              AND (NOT $2 OR is_read = false)
            ORDER BY created_at DESC
            LIMIT $3
            "#,
        )
        .bind(recipient_id)
        .bind(unread_only)
        .bind(limit)
        .fetch_all(pool)
        .await
        .map_err(Into::into)
    }

    /// Mark one of the recipient's notifications read.
    ///
    /// The recipient check is part of the WHERE clause, so a user cannot mark
    /// someone else's notification; that case reads as not found.
    pub async fn mark_read(
        recipient_id: UserId,
        id: NotificationId,
        pool: &PgPool,
    ) -> Result<Option<Self>> {
        sqlx::query_as::<_, Notification>(
            r#"
            UPDATE notifications
            SET is_read = true
            WHERE id = $1 AND recipient_id = $2
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(recipient_id)
        .fetch_optional(pool)
        .await
        .map_err(Into::into)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_notification_starts_unread() {
        let notification = Notification::new(
            UserId::new(),
            "Ambulance Request",
            "A patient requested an ambulance.",
            "dispatch",
        );
        assert!(!notification.is_read);
        assert_eq!(notification.category, "dispatch");
    }
}
