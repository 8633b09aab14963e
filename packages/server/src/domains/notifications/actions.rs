//! Notification query and update actions

use super::models::notification::Notification;
use crate::common::{NotificationId, UserId};
use crate::domains::dispatch::error::DispatchError;
use crate::kernel::ServerDeps;

const DEFAULT_PAGE: i64 = 50;
const MAX_PAGE: i64 = 100;

/// List the account's inbox, newest first.
pub async fn list_notifications(
    recipient: UserId,
    unread_only: bool,
    limit: Option<i64>,
    deps: &ServerDeps,
) -> Result<Vec<Notification>, DispatchError> {
    let limit = limit.unwrap_or(DEFAULT_PAGE);
    if !(1..=MAX_PAGE).contains(&limit) {
        return Err(DispatchError::Validation(format!(
            "limit must be between 1 and {}",
            MAX_PAGE
        )));
    }

    let notifications = deps
        .directory
        .notifications_for(recipient, unread_only, limit)
        .await?;
    Ok(notifications)
}

/// Mark one of the account's notifications as read.
///
/// Another account's notification id reads as missing.
pub async fn mark_notification_read(
    recipient: UserId,
    notification_id: NotificationId,
    deps: &ServerDeps,
) -> Result<Notification, DispatchError> {
    deps.directory
        .mark_notification_read(recipient, notification_id)
        .await?
        .ok_or(DispatchError::NotFound("notification"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::kernel::TestDependencies;

    #[tokio::test]
    async fn list_rejects_out_of_range_limit() {
        let deps = TestDependencies::new().into_deps();

        let result = list_notifications(UserId::new(), false, Some(0), &deps).await;
        assert!(matches!(result, Err(DispatchError::Validation(_))));

        let result = list_notifications(UserId::new(), false, Some(101), &deps).await;
        assert!(matches!(result, Err(DispatchError::Validation(_))));
    }

    #[tokio::test]
    async fn mark_read_misses_for_other_accounts() {
        let deps = TestDependencies::new().into_deps();
        let owner = UserId::new();
        let stranger = UserId::new();

        let note = Notification::new(owner, "Ambulance Request", "body", "dispatch");
        let note = deps.directory.insert_notification(&note).await.unwrap();

        let result = mark_notification_read(stranger, note.id, &deps).await;
        assert!(matches!(result, Err(DispatchError::NotFound(_))));

        let marked = mark_notification_read(owner, note.id, &deps).await.unwrap();
        assert!(marked.is_read);
    }
}
