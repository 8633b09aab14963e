//! Notification endpoints - the in-app inbox

use axum::{
    extract::{Extension, Path, Query},
    Json,
};
use serde::Deserialize;

use crate::common::NotificationId;
use crate::domains::notifications::{list_notifications, mark_notification_read, Notification};
use crate::server::app::AppState;
use crate::server::error::ApiError;
use crate::server::middleware::{require_user, AuthUser};

#[derive(Debug, Deserialize)]
pub struct NotificationsQuery {
    #[serde(default)]
    pub unread_only: bool,
    pub limit: Option<i64>,
}

/// GET /notifications
pub async fn list_notifications_handler(
    Extension(state): Extension<AppState>,
    auth: Option<Extension<AuthUser>>,
    Query(query): Query<NotificationsQuery>,
) -> Result<Json<Vec<Notification>>, ApiError> {
    let user = require_user(auth)?;

    let notifications =
        list_notifications(user.user_id, query.unread_only, query.limit, &state.deps).await?;

    Ok(Json(notifications))
}

/// POST /notifications/:id/read
pub async fn mark_read_handler(
    Extension(state): Extension<AppState>,
    auth: Option<Extension<AuthUser>>,
    Path(notification_id): Path<NotificationId>,
) -> Result<Json<Notification>, ApiError> {
    let user = require_user(auth)?;
    let notification = mark_notification_read(user.user_id, notification_id, &state.deps).await?;
    Ok(Json(notification))
}
