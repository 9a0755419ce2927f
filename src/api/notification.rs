use crate::auth::auth::AuthUser;
use crate::error::ApiError;
use crate::model::notification::Notification;
use actix_web::{HttpResponse, web};
use serde::Deserialize;
use serde_json::json;
use sqlx::MySqlPool;
use utoipa::{IntoParams, ToSchema};

#[derive(Deserialize, ToSchema)]
pub struct CreateNotification {
    #[schema(example = 5)]
    pub user_id: u64,
    #[schema(example = "Leave approved")]
    pub title: String,
    #[schema(example = "Your annual leave from 2026-01-01 was approved.")]
    pub body: Option<String>,
}

#[derive(Deserialize, IntoParams, ToSchema)]
pub struct NotificationFilter {
    /// Only unread notifications when true
    pub unread: Option<bool>,
}

#[utoipa::path(
    post,
    path = "/api/v1/notifications",
    request_body = CreateNotification,
    responses(
        (status = 200, description = "Notification created", body = Notification),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden")
    ),
    security(("bearer_auth" = [])),
    tag = "Notification"
)]
pub async fn create_notification(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    payload: web::Json<CreateNotification>,
) -> Result<HttpResponse, ApiError> {
    auth.require_hr_or_admin()?;

    if payload.title.trim().is_empty() {
        return Err(ApiError::Validation("Notification title must not be empty".into()));
    }

    let result = sqlx::query("INSERT INTO notifications (user_id, title, body) VALUES (?, ?, ?)")
        .bind(payload.user_id)
        .bind(payload.title.trim())
        .bind(&payload.body)
        .execute(pool.get_ref())
        .await?;

    let notification = sqlx::query_as::<_, Notification>(
        "SELECT id, user_id, title, body, is_read, created_at FROM notifications WHERE id = ?",
    )
    .bind(result.last_insert_id())
    .fetch_one(pool.get_ref())
    .await?;

    Ok(HttpResponse::Ok().json(notification))
}

/// List the caller's own notifications, newest first.
#[utoipa::path(
    get,
    path = "/api/v1/notifications",
    params(NotificationFilter),
    responses(
        (status = 200, description = "Caller's notifications", body = [Notification]),
        (status = 401, description = "Unauthorized")
    ),
    security(("bearer_auth" = [])),
    tag = "Notification"
)]
pub async fn list_notifications(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    query: web::Query<NotificationFilter>,
) -> Result<HttpResponse, ApiError> {
    let sql = if query.unread.unwrap_or(false) {
        "SELECT id, user_id, title, body, is_read, created_at FROM notifications \
         WHERE user_id = ? AND is_read = FALSE ORDER BY created_at DESC LIMIT 100"
    } else {
        "SELECT id, user_id, title, body, is_read, created_at FROM notifications \
         WHERE user_id = ? ORDER BY created_at DESC LIMIT 100"
    };

    let notifications = sqlx::query_as::<_, Notification>(sql)
        .bind(auth.user_id)
        .fetch_all(pool.get_ref())
        .await?;

    Ok(HttpResponse::Ok().json(notifications))
}

/// Mark one of the caller's notifications as read.
#[utoipa::path(
    put,
    path = "/api/v1/notifications/{notification_id}/read",
    params(("notification_id", Path, description = "Notification ID")),
    responses(
        (status = 200, description = "Notification marked read"),
        (status = 404, description = "Notification not found"),
        (status = 401, description = "Unauthorized")
    ),
    security(("bearer_auth" = [])),
    tag = "Notification"
)]
pub async fn mark_read(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    path: web::Path<u64>,
) -> Result<HttpResponse, ApiError> {
    // Ownership is part of the WHERE clause: you can't read someone else's.
    let result =
        sqlx::query("UPDATE notifications SET is_read = TRUE WHERE id = ? AND user_id = ?")
            .bind(path.into_inner())
            .bind(auth.user_id)
            .execute(pool.get_ref())
            .await?;

    if result.rows_affected() == 0 {
        return Err(ApiError::NotFound("Notification"));
    }

    Ok(HttpResponse::Ok().json(json!({
        "message": "Notification marked read"
    })))
}
