// src/db/notification_repo.rs

use sqlx::PgPool;
use uuid::Uuid;

use crate::{
    common::error::AppError,
    models::notification::{Notification, NotificationChannel},
};

#[derive(Clone)]
pub struct NotificationRepository {
    pool: PgPool,
}

impl NotificationRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn insert(
        &self,
        user_id: Uuid,
        channel: NotificationChannel,
        subject: &str,
        body: &str,
    ) -> Result<Notification, AppError> {
        let notification = sqlx::query_as::<_, Notification>(
            r#"
            INSERT INTO notifications (user_id, channel, subject, body, sent_at)
            VALUES ($1, $2, $3, $4, NOW())
            RETURNING *
            "#,
        )
            .bind(user_id)
            .bind(channel)
            .bind(subject)
            .bind(body)
            .fetch_one(&self.pool)
            .await?;

        Ok(notification)
    }

    pub async fn list_by_user(&self, user_id: Uuid) -> Result<Vec<Notification>, AppError> {
        let notifications = sqlx::query_as::<_, Notification>(
            "SELECT * FROM notifications WHERE user_id = $1 ORDER BY created_at DESC LIMIT 100",
        )
            .bind(user_id)
            .fetch_all(&self.pool)
            .await?;
        Ok(notifications)
    }
}
