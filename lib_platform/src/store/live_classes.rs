//! Live-class schedule operations.

use tokio_postgres::Row;
use uuid::Uuid;

use super::{Store, StoreError};
use crate::models::{LiveClass, LiveStatus, NewLiveClass};

fn live_class_from_row(row: &Row) -> LiveClass {
    LiveClass {
        id: row.get("id"),
        batch_id: row.get("batch_id"),
        subject_id: row.get("subject_id"),
        chapter_id: row.get("chapter_id"),
        title: row.get("title"),
        live_url: row.get("live_url"),
        scheduled_at: row.get("scheduled_at"),
        status: LiveStatus::from_db(row.get("status")),
        created_at: row.get("created_at"),
        updated_at: row.get("updated_at"),
    }
}

impl Store {
    /// All live classes, soonest first.
    pub async fn list_live_classes(&self) -> Result<Vec<LiveClass>, StoreError> {
        let client = self.client().await?;
        let rows = client
            .query(
                "SELECT id, batch_id, subject_id, chapter_id, title, live_url, scheduled_at, \
                 status, created_at, updated_at FROM live_classes ORDER BY scheduled_at ASC",
                &[],
            )
            .await?;
        Ok(rows.iter().map(live_class_from_row).collect())
    }

    pub async fn create_live_class(&self, live: &NewLiveClass) -> Result<Uuid, StoreError> {
        let client = self.client().await?;
        let row = client
            .query_one(
                "INSERT INTO live_classes \
                 (batch_id, subject_id, chapter_id, title, live_url, scheduled_at, status) \
                 VALUES ($1, $2, $3, $4, $5, $6, $7) RETURNING id",
                &[
                    &live.batch_id,
                    &live.subject_id,
                    &live.chapter_id,
                    &live.title,
                    &live.live_url,
                    &live.scheduled_at,
                    &live.status.as_str(),
                ],
            )
            .await?;
        Ok(row.get(0))
    }

    pub async fn update_live_class_status(
        &self,
        id: Uuid,
        status: LiveStatus,
    ) -> Result<(), StoreError> {
        let client = self.client().await?;
        let updated = client
            .execute(
                "UPDATE live_classes SET status = $2, updated_at = now() WHERE id = $1",
                &[&id, &status.as_str()],
            )
            .await?;
        if updated == 0 {
            return Err(StoreError::NotFound("live class"));
        }
        Ok(())
    }

    pub async fn delete_live_class(&self, id: Uuid) -> Result<(), StoreError> {
        let client = self.client().await?;
        let deleted = client
            .execute("DELETE FROM live_classes WHERE id = $1", &[&id])
            .await?;
        if deleted == 0 {
            return Err(StoreError::NotFound("live class"));
        }
        Ok(())
    }
}
