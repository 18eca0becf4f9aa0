//! Whole-tree backup and restore. A backup is one JSON blob per calendar
//! day; taking a second backup on the same day replaces the first.
//! Restore is the one transactional operation in the store: wipe the
//! content tree and the live-class schedule, reinsert every row from the
//! blob with its original ids and timestamps, commit.

use chrono::NaiveDate;

use super::{Store, StoreError};
use crate::models::{BackupInfo, ContentSnapshot};

impl Store {
    /// Upserts today's backup from the given snapshot.
    pub async fn create_backup(
        &self,
        snapshot: &ContentSnapshot,
    ) -> Result<NaiveDate, StoreError> {
        let blob = serde_json::to_value(snapshot)?;
        let client = self.client().await?;
        let row = client
            .query_one(
                "INSERT INTO system_backups (backup_date, backup_data) \
                 VALUES (CURRENT_DATE, $1) \
                 ON CONFLICT (backup_date) DO UPDATE \
                 SET backup_data = EXCLUDED.backup_data, created_at = now() \
                 RETURNING backup_date",
                &[&blob],
            )
            .await?;
        Ok(row.get(0))
    }

    /// Available backups, newest first.
    pub async fn list_backups(&self) -> Result<Vec<BackupInfo>, StoreError> {
        let client = self.client().await?;
        let rows = client
            .query(
                "SELECT id, backup_date, created_at FROM system_backups \
                 ORDER BY backup_date DESC",
                &[],
            )
            .await?;
        Ok(rows
            .iter()
            .map(|row| BackupInfo {
                id: row.get("id"),
                backup_date: row.get("backup_date"),
                created_at: row.get("created_at"),
            })
            .collect())
    }

    /// Replaces all content and live classes with the backup taken on
    /// `date`. Returns the restored snapshot so callers can re-broadcast
    /// it without another full reload.
    pub async fn restore_backup(&self, date: NaiveDate) -> Result<ContentSnapshot, StoreError> {
        let mut client = self.client().await?;

        let row = client
            .query_opt(
                "SELECT backup_data FROM system_backups WHERE backup_date = $1",
                &[&date],
            )
            .await?
            .ok_or(StoreError::NotFound("backup"))?;
        let snapshot: ContentSnapshot = serde_json::from_value(row.get("backup_data"))?;

        let tx = client.transaction().await?;

        // Batches cascade down to subjects, chapters and lectures.
        tx.execute("DELETE FROM batches", &[]).await?;
        tx.execute("DELETE FROM live_classes", &[]).await?;

        for batch in &snapshot.batches {
            tx.execute(
                "INSERT INTO batches \
                 (id, name, description, assigned_uploaders, created_at, updated_at) \
                 VALUES ($1, $2, $3, $4, $5, $6)",
                &[
                    &batch.id,
                    &batch.name,
                    &batch.description,
                    &batch.assigned_uploaders,
                    &batch.created_at,
                    &batch.updated_at,
                ],
            )
            .await?;

            for subject in &batch.subjects {
                tx.execute(
                    "INSERT INTO subjects (id, batch_id, name, color, created_at, updated_at) \
                     VALUES ($1, $2, $3, $4, $5, $6)",
                    &[
                        &subject.id,
                        &subject.batch_id,
                        &subject.name,
                        &subject.color,
                        &subject.created_at,
                        &subject.updated_at,
                    ],
                )
                .await?;

                for chapter in &subject.chapters {
                    tx.execute(
                        "INSERT INTO chapters \
                         (id, subject_id, title, order_index, created_at, updated_at) \
                         VALUES ($1, $2, $3, $4, $5, $6)",
                        &[
                            &chapter.id,
                            &chapter.subject_id,
                            &chapter.title,
                            &chapter.order_index,
                            &chapter.created_at,
                            &chapter.updated_at,
                        ],
                    )
                    .await?;

                    for lecture in &chapter.lectures {
                        tx.execute(
                            "INSERT INTO lectures \
                             (id, chapter_id, title, video_url, video_type, notes_url, \
                              dpp_url, uploaded_by, created_at, updated_at) \
                             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)",
                            &[
                                &lecture.id,
                                &lecture.chapter_id,
                                &lecture.title,
                                &lecture.video_url,
                                &lecture.video_type.as_str(),
                                &lecture.notes_url,
                                &lecture.dpp_url,
                                &lecture.uploaded_by,
                                &lecture.created_at,
                                &lecture.updated_at,
                            ],
                        )
                        .await?;
                    }
                }
            }
        }

        for live in &snapshot.live_classes {
            tx.execute(
                "INSERT INTO live_classes \
                 (id, batch_id, subject_id, chapter_id, title, live_url, scheduled_at, \
                  status, created_at, updated_at) \
                 VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)",
                &[
                    &live.id,
                    &live.batch_id,
                    &live.subject_id,
                    &live.chapter_id,
                    &live.title,
                    &live.live_url,
                    &live.scheduled_at,
                    &live.status.as_str(),
                    &live.created_at,
                    &live.updated_at,
                ],
            )
            .await?;
        }

        tx.commit().await?;
        Ok(snapshot)
    }
}
