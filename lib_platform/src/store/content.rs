//! Content-tree operations: batches, subjects, chapters and lectures.
//! The tree is always read whole; batches are ordered newest first,
//! chapters by their `order_index`.

use std::collections::HashMap;

use tokio_postgres::Row;
use uuid::Uuid;

use super::{Store, StoreError};
use crate::models::{Batch, Chapter, Lecture, NewLecture, Subject, VideoType};

fn lecture_from_row(row: &Row) -> Lecture {
    Lecture {
        id: row.get("id"),
        chapter_id: row.get("chapter_id"),
        title: row.get("title"),
        video_url: row.get("video_url"),
        video_type: VideoType::from_db(row.get("video_type")),
        notes_url: row.get("notes_url"),
        dpp_url: row.get("dpp_url"),
        uploaded_by: row.get("uploaded_by"),
        created_at: row.get("created_at"),
        updated_at: row.get("updated_at"),
    }
}

impl Store {
    /// Loads the full batch → subject → chapter → lecture tree. Four flat
    /// queries assembled in memory; no N+1 round trips.
    pub async fn load_content_tree(&self) -> Result<Vec<Batch>, StoreError> {
        let client = self.client().await?;

        let lecture_rows = client
            .query(
                "SELECT id, chapter_id, title, video_url, video_type, notes_url, dpp_url, \
                 uploaded_by, created_at, updated_at FROM lectures ORDER BY created_at ASC",
                &[],
            )
            .await?;
        let mut lectures_by_chapter: HashMap<Uuid, Vec<Lecture>> = HashMap::new();
        for row in &lecture_rows {
            let lecture = lecture_from_row(row);
            lectures_by_chapter
                .entry(lecture.chapter_id)
                .or_default()
                .push(lecture);
        }

        let chapter_rows = client
            .query(
                "SELECT id, subject_id, title, order_index, created_at, updated_at \
                 FROM chapters ORDER BY order_index ASC, created_at ASC",
                &[],
            )
            .await?;
        let mut chapters_by_subject: HashMap<Uuid, Vec<Chapter>> = HashMap::new();
        for row in &chapter_rows {
            let id: Uuid = row.get("id");
            let chapter = Chapter {
                id,
                subject_id: row.get("subject_id"),
                title: row.get("title"),
                order_index: row.get("order_index"),
                lectures: lectures_by_chapter.remove(&id).unwrap_or_default(),
                created_at: row.get("created_at"),
                updated_at: row.get("updated_at"),
            };
            chapters_by_subject
                .entry(chapter.subject_id)
                .or_default()
                .push(chapter);
        }

        let subject_rows = client
            .query(
                "SELECT id, batch_id, name, color, created_at, updated_at \
                 FROM subjects ORDER BY created_at ASC",
                &[],
            )
            .await?;
        let mut subjects_by_batch: HashMap<Uuid, Vec<Subject>> = HashMap::new();
        for row in &subject_rows {
            let id: Uuid = row.get("id");
            let subject = Subject {
                id,
                batch_id: row.get("batch_id"),
                name: row.get("name"),
                color: row.get("color"),
                chapters: chapters_by_subject.remove(&id).unwrap_or_default(),
                created_at: row.get("created_at"),
                updated_at: row.get("updated_at"),
            };
            subjects_by_batch
                .entry(subject.batch_id)
                .or_default()
                .push(subject);
        }

        let batch_rows = client
            .query(
                "SELECT id, name, description, assigned_uploaders, created_at, updated_at \
                 FROM batches ORDER BY created_at DESC",
                &[],
            )
            .await?;
        let batches = batch_rows
            .iter()
            .map(|row| {
                let id: Uuid = row.get("id");
                Batch {
                    id,
                    name: row.get("name"),
                    description: row.get("description"),
                    assigned_uploaders: row.get("assigned_uploaders"),
                    subjects: subjects_by_batch.remove(&id).unwrap_or_default(),
                    created_at: row.get("created_at"),
                    updated_at: row.get("updated_at"),
                }
            })
            .collect();

        Ok(batches)
    }

    pub async fn create_batch(
        &self,
        name: &str,
        description: Option<&str>,
    ) -> Result<Uuid, StoreError> {
        let client = self.client().await?;
        let row = client
            .query_one(
                "INSERT INTO batches (name, description) VALUES ($1, $2) RETURNING id",
                &[&name, &description],
            )
            .await?;
        Ok(row.get(0))
    }

    /// Partial update; `None` fields keep their current value.
    pub async fn update_batch(
        &self,
        id: Uuid,
        name: Option<&str>,
        description: Option<&str>,
        assigned_uploaders: Option<&[String]>,
    ) -> Result<(), StoreError> {
        let client = self.client().await?;
        let updated = client
            .execute(
                "UPDATE batches SET \
                 name = COALESCE($2, name), \
                 description = COALESCE($3, description), \
                 assigned_uploaders = COALESCE($4, assigned_uploaders), \
                 updated_at = now() \
                 WHERE id = $1",
                &[&id, &name, &description, &assigned_uploaders],
            )
            .await?;
        if updated == 0 {
            return Err(StoreError::NotFound("batch"));
        }
        Ok(())
    }

    pub async fn delete_batch(&self, id: Uuid) -> Result<(), StoreError> {
        let client = self.client().await?;
        let deleted = client
            .execute("DELETE FROM batches WHERE id = $1", &[&id])
            .await?;
        if deleted == 0 {
            return Err(StoreError::NotFound("batch"));
        }
        Ok(())
    }

    pub async fn create_subject(
        &self,
        batch_id: Uuid,
        name: &str,
        color: &str,
    ) -> Result<Uuid, StoreError> {
        let client = self.client().await?;
        let row = client
            .query_one(
                "INSERT INTO subjects (batch_id, name, color) VALUES ($1, $2, $3) RETURNING id",
                &[&batch_id, &name, &color],
            )
            .await?;
        Ok(row.get(0))
    }

    pub async fn delete_subject(&self, id: Uuid) -> Result<(), StoreError> {
        let client = self.client().await?;
        let deleted = client
            .execute("DELETE FROM subjects WHERE id = $1", &[&id])
            .await?;
        if deleted == 0 {
            return Err(StoreError::NotFound("subject"));
        }
        Ok(())
    }

    /// Appends a chapter at the end of the subject's ordering.
    pub async fn create_chapter(&self, subject_id: Uuid, title: &str) -> Result<Uuid, StoreError> {
        let client = self.client().await?;
        let row = client
            .query_one(
                "INSERT INTO chapters (subject_id, title, order_index) \
                 VALUES ($1, $2, (SELECT COALESCE(MAX(order_index), 0) + 1 \
                                  FROM chapters WHERE subject_id = $1)) \
                 RETURNING id",
                &[&subject_id, &title],
            )
            .await?;
        Ok(row.get(0))
    }

    pub async fn delete_chapter(&self, id: Uuid) -> Result<(), StoreError> {
        let client = self.client().await?;
        let deleted = client
            .execute("DELETE FROM chapters WHERE id = $1", &[&id])
            .await?;
        if deleted == 0 {
            return Err(StoreError::NotFound("chapter"));
        }
        Ok(())
    }

    pub async fn create_lecture(
        &self,
        chapter_id: Uuid,
        lecture: &NewLecture,
    ) -> Result<Uuid, StoreError> {
        let client = self.client().await?;
        let row = client
            .query_one(
                "INSERT INTO lectures \
                 (chapter_id, title, video_url, video_type, notes_url, dpp_url, uploaded_by) \
                 VALUES ($1, $2, $3, $4, $5, $6, $7) RETURNING id",
                &[
                    &chapter_id,
                    &lecture.title,
                    &lecture.video_url,
                    &lecture.video_type.as_str(),
                    &lecture.notes_url,
                    &lecture.dpp_url,
                    &lecture.uploaded_by,
                ],
            )
            .await?;
        Ok(row.get(0))
    }

    pub async fn delete_lecture(&self, id: Uuid) -> Result<(), StoreError> {
        let client = self.client().await?;
        let deleted = client
            .execute("DELETE FROM lectures WHERE id = $1", &[&id])
            .await?;
        if deleted == 0 {
            return Err(StoreError::NotFound("lecture"));
        }
        Ok(())
    }
}
