//! User-profile operations. Profiles carry the role the UI gates on;
//! hard enforcement is expected from the database's own access policies.

use tokio_postgres::Row;
use uuid::Uuid;

use super::{Store, StoreError};
use crate::models::{Role, UserProfile};

fn profile_from_row(row: &Row) -> UserProfile {
    UserProfile {
        id: row.get("id"),
        email: row.get("email"),
        role: Role::from_db(row.get("role")),
        assigned_batches: row.get("assigned_batches"),
        created_at: row.get("created_at"),
        updated_at: row.get("updated_at"),
    }
}

impl Store {
    pub async fn list_profiles(&self) -> Result<Vec<UserProfile>, StoreError> {
        let client = self.client().await?;
        let rows = client
            .query(
                "SELECT id, email, role, assigned_batches, created_at, updated_at \
                 FROM user_profiles ORDER BY created_at ASC",
                &[],
            )
            .await?;
        Ok(rows.iter().map(profile_from_row).collect())
    }

    pub async fn find_profile_by_email(
        &self,
        email: &str,
    ) -> Result<Option<UserProfile>, StoreError> {
        let client = self.client().await?;
        let row = client
            .query_opt(
                "SELECT id, email, role, assigned_batches, created_at, updated_at \
                 FROM user_profiles WHERE email = $1",
                &[&email],
            )
            .await?;
        Ok(row.as_ref().map(profile_from_row))
    }

    pub async fn create_profile(
        &self,
        email: &str,
        role: Role,
        assigned_batches: &[String],
    ) -> Result<Uuid, StoreError> {
        let client = self.client().await?;
        let row = client
            .query_one(
                "INSERT INTO user_profiles (email, role, assigned_batches) \
                 VALUES ($1, $2, $3) RETURNING id",
                &[&email, &role.as_str(), &assigned_batches],
            )
            .await?;
        Ok(row.get(0))
    }

    /// Partial update; `None` fields keep their current value.
    pub async fn update_profile(
        &self,
        id: Uuid,
        role: Option<Role>,
        assigned_batches: Option<&[String]>,
    ) -> Result<(), StoreError> {
        let client = self.client().await?;
        let role_str = role.map(|r| r.as_str());
        let updated = client
            .execute(
                "UPDATE user_profiles SET \
                 role = COALESCE($2, role), \
                 assigned_batches = COALESCE($3, assigned_batches), \
                 updated_at = now() \
                 WHERE id = $1",
                &[&id, &role_str, &assigned_batches],
            )
            .await?;
        if updated == 0 {
            return Err(StoreError::NotFound("user profile"));
        }
        Ok(())
    }

    pub async fn delete_profile(&self, id: Uuid) -> Result<(), StoreError> {
        let client = self.client().await?;
        let deleted = client
            .execute("DELETE FROM user_profiles WHERE id = $1", &[&id])
            .await?;
        if deleted == 0 {
            return Err(StoreError::NotFound("user profile"));
        }
        Ok(())
    }
}
