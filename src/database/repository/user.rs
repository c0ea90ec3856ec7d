use chrono::Utc;
use sqlx::PgPool;
use uuid::Uuid;

use crate::database::manager::DatabaseError;
use crate::database::models::{User, UserColumn, UserSummary, Users};
use crate::database::query_builder::{
    build_delete, build_update, ensure_rows_affected, execute, fetch_all, ConditionSet, FieldSet,
};
use crate::filter::{build_user_listing, Page};

const USER_COLUMNS: &str = "id, username, email, password, img_url, create_at, update_at";

#[derive(Clone)]
pub struct UserRepository {
    pool: PgPool,
}

impl UserRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn create(
        &self,
        username: &str,
        email: &str,
        password_digest: &str,
    ) -> Result<User, DatabaseError> {
        let query = format!(
            "INSERT INTO users (username, email, password) VALUES ($1, $2, $3) RETURNING {}",
            USER_COLUMNS
        );

        let user = sqlx::query_as::<_, User>(&query)
            .bind(username)
            .bind(email)
            .bind(password_digest)
            .fetch_one(&self.pool)
            .await?;

        Ok(user)
    }

    pub async fn list(&self, page: Page) -> Result<Vec<UserSummary>, DatabaseError> {
        fetch_all(&self.pool, &build_user_listing(page)).await
    }

    pub async fn find_by_id(&self, id: Uuid) -> Result<User, DatabaseError> {
        let query = format!("SELECT {} FROM users WHERE id = $1", USER_COLUMNS);

        sqlx::query_as::<_, User>(&query)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| DatabaseError::NotFound("User not found".to_string()))
    }

    /// Look a user up by id, email or username, in that order of interpretation.
    pub async fn find_by_identifier(&self, identifier: &str) -> Result<User, DatabaseError> {
        if let Ok(id) = Uuid::parse_str(identifier) {
            return self.find_by_id(id).await;
        }

        let query = format!(
            "SELECT {} FROM users WHERE email = $1 OR username = $1 LIMIT 1",
            USER_COLUMNS
        );

        sqlx::query_as::<_, User>(&query)
            .bind(identifier)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| DatabaseError::NotFound("User not found".to_string()))
    }

    /// Apply a partial update to the caller's own row.
    pub async fn update(&self, user_id: Uuid, mut fields: FieldSet<Users>) -> Result<(), DatabaseError> {
        if !fields.is_empty() {
            fields.set(UserColumn::UpdateAt, Utc::now());
        }
        let conditions = ConditionSet::<Users>::new().with(UserColumn::Id, user_id);

        let sql = build_update(&fields, &conditions)?;
        let rows = execute(&self.pool, &sql).await?;
        ensure_rows_affected(rows)
    }

    pub async fn delete(&self, user_id: Uuid) -> Result<(), DatabaseError> {
        let conditions = ConditionSet::<Users>::new().with(UserColumn::Id, user_id);

        let sql = build_delete(&conditions)?;
        let rows = execute(&self.pool, &sql).await?;
        ensure_rows_affected(rows)
    }
}
