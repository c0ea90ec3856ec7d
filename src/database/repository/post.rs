use chrono::Utc;
use sqlx::PgPool;
use uuid::Uuid;

use crate::database::manager::DatabaseError;
use crate::database::models::{Post, PostColumn, PostListing, Posts};
use crate::database::query_builder::{
    build_delete, build_update, ensure_rows_affected, execute, fetch_all, ConditionSet, FieldSet,
};
use crate::filter::{build_listing, ListingFilter};

#[derive(Clone)]
pub struct PostRepository {
    pool: PgPool,
}

impl PostRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn list(&self, filter: &ListingFilter) -> Result<Vec<PostListing>, DatabaseError> {
        fetch_all(&self.pool, &build_listing(filter)).await
    }

    /// Create a post owned by `user_id`; a `parent_id` makes it a reply.
    pub async fn create(
        &self,
        user_id: Uuid,
        parent_id: Option<Uuid>,
        title: &str,
        content: &str,
    ) -> Result<Post, DatabaseError> {
        let post = sqlx::query_as::<_, Post>(
            r#"
            INSERT INTO posts (parent_id, user_id, title, content)
            VALUES ($1, $2, $3, $4)
            RETURNING id, user_id, parent_id, title, content, update_at, create_at
            "#,
        )
        .bind(parent_id)
        .bind(user_id)
        .bind(title)
        .bind(content)
        .fetch_one(&self.pool)
        .await?;

        Ok(post)
    }

    /// Partial update, matched on both post id and owner.
    pub async fn update(
        &self,
        user_id: Uuid,
        post_id: Uuid,
        mut fields: FieldSet<Posts>,
    ) -> Result<(), DatabaseError> {
        if !fields.is_empty() {
            fields.set(PostColumn::UpdateAt, Utc::now());
        }
        let conditions = owned_post(user_id, post_id);

        let sql = build_update(&fields, &conditions)?;
        let rows = execute(&self.pool, &sql).await?;
        ensure_rows_affected(rows)
    }

    pub async fn delete(&self, user_id: Uuid, post_id: Uuid) -> Result<(), DatabaseError> {
        let sql = build_delete(&owned_post(user_id, post_id))?;
        let rows = execute(&self.pool, &sql).await?;
        ensure_rows_affected(rows)
    }
}

fn owned_post(user_id: Uuid, post_id: Uuid) -> ConditionSet<Posts> {
    ConditionSet::<Posts>::new()
        .with(PostColumn::Id, post_id)
        .with(PostColumn::UserId, user_id)
}
