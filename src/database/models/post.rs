use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::FromRow;
use uuid::Uuid;

use crate::database::query_builder::{Column, Table};

/// A post or, when `parent_id` is set, a reply to another post.
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct Post {
    pub id: Uuid,
    pub user_id: Uuid,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parent_id: Option<Uuid>,
    pub title: String,
    pub content: String,
    pub update_at: DateTime<Utc>,
    pub create_at: DateTime<Utc>,
}

/// A listed post joined with its author. Author fields are empty when the
/// author no longer resolves.
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct PostListing {
    pub id: Uuid,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parent_id: Option<Uuid>,
    pub user_id: Uuid,
    pub username: Option<String>,
    #[serde(rename = "user_img", skip_serializing_if = "Option::is_none")]
    pub img_url: Option<String>,
    pub title: String,
    pub content: String,
    pub update_at: DateTime<Utc>,
    pub create_at: DateTime<Utc>,
}

#[derive(Debug)]
pub struct Posts;

impl Table for Posts {
    const NAME: &'static str = "posts";
    type Column = PostColumn;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PostColumn {
    Id,
    UserId,
    ParentId,
    Title,
    Content,
    UpdateAt,
}

impl Column for PostColumn {
    fn name(self) -> &'static str {
        match self {
            PostColumn::Id => "id",
            PostColumn::UserId => "user_id",
            PostColumn::ParentId => "parent_id",
            PostColumn::Title => "title",
            PostColumn::Content => "content",
            PostColumn::UpdateAt => "update_at",
        }
    }
}
