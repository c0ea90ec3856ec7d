use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::FromRow;
use uuid::Uuid;

use crate::database::query_builder::{Column, Table};

/// Full account row, including the password digest. Never serialized directly.
#[derive(Debug, Clone, FromRow)]
pub struct User {
    pub id: Uuid,
    pub username: String,
    pub email: String,
    pub password: String,
    pub img_url: Option<String>,
    pub create_at: DateTime<Utc>,
    pub update_at: Option<DateTime<Utc>>,
}

/// Account row without the password digest, as listed in the user directory.
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct UserSummary {
    pub id: Uuid,
    pub username: String,
    pub email: String,
    pub img_url: Option<String>,
    pub create_at: DateTime<Utc>,
    pub update_at: Option<DateTime<Utc>>,
}

impl From<User> for UserSummary {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            username: user.username,
            email: user.email,
            img_url: user.img_url,
            create_at: user.create_at,
            update_at: user.update_at,
        }
    }
}

#[derive(Debug)]
pub struct Users;

impl Table for Users {
    const NAME: &'static str = "users";
    type Column = UserColumn;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UserColumn {
    Id,
    Username,
    Email,
    Password,
    ImgUrl,
    UpdateAt,
}

impl Column for UserColumn {
    fn name(self) -> &'static str {
        match self {
            UserColumn::Id => "id",
            UserColumn::Username => "username",
            UserColumn::Email => "email",
            UserColumn::Password => "password",
            UserColumn::ImgUrl => "img_url",
            UserColumn::UpdateAt => "update_at",
        }
    }
}
