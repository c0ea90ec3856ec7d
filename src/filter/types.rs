use chrono::{DateTime, Utc};
use uuid::Uuid;

/// Page size used when a caller asks for none (or for a non-positive one).
pub const DEFAULT_PAGE_SIZE: i64 = 10;

/// A value destined for a positional `$n` parameter. Never rendered into SQL text.
#[derive(Debug, Clone, PartialEq)]
pub enum SqlValue {
    Bool(bool),
    Int(i64),
    Text(String),
    Uuid(Uuid),
    Timestamp(DateTime<Utc>),
}

impl From<bool> for SqlValue {
    fn from(v: bool) -> Self {
        SqlValue::Bool(v)
    }
}

impl From<i64> for SqlValue {
    fn from(v: i64) -> Self {
        SqlValue::Int(v)
    }
}

impl From<i32> for SqlValue {
    fn from(v: i32) -> Self {
        SqlValue::Int(v.into())
    }
}

impl From<String> for SqlValue {
    fn from(v: String) -> Self {
        SqlValue::Text(v)
    }
}

impl From<&str> for SqlValue {
    fn from(v: &str) -> Self {
        SqlValue::Text(v.to_string())
    }
}

impl From<Uuid> for SqlValue {
    fn from(v: Uuid) -> Self {
        SqlValue::Uuid(v)
    }
}

impl From<DateTime<Utc>> for SqlValue {
    fn from(v: DateTime<Utc>) -> Self {
        SqlValue::Timestamp(v)
    }
}

/// SQL text plus its parameters, in `$1..$n` order.
#[derive(Debug, Clone, PartialEq)]
pub struct SqlResult {
    pub query: String,
    pub params: Vec<SqlValue>,
}

/// Normalized pagination.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Page {
    pub page: i64,
    pub limit: i64,
}

impl Page {
    /// page < 1 becomes 1, limit < 1 becomes [`DEFAULT_PAGE_SIZE`].
    pub fn new(page: i64, limit: i64) -> Self {
        Self {
            page: if page < 1 { 1 } else { page },
            limit: if limit < 1 { DEFAULT_PAGE_SIZE } else { limit },
        }
    }

    pub fn offset(&self) -> i64 {
        (self.page - 1).saturating_mul(self.limit)
    }
}

impl Default for Page {
    fn default() -> Self {
        Self::new(1, DEFAULT_PAGE_SIZE)
    }
}

/// The single filter a post listing applies.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PostFilter {
    All,
    ByUser(Uuid),
    ByParent(Uuid),
}

/// Raw listing request as handlers receive it.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ListingFilter {
    pub user_id: Option<Uuid>,
    pub parent_id: Option<Uuid>,
    pub page: i64,
    pub limit: i64,
}

impl ListingFilter {
    pub fn by_user(user_id: Uuid) -> Self {
        Self { user_id: Some(user_id), ..Default::default() }
    }

    pub fn by_parent(parent_id: Uuid) -> Self {
        Self { parent_id: Some(parent_id), ..Default::default() }
    }

    pub fn paged(mut self, page: i64, limit: i64) -> Self {
        self.page = page;
        self.limit = limit;
        self
    }

    /// The owner filter wins when both are present.
    pub fn active(&self) -> PostFilter {
        match (self.user_id, self.parent_id) {
            (Some(user_id), _) => PostFilter::ByUser(user_id),
            (None, Some(parent_id)) => PostFilter::ByParent(parent_id),
            (None, None) => PostFilter::All,
        }
    }

    pub fn page(&self) -> Page {
        Page::new(self.page, self.limit)
    }
}
