use super::types::{ListingFilter, Page, PostFilter, SqlResult, SqlValue};

const POST_LISTING_COLUMNS: &str = "p.id, p.parent_id, p.user_id, u.username, u.img_url, \
     p.title, p.content, p.update_at, p.create_at";

/// Paginated post listing, newest first, with author details.
///
/// The author columns come from a LEFT JOIN so posts whose author no longer
/// resolves are still listed, with the author fields NULL.
pub fn build_listing(filter: &ListingFilter) -> SqlResult {
    let page = filter.page();
    let mut params: Vec<SqlValue> = Vec::with_capacity(3);

    let where_clause = match filter.active() {
        PostFilter::ByUser(user_id) => {
            params.push(user_id.into());
            format!("WHERE p.user_id = ${}", params.len())
        }
        PostFilter::ByParent(parent_id) => {
            params.push(parent_id.into());
            format!("WHERE p.parent_id = ${}", params.len())
        }
        PostFilter::All => String::new(),
    };

    let limit_index = params.len() + 1;
    params.push(page.limit.into());
    params.push(page.offset().into());

    let query = [
        format!("SELECT {}", POST_LISTING_COLUMNS),
        "FROM posts AS p".to_string(),
        "LEFT JOIN users AS u ON u.id = p.user_id".to_string(),
        where_clause,
        "ORDER BY p.create_at DESC".to_string(),
        format!("LIMIT ${} OFFSET ${}", limit_index, limit_index + 1),
    ]
    .into_iter()
    .filter(|s| !s.is_empty())
    .collect::<Vec<_>>()
    .join(" ");

    SqlResult { query, params }
}

/// Paginated user directory, oldest account first.
pub fn build_user_listing(page: Page) -> SqlResult {
    SqlResult {
        query: "SELECT id, username, email, img_url, create_at, update_at \
                FROM users ORDER BY create_at LIMIT $1 OFFSET $2"
            .to_string(),
        params: vec![page.limit.into(), page.offset().into()],
    }
}
