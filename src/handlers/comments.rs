// src/handlers/comments.rs

use axum::{
    Json,
    extract::{Path, State, rejection::PathRejection},
    response::IntoResponse,
};

use crate::{
    db::{MANGA_COMMENTS_SQL, Sql},
    error::AppError,
    models::comment::{CommentDto, CommentsEnvelope},
    utils::row::parse_js_number,
};

/// Parses the `{id}` path segment the way `Number()` followed by truncation would.
/// Returns `None` for blank input and anything that does not coerce to a finite number.
pub fn parse_manga_id(raw: &str) -> Option<i64> {
    if raw.trim().is_empty() {
        return None;
    }
    let n = parse_js_number(raw);
    n.is_finite().then(|| n.trunc() as i64)
}

/// Lists every comment of a title, oldest first, with author profiles joined in.
///
/// * 500 `DB not configured` when the deployment has no database.
/// * 400 `Bad manga id` when the id is not numeric. No query is run.
pub async fn list_manga_comments(
    State(sql): State<Option<Sql>>,
    path: Result<Path<String>, PathRejection>,
) -> Result<impl IntoResponse, AppError> {
    let sql = sql.ok_or(AppError::NotConfigured)?;

    let manga_id = path
        .ok()
        .and_then(|Path(raw)| parse_manga_id(&raw))
        .ok_or_else(|| AppError::BadRequest("Bad manga id".to_string()))?;

    let rows = sql.rows(MANGA_COMMENTS_SQL, &[manga_id]).await?;
    let items: Vec<CommentDto> = rows.iter().map(CommentDto::from_row).collect();

    tracing::debug!(manga_id, count = items.len(), "Listed manga comments");

    Ok(Json(CommentsEnvelope::new(items)))
}
