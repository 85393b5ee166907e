use chrono::{SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::utils::row::{Row, field, field_or, is_present, is_truthy, to_integer, to_js_string};

/// Column aliases the lookup query gives the joined profile fields.
pub const PROFILE_USERNAME_COLUMN: &str = "_profile_username";
pub const PROFILE_AVATAR_COLUMN: &str = "_profile_avatar";

/// Author display data joined from `profiles`.
/// Always present in a `CommentDto`, with null fields when no profile matched.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CommentProfile {
    pub id: Option<String>,
    pub username: Option<String>,
    pub avatar_url: Option<String>,
}

/// DTO for one comment as returned to clients.
/// Every field is always serialized, whatever columns the source row had.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CommentDto {
    pub id: String,
    pub manga_id: i64,
    pub user_id: Option<String>,
    pub comment: String,
    pub created_at: String,
    pub parent_id: Option<String>,

    // Moderation and team columns are optional in `manga_comments`.
    pub is_team_comment: Option<bool>,
    pub team_id: Option<i64>,
    pub is_pinned: bool,
    pub is_hidden: bool,
    pub reports_count: i64,

    pub profile: CommentProfile,
}

impl CommentDto {
    /// Normalizes one row of the lookup query. Never fails.
    pub fn from_row(row: &Row) -> Self {
        let id = row.get("id").map(to_js_string).unwrap_or_default();
        let user_id = truthy_string(row, "user_id");

        let created_at = if is_present(row, "created_at") {
            to_js_string(&row["created_at"])
        } else {
            tracing::warn!(comment_id = %id, "Comment row has no created_at, using current time");
            Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true)
        };

        let comment = if is_present(row, "comment") {
            to_js_string(&row["comment"])
        } else {
            String::new()
        };

        Self {
            manga_id: row.get("manga_id").and_then(to_integer).unwrap_or(0),
            comment,
            created_at,
            parent_id: truthy_string(row, "parent_id"),

            is_team_comment: field(row, "is_team_comment"),
            team_id: present_integer(row, "team_id"),
            is_pinned: field_or(row, "is_pinned", false),
            is_hidden: field_or(row, "is_hidden", false),
            reports_count: present_integer(row, "reports_count").unwrap_or(0),

            profile: CommentProfile {
                id: user_id.clone(),
                username: field(row, PROFILE_USERNAME_COLUMN),
                avatar_url: field(row, PROFILE_AVATAR_COLUMN),
            },
            user_id,
            id,
        }
    }
}

/// Success body: `{ "ok": true, "items": [...] }`.
#[derive(Debug, Serialize, Deserialize)]
pub struct CommentsEnvelope {
    pub ok: bool,
    pub items: Vec<CommentDto>,
}

impl CommentsEnvelope {
    pub fn new(items: Vec<CommentDto>) -> Self {
        Self { ok: true, items }
    }
}

fn truthy_string(row: &Row, name: &str) -> Option<String> {
    row.get(name).filter(|v| is_truthy(v)).map(to_js_string)
}

fn present_integer(row: &Row, name: &str) -> Option<i64> {
    row.get(name).filter(|v| !Value::is_null(v)).and_then(to_integer)
}
