//! Database row types. These map directly to SQLite rows and are converted
//! into the shared `reps-types` models at the crate boundary.

use chrono::{DateTime, TimeZone, Utc};
use reps_types::models::{Announcement, Comment, Moderation, Ticket};
use rusqlite::Row;
use rusqlite::types::Type;

pub const TICKET_COLUMNS: &str = "t.id, t.title, t.description, t.category, t.voters, t.is_resolved, t.created_at,
     (SELECT COUNT(*) FROM comments c WHERE c.ticket_id = t.id)";

pub const COMMENT_COLUMNS: &str = "id, ticket_id, poster_id, text, is_admin, created_at";

pub const MODERATION_COLUMNS: &str =
    "id, admin, title, description, description_sensitive, reason, created_at";

pub const ANNOUNCEMENT_COLUMNS: &str = "id, title, tags, description, created_at, updated_at";

pub struct TicketRow {
    pub id: i64,
    pub title: String,
    pub description: String,
    pub category: String,
    pub voters: Vec<String>,
    pub is_resolved: bool,
    pub created_at: i64,
    pub comments_count: i64,
}

impl TicketRow {
    pub fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get(0)?,
            title: row.get(1)?,
            description: row.get(2)?,
            category: row.get(3)?,
            voters: decode_voters(&row.get::<_, String>(4)?)?,
            is_resolved: row.get(5)?,
            created_at: row.get(6)?,
            comments_count: row.get(7)?,
        })
    }
}

impl From<TicketRow> for Ticket {
    fn from(row: TicketRow) -> Self {
        Ticket {
            id: row.id,
            title: row.title,
            description: row.description,
            category: row.category,
            created_at: timestamp(row.created_at),
            is_resolved: row.is_resolved,
            voters: row.voters,
            comments_count: row.comments_count.max(0) as usize,
        }
    }
}

pub struct CommentRow {
    pub id: i64,
    pub ticket_id: i64,
    pub poster_id: String,
    pub text: String,
    pub is_admin: bool,
    pub created_at: i64,
}

impl CommentRow {
    pub fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get(0)?,
            ticket_id: row.get(1)?,
            poster_id: row.get(2)?,
            text: row.get(3)?,
            is_admin: row.get(4)?,
            created_at: row.get(5)?,
        })
    }
}

impl From<CommentRow> for Comment {
    fn from(row: CommentRow) -> Self {
        Comment {
            id: row.id,
            ticket_id: row.ticket_id,
            poster_id: row.poster_id,
            text: row.text,
            is_admin: row.is_admin,
            created_at: timestamp(row.created_at),
        }
    }
}

pub struct ModerationRow {
    pub id: i64,
    pub admin: String,
    pub title: String,
    pub description: String,
    pub description_sensitive: bool,
    pub reason: String,
    pub created_at: i64,
}

impl ModerationRow {
    pub fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get(0)?,
            admin: row.get(1)?,
            title: row.get(2)?,
            description: row.get(3)?,
            description_sensitive: row.get(4)?,
            reason: row.get(5)?,
            created_at: row.get(6)?,
        })
    }
}

impl From<ModerationRow> for Moderation {
    fn from(row: ModerationRow) -> Self {
        Moderation {
            id: row.id,
            admin: row.admin,
            title: row.title,
            description: row.description,
            description_sensitive: row.description_sensitive,
            reason: row.reason,
            created_at: timestamp(row.created_at),
        }
    }
}

pub struct AnnouncementRow {
    pub id: i64,
    pub title: String,
    pub tags: String,
    pub description: String,
    pub created_at: i64,
    pub updated_at: i64,
}

impl AnnouncementRow {
    pub fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get(0)?,
            title: row.get(1)?,
            tags: row.get(2)?,
            description: row.get(3)?,
            created_at: row.get(4)?,
            updated_at: row.get(5)?,
        })
    }
}

impl From<AnnouncementRow> for Announcement {
    fn from(row: AnnouncementRow) -> Self {
        Announcement {
            id: row.id,
            title: row.title,
            tags: row.tags,
            description: row.description,
            created_at: timestamp(row.created_at),
            updated_at: timestamp(row.updated_at),
        }
    }
}

fn timestamp(secs: i64) -> DateTime<Utc> {
    Utc.timestamp_opt(secs, 0).single().unwrap_or_default()
}

/// An unreadable column fails the whole read; the stored list is never
/// replaced by a partial one.
fn decode_voters(raw: &str) -> rusqlite::Result<Vec<String>> {
    serde_json::from_str(raw)
        .map_err(|e| rusqlite::Error::FromSqlConversionFailure(4, Type::Text, Box::new(e)))
}

pub fn encode_voters(voters: &[String]) -> String {
    // Serialising a slice of strings cannot fail.
    serde_json::to_string(voters).unwrap_or_else(|_| "[]".to_string())
}
