use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Category accepted for every ticket regardless of the configured courses.
pub const GENERAL_CATEGORY: &str = "General";

// -- Tickets --

/// An issue or request raised by a student, filed under a course category.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Ticket {
    pub id: i64,
    pub title: String,
    pub description: String,
    pub category: String,
    pub created_at: DateTime<Utc>,
    pub is_resolved: bool,
    /// Voter fingerprints. Unique values, order irrelevant.
    pub voters: Vec<String>,
    /// Derived from the comments table, never stored on the ticket row.
    pub comments_count: usize,
}

impl Ticket {
    pub fn votes(&self) -> usize {
        self.voters.len()
    }

    pub fn has_voted(&self, fingerprint: &str) -> bool {
        self.voters.iter().any(|v| v == fingerprint)
    }

    /// Resolved tickets are frozen: no votes, no new comments.
    pub fn is_open(&self) -> bool {
        !self.is_resolved
    }
}

/// A validated ticket submission, ready to be inserted or applied as an edit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TicketDraft {
    pub title: String,
    pub description: String,
    pub category: String,
}

// -- Comments --

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Comment {
    pub id: i64,
    pub ticket_id: i64,
    /// Session pseudonym, or the representative's name for admin comments.
    pub poster_id: String,
    pub text: String,
    pub is_admin: bool,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewComment {
    pub ticket_id: i64,
    pub poster_id: String,
    pub text: String,
    pub is_admin: bool,
}

// -- Moderation --

/// Immutable audit record of an administrative action.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Moderation {
    pub id: i64,
    pub admin: String,
    pub title: String,
    pub description: String,
    pub description_sensitive: bool,
    pub reason: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct NewModeration {
    pub admin: String,
    pub title: String,
    pub description: String,
    pub description_sensitive: bool,
    pub reason: String,
}

// -- Announcements --

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Announcement {
    pub id: i64,
    pub title: String,
    /// Comma separated, as typed by the author.
    pub tags: String,
    pub description: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Announcement {
    pub fn tag_list(&self) -> Vec<&str> {
        self.tags
            .split(',')
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .collect()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnnouncementDraft {
    pub title: String,
    pub description: String,
    pub tags: String,
}
