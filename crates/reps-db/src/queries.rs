use std::collections::HashSet;

use anyhow::Result;
use chrono::Utc;
use reps_types::models::{
    Announcement, Comment, Moderation, NewComment, NewModeration, Ticket, TicketDraft,
};
use rusqlite::Connection;

use crate::Database;
use crate::models::{
    ANNOUNCEMENT_COLUMNS, AnnouncementRow, COMMENT_COLUMNS, CommentRow, MODERATION_COLUMNS,
    ModerationRow, TICKET_COLUMNS, TicketRow, encode_voters,
};

/// Result of an upvote. Only `Counted` changed anything.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VoteOutcome {
    NotFound,
    Resolved,
    AlreadyVoted,
    Counted,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommentInsert {
    TicketMissing,
    Resolved,
    Inserted(i64),
}

impl Database {
    // -- Tickets --

    /// Insert a ticket with its creator as the first voter.
    pub fn insert_ticket(&self, draft: &TicketDraft, creator_fingerprint: &str) -> Result<i64> {
        self.with_conn(|conn| {
            let voters = encode_voters(&[creator_fingerprint.to_string()]);
            let now = Utc::now().timestamp();
            conn.execute(
                "INSERT INTO tickets (title, description, category, voters, created_at, updated_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?5)",
                rusqlite::params![draft.title, draft.description, draft.category, voters, now],
            )?;
            Ok(conn.last_insert_rowid())
        })
    }

    pub fn get_ticket(&self, id: i64) -> Result<Option<Ticket>> {
        self.with_conn(|conn| query_ticket(conn, id))
    }

    pub fn get_tickets(&self) -> Result<Vec<Ticket>> {
        self.with_conn(|conn| {
            let sql = format!("SELECT {TICKET_COLUMNS} FROM tickets t ORDER BY t.id");
            let mut stmt = conn.prepare(&sql)?;
            let rows = stmt
                .query_map([], TicketRow::from_row)?
                .collect::<std::result::Result<Vec<_>, _>>()?;
            Ok(rows.into_iter().map(Ticket::from).collect())
        })
    }

    pub fn get_tickets_by_category(&self, category: &str) -> Result<Vec<Ticket>> {
        self.with_conn(|conn| {
            let sql = format!("SELECT {TICKET_COLUMNS} FROM tickets t WHERE t.category = ?1 ORDER BY t.id");
            let mut stmt = conn.prepare(&sql)?;
            let rows = stmt
                .query_map([category], TicketRow::from_row)?
                .collect::<std::result::Result<Vec<_>, _>>()?;
            Ok(rows.into_iter().map(Ticket::from).collect())
        })
    }

    /// Distinct categories that have at least one ticket.
    pub fn used_categories(&self) -> Result<HashSet<String>> {
        self.with_conn(|conn| {
            let mut stmt = conn.prepare("SELECT DISTINCT category FROM tickets")?;
            let categories = stmt
                .query_map([], |row| row.get::<_, String>(0))?
                .collect::<std::result::Result<HashSet<_>, _>>()?;
            Ok(categories)
        })
    }

    /// Add a vote unless the ticket is resolved or the fingerprint already
    /// voted. The check and the write happen under one lock; only the
    /// `voters` column is written.
    pub fn upvote_ticket(&self, id: i64, fingerprint: &str) -> Result<VoteOutcome> {
        self.with_conn(|conn| {
            let Some(mut ticket) = query_ticket(conn, id)? else {
                return Ok(VoteOutcome::NotFound);
            };
            if ticket.is_resolved {
                return Ok(VoteOutcome::Resolved);
            }
            if ticket.has_voted(fingerprint) {
                return Ok(VoteOutcome::AlreadyVoted);
            }

            ticket.voters.push(fingerprint.to_string());
            conn.execute(
                "UPDATE tickets SET voters = ?1 WHERE id = ?2",
                rusqlite::params![encode_voters(&ticket.voters), id],
            )?;
            Ok(VoteOutcome::Counted)
        })
    }

    // -- Comments --

    pub fn insert_comment(&self, comment: &NewComment) -> Result<CommentInsert> {
        self.with_conn(|conn| {
            let Some(ticket) = query_ticket(conn, comment.ticket_id)? else {
                return Ok(CommentInsert::TicketMissing);
            };
            if ticket.is_resolved {
                return Ok(CommentInsert::Resolved);
            }

            conn.execute(
                "INSERT INTO comments (ticket_id, poster_id, text, is_admin, created_at)
                 VALUES (?1, ?2, ?3, ?4, ?5)",
                rusqlite::params![
                    comment.ticket_id,
                    comment.poster_id,
                    comment.text,
                    comment.is_admin,
                    Utc::now().timestamp()
                ],
            )?;
            Ok(CommentInsert::Inserted(conn.last_insert_rowid()))
        })
    }

    #[cfg(test)]
    pub(crate) fn get_comment(&self, id: i64) -> Result<Option<Comment>> {
        self.with_conn(|conn| query_comment(conn, id))
    }

    /// Comments of a ticket, oldest first.
    pub fn get_comments_for_ticket(&self, ticket_id: i64) -> Result<Vec<Comment>> {
        self.with_conn(|conn| {
            let sql = format!(
                "SELECT {COMMENT_COLUMNS} FROM comments WHERE ticket_id = ?1 ORDER BY created_at, id"
            );
            let mut stmt = conn.prepare(&sql)?;
            let rows = stmt
                .query_map([ticket_id], CommentRow::from_row)?
                .collect::<std::result::Result<Vec<_>, _>>()?;
            Ok(rows.into_iter().map(Comment::from).collect())
        })
    }

    // -- Moderation --

    /// The full moderation log, newest first.
    pub fn get_moderations(&self) -> Result<Vec<Moderation>> {
        self.with_conn(|conn| {
            let sql = format!("SELECT {MODERATION_COLUMNS} FROM moderations ORDER BY created_at DESC, id DESC");
            let mut stmt = conn.prepare(&sql)?;
            let rows = stmt
                .query_map([], ModerationRow::from_row)?
                .collect::<std::result::Result<Vec<_>, _>>()?;
            Ok(rows.into_iter().map(Moderation::from).collect())
        })
    }

    // -- Announcements --

    pub fn get_announcement(&self, id: i64) -> Result<Option<Announcement>> {
        self.with_conn(|conn| query_announcement(conn, id))
    }

    /// All announcements, newest first.
    pub fn get_announcements(&self) -> Result<Vec<Announcement>> {
        self.with_conn(|conn| {
            let sql = format!(
                "SELECT {ANNOUNCEMENT_COLUMNS} FROM announcements ORDER BY created_at DESC, id DESC"
            );
            let mut stmt = conn.prepare(&sql)?;
            let rows = stmt
                .query_map([], AnnouncementRow::from_row)?
                .collect::<std::result::Result<Vec<_>, _>>()?;
            Ok(rows.into_iter().map(Announcement::from).collect())
        })
    }
}

pub(crate) fn query_ticket(conn: &Connection, id: i64) -> Result<Option<Ticket>> {
    let sql = format!("SELECT {TICKET_COLUMNS} FROM tickets t WHERE t.id = ?1");
    let mut stmt = conn.prepare(&sql)?;
    let row = stmt.query_row([id], TicketRow::from_row).optional()?;
    Ok(row.map(Ticket::from))
}

pub(crate) fn query_comment(conn: &Connection, id: i64) -> Result<Option<Comment>> {
    let sql = format!("SELECT {COMMENT_COLUMNS} FROM comments WHERE id = ?1");
    let mut stmt = conn.prepare(&sql)?;
    let row = stmt.query_row([id], CommentRow::from_row).optional()?;
    Ok(row.map(Comment::from))
}

pub(crate) fn query_announcement(conn: &Connection, id: i64) -> Result<Option<Announcement>> {
    let sql = format!("SELECT {ANNOUNCEMENT_COLUMNS} FROM announcements WHERE id = ?1");
    let mut stmt = conn.prepare(&sql)?;
    let row = stmt.query_row([id], AnnouncementRow::from_row).optional()?;
    Ok(row.map(Announcement::from))
}

pub(crate) fn insert_moderation(conn: &Connection, entry: &NewModeration) -> Result<i64> {
    conn.execute(
        "INSERT INTO moderations (admin, title, description, description_sensitive, reason, created_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
        rusqlite::params![
            entry.admin,
            entry.title,
            entry.description,
            entry.description_sensitive,
            entry.reason,
            Utc::now().timestamp()
        ],
    )?;
    Ok(conn.last_insert_rowid())
}

/// Extension trait for optional query results
pub(crate) trait OptionalExt<T> {
    fn optional(self) -> Result<Option<T>>;
}

impl<T> OptionalExt<T> for std::result::Result<T, rusqlite::Error> {
    fn optional(self) -> Result<Option<T>> {
        match self {
            Ok(val) => Ok(Some(val)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }
}
