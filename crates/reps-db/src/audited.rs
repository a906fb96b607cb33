//! Admin mutations. Each one writes its change and the matching moderation
//! entry in a single transaction, so the log never disagrees with the data.

use anyhow::Result;
use chrono::Utc;
use reps_core::audit;
use reps_types::models::{Announcement, AnnouncementDraft, Comment, Ticket, TicketDraft};
use tracing::info;

use crate::Database;
use crate::queries::{insert_moderation, query_announcement, query_comment, query_ticket};

impl Database {
    /// Flip the resolved flag. Returns the new state, or `None` if the
    /// ticket does not exist.
    pub fn toggle_resolve(&self, id: i64, admin: &str) -> Result<Option<bool>> {
        self.with_conn_mut(|conn| {
            let tx = conn.transaction()?;
            let Some(ticket) = query_ticket(&tx, id)? else {
                return Ok(None);
            };

            let resolved = !ticket.is_resolved;
            tx.execute(
                "UPDATE tickets SET is_resolved = ?1 WHERE id = ?2",
                rusqlite::params![resolved, id],
            )?;
            insert_moderation(&tx, &audit::resolve_entry(admin, &ticket, resolved))?;
            tx.commit()?;

            info!("{} marked ticket {} resolved={}", admin, id, resolved);
            Ok(Some(resolved))
        })
    }

    /// Delete a ticket and its comments. Returns the removed ticket.
    pub fn delete_ticket(&self, id: i64, admin: &str) -> Result<Option<Ticket>> {
        self.with_conn_mut(|conn| {
            let tx = conn.transaction()?;
            let Some(ticket) = query_ticket(&tx, id)? else {
                return Ok(None);
            };

            tx.execute("DELETE FROM tickets WHERE id = ?1", [id])?;
            insert_moderation(&tx, &audit::ticket_deletion_entry(admin, &ticket))?;
            tx.commit()?;

            info!("{} deleted ticket {}", admin, id);
            Ok(Some(ticket))
        })
    }

    /// Delete a comment of `ticket_id`. A comment filed under another ticket
    /// counts as missing.
    pub fn delete_comment(&self, ticket_id: i64, comment_id: i64, admin: &str) -> Result<Option<Comment>> {
        self.with_conn_mut(|conn| {
            let tx = conn.transaction()?;
            let Some(comment) = query_comment(&tx, comment_id)?.filter(|c| c.ticket_id == ticket_id) else {
                return Ok(None);
            };
            let Some(ticket) = query_ticket(&tx, comment.ticket_id)? else {
                return Ok(None);
            };

            tx.execute("DELETE FROM comments WHERE id = ?1", [comment_id])?;
            insert_moderation(&tx, &audit::comment_deletion_entry(admin, &comment, &ticket))?;
            tx.commit()?;

            info!("{} deleted comment {} on ticket {}", admin, comment_id, ticket.id);
            Ok(Some(comment))
        })
    }

    /// Apply a validated edit. Returns the change description, or `None` if
    /// the ticket does not exist.
    pub fn edit_ticket(
        &self,
        id: i64,
        draft: &TicketDraft,
        admin: &str,
        reason: &str,
        sensitive: bool,
    ) -> Result<Option<String>> {
        self.with_conn_mut(|conn| {
            let tx = conn.transaction()?;
            let Some(ticket) = query_ticket(&tx, id)? else {
                return Ok(None);
            };

            let entry = audit::edit_entry(admin, &ticket, draft, reason, sensitive);
            tx.execute(
                "UPDATE tickets SET title = ?1, description = ?2, category = ?3, updated_at = ?4
                 WHERE id = ?5",
                rusqlite::params![
                    draft.title,
                    draft.description,
                    draft.category,
                    Utc::now().timestamp(),
                    id
                ],
            )?;
            insert_moderation(&tx, &entry)?;
            tx.commit()?;

            info!("{} edited ticket {}", admin, id);
            Ok(Some(entry.description))
        })
    }

    // -- Announcements --

    pub fn create_announcement(&self, draft: &AnnouncementDraft, admin: &str) -> Result<i64> {
        self.with_conn_mut(|conn| {
            let tx = conn.transaction()?;
            let now = Utc::now().timestamp();
            tx.execute(
                "INSERT INTO announcements (title, tags, description, created_at, updated_at)
                 VALUES (?1, ?2, ?3, ?4, ?4)",
                rusqlite::params![draft.title, draft.tags, draft.description, now],
            )?;
            let id = tx.last_insert_rowid();
            insert_moderation(&tx, &audit::announcement_entry(admin, &draft.title, audit::CREATED))?;
            tx.commit()?;
            Ok(id)
        })
    }

    /// Returns `false` if the announcement does not exist.
    pub fn update_announcement(&self, id: i64, draft: &AnnouncementDraft, admin: &str) -> Result<bool> {
        self.with_conn_mut(|conn| {
            let tx = conn.transaction()?;
            if query_announcement(&tx, id)?.is_none() {
                return Ok(false);
            }

            tx.execute(
                "UPDATE announcements SET title = ?1, tags = ?2, description = ?3, updated_at = ?4
                 WHERE id = ?5",
                rusqlite::params![draft.title, draft.tags, draft.description, Utc::now().timestamp(), id],
            )?;
            insert_moderation(&tx, &audit::announcement_entry(admin, &draft.title, audit::UPDATED))?;
            tx.commit()?;
            Ok(true)
        })
    }

    pub fn delete_announcement(&self, id: i64, admin: &str) -> Result<Option<Announcement>> {
        self.with_conn_mut(|conn| {
            let tx = conn.transaction()?;
            let Some(announcement) = query_announcement(&tx, id)? else {
                return Ok(None);
            };

            tx.execute("DELETE FROM announcements WHERE id = ?1", [id])?;
            insert_moderation(
                &tx,
                &audit::announcement_entry(admin, &announcement.title, audit::DELETED),
            )?;
            tx.commit()?;
            Ok(Some(announcement))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use reps_types::models::NewComment;

    use crate::CommentInsert;

    fn seeded() -> (Database, i64) {
        let db = Database::open_in_memory().unwrap();
        let id = db
            .insert_ticket(
                &TicketDraft {
                    title: "Old".into(),
                    description: "Old body".into(),
                    category: "General".into(),
                },
                "creator",
            )
            .unwrap();
        (db, id)
    }

    #[test]
    fn resolve_toggles_and_logs() {
        let (db, id) = seeded();
        assert_eq!(db.toggle_resolve(id, "Humaid").unwrap(), Some(true));
        assert_eq!(db.toggle_resolve(id, "Humaid").unwrap(), Some(false));
        assert_eq!(db.toggle_resolve(404, "Humaid").unwrap(), None);

        let log = db.get_moderations().unwrap();
        assert_eq!(log.len(), 2);
        assert_eq!(log[0].description, "Marked ticket as unresolved");
        assert_eq!(log[1].description, "Marked ticket as resolved");
        assert_eq!(log[1].title, "Ticket \"Old\"");
        assert_eq!(log[1].admin, "Humaid");

        // votes untouched by resolve
        assert_eq!(db.get_ticket(id).unwrap().unwrap().voters, vec!["creator".to_string()]);
    }

    #[test]
    fn delete_ticket_cascades_comments() {
        let (db, id) = seeded();
        let inserted = db
            .insert_comment(&NewComment {
                ticket_id: id,
                poster_id: "Calm Rust".into(),
                text: "hi".into(),
                is_admin: false,
            })
            .unwrap();
        let CommentInsert::Inserted(cid) = inserted else {
            panic!("comment not inserted: {inserted:?}");
        };

        let removed = db.delete_ticket(id, "Humaid").unwrap().unwrap();
        assert_eq!(removed.title, "Old");
        assert!(db.get_ticket(id).unwrap().is_none());
        assert!(db.get_comment(cid).unwrap().is_none());

        let log = db.get_moderations().unwrap();
        assert_eq!(log[0].title, "Ticket \"Old\"");
        assert_eq!(log[0].description, "Deleted");
    }

    #[test]
    fn delete_comment_logs_poster_and_ticket() {
        let (db, id) = seeded();
        let CommentInsert::Inserted(cid) = db
            .insert_comment(&NewComment {
                ticket_id: id,
                poster_id: "Calm Rust".into(),
                text: "hi".into(),
                is_admin: false,
            })
            .unwrap()
        else {
            panic!("comment not inserted");
        };

        assert!(db.delete_comment(id + 1, cid, "Humaid").unwrap().is_none());
        assert!(db.get_moderations().unwrap().is_empty());

        assert!(db.delete_comment(id, cid, "Humaid").unwrap().is_some());
        assert!(db.delete_comment(id, cid, "Humaid").unwrap().is_none());

        let log = db.get_moderations().unwrap();
        assert_eq!(log.len(), 1);
        assert_eq!(log[0].title, "Comment by \"Calm Rust\" on \"Old\"");
    }

    #[test]
    fn edit_records_diff_reason_and_sensitivity() {
        let (db, id) = seeded();
        let draft = TicketDraft {
            title: "New".into(),
            description: "Old body".into(),
            category: "F20GA".into(),
        };
        let diff = db.edit_ticket(id, &draft, "Humaid", "clarity", true).unwrap().unwrap();
        assert_eq!(
            diff,
            "changed title from \"Old\" to \"New\" and also changed category from \"General\" to \"F20GA\""
        );

        let ticket = db.get_ticket(id).unwrap().unwrap();
        assert_eq!(ticket.title, "New");
        assert_eq!(ticket.category, "F20GA");

        let entry = &db.get_moderations().unwrap()[0];
        assert_eq!(entry.reason, "clarity");
        assert!(entry.description_sensitive);
        assert_eq!(entry.title, "Ticket \"Old\"");
    }

    #[test]
    fn announcement_lifecycle_is_logged() {
        let db = Database::open_in_memory().unwrap();
        let draft = AnnouncementDraft {
            title: "Exams".into(),
            description: "Timetable is out".into(),
            tags: "exams".into(),
        };
        let id = db.create_announcement(&draft, "Humaid").unwrap();

        let changed = AnnouncementDraft { title: "Exams v2".into(), ..draft };
        assert!(db.update_announcement(id, &changed, "Humaid").unwrap());
        assert!(!db.update_announcement(404, &changed, "Humaid").unwrap());
        assert_eq!(db.get_announcement(id).unwrap().unwrap().title, "Exams v2");

        assert!(db.delete_announcement(id, "Humaid").unwrap().is_some());
        assert!(db.get_announcements().unwrap().is_empty());

        let actions: Vec<String> = db
            .get_moderations()
            .unwrap()
            .into_iter()
            .map(|m| m.description)
            .collect();
        assert_eq!(actions, vec!["Deleted", "Updated", "Created"]);
    }
}
