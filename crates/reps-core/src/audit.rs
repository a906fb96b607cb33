//! Wording of moderation log entries.

use reps_types::models::{Comment, NewModeration, Ticket, TicketDraft};

pub const DELETED: &str = "Deleted";
pub const CREATED: &str = "Created";
pub const UPDATED: &str = "Updated";

pub fn ticket_label(title: &str) -> String {
    format!("Ticket \"{title}\"")
}

pub fn comment_label(poster: &str, ticket_title: &str) -> String {
    format!("Comment by \"{poster}\" on \"{ticket_title}\"")
}

pub fn announcement_label(title: &str) -> String {
    format!("Announcement \"{title}\"")
}

/// Entry for a resolve toggle. `now_resolved` is the state after the flip.
pub fn resolve_entry(admin: &str, ticket: &Ticket, now_resolved: bool) -> NewModeration {
    let description = if now_resolved {
        "Marked ticket as resolved"
    } else {
        "Marked ticket as unresolved"
    };
    NewModeration {
        admin: admin.to_string(),
        title: ticket_label(&ticket.title),
        description: description.to_string(),
        ..Default::default()
    }
}

pub fn ticket_deletion_entry(admin: &str, ticket: &Ticket) -> NewModeration {
    NewModeration {
        admin: admin.to_string(),
        title: ticket_label(&ticket.title),
        description: DELETED.to_string(),
        ..Default::default()
    }
}

pub fn comment_deletion_entry(admin: &str, comment: &Comment, ticket: &Ticket) -> NewModeration {
    NewModeration {
        admin: admin.to_string(),
        title: comment_label(&comment.poster_id, &ticket.title),
        description: DELETED.to_string(),
        ..Default::default()
    }
}

pub fn announcement_entry(admin: &str, title: &str, action: &str) -> NewModeration {
    NewModeration {
        admin: admin.to_string(),
        title: announcement_label(title),
        description: action.to_string(),
        ..Default::default()
    }
}

/// Describe what an edit changes, in title, description, category order.
/// Empty when nothing changed.
pub fn edit_diff(before: &Ticket, after: &TicketDraft) -> String {
    let fields = [
        ("title", &before.title, &after.title),
        ("description", &before.description, &after.description),
        ("category", &before.category, &after.category),
    ];

    fields
        .iter()
        .filter(|(_, old, new)| old != new)
        .map(|(field, old, new)| format!("changed {field} from \"{old}\" to \"{new}\""))
        .collect::<Vec<_>>()
        .join(" and also ")
}

/// The label always names the ticket as it was before the edit.
pub fn edit_entry(
    admin: &str,
    before: &Ticket,
    after: &TicketDraft,
    reason: &str,
    sensitive: bool,
) -> NewModeration {
    NewModeration {
        admin: admin.to_string(),
        title: ticket_label(&before.title),
        description: edit_diff(before, after),
        description_sensitive: sensitive,
        reason: reason.trim().to_string(),
    }
}
