use reps_types::config::Configuration;
use reps_types::models::{AnnouncementDraft, TicketDraft};
use thiserror::Error;

use crate::taxonomy;

pub const MAX_TITLE_CHARS: usize = 80;
pub const MIN_DESCRIPTION_CHARS: usize = 4;
pub const MAX_DESCRIPTION_CHARS: usize = 2048;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("Title or body cannot be empty!")]
    Empty,

    #[error("Title or body is too long!")]
    TooLong,

    #[error("Comment cannot be empty!")]
    EmptyComment,

    #[error("This ticket is resolved and no longer accepts comments")]
    TicketResolved,

    #[error("Invalid category \"{0}\"")]
    UnknownCategory(String),
}

/// Whitespace, control characters and invisible format characters.
pub fn is_improper(c: char) -> bool {
    c.is_whitespace()
        || c.is_control()
        || matches!(
            c,
            '\u{00AD}' | '\u{200B}'..='\u{200F}' | '\u{2060}'..='\u{2064}' | '\u{FEFF}'
        )
}

pub fn trim_improper(s: &str) -> &str {
    s.trim_matches(is_improper)
}

/// Check a ticket submission. The category is checked before the text so
/// that a bad category never reports a misleading length error.
pub fn validate_ticket(
    config: &Configuration,
    title: &str,
    description: &str,
    category: &str,
) -> Result<TicketDraft, ValidationError> {
    let category = category.trim();
    if !taxonomy::has_category(config, category) {
        return Err(ValidationError::UnknownCategory(category.to_string()));
    }

    let title = trim_improper(title);
    let description = trim_improper(description);
    let title_len = title.chars().count();
    let description_len = description.chars().count();

    if title_len == 0 || description_len < MIN_DESCRIPTION_CHARS {
        return Err(ValidationError::Empty);
    }
    if title_len > MAX_TITLE_CHARS || description_len > MAX_DESCRIPTION_CHARS {
        return Err(ValidationError::TooLong);
    }

    Ok(TicketDraft {
        title: title.to_string(),
        description: description.to_string(),
        category: category.to_string(),
    })
}

/// Check an admin edit. Only the category and non-empty fields are enforced;
/// representatives may shorten or lengthen text past the submission limits.
pub fn validate_edit(
    config: &Configuration,
    title: &str,
    description: &str,
    category: &str,
) -> Result<TicketDraft, ValidationError> {
    let category = category.trim();
    if !taxonomy::has_category(config, category) {
        return Err(ValidationError::UnknownCategory(category.to_string()));
    }

    let title = trim_improper(title);
    let description = trim_improper(description);
    if title.is_empty() || description.is_empty() {
        return Err(ValidationError::Empty);
    }

    Ok(TicketDraft {
        title: title.to_string(),
        description: description.to_string(),
        category: category.to_string(),
    })
}

pub fn validate_comment(text: &str) -> Result<String, ValidationError> {
    let text = trim_improper(text);
    if text.is_empty() {
        return Err(ValidationError::EmptyComment);
    }
    Ok(text.to_string())
}

pub fn validate_announcement(
    title: &str,
    description: &str,
    tags: &str,
) -> Result<AnnouncementDraft, ValidationError> {
    let title = trim_improper(title);
    let description = trim_improper(description);
    if title.is_empty() || description.is_empty() {
        return Err(ValidationError::Empty);
    }
    Ok(AnnouncementDraft {
        title: title.to_string(),
        description: description.to_string(),
        tags: tags.trim().to_string(),
    })
}
