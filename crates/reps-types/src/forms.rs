//! URL-encoded form bodies accepted by the web handlers.
//!
//! Every mutating form carries the session CSRF token in `_csrf`.

use serde::Deserialize;

/// HTML checkboxes submit `on` (or `1` from hidden inputs) when ticked.
pub fn checked(value: &Option<String>) -> bool {
    matches!(value.as_deref(), Some("on" | "1" | "true"))
}

#[derive(Debug, Clone, Deserialize)]
pub struct CsrfForm {
    #[serde(rename = "_csrf", default)]
    pub csrf: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct NewTicketForm {
    #[serde(rename = "_csrf", default)]
    pub csrf: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub text: String,
    #[serde(default)]
    pub category: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CommentForm {
    #[serde(rename = "_csrf", default)]
    pub csrf: String,
    #[serde(default)]
    pub text: String,
    #[serde(default)]
    pub as_admin: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct EditTicketForm {
    #[serde(rename = "_csrf", default)]
    pub csrf: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub text: String,
    #[serde(default)]
    pub category: String,
    #[serde(default)]
    pub reason: String,
    #[serde(default)]
    pub sensitive: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct FilterForm {
    #[serde(rename = "_csrf", default)]
    pub csrf: String,
    #[serde(rename = "type", default)]
    pub kind: String,
    #[serde(default)]
    pub category: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AnnouncementForm {
    #[serde(rename = "_csrf", default)]
    pub csrf: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub text: String,
    #[serde(default)]
    pub tags: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ComplaintForm {
    #[serde(rename = "_csrf", default)]
    pub csrf: String,
    #[serde(default)]
    pub category: String,
    #[serde(default)]
    pub subject: String,
    #[serde(default)]
    pub message: String,
    /// Optional reply address. Empty means anonymous.
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub confirm: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoginForm {
    #[serde(rename = "_csrf", default)]
    pub csrf: String,
    /// Local part only. The configured university domain is appended.
    #[serde(default)]
    pub email: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct VerifyForm {
    #[serde(rename = "_csrf", default)]
    pub csrf: String,
    #[serde(default)]
    pub code: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ConfigForm {
    #[serde(rename = "_csrf", default)]
    pub csrf: String,
    #[serde(default)]
    pub config: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct PreviewForm {
    #[serde(default)]
    pub text: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn checkbox_values() {
        assert!(checked(&Some("on".into())));
        assert!(checked(&Some("1".into())));
        assert!(!checked(&Some("off".into())));
        assert!(!checked(&None));
    }
}
