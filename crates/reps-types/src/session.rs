use serde::{Deserialize, Serialize};

/// Maximum number of OTP verification attempts before the login is dropped.
pub const MAX_OTP_ATTEMPTS: u32 = 3;

/// Authentication progress of a visitor session.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum AuthState {
    #[default]
    LoggedOut,
    /// A one-time code was issued to `email` and is awaiting confirmation.
    Verification {
        email: String,
        code: u32,
        attempts: u32,
    },
    LoggedIn { email: String },
}

impl AuthState {
    pub fn is_logged_in(&self) -> bool {
        matches!(self, AuthState::LoggedIn { .. })
    }

    pub fn logged_in_email(&self) -> Option<&str> {
        match self {
            AuthState::LoggedIn { email } => Some(email),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FlashKind {
    Success,
    Info,
    Error,
}

impl FlashKind {
    /// CSS class used by the base template.
    pub fn css_class(self) -> &'static str {
        match self {
            FlashKind::Success => "alert-green",
            FlashKind::Info => "alert-grey",
            FlashKind::Error => "alert-red",
        }
    }
}

/// One-shot message shown on the next rendered page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Flash {
    pub kind: FlashKind,
    pub message: String,
}

impl Flash {
    pub fn success(message: impl Into<String>) -> Self {
        Self { kind: FlashKind::Success, message: message.into() }
    }

    pub fn info(message: impl Into<String>) -> Self {
        Self { kind: FlashKind::Info, message: message.into() }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self { kind: FlashKind::Error, message: message.into() }
    }

    pub fn css_class(&self) -> &'static str {
        self.kind.css_class()
    }
}
