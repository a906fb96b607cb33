//! One-time-password login for class representatives.

use rand::Rng;
use reps_types::config::{ClassRepresentative, Configuration};
use reps_types::session::{AuthState, MAX_OTP_ATTEMPTS};

use crate::taxonomy;

pub const CODE_RANGE: std::ops::Range<u32> = 100_000..999_999;

/// Look up the representative owning `local_part` + the university domain.
pub fn roster_lookup<'a>(config: &'a Configuration, local_part: &str) -> Option<&'a ClassRepresentative> {
    let email = format!("{}{}", local_part.trim(), config.uni_email_domain);
    taxonomy::find_rep_by_email(config, &email)
}

pub fn issue_code<R: Rng + ?Sized>(rng: &mut R) -> u32 {
    rng.random_range(CODE_RANGE)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VerifyOutcome {
    /// No verification was in progress.
    NotPending,
    AlreadyLoggedIn,
    TooManyAttempts,
    WrongCode,
    Verified,
}

/// Apply one verification attempt to `state`. The attempt counter is bumped
/// before the code is compared, so the fourth attempt fails regardless of
/// the code. Dev mode accepts any code.
pub fn verify(state: &mut AuthState, submitted: &str, dev_mode: bool) -> VerifyOutcome {
    let (email, code, attempts) = match state {
        AuthState::LoggedOut => return VerifyOutcome::NotPending,
        AuthState::LoggedIn { .. } => return VerifyOutcome::AlreadyLoggedIn,
        AuthState::Verification { email, code, attempts } => (email, *code, attempts),
    };

    *attempts += 1;
    if *attempts > MAX_OTP_ATTEMPTS {
        *state = AuthState::LoggedOut;
        return VerifyOutcome::TooManyAttempts;
    }

    let matches = submitted.trim().parse::<u32>().map(|c| c == code).unwrap_or(false);
    if !matches && !dev_mode {
        return VerifyOutcome::WrongCode;
    }

    *state = AuthState::LoggedIn { email: std::mem::take(email) };
    VerifyOutcome::Verified
}
