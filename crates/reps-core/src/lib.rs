//! Reps Core
//!
//! Pure rules shared by the web handlers and the persistence layer: voter
//! fingerprints, hotness ranking, course/degree taxonomy, input validation,
//! moderation log wording, markdown rendering and visitor pseudonyms.
//! Nothing here touches I/O.

pub mod audit;
pub mod fingerprint;
pub mod hotness;
pub mod markdown;
pub mod namegen;
pub mod otp;
pub mod taxonomy;
pub mod validation;

pub use validation::ValidationError;
