use std::convert::Infallible;
use std::net::SocketAddr;

use axum::extract::{ConnectInfo, FromRequestParts, Path};
use axum::http::header;
use axum::http::request::Parts;

use reps_core::fingerprint::{client_address, voter_fingerprint};
use reps_core::taxonomy;
use reps_types::config::Configuration;

use crate::error::AppError;
use crate::session::SessionHandle;
use crate::state::AppState;

/// A logged-in class representative.
#[derive(Debug, Clone)]
pub struct Admin {
    pub name: String,
}

pub fn current_admin(config: &Configuration, session: &SessionHandle) -> Option<Admin> {
    let auth = session.auth();
    let email = auth.logged_in_email()?;
    taxonomy::find_rep_by_email(config, email).map(|rep| Admin { name: rep.name.clone() })
}

/// Peppered fingerprint of the requesting client.
#[derive(Debug, Clone)]
pub struct Voter(pub String);

impl FromRequestParts<AppState> for Voter {
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let forwarded = parts
            .headers
            .get("x-forwarded-for")
            .and_then(|v| v.to_str().ok());
        let peer = parts
            .extensions
            .get::<ConnectInfo<SocketAddr>>()
            .map(|ConnectInfo(addr)| addr.ip().to_string());
        let user_agent = parts
            .headers
            .get(header::USER_AGENT)
            .and_then(|v| v.to_str().ok())
            .unwrap_or_default();

        let address = client_address(forwarded, peer.as_deref());
        let config = state.config();
        Ok(Voter(voter_fingerprint(
            config.fingerprint_scheme,
            &address,
            user_agent,
            &config.voter_pepper,
        )))
    }
}

/// Path parameters that fail to parse are reported like a missing record.
async fn path_or_missing<T>(parts: &mut Parts, what: &'static str, back: &str) -> Result<T, AppError>
where
    T: serde::de::DeserializeOwned + Send,
{
    Path::<T>::from_request_parts(parts, &())
        .await
        .map(|Path(value)| value)
        .map_err(|_| AppError::not_found(what, back))
}

/// `{id}` of a `/tickets/{id}` route.
#[derive(Debug, Clone, Copy)]
pub struct TicketId(pub i64);

impl<S: Send + Sync> FromRequestParts<S> for TicketId {
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        path_or_missing(parts, "Ticket", "/tickets").await.map(TicketId)
    }
}

/// `{id}` and `{cid}` of `/tickets/{id}/del/{cid}`.
#[derive(Debug, Clone, Copy)]
pub struct CommentPath(pub i64, pub i64);

impl<S: Send + Sync> FromRequestParts<S> for CommentPath {
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        path_or_missing(parts, "Comment", "/tickets")
            .await
            .map(|(ticket, comment)| CommentPath(ticket, comment))
    }
}

#[derive(Debug, Clone, Copy)]
pub struct AnnouncementId(pub i64);

impl<S: Send + Sync> FromRequestParts<S> for AnnouncementId {
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        path_or_missing(parts, "Announcement", "/a").await.map(AnnouncementId)
    }
}
