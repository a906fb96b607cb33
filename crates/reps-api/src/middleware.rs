use axum::{
    extract::{Request, State},
    http::{HeaderValue, header},
    middleware::Next,
    response::{IntoResponse, Redirect, Response},
};
use axum_extra::extract::CookieJar;
use tracing::warn;

use crate::error::PendingFlash;
use crate::extract::current_admin;
use crate::session::{COOKIE_NAME, SESSION_MAX_AGE_SECS, SessionHandle};
use crate::state::AppState;

/// Attach the visitor's session to the request. Sessions the request never
/// touched are dropped without setting a cookie.
pub async fn session_layer(
    State(state): State<AppState>,
    jar: CookieJar,
    mut req: Request,
    next: Next,
) -> Response {
    let cookie = jar.get(COOKIE_NAME).map(|c| c.value().to_string());
    let handle = state.sessions.load_or_create(cookie.as_deref()).await;
    req.extensions_mut().insert(handle.clone());

    let mut response = next.run(req).await;

    if let Some(PendingFlash(flash)) = response.extensions_mut().remove::<PendingFlash>() {
        handle.flash(flash);
    }
    if !state.sessions.commit(&handle).await {
        return response;
    }

    let id = &handle.id;
    let cookie = format!(
        "{COOKIE_NAME}={id}; Path=/; Max-Age={SESSION_MAX_AGE_SECS}; HttpOnly; SameSite=Lax"
    );
    match HeaderValue::from_str(&cookie) {
        Ok(value) => {
            response.headers_mut().append(header::SET_COOKIE, value);
        }
        Err(e) => warn!("Could not encode session cookie: {}", e),
    }
    response
}

/// Only logged-in class representatives still listed in the configuration
/// get through. Everyone else is sent home.
pub async fn require_admin(
    State(state): State<AppState>,
    session: SessionHandle,
    mut req: Request,
    next: Next,
) -> Response {
    let config = state.config();
    match current_admin(&config, &session) {
        Some(admin) => {
            req.extensions_mut().insert(admin);
            next.run(req).await
        }
        None => Redirect::to("/").into_response(),
    }
}
