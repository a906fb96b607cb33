//! HTTP surface: server-rendered pages, forms and the admin area.

pub mod announcements;
pub mod auth;
pub mod complaints;
pub mod error;
pub mod extract;
pub mod mailer;
pub mod middleware;
pub mod pages;
pub mod session;
pub mod settings;
pub mod state;
pub mod tickets;
pub mod views;

use axum::{
    Router,
    middleware::from_fn_with_state,
    routing::{get, post},
};

pub use state::{AppState, AppStateInner};

pub fn router(state: AppState) -> Router {
    let public = Router::new()
        .route("/", get(pages::home))
        .route("/courses", get(pages::courses))
        .route("/lecturers", get(pages::lecturers))
        .route("/privacy", get(pages::privacy))
        .route("/logs", get(pages::moderation_log))
        .route("/preview", post(pages::preview))
        .route("/static/style.css", get(pages::stylesheet))
        // Tickets
        .route("/tickets", get(tickets::list_tickets).post(tickets::filter_tickets))
        .route("/tickets/cat/{category}", get(tickets::list_category))
        .route("/tickets/deg/{degree}", get(tickets::list_degree))
        .route("/tickets/new", get(tickets::new_ticket_form).post(tickets::create_ticket))
        .route("/tickets/{id}", get(tickets::view_ticket).post(tickets::post_comment))
        .route("/tickets/{id}/upvote", post(tickets::upvote_ticket))
        // Announcements
        .route("/a", get(announcements::list_announcements))
        .route("/a/{id}", get(announcements::view_announcement))
        // Complaints
        .route("/complaints", get(complaints::complaints_form).post(complaints::submit_complaint))
        // Auth
        .route("/login", get(auth::login_page).post(auth::login))
        .route("/verify", get(auth::verify_page).post(auth::verify))
        .route("/cancel", post(auth::cancel))
        .route("/logout", post(auth::logout));

    let admin = Router::new()
        .route("/tickets/{id}/resolve", post(tickets::toggle_resolve))
        .route("/tickets/{id}/edit", get(tickets::edit_ticket_form).post(tickets::edit_ticket))
        .route("/tickets/{id}/delete", post(tickets::delete_ticket))
        .route("/tickets/{id}/del/{cid}", post(tickets::delete_comment))
        .route("/a/new", get(announcements::new_announcement_form).post(announcements::create_announcement))
        .route("/a/{id}/edit", get(announcements::edit_announcement_form).post(announcements::edit_announcement))
        .route("/a/{id}/delete", post(announcements::delete_announcement))
        .route("/config", get(settings::config_page).post(settings::update_config))
        .route_layer(from_fn_with_state(state.clone(), middleware::require_admin));

    Router::new()
        .merge(public)
        .merge(admin)
        .layer(from_fn_with_state(state.clone(), middleware::session_layer))
        .with_state(state)
}
