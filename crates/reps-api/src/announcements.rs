use axum::{
    Extension, Form,
    extract::State,
    response::{Html, Redirect},
};
use chrono::{DateTime, Utc};

use reps_core::{markdown, validation};
use reps_types::forms::{AnnouncementForm, CsrfForm};
use reps_types::session::Flash;

use crate::error::AppError;
use crate::extract::{Admin, AnnouncementId};
use crate::session::SessionHandle;
use crate::state::{AppState, blocking};
use crate::tickets::or_missing;
use crate::views::{AnnouncementFormPage, AnnouncementPage, AnnouncementSummary, AnnouncementsPage, Layout, render};

fn date(at: DateTime<Utc>) -> String {
    at.format("%d %b %Y").to_string()
}

pub async fn list_announcements(
    State(state): State<AppState>,
    session: SessionHandle,
) -> Result<Html<String>, AppError> {
    let announcements = blocking(&state, |db| db.get_announcements()).await?;
    let config = state.config();

    render(AnnouncementsPage {
        layout: Layout::new(&config, &session, "Announcements", "announcements"),
        announcements: announcements
            .into_iter()
            .map(|a| AnnouncementSummary {
                id: a.id,
                tags: a.tag_list().into_iter().map(String::from).collect(),
                summary: markdown::summarise(&a.description),
                created: date(a.created_at),
                title: a.title,
            })
            .collect(),
    })
}

pub async fn view_announcement(
    State(state): State<AppState>,
    session: SessionHandle,
    AnnouncementId(id): AnnouncementId,
) -> Result<Html<String>, AppError> {
    let Some(announcement) = or_missing(blocking(&state, move |db| db.get_announcement(id)).await) else {
        return Err(AppError::not_found("Announcement", "/a"));
    };

    let config = state.config();
    render(AnnouncementPage {
        layout: Layout::new(&config, &session, &announcement.title, "announcements"),
        id: announcement.id,
        tags: announcement.tag_list().into_iter().map(String::from).collect(),
        created: date(announcement.created_at),
        updated: date(announcement.updated_at),
        body_html: markdown::to_html(&announcement.description),
        title: announcement.title,
    })
}

// -- Admin --

pub async fn new_announcement_form(
    State(state): State<AppState>,
    session: SessionHandle,
) -> Result<Html<String>, AppError> {
    let config = state.config();
    render(AnnouncementFormPage {
        layout: Layout::new(&config, &session, "New announcement", "announcements"),
        action: "/a/new".into(),
        editing: false,
        title: String::new(),
        text: String::new(),
        tags: String::new(),
    })
}

pub async fn create_announcement(
    State(state): State<AppState>,
    session: SessionHandle,
    Extension(admin): Extension<Admin>,
    Form(form): Form<AnnouncementForm>,
) -> Result<Redirect, AppError> {
    session.verify_csrf(&form.csrf)?;

    let draft = validation::validate_announcement(&form.title, &form.text, &form.tags)
        .map_err(|e| AppError::rejected(e.to_string(), "/a/new"))?;

    let id = blocking(&state, move |db| db.create_announcement(&draft, &admin.name)).await?;
    Ok(Redirect::to(&format!("/a/{id}")))
}

pub async fn edit_announcement_form(
    State(state): State<AppState>,
    session: SessionHandle,
    AnnouncementId(id): AnnouncementId,
) -> Result<Html<String>, AppError> {
    let Some(announcement) = or_missing(blocking(&state, move |db| db.get_announcement(id)).await) else {
        return Err(AppError::not_found("Announcement", "/a"));
    };

    let config = state.config();
    render(AnnouncementFormPage {
        layout: Layout::new(&config, &session, "Edit announcement", "announcements"),
        action: format!("/a/{id}/edit"),
        editing: true,
        title: announcement.title,
        text: announcement.description,
        tags: announcement.tags,
    })
}

pub async fn edit_announcement(
    State(state): State<AppState>,
    session: SessionHandle,
    Extension(admin): Extension<Admin>,
    AnnouncementId(id): AnnouncementId,
    Form(form): Form<AnnouncementForm>,
) -> Result<Redirect, AppError> {
    session.verify_csrf(&form.csrf)?;

    let draft = validation::validate_announcement(&form.title, &form.text, &form.tags)
        .map_err(|e| AppError::rejected(e.to_string(), format!("/a/{id}/edit")))?;

    if blocking(&state, move |db| db.update_announcement(id, &draft, &admin.name)).await? {
        Ok(Redirect::to(&format!("/a/{id}")))
    } else {
        Err(AppError::not_found("Announcement", "/a"))
    }
}

pub async fn delete_announcement(
    State(state): State<AppState>,
    session: SessionHandle,
    Extension(admin): Extension<Admin>,
    AnnouncementId(id): AnnouncementId,
    Form(form): Form<CsrfForm>,
) -> Result<Redirect, AppError> {
    session.verify_csrf(&form.csrf)?;

    match blocking(&state, move |db| db.delete_announcement(id, &admin.name)).await? {
        Some(_) => {
            session.flash(Flash::success("Announcement deleted!"));
            Ok(Redirect::to("/a"))
        }
        None => Err(AppError::not_found("Announcement", "/a")),
    }
}
