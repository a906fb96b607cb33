use axum::{
    Form,
    extract::State,
    http::header,
    response::{Html, IntoResponse},
};

use reps_core::markdown;
use reps_types::forms::PreviewForm;

use crate::error::AppError;
use crate::extract::current_admin;
use crate::session::SessionHandle;
use crate::state::{AppState, blocking};
use crate::views::{CoursesPage, IndexPage, LecturersPage, Layout, LogEntry, LogsPage, PrivacyPage, render};

const STYLESHEET: &str = include_str!("../static/style.css");

pub async fn home(State(state): State<AppState>, session: SessionHandle) -> Result<Html<String>, AppError> {
    let config = state.config();
    render(IndexPage {
        layout: Layout::new(&config, &session, "Home", "home"),
        instance: config.instance_config.clone(),
    })
}

pub async fn courses(State(state): State<AppState>, session: SessionHandle) -> Result<Html<String>, AppError> {
    let config = state.config();
    render(CoursesPage {
        layout: Layout::new(&config, &session, "Courses", "courses"),
        courses: config.courses().to_vec(),
    })
}

pub async fn lecturers(State(state): State<AppState>, session: SessionHandle) -> Result<Html<String>, AppError> {
    let config = state.config();
    render(LecturersPage {
        layout: Layout::new(&config, &session, "Lecturers", "lecturers"),
        lecturers: config.instance_config.lecturers.clone(),
    })
}

pub async fn privacy(State(state): State<AppState>, session: SessionHandle) -> Result<Html<String>, AppError> {
    let config = state.config();
    render(PrivacyPage {
        layout: Layout::new(&config, &session, "Privacy Policy", "privacy"),
    })
}

/// The moderation log, newest first. Sensitive descriptions are only shown
/// to class representatives.
pub async fn moderation_log(
    State(state): State<AppState>,
    session: SessionHandle,
) -> Result<Html<String>, AppError> {
    let moderations = blocking(&state, |db| db.get_moderations()).await?;
    let config = state.config();
    let is_admin = current_admin(&config, &session).is_some();

    let entries = moderations
        .into_iter()
        .map(|m| {
            let hidden = m.description_sensitive && !is_admin;
            LogEntry {
                admin: m.admin,
                title: m.title,
                description: if hidden { String::new() } else { m.description },
                hidden,
                reason: m.reason,
                created: m.created_at.format("%d %b %Y %H:%M").to_string(),
            }
        })
        .collect();

    render(LogsPage {
        layout: Layout::new(&config, &session, "Moderation log", "logs"),
        entries,
    })
}

/// Render markdown for the editor preview pane.
pub async fn preview(Form(form): Form<PreviewForm>) -> Html<String> {
    Html(markdown::to_html(&form.text))
}

pub async fn stylesheet() -> impl IntoResponse {
    ([(header::CONTENT_TYPE, "text/css; charset=utf-8")], STYLESHEET)
}
