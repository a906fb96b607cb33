use axum::{
    Form,
    extract::State,
    response::{Html, IntoResponse, Redirect, Response},
};
use tracing::{error, info};

use reps_core::taxonomy;
use reps_types::forms::{ComplaintForm, checked};
use reps_types::session::Flash;

use crate::error::AppError;
use crate::session::SessionHandle;
use crate::state::AppState;
use crate::views::{ComplaintConfirmPage, ComplaintsPage, Layout, render};

const NO_RECIPIENTS: &str =
    "Sorry, no class representatives are available for the selected course/category";

pub async fn complaints_form(
    State(state): State<AppState>,
    session: SessionHandle,
) -> Result<Html<String>, AppError> {
    let config = state.config();
    render(ComplaintsPage {
        layout: Layout::new(&config, &session, "Complaints", "complaints"),
        courses: config.courses().to_vec(),
    })
}

pub fn complaint_body(form: &ComplaintForm) -> String {
    let sender = match form.email.trim() {
        "" => "anonymous",
        email => email,
    };
    format!(
        "A complaint submission\nFrom: {}\nCategory: {}\nSubject: {}\nMessage:\n{}",
        sender,
        form.category.trim(),
        form.subject.trim(),
        form.message.trim()
    )
}

/// First submission shows who will receive the complaint; the confirmed
/// resubmission sends it.
pub async fn submit_complaint(
    State(state): State<AppState>,
    session: SessionHandle,
    Form(form): Form<ComplaintForm>,
) -> Result<Response, AppError> {
    session.verify_csrf(&form.csrf)?;
    let config = state.config();
    let category = form.category.trim();

    let reps = taxonomy::reps_for_category(&config, category);
    if reps.is_empty() {
        return Err(AppError::rejected(NO_RECIPIENTS, "/complaints"));
    }

    if !checked(&form.confirm) {
        let page = ComplaintConfirmPage {
            layout: Layout::new(&config, &session, "Confirm complaint", "complaints"),
            category: category.to_string(),
            subject: form.subject.trim().to_string(),
            message: form.message.trim().to_string(),
            email: form.email.trim().to_string(),
            recipients: reps.iter().map(|r| r.name.clone()).collect(),
        };
        return Ok(render(page)?.into_response());
    }

    let recipients: Vec<String> = reps.iter().map(|r| r.email.clone()).collect();
    match state
        .mailer
        .send(&recipients, "Complaint submission", &complaint_body(&form))
        .await
    {
        Ok(()) => {
            info!("Complaint for {} sent to {} representative(s)", category, recipients.len());
            session.flash(Flash::success("Your complaint was sent!"));
        }
        Err(e) => {
            error!("Failed to send complaint: {:#}", e);
            session.flash(Flash::error("Your complaint could not be sent, please try again later"));
        }
    }
    Ok(Redirect::to("/complaints").into_response())
}
