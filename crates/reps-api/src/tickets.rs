use axum::{
    Extension, Form,
    extract::{Path, State},
    response::{Html, Redirect},
};
use chrono::Utc;
use tracing::{info, warn};

use reps_core::validation::{self, ValidationError};
use reps_core::{hotness, markdown, taxonomy};
use reps_db::{CommentInsert, VoteOutcome};
use reps_types::forms::{CommentForm, CsrfForm, EditTicketForm, FilterForm, NewTicketForm, checked};
use reps_types::models::{GENERAL_CATEGORY, NewComment};
use reps_types::session::Flash;

use crate::error::AppError;
use crate::extract::{Admin, CommentPath, TicketId, Voter, current_admin};
use crate::session::SessionHandle;
use crate::state::{AppState, blocking};
use crate::views::{Layout, TicketFormPage, TicketPage, TicketsPage, render};

enum Listing {
    All,
    Category(String),
    Degree(String),
}

/// Read failures are logged and treated as a missing record.
pub(crate) fn or_missing<T>(result: Result<Option<T>, AppError>) -> Option<T> {
    result.unwrap_or_else(|e| {
        warn!("Lookup failed: {}", e);
        None
    })
}

pub async fn list_tickets(
    State(state): State<AppState>,
    session: SessionHandle,
) -> Result<Html<String>, AppError> {
    render_listing(state, session, Listing::All).await
}

pub async fn list_category(
    State(state): State<AppState>,
    session: SessionHandle,
    Path(category): Path<String>,
) -> Result<Html<String>, AppError> {
    render_listing(state, session, Listing::Category(category)).await
}

pub async fn list_degree(
    State(state): State<AppState>,
    session: SessionHandle,
    Path(degree): Path<String>,
) -> Result<Html<String>, AppError> {
    render_listing(state, session, Listing::Degree(degree)).await
}

async fn render_listing(
    state: AppState,
    session: SessionHandle,
    listing: Listing,
) -> Result<Html<String>, AppError> {
    let config = state.config();

    let (category, degree) = match &listing {
        Listing::All => (String::new(), String::new()),
        Listing::Category(c) => (c.clone(), String::new()),
        Listing::Degree(d) => (String::new(), d.clone()),
    };

    let (tickets, used) = {
        let category = category.clone();
        blocking(&state, move |db| {
            let tickets = match listing {
                Listing::Category(_) => db.get_tickets_by_category(&category)?,
                Listing::All | Listing::Degree(_) => db.get_tickets()?,
            };
            Ok((tickets, db.used_categories()?))
        })
        .await?
    };

    let mut tickets = if degree.is_empty() {
        tickets
    } else {
        taxonomy::filter_by_degree(&config, tickets, &degree)
    };
    hotness::rank_by_hotness(&mut tickets, Utc::now());

    render(TicketsPage {
        layout: Layout::new(&config, &session, "Tickets", "tickets"),
        has_resolved: tickets.iter().any(|t| t.is_resolved),
        tickets,
        category,
        degree,
        courses: taxonomy::used_courses(&config, &used).into_iter().cloned().collect(),
        degrees: config.loaded_degrees().to_vec(),
    })
}

/// Turn the listing filter form into a category or degree URL.
pub async fn filter_tickets(
    State(state): State<AppState>,
    session: SessionHandle,
    Form(form): Form<FilterForm>,
) -> Result<Redirect, AppError> {
    session.verify_csrf(&form.csrf)?;
    let config = state.config();
    let value = form.category.trim();

    match form.kind.as_str() {
        "category" if taxonomy::has_category(&config, value) => {
            Ok(Redirect::to(&format!("/tickets/cat/{value}")))
        }
        "category" => Err(AppError::rejected("Can't sort by that category", "/tickets")),
        "degree" if taxonomy::has_degree(&config, value) => {
            Ok(Redirect::to(&format!("/tickets/deg/{value}")))
        }
        "degree" => Err(AppError::rejected("Can't sort by that degree", "/tickets")),
        _ => Err(AppError::rejected("Unknown filter", "/tickets")),
    }
}

pub async fn new_ticket_form(
    State(state): State<AppState>,
    session: SessionHandle,
) -> Result<Html<String>, AppError> {
    let config = state.config();
    render(TicketFormPage {
        layout: Layout::new(&config, &session, "New ticket", "tickets"),
        action: "/tickets/new".into(),
        editing: false,
        title: String::new(),
        text: String::new(),
        category: GENERAL_CATEGORY.into(),
        courses: config.courses().to_vec(),
    })
}

pub async fn create_ticket(
    State(state): State<AppState>,
    session: SessionHandle,
    Voter(fingerprint): Voter,
    Form(form): Form<NewTicketForm>,
) -> Result<Redirect, AppError> {
    session.verify_csrf(&form.csrf)?;
    let config = state.config();

    let draft = validation::validate_ticket(&config, &form.title, &form.text, &form.category)
        .map_err(|e| AppError::rejected(e.to_string(), "/tickets/new"))?;

    let id = blocking(&state, move |db| db.insert_ticket(&draft, &fingerprint)).await?;
    info!("Ticket {} created", id);
    Ok(Redirect::to(&format!("/tickets/{id}")))
}

pub async fn view_ticket(
    State(state): State<AppState>,
    session: SessionHandle,
    Voter(fingerprint): Voter,
    TicketId(id): TicketId,
) -> Result<Html<String>, AppError> {
    let found = or_missing(
        blocking(&state, move |db| {
            let Some(ticket) = db.get_ticket(id)? else {
                return Ok(None);
            };
            let comments = db.get_comments_for_ticket(id)?;
            Ok(Some((ticket, comments)))
        })
        .await,
    );
    let Some((ticket, comments)) = found else {
        return Err(AppError::not_found("Ticket", "/tickets"));
    };

    let config = state.config();
    render(TicketPage {
        layout: Layout::new(&config, &session, &ticket.title, "tickets"),
        body_html: markdown::to_html(&ticket.description),
        upvoted: ticket.has_voted(&fingerprint),
        ticket,
        comments,
    })
}

pub async fn post_comment(
    State(state): State<AppState>,
    session: SessionHandle,
    TicketId(id): TicketId,
    Form(form): Form<CommentForm>,
) -> Result<Redirect, AppError> {
    session.verify_csrf(&form.csrf)?;
    let back = format!("/tickets/{id}");

    let text = validation::validate_comment(&form.text)
        .map_err(|e| AppError::rejected(e.to_string(), back.clone()))?;

    let config = state.config();
    let (poster_id, is_admin) = match current_admin(&config, &session) {
        Some(admin) if checked(&form.as_admin) => (admin.name, true),
        _ => (session.pseudonym(), false),
    };

    let comment = NewComment { ticket_id: id, poster_id, text, is_admin };
    match blocking(&state, move |db| db.insert_comment(&comment)).await? {
        CommentInsert::TicketMissing => Err(AppError::not_found("Ticket", "/tickets")),
        CommentInsert::Resolved => Err(AppError::rejected(ValidationError::TicketResolved.to_string(), back)),
        CommentInsert::Inserted(_) => Ok(Redirect::to(&back)),
    }
}

pub async fn upvote_ticket(
    State(state): State<AppState>,
    session: SessionHandle,
    Voter(fingerprint): Voter,
    TicketId(id): TicketId,
    Form(form): Form<CsrfForm>,
) -> Result<Redirect, AppError> {
    session.verify_csrf(&form.csrf)?;

    match blocking(&state, move |db| db.upvote_ticket(id, &fingerprint)).await? {
        VoteOutcome::NotFound => Err(AppError::not_found("Ticket", "/tickets")),
        VoteOutcome::Counted | VoteOutcome::AlreadyVoted | VoteOutcome::Resolved => {
            Ok(Redirect::to(&format!("/tickets/{id}")))
        }
    }
}

// -- Admin --

pub async fn toggle_resolve(
    State(state): State<AppState>,
    session: SessionHandle,
    Extension(admin): Extension<Admin>,
    TicketId(id): TicketId,
    Form(form): Form<CsrfForm>,
) -> Result<Redirect, AppError> {
    session.verify_csrf(&form.csrf)?;

    match blocking(&state, move |db| db.toggle_resolve(id, &admin.name)).await? {
        Some(_) => Ok(Redirect::to(&format!("/tickets/{id}"))),
        None => Err(AppError::not_found("Ticket", "/tickets")),
    }
}

pub async fn edit_ticket_form(
    State(state): State<AppState>,
    session: SessionHandle,
    TicketId(id): TicketId,
) -> Result<Html<String>, AppError> {
    let Some(ticket) = or_missing(blocking(&state, move |db| db.get_ticket(id)).await) else {
        return Err(AppError::not_found("Ticket", "/tickets"));
    };

    let config = state.config();
    render(TicketFormPage {
        layout: Layout::new(&config, &session, "Edit ticket", "tickets"),
        action: format!("/tickets/{id}/edit"),
        editing: true,
        title: ticket.title,
        text: ticket.description,
        category: ticket.category,
        courses: config.courses().to_vec(),
    })
}

pub async fn edit_ticket(
    State(state): State<AppState>,
    session: SessionHandle,
    Extension(admin): Extension<Admin>,
    TicketId(id): TicketId,
    Form(form): Form<EditTicketForm>,
) -> Result<Redirect, AppError> {
    session.verify_csrf(&form.csrf)?;
    let config = state.config();
    let back = format!("/tickets/{id}");

    let draft = match validation::validate_edit(&config, &form.title, &form.text, &form.category) {
        Ok(draft) => draft,
        Err(ValidationError::UnknownCategory(_)) => {
            return Err(AppError::rejected("Invalid category, ticket unchanged", back));
        }
        Err(e) => return Err(AppError::rejected(e.to_string(), format!("{back}/edit"))),
    };

    let sensitive = checked(&form.sensitive);
    let edited = blocking(&state, move |db| {
        db.edit_ticket(id, &draft, &admin.name, &form.reason, sensitive)
    })
    .await?;

    match edited {
        Some(_) => {
            session.flash(Flash::success("Ticket updated!"));
            Ok(Redirect::to(&back))
        }
        None => Err(AppError::not_found("Ticket", "/tickets")),
    }
}

pub async fn delete_ticket(
    State(state): State<AppState>,
    session: SessionHandle,
    Extension(admin): Extension<Admin>,
    TicketId(id): TicketId,
    Form(form): Form<CsrfForm>,
) -> Result<Redirect, AppError> {
    session.verify_csrf(&form.csrf)?;

    match blocking(&state, move |db| db.delete_ticket(id, &admin.name)).await? {
        Some(_) => {
            session.flash(Flash::success("Ticket deleted!"));
            Ok(Redirect::to("/tickets"))
        }
        None => Err(AppError::not_found("Ticket", "/tickets")),
    }
}

pub async fn delete_comment(
    State(state): State<AppState>,
    session: SessionHandle,
    Extension(admin): Extension<Admin>,
    CommentPath(id, comment_id): CommentPath,
    Form(form): Form<CsrfForm>,
) -> Result<Redirect, AppError> {
    session.verify_csrf(&form.csrf)?;
    let back = format!("/tickets/{id}");

    match blocking(&state, move |db| db.delete_comment(id, comment_id, &admin.name)).await? {
        Some(_) => {
            session.flash(Flash::success("Comment deleted!"));
            Ok(Redirect::to(&back))
        }
        None => Err(AppError::not_found("Comment", back)),
    }
}
