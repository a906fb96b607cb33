//! One-time-code login for class representatives.

use axum::{
    Form,
    extract::State,
    response::{IntoResponse, Redirect, Response},
};
use tracing::{info, warn};

use reps_core::otp::{self, VerifyOutcome};
use reps_types::forms::{CsrfForm, LoginForm, VerifyForm};
use reps_types::session::{AuthState, Flash};

use crate::error::AppError;
use crate::session::SessionHandle;
use crate::state::AppState;
use crate::views::{Layout, LoginPage, VerifyPage, render};

pub async fn login_page(
    State(state): State<AppState>,
    session: SessionHandle,
) -> Result<Response, AppError> {
    match session.auth() {
        AuthState::Verification { .. } => return Ok(Redirect::to("/verify").into_response()),
        AuthState::LoggedIn { .. } => return Ok(Redirect::to("/").into_response()),
        AuthState::LoggedOut => {}
    }

    let config = state.config();
    let page = LoginPage {
        layout: Layout::new(&config, &session, "Login", "login"),
        domain: config.uni_email_domain.clone(),
    };
    Ok(render(page)?.into_response())
}

pub async fn login(
    State(state): State<AppState>,
    session: SessionHandle,
    Form(form): Form<LoginForm>,
) -> Result<Redirect, AppError> {
    session.verify_csrf(&form.csrf)?;
    match session.auth() {
        AuthState::Verification { .. } => return Ok(Redirect::to("/verify")),
        AuthState::LoggedIn { .. } => return Ok(Redirect::to("/")),
        AuthState::LoggedOut => {}
    }

    let config = state.config();
    let Some(rep) = otp::roster_lookup(&config, &form.email) else {
        return Err(AppError::rejected("This is for class representatives only", "/login"));
    };

    let code = otp::issue_code(&mut rand::rng());
    if !config.dev_mode {
        let body = format!(
            "Your {} verification code is {}\n\nIf you did not request it, you can ignore this email.",
            config.site_name, code
        );
        if let Err(e) = state.mailer.send(&[rep.email.clone()], "Verification code", &body).await {
            warn!("Failed to send verification code to {}: {:#}", rep.email, e);
            return Err(AppError::rejected("Could not send the verification email, please try again", "/login"));
        }
    }

    info!("Verification code issued for {}", rep.email);
    session.set_auth(AuthState::Verification {
        email: rep.email.clone(),
        code,
        attempts: 0,
    });
    Ok(Redirect::to("/verify"))
}

pub async fn verify_page(
    State(state): State<AppState>,
    session: SessionHandle,
) -> Result<Response, AppError> {
    let email = match session.auth() {
        AuthState::LoggedOut => return Ok(Redirect::to("/login").into_response()),
        AuthState::LoggedIn { .. } => {
            session.flash(Flash::info("You are already logged in!"));
            return Ok(Redirect::to("/").into_response());
        }
        AuthState::Verification { email, .. } => email,
    };

    let config = state.config();
    let page = VerifyPage {
        layout: Layout::new(&config, &session, "Verification", "login"),
        email,
    };
    Ok(render(page)?.into_response())
}

pub async fn verify(
    State(state): State<AppState>,
    session: SessionHandle,
    Form(form): Form<VerifyForm>,
) -> Result<Redirect, AppError> {
    session.verify_csrf(&form.csrf)?;
    let dev_mode = state.config().dev_mode;

    match session.update_auth(|auth| otp::verify(auth, &form.code, dev_mode)) {
        VerifyOutcome::NotPending => Ok(Redirect::to("/login")),
        VerifyOutcome::AlreadyLoggedIn => Ok(Redirect::to("/")),
        VerifyOutcome::TooManyAttempts => Err(AppError::rejected(
            "You reached the maximum number of attempts. Please try again later.",
            "/",
        )),
        VerifyOutcome::WrongCode => Err(AppError::rejected(
            "The code you entered is invalid, make sure you use the latest code sent to you.",
            "/verify",
        )),
        VerifyOutcome::Verified => {
            if let Some(email) = session.auth().logged_in_email() {
                info!("{} logged in", email);
            }
            Ok(Redirect::to("/"))
        }
    }
}

pub async fn cancel(session: SessionHandle, Form(form): Form<CsrfForm>) -> Result<Redirect, AppError> {
    session.verify_csrf(&form.csrf)?;
    if matches!(session.auth(), AuthState::Verification { .. }) {
        session.set_auth(AuthState::LoggedOut);
    }
    Ok(Redirect::to("/login"))
}

pub async fn logout(session: SessionHandle, Form(form): Form<CsrfForm>) -> Result<Redirect, AppError> {
    session.verify_csrf(&form.csrf)?;
    session.set_auth(AuthState::LoggedOut);
    Ok(Redirect::to("/"))
}
