//! Live configuration editor.

use axum::{
    Extension, Form,
    extract::State,
    response::{Html, Redirect},
};
use tracing::{error, info, warn};

use reps_types::config::Configuration;
use reps_types::forms::ConfigForm;
use reps_types::session::Flash;

use crate::error::AppError;
use crate::extract::Admin;
use crate::session::SessionHandle;
use crate::state::AppState;
use crate::views::{ConfigPage, Layout, render};

pub async fn config_page(
    State(state): State<AppState>,
    session: SessionHandle,
) -> Result<Html<String>, AppError> {
    let config = state.config();
    let toml = config.to_toml().map_err(|e| AppError::Internal(e.into()))?;
    render(ConfigPage {
        layout: Layout::new(&config, &session, "Configuration", "config"),
        toml,
    })
}

/// Parse and validate the submitted TOML, swap it in, then persist it.
/// A document that fails to parse leaves the running configuration alone.
pub async fn update_config(
    State(state): State<AppState>,
    session: SessionHandle,
    Extension(admin): Extension<Admin>,
    Form(form): Form<ConfigForm>,
) -> Result<Redirect, AppError> {
    session.verify_csrf(&form.csrf)?;

    let next = match Configuration::from_toml(&form.config) {
        Ok(next) => next,
        Err(e) => {
            warn!("{} submitted an invalid config: {}", admin.name, e);
            return Err(AppError::rejected(e.to_string(), "/config"));
        }
    };

    state.replace_config(next);
    info!("{} replaced the configuration", admin.name);

    let snapshot = state.config();
    let path = state.config_path.clone();
    let saved = tokio::task::spawn_blocking(move || snapshot.save(&path)).await;
    match saved {
        Ok(Ok(())) => session.flash(Flash::success("Configuration saved")),
        Ok(Err(e)) => {
            error!("Failed to write config to {}: {}", state.config_path.display(), e);
            session.flash(Flash::error("Configuration applied but could not be written to disk"));
        }
        Err(e) => {
            error!("spawn_blocking join error: {}", e);
            session.flash(Flash::error("Configuration applied but could not be written to disk"));
        }
    }
    Ok(Redirect::to("/config"))
}
