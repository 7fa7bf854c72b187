//! Route definitions for the site API.

pub mod content;
pub mod forms;
pub mod health;
pub mod views;

use axum::Router;

use crate::state::AppState;

/// Build the complete router with all routes.
pub fn build_router(state: AppState) -> Router {
    Router::new()
        .merge(health::routes())
        .merge(content::routes())
        .merge(views::routes())
        .merge(forms::routes())
        .with_state(state)
}
