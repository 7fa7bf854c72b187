//! Form submission endpoint.
//!
//! - POST /api/forms/{form} - Validate and store a contact or enquiry form

use axum::{
    Json, Router,
    extract::{Path, State},
    http::StatusCode,
    routing::post,
};

use campus_client::FormReceipt;
use campus_core::{FormKind, LeadSubmission};

use crate::error::ApiResult;
use crate::extract::JsonBody;
use crate::state::AppState;

/// POST /api/forms/{form} - Store a submission in the CMS.
///
/// # Response
///
/// - 201 Created: FormReceipt
/// - 400 Bad Request: Malformed body, missing name or invalid email
/// - 404 Not Found: Unknown form
/// - CMS status: The CMS rejected the submission
async fn submit_form(
    State(state): State<AppState>,
    Path(form): Path<String>,
    JsonBody(lead): JsonBody<LeadSubmission>,
) -> ApiResult<(StatusCode, Json<FormReceipt>)> {
    let form: FormKind = form.parse()?;
    lead.validate()?;

    let receipt = state.client().submit_form(form, &lead).await?;
    Ok((StatusCode::CREATED, Json(receipt)))
}

/// Build form routes.
pub fn routes() -> Router<AppState> {
    Router::new().route("/api/forms/{form}", post(submit_form))
}
