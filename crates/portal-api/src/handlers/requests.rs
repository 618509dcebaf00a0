//! Citizen service-request intake handler.

use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use serde::Serialize;
use tracing::info;

use portal_db::RequestRepository;
use portal_models::NewCitizenRequest;

use crate::error::{ApiError, ApiResult};
use crate::metrics;
use crate::state::AppState;

/// Response for an accepted request.
#[derive(Serialize)]
pub struct SubmitRequestResponse {
    pub id: i64,
    /// Canonical 11-digit CPF as stored
    pub cpf: String,
    pub message: String,
}

/// Receive a citizen service request.
///
/// The CPF is validated before anything touches the database; a rejection
/// aborts the save and surfaces as a 400 with the reason's message.
pub async fn submit_request(
    State(state): State<AppState>,
    Json(payload): Json<NewCitizenRequest>,
) -> ApiResult<(StatusCode, Json<SubmitRequestResponse>)> {
    let name = payload.name.trim();
    if name.is_empty() {
        return Err(ApiError::bad_request("name is required"));
    }
    let description = payload.description.trim();
    if description.is_empty() {
        return Err(ApiError::bad_request("description is required"));
    }

    let cpf = match payload.validate_cpf() {
        Ok(cpf) => cpf,
        Err(reason) => {
            metrics::record_cpf_rejection(&reason);
            metrics::record_citizen_request("rejected");
            return Err(reason.into());
        }
    };

    let request = RequestRepository::new(state.db.clone())
        .create(name, &cpf, description)
        .await?;
    metrics::record_citizen_request("accepted");
    info!(id = request.id, "citizen request accepted");

    Ok((
        StatusCode::CREATED,
        Json(SubmitRequestResponse {
            id: request.id,
            cpf: request.cpf.as_str().to_string(),
            message: "Request submitted successfully".to_string(),
        }),
    ))
}
