//! Movement type command and query endpoints.

use std::sync::Arc;

use axum::Json;
use axum::extract::State;
use axum::http::StatusCode;
use domain::{MovementDirection, RegisterMovementType};
use event_store::{EventReader, EventWriter};
use projections::MovementTypeSummary;
use serde::{Deserialize, Serialize};

use crate::error::ApiError;
use crate::routes::accounts::AppState;

// -- Request types --

#[derive(Deserialize)]
pub struct RegisterMovementTypeRequest {
    pub direction: MovementDirection,
    pub description: String,
    pub notes: Option<String>,
}

// -- Response types --

#[derive(Serialize)]
pub struct MovementTypeRegisteredResponse {
    pub movement_type_id: String,
}

#[derive(Serialize)]
pub struct MovementTypeResponse {
    pub id: String,
    pub direction: String,
    pub description: String,
    pub notes: Option<String>,
}

impl From<MovementTypeSummary> for MovementTypeResponse {
    fn from(summary: MovementTypeSummary) -> Self {
        Self {
            id: summary.movement_type_id.to_string(),
            direction: summary.direction.to_string(),
            description: summary.description,
            notes: summary.notes,
        }
    }
}

// -- Handlers --

/// POST /movement-types — register a new movement type.
#[tracing::instrument(skip(state, req))]
pub async fn register<S: EventWriter + EventReader + 'static>(
    State(state): State<Arc<AppState<S>>>,
    Json(req): Json<RegisterMovementTypeRequest>,
) -> Result<(StatusCode, Json<MovementTypeRegisteredResponse>), ApiError> {
    let cmd = RegisterMovementType::new(req.direction, req.description, req.notes);
    let movement_type_id = cmd.movement_type_id;

    state.movement_types.register(cmd).await?;

    Ok((
        StatusCode::CREATED,
        Json(MovementTypeRegisteredResponse {
            movement_type_id: movement_type_id.to_string(),
        }),
    ))
}

/// GET /movement-types — list registered movement types from the read model.
#[tracing::instrument(skip(state))]
pub async fn list<S: EventWriter + EventReader + 'static>(
    State(state): State<Arc<AppState<S>>>,
) -> Json<Vec<MovementTypeResponse>> {
    let mut movement_types = state.movement_types_view.all_movement_types().await;
    movement_types.sort_by_key(|summary| summary.registered_at);

    Json(
        movement_types
            .into_iter()
            .map(MovementTypeResponse::from)
            .collect(),
    )
}
