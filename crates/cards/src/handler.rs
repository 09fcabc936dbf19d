use crate::models::{Card, CardFilter, CardPayload};
use crate::service::{CardError, CardService};
use axum::{
    extract::{
        rejection::{JsonRejection, QueryRejection},
        Path, Query, State,
    },
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use common::AppState;
use std::sync::Arc;
use serde_json::json;

impl IntoResponse for CardError {
    fn into_response(self) -> Response {
        let (status, msg) = match self {
            CardError::InvalidInput(msg) => (StatusCode::BAD_REQUEST, msg),
            CardError::NotFound => (StatusCode::NOT_FOUND, "Card not found".to_string()),
            // Clients see duplicates exactly like any other server fault.
            CardError::DuplicateName(detail) => {
                tracing::warn!(%detail, "Rejected duplicate card name");
                (StatusCode::INTERNAL_SERVER_ERROR, "Internal server error".to_string())
            }
            CardError::Infrastructure(detail) => {
                tracing::error!(%detail, "Card store failure");
                (StatusCode::INTERNAL_SERVER_ERROR, "Internal server error".to_string())
            }
        };

        (status, Json(json!({ "error": msg }))).into_response()
    }
}

impl From<JsonRejection> for CardError {
    fn from(rejection: JsonRejection) -> Self {
        CardError::InvalidInput(rejection.body_text())
    }
}

impl From<QueryRejection> for CardError {
    fn from(rejection: QueryRejection) -> Self {
        CardError::InvalidInput(rejection.body_text())
    }
}

/// Ids that are not valid integers cannot exist, so they are simply not found.
fn parse_id(raw: &str) -> Result<i64, CardError> {
    raw.parse().map_err(|_| CardError::NotFound)
}

pub fn cards_router(state: Arc<AppState>) -> Router<Arc<AppState>> {
    Router::new()
        .route("/", get(list_cards).post(create_card))
        .route("/{id}", get(get_card).put(update_card).delete(delete_card))
        .with_state(state)
}

async fn list_cards(
    State(state): State<Arc<AppState>>,
    filter: Result<Query<CardFilter>, QueryRejection>,
) -> Result<Json<Vec<Card>>, CardError> {
    let Query(filter) = filter?;
    let cards = CardService::list_cards(&state.db, &filter).await?;
    Ok(Json(cards))
}

async fn create_card(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<CardPayload>, JsonRejection>,
) -> Result<impl IntoResponse, CardError> {
    let Json(payload) = payload?;
    let card = CardService::create_card(&state.db, payload).await?;
    Ok((StatusCode::CREATED, Json(card)))
}

async fn get_card(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<Card>, CardError> {
    let card = CardService::get_card(&state.db, parse_id(&id)?).await?;
    Ok(Json(card))
}

async fn update_card(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    payload: Result<Json<CardPayload>, JsonRejection>,
) -> Result<Json<Card>, CardError> {
    let id = parse_id(&id)?;
    let Json(payload) = payload?;
    let card = CardService::update_card(&state.db, id, payload).await?;
    Ok(Json(card))
}

async fn delete_card(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, CardError> {
    CardService::delete_card(&state.db, parse_id(&id)?).await?;
    Ok(StatusCode::NO_CONTENT)
}
