use axum::{
    extract::{FromRequest, Request, State},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    Form, Json,
};
use common::AppState;
use serde::Deserialize;
use serde_json::json;
use std::sync::Arc;

#[derive(Deserialize)]
pub struct Credentials {
    pub username: String,
    pub password: String,
}

fn is_form(request: &Request) -> bool {
    request
        .headers()
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .is_some_and(|ct| ct.starts_with("application/x-www-form-urlencoded"))
}

async fn read_credentials(request: Request) -> Result<Credentials, Response> {
    let bad_request = |text: String| (StatusCode::BAD_REQUEST, Json(json!({ "error": text }))).into_response();

    if is_form(&request) {
        Form::<Credentials>::from_request(request, &())
            .await
            .map(|Form(creds)| creds)
            .map_err(|rejection| bad_request(rejection.body_text()))
    } else {
        Json::<Credentials>::from_request(request, &())
            .await
            .map(|Json(creds)| creds)
            .map_err(|rejection| bad_request(rejection.body_text()))
    }
}

/// Exchanges admin credentials for a token. The body of a 200 is the bare token.
pub async fn authenticate(
    State(state): State<Arc<AppState>>,
    request: Request,
) -> Response {
    let creds = match read_credentials(request).await {
        Ok(creds) => creds,
        Err(response) => return response,
    };

    match state.auth.authenticate(&creds.username, &creds.password) {
        Ok(token) => {
            tracing::info!(username = %creds.username, "Issued token");
            (StatusCode::OK, token).into_response()
        }
        Err(err) => {
            tracing::warn!(username = %creds.username, "Rejected login attempt");
            err.into_response()
        }
    }
}
