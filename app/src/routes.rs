use axum::{middleware, routing::post, Router};
use common::{auth::require_token, AppState};
use std::sync::Arc;
use crate::handlers;

pub fn app_router(state: Arc<AppState>) -> Router {
    // Protected Routes
    let protected_routes = Router::<Arc<AppState>>::new()
        .nest("/api/cards", cards::handler::cards_router(state.clone()))
        .route_layer(middleware::from_fn_with_state(state.clone(), require_token));

    Router::<Arc<AppState>>::new()
        .route("/api/authenticate", post(handlers::auth::authenticate))
        .merge(protected_routes)
        // Registered last so it reaches every route above.
        .method_not_allowed_fallback(handlers::fallback::method_not_allowed)
        .fallback(handlers::fallback::not_found)
        .with_state(state)
}
