//! Routes of the demo server and the layers installing the engine.

use std::sync::Arc;

use axum::{
    routing::{get, post},
    Extension, Router,
};
use tower::ServiceBuilder;
use tower_http::cors::{Any, CorsLayer};

use crate::backend::handlers::{echo_json, search, show_item, signup};
use crate::backend::inputs::BodyLimit;
use crate::sanitize::Sanitizer;

/// Builds the router. `sanitizer` and `body_limit` reach every
/// [`RequestInputs`](crate::backend::inputs::RequestInputs) as extensions.
pub fn get_router(sanitizer: Arc<Sanitizer>, body_limit: usize) -> Router {
    let shared = ServiceBuilder::new()
        .layer(Extension(sanitizer))
        .layer(Extension(BodyLimit(body_limit)));

    let router = Router::new()
        .route("/items/:id", get(show_item))
        .route("/search", get(search))
        .route("/signup", post(signup))
        .route("/json", post(echo_json))
        .layer(shared);

    // Any origin is allowed in debug builds only
    if cfg!(debug_assertions) {
        let cors = CorsLayer::new()
            .allow_methods(tower_http::cors::AllowMethods::any())
            .allow_origin(Any);
        router.layer(cors)
    } else {
        router
    }
}
