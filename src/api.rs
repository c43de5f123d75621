use std::path::PathBuf;

use axum::{
    body::Body,
    extract::DefaultBodyLimit,
    http::{HeaderName, Request},
    middleware::{self, Next},
    response::Response,
    routing::post,
    Router,
};
use tower_http::{cors::CorsLayer, services::ServeDir};
use tracing::Instrument;
use uuid::Uuid;

use crate::handlers::{
    handle_ask, handle_hotels, handle_image_search, handle_place_info, handle_places,
    handle_shopping, handle_translate, AppState,
};

/// Largest accepted request body, sized for phone photos.
pub const MAX_UPLOAD_BYTES: usize = 20 * 1024 * 1024;

#[derive(Clone, Debug)]
pub struct ApiConfig {
    /// Built frontend served for `GET /` and every unknown path.
    pub static_dir: PathBuf,
}

pub fn router(state: AppState, config: ApiConfig) -> Router {
    let request_id_layer = middleware::from_fn(assign_request_id);
    Router::new()
        .route("/ask", post(handle_ask))
        .route("/image-search", post(handle_image_search))
        .route("/hotels", post(handle_hotels))
        .route("/places", post(handle_places))
        .route("/shopping", post(handle_shopping))
        .route("/translate", post(handle_translate))
        .route("/place-info", post(handle_place_info))
        .with_state(state)
        .fallback_service(ServeDir::new(config.static_dir))
        .layer(DefaultBodyLimit::max(MAX_UPLOAD_BYTES))
        .layer(CorsLayer::permissive())
        .layer(request_id_layer)
}

async fn assign_request_id(req: Request<Body>, next: Next) -> Response {
    let request_id = Uuid::new_v4().to_string();
    let method = req.method().clone();
    let uri = req.uri().clone();
    let span = tracing::debug_span!("request", %request_id);

    let mut response = next.run(req).instrument(span).await;
    let status = response.status();
    if let Ok(value) = request_id.parse() {
        response
            .headers_mut()
            .insert(HeaderName::from_static("x-request-id"), value);
    }
    tracing::debug!(
        request_id,
        method = %method,
        uri = %uri,
        status = %status,
        "request completed"
    );
    response
}
