pub mod quotes;

use axum::Router;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::AppState;

/// Build the application router.
///
/// CORS is wide open by design: any origin (mirrored, so credentials
/// stay allowed), all methods, all headers. Suitable for a trusted or
/// development deployment only.
pub fn router(state: AppState) -> Router {
    Router::new()
        .merge(quotes::routes())
        .layer(CorsLayer::very_permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
