pub mod assets;
pub mod feed;
pub mod home;
pub mod write;

use axum::routing::get;
use axum::Router;
use tower_http::trace::TraceLayer;

use crate::state::AppState;

/// The full application router, ready to serve.
pub fn app(state: AppState) -> Router {
    Router::new()
        .route("/", get(home::index))
        .route("/assets/{*path}", get(assets::serve))
        .merge(feed::router())
        .merge(write::router())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
