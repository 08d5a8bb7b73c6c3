use axum::Router;
use axum::routing::post;

pub mod connect;
pub mod errors;
pub mod export;
pub mod query;

mod validators;

pub fn get_routes(state: crate::AppState) -> Router {
    Router::new()
        .route("/connect", post(connect::handler::handler))
        .route("/query", post(query::handler::handler))
        .route("/query/export.csv", post(export::handler::handler))
        .with_state(state)
}
