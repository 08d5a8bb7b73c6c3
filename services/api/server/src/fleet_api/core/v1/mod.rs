use axum::Router;

pub(crate) mod fleet;

pub fn get_routes(state: crate::AppState) -> Router {
    fleet::get_routes(state)
}
