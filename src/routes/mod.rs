use crate::state::AppState;
use axum::Router;

pub mod auth;
pub mod backup;
pub mod inventory;
pub mod supplier;

pub fn create_router() -> Router<AppState> {
    Router::new()
        .merge(auth::router())
        .merge(backup::router())
        .merge(inventory::router())
        .merge(supplier::router())
}
