use crate::commands;
use crate::state::AppState;
use axum::{
    routing::{get, put},
    Router,
};

pub fn router() -> Router<AppState> {
    Router::new()
        .route(
            "/api/suppliers",
            get(commands::supplier::get_supplier_list_axum)
                .post(commands::supplier::create_supplier_axum),
        )
        .route(
            "/api/suppliers/:id",
            put(commands::supplier::update_supplier_axum)
                .delete(commands::supplier::delete_supplier_axum),
        )
}
