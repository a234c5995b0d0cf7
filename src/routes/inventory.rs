use crate::commands;
use crate::state::AppState;
use axum::{
    routing::{get, post, put},
    Router,
};

pub fn router() -> Router<AppState> {
    Router::new()
        .route(
            "/api/inventory/items",
            get(commands::inventory::item::get_item_list_axum)
                .post(commands::inventory::item::create_item_axum),
        )
        .route(
            "/api/inventory/items/:id",
            put(commands::inventory::item::update_item_axum)
                .delete(commands::inventory::item::delete_item_axum),
        )
        .route(
            "/api/inventory/items/:id/recount",
            post(commands::inventory::movement::recount_stock_axum),
        )
        .route(
            "/api/inventory/alerts",
            get(commands::inventory::item::get_stock_alerts_axum),
        )
        .route(
            "/api/inventory/movements",
            get(commands::inventory::movement::get_movements_axum)
                .post(commands::inventory::movement::create_movement_axum),
        )
}
