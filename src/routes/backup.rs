use crate::commands;
use crate::state::AppState;
use axum::{
    extract::DefaultBodyLimit,
    routing::{delete, get, post},
    Router,
};

// Restore uploads carry whole database files, far past axum's default
// 2 MB body cap.
const RESTORE_BODY_LIMIT: usize = 512 * 1024 * 1024;

pub fn router() -> Router<AppState> {
    Router::new()
        .route(
            "/api/backup",
            get(commands::backup::logic::download_backup_axum)
                .post(commands::backup::logic::restore_backup_axum)
                .layer(DefaultBodyLimit::max(RESTORE_BODY_LIMIT)),
        )
        .route(
            "/api/backup/history",
            get(commands::backup::maintenance::get_backup_history_axum)
                .post(commands::backup::maintenance::create_manual_backup_axum),
        )
        .route(
            "/api/backup/history/:id",
            delete(commands::backup::maintenance::delete_backup_axum),
        )
        .route(
            "/api/backup/cleanup",
            post(commands::backup::maintenance::cleanup_old_backups_axum),
        )
        .route(
            "/api/backup/settings",
            get(commands::backup::settings::get_backup_settings_axum)
                .put(commands::backup::settings::update_backup_settings_axum),
        )
}
