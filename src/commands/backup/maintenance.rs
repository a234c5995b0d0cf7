use crate::commands::backup::logic::create_backup;
use crate::config::Config;
use crate::db::{BackupRecord, BackupType, DbPool};
use crate::error::{LoungeError, LoungeResult};
use crate::middleware::auth::Claims;
use crate::state::AppState;
use axum::extract::{Extension, Path, Query, State as AxumState};
use axum::Json;
use serde::Deserialize;

pub async fn get_backup_history(pool: &DbPool, limit: i64) -> LoungeResult<Vec<BackupRecord>> {
    Ok(sqlx::query_as::<_, BackupRecord>(
        "SELECT * FROM backup_history ORDER BY created_at DESC, id DESC LIMIT ?",
    )
    .bind(limit)
    .fetch_all(pool)
    .await?)
}

/// Remove one backup: file first, then the metadata row.
///
/// A file that is already gone still counts as a successful delete. Any
/// other filesystem failure keeps the row, marked `orphaned`, so the
/// operator can retry; the call then reports `false`.
pub async fn delete_backup(pool: &DbPool, config: &Config, id: i64) -> LoungeResult<bool> {
    let record = sqlx::query_as::<_, BackupRecord>("SELECT * FROM backup_history WHERE id = ?")
        .bind(id)
        .fetch_optional(pool)
        .await?
        .ok_or_else(|| LoungeError::NotFound(format!("Backup record {} not found", id)))?;

    let path = config.backup_dir.join(&record.filename);
    match std::fs::remove_file(&path) {
        Ok(()) => {}
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            tracing::debug!(filename = %record.filename, "Backup file already absent");
        }
        Err(e) => {
            tracing::warn!(filename = %record.filename, "Could not delete backup file: {}", e);
            sqlx::query("UPDATE backup_history SET status = 'orphaned' WHERE id = ?")
                .bind(id)
                .execute(pool)
                .await?;
            return Ok(false);
        }
    }

    sqlx::query("DELETE FROM backup_history WHERE id = ?")
        .bind(id)
        .execute(pool)
        .await?;
    Ok(true)
}

/// Retention pass: keeps the `keep_count` most recent records of any type
/// and removes only automatic backups outside that window. Manual backups
/// are never pruned.
pub async fn cleanup_old_backups(
    pool: &DbPool,
    config: &Config,
    keep_count: i64,
) -> LoungeResult<u64> {
    let stale = sqlx::query_as::<_, BackupRecord>(
        "SELECT * FROM backup_history
         WHERE backup_type = 'automatic'
           AND id NOT IN (SELECT id FROM backup_history ORDER BY created_at DESC, id DESC LIMIT ?)",
    )
    .bind(keep_count)
    .fetch_all(pool)
    .await?;

    let mut deleted = 0u64;
    for record in stale {
        let path = config.backup_dir.join(&record.filename);
        if let Err(e) = std::fs::remove_file(&path) {
            if e.kind() != std::io::ErrorKind::NotFound {
                tracing::warn!(filename = %record.filename, "Could not delete backup file: {}", e);
            }
        }
        sqlx::query("DELETE FROM backup_history WHERE id = ?")
            .bind(record.id)
            .execute(pool)
            .await?;
        deleted += 1;
    }

    if deleted > 0 {
        tracing::info!(deleted, "Pruned old automatic backups");
    }
    Ok(deleted)
}

#[derive(Deserialize)]
pub struct HistoryQuery {
    pub limit: Option<i64>,
}

#[derive(Deserialize)]
pub struct CleanupPayload {
    pub keep_count: i64,
}

pub async fn get_backup_history_axum(
    AxumState(state): AxumState<AppState>,
    Query(query): Query<HistoryQuery>,
) -> LoungeResult<Json<Vec<BackupRecord>>> {
    let limit = query.limit.unwrap_or(50).clamp(1, 500);
    let history = get_backup_history(&state.pool, limit).await?;
    Ok(Json(history))
}

pub async fn create_manual_backup_axum(
    AxumState(state): AxumState<AppState>,
    claims: Option<Extension<Claims>>,
) -> LoungeResult<Json<BackupRecord>> {
    let created_by = claims.and_then(|Extension(c)| c.username);
    let record = create_backup(&state.pool, &state.config, BackupType::Manual, created_by).await?;
    Ok(Json(record))
}

pub async fn delete_backup_axum(
    AxumState(state): AxumState<AppState>,
    Path(id): Path<i64>,
) -> LoungeResult<Json<bool>> {
    let deleted = delete_backup(&state.pool, &state.config, id).await?;
    Ok(Json(deleted))
}

pub async fn cleanup_old_backups_axum(
    AxumState(state): AxumState<AppState>,
    Json(payload): Json<CleanupPayload>,
) -> LoungeResult<Json<u64>> {
    if payload.keep_count < 1 {
        return Err(LoungeError::Validation(
            "keep_count must be at least 1".to_string(),
        ));
    }
    let deleted = cleanup_old_backups(&state.pool, &state.config, payload.keep_count).await?;
    Ok(Json(deleted))
}
