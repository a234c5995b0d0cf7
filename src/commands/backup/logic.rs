use crate::commands::backup::settings::advance_schedule;
use crate::config::Config;
use crate::db::{BackupRecord, BackupType, DbPool};
use crate::error::{LoungeError, LoungeResult};
use crate::middleware::auth::Claims;
use crate::state::AppState;
use axum::extract::{Extension, Multipart, State as AxumState};
use axum::http::header;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;

const SQLITE_MAGIC: &[u8] = b"SQLite format 3\0";

/// Take a point-in-time copy of the primary database file and record it.
///
/// `VACUUM INTO` snapshots a consistent image without blocking other
/// readers. A failed copy inserts no history row; the error goes back to
/// the caller. Automatic backups also advance the schedule.
pub async fn create_backup(
    pool: &DbPool,
    config: &Config,
    backup_type: BackupType,
    created_by: Option<String>,
) -> LoungeResult<BackupRecord> {
    std::fs::create_dir_all(&config.backup_dir)?;

    let now = chrono::Local::now().naive_local();
    let filename = format!("loungeos_backup_{}.db", now.format("%Y-%m-%dT%H-%M-%S"));
    let path = config.backup_dir.join(&filename);

    let target = path.to_string_lossy().replace('\'', "''");
    if let Err(e) = sqlx::query(&format!("VACUUM INTO '{}'", target))
        .execute(pool)
        .await
    {
        tracing::error!(filename = %filename, "Backup copy failed: {:?}", e);
        let _ = std::fs::remove_file(&path);
        return Err(e.into());
    }

    let size = std::fs::metadata(&path)?.len() as i64;

    let result = sqlx::query(
        "INSERT INTO backup_history (filename, size, backup_type, status, created_by, created_at)
         VALUES (?, ?, ?, 'completed', ?, ?)",
    )
    .bind(&filename)
    .bind(size)
    .bind(backup_type)
    .bind(&created_by)
    .bind(now)
    .execute(pool)
    .await?;
    let id = result.last_insert_rowid();

    if backup_type == BackupType::Automatic {
        advance_schedule(pool, now).await?;
    }

    tracing::info!(filename = %filename, size, "Backup created");

    Ok(
        sqlx::query_as::<_, BackupRecord>("SELECT * FROM backup_history WHERE id = ?")
            .bind(id)
            .fetch_one(pool)
            .await?,
    )
}

/// GET /api/backup: runs a fresh manual backup and streams the file back.
pub async fn download_backup_axum(
    AxumState(state): AxumState<AppState>,
    claims: Option<Extension<Claims>>,
) -> LoungeResult<Response> {
    let created_by = claims.and_then(|Extension(c)| c.username);
    let record = create_backup(&state.pool, &state.config, BackupType::Manual, created_by).await?;

    let path = state.config.backup_dir.join(&record.filename);
    let bytes = tokio::fs::read(&path).await?;

    let headers = [
        (
            header::CONTENT_TYPE,
            "application/octet-stream".to_string(),
        ),
        (
            header::CONTENT_DISPOSITION,
            format!("attachment; filename=\"{}\"", record.filename),
        ),
    ];
    Ok((headers, bytes).into_response())
}

/// Swap an uploaded image in under the primary database path.
///
/// The live pool still references the old file and its WAL; it is closed
/// first so no later checkpoint writes the old pages back over the
/// restored copy. The stale `-wal`/`-shm` siblings are removed too, so
/// the next open starts from the restored image alone. The pool stays
/// closed afterwards; the service must be restarted.
pub async fn restore_database(pool: &DbPool, config: &Config, data: &[u8]) -> LoungeResult<()> {
    std::fs::create_dir_all(&config.backup_dir)?;
    let staging = config.backup_dir.join(format!(
        "restore_upload_{}.db",
        chrono::Local::now().format("%Y-%m-%dT%H-%M-%S")
    ));
    std::fs::write(&staging, data)?;

    pool.close().await;

    std::fs::copy(&staging, &config.database_path)?;
    remove_wal_siblings(&config.database_path);
    let _ = std::fs::remove_file(&staging);
    Ok(())
}

fn remove_wal_siblings(database_path: &std::path::Path) {
    for suffix in ["-wal", "-shm"] {
        let mut sibling = database_path.as_os_str().to_os_string();
        sibling.push(suffix);
        if let Err(e) = std::fs::remove_file(&sibling) {
            if e.kind() != std::io::ErrorKind::NotFound {
                tracing::warn!(
                    path = %sibling.to_string_lossy(),
                    "Could not remove stale WAL sibling: {}",
                    e
                );
            }
        }
    }
}

/// POST /api/backup: restore from an uploaded backup file.
///
/// The upload is staged under the backup directory, validated against the
/// SQLite header magic, then swapped in for the primary database file via
/// [`restore_database`]. That closes the connection pool, so the response
/// asks the operator to restart the service.
pub async fn restore_backup_axum(
    AxumState(state): AxumState<AppState>,
    claims: Option<Extension<Claims>>,
    mut multipart: Multipart,
) -> LoungeResult<Json<serde_json::Value>> {
    let is_admin = claims.map(|Extension(c)| c.is_admin()).unwrap_or(false);
    if !is_admin {
        return Err(LoungeError::Auth(
            "Restoring a backup requires an admin account".to_string(),
        ));
    }

    let mut uploaded: Option<Vec<u8>> = None;
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| LoungeError::Validation(format!("Invalid multipart upload: {}", e)))?
    {
        if field.name() == Some("file") || field.file_name().is_some() {
            let data = field
                .bytes()
                .await
                .map_err(|e| LoungeError::Validation(format!("Failed to read upload: {}", e)))?;
            uploaded = Some(data.to_vec());
            break;
        }
    }

    let data =
        uploaded.ok_or_else(|| LoungeError::Validation("No backup file in upload".to_string()))?;

    if data.len() < SQLITE_MAGIC.len() || &data[..SQLITE_MAGIC.len()] != SQLITE_MAGIC {
        return Err(LoungeError::Validation(
            "Uploaded file is not a SQLite database".to_string(),
        ));
    }

    restore_database(&state.pool, &state.config, &data).await?;

    tracing::info!(bytes = data.len(), "Database restored from uploaded backup");

    Ok(Json(json!({
        "success": true,
        "message": "Restore complete. Restart the service to load the restored database.",
    })))
}
