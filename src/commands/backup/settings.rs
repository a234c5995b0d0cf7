use crate::db::{BackupFrequency, BackupSettings, DbPool};
use crate::error::{LoungeError, LoungeResult};
use crate::state::AppState;
use axum::extract::{Json, State as AxumState};
use chrono::{Duration, Months, NaiveDateTime};
use serde::Deserialize;

/// Pure schedule arithmetic: the next automatic backup is one fixed
/// interval after `last`. `Disabled` has no next run.
pub fn calculate_next_backup(
    frequency: BackupFrequency,
    last: NaiveDateTime,
) -> Option<NaiveDateTime> {
    match frequency {
        BackupFrequency::Hourly => last.checked_add_signed(Duration::hours(1)),
        BackupFrequency::Daily => last.checked_add_signed(Duration::days(1)),
        BackupFrequency::Weekly => last.checked_add_signed(Duration::days(7)),
        BackupFrequency::Monthly => last.checked_add_months(Months::new(1)),
        BackupFrequency::Disabled => None,
    }
}

pub async fn get_backup_settings(pool: &DbPool) -> LoungeResult<BackupSettings> {
    Ok(
        sqlx::query_as::<_, BackupSettings>("SELECT * FROM backup_settings WHERE id = 1")
            .fetch_one(pool)
            .await?,
    )
}

/// Persist a schedule change. When `expected_version` is given the update
/// only applies if no concurrent writer got there first.
pub async fn update_backup_settings_internal(
    pool: &DbPool,
    frequency: BackupFrequency,
    enabled: bool,
    expected_version: Option<i64>,
) -> LoungeResult<BackupSettings> {
    let now = chrono::Local::now().naive_local();
    let next = calculate_next_backup(frequency, now);

    let result = if let Some(version) = expected_version {
        sqlx::query(
            "UPDATE backup_settings SET frequency = ?, enabled = ?, next_backup = ?, version = version + 1
             WHERE id = 1 AND version = ?",
        )
        .bind(frequency)
        .bind(enabled)
        .bind(next)
        .bind(version)
        .execute(pool)
        .await?
    } else {
        sqlx::query(
            "UPDATE backup_settings SET frequency = ?, enabled = ?, next_backup = ?, version = version + 1
             WHERE id = 1",
        )
        .bind(frequency)
        .bind(enabled)
        .bind(next)
        .execute(pool)
        .await?
    };

    if result.rows_affected() == 0 {
        return Err(LoungeError::Conflict(
            "Backup settings were changed by another operator. Reload and retry.".to_string(),
        ));
    }

    get_backup_settings(pool).await
}

/// Called after a successful automatic backup: records the run and
/// schedules the next one from the completion time.
pub async fn advance_schedule(pool: &DbPool, completed_at: NaiveDateTime) -> LoungeResult<()> {
    let settings = get_backup_settings(pool).await?;
    let next = calculate_next_backup(settings.frequency, completed_at);
    sqlx::query(
        "UPDATE backup_settings SET last_backup = ?, next_backup = ?, version = version + 1 WHERE id = 1",
    )
    .bind(completed_at)
    .bind(next)
    .execute(pool)
    .await?;
    Ok(())
}

/// `version` is mandatory over HTTP: every update must carry the version
/// it was based on, or a concurrent operator's change could be silently
/// overwritten. Only internal callers may skip the check.
#[derive(Deserialize)]
pub struct UpdateSettingsPayload {
    pub frequency: BackupFrequency,
    pub enabled: bool,
    pub version: i64,
}

pub async fn get_backup_settings_axum(
    AxumState(state): AxumState<AppState>,
) -> LoungeResult<Json<BackupSettings>> {
    let settings = get_backup_settings(&state.pool).await?;
    Ok(Json(settings))
}

pub async fn update_backup_settings_axum(
    AxumState(state): AxumState<AppState>,
    Json(payload): Json<UpdateSettingsPayload>,
) -> LoungeResult<Json<BackupSettings>> {
    let settings = update_backup_settings_internal(
        &state.pool,
        payload.frequency,
        payload.enabled,
        Some(payload.version),
    )
    .await?;
    tracing::info!(
        frequency = ?settings.frequency,
        enabled = settings.enabled,
        "Backup schedule updated"
    );
    Ok(Json(settings))
}
