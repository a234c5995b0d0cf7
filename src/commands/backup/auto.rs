//! Background loop driving scheduled automatic backups.
//!
//! The schedule row only stores arithmetic (`next_backup`); this task is
//! what actually fires when that time passes. Runs on a fixed interval
//! using `tokio::time::interval`.

use crate::commands::backup::logic::create_backup;
use crate::commands::backup::maintenance::cleanup_old_backups;
use crate::commands::backup::settings::get_backup_settings;
use crate::config::Config;
use crate::db::{BackupFrequency, BackupType, DbPool};
use crate::error::LoungeResult;
use std::sync::Arc;
use std::time::Duration;

const POLL_INTERVAL: Duration = Duration::from_secs(60);

pub async fn run_backup_scheduler(pool: DbPool, config: Arc<Config>) {
    tracing::info!(
        interval_secs = POLL_INTERVAL.as_secs(),
        "Backup scheduler started"
    );

    let mut interval = tokio::time::interval(POLL_INTERVAL);
    loop {
        interval.tick().await;
        if let Err(e) = run_due_backup(&pool, &config).await {
            tracing::error!("Scheduled backup failed: {}", e);
        }
    }
}

async fn run_due_backup(pool: &DbPool, config: &Config) -> LoungeResult<()> {
    let settings = get_backup_settings(pool).await?;
    if !settings.enabled || settings.frequency == BackupFrequency::Disabled {
        return Ok(());
    }

    let now = chrono::Local::now().naive_local();
    // A schedule that was just enabled has no next_backup yet; treat it as due.
    let due = settings.next_backup.map(|next| next <= now).unwrap_or(true);
    if !due {
        return Ok(());
    }

    let record = create_backup(pool, config, BackupType::Automatic, None).await?;
    tracing::info!(filename = %record.filename, "Automatic backup completed");

    cleanup_old_backups(pool, config, config.backup_keep_count).await?;
    Ok(())
}
