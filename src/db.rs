use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions};
use sqlx::{FromRow, Pool, Sqlite};
use std::path::Path;

use crate::error::LoungeResult;

pub type DbPool = Pool<Sqlite>;

pub async fn init_pool(database_path: &Path) -> LoungeResult<DbPool> {
    let opts = SqliteConnectOptions::new()
        .filename(database_path)
        .create_if_missing(true)
        .journal_mode(SqliteJournalMode::Wal)
        .foreign_keys(true);

    Ok(SqlitePoolOptions::new()
        .max_connections(5)
        .acquire_timeout(std::time::Duration::from_secs(30))
        .connect_with(opts)
        .await?)
}

pub async fn init_database(pool: &DbPool) -> LoungeResult<()> {
    sqlx::migrate!("./migrations").run(pool).await?;
    ensure_seeds(pool).await?;
    tracing::info!("Database ready");
    Ok(())
}

async fn ensure_seeds(pool: &DbPool) -> LoungeResult<()> {
    let admin_username = std::env::var("ADMIN_USER").unwrap_or_else(|_| "admin".to_string());

    let admin_exists: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM users WHERE username = ?")
        .bind(&admin_username)
        .fetch_one(pool)
        .await?;
    if admin_exists.0 == 0 {
        let hash = bcrypt::hash("admin", bcrypt::DEFAULT_COST)?;
        sqlx::query("INSERT INTO users (username, password_hash, role) VALUES (?, ?, 'admin')")
            .bind(&admin_username)
            .bind(hash)
            .execute(pool)
            .await?;
        tracing::info!(username = %admin_username, "Seeded initial admin user");
    }

    Ok(())
}

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type,
)]
#[serde(rename_all = "UPPERCASE")]
pub enum MovementType {
    #[sqlx(rename = "IN")]
    In,
    #[sqlx(rename = "OUT")]
    Out,
    #[sqlx(rename = "ADJUSTMENT")]
    Adjustment,
    #[sqlx(rename = "TRANSFER")]
    Transfer,
}

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type,
)]
#[serde(rename_all = "lowercase")]
#[sqlx(rename_all = "lowercase")]
pub enum BackupType {
    Manual,
    Automatic,
}

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type,
)]
#[serde(rename_all = "lowercase")]
#[sqlx(rename_all = "lowercase")]
pub enum BackupFrequency {
    Hourly,
    Daily,
    Weekly,
    Monthly,
    Disabled,
}

#[derive(Debug, Serialize, Deserialize, FromRow)]
pub struct User {
    pub id: i64,
    pub username: String,
    #[serde(skip_serializing)]
    pub password_hash: String,
    pub role: String,
    pub created_at: Option<NaiveDateTime>,
}

#[derive(Debug, Serialize, Deserialize, FromRow)]
pub struct Supplier {
    pub id: i64,
    pub name: String,
    pub contact_person: Option<String>,
    pub phone: Option<String>,
    pub email: Option<String>,
    pub address: Option<String>,
    pub is_active: bool,
    pub created_at: Option<NaiveDateTime>,
    #[sqlx(default)]
    pub updated_at: Option<NaiveDateTime>,
}

/// One stocked item. `current_stock` is the maintained aggregate of the
/// item's movement history; stock status is never stored, it is derived
/// at read time from `current_stock` and `min_stock_level`.
#[derive(Debug, Serialize, Deserialize, FromRow)]
pub struct InventoryItem {
    pub id: i64,
    pub sku: String,
    pub name: String,
    pub category: Option<String>,
    pub unit: String,
    pub min_stock_level: i64,
    pub max_stock_level: Option<i64>,
    pub current_stock: i64,
    pub cost_per_unit: Option<f64>,
    pub supplier_id: Option<i64>,
    pub created_at: Option<NaiveDateTime>,
    #[sqlx(default)]
    pub updated_at: Option<NaiveDateTime>,
}

#[derive(Debug, Serialize, Deserialize, FromRow)]
pub struct InventoryMovement {
    pub id: i64,
    pub item_id: i64,
    pub movement_type: MovementType,
    pub quantity: i64,
    pub unit_cost: Option<f64>,
    pub total_cost: Option<f64>,
    pub reference_type: Option<String>,
    pub reference_number: Option<String>,
    pub notes: Option<String>,
    pub user_id: Option<i64>,
    pub movement_date: NaiveDateTime,
    pub created_at: Option<NaiveDateTime>,
}

/// Metadata for one point-in-time copy of the database file.
/// Immutable once written, except for the `orphaned` marker set when the
/// backing file could not be removed during deletion.
#[derive(Debug, Serialize, Deserialize, FromRow)]
pub struct BackupRecord {
    pub id: i64,
    pub filename: String,
    pub size: i64,
    pub backup_type: BackupType,
    pub status: String,
    pub created_by: Option<String>,
    pub created_at: NaiveDateTime,
}

/// The singleton backup schedule row (`id` is always 1).
#[derive(Debug, Serialize, Deserialize, FromRow)]
pub struct BackupSettings {
    pub id: i64,
    pub frequency: BackupFrequency,
    pub last_backup: Option<NaiveDateTime>,
    pub next_backup: Option<NaiveDateTime>,
    pub enabled: bool,
    pub version: i64,
}
