use std::path::PathBuf;

/// Server configuration loaded from environment variables.
///
/// Every field has a default suitable for local development; production
/// deployments override via the environment (or a `.env` file).
#[derive(Debug, Clone)]
pub struct Config {
    /// Bind address (default: `0.0.0.0`).
    pub host: String,
    /// Bind port (default: `3000`).
    pub port: u16,
    /// Path of the primary SQLite database file.
    pub database_path: PathBuf,
    /// Directory where backup copies are written.
    pub backup_dir: PathBuf,
    /// How many backup records the automatic retention pass keeps.
    pub backup_keep_count: i64,
    /// Secret for signing session tokens.
    pub jwt_secret: String,
}

impl Config {
    pub fn from_env() -> Self {
        let host = std::env::var("HOST").unwrap_or_else(|_| "0.0.0.0".into());

        let port: u16 = std::env::var("PORT")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(3000);

        let database_path = std::env::var("DATABASE_PATH")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("loungeos.db"));

        let backup_dir = std::env::var("BACKUP_DIR")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("backups"));

        let backup_keep_count: i64 = std::env::var("BACKUP_KEEP_COUNT")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(30);

        let jwt_secret = std::env::var("JWT_SECRET").unwrap_or_else(|_| {
            tracing::warn!("JWT_SECRET not set, using insecure default!");
            "insecure-development-secret-key-replace-me-immediately".to_string()
        });

        Config {
            host,
            port,
            database_path,
            backup_dir,
            backup_keep_count,
            jwt_secret,
        }
    }
}
