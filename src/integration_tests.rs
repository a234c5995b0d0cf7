#[cfg(test)]
mod tests {
    use crate::commands::backup::logic::{create_backup, restore_database};
    use crate::commands::backup::maintenance::{
        cleanup_old_backups, delete_backup, get_backup_history,
    };
    use crate::commands::backup::settings::{
        get_backup_settings, update_backup_settings_internal,
    };
    use crate::commands::inventory::item::{create_item_internal, CreateItemPayload};
    use crate::commands::inventory::movement::{
        create_movement_internal, recount_stock_internal, CreateMovementPayload,
    };
    use crate::config::Config;
    use crate::db::{BackupFrequency, BackupType, DbPool, InventoryItem, MovementType};
    use crate::error::LoungeError;
    use chrono::NaiveDate;
    use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};

    async fn setup_test_db() -> DbPool {
        // A single connection so the in-memory database is shared. The
        // plain ":memory:" filename is used instead of sqlx's memory URI:
        // the latter opens with SQLITE_OPEN_MEMORY, under which VACUUM
        // INTO silently targets the memory VFS instead of the filesystem.
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect_with(SqliteConnectOptions::new().filename(":memory:"))
            .await
            .expect("Failed to open in-memory database");
        // Full production init: migrations plus the seeded admin user
        // (id 1), which movement tests reference through the user_id FK.
        crate::db::init_database(&pool)
            .await
            .expect("Failed to initialize database");
        pool
    }

    fn test_config(dir: &tempfile::TempDir) -> Config {
        Config {
            host: "127.0.0.1".to_string(),
            port: 0,
            database_path: dir.path().join("loungeos.db"),
            backup_dir: dir.path().join("backups"),
            backup_keep_count: 30,
            jwt_secret: "test-secret".to_string(),
        }
    }

    fn item_payload(sku: &str) -> CreateItemPayload {
        CreateItemPayload {
            sku: sku.to_string(),
            name: format!("Test item {}", sku),
            category: Some("bar".to_string()),
            unit: "ea".to_string(),
            min_stock_level: 10,
            max_stock_level: Some(100),
            cost_per_unit: Some(2.0),
            supplier_id: None,
        }
    }

    fn movement(item_id: i64, movement_type: MovementType, quantity: i64) -> CreateMovementPayload {
        CreateMovementPayload {
            item_id,
            movement_type,
            quantity,
            unit_cost: None,
            reference_type: None,
            reference_number: None,
            notes: None,
            movement_date: None,
        }
    }

    async fn fetch_item(pool: &DbPool, id: i64) -> InventoryItem {
        sqlx::query_as("SELECT * FROM inventory_items WHERE id = ?")
            .bind(id)
            .fetch_one(pool)
            .await
            .expect("Failed to fetch item")
    }

    #[tokio::test]
    async fn test_movements_maintain_current_stock() {
        let pool = setup_test_db().await;
        let item = create_item_internal(&pool, item_payload("GIN-001"))
            .await
            .expect("Failed to create item");
        assert_eq!(item.current_stock, 0);

        create_movement_internal(&pool, movement(item.id, MovementType::In, 50), Some(1))
            .await
            .unwrap();
        create_movement_internal(&pool, movement(item.id, MovementType::Out, 15), Some(1))
            .await
            .unwrap();
        create_movement_internal(&pool, movement(item.id, MovementType::Adjustment, -2), None)
            .await
            .unwrap();
        // Stock-neutral; must not move the cached level.
        create_movement_internal(&pool, movement(item.id, MovementType::Transfer, 5), None)
            .await
            .unwrap();

        let item = fetch_item(&pool, item.id).await;
        assert_eq!(item.current_stock, 33);

        // Replaying the history lands on the same number.
        let recounted = recount_stock_internal(&pool, item.id).await.unwrap();
        assert_eq!(recounted, 33);
    }

    #[tokio::test]
    async fn test_movement_total_cost_is_server_computed() {
        let pool = setup_test_db().await;
        let item = create_item_internal(&pool, item_payload("RUM-002"))
            .await
            .unwrap();

        let mut payload = movement(item.id, MovementType::In, 12);
        payload.unit_cost = Some(4.5);
        let stored = create_movement_internal(&pool, payload, None).await.unwrap();

        assert_eq!(stored.unit_cost, Some(4.5));
        assert_eq!(stored.total_cost, Some(54.0));
    }

    #[tokio::test]
    async fn test_movement_validation() {
        let pool = setup_test_db().await;
        let item = create_item_internal(&pool, item_payload("VOD-003"))
            .await
            .unwrap();

        let result =
            create_movement_internal(&pool, movement(item.id, MovementType::Out, 0), None).await;
        assert!(matches!(result, Err(LoungeError::Validation(_))));

        let result =
            create_movement_internal(&pool, movement(item.id, MovementType::Adjustment, 0), None)
                .await;
        assert!(matches!(result, Err(LoungeError::Validation(_))));

        let result =
            create_movement_internal(&pool, movement(9999, MovementType::In, 5), None).await;
        assert!(matches!(result, Err(LoungeError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_duplicate_sku_rejected() {
        let pool = setup_test_db().await;
        create_item_internal(&pool, item_payload("DUP-001"))
            .await
            .unwrap();
        let result = create_item_internal(&pool, item_payload("DUP-001")).await;
        assert!(matches!(result, Err(LoungeError::Conflict(_))));
    }

    async fn insert_backup_row(
        pool: &DbPool,
        filename: &str,
        backup_type: BackupType,
        day: u32,
    ) -> i64 {
        let created_at = NaiveDate::from_ymd_opt(2025, 6, day)
            .unwrap()
            .and_hms_opt(12, 0, 0)
            .unwrap();
        let res = sqlx::query(
            "INSERT INTO backup_history (filename, size, backup_type, status, created_at)
             VALUES (?, 100, ?, 'completed', ?)",
        )
        .bind(filename)
        .bind(backup_type)
        .bind(created_at)
        .execute(pool)
        .await
        .expect("Failed to insert backup row");
        res.last_insert_rowid()
    }

    #[tokio::test]
    async fn test_backup_history_is_most_recent_first_and_bounded() {
        let pool = setup_test_db().await;
        for day in 1..=5 {
            insert_backup_row(&pool, &format!("b{}.db", day), BackupType::Manual, day).await;
        }

        let history = get_backup_history(&pool, 2).await.unwrap();
        assert_eq!(history.len(), 2);
        assert_eq!(history[0].filename, "b5.db");
        assert_eq!(history[1].filename, "b4.db");
        assert!(history[0].created_at > history[1].created_at);
    }

    #[tokio::test]
    async fn test_delete_backup_with_missing_file_still_succeeds() {
        let pool = setup_test_db().await;
        let dir = tempfile::tempdir().unwrap();
        let config = test_config(&dir);
        std::fs::create_dir_all(&config.backup_dir).unwrap();

        let id = insert_backup_row(&pool, "gone.db", BackupType::Manual, 1).await;

        let deleted = delete_backup(&pool, &config, id).await.unwrap();
        assert!(deleted);

        let remaining: (i64,) =
            sqlx::query_as("SELECT COUNT(*) FROM backup_history WHERE id = ?")
                .bind(id)
                .fetch_one(&pool)
                .await
                .unwrap();
        assert_eq!(remaining.0, 0);
    }

    #[tokio::test]
    async fn test_delete_backup_removes_file_and_row() {
        let pool = setup_test_db().await;
        let dir = tempfile::tempdir().unwrap();
        let config = test_config(&dir);
        std::fs::create_dir_all(&config.backup_dir).unwrap();
        std::fs::write(config.backup_dir.join("real.db"), b"data").unwrap();

        let id = insert_backup_row(&pool, "real.db", BackupType::Automatic, 1).await;

        let deleted = delete_backup(&pool, &config, id).await.unwrap();
        assert!(deleted);
        assert!(!config.backup_dir.join("real.db").exists());
    }

    #[tokio::test]
    async fn test_cleanup_never_prunes_manual_backups() {
        let pool = setup_test_db().await;
        let dir = tempfile::tempdir().unwrap();
        let config = test_config(&dir);
        std::fs::create_dir_all(&config.backup_dir).unwrap();

        // Three old manual backups, then three newer automatic ones.
        for day in 1..=3 {
            insert_backup_row(&pool, &format!("manual{}.db", day), BackupType::Manual, day).await;
        }
        for day in 10..=12 {
            insert_backup_row(&pool, &format!("auto{}.db", day), BackupType::Automatic, day).await;
        }

        let deleted = cleanup_old_backups(&pool, &config, 1).await.unwrap();
        // Only the two automatic backups outside the keep window go away.
        assert_eq!(deleted, 2);

        let manual_count: (i64,) =
            sqlx::query_as("SELECT COUNT(*) FROM backup_history WHERE backup_type = 'manual'")
                .fetch_one(&pool)
                .await
                .unwrap();
        assert_eq!(manual_count.0, 3);

        let auto_left: Vec<(String,)> = sqlx::query_as(
            "SELECT filename FROM backup_history WHERE backup_type = 'automatic'",
        )
        .fetch_all(&pool)
        .await
        .unwrap();
        assert_eq!(auto_left, vec![("auto12.db".to_string(),)]);
    }

    #[tokio::test]
    async fn test_create_backup_writes_file_and_record() {
        let pool = setup_test_db().await;
        let dir = tempfile::tempdir().unwrap();
        let config = test_config(&dir);

        let record = create_backup(&pool, &config, BackupType::Manual, Some("admin".to_string()))
            .await
            .expect("Backup failed");

        assert!(record.filename.starts_with("loungeos_backup_"));
        assert!(record.filename.ends_with(".db"));
        assert_eq!(record.backup_type, BackupType::Manual);
        assert_eq!(record.created_by.as_deref(), Some("admin"));
        assert!(record.size > 0);

        let path = config.backup_dir.join(&record.filename);
        assert!(path.exists());
        assert_eq!(std::fs::metadata(&path).unwrap().len() as i64, record.size);
    }

    #[tokio::test]
    async fn test_restore_survives_live_wal_pool() {
        let dir = tempfile::tempdir().unwrap();
        let config = test_config(&dir);

        // Primary database, opened through the normal WAL pool, with one item.
        let pool = crate::db::init_pool(&config.database_path).await.unwrap();
        sqlx::migrate!("./migrations").run(&pool).await.unwrap();
        create_item_internal(&pool, item_payload("OLD-001"))
            .await
            .unwrap();

        // Backup image holding a different item. Closing the pool
        // checkpoints it into a standalone file.
        let image_path = dir.path().join("image.db");
        let image_pool = crate::db::init_pool(&image_path).await.unwrap();
        sqlx::migrate!("./migrations").run(&image_pool).await.unwrap();
        create_item_internal(&image_pool, item_payload("RESTORED-001"))
            .await
            .unwrap();
        image_pool.close().await;
        let data = std::fs::read(&image_path).unwrap();

        restore_database(&pool, &config, &data).await.unwrap();

        // The old pool is closed, so no write through it can checkpoint
        // the old WAL back over the restored file.
        assert!(create_item_internal(&pool, item_payload("LATE-001"))
            .await
            .is_err());

        let mut wal = config.database_path.clone().into_os_string();
        wal.push("-wal");
        assert!(!std::path::Path::new(&wal).exists());

        let reopened = crate::db::init_pool(&config.database_path).await.unwrap();
        let skus: Vec<(String,)> = sqlx::query_as("SELECT sku FROM inventory_items")
            .fetch_all(&reopened)
            .await
            .unwrap();
        assert_eq!(skus, vec![("RESTORED-001".to_string(),)]);
    }

    #[tokio::test]
    async fn test_restore_route_accepts_large_uploads() {
        use axum::body::Body;
        use axum::http::{header, Request, StatusCode};
        use tower::ServiceExt;

        let pool = setup_test_db().await;
        let dir = tempfile::tempdir().unwrap();
        let state = crate::state::AppState {
            pool,
            config: std::sync::Arc::new(test_config(&dir)),
        };
        let claims = crate::middleware::auth::Claims {
            sub: "admin".to_string(),
            user_id: Some(1),
            username: Some("admin".to_string()),
            role: Some("admin".to_string()),
            exp: usize::MAX,
        };
        let app = crate::routes::create_router()
            .layer(axum::Extension(claims))
            .with_state(state);

        // 8 MB upload, well past axum's default 2 MB body cap.
        let mut body = Vec::new();
        body.extend_from_slice(b"--BOUNDARY\r\n");
        body.extend_from_slice(
            b"Content-Disposition: form-data; name=\"file\"; filename=\"backup.db\"\r\n\r\n",
        );
        body.extend(std::iter::repeat(b'x').take(8 * 1024 * 1024));
        body.extend_from_slice(b"\r\n--BOUNDARY--\r\n");

        let response = app
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri("/api/backup")
                    .header(
                        header::CONTENT_TYPE,
                        "multipart/form-data; boundary=BOUNDARY",
                    )
                    .body(Body::from(body))
                    .unwrap(),
            )
            .await
            .unwrap();

        // The junk fails the SQLite header check, which means the whole
        // body was read; a size rejection would have been 413.
        assert_ne!(response.status(), StatusCode::PAYLOAD_TOO_LARGE);
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_init_database_seeds_admin_once() {
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect("sqlite::memory:")
            .await
            .unwrap();
        crate::db::init_database(&pool).await.unwrap();
        crate::db::init_database(&pool).await.unwrap();

        let admins: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM users WHERE role = 'admin'")
            .fetch_one(&pool)
            .await
            .unwrap();
        assert_eq!(admins.0, 1);
    }

    #[tokio::test]
    async fn test_automatic_backup_advances_schedule() {
        let pool = setup_test_db().await;
        let dir = tempfile::tempdir().unwrap();
        let config = test_config(&dir);

        update_backup_settings_internal(&pool, BackupFrequency::Daily, true, None)
            .await
            .unwrap();

        create_backup(&pool, &config, BackupType::Automatic, None)
            .await
            .unwrap();

        let settings = get_backup_settings(&pool).await.unwrap();
        let last = settings.last_backup.expect("last_backup should be set");
        let next = settings.next_backup.expect("next_backup should be set");
        assert_eq!(next - last, chrono::Duration::days(1));
    }

    #[tokio::test]
    async fn test_settings_update_uses_optimistic_concurrency() {
        let pool = setup_test_db().await;

        let initial = get_backup_settings(&pool).await.unwrap();
        assert_eq!(initial.frequency, BackupFrequency::Disabled);
        assert!(!initial.enabled);
        assert_eq!(initial.version, 0);

        let updated = update_backup_settings_internal(
            &pool,
            BackupFrequency::Daily,
            true,
            Some(initial.version),
        )
        .await
        .unwrap();
        assert_eq!(updated.frequency, BackupFrequency::Daily);
        assert!(updated.enabled);
        assert_eq!(updated.version, 1);
        assert!(updated.next_backup.is_some());

        // A writer holding the old version loses.
        let stale = update_backup_settings_internal(
            &pool,
            BackupFrequency::Hourly,
            true,
            Some(initial.version),
        )
        .await;
        assert!(matches!(stale, Err(LoungeError::Conflict(_))));
    }

    #[tokio::test]
    async fn test_disabling_schedule_clears_next_backup() {
        let pool = setup_test_db().await;

        update_backup_settings_internal(&pool, BackupFrequency::Daily, true, None)
            .await
            .unwrap();
        let settings =
            update_backup_settings_internal(&pool, BackupFrequency::Disabled, false, None)
                .await
                .unwrap();
        assert_eq!(settings.next_backup, None);
    }
}
