#[cfg(test)]
mod tests {
    use crate::commands::backup::settings::{calculate_next_backup, UpdateSettingsPayload};
    use crate::commands::inventory::item::stock_status;
    use crate::commands::inventory::movement::{movement_total_cost, stock_delta};
    use crate::db::{BackupFrequency, MovementType};
    use chrono::NaiveDate;

    fn ts(y: i32, m: u32, d: u32) -> chrono::NaiveDateTime {
        NaiveDate::from_ymd_opt(y, m, d)
            .unwrap()
            .and_hms_opt(10, 30, 0)
            .unwrap()
    }

    #[test]
    fn test_next_backup_intervals() {
        let base = ts(2025, 3, 10);

        assert_eq!(
            calculate_next_backup(BackupFrequency::Hourly, base),
            Some(base + chrono::Duration::hours(1))
        );
        assert_eq!(
            calculate_next_backup(BackupFrequency::Daily, base),
            Some(base + chrono::Duration::hours(24))
        );
        assert_eq!(
            calculate_next_backup(BackupFrequency::Weekly, base),
            Some(base + chrono::Duration::days(7))
        );
        assert_eq!(
            calculate_next_backup(BackupFrequency::Monthly, base),
            Some(ts(2025, 4, 10))
        );
    }

    #[test]
    fn test_next_backup_disabled_is_empty() {
        assert_eq!(
            calculate_next_backup(BackupFrequency::Disabled, ts(2025, 3, 10)),
            None
        );
        assert_eq!(
            calculate_next_backup(BackupFrequency::Disabled, ts(1999, 12, 31)),
            None
        );
    }

    /// Month arithmetic clamps to the last valid day instead of overflowing
    /// into the following month.
    #[test]
    fn test_next_backup_monthly_clamps_end_of_month() {
        let jan31 = ts(2025, 1, 31);
        assert_eq!(
            calculate_next_backup(BackupFrequency::Monthly, jan31),
            Some(ts(2025, 2, 28))
        );
    }

    /// Schedule updates over HTTP must say which version they were based
    /// on; leaving it out is a malformed request, not a free pass around
    /// the concurrency check.
    #[test]
    fn test_settings_payload_requires_version() {
        let missing: Result<UpdateSettingsPayload, _> =
            serde_json::from_value(serde_json::json!({ "frequency": "daily", "enabled": true }));
        assert!(missing.is_err());

        let payload: UpdateSettingsPayload = serde_json::from_value(
            serde_json::json!({ "frequency": "daily", "enabled": true, "version": 3 }),
        )
        .unwrap();
        assert_eq!(payload.version, 3);
        assert_eq!(payload.frequency, BackupFrequency::Daily);
    }

    #[test]
    fn test_stock_delta_signs() {
        assert_eq!(stock_delta(MovementType::In, 50), 50);
        assert_eq!(stock_delta(MovementType::Out, 15), -15);
        assert_eq!(stock_delta(MovementType::Adjustment, -2), -2);
        assert_eq!(stock_delta(MovementType::Adjustment, 7), 7);
        // Transfers are intra-location and leave the item's stock untouched.
        assert_eq!(stock_delta(MovementType::Transfer, 40), 0);
    }

    /// Replay of [IN 50, OUT 15, ADJUSTMENT -2] from an empty item.
    #[test]
    fn test_movement_replay_example() {
        let movements = [
            (MovementType::In, 50),
            (MovementType::Out, 15),
            (MovementType::Adjustment, -2),
        ];
        let final_stock: i64 = movements.iter().map(|(t, q)| stock_delta(*t, *q)).sum();
        assert_eq!(final_stock, 33);

        assert_eq!(stock_status(final_stock, 10), "In Stock");
        assert_eq!(stock_status(final_stock, 33), "Low Stock");
    }

    #[test]
    fn test_stock_status_boundaries() {
        assert_eq!(stock_status(0, 5), "Out of Stock");
        assert_eq!(stock_status(-3, 5), "Out of Stock");
        assert_eq!(stock_status(1, 5), "Low Stock");
        assert_eq!(stock_status(5, 5), "Low Stock");
        assert_eq!(stock_status(6, 5), "In Stock");
    }

    #[test]
    fn test_total_cost_is_unit_cost_times_quantity() {
        assert_eq!(movement_total_cost(Some(2.5), 4), Some(10.0));
        // Signed adjustment quantities still cost their absolute amount.
        assert_eq!(movement_total_cost(Some(3.0), -2), Some(6.0));
        assert_eq!(movement_total_cost(None, 100), None);
    }
}
