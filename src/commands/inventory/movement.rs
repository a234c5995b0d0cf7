use crate::commands::inventory::item::ItemWithStatus;
use crate::db::{DbPool, InventoryItem, InventoryMovement, MovementType};
use crate::error::{LoungeError, LoungeResult};
use crate::middleware::auth::Claims;
use crate::state::AppState;
use axum::extract::{Extension, Json, Path, Query, State as AxumState};
use chrono::NaiveDateTime;
use serde::Deserialize;

/// Signed effect of a movement on the item's cached stock level.
/// TRANSFER is intra-location and stock-neutral.
pub fn stock_delta(movement_type: MovementType, quantity: i64) -> i64 {
    match movement_type {
        MovementType::In => quantity,
        MovementType::Out => -quantity,
        MovementType::Adjustment => quantity,
        MovementType::Transfer => 0,
    }
}

/// The total is always server-computed; client-sent totals are ignored.
pub fn movement_total_cost(unit_cost: Option<f64>, quantity: i64) -> Option<f64> {
    unit_cost.map(|cost| cost * quantity.unsigned_abs() as f64)
}

fn validate_movement(movement_type: MovementType, quantity: i64) -> LoungeResult<()> {
    match movement_type {
        MovementType::In | MovementType::Out if quantity <= 0 => Err(LoungeError::Validation(
            "quantity must be positive for IN and OUT movements".to_string(),
        )),
        MovementType::Adjustment if quantity == 0 => Err(LoungeError::Validation(
            "adjustment quantity must be non-zero".to_string(),
        )),
        _ => Ok(()),
    }
}

#[derive(Deserialize)]
pub struct CreateMovementPayload {
    pub item_id: i64,
    pub movement_type: MovementType,
    pub quantity: i64,
    pub unit_cost: Option<f64>,
    pub reference_type: Option<String>,
    pub reference_number: Option<String>,
    pub notes: Option<String>,
    pub movement_date: Option<NaiveDateTime>,
}

#[derive(Deserialize)]
pub struct MovementQuery {
    pub item_id: Option<i64>,
    pub limit: Option<i64>,
}

/// Append a movement and update the item's stock in one transaction, so
/// two concurrent movements against the same item cannot lose an update.
pub async fn create_movement_internal(
    pool: &DbPool,
    payload: CreateMovementPayload,
    user_id: Option<i64>,
) -> LoungeResult<InventoryMovement> {
    validate_movement(payload.movement_type, payload.quantity)?;

    let total_cost = movement_total_cost(payload.unit_cost, payload.quantity);
    let movement_date = payload
        .movement_date
        .unwrap_or_else(|| chrono::Local::now().naive_local());

    let mut tx = pool.begin().await?;

    let item: Option<(i64,)> = sqlx::query_as("SELECT id FROM inventory_items WHERE id = ?")
        .bind(payload.item_id)
        .fetch_optional(&mut *tx)
        .await?;
    if item.is_none() {
        return Err(LoungeError::NotFound(format!(
            "Inventory item {} not found",
            payload.item_id
        )));
    }

    let delta = stock_delta(payload.movement_type, payload.quantity);
    if delta != 0 {
        sqlx::query(
            "UPDATE inventory_items SET current_stock = current_stock + ?, updated_at = ? WHERE id = ?",
        )
        .bind(delta)
        .bind(chrono::Local::now().naive_local())
        .bind(payload.item_id)
        .execute(&mut *tx)
        .await?;
    }

    let result = sqlx::query(
        "INSERT INTO inventory_movements
             (item_id, movement_type, quantity, unit_cost, total_cost,
              reference_type, reference_number, notes, user_id, movement_date)
         VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?)",
    )
    .bind(payload.item_id)
    .bind(payload.movement_type)
    .bind(payload.quantity)
    .bind(payload.unit_cost)
    .bind(total_cost)
    .bind(&payload.reference_type)
    .bind(&payload.reference_number)
    .bind(&payload.notes)
    .bind(user_id)
    .bind(movement_date)
    .execute(&mut *tx)
    .await?;
    let id = result.last_insert_rowid();

    tx.commit().await?;

    Ok(
        sqlx::query_as::<_, InventoryMovement>("SELECT * FROM inventory_movements WHERE id = ?")
            .bind(id)
            .fetch_one(pool)
            .await?,
    )
}

/// Replay the full movement history and rewrite the cached stock level.
/// Returns the recomputed quantity.
pub async fn recount_stock_internal(pool: &DbPool, item_id: i64) -> LoungeResult<i64> {
    let mut tx = pool.begin().await?;

    let item: Option<(i64,)> = sqlx::query_as("SELECT id FROM inventory_items WHERE id = ?")
        .bind(item_id)
        .fetch_optional(&mut *tx)
        .await?;
    if item.is_none() {
        return Err(LoungeError::NotFound(format!(
            "Inventory item {} not found",
            item_id
        )));
    }

    let total: (i64,) = sqlx::query_as(
        "SELECT COALESCE(SUM(CASE movement_type
             WHEN 'IN' THEN quantity
             WHEN 'OUT' THEN -quantity
             WHEN 'ADJUSTMENT' THEN quantity
             ELSE 0 END), 0)
         FROM inventory_movements WHERE item_id = ?",
    )
    .bind(item_id)
    .fetch_one(&mut *tx)
    .await?;

    sqlx::query("UPDATE inventory_items SET current_stock = ?, updated_at = ? WHERE id = ?")
        .bind(total.0)
        .bind(chrono::Local::now().naive_local())
        .bind(item_id)
        .execute(&mut *tx)
        .await?;

    tx.commit().await?;
    Ok(total.0)
}

pub async fn get_movements_axum(
    AxumState(state): AxumState<AppState>,
    Query(query): Query<MovementQuery>,
) -> LoungeResult<Json<Vec<InventoryMovement>>> {
    let limit = query.limit.unwrap_or(100).clamp(1, 1000);

    let movements = if let Some(item_id) = query.item_id {
        sqlx::query_as::<_, InventoryMovement>(
            "SELECT * FROM inventory_movements WHERE item_id = ?
             ORDER BY movement_date DESC, id DESC LIMIT ?",
        )
        .bind(item_id)
        .bind(limit)
        .fetch_all(&state.pool)
        .await?
    } else {
        sqlx::query_as::<_, InventoryMovement>(
            "SELECT * FROM inventory_movements ORDER BY movement_date DESC, id DESC LIMIT ?",
        )
        .bind(limit)
        .fetch_all(&state.pool)
        .await?
    };

    Ok(Json(movements))
}

pub async fn create_movement_axum(
    AxumState(state): AxumState<AppState>,
    claims: Option<Extension<Claims>>,
    Json(payload): Json<CreateMovementPayload>,
) -> LoungeResult<Json<InventoryMovement>> {
    let user_id = claims.and_then(|Extension(c)| c.user_id);
    let movement = create_movement_internal(&state.pool, payload, user_id).await?;
    tracing::info!(
        item_id = movement.item_id,
        movement_type = ?movement.movement_type,
        quantity = movement.quantity,
        "Stock movement recorded"
    );
    Ok(Json(movement))
}

pub async fn recount_stock_axum(
    AxumState(state): AxumState<AppState>,
    Path(item_id): Path<i64>,
) -> LoungeResult<Json<ItemWithStatus>> {
    recount_stock_internal(&state.pool, item_id).await?;
    let item = sqlx::query_as::<_, InventoryItem>("SELECT * FROM inventory_items WHERE id = ?")
        .bind(item_id)
        .fetch_one(&state.pool)
        .await?;
    Ok(Json(item.into()))
}
