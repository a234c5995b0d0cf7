use crate::db::{DbPool, InventoryItem};
use crate::error::{LoungeError, LoungeResult};
use crate::state::AppState;
use axum::extract::{Json, Path, State as AxumState};
use serde::{Deserialize, Serialize};

/// Derived stock classification. Never stored; always computed from the
/// current quantity and the reorder threshold.
pub fn stock_status(current_stock: i64, min_stock_level: i64) -> &'static str {
    if current_stock <= 0 {
        "Out of Stock"
    } else if current_stock <= min_stock_level {
        "Low Stock"
    } else {
        "In Stock"
    }
}

#[derive(Debug, Serialize)]
pub struct ItemWithStatus {
    #[serde(flatten)]
    pub item: InventoryItem,
    pub status: &'static str,
}

impl From<InventoryItem> for ItemWithStatus {
    fn from(item: InventoryItem) -> Self {
        let status = stock_status(item.current_stock, item.min_stock_level);
        ItemWithStatus { item, status }
    }
}

#[derive(Deserialize)]
pub struct CreateItemPayload {
    pub sku: String,
    pub name: String,
    pub category: Option<String>,
    #[serde(default = "default_unit")]
    pub unit: String,
    #[serde(default)]
    pub min_stock_level: i64,
    pub max_stock_level: Option<i64>,
    pub cost_per_unit: Option<f64>,
    pub supplier_id: Option<i64>,
}

fn default_unit() -> String {
    "ea".to_string()
}

#[derive(Deserialize)]
pub struct UpdateItemPayload {
    pub name: String,
    pub category: Option<String>,
    pub unit: String,
    pub min_stock_level: i64,
    pub max_stock_level: Option<i64>,
    pub cost_per_unit: Option<f64>,
    pub supplier_id: Option<i64>,
}

pub async fn get_item(pool: &DbPool, id: i64) -> LoungeResult<InventoryItem> {
    sqlx::query_as::<_, InventoryItem>("SELECT * FROM inventory_items WHERE id = ?")
        .bind(id)
        .fetch_optional(pool)
        .await?
        .ok_or_else(|| LoungeError::NotFound(format!("Inventory item {} not found", id)))
}

pub async fn create_item_internal(
    pool: &DbPool,
    payload: CreateItemPayload,
) -> LoungeResult<InventoryItem> {
    if payload.sku.trim().is_empty() || payload.name.trim().is_empty() {
        return Err(LoungeError::Validation(
            "sku and name are required".to_string(),
        ));
    }
    if payload.min_stock_level < 0 {
        return Err(LoungeError::Validation(
            "min_stock_level cannot be negative".to_string(),
        ));
    }

    let existing: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM inventory_items WHERE sku = ?")
        .bind(&payload.sku)
        .fetch_one(pool)
        .await?;
    if existing.0 > 0 {
        return Err(LoungeError::Conflict(format!(
            "An item with SKU '{}' already exists",
            payload.sku
        )));
    }

    let result = sqlx::query(
        "INSERT INTO inventory_items (sku, name, category, unit, min_stock_level, max_stock_level, cost_per_unit, supplier_id)
         VALUES (?, ?, ?, ?, ?, ?, ?, ?)",
    )
    .bind(&payload.sku)
    .bind(&payload.name)
    .bind(&payload.category)
    .bind(&payload.unit)
    .bind(payload.min_stock_level)
    .bind(payload.max_stock_level)
    .bind(payload.cost_per_unit)
    .bind(payload.supplier_id)
    .execute(pool)
    .await?;

    get_item(pool, result.last_insert_rowid()).await
}

pub async fn get_item_list_axum(
    AxumState(state): AxumState<AppState>,
) -> LoungeResult<Json<Vec<ItemWithStatus>>> {
    let items = sqlx::query_as::<_, InventoryItem>("SELECT * FROM inventory_items ORDER BY name")
        .fetch_all(&state.pool)
        .await?;
    Ok(Json(items.into_iter().map(ItemWithStatus::from).collect()))
}

pub async fn create_item_axum(
    AxumState(state): AxumState<AppState>,
    Json(payload): Json<CreateItemPayload>,
) -> LoungeResult<Json<ItemWithStatus>> {
    let item = create_item_internal(&state.pool, payload).await?;
    tracing::info!(sku = %item.sku, "Inventory item created");
    Ok(Json(item.into()))
}

pub async fn update_item_axum(
    AxumState(state): AxumState<AppState>,
    Path(id): Path<i64>,
    Json(payload): Json<UpdateItemPayload>,
) -> LoungeResult<Json<ItemWithStatus>> {
    if payload.name.trim().is_empty() {
        return Err(LoungeError::Validation("name is required".to_string()));
    }
    if payload.min_stock_level < 0 {
        return Err(LoungeError::Validation(
            "min_stock_level cannot be negative".to_string(),
        ));
    }

    let result = sqlx::query(
        "UPDATE inventory_items
         SET name = ?, category = ?, unit = ?, min_stock_level = ?, max_stock_level = ?,
             cost_per_unit = ?, supplier_id = ?, updated_at = ?
         WHERE id = ?",
    )
    .bind(&payload.name)
    .bind(&payload.category)
    .bind(&payload.unit)
    .bind(payload.min_stock_level)
    .bind(payload.max_stock_level)
    .bind(payload.cost_per_unit)
    .bind(payload.supplier_id)
    .bind(chrono::Local::now().naive_local())
    .bind(id)
    .execute(&state.pool)
    .await?;

    if result.rows_affected() == 0 {
        return Err(LoungeError::NotFound(format!(
            "Inventory item {} not found",
            id
        )));
    }

    let item = get_item(&state.pool, id).await?;
    Ok(Json(item.into()))
}

pub async fn delete_item_axum(
    AxumState(state): AxumState<AppState>,
    Path(id): Path<i64>,
) -> LoungeResult<Json<bool>> {
    let movements: (i64,) =
        sqlx::query_as("SELECT COUNT(*) FROM inventory_movements WHERE item_id = ?")
            .bind(id)
            .fetch_one(&state.pool)
            .await?;
    if movements.0 > 0 {
        return Err(LoungeError::Conflict(
            "Item has movement history and cannot be deleted".to_string(),
        ));
    }

    let result = sqlx::query("DELETE FROM inventory_items WHERE id = ?")
        .bind(id)
        .execute(&state.pool)
        .await?;
    if result.rows_affected() == 0 {
        return Err(LoungeError::NotFound(format!(
            "Inventory item {} not found",
            id
        )));
    }
    Ok(Json(true))
}

/// Items at or below their reorder threshold, lowest stock first.
pub async fn get_stock_alerts_axum(
    AxumState(state): AxumState<AppState>,
) -> LoungeResult<Json<Vec<ItemWithStatus>>> {
    let items = sqlx::query_as::<_, InventoryItem>(
        "SELECT * FROM inventory_items
         WHERE current_stock <= min_stock_level
         ORDER BY current_stock ASC, name",
    )
    .fetch_all(&state.pool)
    .await?;
    Ok(Json(items.into_iter().map(ItemWithStatus::from).collect()))
}
