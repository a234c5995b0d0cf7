use crate::db::Supplier;
use crate::error::{LoungeError, LoungeResult};
use crate::state::AppState;
use axum::extract::{Json, Path, State as AxumState};
use serde::Deserialize;

#[derive(Deserialize)]
pub struct SupplierPayload {
    pub name: String,
    pub contact_person: Option<String>,
    pub phone: Option<String>,
    pub email: Option<String>,
    pub address: Option<String>,
}

pub async fn get_supplier_list_axum(
    AxumState(state): AxumState<AppState>,
) -> LoungeResult<Json<Vec<Supplier>>> {
    let suppliers = sqlx::query_as::<_, Supplier>("SELECT * FROM suppliers ORDER BY name")
        .fetch_all(&state.pool)
        .await?;
    Ok(Json(suppliers))
}

pub async fn create_supplier_axum(
    AxumState(state): AxumState<AppState>,
    Json(payload): Json<SupplierPayload>,
) -> LoungeResult<Json<Supplier>> {
    if payload.name.trim().is_empty() {
        return Err(LoungeError::Validation("name is required".to_string()));
    }

    let result = sqlx::query(
        "INSERT INTO suppliers (name, contact_person, phone, email, address) VALUES (?, ?, ?, ?, ?)",
    )
    .bind(&payload.name)
    .bind(&payload.contact_person)
    .bind(&payload.phone)
    .bind(&payload.email)
    .bind(&payload.address)
    .execute(&state.pool)
    .await?;

    let supplier = sqlx::query_as::<_, Supplier>("SELECT * FROM suppliers WHERE id = ?")
        .bind(result.last_insert_rowid())
        .fetch_one(&state.pool)
        .await?;
    Ok(Json(supplier))
}

pub async fn update_supplier_axum(
    AxumState(state): AxumState<AppState>,
    Path(id): Path<i64>,
    Json(payload): Json<SupplierPayload>,
) -> LoungeResult<Json<Supplier>> {
    if payload.name.trim().is_empty() {
        return Err(LoungeError::Validation("name is required".to_string()));
    }

    let result = sqlx::query(
        "UPDATE suppliers
         SET name = ?, contact_person = ?, phone = ?, email = ?, address = ?, updated_at = ?
         WHERE id = ?",
    )
    .bind(&payload.name)
    .bind(&payload.contact_person)
    .bind(&payload.phone)
    .bind(&payload.email)
    .bind(&payload.address)
    .bind(chrono::Local::now().naive_local())
    .bind(id)
    .execute(&state.pool)
    .await?;

    if result.rows_affected() == 0 {
        return Err(LoungeError::NotFound(format!("Supplier {} not found", id)));
    }

    let supplier = sqlx::query_as::<_, Supplier>("SELECT * FROM suppliers WHERE id = ?")
        .bind(id)
        .fetch_one(&state.pool)
        .await?;
    Ok(Json(supplier))
}

/// Suppliers referenced by items are deactivated instead of deleted, so
/// item foreign keys stay valid.
pub async fn delete_supplier_axum(
    AxumState(state): AxumState<AppState>,
    Path(id): Path<i64>,
) -> LoungeResult<Json<bool>> {
    let referenced: (i64,) =
        sqlx::query_as("SELECT COUNT(*) FROM inventory_items WHERE supplier_id = ?")
            .bind(id)
            .fetch_one(&state.pool)
            .await?;

    let result = if referenced.0 > 0 {
        sqlx::query("UPDATE suppliers SET is_active = 0, updated_at = ? WHERE id = ?")
            .bind(chrono::Local::now().naive_local())
            .bind(id)
            .execute(&state.pool)
            .await?
    } else {
        sqlx::query("DELETE FROM suppliers WHERE id = ?")
            .bind(id)
            .execute(&state.pool)
            .await?
    };

    if result.rows_affected() == 0 {
        return Err(LoungeError::NotFound(format!("Supplier {} not found", id)));
    }
    Ok(Json(true))
}
