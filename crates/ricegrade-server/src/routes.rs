//! Request handlers for `/standard` and `/history`.

use axum::Json;
use axum::extract::{FromRequest, Path, Query, State};
use axum::http::StatusCode;
use chrono::Utc;
use ricegrade_core::{CreateInspection, HistoryPage, HistoryQuery, Inspection};
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use tracing::info;
use uuid::Uuid;

use crate::{ApiError, AppState};

/// `Json` body whose rejections render through [`ApiError`].
#[derive(FromRequest)]
#[from_request(via(axum::Json), rejection(ApiError))]
pub(crate) struct ApiJson<T>(pub T);

#[derive(Serialize)]
pub(crate) struct Created {
    #[serde(rename = "inspectionID")]
    inspection_id: String,
    #[serde(rename = "standardID")]
    standard_id: i64,
}

#[derive(Deserialize)]
pub(crate) struct DeleteRequest {
    #[serde(rename = "inspectionID", default)]
    inspection_ids: Vec<String>,
}

pub(crate) async fn list_standards(State(state): State<AppState>) -> Json<Value> {
    Json(json!({ "data": state.catalog.standards() }))
}

pub(crate) async fn list_history(
    State(state): State<AppState>,
    Query(query): Query<HistoryQuery>,
) -> Result<Json<HistoryPage>, ApiError> {
    let filter = query.resolve()?;
    let page = state
        .with_store(move |store| Ok(store.history(&filter)?))
        .await?;
    Ok(Json(page))
}

pub(crate) async fn get_history(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Inspection>, ApiError> {
    let inspection = state.with_store(move |store| Ok(store.get(&id)?)).await?;
    Ok(Json(inspection))
}

/// Grade the submitted batch against the named standard and persist the
/// result. Nothing is stored when the standard is unknown or the batch is
/// rejected.
pub(crate) async fn create_history(
    State(state): State<AppState>,
    ApiJson(request): ApiJson<CreateInspection>,
) -> Result<(StatusCode, Json<Created>), ApiError> {
    let grading = state
        .catalog
        .grade(&request.standard_name, &request.raw.grains)?;
    let grains = request.raw.grains.len();
    let inspection_id = Uuid::new_v4().simple().to_string();
    let inspection = Inspection::from_request(request, grading, inspection_id, Utc::now())?;

    let inspection = state
        .with_store(move |store| {
            store.insert(&inspection)?;
            Ok(inspection)
        })
        .await?;
    info!(
        inspection_id = %inspection.inspection_id,
        standard = %inspection.standard_name,
        grains,
        "created inspection"
    );

    Ok((
        StatusCode::CREATED,
        Json(Created {
            inspection_id: inspection.inspection_id,
            standard_id: inspection.standard_id,
        }),
    ))
}

pub(crate) async fn delete_history(
    State(state): State<AppState>,
    ApiJson(request): ApiJson<DeleteRequest>,
) -> Result<Json<Value>, ApiError> {
    let ids = request.inspection_ids;
    let deleted = state
        .with_store(move |store| Ok(store.delete_many(&ids)?))
        .await?;
    if deleted == 0 {
        return Err(ApiError::NotFound("not found inspections".into()));
    }
    Ok(Json(json!({
        "message": "Inspections is deleted",
        "deleted": deleted,
    })))
}
