use super::models::{HealthCheck, MaterialList};
use crate::common::state::AppState;
use crate::config::MATERIAL_LIST;
use axum::{Json, extract::State, http::StatusCode};
use utoipa_axum::{router::OpenApiRouter, routes};

pub fn router(state: &AppState) -> OpenApiRouter {
    OpenApiRouter::new()
        .routes(routes!(healthz))
        .routes(routes!(list_materials))
        .with_state(state.clone())
}

#[utoipa::path(
    get,
    path = "/healthz",
    responses(
        (status = OK, description = "Kubernetes health check", body = HealthCheck),
        (status = INTERNAL_SERVER_ERROR, description = "Database unreachable", body = HealthCheck)
    )
)]
pub async fn healthz(State(state): State<AppState>) -> (StatusCode, Json<HealthCheck>) {
    if state.db.ping().await.is_err() {
        return (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(HealthCheck {
                status: "error".to_string(),
            }),
        );
    }

    (
        StatusCode::OK,
        Json(HealthCheck {
            status: "ok".to_string(),
        }),
    )
}

#[utoipa::path(
    get,
    path = "/api/materials",
    responses(
        (status = OK, description = "Materials that can name a conversion bundle", body = MaterialList)
    )
)]
pub async fn list_materials(State(state): State<AppState>) -> Json<MaterialList> {
    Json(MaterialList {
        materials: MATERIAL_LIST.iter().map(ToString::to_string).collect(),
        metadata_policy: state.config.metadata_policy,
    })
}
