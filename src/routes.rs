use crate::common::state::AppState;
use crate::config::Config;
use crate::external::mes::DocumentSink;
use crate::{conversions, submissions};
use axum::{Router, extract::DefaultBodyLimit};
use sea_orm::DatabaseConnection;
use std::sync::Arc;
use utoipa::OpenApi;
use utoipa_axum::router::OpenApiRouter;
use utoipa_scalar::{Scalar, Servable};

pub fn build_router(
    db: &DatabaseConnection,
    config: &Config,
    mes: Arc<dyn DocumentSink>,
) -> Router {
    #[derive(OpenApi)]
    #[openapi(
        info(
            title = "Process Plan API",
            description = "Converts process plan workbooks into MES operation route documents"
        ),
        tags(
            (name = "conversions", description = "Workbook to MES document conversion"),
            (name = "submissions", description = "MES submission and upload history")
        )
    )]
    struct ApiDoc;

    let app_state = AppState::new(db.clone(), config.clone(), mes);

    let (router, api) = OpenApiRouter::with_openapi(ApiDoc::openapi())
        .merge(crate::common::views::router(&app_state))
        .merge(conversions::views::router(&app_state))
        .merge(submissions::views::router(&app_state))
        .split_for_parts();

    router
        .merge(Scalar::with_url("/api/docs", api))
        .layer(DefaultBodyLimit::max(config.max_upload_mb * 1024 * 1024))
}
