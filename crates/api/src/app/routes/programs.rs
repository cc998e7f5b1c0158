use std::sync::Arc;

use axum::{
    Json,
    extract::{Extension, Path},
    http::StatusCode,
    response::IntoResponse,
};

use campushub_catalog::ProgramDraft;
use campushub_core::ProgramId;

use crate::app::{errors, services::AppServices};
use crate::authz;
use crate::context::PrincipalContext;

pub async fn list_programs(
    Extension(services): Extension<Arc<AppServices>>,
) -> axum::response::Response {
    match services.store().list_programs().await {
        Ok(programs) => (StatusCode::OK, Json(programs)).into_response(),
        Err(e) => errors::store_error_to_response(e),
    }
}

pub async fn create_program(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(principal): Extension<PrincipalContext>,
    Json(draft): Json<ProgramDraft>,
) -> axum::response::Response {
    if let Err(resp) = authz::require_admin(&principal) {
        return resp;
    }
    if let Err(e) = draft.validate() {
        return errors::domain_error_to_response(e);
    }

    match services.store().create_program(draft).await {
        Ok(program) => (StatusCode::CREATED, Json(program)).into_response(),
        Err(e) => errors::store_error_to_response(e),
    }
}

pub async fn update_program(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(principal): Extension<PrincipalContext>,
    Path(id): Path<String>,
    Json(draft): Json<ProgramDraft>,
) -> axum::response::Response {
    if let Err(resp) = authz::require_admin(&principal) {
        return resp;
    }
    let Ok(id) = id.parse::<ProgramId>() else {
        return errors::json_error(StatusCode::BAD_REQUEST, "invalid program id");
    };
    if let Err(e) = draft.validate() {
        return errors::domain_error_to_response(e);
    }

    match services.store().update_program(id, draft).await {
        Ok(program) => (StatusCode::OK, Json(program)).into_response(),
        Err(e) => errors::store_error_to_response(e),
    }
}

pub async fn delete_program(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(principal): Extension<PrincipalContext>,
    Path(id): Path<String>,
) -> axum::response::Response {
    if let Err(resp) = authz::require_admin(&principal) {
        return resp;
    }
    let Ok(id) = id.parse::<ProgramId>() else {
        return errors::json_error(StatusCode::BAD_REQUEST, "invalid program id");
    };

    match services.store().delete_program(id).await {
        Ok(()) => (
            StatusCode::OK,
            Json(serde_json::json!({ "message": "Program deleted successfully" })),
        )
            .into_response(),
        Err(e) => errors::store_error_to_response(e),
    }
}

pub async fn subscribe(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(principal): Extension<PrincipalContext>,
    Path(id): Path<String>,
) -> axum::response::Response {
    let Ok(id) = id.parse::<ProgramId>() else {
        return errors::json_error(StatusCode::BAD_REQUEST, "invalid program id");
    };

    match services
        .store()
        .subscribe_program(principal.user_id(), id)
        .await
    {
        Ok(program) => (
            StatusCode::CREATED,
            Json(serde_json::json!({
                "message": "Subscribed to program successfully",
                "program": program,
            })),
        )
            .into_response(),
        Err(e) => errors::store_error_to_response(e),
    }
}

pub async fn unsubscribe(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(principal): Extension<PrincipalContext>,
    Path(id): Path<String>,
) -> axum::response::Response {
    let Ok(id) = id.parse::<ProgramId>() else {
        return errors::json_error(StatusCode::BAD_REQUEST, "invalid program id");
    };

    match services
        .store()
        .unsubscribe_program(principal.user_id(), id)
        .await
    {
        Ok(()) => (
            StatusCode::OK,
            Json(serde_json::json!({ "message": "Unsubscribed from program successfully" })),
        )
            .into_response(),
        Err(e) => errors::store_error_to_response(e),
    }
}
