use std::sync::Arc;

use axum::{
    Json,
    extract::{Extension, Path, Query},
    http::StatusCode,
    response::IntoResponse,
};

use campushub_catalog::CourseDraft;
use campushub_core::CourseId;

use crate::app::{dto, errors, services::AppServices};
use crate::authz;
use crate::context::PrincipalContext;

pub async fn list_courses(
    Extension(services): Extension<Arc<AppServices>>,
    Query(query): Query<dto::CourseListQuery>,
) -> axum::response::Response {
    match services.store().list_courses(query.program_id).await {
        Ok(courses) => (StatusCode::OK, Json(courses)).into_response(),
        Err(e) => errors::store_error_to_response(e),
    }
}

pub async fn create_course(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(principal): Extension<PrincipalContext>,
    Json(draft): Json<CourseDraft>,
) -> axum::response::Response {
    if let Err(resp) = authz::require_admin(&principal) {
        return resp;
    }
    if let Err(e) = draft.validate() {
        return errors::domain_error_to_response(e);
    }

    match services.store().create_course(draft).await {
        Ok(course) => (StatusCode::CREATED, Json(course)).into_response(),
        Err(e) => errors::store_error_to_response(e),
    }
}

pub async fn update_course(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(principal): Extension<PrincipalContext>,
    Path(id): Path<String>,
    Json(draft): Json<CourseDraft>,
) -> axum::response::Response {
    if let Err(resp) = authz::require_admin(&principal) {
        return resp;
    }
    let Ok(id) = id.parse::<CourseId>() else {
        return errors::json_error(StatusCode::BAD_REQUEST, "invalid course id");
    };
    if let Err(e) = draft.validate() {
        return errors::domain_error_to_response(e);
    }

    match services.store().update_course(id, draft).await {
        Ok(course) => (StatusCode::OK, Json(course)).into_response(),
        Err(e) => errors::store_error_to_response(e),
    }
}

pub async fn delete_course(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(principal): Extension<PrincipalContext>,
    Path(id): Path<String>,
) -> axum::response::Response {
    if let Err(resp) = authz::require_admin(&principal) {
        return resp;
    }
    let Ok(id) = id.parse::<CourseId>() else {
        return errors::json_error(StatusCode::BAD_REQUEST, "invalid course id");
    };

    match services.store().delete_course(id).await {
        Ok(()) => (
            StatusCode::OK,
            Json(serde_json::json!({ "message": "Course deleted successfully" })),
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
    let Ok(id) = id.parse::<CourseId>() else {
        return errors::json_error(StatusCode::BAD_REQUEST, "invalid course id");
    };

    match services
        .store()
        .subscribe_course(principal.user_id(), id)
        .await
    {
        Ok(()) => (
            StatusCode::CREATED,
            Json(serde_json::json!({ "message": "Subscribed to course successfully" })),
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
    let Ok(id) = id.parse::<CourseId>() else {
        return errors::json_error(StatusCode::BAD_REQUEST, "invalid course id");
    };

    match services
        .store()
        .unsubscribe_course(principal.user_id(), id)
        .await
    {
        Ok(()) => (
            StatusCode::OK,
            Json(serde_json::json!({ "message": "Unsubscribed from course successfully" })),
        )
            .into_response(),
        Err(e) => errors::store_error_to_response(e),
    }
}
