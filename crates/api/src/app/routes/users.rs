use std::sync::Arc;

use axum::{
    Json,
    extract::{Extension, Path, Query},
    http::StatusCode,
    response::IntoResponse,
};
use chrono::Utc;

use campushub_auth::{JwtClaims, hash_password, verify_password};
use campushub_core::MessageId;

use crate::app::{dto, errors, services::AppServices};
use crate::authz;
use crate::context::PrincipalContext;

pub async fn signup(
    Extension(services): Extension<Arc<AppServices>>,
    Json(body): Json<dto::SignupRequest>,
) -> axum::response::Response {
    let (draft, password) = match body.into_parts() {
        Ok(parts) => parts,
        Err(e) => return errors::domain_error_to_response(e),
    };

    let password_hash = match hash_password(&password) {
        Ok(hash) => hash,
        Err(e) => {
            tracing::error!(error = %e, "password hashing failed");
            return errors::json_error(StatusCode::INTERNAL_SERVER_ERROR, "internal server error");
        }
    };

    match services.store().create_user(draft, password_hash).await {
        Ok(user) => {
            tracing::info!(username = %user.username, "user signed up");
            (StatusCode::CREATED, Json(user)).into_response()
        }
        Err(e) => errors::store_error_to_response(e),
    }
}

pub async fn login(
    Extension(services): Extension<Arc<AppServices>>,
    Json(body): Json<dto::LoginRequest>,
) -> axum::response::Response {
    let account = match services.store().find_account(&body.username).await {
        Ok(Some(account)) => account,
        Ok(None) => return errors::json_error(StatusCode::BAD_REQUEST, "Invalid credentials"),
        Err(e) => return errors::store_error_to_response(e),
    };

    match verify_password(&body.password, &account.password_hash) {
        Ok(true) => {}
        Ok(false) => {
            return errors::json_error(StatusCode::BAD_REQUEST, "Invalid username or password");
        }
        Err(e) => {
            tracing::error!(error = %e, "password verification failed");
            return errors::json_error(StatusCode::INTERNAL_SERVER_ERROR, "internal server error");
        }
    }

    let user = account.user;
    let claims = JwtClaims::session(user.id, user.role, Utc::now());
    let token = match services.jwt().issue(&claims) {
        Ok(token) => token,
        Err(e) => {
            tracing::error!(error = %e, "token issuance failed");
            return errors::json_error(StatusCode::INTERNAL_SERVER_ERROR, "internal server error");
        }
    };

    tracing::info!(username = %user.username, role = %user.role, "user logged in");
    (
        StatusCode::OK,
        Json(serde_json::json!({
            "token": token,
            "user": {
                "id": user.id,
                "username": user.username,
                "role": user.role,
            },
        })),
    )
        .into_response()
}

pub async fn me(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(principal): Extension<PrincipalContext>,
) -> axum::response::Response {
    let user = match services.store().find_user(principal.user_id()).await {
        Ok(Some(user)) => user,
        Ok(None) => return errors::json_error(StatusCode::NOT_FOUND, "User not found"),
        Err(e) => return errors::store_error_to_response(e),
    };

    // The enrolled program is read through the join relation; the user row
    // carries no program cache.
    let program = match services.store().my_program(principal.user_id()).await {
        Ok(program) => program,
        Err(e) => return errors::store_error_to_response(e),
    };

    (
        StatusCode::OK,
        Json(serde_json::json!({ "user": user, "program": program })),
    )
        .into_response()
}

/// The user's enrolled program as a list (empty when not enrolled).
pub async fn my_programs(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(principal): Extension<PrincipalContext>,
) -> axum::response::Response {
    match services.store().my_program(principal.user_id()).await {
        Ok(program) => {
            let programs: Vec<_> = program.into_iter().collect();
            (StatusCode::OK, Json(programs)).into_response()
        }
        Err(e) => errors::store_error_to_response(e),
    }
}

pub async fn my_courses(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(principal): Extension<PrincipalContext>,
) -> axum::response::Response {
    match services.store().my_courses(principal.user_id()).await {
        Ok(courses) => (StatusCode::OK, Json(courses)).into_response(),
        Err(e) => errors::store_error_to_response(e),
    }
}

pub async fn send_message(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(principal): Extension<PrincipalContext>,
    Json(body): Json<dto::MessageRequest>,
) -> axum::response::Response {
    let draft = match body.into_draft() {
        Ok(draft) => draft,
        Err(e) => return errors::domain_error_to_response(e),
    };

    match services
        .store()
        .insert_message(principal.user_id(), draft)
        .await
    {
        Ok(message) => (
            StatusCode::CREATED,
            Json(serde_json::json!({
                "message": "Message sent successfully",
                "data": message,
            })),
        )
            .into_response(),
        Err(e) => errors::store_error_to_response(e),
    }
}

pub async fn list_students(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(principal): Extension<PrincipalContext>,
) -> axum::response::Response {
    if let Err(resp) = authz::require_admin(&principal) {
        return resp;
    }

    match services.store().list_students().await {
        Ok(roster) => (StatusCode::OK, Json(roster)).into_response(),
        Err(e) => errors::store_error_to_response(e),
    }
}

pub async fn admin_messages(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(principal): Extension<PrincipalContext>,
    Query(query): Query<dto::MessageListQuery>,
) -> axum::response::Response {
    if let Err(resp) = authz::require_admin(&principal) {
        return resp;
    }
    let filter = match query.into_filter() {
        Ok(filter) => filter,
        Err(e) => return errors::domain_error_to_response(e),
    };

    match services.store().list_messages(&filter).await {
        Ok(rows) => (StatusCode::OK, Json(rows)).into_response(),
        Err(e) => errors::store_error_to_response(e),
    }
}

pub async fn resolve_message(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(principal): Extension<PrincipalContext>,
    Path(id): Path<String>,
) -> axum::response::Response {
    if let Err(resp) = authz::require_admin(&principal) {
        return resp;
    }
    let Ok(id) = id.parse::<MessageId>() else {
        return errors::json_error(StatusCode::BAD_REQUEST, "invalid message id");
    };

    match services.store().resolve_message(id).await {
        Ok(message) => (
            StatusCode::OK,
            Json(serde_json::json!({
                "message": "Message resolved successfully",
                "data": message,
            })),
        )
            .into_response(),
        Err(e) => errors::store_error_to_response(e),
    }
}
