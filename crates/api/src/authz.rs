use axum::http::StatusCode;
use axum::response::Response;

use crate::app::errors;
use crate::context::PrincipalContext;

/// Gate for admin-only routes. The middleware authenticates; this checks
/// the role carried in the principal context.
pub fn require_admin(principal: &PrincipalContext) -> Result<(), Response> {
    if principal.role().is_admin() {
        Ok(())
    } else {
        Err(errors::json_error(
            StatusCode::FORBIDDEN,
            "Access denied, admin only",
        ))
    }
}
