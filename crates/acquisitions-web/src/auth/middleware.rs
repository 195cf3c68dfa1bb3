use acquisitions_core::Role;
use axum::extract::FromRequestParts;
use axum::http::request::Parts;

use crate::auth::{cookie, jwt};
use crate::error::AppError;
use crate::state::AppState;

/// The caller identified by a valid token.
#[derive(Debug, Clone, PartialEq)]
pub struct AuthUser {
    pub id: i32,
    pub email: String,
    pub role: Role,
}

impl AuthUser {
    pub fn require_role(&self, allowed: &[Role]) -> Result<(), AppError> {
        if allowed.contains(&self.role) {
            Ok(())
        } else {
            tracing::warn!(
                "Access denied for user {} with role {} (requires {:?})",
                self.id,
                self.role,
                allowed
            );
            Err(AppError::Forbidden("Access denied".to_string()))
        }
    }

    /// Admins pass; everyone else only when `raw_id` is their own id.
    /// A segment that is not a number never matches.
    pub fn allow_self_or_admin(&self, raw_id: &str) -> Result<(), AppError> {
        if self.role.is_admin() {
            return Ok(());
        }
        if raw_id.trim().parse::<i32>().ok() != Some(self.id) {
            return Err(AppError::Forbidden(
                "You can only access your own account".to_string(),
            ));
        }
        Ok(())
    }
}

impl FromRequestParts<AppState> for AuthUser {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let token = cookie::request_token(&parts.headers)
            .ok_or_else(|| AppError::Unauthenticated("Authentication required".to_string()))?;

        let claims = jwt::verify_token(&state.config.auth.jwt_secret, &token)
            .map_err(|_| AppError::Unauthenticated("Invalid or expired token".to_string()))?;

        Ok(AuthUser {
            id: claims.id,
            email: claims.email,
            role: claims.role,
        })
    }
}

/// An authenticated caller whose role is `admin`.
pub struct AdminUser(pub AuthUser);

impl FromRequestParts<AppState> for AdminUser {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let user = AuthUser::from_request_parts(parts, state).await?;
        user.require_role(&[Role::Admin])?;
        Ok(AdminUser(user))
    }
}
