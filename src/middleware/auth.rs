use axum::{extract::FromRequestParts, http::header};
use jsonwebtoken::{DecodingKey, Validation, decode};
use uuid::Uuid;

use crate::{dto::auth::Claims, error::AppError, state::AppState};

/// Identity decoded from the bearer token of the current request.
#[derive(Debug, Clone)]
pub struct AuthUser {
    pub user_id: Uuid,
    pub name: String,
    pub email: String,
    pub is_admin: bool,
}

pub fn ensure_admin(user: &AuthUser) -> Result<(), AppError> {
    if !user.is_admin {
        return Err(AppError::Forbidden("Invalid Admin Token".into()));
    }
    Ok(())
}

/// Owners may see their own records; admins may see everyone's.
pub fn ensure_owner_or_admin(user: &AuthUser, owner_id: Uuid) -> Result<(), AppError> {
    if user.is_admin || user.user_id == owner_id {
        return Ok(());
    }
    Err(AppError::Forbidden("Not allowed to access this order".into()))
}

pub fn decode_token(token: &str, secret: &str) -> Result<AuthUser, AppError> {
    let decoded = decode::<Claims>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &Validation::default(),
    )
    .map_err(|_| AppError::Unauthorized("Invalid Token".into()))?;

    let user_id = Uuid::parse_str(&decoded.claims.sub)
        .map_err(|_| AppError::Unauthorized("Invalid Token".into()))?;

    Ok(AuthUser {
        user_id,
        name: decoded.claims.name,
        email: decoded.claims.email,
        is_admin: decoded.claims.is_admin,
    })
}

impl FromRequestParts<AppState> for AuthUser {
    type Rejection = AppError;
    async fn from_request_parts(
        parts: &mut axum::http::request::Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let auth_header = parts
            .headers
            .get(header::AUTHORIZATION)
            .ok_or_else(|| AppError::Unauthorized("No Token".into()))?;

        let auth_str = auth_header
            .to_str()
            .map_err(|_| AppError::Unauthorized("Invalid Token".into()))?;

        let Some(token) = auth_str.strip_prefix("Bearer ") else {
            return Err(AppError::Unauthorized("No Token".into()));
        };

        decode_token(token.trim(), &state.config.jwt_secret)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::auth_service::issue_token;

    #[test]
    fn issued_tokens_decode_to_the_same_identity() {
        let id = Uuid::new_v4();
        let token = issue_token(id, "Alice", "alice@example.com", true, "secret").unwrap();
        let user = decode_token(&token, "secret").unwrap();
        assert_eq!(user.user_id, id);
        assert_eq!(user.name, "Alice");
        assert!(user.is_admin);
    }

    #[test]
    fn wrong_secret_is_unauthorized() {
        let token = issue_token(Uuid::new_v4(), "Bob", "bob@example.com", false, "a").unwrap();
        let err = decode_token(&token, "b").unwrap_err();
        assert!(matches!(err, AppError::Unauthorized(_)));
    }

    #[test]
    fn non_admin_is_forbidden_on_admin_routes() {
        let user = AuthUser {
            user_id: Uuid::new_v4(),
            name: "Bob".into(),
            email: "bob@example.com".into(),
            is_admin: false,
        };
        assert!(matches!(ensure_admin(&user), Err(AppError::Forbidden(_))));
        assert!(ensure_owner_or_admin(&user, user.user_id).is_ok());
        assert!(ensure_owner_or_admin(&user, Uuid::new_v4()).is_err());
    }
}
