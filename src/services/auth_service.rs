use argon2::{
    Argon2, PasswordHasher,
    password_hash::{PasswordHash, PasswordVerifier, SaltString},
};
use chrono::{Duration, Utc};
use jsonwebtoken::{EncodingKey, Header, encode};
use password_hash::rand_core::OsRng;
use sea_orm::{ActiveModelTrait, ColumnTrait, DbErr, EntityTrait, QueryFilter, Set, SqlErr};
use uuid::Uuid;

use crate::{
    audit,
    dto::auth::{Claims, SigninRequest, SignupRequest, UserInfo},
    entity::users::{ActiveModel as UserActive, Column as UserCol, Entity as Users, Model as UserModel},
    error::{AppError, AppResult},
    response::{ApiResponse, Meta},
    state::AppState,
};

pub const TOKEN_TTL_DAYS: i64 = 30;

pub fn hash_password(password: &str) -> AppResult<String> {
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|e| AppError::Internal(anyhow::anyhow!(e.to_string())))
}

pub fn issue_token(
    id: Uuid,
    name: &str,
    email: &str,
    is_admin: bool,
    secret: &str,
) -> AppResult<String> {
    let expiration = Utc::now()
        .checked_add_signed(Duration::days(TOKEN_TTL_DAYS))
        .ok_or_else(|| AppError::Internal(anyhow::anyhow!("Failed to set expiration")))?;

    let claims = Claims {
        sub: id.to_string(),
        name: name.to_string(),
        email: email.to_string(),
        is_admin,
        exp: expiration.timestamp() as usize,
    };

    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )
    .map_err(|e| AppError::Internal(anyhow::anyhow!(e.to_string())))
}

/// A unique violation on `users.email` reads the same as the pre-check.
pub fn email_taken(err: DbErr) -> AppError {
    match err.sql_err() {
        Some(SqlErr::UniqueConstraintViolation(_)) => {
            AppError::BadRequest("Email is already taken".to_string())
        }
        _ => AppError::from(err),
    }
}

pub async fn signup(state: &AppState, payload: SignupRequest) -> AppResult<ApiResponse<UserInfo>> {
    let SignupRequest {
        name,
        email,
        password,
    } = payload;
    if name.trim().is_empty() || email.trim().is_empty() || password.is_empty() {
        return Err(AppError::BadRequest(
            "Name, email and password are required".into(),
        ));
    }

    let exist = Users::find()
        .filter(UserCol::Email.eq(email.as_str()))
        .one(&state.orm)
        .await?;
    if exist.is_some() {
        return Err(AppError::BadRequest("Email is already taken".to_string()));
    }

    let user = UserActive {
        id: Set(Uuid::new_v4()),
        name: Set(name),
        email: Set(email),
        password_hash: Set(hash_password(&password)?),
        is_admin: Set(false),
        created_at: Set(Utc::now().into()),
    }
    .insert(&state.orm)
    .await
    .map_err(email_taken)?;

    audit::record(
        &state.pool,
        user.id,
        "user_signup",
        "users",
        serde_json::json!({ "user_id": user.id }),
    )
    .await;

    let info = user_info(&user, &state.config.jwt_secret)?;
    Ok(ApiResponse::success("User created", info, Some(Meta::empty())))
}

pub async fn signin(state: &AppState, payload: SigninRequest) -> AppResult<ApiResponse<UserInfo>> {
    let SigninRequest { email, password } = payload;
    let user = Users::find()
        .filter(UserCol::Email.eq(email.as_str()))
        .one(&state.orm)
        .await?;

    let user = match user {
        Some(u) => u,
        None => {
            return Err(AppError::Unauthorized("Invalid email or password".into()));
        }
    };

    let parsed_hash = PasswordHash::new(&user.password_hash)
        .map_err(|_| AppError::Internal(anyhow::anyhow!("Invalid password hash")))?;

    if Argon2::default()
        .verify_password(password.as_bytes(), &parsed_hash)
        .is_err()
    {
        return Err(AppError::Unauthorized("Invalid email or password".into()));
    }

    audit::record(
        &state.pool,
        user.id,
        "user_signin",
        "users",
        serde_json::json!({ "user_id": user.id }),
    )
    .await;

    let info = user_info(&user, &state.config.jwt_secret)?;
    Ok(ApiResponse::success("Signed in", info, Some(Meta::empty())))
}

fn user_info(user: &UserModel, secret: &str) -> AppResult<UserInfo> {
    let token = issue_token(user.id, &user.name, &user.email, user.is_admin, secret)?;
    Ok(UserInfo {
        id: user.id,
        name: user.name.clone(),
        email: user.email.clone(),
        is_admin: user.is_admin,
        token,
    })
}
