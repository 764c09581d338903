use axum::{Json, Router, extract::State, http::StatusCode, routing::post};

use crate::{
    dto::auth::{SigninRequest, SignupRequest, UserInfo},
    error::AppResult,
    response::ApiResponse,
    services::auth_service,
    state::AppState,
};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/signup", post(signup))
        .route("/signin", post(signin))
}

#[utoipa::path(
    post,
    path = "/api/users/signup",
    request_body = SignupRequest,
    responses(
        (status = 201, description = "Account created", body = ApiResponse<UserInfo>),
        (status = 400, description = "Missing field or email already taken")
    ),
    tag = "Users"
)]
pub async fn signup(
    State(state): State<AppState>,
    Json(payload): Json<SignupRequest>,
) -> AppResult<(StatusCode, Json<ApiResponse<UserInfo>>)> {
    let resp = auth_service::signup(&state, payload).await?;
    Ok((StatusCode::CREATED, Json(resp)))
}

#[utoipa::path(
    post,
    path = "/api/users/signin",
    request_body = SigninRequest,
    responses(
        (status = 200, description = "Signed in", body = ApiResponse<UserInfo>),
        (status = 401, description = "Invalid email or password")
    ),
    tag = "Users"
)]
pub async fn signin(
    State(state): State<AppState>,
    Json(payload): Json<SigninRequest>,
) -> AppResult<Json<ApiResponse<UserInfo>>> {
    let resp = auth_service::signin(&state, payload).await?;
    Ok(Json(resp))
}
