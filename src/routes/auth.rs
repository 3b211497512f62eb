use axum::{
    Json, Router,
    extract::State,
    http::StatusCode,
    routing::{get, post, put},
};

use crate::{
    dto::auth::{
        LoginRequest, LoginResponse, RegisterRequest, UpdatePasswordRequest, UpdateProfileRequest,
    },
    error::AppResult,
    middleware::auth::AuthUser,
    models::Account,
    response::ApiResponse,
    routes::extract::{ApiJson, ApiPath},
    services::auth_service,
    state::AppState,
};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/register", post(register))
        .route("/login", post(login))
        .route("/logout", post(logout))
        .route("/update-password", post(update_password))
        .route("/user/id/{id}", get(get_user_by_id))
        .route("/user/email/{email}", get(get_user_by_email))
        .route("/user/{id}", put(update_profile))
}

#[utoipa::path(
    post,
    path = "/api/v1/auth/register",
    request_body = RegisterRequest,
    responses(
        (status = 201, description = "Register user", body = ApiResponse<Account>),
        (status = 400, description = "Validation failed"),
        (status = 409, description = "Email already registered")
    ),
    tag = "Auth"
)]
pub async fn register(
    State(state): State<AppState>,
    ApiJson(payload): ApiJson<RegisterRequest>,
) -> AppResult<(StatusCode, Json<ApiResponse<Account>>)> {
    let resp = auth_service::register_user(&state, payload).await?;
    Ok((StatusCode::CREATED, Json(resp)))
}

#[utoipa::path(
    post,
    path = "/api/v1/auth/login",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Login user", body = ApiResponse<LoginResponse>),
        (status = 400, description = "Invalid credentials")
    ),
    tag = "Auth"
)]
pub async fn login(
    State(state): State<AppState>,
    ApiJson(payload): ApiJson<LoginRequest>,
) -> AppResult<Json<ApiResponse<LoginResponse>>> {
    let resp = auth_service::login_user(&state, payload).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    post,
    path = "/api/v1/auth/logout",
    responses(
        (status = 200, description = "Client should discard its token", body = ApiResponse<serde_json::Value>)
    ),
    tag = "Auth"
)]
pub async fn logout() -> Json<ApiResponse<serde_json::Value>> {
    Json(auth_service::logout())
}

#[utoipa::path(
    post,
    path = "/api/v1/auth/update-password",
    request_body = UpdatePasswordRequest,
    responses(
        (status = 200, description = "Password updated", body = ApiResponse<serde_json::Value>),
        (status = 400, description = "Old password incorrect or new password too weak"),
        (status = 404, description = "User not found")
    ),
    tag = "Auth"
)]
pub async fn update_password(
    State(state): State<AppState>,
    ApiJson(payload): ApiJson<UpdatePasswordRequest>,
) -> AppResult<Json<ApiResponse<serde_json::Value>>> {
    let resp = auth_service::update_password(&state, payload).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    get,
    path = "/api/v1/auth/user/id/{id}",
    params(
        ("id" = i32, Path, description = "User ID")
    ),
    responses(
        (status = 200, description = "User found", body = ApiResponse<Account>),
        (status = 404, description = "User not found")
    ),
    tag = "Auth"
)]
pub async fn get_user_by_id(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<i32>,
) -> AppResult<Json<ApiResponse<Account>>> {
    let resp = auth_service::get_user_by_id(&state, id).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    get,
    path = "/api/v1/auth/user/email/{email}",
    params(
        ("email" = String, Path, description = "Email, matched case-insensitively")
    ),
    responses(
        (status = 200, description = "User found", body = ApiResponse<Account>),
        (status = 404, description = "User not found")
    ),
    tag = "Auth"
)]
pub async fn get_user_by_email(
    State(state): State<AppState>,
    ApiPath(email): ApiPath<String>,
) -> AppResult<Json<ApiResponse<Account>>> {
    let resp = auth_service::get_user_by_email(&state, &email).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    put,
    path = "/api/v1/auth/user/{id}",
    params(
        ("id" = i32, Path, description = "User ID")
    ),
    request_body = UpdateProfileRequest,
    responses(
        (status = 200, description = "Profile updated", body = ApiResponse<Account>),
        (status = 403, description = "Forbidden"),
        (status = 404, description = "User not found"),
        (status = 409, description = "Email already registered")
    ),
    security(("bearer_auth" = [])),
    tag = "Auth"
)]
pub async fn update_profile(
    State(state): State<AppState>,
    user: AuthUser,
    ApiPath(id): ApiPath<i32>,
    ApiJson(payload): ApiJson<UpdateProfileRequest>,
) -> AppResult<Json<ApiResponse<Account>>> {
    let resp = auth_service::update_profile(&state, &user, id, payload).await?;
    Ok(Json(resp))
}
