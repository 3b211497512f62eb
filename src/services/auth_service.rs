use argon2::{
    Argon2, PasswordHasher,
    password_hash::{PasswordHash, PasswordVerifier, SaltString},
};
use chrono::Utc;
use password_hash::rand_core::OsRng;
use sea_orm::{
    ActiveModelTrait, ActiveValue::Set, ConnectionTrait, EntityTrait, QueryFilter,
    sea_query::{Expr, Func, SimpleExpr},
};
use validator::Validate;

use crate::{
    audit,
    dto::auth::{
        LoginRequest, LoginResponse, RegisterRequest, UpdatePasswordRequest, UpdateProfileRequest,
    },
    entity::{Role, Users, users},
    error::{AppError, AppResult},
    middleware::auth::{AuthUser, ensure_self_or_admin},
    models::Account,
    response::{ApiResponse, Meta},
    state::AppState,
};

pub fn hash_password(password: &str) -> AppResult<String> {
    let salt = SaltString::generate(&mut OsRng);
    let argon2 = Argon2::default();
    let hash = argon2
        .hash_password(password.as_bytes(), &salt)
        .map_err(|e| AppError::Internal(anyhow::anyhow!(e.to_string())))?
        .to_string();
    Ok(hash)
}

pub fn verify_password(password: &str, password_hash: &str) -> AppResult<bool> {
    let parsed_hash = PasswordHash::new(password_hash)
        .map_err(|_| AppError::Internal(anyhow::anyhow!("Invalid password hash")))?;
    Ok(Argon2::default()
        .verify_password(password.as_bytes(), &parsed_hash)
        .is_ok())
}

/// Case-insensitive match on `users.email`.
pub fn email_matches(email: &str) -> SimpleExpr {
    Expr::expr(Func::lower(Expr::col((Users, users::Column::Email))))
        .eq(email.trim().to_lowercase())
}

pub async fn find_by_email<C: ConnectionTrait>(
    conn: &C,
    email: &str,
) -> AppResult<Option<users::Model>> {
    Ok(Users::find().filter(email_matches(email)).one(conn).await?)
}

/// Insert a new account after checking the email is free.
pub async fn create_account<C: ConnectionTrait>(
    conn: &C,
    name: &str,
    email: &str,
    password: &str,
    address: &str,
    role: Role,
) -> AppResult<users::Model> {
    if find_by_email(conn, email).await?.is_some() {
        return Err(AppError::Conflict("Email already registered".into()));
    }

    let password_hash = hash_password(password)?;
    let now = Utc::now();
    let user = users::ActiveModel {
        name: Set(name.trim().to_string()),
        email: Set(email.trim().to_string()),
        password_hash: Set(password_hash),
        address: Set(address.trim().to_string()),
        role: Set(role),
        created_at: Set(now),
        updated_at: Set(now),
        ..Default::default()
    }
    .insert(conn)
    .await?;

    Ok(user)
}

pub async fn register_user(
    state: &AppState,
    payload: RegisterRequest,
) -> AppResult<ApiResponse<Account>> {
    payload.validate()?;
    let role = payload.role.unwrap_or(Role::User);
    if role == Role::Admin {
        return Err(AppError::BadRequest(
            "Admin accounts can only be created by an admin".into(),
        ));
    }

    let user = create_account(
        &state.orm,
        &payload.name,
        &payload.email,
        &payload.password,
        &payload.address,
        role,
    )
    .await?;
    tracing::info!(user_id = user.id, role = %user.role, "user registered");

    audit::record(
        state,
        Some(user.id),
        "user_register",
        "users",
        serde_json::json!({ "user_id": user.id, "role": user.role }),
    )
    .await;

    Ok(ApiResponse::success(
        "User registered",
        Account::from(user),
        Some(Meta::empty()),
    ))
}

pub async fn login_user(
    state: &AppState,
    payload: LoginRequest,
) -> AppResult<ApiResponse<LoginResponse>> {
    payload.validate()?;
    let LoginRequest { email, password } = payload;

    let user = match find_by_email(&state.orm, &email).await? {
        Some(u) => u,
        None => return Err(AppError::InvalidCredentials),
    };

    if !verify_password(&password, &user.password_hash)? {
        return Err(AppError::InvalidCredentials);
    }

    let token = state.tokens.issue(&user)?;

    audit::record(
        state,
        Some(user.id),
        "user_login",
        "users",
        serde_json::json!({ "user_id": user.id }),
    )
    .await;

    let resp = LoginResponse {
        token,
        user: Account::from(user),
    };
    Ok(ApiResponse::success("Logged in", resp, Some(Meta::empty())))
}

/// Tokens are stateless; the client discards its copy.
pub fn logout() -> ApiResponse<serde_json::Value> {
    ApiResponse::success(
        "Logged out successfully",
        serde_json::json!({}),
        Some(Meta::empty()),
    )
}

pub async fn update_password(
    state: &AppState,
    payload: UpdatePasswordRequest,
) -> AppResult<ApiResponse<serde_json::Value>> {
    payload.validate()?;

    let user = Users::find_by_id(payload.user_id)
        .one(&state.orm)
        .await?
        .ok_or(AppError::NotFound("User"))?;

    if !verify_password(&payload.old_password, &user.password_hash)? {
        return Err(AppError::BadRequest("Old password incorrect".into()));
    }

    let user_id = user.id;
    let mut active: users::ActiveModel = user.into();
    active.password_hash = Set(hash_password(&payload.new_password)?);
    active.updated_at = Set(Utc::now());
    active.update(&state.orm).await?;

    audit::record(
        state,
        Some(user_id),
        "password_update",
        "users",
        serde_json::json!({ "user_id": user_id }),
    )
    .await;

    Ok(ApiResponse::success(
        "Password updated successfully",
        serde_json::json!({}),
        Some(Meta::empty()),
    ))
}

pub async fn get_user_by_id(state: &AppState, id: i32) -> AppResult<ApiResponse<Account>> {
    let user = Users::find_by_id(id)
        .one(&state.orm)
        .await?
        .ok_or(AppError::NotFound("User"))?;
    Ok(ApiResponse::success(
        "User found",
        Account::from(user),
        Some(Meta::empty()),
    ))
}

pub async fn get_user_by_email(state: &AppState, email: &str) -> AppResult<ApiResponse<Account>> {
    let user = find_by_email(&state.orm, email)
        .await?
        .ok_or(AppError::NotFound("User"))?;
    Ok(ApiResponse::success(
        "User found",
        Account::from(user),
        Some(Meta::empty()),
    ))
}

pub async fn update_profile(
    state: &AppState,
    caller: &AuthUser,
    id: i32,
    payload: UpdateProfileRequest,
) -> AppResult<ApiResponse<Account>> {
    ensure_self_or_admin(caller, id)?;
    payload.validate()?;

    let user = Users::find_by_id(id)
        .one(&state.orm)
        .await?
        .ok_or(AppError::NotFound("User"))?;

    if let Some(email) = payload.email.as_deref() {
        if let Some(other) = find_by_email(&state.orm, email).await? {
            if other.id != user.id {
                return Err(AppError::Conflict("Email already registered".into()));
            }
        }
    }

    let mut active: users::ActiveModel = user.into();
    if let Some(name) = payload.name {
        active.name = Set(name.trim().to_string());
    }
    if let Some(email) = payload.email {
        active.email = Set(email.trim().to_string());
    }
    if let Some(address) = payload.address {
        active.address = Set(address.trim().to_string());
    }
    active.updated_at = Set(Utc::now());
    let updated = active.update(&state.orm).await?;

    audit::record(
        state,
        Some(caller.user_id),
        "profile_update",
        "users",
        serde_json::json!({ "user_id": updated.id }),
    )
    .await;

    Ok(ApiResponse::success(
        "Profile updated",
        Account::from(updated),
        Some(Meta::empty()),
    ))
}
