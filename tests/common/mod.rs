#![allow(dead_code)]

use chrono::Utc;
use sea_orm::{ActiveModelTrait, ActiveValue::Set};
use store_rating_api::{
    db::{create_orm_conn, run_migrations},
    entity::{Role, stores, users},
    events::RatingBroadcaster,
    middleware::auth::{AuthUser, TokenSettings},
    services::store_service::{NewStore, insert_store},
    state::AppState,
};

pub const JWT_SECRET: &str = "integration-test-secret";

/// Fresh in-memory database with the real migrations applied.
pub async fn setup_state() -> anyhow::Result<AppState> {
    // One connection: every pooled connection to `:memory:` is its own database.
    let orm = create_orm_conn("sqlite::memory:", 1).await?;
    run_migrations(&orm).await?;

    Ok(AppState::new(
        orm,
        TokenSettings::new(JWT_SECRET, 60),
        RatingBroadcaster::new(),
    ))
}

/// Insert an account without paying for password hashing.
pub async fn insert_user(
    state: &AppState,
    name: &str,
    email: &str,
    role: Role,
) -> anyhow::Result<users::Model> {
    let now = Utc::now();
    let user = users::ActiveModel {
        name: Set(name.to_string()),
        email: Set(email.to_string()),
        password_hash: Set("dummy".into()),
        address: Set("1 Test Street".into()),
        role: Set(role),
        created_at: Set(now),
        updated_at: Set(now),
        ..Default::default()
    }
    .insert(&state.orm)
    .await?;

    Ok(user)
}

pub async fn insert_store_for(
    state: &AppState,
    owner_id: i32,
    name: &str,
    email: &str,
) -> anyhow::Result<stores::Model> {
    let store = insert_store(
        &state.orm,
        NewStore {
            name,
            email,
            address: "42 Market Street",
            description: None,
            owner_id,
        },
    )
    .await?;

    Ok(store)
}

pub fn auth_as(user: &users::Model) -> AuthUser {
    AuthUser {
        user_id: user.id,
        role: user.role,
    }
}
