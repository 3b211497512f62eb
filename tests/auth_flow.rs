mod common;

use store_rating_api::{
    dto::auth::{LoginRequest, RegisterRequest, UpdatePasswordRequest, UpdateProfileRequest},
    entity::Role,
    error::AppError,
    services::auth_service,
};

const NAME: &str = "Integration Test Account Holder";

fn register(email: &str, password: &str, role: Option<Role>) -> RegisterRequest {
    RegisterRequest {
        name: NAME.into(),
        email: email.into(),
        address: "12 Long Road".into(),
        password: password.into(),
        role,
    }
}

fn login(email: &str, password: &str) -> LoginRequest {
    LoginRequest {
        email: email.into(),
        password: password.into(),
    }
}

#[tokio::test]
async fn register_defaults_to_user_and_rejects_duplicates() -> anyhow::Result<()> {
    let state = common::setup_state().await?;

    let account = auth_service::register_user(&state, register("jane@example.com", "Secret@12", None))
        .await?
        .data
        .expect("account");
    assert_eq!(account.role, Role::User);
    assert_eq!(account.name, NAME);

    let err = auth_service::register_user(&state, register("JANE@example.com", "Secret@12", None))
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::Conflict(_)));

    Ok(())
}

#[tokio::test]
async fn register_rejects_admin_role_and_weak_password() -> anyhow::Result<()> {
    let state = common::setup_state().await?;

    let err = auth_service::register_user(
        &state,
        register("root@example.com", "Secret@12", Some(Role::Admin)),
    )
    .await
    .unwrap_err();
    assert!(matches!(err, AppError::BadRequest(_)));

    let err = auth_service::register_user(&state, register("weak@example.com", "secret12", None))
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::Validation(_)));

    Ok(())
}

#[tokio::test]
async fn login_issues_token_carrying_role() -> anyhow::Result<()> {
    let state = common::setup_state().await?;
    auth_service::register_user(
        &state,
        register("owner@example.com", "Owner@123", Some(Role::Owner)),
    )
    .await?;

    let resp = auth_service::login_user(&state, login("Owner@Example.com", "Owner@123"))
        .await?
        .data
        .expect("login");
    assert_eq!(resp.user.role, Role::Owner);

    let claims = state.tokens.decode(&resp.token)?;
    assert_eq!(claims.sub, resp.user.id.to_string());
    assert_eq!(claims.role, Role::Owner);
    assert!(claims.exp > claims.iat);

    let err = auth_service::login_user(&state, login("owner@example.com", "Wrong@123"))
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::InvalidCredentials));

    let err = auth_service::login_user(&state, login("nobody@example.com", "Owner@123"))
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::InvalidCredentials));

    Ok(())
}

#[tokio::test]
async fn password_change_requires_old_password() -> anyhow::Result<()> {
    let state = common::setup_state().await?;
    let account = auth_service::register_user(&state, register("jane@example.com", "Secret@12", None))
        .await?
        .data
        .expect("account");

    let err = auth_service::update_password(
        &state,
        UpdatePasswordRequest {
            user_id: account.id,
            old_password: "Nope@1234".into(),
            new_password: "Fresh@123".into(),
        },
    )
    .await
    .unwrap_err();
    assert!(matches!(err, AppError::BadRequest(_)));

    auth_service::update_password(
        &state,
        UpdatePasswordRequest {
            user_id: account.id,
            old_password: "Secret@12".into(),
            new_password: "Fresh@123".into(),
        },
    )
    .await?;

    let err = auth_service::login_user(&state, login("jane@example.com", "Secret@12"))
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::InvalidCredentials));
    auth_service::login_user(&state, login("jane@example.com", "Fresh@123")).await?;

    let err = auth_service::update_password(
        &state,
        UpdatePasswordRequest {
            user_id: account.id + 100,
            old_password: "Fresh@123".into(),
            new_password: "Other@123".into(),
        },
    )
    .await
    .unwrap_err();
    assert!(matches!(err, AppError::NotFound("User")));

    Ok(())
}

#[tokio::test]
async fn lookups_and_profile_updates() -> anyhow::Result<()> {
    let state = common::setup_state().await?;
    let jane = common::insert_user(&state, "Jane", "jane@example.com", Role::User).await?;
    let john = common::insert_user(&state, "John", "john@example.com", Role::User).await?;

    let found = auth_service::get_user_by_email(&state, "  JANE@example.COM ")
        .await?
        .data
        .expect("account");
    assert_eq!(found.id, jane.id);

    let found = auth_service::get_user_by_id(&state, john.id)
        .await?
        .data
        .expect("account");
    assert_eq!(found.email, "john@example.com");

    let err = auth_service::get_user_by_id(&state, john.id + 100)
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::NotFound("User")));

    let err = auth_service::update_profile(
        &state,
        &common::auth_as(&john),
        jane.id,
        UpdateProfileRequest {
            name: Some("Hijacked".into()),
            ..Default::default()
        },
    )
    .await
    .unwrap_err();
    assert!(matches!(err, AppError::Forbidden));

    let err = auth_service::update_profile(
        &state,
        &common::auth_as(&jane),
        jane.id,
        UpdateProfileRequest {
            email: Some("john@example.com".into()),
            ..Default::default()
        },
    )
    .await
    .unwrap_err();
    assert!(matches!(err, AppError::Conflict(_)));

    let updated = auth_service::update_profile(
        &state,
        &common::auth_as(&jane),
        jane.id,
        UpdateProfileRequest {
            address: Some("99 New Avenue".into()),
            ..Default::default()
        },
    )
    .await?
    .data
    .expect("account");
    assert_eq!(updated.address, "99 New Avenue");
    assert_eq!(updated.name, "Jane");

    Ok(())
}
