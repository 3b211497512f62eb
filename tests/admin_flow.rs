mod common;

use store_rating_api::{
    dto::{
        admin::{AddStoreRequest, AdminRegisterRequest},
        ratings::SubmitRatingRequest,
        stores::CreateStoreRequest,
    },
    entity::Role,
    error::AppError,
    routes::params::{SortOrder, StoreListQuery, StoreSortBy, UserListQuery, UserSortBy},
    services::{admin_service, rating_service, store_service},
};

fn add_store_request(store_email: &str, owner_email: &str) -> AddStoreRequest {
    AddStoreRequest {
        name: "Harbour Books".into(),
        email: store_email.into(),
        address: "3 Quay Street".into(),
        description: Some("Second-hand books".into()),
        owner_name: "Harbour Owner".into(),
        owner_email: owner_email.into(),
        owner_password: "Owner@123".into(),
        owner_address: "3 Quay Street".into(),
    }
}

#[tokio::test]
async fn dashboard_counts_everything() -> anyhow::Result<()> {
    let state = common::setup_state().await?;
    let admin = common::insert_user(&state, "Admin", "admin@example.com", Role::Admin).await?;
    let owner = common::insert_user(&state, "Owner", "owner@example.com", Role::Owner).await?;
    let user = common::insert_user(&state, "User", "user@example.com", Role::User).await?;
    let store = common::insert_store_for(&state, owner.id, "Shop", "shop@example.com").await?;
    rating_service::submit_rating(
        &state,
        SubmitRatingRequest {
            store_id: store.id,
            user_id: user.id,
            rating: 3,
            comment: None,
        },
    )
    .await?;

    let stats = admin_service::dashboard(&state, &common::auth_as(&admin))
        .await?
        .data
        .expect("stats");
    assert_eq!((stats.users, stats.stores, stats.ratings), (3, 1, 1));

    Ok(())
}

#[tokio::test]
async fn admin_operations_reject_other_roles() -> anyhow::Result<()> {
    let state = common::setup_state().await?;
    let owner = common::insert_user(&state, "Owner", "owner@example.com", Role::Owner).await?;
    let user = common::insert_user(&state, "User", "user@example.com", Role::User).await?;

    for caller in [&owner, &user] {
        let auth = common::auth_as(caller);
        let err = admin_service::dashboard(&state, &auth).await.unwrap_err();
        assert!(matches!(err, AppError::Forbidden));
        let err = admin_service::list_users(&state, &auth, UserListQuery::default())
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Forbidden));
        let err = admin_service::user_details(&state, &auth, owner.id)
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Forbidden));
    }

    Ok(())
}

#[tokio::test]
async fn user_listing_filters_and_sorts() -> anyhow::Result<()> {
    let state = common::setup_state().await?;
    let admin = common::insert_user(&state, "Admin", "admin@example.com", Role::Admin).await?;
    common::insert_user(&state, "Bella", "bella@example.com", Role::Owner).await?;
    common::insert_user(&state, "Adam", "adam@example.com", Role::Owner).await?;
    common::insert_user(&state, "Cara", "cara@example.com", Role::User).await?;
    let auth = common::auth_as(&admin);

    // Query strings may still use the legacy role spelling.
    let query: UserListQuery = serde_json::from_str(r#"{"role":"store-owner","order":"desc"}"#)?;
    let resp = admin_service::list_users(&state, &auth, query).await?;
    assert_eq!(resp.meta.as_ref().and_then(|m| m.total), Some(2));
    let names: Vec<String> = resp
        .data
        .expect("users")
        .users
        .into_iter()
        .map(|u| u.name)
        .collect();
    assert_eq!(names, vec!["Bella", "Adam"]);

    let query = UserListQuery {
        email: Some("cara@example.com".into()),
        ..Default::default()
    };
    let users = admin_service::list_users(&state, &auth, query)
        .await?
        .data
        .expect("users")
        .users;
    assert_eq!(users.len(), 1);
    assert_eq!(users[0].role, Role::User);

    // Blank filters are ignored.
    let query = UserListQuery {
        name: Some("  ".into()),
        sort_by: Some(UserSortBy::Email),
        order: Some(SortOrder::Asc),
        ..Default::default()
    };
    let emails: Vec<String> = admin_service::list_users(&state, &auth, query)
        .await?
        .data
        .expect("users")
        .users
        .into_iter()
        .map(|u| u.email)
        .collect();
    assert_eq!(
        emails,
        vec![
            "adam@example.com",
            "admin@example.com",
            "bella@example.com",
            "cara@example.com"
        ]
    );

    Ok(())
}

#[tokio::test]
async fn store_listings_sort_by_rating() -> anyhow::Result<()> {
    let state = common::setup_state().await?;
    let admin = common::insert_user(&state, "Admin", "admin@example.com", Role::Admin).await?;
    let owner = common::insert_user(&state, "Owner", "owner@example.com", Role::Owner).await?;
    let user = common::insert_user(&state, "User", "user@example.com", Role::User).await?;
    let low = common::insert_store_for(&state, owner.id, "Low", "low@example.com").await?;
    let high = common::insert_store_for(&state, owner.id, "High", "high@example.com").await?;

    for (store_id, rating) in [(low.id, 2), (high.id, 5)] {
        rating_service::submit_rating(
            &state,
            SubmitRatingRequest {
                store_id,
                user_id: user.id,
                rating,
                comment: None,
            },
        )
        .await?;
    }

    let query = StoreListQuery {
        sort_by: Some(StoreSortBy::Rating),
        order: Some(SortOrder::Desc),
        ..Default::default()
    };
    let stores = admin_service::list_stores(&state, &common::auth_as(&admin), query)
        .await?
        .data
        .expect("stores")
        .stores;
    let ids: Vec<i32> = stores.iter().map(|s| s.store.id).collect();
    assert_eq!(ids, vec![high.id, low.id]);
    assert_eq!(stores[0].avg_rating, 5.0);
    assert_eq!(stores[1].avg_rating, stores[1].store.rating);

    let body = serde_json::to_value(&stores[1])?;
    assert_eq!(body["avgRating"], 2.0);
    assert_eq!(body["rating"], 2.0);

    let public = store_service::list_stores(
        &state,
        StoreListQuery {
            name: Some("Low".into()),
            ..Default::default()
        },
    )
    .await?
    .data
    .expect("stores")
    .stores;
    assert_eq!(public.len(), 1);
    assert_eq!(public[0].store.rating, 2.0);
    assert_eq!(public[0].owner.as_ref().map(|o| o.id), Some(owner.id));

    Ok(())
}

#[tokio::test]
async fn add_store_creates_or_reuses_owner() -> anyhow::Result<()> {
    let state = common::setup_state().await?;
    let admin = common::insert_user(&state, "Admin", "admin@example.com", Role::Admin).await?;
    let auth = common::auth_as(&admin);

    let created = admin_service::add_store(
        &state,
        &auth,
        add_store_request("books@example.com", "harbour@example.com"),
    )
    .await?
    .data
    .expect("store and owner");
    assert_eq!(created.owner.role, Role::Owner);
    assert_eq!(created.store.owner_id, created.owner.id);
    assert_eq!(created.store.rating, 0.0);

    let second = admin_service::add_store(
        &state,
        &auth,
        add_store_request("annex@example.com", "harbour@example.com"),
    )
    .await?
    .data
    .expect("store and owner");
    assert_eq!(second.owner.id, created.owner.id);

    let err = admin_service::add_store(
        &state,
        &auth,
        add_store_request("annex@example.com", "someone@example.com"),
    )
    .await
    .unwrap_err();
    assert!(matches!(err, AppError::Conflict(_)));
    // The owner created inside the failed transaction is rolled back.
    let err = admin_service::user_details(&state, &auth, created.owner.id + 1)
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::NotFound("User")));

    common::insert_user(&state, "Plain", "plain@example.com", Role::User).await?;
    let err = admin_service::add_store(
        &state,
        &auth,
        add_store_request("third@example.com", "plain@example.com"),
    )
    .await
    .unwrap_err();
    assert!(matches!(err, AppError::BadRequest(_)));

    Ok(())
}

#[tokio::test]
async fn admin_registers_any_role() -> anyhow::Result<()> {
    let state = common::setup_state().await?;
    let admin = common::insert_user(&state, "Admin", "admin@example.com", Role::Admin).await?;

    let account = admin_service::register_user(
        &state,
        &common::auth_as(&admin),
        AdminRegisterRequest {
            name: "Second Admin".into(),
            email: "admin2@example.com".into(),
            password: "Admin@123".into(),
            address: "HQ".into(),
            role: Role::Admin,
        },
    )
    .await?
    .data
    .expect("account");
    assert_eq!(account.role, Role::Admin);

    Ok(())
}

#[tokio::test]
async fn user_details_include_owner_ratings() -> anyhow::Result<()> {
    let state = common::setup_state().await?;
    let admin = common::insert_user(&state, "Admin", "admin@example.com", Role::Admin).await?;
    let owner = common::insert_user(&state, "Owner", "owner@example.com", Role::Owner).await?;
    let user = common::insert_user(&state, "User", "user@example.com", Role::User).await?;
    let store = common::insert_store_for(&state, owner.id, "Shop", "shop@example.com").await?;
    rating_service::submit_rating(
        &state,
        SubmitRatingRequest {
            store_id: store.id,
            user_id: user.id,
            rating: 4,
            comment: None,
        },
    )
    .await?;
    let auth = common::auth_as(&admin);

    let details = admin_service::user_details(&state, &auth, owner.id)
        .await?
        .data
        .expect("details");
    let ratings = details.owner_rating.expect("owner rating");
    assert_eq!(ratings.len(), 1);
    assert_eq!(ratings[0].store_id, store.id);
    assert_eq!(ratings[0].avg_rating, 4.0);

    let details = admin_service::user_details(&state, &auth, user.id)
        .await?
        .data
        .expect("details");
    assert!(details.owner_rating.is_none());

    Ok(())
}

#[tokio::test]
async fn owners_may_only_add_their_own_stores() -> anyhow::Result<()> {
    let state = common::setup_state().await?;
    let owner = common::insert_user(&state, "Owner", "owner@example.com", Role::Owner).await?;
    let rival = common::insert_user(&state, "Rival", "rival@example.com", Role::Owner).await?;
    let user = common::insert_user(&state, "User", "user@example.com", Role::User).await?;

    let request = |owner_id: i32, email: &str| CreateStoreRequest {
        name: "Owner Store".into(),
        email: email.into(),
        address: "5 High Street".into(),
        description: None,
        owner_id,
    };

    let store = store_service::create_store(
        &state,
        &common::auth_as(&owner),
        request(owner.id, "mine@example.com"),
    )
    .await?
    .data
    .expect("store");
    assert_eq!(store.owner_id, owner.id);

    let err = store_service::create_store(
        &state,
        &common::auth_as(&rival),
        request(owner.id, "theirs@example.com"),
    )
    .await
    .unwrap_err();
    assert!(matches!(err, AppError::Forbidden));

    let err = store_service::create_store(
        &state,
        &common::auth_as(&user),
        request(user.id, "user@example.com"),
    )
    .await
    .unwrap_err();
    assert!(matches!(err, AppError::Forbidden));

    Ok(())
}

#[tokio::test]
async fn store_emails_are_unique_regardless_of_case() -> anyhow::Result<()> {
    let state = common::setup_state().await?;
    let owner = common::insert_user(&state, "Owner", "owner@example.com", Role::Owner).await?;
    common::insert_store_for(&state, owner.id, "Shop", "Shop@Example.com").await?;

    let err = store_service::create_store(
        &state,
        &common::auth_as(&owner),
        CreateStoreRequest {
            name: "Shop Again".into(),
            email: "shop@example.com".into(),
            address: "5 High Street".into(),
            description: None,
            owner_id: owner.id,
        },
    )
    .await
    .unwrap_err();
    assert!(matches!(err, AppError::Conflict(_)));

    Ok(())
}
