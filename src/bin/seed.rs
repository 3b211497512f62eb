use store_rating_api::{
    config::AppConfig,
    db::{create_orm_conn, run_migrations},
    dto::ratings::SubmitRatingRequest,
    entity::{Role, users},
    error::AppError,
    events::RatingBroadcaster,
    middleware::auth::TokenSettings,
    services::{
        auth_service::{create_account, find_by_email},
        rating_service::submit_rating,
        store_service::{NewStore, insert_store},
    },
    state::AppState,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let config = AppConfig::from_env()?;

    let orm = create_orm_conn(&config.database_url, 1).await?;
    run_migrations(&orm).await?;
    let state = AppState::new(
        orm,
        TokenSettings::new(config.jwt_secret.clone(), config.jwt_ttl_minutes),
        RatingBroadcaster::new(),
    );

    let admin = ensure_account(
        &state,
        "Administrator John Smith",
        "admin@example.com",
        "Admin@123",
        "123 Admin St",
        Role::Admin,
    )
    .await?;
    let owner1 = ensure_account(
        &state,
        "Store Owner Alice Johnson",
        "owner1@example.com",
        "Owner@123",
        "456 Owner Ave",
        Role::Owner,
    )
    .await?;
    let owner2 = ensure_account(
        &state,
        "Store Owner Bob Williams",
        "owner2@example.com",
        "Owner@123",
        "789 Owner Blvd",
        Role::Owner,
    )
    .await?;
    let user1 = ensure_account(
        &state,
        "Regular User Charlie Brown",
        "user1@example.com",
        "User@1234",
        "101 User Rd",
        Role::User,
    )
    .await?;
    let user2 = ensure_account(
        &state,
        "Regular User Diana Prince",
        "user2@example.com",
        "User@1234",
        "202 User Ln",
        Role::User,
    )
    .await?;

    let stores = [
        ("Fresh Mart", "contact@freshmart.com", "12 Market St", "Organic groceries and fresh produce", owner2.id),
        ("Fitness Zone", "info@fitnesszone.com", "88 Workout Ave", "Gym and fitness equipment", owner1.id),
        ("Pet Paradise", "hello@petparadise.com", "7 Animal Rd", "Pet supplies and grooming", owner2.id),
    ];

    let mut store_ids = Vec::new();
    for (name, email, address, description, owner_id) in stores {
        let new_store = NewStore {
            name,
            email,
            address,
            description: Some(description),
            owner_id,
        };
        match insert_store(&state.orm, new_store).await {
            Ok(store) => {
                println!("Seeded store {name} (id={})", store.id);
                store_ids.push(store.id);
            }
            Err(AppError::Conflict(_)) => println!("Store {name} already present"),
            Err(err) => return Err(err.into()),
        }
    }

    let scores = [(user1.id, [5, 4, 3]), (user2.id, [4, 5, 2])];
    for (user_id, values) in scores {
        for (store_id, rating) in store_ids.iter().zip(values) {
            submit_rating(
                &state,
                SubmitRatingRequest {
                    store_id: *store_id,
                    user_id,
                    rating,
                    comment: None,
                },
            )
            .await?;
        }
    }

    println!("Seed completed. Admin ID: {}", admin.id);
    Ok(())
}

async fn ensure_account(
    state: &AppState,
    name: &str,
    email: &str,
    password: &str,
    address: &str,
    role: Role,
) -> anyhow::Result<users::Model> {
    let existing = find_by_email(&state.orm, email).await?;
    let user = match existing {
        Some(user) => user,
        None => create_account(&state.orm, name, email, password, address, role).await?,
    };

    println!("Ensured user {email} (role={role})");
    Ok(user)
}
