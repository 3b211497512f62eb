mod common;

use sea_orm::{ColumnTrait, EntityTrait, PaginatorTrait, QueryFilter};
use store_rating_api::{
    dto::ratings::{StoreRatingQuery, SubmitRatingRequest, UserRatingQuery},
    entity::{Ratings, Role, Stores, ratings},
    error::AppError,
    events::BroadcastEvent,
    services::{rating_service, store_service},
};

fn rate(store_id: i32, user_id: i32, rating: i32) -> SubmitRatingRequest {
    SubmitRatingRequest {
        store_id,
        user_id,
        rating,
        comment: None,
    }
}

#[tokio::test]
async fn first_rating_becomes_store_average() -> anyhow::Result<()> {
    let state = common::setup_state().await?;
    let owner = common::insert_user(&state, "Owner One", "owner@example.com", Role::Owner).await?;
    let user = common::insert_user(&state, "Rater One", "rater@example.com", Role::User).await?;
    let store = common::insert_store_for(&state, owner.id, "Corner Shop", "shop@example.com").await?;
    assert_eq!(store.rating, 0.0);

    let resp = rating_service::submit_rating(&state, rate(store.id, user.id, 4)).await?;
    let data = resp.data.expect("submission");
    assert_eq!(data.user_rating.rating, 4);
    assert_eq!(data.avg_rating, 4.0);

    let stored = Stores::find_by_id(store.id).one(&state.orm).await?.expect("store");
    assert_eq!(stored.rating, 4.0);

    Ok(())
}

#[tokio::test]
async fn average_tracks_every_rater() -> anyhow::Result<()> {
    let state = common::setup_state().await?;
    let owner = common::insert_user(&state, "Owner One", "owner@example.com", Role::Owner).await?;
    let store = common::insert_store_for(&state, owner.id, "Corner Shop", "shop@example.com").await?;

    let mut raters = Vec::new();
    for i in 0..3 {
        let email = format!("rater{i}@example.com");
        raters.push(common::insert_user(&state, "Rater", &email, Role::User).await?);
    }

    rating_service::submit_rating(&state, rate(store.id, raters[0].id, 5)).await?;
    let resp = rating_service::submit_rating(&state, rate(store.id, raters[1].id, 4)).await?;
    assert_eq!(resp.data.expect("submission").avg_rating, 4.5);

    let resp = rating_service::submit_rating(&state, rate(store.id, raters[2].id, 3)).await?;
    assert_eq!(resp.data.expect("submission").avg_rating, 4.0);

    let average = rating_service::get_store_rating(&state, StoreRatingQuery { store_id: store.id })
        .await?
        .data
        .expect("average");
    assert_eq!(average.store_id, store.id);
    assert_eq!(average.avg_rating, 4.0);

    Ok(())
}

#[tokio::test]
async fn resubmission_updates_the_existing_row() -> anyhow::Result<()> {
    let state = common::setup_state().await?;
    let owner = common::insert_user(&state, "Owner One", "owner@example.com", Role::Owner).await?;
    let alice = common::insert_user(&state, "Alice", "alice@example.com", Role::User).await?;
    let bob = common::insert_user(&state, "Bob", "bob@example.com", Role::User).await?;
    let store = common::insert_store_for(&state, owner.id, "Corner Shop", "shop@example.com").await?;

    rating_service::submit_rating(&state, rate(store.id, alice.id, 5)).await?;
    rating_service::submit_rating(&state, rate(store.id, bob.id, 4)).await?;

    let mut again = rate(store.id, alice.id, 2);
    again.comment = Some("Went downhill".into());
    let resp = rating_service::submit_rating(&state, again).await?;
    let data = resp.data.expect("submission");
    assert_eq!(data.user_rating.rating, 2);
    assert_eq!(data.user_rating.comment.as_deref(), Some("Went downhill"));
    assert_eq!(data.avg_rating, 3.0);

    let count = Ratings::find()
        .filter(ratings::Column::StoreId.eq(store.id))
        .count(&state.orm)
        .await?;
    assert_eq!(count, 2);

    let lookup = rating_service::get_user_rating(
        &state,
        UserRatingQuery {
            store_id: store.id,
            user_id: alice.id,
        },
    )
    .await?
    .data
    .expect("lookup");
    assert_eq!(lookup.user_rating.map(|r| r.rating), Some(2));

    Ok(())
}

#[tokio::test]
async fn unknown_store_or_user_is_rejected() -> anyhow::Result<()> {
    let state = common::setup_state().await?;
    let owner = common::insert_user(&state, "Owner One", "owner@example.com", Role::Owner).await?;
    let user = common::insert_user(&state, "Rater One", "rater@example.com", Role::User).await?;
    let store = common::insert_store_for(&state, owner.id, "Corner Shop", "shop@example.com").await?;

    let err = rating_service::submit_rating(&state, rate(store.id + 100, user.id, 3))
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::NotFound("Store")));

    let err = rating_service::submit_rating(&state, rate(store.id, user.id + 100, 3))
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::NotFound("User")));

    assert_eq!(Ratings::find().count(&state.orm).await?, 0);
    Ok(())
}

#[tokio::test]
async fn out_of_range_rating_changes_nothing() -> anyhow::Result<()> {
    let state = common::setup_state().await?;
    let owner = common::insert_user(&state, "Owner One", "owner@example.com", Role::Owner).await?;
    let user = common::insert_user(&state, "Rater One", "rater@example.com", Role::User).await?;
    let store = common::insert_store_for(&state, owner.id, "Corner Shop", "shop@example.com").await?;
    let mut subscription = state.events.subscribe();

    for bad in [0, 6] {
        let err = rating_service::submit_rating(&state, rate(store.id, user.id, bad))
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));
    }

    assert_eq!(Ratings::find().count(&state.orm).await?, 0);
    assert_eq!(subscription.try_recv(), None);
    Ok(())
}

#[tokio::test]
async fn subscriber_sees_one_update_per_submission() -> anyhow::Result<()> {
    let state = common::setup_state().await?;
    let owner = common::insert_user(&state, "Owner One", "owner@example.com", Role::Owner).await?;
    let alice = common::insert_user(&state, "Alice", "alice@example.com", Role::User).await?;
    let bob = common::insert_user(&state, "Bob", "bob@example.com", Role::User).await?;
    let store = common::insert_store_for(&state, owner.id, "Corner Shop", "shop@example.com").await?;

    let mut first = state.events.subscribe();
    let mut second = state.events.subscribe();

    rating_service::submit_rating(&state, rate(store.id, alice.id, 5)).await?;
    rating_service::submit_rating(&state, rate(store.id, bob.id, 4)).await?;

    for sub in [&mut first, &mut second] {
        assert_eq!(
            sub.try_recv(),
            Some(BroadcastEvent::RatingUpdate {
                store_id: store.id,
                avg_rating: 5.0
            })
        );
        assert_eq!(
            sub.try_recv(),
            Some(BroadcastEvent::RatingUpdate {
                store_id: store.id,
                avg_rating: 4.5
            })
        );
        assert_eq!(sub.try_recv(), None);
    }

    drop(second);
    assert_eq!(state.events.subscriber_count(), 1);
    Ok(())
}

#[tokio::test]
async fn ratings_are_listed_per_user_and_per_store() -> anyhow::Result<()> {
    let state = common::setup_state().await?;
    let owner = common::insert_user(&state, "Owner One", "owner@example.com", Role::Owner).await?;
    let alice = common::insert_user(&state, "Alice Reviewer", "alice@example.com", Role::User).await?;
    let bob = common::insert_user(&state, "Bob Reviewer", "bob@example.com", Role::User).await?;
    let shop = common::insert_store_for(&state, owner.id, "Corner Shop", "shop@example.com").await?;
    let cafe = common::insert_store_for(&state, owner.id, "Cafe", "cafe@example.com").await?;

    rating_service::submit_rating(&state, rate(shop.id, alice.id, 5)).await?;
    rating_service::submit_rating(&state, rate(cafe.id, alice.id, 2)).await?;
    rating_service::submit_rating(&state, rate(shop.id, bob.id, 4)).await?;

    let mine = rating_service::list_user_ratings(&state, alice.id).await?;
    assert_eq!(mine.meta.as_ref().and_then(|m| m.total), Some(2));
    let stores: Vec<i32> = mine
        .data
        .expect("ratings")
        .ratings
        .iter()
        .map(|r| r.store_id)
        .collect();
    assert_eq!(stores, vec![shop.id, cafe.id]);

    let listing = store_service::list_store_ratings(&state, shop.id)
        .await?
        .data
        .expect("store ratings");
    assert_eq!(listing.avg_rating, 4.5);
    assert_eq!(listing.ratings.len(), 2);
    let mut names: Vec<String> = listing
        .ratings
        .into_iter()
        .filter_map(|r| r.user_name)
        .collect();
    names.sort();
    assert_eq!(names, vec!["Alice Reviewer", "Bob Reviewer"]);

    let err = store_service::list_store_ratings(&state, cafe.id + 100)
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::NotFound("Store")));

    Ok(())
}
