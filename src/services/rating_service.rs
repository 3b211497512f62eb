use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ActiveValue::Set, ColumnTrait, ConnectionTrait, EntityTrait, QueryFilter,
    QueryOrder, TransactionTrait,
};
use validator::Validate;

use crate::{
    audit,
    dto::ratings::{
        RatingSubmission, StoreAverage, StoreRatingQuery, SubmitRatingRequest, UserRatingLookup,
        UserRatingQuery, UserRatings,
    },
    entity::{Ratings, Stores, Users, ratings, stores},
    error::{AppError, AppResult},
    events::BroadcastEvent,
    models::Rating,
    response::{ApiResponse, Meta},
    state::AppState,
};

/// Arithmetic mean rounded to two decimals; `0.0` when there are no ratings.
pub fn average_rating(values: &[i32]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    let sum: i64 = values.iter().map(|&v| i64::from(v)).sum();
    let mean = sum as f64 / values.len() as f64;
    (mean * 100.0).round() / 100.0
}

/// Recompute `stores.rating` from every rating row of the store.
pub async fn recompute_store_rating<C: ConnectionTrait>(
    conn: &C,
    store: stores::Model,
) -> AppResult<stores::Model> {
    let values: Vec<i32> = Ratings::find()
        .filter(ratings::Column::StoreId.eq(store.id))
        .all(conn)
        .await?
        .into_iter()
        .map(|r| r.rating)
        .collect();
    let avg = average_rating(&values);

    let mut active: stores::ActiveModel = store.into();
    active.rating = Set(avg);
    active.updated_at = Set(Utc::now());
    let updated = active.update(conn).await?;

    tracing::debug!(
        store_id = updated.id,
        count = values.len(),
        avg_rating = avg,
        "store rating recomputed"
    );
    Ok(updated)
}

pub async fn submit_rating(
    state: &AppState,
    payload: SubmitRatingRequest,
) -> AppResult<ApiResponse<RatingSubmission>> {
    payload.validate()?;
    let SubmitRatingRequest {
        store_id,
        user_id,
        rating,
        comment,
    } = payload;

    let txn = state.orm.begin().await?;

    let store = Stores::find_by_id(store_id)
        .one(&txn)
        .await?
        .ok_or(AppError::NotFound("Store"))?;
    Users::find_by_id(user_id)
        .one(&txn)
        .await?
        .ok_or(AppError::NotFound("User"))?;

    let existing = Ratings::find()
        .filter(ratings::Column::StoreId.eq(store_id))
        .filter(ratings::Column::UserId.eq(user_id))
        .one(&txn)
        .await?;

    let now = Utc::now();
    let user_rating = match existing {
        Some(row) => {
            let mut active: ratings::ActiveModel = row.into();
            active.rating = Set(rating);
            active.comment = Set(comment);
            active.updated_at = Set(now);
            active.update(&txn).await?
        }
        None => {
            ratings::ActiveModel {
                store_id: Set(store_id),
                user_id: Set(user_id),
                rating: Set(rating),
                comment: Set(comment),
                created_at: Set(now),
                updated_at: Set(now),
                ..Default::default()
            }
            .insert(&txn)
            .await?
        }
    };

    let store = recompute_store_rating(&txn, store).await?;
    txn.commit().await?;

    let avg_rating = store.rating;
    let delivered = state.events.publish(BroadcastEvent::RatingUpdate {
        store_id,
        avg_rating,
    });
    tracing::info!(store_id, user_id, rating, avg_rating, delivered, "rating submitted");

    audit::record(
        state,
        Some(user_id),
        "rating_submit",
        "ratings",
        serde_json::json!({ "store_id": store_id, "rating": rating }),
    )
    .await;

    let data = RatingSubmission {
        user_rating: Rating::from(user_rating),
        avg_rating,
    };
    Ok(ApiResponse::success(
        "Rating submitted",
        data,
        Some(Meta::empty()),
    ))
}

pub async fn list_user_ratings(
    state: &AppState,
    user_id: i32,
) -> AppResult<ApiResponse<UserRatings>> {
    let ratings: Vec<Rating> = Ratings::find()
        .filter(ratings::Column::UserId.eq(user_id))
        .order_by_asc(ratings::Column::StoreId)
        .all(&state.orm)
        .await?
        .into_iter()
        .map(Rating::from)
        .collect();

    let total = ratings.len() as u64;
    Ok(ApiResponse::success(
        "Ratings",
        UserRatings { ratings },
        Some(Meta::with_total(total)),
    ))
}

pub async fn get_user_rating(
    state: &AppState,
    query: UserRatingQuery,
) -> AppResult<ApiResponse<UserRatingLookup>> {
    let user_rating = Ratings::find()
        .filter(ratings::Column::StoreId.eq(query.store_id))
        .filter(ratings::Column::UserId.eq(query.user_id))
        .one(&state.orm)
        .await?
        .map(Rating::from);

    Ok(ApiResponse::success(
        "Rating",
        UserRatingLookup { user_rating },
        Some(Meta::empty()),
    ))
}

pub async fn get_store_rating(
    state: &AppState,
    query: StoreRatingQuery,
) -> AppResult<ApiResponse<StoreAverage>> {
    let store = Stores::find_by_id(query.store_id)
        .one(&state.orm)
        .await?
        .ok_or(AppError::NotFound("Store"))?;

    Ok(ApiResponse::success(
        "Store rating",
        StoreAverage {
            store_id: store.id,
            avg_rating: store.rating,
        },
        Some(Meta::empty()),
    ))
}
