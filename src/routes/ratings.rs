use axum::{
    Json, Router,
    extract::State,
    routing::{get, post},
};

use crate::{
    dto::ratings::{
        RatingSubmission, StoreAverage, StoreRatingQuery, SubmitRatingRequest, UserRatingLookup,
        UserRatingQuery, UserRatings,
    },
    error::AppResult,
    response::ApiResponse,
    routes::extract::{ApiJson, ApiPath, ApiQuery},
    services::rating_service,
    state::AppState,
};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/submit", post(submit_rating))
        .route("/user/{user_id}", get(list_user_ratings))
        .route("/user-rating", get(get_user_rating))
        .route("/store-rating", get(get_store_rating))
}

#[utoipa::path(
    post,
    path = "/api/v1/rating/submit",
    request_body = SubmitRatingRequest,
    responses(
        (status = 200, description = "Rating stored and store average recomputed", body = ApiResponse<RatingSubmission>),
        (status = 400, description = "Rating out of range"),
        (status = 404, description = "Store or user not found")
    ),
    tag = "Ratings"
)]
pub async fn submit_rating(
    State(state): State<AppState>,
    ApiJson(payload): ApiJson<SubmitRatingRequest>,
) -> AppResult<Json<ApiResponse<RatingSubmission>>> {
    let resp = rating_service::submit_rating(&state, payload).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    get,
    path = "/api/v1/rating/user/{user_id}",
    params(
        ("user_id" = i32, Path, description = "User ID")
    ),
    responses(
        (status = 200, description = "All ratings written by a user", body = ApiResponse<UserRatings>)
    ),
    tag = "Ratings"
)]
pub async fn list_user_ratings(
    State(state): State<AppState>,
    ApiPath(user_id): ApiPath<i32>,
) -> AppResult<Json<ApiResponse<UserRatings>>> {
    let resp = rating_service::list_user_ratings(&state, user_id).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    get,
    path = "/api/v1/rating/user-rating",
    params(
        ("storeId" = i32, Query, description = "Store ID"),
        ("userId" = i32, Query, description = "User ID")
    ),
    responses(
        (status = 200, description = "The user's rating for the store, if any", body = ApiResponse<UserRatingLookup>)
    ),
    tag = "Ratings"
)]
pub async fn get_user_rating(
    State(state): State<AppState>,
    ApiQuery(query): ApiQuery<UserRatingQuery>,
) -> AppResult<Json<ApiResponse<UserRatingLookup>>> {
    let resp = rating_service::get_user_rating(&state, query).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    get,
    path = "/api/v1/rating/store-rating",
    params(
        ("storeId" = i32, Query, description = "Store ID")
    ),
    responses(
        (status = 200, description = "Store average", body = ApiResponse<StoreAverage>),
        (status = 404, description = "Store not found")
    ),
    tag = "Ratings"
)]
pub async fn get_store_rating(
    State(state): State<AppState>,
    ApiQuery(query): ApiQuery<StoreRatingQuery>,
) -> AppResult<Json<ApiResponse<StoreAverage>>> {
    let resp = rating_service::get_store_rating(&state, query).await?;
    Ok(Json(resp))
}
