use std::convert::Infallible;

use axum::{
    Json, Router,
    extract::State,
    http::StatusCode,
    response::sse::{Event, KeepAlive, Sse},
    routing::{get, post},
};
use tokio_stream::{Stream, StreamExt};

use crate::{
    dto::stores::{CreateStoreRequest, StoreListing, StoreRatings},
    error::AppResult,
    middleware::auth::AuthUser,
    models::Store,
    response::ApiResponse,
    routes::extract::{ApiJson, ApiPath, ApiQuery},
    routes::params::StoreListQuery,
    services::store_service,
    state::AppState,
};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/add", post(create_store))
        .route("/list", get(list_stores))
        .route("/{id}/ratings", get(store_ratings))
}

#[utoipa::path(
    post,
    path = "/api/v1/store/add",
    request_body = CreateStoreRequest,
    responses(
        (status = 201, description = "Store added", body = ApiResponse<Store>),
        (status = 400, description = "Owner not found or not a store owner"),
        (status = 403, description = "Forbidden"),
        (status = 409, description = "Store email already registered")
    ),
    security(("bearer_auth" = [])),
    tag = "Stores"
)]
pub async fn create_store(
    State(state): State<AppState>,
    user: AuthUser,
    ApiJson(payload): ApiJson<CreateStoreRequest>,
) -> AppResult<(StatusCode, Json<ApiResponse<Store>>)> {
    let resp = store_service::create_store(&state, &user, payload).await?;
    Ok((StatusCode::CREATED, Json(resp)))
}

#[utoipa::path(
    get,
    path = "/api/v1/store/list",
    params(
        ("name" = Option<String>, Query, description = "Exact name"),
        ("email" = Option<String>, Query, description = "Exact email"),
        ("address" = Option<String>, Query, description = "Exact address"),
        ("sortBy" = Option<String>, Query, description = "name, email, address, rating, createdAt"),
        ("order" = Option<String>, Query, description = "asc, desc")
    ),
    responses(
        (status = 200, description = "Stores with owner summary", body = ApiResponse<StoreListing>)
    ),
    tag = "Stores"
)]
pub async fn list_stores(
    State(state): State<AppState>,
    ApiQuery(query): ApiQuery<StoreListQuery>,
) -> AppResult<Json<ApiResponse<StoreListing>>> {
    let resp = store_service::list_stores(&state, query).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    get,
    path = "/api/v1/store/{id}/ratings",
    params(
        ("id" = i32, Path, description = "Store ID")
    ),
    responses(
        (status = 200, description = "Ratings of a store and its average", body = ApiResponse<StoreRatings>),
        (status = 404, description = "Store not found")
    ),
    tag = "Stores"
)]
pub async fn store_ratings(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<i32>,
) -> AppResult<Json<ApiResponse<StoreRatings>>> {
    let resp = store_service::list_store_ratings(&state, id).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    get,
    path = "/api/v1/store/ratings/stream",
    responses(
        (status = 200, description = "Server-sent `rating:update` events", content_type = "text/event-stream", body = String)
    ),
    tag = "Stores"
)]
pub async fn rating_stream(
    State(state): State<AppState>,
) -> Sse<impl Stream<Item = Result<Event, Infallible>>> {
    // Dropping the response (client gone) drops the subscription, which
    // unregisters it.
    let stream = state.events.subscribe().filter_map(|event| {
        match Event::default().json_data(&event) {
            Ok(frame) => Some(Ok(frame)),
            Err(err) => {
                tracing::warn!(error = %err, "failed to encode event");
                None
            }
        }
    });

    Sse::new(stream).keep_alive(KeepAlive::default())
}
