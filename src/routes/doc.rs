use utoipa::{
    Modify, OpenApi,
    openapi::{
        self,
        OpenApi as OpenApiSpec,
        security::{HttpAuthScheme, HttpBuilder, SecurityScheme},
    },
};
use utoipa_scalar::{Scalar, Servable};

use crate::{
    dto::{admin, auth as auth_dto, ratings as rating_dto, stores as store_dto},
    entity::Role,
    error::FieldError,
    events::BroadcastEvent,
    models::{Account, Rating, Store},
    response::{ApiResponse, Meta},
    routes::{admin as admin_routes, auth, health, params, ratings, stores},
};

struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut openapi::OpenApi) {
        let components = openapi.components.get_or_insert_with(Default::default);
        components.add_security_scheme(
            "bearer_auth",
            SecurityScheme::Http(
                HttpBuilder::new()
                    .scheme(HttpAuthScheme::Bearer)
                    .bearer_format("JWT")
                    .build(),
            ),
        );
    }
}

#[derive(OpenApi)]
#[openapi(
    paths(
        health::health_check,
        auth::register,
        auth::login,
        auth::logout,
        auth::update_password,
        auth::get_user_by_id,
        auth::get_user_by_email,
        auth::update_profile,
        admin_routes::dashboard,
        admin_routes::list_users,
        admin_routes::list_stores,
        admin_routes::user_details,
        admin_routes::register_user,
        admin_routes::add_store,
        stores::create_store,
        stores::list_stores,
        stores::store_ratings,
        stores::rating_stream,
        ratings::submit_rating,
        ratings::list_user_ratings,
        ratings::get_user_rating,
        ratings::get_store_rating
    ),
    components(
        schemas(
            Account,
            Store,
            Rating,
            Role,
            Meta,
            FieldError,
            BroadcastEvent,
            auth_dto::RegisterRequest,
            auth_dto::LoginRequest,
            auth_dto::LoginResponse,
            auth_dto::UpdatePasswordRequest,
            auth_dto::UpdateProfileRequest,
            admin::DashboardStats,
            admin::AdminRegisterRequest,
            admin::AddStoreRequest,
            admin::StoreWithNewOwner,
            admin::UserList,
            admin::StoreList,
            admin::AdminStoreEntry,
            admin::UserDetails,
            admin::OwnerStoreRating,
            store_dto::CreateStoreRequest,
            store_dto::StoreListing,
            store_dto::StoreWithOwner,
            store_dto::StoreOwnerSummary,
            store_dto::StoreRatings,
            store_dto::StoreRatingEntry,
            rating_dto::SubmitRatingRequest,
            rating_dto::RatingSubmission,
            rating_dto::UserRatings,
            rating_dto::UserRatingLookup,
            rating_dto::StoreAverage,
            params::UserListQuery,
            params::StoreListQuery,
            params::SortOrder,
            params::UserSortBy,
            params::StoreSortBy,
            ApiResponse<Account>,
            ApiResponse<Store>,
            ApiResponse<rating_dto::RatingSubmission>,
            ApiResponse<admin::DashboardStats>
        )
    ),
    modifiers(&SecurityAddon),
    tags(
        (name = "Health", description = "Health check endpoint"),
        (name = "Auth", description = "Registration, login and account endpoints"),
        (name = "Admin", description = "Admin dashboard endpoints"),
        (name = "Stores", description = "Store endpoints and the rating event stream"),
        (name = "Ratings", description = "Rating endpoints"),
    )
)]
pub struct ApiDoc;

pub fn scalar_docs() -> Scalar<OpenApiSpec> {
    Scalar::with_url("/docs", ApiDoc::openapi())
}
