//! REST API definitions.

pub mod admin;
pub mod vehicle;
pub mod vehicles;

use axum::{
    routing::{get, post},
    Router,
};

pub use self::vehicle::{
    CreateVehicleRequest, UpdateVehicleRequest, Vehicle,
};

/// Returns the [`Router`] of the REST API.
///
/// [`Service`] and [`session::Settings`] are expected to be provided as
/// [`Extension`]s.
///
/// [`Extension`]: axum::Extension
/// [`Service`]: crate::Service
/// [`session::Settings`]: crate::session::Settings
#[must_use]
pub fn router() -> Router {
    Router::new()
        .route("/api/vehicles", get(vehicles::list))
        .route("/api/vehicles/count", get(vehicles::count))
        .route("/api/vehicles/facets", get(vehicles::facets))
        .route("/api/vehicles/:segment", get(vehicles::show))
        .route("/api/rentcars", get(vehicles::rentals))
        .route("/api/admin/login", post(admin::login))
        .route("/api/admin/logout", post(admin::logout))
        .route("/api/admin/vehicles", post(admin::create))
        .route(
            "/api/admin/vehicles/:id",
            get(admin::show).put(admin::update).delete(admin::delete),
        )
}
