//! Public vehicle catalog handlers.

use std::collections::HashMap;

use axum::{
    extract::{Path, Query},
    Extension, Json,
};
use serde::Serialize;
use service::{query, read, Query as _};

use crate::{define_error, AsError, Error, Service};

use super::Vehicle;

/// `GET /api/vehicles`
///
/// Returns [`Vehicle`]s matching the provided query parameters, newest
/// first, optionally re-sorted by the `sort` parameter.
pub async fn list(
    Extension(service): Extension<Service>,
    Query(params): Query<HashMap<String, String>>,
) -> Result<Json<Vec<Vehicle>>, Error> {
    let filter = read::listing::Filter::from_params(&params);
    let mut listings = service
        .execute(query::listings::List::by(filter))
        .await
        .map_err(AsError::into_error)?;

    if let Some(key) = params.get("sort").and_then(|s| s.parse().ok()) {
        read::listing::sort(&mut listings, key);
    }

    Ok(Json(listings.into_iter().map(Vehicle::from).collect()))
}

/// `GET /api/rentcars`
///
/// Returns rental [`Vehicle`]s matching the provided query parameters.
/// The rent restriction is always forced and the `featured` parameter is
/// not recognized here.
pub async fn rentals(
    Extension(service): Extension<Service>,
    Query(params): Query<HashMap<String, String>>,
) -> Result<Json<Vec<Vehicle>>, Error> {
    let filter = read::listing::Filter {
        featured: None,
        ..read::listing::Filter::from_params(&params)
    }
    .only_for_rent();
    let mut listings = service
        .execute(query::listings::List::by(filter))
        .await
        .map_err(AsError::into_error)?;

    if let Some(key) = params.get("sort").and_then(|s| s.parse().ok()) {
        read::listing::sort(&mut listings, key);
    }

    Ok(Json(listings.into_iter().map(Vehicle::from).collect()))
}

/// Response of the [`count()`] handler.
#[derive(Clone, Copy, Debug, Serialize)]
pub struct CountResponse {
    /// Total number of matched [`Vehicle`]s.
    pub count: i64,
}

/// `GET /api/vehicles/count`
///
/// Returns the total number of [`Vehicle`]s matching the provided query
/// parameters, ignoring any `limit`.
pub async fn count(
    Extension(service): Extension<Service>,
    Query(params): Query<HashMap<String, String>>,
) -> Result<Json<CountResponse>, Error> {
    let filter = read::listing::Filter::from_params(&params);
    let total = service
        .execute(query::listings::TotalCount::by(filter))
        .await
        .map_err(AsError::into_error)?;

    Ok(Json(CountResponse {
        count: total.into(),
    }))
}

/// `GET /api/vehicles/facets`
///
/// Returns distinct values (with counts) of the field named by the `field`
/// query parameter, for populating filter UI options.
pub async fn facets(
    Extension(service): Extension<Service>,
    Query(params): Query<HashMap<String, String>>,
) -> Result<Json<HashMap<String, i64>>, Error> {
    let field = match params.get("field").map(String::as_str) {
        Some("company") => read::listing::FacetField::Company,
        Some("fuelType") => read::listing::FacetField::FuelType,
        Some("vehicleType") => read::listing::FacetField::VehicleType,
        Some(_) | None => {
            return Err(FacetError::UnknownField.into());
        }
    };
    let facets = service
        .execute(query::listings::Facets::by(field))
        .await
        .map_err(AsError::into_error)?;

    Ok(Json(facets.into()))
}

/// `GET /api/vehicles/:segment`
///
/// Returns a single [`Vehicle`] addressed either by its slug or by its raw
/// ID.
pub async fn show(
    Extension(service): Extension<Service>,
    Path(segment): Path<String>,
) -> Result<Json<Vehicle>, Error> {
    service
        .execute(query::listing::BySlugOrId(segment))
        .await
        .map_err(AsError::into_error)?
        .map(|listing| Json(Vehicle::from(listing)))
        .ok_or_else(|| LookupError::NotFound.into())
}

define_error! {
    enum LookupError {
        #[code = "VEHICLE_NOT_FOUND"]
        #[status = NOT_FOUND]
        #[message = "Vehicle not found"]
        NotFound,
    }
}

define_error! {
    enum FacetError {
        #[code = "UNKNOWN_FACET_FIELD"]
        #[status = BAD_REQUEST]
        #[message = "Unknown facet field"]
        UnknownField,
    }
}
