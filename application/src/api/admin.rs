//! Admin panel handlers.
//!
//! Every handler except [`login()`] requires an [`AdminSession`].

use axum::{extract::Path, http::StatusCode, Extension, Json};
use axum_extra::extract::cookie::CookieJar;
use serde::{Deserialize, Serialize};
use service::{
    command::{AuthorizeAdmin, CreateListing, DeleteListing},
    domain::listing,
    query, Command as _,
};

use crate::{
    api::vehicles,
    define_error,
    session::{self, AdminSession},
    AsError, Error, Service,
};

use super::{CreateVehicleRequest, UpdateVehicleRequest, Vehicle};

/// Request body of the [`login()`] handler.
#[derive(Clone, Debug, Deserialize)]
pub struct LoginRequest {
    /// Provided admin login.
    pub login: String,

    /// Provided admin password.
    pub password: String,
}

/// `POST /api/admin/login`
///
/// Establishes an admin session by setting the session cookie, provided
/// the credentials are correct.
pub async fn login(
    Extension(service): Extension<Service>,
    Extension(settings): Extension<session::Settings>,
    jar: CookieJar,
    Json(req): Json<LoginRequest>,
) -> Result<(CookieJar, StatusCode), Error> {
    let LoginRequest { login, password } = req;

    service
        .execute(AuthorizeAdmin {
            login,
            password: password.into(),
        })
        .await
        .map_err(AsError::into_error)?;

    Ok((jar.add(settings.cookie()), StatusCode::NO_CONTENT))
}

/// `POST /api/admin/logout`
///
/// Drops the admin session by expiring the session cookie.
pub async fn logout(
    Extension(settings): Extension<session::Settings>,
    jar: CookieJar,
) -> (CookieJar, StatusCode) {
    (jar.add(settings.removal()), StatusCode::NO_CONTENT)
}

/// `POST /api/admin/vehicles`
///
/// Creates a new [`Vehicle`].
pub async fn create(
    _: AdminSession,
    Extension(service): Extension<Service>,
    Json(req): Json<CreateVehicleRequest>,
) -> Result<(StatusCode, Json<Vehicle>), Error> {
    let cmd = CreateListing::try_from(req)?;
    let listing = service
        .execute(cmd)
        .await
        .map_err(AsError::into_error)?;

    Ok((StatusCode::CREATED, Json(Vehicle::from(listing))))
}

/// `GET /api/admin/vehicles/:id`
///
/// Returns a single [`Vehicle`] by its ID, for the admin panel edit form.
pub async fn show(
    _: AdminSession,
    Extension(service): Extension<Service>,
    Path(id): Path<String>,
) -> Result<Json<Vehicle>, Error> {
    let id = parse_id(&id)?;
    service
        .execute(query::listing::ById::by(id))
        .await
        .map_err(AsError::into_error)?
        .map(|listing| Json(Vehicle::from(listing)))
        .ok_or_else(|| vehicles::LookupError::NotFound.into())
}

/// `PUT /api/admin/vehicles/:id`
///
/// Updates the [`Vehicle`] with the provided ID.
pub async fn update(
    _: AdminSession,
    Extension(service): Extension<Service>,
    Path(id): Path<String>,
    Json(req): Json<UpdateVehicleRequest>,
) -> Result<Json<Vehicle>, Error> {
    let cmd = req.into_command(parse_id(&id)?)?;
    let listing = service
        .execute(cmd)
        .await
        .map_err(AsError::into_error)?;

    Ok(Json(Vehicle::from(listing)))
}

/// Response of the [`delete()`] handler.
#[derive(Clone, Copy, Debug, Serialize)]
pub struct DeleteResponse {
    /// Always `true`: errors are reported as error bodies instead.
    pub success: bool,
}

/// `DELETE /api/admin/vehicles/:id`
///
/// Deletes the [`Vehicle`] with the provided ID, destroying its media
/// assets along the way.
pub async fn delete(
    _: AdminSession,
    Extension(service): Extension<Service>,
    Path(id): Path<String>,
) -> Result<Json<DeleteResponse>, Error> {
    let id = parse_id(&id)?;
    _ = service
        .execute(DeleteListing(id))
        .await
        .map_err(AsError::into_error)?;

    Ok(Json(DeleteResponse { success: true }))
}

/// Parses a raw path segment into a [`listing::Id`].
///
/// A syntactically malformed identifier is a `400 Bad Request`, kept
/// distinct from the `404 Not Found` of an absent [`Vehicle`].
fn parse_id(raw: &str) -> Result<listing::Id, Error> {
    raw.parse().map_err(|_| IdentifierError::Malformed.into())
}

define_error! {
    enum IdentifierError {
        #[code = "INVALID_IDENTIFIER"]
        #[status = BAD_REQUEST]
        #[message = "Malformed vehicle identifier"]
        Malformed,
    }
}
