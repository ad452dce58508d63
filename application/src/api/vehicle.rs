//! [`Vehicle`] API representations.

use serde::{Deserialize, Serialize};
use service::{
    command::{CreateListing, UpdateListing},
    domain::{listing, Listing},
};

use crate::Error;

/// Vehicle listing, as exposed by the API.
#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Vehicle {
    /// ID of this [`Vehicle`].
    pub id: listing::Id,

    /// URL-safe slug of this [`Vehicle`].
    pub slug: String,

    /// Display name of this [`Vehicle`].
    pub name: String,

    /// Model of this [`Vehicle`].
    pub model: String,

    /// Company (make) of this [`Vehicle`].
    pub company: String,

    /// Price in the smallest currency unit.
    pub price: listing::Price,

    /// Fuel powering this [`Vehicle`].
    pub fuel_type: listing::FuelType,

    /// Category of this [`Vehicle`].
    pub vehicle_type: listing::VehicleType,

    /// Transmission, if known.
    pub transmission: Option<listing::Transmission>,

    /// Drive type, if known.
    pub drive: Option<listing::Drive>,

    /// Ownership history.
    pub ownership: listing::Ownership,

    /// Exterior color, if known.
    pub exterior_color: Option<listing::ExteriorColor>,

    /// Number of doors, if known.
    pub door: Option<listing::DoorCount>,

    /// Number of seats, if known.
    pub seating_capacity: Option<listing::SeatingCapacity>,

    /// Number of airbags, if known.
    pub airbags: Option<listing::AirbagCount>,

    /// Engine power description, if known.
    pub power: Option<listing::Power>,

    /// Engine torque description, if known.
    pub torque: Option<listing::Torque>,

    /// Ground clearance description, if known.
    pub ground_clearance: Option<listing::GroundClearance>,

    /// Entertainment system description, if known.
    pub entertainment: Option<listing::Entertainment>,

    /// Free-text description, if any.
    pub description: Option<listing::Description>,

    /// Ordered list of feature descriptions.
    pub features: Vec<listing::Feature>,

    /// Year this [`Vehicle`] was registered.
    pub registered_year: listing::RegisteredYear,

    /// Year this [`Vehicle`] was manufactured, if known.
    pub manufacturing_year: Option<listing::ManufacturingYear>,

    /// Odometer reading.
    pub kilometers: listing::Kilometers,

    /// State this [`Vehicle`] is registered in.
    pub registered_state: String,

    /// Ordered list of image URLs.
    pub images: Vec<String>,

    /// Indicator whether this [`Vehicle`] is promoted to the homepage
    /// carousel.
    pub featured: bool,

    /// Indicator whether this [`Vehicle`] is offered for rent.
    pub is_for_rent: bool,

    /// [RFC 3339] timestamp of when this [`Vehicle`] was created.
    ///
    /// [RFC 3339]: https://datatracker.ietf.org/doc/html/rfc3339
    pub created_at: String,

    /// [RFC 3339] timestamp of when this [`Vehicle`] was updated last time.
    ///
    /// [RFC 3339]: https://datatracker.ietf.org/doc/html/rfc3339
    pub updated_at: String,
}

impl From<Listing> for Vehicle {
    fn from(listing: Listing) -> Self {
        let Listing {
            id,
            slug,
            name,
            model,
            company,
            price,
            fuel_type,
            vehicle_type,
            transmission,
            drive,
            ownership,
            exterior_color,
            door,
            seating_capacity,
            airbags,
            power,
            torque,
            ground_clearance,
            entertainment,
            description,
            features,
            registered_year,
            manufacturing_year,
            kilometers,
            registered_state,
            images,
            featured,
            is_for_rent,
            created_at,
            updated_at,
        } = listing;

        Self {
            id,
            slug: slug.to_string(),
            name: name.to_string(),
            model: model.to_string(),
            company: company.to_string(),
            price,
            fuel_type,
            vehicle_type,
            transmission,
            drive,
            ownership,
            exterior_color,
            door,
            seating_capacity,
            airbags,
            power,
            torque,
            ground_clearance,
            entertainment,
            description,
            features,
            registered_year,
            manufacturing_year,
            kilometers,
            registered_state: registered_state.to_string(),
            images: images.into_iter().map(|i| i.to_string()).collect(),
            featured,
            is_for_rent,
            created_at: created_at.to_rfc3339(),
            updated_at: updated_at.to_rfc3339(),
        }
    }
}

/// Request body for creating a new [`Vehicle`].
#[derive(Clone, Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateVehicleRequest {
    /// Display name of the new [`Vehicle`].
    pub name: String,

    /// Model of the new [`Vehicle`].
    pub model: String,

    /// Company (make) of the new [`Vehicle`].
    pub company: String,

    /// Price in the smallest currency unit.
    pub price: listing::Price,

    /// Fuel powering the new [`Vehicle`].
    pub fuel_type: listing::FuelType,

    /// Category of the new [`Vehicle`].
    pub vehicle_type: listing::VehicleType,

    /// Transmission, if known.
    pub transmission: Option<listing::Transmission>,

    /// Drive type, if known.
    pub drive: Option<listing::Drive>,

    /// Ownership history.
    pub ownership: listing::Ownership,

    /// Exterior color, if known.
    pub exterior_color: Option<String>,

    /// Number of doors, if known.
    pub door: Option<listing::DoorCount>,

    /// Number of seats, if known.
    pub seating_capacity: Option<listing::SeatingCapacity>,

    /// Number of airbags, if known.
    pub airbags: Option<listing::AirbagCount>,

    /// Engine power description, if known.
    pub power: Option<String>,

    /// Engine torque description, if known.
    pub torque: Option<String>,

    /// Ground clearance description, if known.
    pub ground_clearance: Option<String>,

    /// Entertainment system description, if known.
    pub entertainment: Option<String>,

    /// Free-text description, if any.
    pub description: Option<String>,

    /// Ordered list of feature descriptions.
    #[serde(default)]
    pub features: Vec<String>,

    /// Year the new [`Vehicle`] was registered.
    pub registered_year: listing::RegisteredYear,

    /// Year the new [`Vehicle`] was manufactured, if known.
    pub manufacturing_year: Option<listing::ManufacturingYear>,

    /// Odometer reading.
    pub kilometers: listing::Kilometers,

    /// State the new [`Vehicle`] is registered in.
    pub registered_state: String,

    /// Ordered list of image URLs. Must not be empty.
    pub images: Vec<String>,

    /// Indicator whether the new [`Vehicle`] is promoted to the homepage
    /// carousel.
    #[serde(default)]
    pub featured: bool,

    /// Indicator whether the new [`Vehicle`] is offered for rent.
    #[serde(default)]
    pub is_for_rent: bool,
}

impl TryFrom<CreateVehicleRequest> for CreateListing {
    type Error = Error;

    fn try_from(req: CreateVehicleRequest) -> Result<Self, Self::Error> {
        let CreateVehicleRequest {
            name,
            model,
            company,
            price,
            fuel_type,
            vehicle_type,
            transmission,
            drive,
            ownership,
            exterior_color,
            door,
            seating_capacity,
            airbags,
            power,
            torque,
            ground_clearance,
            entertainment,
            description,
            features,
            registered_year,
            manufacturing_year,
            kilometers,
            registered_state,
            images,
            featured,
            is_for_rent,
        } = req;

        Ok(Self {
            name: listing::Name::new(name).ok_or_else(|| invalid("name"))?,
            model: listing::Model::new(model)
                .ok_or_else(|| invalid("model"))?,
            company: listing::Company::new(company)
                .ok_or_else(|| invalid("company"))?,
            price,
            fuel_type,
            vehicle_type,
            transmission,
            drive,
            ownership,
            exterior_color,
            door,
            seating_capacity,
            airbags,
            power,
            torque,
            ground_clearance,
            entertainment,
            description,
            features,
            registered_year,
            manufacturing_year,
            kilometers,
            registered_state: listing::RegisteredState::new(registered_state)
                .ok_or_else(|| invalid("registeredState"))?,
            images: images
                .into_iter()
                .map(|url| {
                    listing::ImageUrl::new(url)
                        .ok_or_else(|| invalid("images"))
                })
                .collect::<Result<_, _>>()?,
            featured,
            is_for_rent,
        })
    }
}

/// Request body for updating an existing [`Vehicle`].
///
/// Every omitted field keeps its current value.
#[derive(Clone, Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateVehicleRequest {
    /// New display name, if changed.
    pub name: Option<String>,

    /// New model, if changed.
    pub model: Option<String>,

    /// New company (make), if changed.
    pub company: Option<String>,

    /// New price, if changed.
    pub price: Option<listing::Price>,

    /// New fuel type, if changed.
    pub fuel_type: Option<listing::FuelType>,

    /// New category, if changed.
    pub vehicle_type: Option<listing::VehicleType>,

    /// New transmission, if changed.
    pub transmission: Option<listing::Transmission>,

    /// New drive type, if changed.
    pub drive: Option<listing::Drive>,

    /// New ownership history, if changed.
    pub ownership: Option<listing::Ownership>,

    /// New exterior color, if changed.
    pub exterior_color: Option<String>,

    /// New number of doors, if changed.
    pub door: Option<listing::DoorCount>,

    /// New number of seats, if changed.
    pub seating_capacity: Option<listing::SeatingCapacity>,

    /// New number of airbags, if changed.
    pub airbags: Option<listing::AirbagCount>,

    /// New engine power description, if changed.
    pub power: Option<String>,

    /// New engine torque description, if changed.
    pub torque: Option<String>,

    /// New ground clearance description, if changed.
    pub ground_clearance: Option<String>,

    /// New entertainment system description, if changed.
    pub entertainment: Option<String>,

    /// New free-text description, if changed.
    pub description: Option<String>,

    /// New feature descriptions, if changed. Replaces the current set
    /// wholesale.
    pub features: Option<Vec<String>>,

    /// New registration year, if changed.
    pub registered_year: Option<listing::RegisteredYear>,

    /// New manufacturing year, if changed.
    pub manufacturing_year: Option<listing::ManufacturingYear>,

    /// New odometer reading, if changed.
    pub kilometers: Option<listing::Kilometers>,

    /// New registration state, if changed.
    pub registered_state: Option<String>,

    /// New image URLs, if changed. Replaces the current set wholesale and
    /// must not be empty.
    pub images: Option<Vec<String>>,

    /// New homepage carousel promotion flag, if changed.
    pub featured: Option<bool>,

    /// New rent offering flag, if changed.
    pub is_for_rent: Option<bool>,
}

impl UpdateVehicleRequest {
    /// Converts this request into an [`UpdateListing`] command targeting
    /// the [`Vehicle`] with the provided `id`.
    ///
    /// # Errors
    ///
    /// With a `400 Bad Request` [`Error`] if any provided field is
    /// malformed.
    pub fn into_command(
        self,
        id: listing::Id,
    ) -> Result<UpdateListing, Error> {
        let Self {
            name,
            model,
            company,
            price,
            fuel_type,
            vehicle_type,
            transmission,
            drive,
            ownership,
            exterior_color,
            door,
            seating_capacity,
            airbags,
            power,
            torque,
            ground_clearance,
            entertainment,
            description,
            features,
            registered_year,
            manufacturing_year,
            kilometers,
            registered_state,
            images,
            featured,
            is_for_rent,
        } = self;

        Ok(UpdateListing {
            id,
            name: name
                .map(|v| listing::Name::new(v).ok_or_else(|| invalid("name")))
                .transpose()?,
            model: model
                .map(|v| {
                    listing::Model::new(v).ok_or_else(|| invalid("model"))
                })
                .transpose()?,
            company: company
                .map(|v| {
                    listing::Company::new(v).ok_or_else(|| invalid("company"))
                })
                .transpose()?,
            price,
            fuel_type,
            vehicle_type,
            transmission,
            drive,
            ownership,
            exterior_color,
            door,
            seating_capacity,
            airbags,
            power,
            torque,
            ground_clearance,
            entertainment,
            description,
            features,
            registered_year,
            manufacturing_year,
            kilometers,
            registered_state: registered_state
                .map(|v| {
                    listing::RegisteredState::new(v)
                        .ok_or_else(|| invalid("registeredState"))
                })
                .transpose()?,
            images: images
                .map(|urls| {
                    urls.into_iter()
                        .map(|url| {
                            listing::ImageUrl::new(url)
                                .ok_or_else(|| invalid("images"))
                        })
                        .collect::<Result<_, _>>()
                })
                .transpose()?,
            featured,
            is_for_rent,
        })
    }
}

/// Creates a `400 Bad Request` [`Error`] about the provided malformed
/// `field`.
fn invalid(field: &str) -> Error {
    Error {
        code: "BAD_REQUEST",
        status_code: http::StatusCode::BAD_REQUEST,
        message: format!("Invalid `{field}` field"),
        backtrace: None,
    }
}
