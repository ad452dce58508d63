//! [`Command`] for creating a new [`Listing`].

use common::{
    operations::Insert,
    DateTime,
};
use derive_more::{Display, Error, From};
use tracerr::Traced;

#[cfg(doc)]
use crate::domain::listing::{
    Company, FuelType, ImageUrl, Model, Name, Ownership, RegisteredState,
    Slug, VehicleType,
};
use crate::{
    domain::{listing, Listing},
    infra::{database, Database},
    Service,
};

use super::Command;

/// [`Command`] for creating a new [`Listing`].
#[derive(Clone, Debug)]
pub struct CreateListing {
    /// [`Name`] of a new [`Listing`].
    pub name: listing::Name,

    /// [`Model`] of a new [`Listing`].
    pub model: listing::Model,

    /// [`Company`] of a new [`Listing`].
    pub company: listing::Company,

    /// Price of a new [`Listing`].
    pub price: listing::Price,

    /// [`FuelType`] of a new [`Listing`].
    pub fuel_type: listing::FuelType,

    /// [`VehicleType`] of a new [`Listing`].
    pub vehicle_type: listing::VehicleType,

    /// Transmission of a new [`Listing`], if known.
    pub transmission: Option<listing::Transmission>,

    /// Drive type of a new [`Listing`], if known.
    pub drive: Option<listing::Drive>,

    /// [`Ownership`] history of a new [`Listing`].
    pub ownership: listing::Ownership,

    /// Exterior color of a new [`Listing`], if known.
    pub exterior_color: Option<listing::ExteriorColor>,

    /// Number of doors of a new [`Listing`], if known.
    pub door: Option<listing::DoorCount>,

    /// Number of seats of a new [`Listing`], if known.
    pub seating_capacity: Option<listing::SeatingCapacity>,

    /// Number of airbags of a new [`Listing`], if known.
    pub airbags: Option<listing::AirbagCount>,

    /// Engine power description of a new [`Listing`], if known.
    pub power: Option<listing::Power>,

    /// Engine torque description of a new [`Listing`], if known.
    pub torque: Option<listing::Torque>,

    /// Ground clearance description of a new [`Listing`], if known.
    pub ground_clearance: Option<listing::GroundClearance>,

    /// Entertainment system description of a new [`Listing`], if known.
    pub entertainment: Option<listing::Entertainment>,

    /// Free-text description of a new [`Listing`], if any.
    pub description: Option<listing::Description>,

    /// Feature descriptions of a new [`Listing`].
    pub features: Vec<listing::Feature>,

    /// Year the vehicle was registered.
    pub registered_year: listing::RegisteredYear,

    /// Year the vehicle was manufactured, if known.
    pub manufacturing_year: Option<listing::ManufacturingYear>,

    /// Odometer reading of the vehicle.
    pub kilometers: listing::Kilometers,

    /// [`RegisteredState`] of a new [`Listing`].
    pub registered_state: listing::RegisteredState,

    /// [`ImageUrl`]s of a new [`Listing`]. Must not be empty.
    pub images: Vec<listing::ImageUrl>,

    /// Indicator whether a new [`Listing`] is promoted to the homepage
    /// carousel.
    pub featured: bool,

    /// Indicator whether a new [`Listing`] is offered for rent.
    pub is_for_rent: bool,
}

impl CreateListing {
    /// Maximum number of [`Slug`] collision suffixes probed before giving
    /// up.
    pub const MAX_SLUG_ATTEMPTS: u32 = 10_000;

    /// Earliest acceptable registration year.
    pub const MIN_REGISTERED_YEAR: i32 = 1900;
}

impl<Db, M> Command<CreateListing> for Service<Db, M>
where
    Db: Database<Insert<Listing>, Ok = (), Err = Traced<database::Error>>,
{
    type Ok = Listing;
    type Err = Traced<ExecutionError>;

    async fn execute(
        &self,
        cmd: CreateListing,
    ) -> Result<Self::Ok, Self::Err> {
        use CreateListing as Cmd;
        use ExecutionError as E;

        let CreateListing {
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
        } = cmd;

        if images.is_empty() {
            return Err(tracerr::new!(E::NoImages));
        }
        let next_year = DateTime::now().year() + 1;
        if !(Cmd::MIN_REGISTERED_YEAR..=next_year)
            .contains(&i32::from(registered_year))
        {
            return Err(tracerr::new!(E::RegisteredYearOutOfRange(
                registered_year,
            )));
        }

        let base_slug = listing::Slug::derive(&name, &model, registered_year);

        let now = DateTime::now();
        let mut listing = Listing {
            id: listing::Id::new(),
            slug: base_slug.clone(),
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
            created_at: now.coerce(),
            updated_at: now.coerce(),
        };

        // The `listings_slug_key` constraint is the single arbiter of slug
        // uniqueness: probing is just retrying the insert with the next
        // suffixed candidate, so concurrent creations cannot both win the
        // same slug.
        for counter in 0..=Cmd::MAX_SLUG_ATTEMPTS {
            listing.slug = if counter == 0 {
                base_slug.clone()
            } else {
                base_slug.with_suffix(counter)
            };

            match self.database().execute(Insert(listing.clone())).await {
                Ok(()) => return Ok(listing),
                Err(e)
                    if e.as_ref()
                        .is_unique_violation(Some("listings_slug_key")) =>
                {
                    continue;
                }
                Err(e) => {
                    return Err(e).map_err(tracerr::map_from_and_wrap!(=> E));
                }
            }
        }

        Err(tracerr::new!(E::SlugsExhausted(base_slug)))
    }
}

/// Error of [`CreateListing`] [`Command`] execution.
#[derive(Debug, Display, Error, From)]
pub enum ExecutionError {
    /// [`Database`] error.
    #[display("`Database` operation failed: {_0}")]
    Db(database::Error),

    /// New [`Listing`] provides no images.
    #[display("`Listing` must have at least one image")]
    NoImages,

    /// Registration year is out of the accepted range.
    #[display("`Listing` registration year `{_0}` is out of range")]
    #[from(ignore)]
    RegisteredYearOutOfRange(#[error(not(source))] listing::RegisteredYear),

    /// Every probed [`Slug`] candidate is taken already.
    #[display("No free `Slug` candidate derived from `{_0}`")]
    #[from(ignore)]
    SlugsExhausted(#[error(not(source))] listing::Slug),
}
