//! [`Command`] for updating an existing [`Listing`].

use common::{
    operations::{By, Select, Update},
    DateTime,
};
use derive_more::{Display, Error, From};
use tracerr::Traced;

#[cfg(doc)]
use crate::domain::listing::{ImageUrl, Model, Name, Slug};
use crate::{
    command::CreateListing,
    domain::{listing, Listing},
    infra::{database, Database},
    Service,
};

use super::Command;

/// [`Command`] for updating an existing [`Listing`].
///
/// Every [`None`] field keeps its current value. The [`Slug`] is derived
/// anew whenever any of [`Name`], [`Model`] or the registration year is
/// provided.
#[derive(Clone, Debug, Default)]
pub struct UpdateListing {
    /// ID of the [`Listing`] being updated.
    pub id: listing::Id,

    /// New [`Name`], if changed.
    pub name: Option<listing::Name>,

    /// New [`Model`], if changed.
    pub model: Option<listing::Model>,

    /// New company, if changed.
    pub company: Option<listing::Company>,

    /// New price, if changed.
    pub price: Option<listing::Price>,

    /// New fuel type, if changed.
    pub fuel_type: Option<listing::FuelType>,

    /// New vehicle type, if changed.
    pub vehicle_type: Option<listing::VehicleType>,

    /// New transmission, if changed.
    pub transmission: Option<listing::Transmission>,

    /// New drive type, if changed.
    pub drive: Option<listing::Drive>,

    /// New ownership history, if changed.
    pub ownership: Option<listing::Ownership>,

    /// New exterior color, if changed.
    pub exterior_color: Option<listing::ExteriorColor>,

    /// New number of doors, if changed.
    pub door: Option<listing::DoorCount>,

    /// New number of seats, if changed.
    pub seating_capacity: Option<listing::SeatingCapacity>,

    /// New number of airbags, if changed.
    pub airbags: Option<listing::AirbagCount>,

    /// New engine power description, if changed.
    pub power: Option<listing::Power>,

    /// New engine torque description, if changed.
    pub torque: Option<listing::Torque>,

    /// New ground clearance description, if changed.
    pub ground_clearance: Option<listing::GroundClearance>,

    /// New entertainment system description, if changed.
    pub entertainment: Option<listing::Entertainment>,

    /// New free-text description, if changed.
    pub description: Option<listing::Description>,

    /// New feature descriptions, if changed. Replaces the current set
    /// wholesale.
    pub features: Option<Vec<listing::Feature>>,

    /// New registration year, if changed.
    pub registered_year: Option<listing::RegisteredYear>,

    /// New manufacturing year, if changed.
    pub manufacturing_year: Option<listing::ManufacturingYear>,

    /// New odometer reading, if changed.
    pub kilometers: Option<listing::Kilometers>,

    /// New registration state, if changed.
    pub registered_state: Option<listing::RegisteredState>,

    /// New [`ImageUrl`]s, if changed. Replaces the current set wholesale
    /// and must not be empty.
    pub images: Option<Vec<listing::ImageUrl>>,

    /// New homepage carousel promotion flag, if changed.
    pub featured: Option<bool>,

    /// New rent offering flag, if changed.
    pub is_for_rent: Option<bool>,
}

impl<Db, M> Command<UpdateListing> for Service<Db, M>
where
    Db: Database<
            Select<By<Option<Listing>, listing::Id>>,
            Ok = Option<Listing>,
            Err = Traced<database::Error>,
        > + Database<Update<Listing>, Ok = (), Err = Traced<database::Error>>,
{
    type Ok = Listing;
    type Err = Traced<ExecutionError>;

    async fn execute(
        &self,
        cmd: UpdateListing,
    ) -> Result<Self::Ok, Self::Err> {
        use ExecutionError as E;

        let UpdateListing {
            id,
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

        if images.as_ref().is_some_and(Vec::is_empty) {
            return Err(tracerr::new!(E::NoImages));
        }
        if let Some(year) = registered_year {
            let next_year = DateTime::now().year() + 1;
            if !(CreateListing::MIN_REGISTERED_YEAR..=next_year)
                .contains(&i32::from(year))
            {
                return Err(tracerr::new!(E::RegisteredYearOutOfRange(year)));
            }
        }

        let mut listing = self
            .database()
            .execute(Select(By::new(id)))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?
            .ok_or_else(|| E::NotExists(id))
            .map_err(tracerr::wrap!())?;

        // Resubmitting unchanged identity fields must not move the
        // `Listing` off an already assigned (possibly suffixed) `Slug`.
        let reslug = name.as_ref().is_some_and(|n| *n != listing.name)
            || model.as_ref().is_some_and(|m| *m != listing.model)
            || registered_year.is_some_and(|y| y != listing.registered_year);

        if let Some(name) = name {
            listing.name = name;
        }
        if let Some(model) = model {
            listing.model = model;
        }
        if let Some(company) = company {
            listing.company = company;
        }
        if let Some(price) = price {
            listing.price = price;
        }
        if let Some(fuel_type) = fuel_type {
            listing.fuel_type = fuel_type;
        }
        if let Some(vehicle_type) = vehicle_type {
            listing.vehicle_type = vehicle_type;
        }
        if let Some(transmission) = transmission {
            listing.transmission = Some(transmission);
        }
        if let Some(drive) = drive {
            listing.drive = Some(drive);
        }
        if let Some(ownership) = ownership {
            listing.ownership = ownership;
        }
        if let Some(exterior_color) = exterior_color {
            listing.exterior_color = Some(exterior_color);
        }
        if let Some(door) = door {
            listing.door = Some(door);
        }
        if let Some(seating_capacity) = seating_capacity {
            listing.seating_capacity = Some(seating_capacity);
        }
        if let Some(airbags) = airbags {
            listing.airbags = Some(airbags);
        }
        if let Some(power) = power {
            listing.power = Some(power);
        }
        if let Some(torque) = torque {
            listing.torque = Some(torque);
        }
        if let Some(ground_clearance) = ground_clearance {
            listing.ground_clearance = Some(ground_clearance);
        }
        if let Some(entertainment) = entertainment {
            listing.entertainment = Some(entertainment);
        }
        if let Some(description) = description {
            listing.description = Some(description);
        }
        if let Some(features) = features {
            listing.features = features;
        }
        if let Some(registered_year) = registered_year {
            listing.registered_year = registered_year;
        }
        if let Some(manufacturing_year) = manufacturing_year {
            listing.manufacturing_year = Some(manufacturing_year);
        }
        if let Some(kilometers) = kilometers {
            listing.kilometers = kilometers;
        }
        if let Some(registered_state) = registered_state {
            listing.registered_state = registered_state;
        }
        if let Some(images) = images {
            listing.images = images;
        }
        if let Some(featured) = featured {
            listing.featured = featured;
        }
        if let Some(is_for_rent) = is_for_rent {
            listing.is_for_rent = is_for_rent;
        }
        listing.updated_at = DateTime::now().coerce();

        let base_slug = listing::Slug::derive(
            &listing.name,
            &listing.model,
            listing.registered_year,
        );
        if !reslug || base_slug == listing.slug {
            self.database()
                .execute(Update(listing.clone()))
                .await
                .map_err(tracerr::map_from_and_wrap!(=> E))?;
            return Ok(listing);
        }

        // Same probing as on creation: the unique constraint arbitrates
        // which concurrent writer gets each candidate.
        for counter in 0..=CreateListing::MAX_SLUG_ATTEMPTS {
            listing.slug = if counter == 0 {
                base_slug.clone()
            } else {
                base_slug.with_suffix(counter)
            };

            match self.database().execute(Update(listing.clone())).await {
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

/// Error of [`UpdateListing`] [`Command`] execution.
#[derive(Debug, Display, Error, From)]
pub enum ExecutionError {
    /// [`Database`] error.
    #[display("`Database` operation failed: {_0}")]
    Db(database::Error),

    /// Updated [`Listing`] would have no images.
    #[display("`Listing` must have at least one image")]
    NoImages,

    /// [`Listing`] with the provided ID does not exist.
    #[display("`Listing(id: {_0})` does not exist")]
    #[from(ignore)]
    NotExists(#[error(not(source))] listing::Id),

    /// Registration year is out of the accepted range.
    #[display("`Listing` registration year `{_0}` is out of range")]
    #[from(ignore)]
    RegisteredYearOutOfRange(#[error(not(source))] listing::RegisteredYear),

    /// Every probed [`Slug`] candidate is taken already.
    #[display("No free `Slug` candidate derived from `{_0}`")]
    #[from(ignore)]
    SlugsExhausted(#[error(not(source))] listing::Slug),
}

#[cfg(test)]
mod spec {
    use crate::{
        command::Command as _,
        domain::listing,
        testing::{self, MockDb, MockMedia},
    };

    use super::{ExecutionError, UpdateListing};

    #[tokio::test]
    async fn merges_only_provided_fields() {
        let db = MockDb::default();
        let service = testing::service_with(db.clone(), MockMedia::default());
        let stored = testing::listing("BMW X5", "X5", 2021);
        db.listings.lock().unwrap().push(stored.clone());

        let updated = service
            .execute(UpdateListing {
                id: stored.id,
                price: Some(1_900_000),
                featured: Some(true),
                ..UpdateListing::default()
            })
            .await
            .unwrap();

        assert_eq!(updated.price, 1_900_000);
        assert!(updated.featured);
        assert_eq!(updated.name, stored.name);
        assert_eq!(updated.slug, stored.slug);
        assert_eq!(db.all()[0].price, 1_900_000);
    }

    #[tokio::test]
    async fn regenerates_slug_on_rename() {
        let db = MockDb::default();
        let service = testing::service_with(db.clone(), MockMedia::default());
        let stored = testing::listing("BMW X5", "X5", 2021);
        db.listings.lock().unwrap().push(stored.clone());

        let updated = service
            .execute(UpdateListing {
                id: stored.id,
                name: Some(listing::Name::new("Audi Q7").unwrap()),
                model: Some(listing::Model::new("Q7").unwrap()),
                ..UpdateListing::default()
            })
            .await
            .unwrap();

        assert_eq!(updated.slug.to_string(), "audi-q7-2021");
    }

    #[tokio::test]
    async fn suffixes_regenerated_slug_on_collision() {
        let db = MockDb::default();
        let service = testing::service_with(db.clone(), MockMedia::default());
        let taken = testing::listing("Audi Q7", "Q7", 2021);
        let stored = testing::listing("BMW X5", "X5", 2021);
        db.listings.lock().unwrap().push(taken);
        db.listings.lock().unwrap().push(stored.clone());

        let updated = service
            .execute(UpdateListing {
                id: stored.id,
                name: Some(listing::Name::new("Audi Q7").unwrap()),
                model: Some(listing::Model::new("Q7").unwrap()),
                ..UpdateListing::default()
            })
            .await
            .unwrap();

        assert_eq!(updated.slug.to_string(), "audi-q7-2021_1");
    }

    #[tokio::test]
    async fn keeps_slug_when_rename_derives_the_same_one() {
        let db = MockDb::default();
        let service = testing::service_with(db.clone(), MockMedia::default());
        let stored = testing::listing("BMW X5", "X5", 2021);
        db.listings.lock().unwrap().push(stored.clone());

        let updated = service
            .execute(UpdateListing {
                id: stored.id,
                name: Some(listing::Name::new("BMW X5").unwrap()),
                ..UpdateListing::default()
            })
            .await
            .unwrap();

        assert_eq!(updated.slug, stored.slug);
    }

    #[tokio::test]
    async fn keeps_suffixed_slug_on_identity_neutral_update() {
        let db = MockDb::default();
        let service = testing::service_with(db.clone(), MockMedia::default());
        let mut stored = testing::listing("BMW X5", "X5", 2021);
        stored.slug = "bmw-x5-2021_1".parse().unwrap();
        db.listings.lock().unwrap().push(stored.clone());

        let updated = service
            .execute(UpdateListing {
                id: stored.id,
                name: Some(listing::Name::new("BMW X5").unwrap()),
                model: Some(listing::Model::new("X5").unwrap()),
                registered_year: Some(2021),
                ..UpdateListing::default()
            })
            .await
            .unwrap();

        assert_eq!(updated.slug.to_string(), "bmw-x5-2021_1");
        assert_eq!(db.all()[0].slug, updated.slug);
    }

    #[tokio::test]
    async fn reports_missing_listing() {
        let service = testing::service();

        let err = service
            .execute(UpdateListing {
                id: listing::Id::new(),
                ..UpdateListing::default()
            })
            .await
            .unwrap_err();

        assert!(matches!(err.as_ref(), ExecutionError::NotExists(_)));
    }

    #[tokio::test]
    async fn rejects_empty_images() {
        let db = MockDb::default();
        let service = testing::service_with(db.clone(), MockMedia::default());
        let stored = testing::listing("BMW X5", "X5", 2021);
        db.listings.lock().unwrap().push(stored.clone());

        let err = service
            .execute(UpdateListing {
                id: stored.id,
                images: Some(vec![]),
                ..UpdateListing::default()
            })
            .await
            .unwrap_err();

        assert!(matches!(err.as_ref(), ExecutionError::NoImages));
    }
}
