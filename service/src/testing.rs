//! In-memory test doubles of the infrastructure layer.

use std::sync::{Arc, Mutex};

use common::{
    operations::{By, Delete, Insert, Select, Update},
    DateTime, Handler,
};
use derive_more::{Display, Error};
use tracerr::Traced;

use crate::{
    domain::{listing, Listing},
    infra::{
        database,
        media::{self, cloudinary, PublicId},
    },
    read, Config, Service,
};

/// Error of a mocked operation.
#[derive(Clone, Debug, Display, Error)]
pub(crate) enum MockError {
    /// Unique violation of the named constraint.
    #[display("unique violation of `{_0}`")]
    UniqueViolation(#[error(not(source))] &'static str),
}

impl MockError {
    /// Checks if the error is a unique violation of the specified constraint.
    pub(crate) fn is_unique_violation(
        &self,
        constraint: Option<&str>,
    ) -> bool {
        match self {
            Self::UniqueViolation(c) => {
                constraint.map_or(true, |want| want == *c)
            }
        }
    }
}

/// In-memory stand-in for the Postgres database.
#[derive(Clone, Debug, Default)]
pub(crate) struct MockDb {
    /// Stored [`Listing`]s.
    pub(crate) listings: Arc<Mutex<Vec<Listing>>>,
}

impl MockDb {
    /// Returns all the stored [`Listing`]s.
    pub(crate) fn all(&self) -> Vec<Listing> {
        self.listings.lock().expect("unpoisoned").clone()
    }
}

/// Checks whether the provided [`Listing`] matches the [`Filter`].
///
/// [`Filter`]: read::listing::Filter
fn matches(filter: &read::listing::Filter, l: &Listing) -> bool {
    filter.company.as_ref().map_or(true, |c| *c == l.company)
        && filter.fuel_type.map_or(true, |f| f == l.fuel_type)
        && filter.vehicle_type.map_or(true, |v| v == l.vehicle_type)
        && filter.featured.map_or(true, |f| f == l.featured)
        && filter.for_rent.map_or(true, |f| f == l.is_for_rent)
        && filter.price_min.map_or(true, |min| l.price >= min)
        && filter.price_max.map_or(true, |max| l.price <= max)
}

impl Handler<Insert<Listing>> for MockDb {
    type Ok = ();
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Insert(listing): Insert<Listing>,
    ) -> Result<Self::Ok, Self::Err> {
        let mut listings = self.listings.lock().expect("unpoisoned");
        if listings.iter().any(|l| l.slug == listing.slug) {
            return Err(tracerr::new!(database::Error::Mock(
                MockError::UniqueViolation("listings_slug_key"),
            )));
        }
        listings.push(listing);
        Ok(())
    }
}

impl Handler<Update<Listing>> for MockDb {
    type Ok = ();
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Update(listing): Update<Listing>,
    ) -> Result<Self::Ok, Self::Err> {
        let mut listings = self.listings.lock().expect("unpoisoned");
        if listings
            .iter()
            .any(|l| l.slug == listing.slug && l.id != listing.id)
        {
            return Err(tracerr::new!(database::Error::Mock(
                MockError::UniqueViolation("listings_slug_key"),
            )));
        }
        if let Some(stored) =
            listings.iter_mut().find(|l| l.id == listing.id)
        {
            *stored = listing;
        }
        Ok(())
    }
}

impl Handler<Delete<listing::Id>> for MockDb {
    type Ok = u64;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Delete(id): Delete<listing::Id>,
    ) -> Result<Self::Ok, Self::Err> {
        let mut listings = self.listings.lock().expect("unpoisoned");
        let before = listings.len();
        listings.retain(|l| l.id != id);
        Ok((before - listings.len()) as u64)
    }
}

impl Handler<Select<By<Option<Listing>, listing::Id>>> for MockDb {
    type Ok = Option<Listing>;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Select(by): Select<By<Option<Listing>, listing::Id>>,
    ) -> Result<Self::Ok, Self::Err> {
        let id = by.into_inner();
        Ok(self
            .listings
            .lock()
            .expect("unpoisoned")
            .iter()
            .find(|l| l.id == id)
            .cloned())
    }
}

impl Handler<Select<By<Option<Listing>, listing::Slug>>> for MockDb {
    type Ok = Option<Listing>;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Select(by): Select<By<Option<Listing>, listing::Slug>>,
    ) -> Result<Self::Ok, Self::Err> {
        let slug = by.into_inner();
        Ok(self
            .listings
            .lock()
            .expect("unpoisoned")
            .iter()
            .find(|l| l.slug == slug)
            .cloned())
    }
}

impl Handler<Select<By<Vec<Listing>, read::listing::Filter>>> for MockDb {
    type Ok = Vec<Listing>;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Select(by): Select<By<Vec<Listing>, read::listing::Filter>>,
    ) -> Result<Self::Ok, Self::Err> {
        let filter = by.into_inner();
        let mut matched = self
            .listings
            .lock()
            .expect("unpoisoned")
            .iter()
            .filter(|l| matches(&filter, l))
            .cloned()
            .collect::<Vec<_>>();
        matched.sort_by_key(|l| std::cmp::Reverse(l.created_at));
        if let Some(limit) = filter.limit {
            matched.truncate(limit as usize);
        }
        Ok(matched)
    }
}

impl Handler<Select<By<read::listing::TotalCount, read::listing::Filter>>>
    for MockDb
{
    type Ok = read::listing::TotalCount;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Select(by): Select<
            By<read::listing::TotalCount, read::listing::Filter>,
        >,
    ) -> Result<Self::Ok, Self::Err> {
        let filter = by.into_inner();
        let count = self
            .listings
            .lock()
            .expect("unpoisoned")
            .iter()
            .filter(|l| matches(&filter, l))
            .count();
        Ok(read::listing::TotalCount::from(count as i64))
    }
}

impl Handler<Select<By<read::listing::Facets, read::listing::FacetField>>>
    for MockDb
{
    type Ok = read::listing::Facets;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Select(by): Select<
            By<read::listing::Facets, read::listing::FacetField>,
        >,
    ) -> Result<Self::Ok, Self::Err> {
        use read::listing::FacetField;

        let field = by.into_inner();
        let mut counts = std::collections::HashMap::<String, i64>::new();
        for l in self.listings.lock().expect("unpoisoned").iter() {
            let value = match field {
                FacetField::Company => l.company.to_string(),
                FacetField::FuelType => l.fuel_type.to_string(),
                FacetField::VehicleType => l.vehicle_type.to_string(),
            };
            *counts.entry(value).or_default() += 1;
        }
        Ok(counts.into())
    }
}

/// Recording stand-in for the media storage.
#[derive(Clone, Debug, Default)]
pub(crate) struct MockMedia {
    /// [`PublicId`]s destroyed so far.
    pub(crate) destroyed: Arc<Mutex<Vec<PublicId>>>,

    /// Whether every destroy request should fail.
    pub(crate) failing: bool,
}

impl Handler<Delete<PublicId>> for MockMedia {
    type Ok = ();
    type Err = Traced<media::Error>;

    async fn execute(
        &self,
        Delete(id): Delete<PublicId>,
    ) -> Result<Self::Ok, Self::Err> {
        if self.failing {
            return Err(tracerr::new!(media::Error::Cloudinary(
                cloudinary::Error::UnexpectedResult("mocked failure".into()),
            )));
        }
        self.destroyed.lock().expect("unpoisoned").push(id);
        Ok(())
    }
}

/// Creates a [`Service`] over fresh mocks.
pub(crate) fn service() -> Service<MockDb, MockMedia> {
    service_with(MockDb::default(), MockMedia::default())
}

/// Creates a [`Service`] over the provided mocks.
pub(crate) fn service_with(
    db: MockDb,
    media: MockMedia,
) -> Service<MockDb, MockMedia> {
    Service::new(
        Config {
            admin_login: "admin".into(),
            admin_password: "hunter2".into(),
        },
        db,
        media,
    )
}

/// Creates a [`Listing`] fixture with the provided naming and harmless
/// defaults everywhere else.
pub(crate) fn listing(name: &str, model: &str, year: u16) -> Listing {
    let name = listing::Name::new(name).expect("valid `Name`");
    let model = listing::Model::new(model).expect("valid `Model`");
    let slug = listing::Slug::derive(&name, &model, year);
    let now = DateTime::now();
    Listing {
        id: listing::Id::new(),
        slug,
        name,
        model,
        company: listing::Company::new("BMW").expect("valid `Company`"),
        price: 2_500_000,
        fuel_type: listing::FuelType::Petrol,
        vehicle_type: listing::VehicleType::Sedan,
        transmission: Some(listing::Transmission::Automatic),
        drive: None,
        ownership: listing::Ownership::First,
        exterior_color: None,
        door: Some(4),
        seating_capacity: Some(5),
        airbags: None,
        power: None,
        torque: None,
        ground_clearance: None,
        entertainment: None,
        description: None,
        features: vec![],
        registered_year: year,
        manufacturing_year: None,
        kilometers: 30_000,
        registered_state: listing::RegisteredState::new("KA")
            .expect("valid `RegisteredState`"),
        images: vec!["https://res.cloudinary.com/demo/image/upload/a.jpg"
            .parse()
            .expect("valid `ImageUrl`")],
        featured: false,
        is_for_rent: false,
        created_at: now.coerce(),
        updated_at: now.coerce(),
    }
}
