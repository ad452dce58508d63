//! [`Query`] collection related to the multiple [`Listing`]s.

use common::operations::By;

use crate::{domain::Listing, read};
#[cfg(doc)]
use crate::Query;

use super::DatabaseQuery;

/// Queries a list of [`Listing`]s matching a [`read::listing::Filter`],
/// ordered by creation time (newest first).
pub type List =
    DatabaseQuery<By<Vec<Listing>, read::listing::Filter>>;

/// Queries total count of [`Listing`]s matching a [`read::listing::Filter`].
pub type TotalCount =
    DatabaseQuery<By<read::listing::TotalCount, read::listing::Filter>>;

/// Queries distinct values (with counts) of a [`read::listing::FacetField`]
/// over all [`Listing`]s.
pub type Facets =
    DatabaseQuery<By<read::listing::Facets, read::listing::FacetField>>;

#[cfg(test)]
mod spec {
    use std::{collections::HashMap, time::Duration};

    use crate::{
        domain::listing,
        query::Query as _,
        read,
        testing::{self, MockDb, MockMedia},
    };

    use super::{List, TotalCount};

    fn params(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| ((*k).to_owned(), (*v).to_owned()))
            .collect()
    }

    #[tokio::test]
    async fn combines_filters_conjunctively() {
        let db = MockDb::default();
        let service = testing::service_with(db.clone(), MockMedia::default());

        let mut cheap_diesel = testing::listing("BMW X5", "X5", 2021);
        cheap_diesel.fuel_type = listing::FuelType::Diesel;
        cheap_diesel.price = 900_000;
        let mut pricey_diesel = testing::listing("BMW X7", "X7", 2022);
        pricey_diesel.fuel_type = listing::FuelType::Diesel;
        pricey_diesel.price = 5_000_000;
        let mut petrol = testing::listing("BMW 3 Series", "3 Series", 2020);
        petrol.price = 950_000;
        {
            let mut listings = db.listings.lock().unwrap();
            listings.push(cheap_diesel.clone());
            listings.push(pricey_diesel);
            listings.push(petrol);
        }

        let filter = read::listing::Filter::from_params(&params(&[
            ("fuelType", "Diesel"),
            ("priceMax", "1000000"),
        ]));
        let found = service.execute(List::by(filter)).await.unwrap();

        assert_eq!(found.len(), 1);
        assert_eq!(found[0].id, cheap_diesel.id);
    }

    #[tokio::test]
    async fn orders_newest_first_and_limits() {
        let db = MockDb::default();
        let service = testing::service_with(db.clone(), MockMedia::default());

        let old = testing::listing("BMW X5", "X5", 2021);
        let mut mid = testing::listing("BMW X6", "X6", 2021);
        mid.created_at = old.created_at + Duration::from_secs(10);
        let mut new = testing::listing("BMW X7", "X7", 2021);
        new.created_at = old.created_at + Duration::from_secs(20);
        {
            let mut listings = db.listings.lock().unwrap();
            listings.push(old.clone());
            listings.push(new.clone());
            listings.push(mid.clone());
        }

        let found = service
            .execute(List::by(read::listing::Filter {
                limit: Some(2),
                ..read::listing::Filter::default()
            }))
            .await
            .unwrap();

        assert_eq!(
            found.iter().map(|l| l.id).collect::<Vec<_>>(),
            [new.id, mid.id],
        );
    }

    #[tokio::test]
    async fn partitions_rentals() {
        let db = MockDb::default();
        let service = testing::service_with(db.clone(), MockMedia::default());

        let sale = testing::listing("BMW X5", "X5", 2021);
        let mut rental = testing::listing("BMW X6", "X6", 2021);
        rental.is_for_rent = true;
        {
            let mut listings = db.listings.lock().unwrap();
            listings.push(sale);
            listings.push(rental.clone());
        }

        let found = service
            .execute(List::by(
                read::listing::Filter::default().only_for_rent(),
            ))
            .await
            .unwrap();

        assert_eq!(found.iter().map(|l| l.id).collect::<Vec<_>>(), [rental.id]);
    }

    #[tokio::test]
    async fn counts_matching_listings() {
        let db = MockDb::default();
        let service = testing::service_with(db.clone(), MockMedia::default());

        let mut featured = testing::listing("BMW X5", "X5", 2021);
        featured.featured = true;
        {
            let mut listings = db.listings.lock().unwrap();
            listings.push(featured);
            listings.push(testing::listing("BMW X6", "X6", 2021));
        }

        let total = service
            .execute(TotalCount::by(read::listing::Filter::from_params(
                &params(&[("featured", "true")]),
            )))
            .await
            .unwrap();

        assert_eq!(i64::from(total), 1);
    }

    #[tokio::test]
    async fn lifecycle_scenario() {
        use crate::{
            command::{Command as _, CreateListing, DeleteListing},
            query::listing::BySlug,
        };

        let db = MockDb::default();
        let service = testing::service_with(db.clone(), MockMedia::default());

        fn cmd(name: &str, model: &str, featured: bool) -> CreateListing {
            CreateListing {
                name: listing::Name::new(name).unwrap(),
                model: listing::Model::new(model).unwrap(),
                company: listing::Company::new("BMW").unwrap(),
                price: 2_500_000,
                fuel_type: listing::FuelType::Petrol,
                vehicle_type: listing::VehicleType::Suv,
                transmission: None,
                drive: None,
                ownership: listing::Ownership::First,
                exterior_color: None,
                door: None,
                seating_capacity: None,
                airbags: None,
                power: None,
                torque: None,
                ground_clearance: None,
                entertainment: None,
                description: None,
                features: vec![],
                registered_year: 2021,
                manufacturing_year: None,
                kilometers: 30_000,
                registered_state: listing::RegisteredState::new("KA")
                    .unwrap(),
                images: vec![
                    "https://res.cloudinary.com/demo/image/upload/a.jpg"
                        .parse()
                        .unwrap(),
                ],
                featured,
                is_for_rent: false,
            }
        }

        let x5 = service.execute(cmd("BMW X5", "X5", true)).await.unwrap();
        let _x6 = service.execute(cmd("BMW X6", "X6", false)).await.unwrap();

        let featured = service
            .execute(List::by(read::listing::Filter::from_params(&params(&[
                ("featured", "true"),
            ]))))
            .await
            .unwrap();
        assert_eq!(
            featured.iter().map(|l| l.id).collect::<Vec<_>>(),
            [x5.id],
        );

        let resolved = service
            .execute(BySlug::by(x5.slug.clone()))
            .await
            .unwrap()
            .unwrap();
        assert_eq!(resolved.id, x5.id);

        service.execute(DeleteListing(x5.id)).await.unwrap();

        let remaining = service
            .execute(List::by(read::listing::Filter::default()))
            .await
            .unwrap();
        assert!(remaining.iter().all(|l| l.id != x5.id));
        assert_eq!(remaining.len(), 1);
    }
}
