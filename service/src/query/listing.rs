//! [`Query`] collection related to a single [`Listing`].

use std::str::FromStr as _;

use common::operations::{By, Select};
use tracerr::Traced;

use crate::{
    domain::{listing, Listing},
    infra::{database, Database},
    Service,
};

use super::{DatabaseQuery, Query};

/// Queries a [`Listing`] by its [`listing::Id`].
pub type ById = DatabaseQuery<By<Option<Listing>, listing::Id>>;

/// Queries a [`Listing`] by its [`listing::Slug`].
pub type BySlug = DatabaseQuery<By<Option<Listing>, listing::Slug>>;

/// Queries a [`Listing`] by a raw storefront URL segment, resolving it
/// either as a [`listing::Slug`] or as a [`listing::Id`].
///
/// Old storefront links address [`Listing`]s by raw [`listing::Id`], so
/// lookup falls back to it whenever the segment parses as one and no
/// [`Listing`] carries it as a [`listing::Slug`].
#[derive(Clone, Debug)]
pub struct BySlugOrId(pub String);

impl<Db, M> Query<BySlugOrId> for Service<Db, M>
where
    Db: Database<
            Select<By<Option<Listing>, listing::Slug>>,
            Ok = Option<Listing>,
            Err = Traced<database::Error>,
        > + Database<
            Select<By<Option<Listing>, listing::Id>>,
            Ok = Option<Listing>,
            Err = Traced<database::Error>,
        >,
{
    type Ok = Option<Listing>;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        BySlugOrId(segment): BySlugOrId,
    ) -> Result<Self::Ok, Self::Err> {
        if let Some(slug) = listing::Slug::new(segment.as_str()) {
            let found = self
                .database()
                .execute(Select(By::new(slug)))
                .await
                .map_err(tracerr::wrap!())?;
            if found.is_some() {
                return Ok(found);
            }
        }

        let Ok(id) = listing::Id::from_str(&segment) else {
            return Ok(None);
        };
        self.database()
            .execute(Select(By::new(id)))
            .await
            .map_err(tracerr::wrap!())
    }
}

#[cfg(test)]
mod spec {
    use crate::{
        query::Query as _,
        testing::{self, MockDb, MockMedia},
    };

    use super::BySlugOrId;

    #[tokio::test]
    async fn resolves_by_slug() {
        let db = MockDb::default();
        let service = testing::service_with(db.clone(), MockMedia::default());
        let stored = testing::listing("BMW X5", "X5", 2021);
        db.listings.lock().unwrap().push(stored.clone());

        let found = service
            .execute(BySlugOrId("bmw-x5-2021".into()))
            .await
            .unwrap();

        assert_eq!(found.map(|l| l.id), Some(stored.id));
    }

    #[tokio::test]
    async fn falls_back_to_id() {
        let db = MockDb::default();
        let service = testing::service_with(db.clone(), MockMedia::default());
        let stored = testing::listing("BMW X5", "X5", 2021);
        db.listings.lock().unwrap().push(stored.clone());

        let found = service
            .execute(BySlugOrId(stored.id.to_string()))
            .await
            .unwrap();

        assert_eq!(found.map(|l| l.id), Some(stored.id));
    }

    #[tokio::test]
    async fn resolves_nothing_for_unknown_segment() {
        let service = testing::service();

        let found = service
            .execute(BySlugOrId("no-such-listing".into()))
            .await
            .unwrap();

        assert!(found.is_none());
    }
}
