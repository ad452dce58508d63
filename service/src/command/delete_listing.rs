//! [`Command`] for deleting a [`Listing`].

use common::operations::{By, Delete, Select};
use derive_more::{Display, Error, From};
use tracerr::Traced;

use crate::{
    domain::{listing, Listing},
    infra::{
        database,
        media::{self, PublicId},
        Database, MediaStore,
    },
    Service,
};

use super::Command;

/// [`Command`] for deleting a [`Listing`] along with its stored images.
///
/// Image removal is best-effort: a failed or unparsable image never blocks
/// the [`Listing`] removal itself.
#[derive(Clone, Copy, Debug, From)]
pub struct DeleteListing(pub listing::Id);

impl<Db, M> Command<DeleteListing> for Service<Db, M>
where
    Db: Database<
            Select<By<Option<Listing>, listing::Id>>,
            Ok = Option<Listing>,
            Err = Traced<database::Error>,
        > + Database<Delete<listing::Id>, Ok = u64, Err = Traced<database::Error>>,
    M: MediaStore<Delete<PublicId>, Ok = (), Err = Traced<media::Error>>,
{
    type Ok = Listing;
    type Err = Traced<ExecutionError>;

    async fn execute(
        &self,
        DeleteListing(id): DeleteListing,
    ) -> Result<Self::Ok, Self::Err> {
        use ExecutionError as E;

        let listing = self
            .database()
            .execute(Select(By::new(id)))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?
            .ok_or_else(|| E::NotExists(id))
            .map_err(tracerr::wrap!())?;

        for image in &listing.images {
            let Some(public_id) = PublicId::from_url(image) else {
                tracing::warn!(url = %image, "cannot extract media ID");
                continue;
            };
            if let Err(e) =
                self.media().execute(Delete(public_id.clone())).await
            {
                tracing::warn!(
                    id = %public_id,
                    error = %e,
                    "failed to destroy media asset",
                );
            }
        }

        let deleted = self
            .database()
            .execute(Delete(id))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?;
        if deleted == 0 {
            // Lost the race to a concurrent deletion.
            return Err(tracerr::new!(E::NotExists(id)));
        }

        Ok(listing)
    }
}

/// Error of [`DeleteListing`] [`Command`] execution.
#[derive(Debug, Display, Error, From)]
pub enum ExecutionError {
    /// [`Database`] error.
    #[display("`Database` operation failed: {_0}")]
    Db(database::Error),

    /// [`Listing`] with the provided ID does not exist.
    #[display("`Listing(id: {_0})` does not exist")]
    #[from(ignore)]
    NotExists(#[error(not(source))] listing::Id),
}

#[cfg(test)]
mod spec {
    use crate::{
        command::Command as _,
        domain::listing,
        infra::media::PublicId,
        testing::{self, MockDb, MockMedia},
    };

    use super::{DeleteListing, ExecutionError};

    #[tokio::test]
    async fn destroys_media_and_removes_row() {
        let db = MockDb::default();
        let media = MockMedia::default();
        let service = testing::service_with(db.clone(), media.clone());
        let mut stored = testing::listing("BMW X5", "X5", 2021);
        stored.images = vec![
            "https://res.cloudinary.com/demo/image/upload/front.jpg"
                .parse()
                .unwrap(),
            "https://res.cloudinary.com/demo/image/upload/rear.png"
                .parse()
                .unwrap(),
        ];
        db.listings.lock().unwrap().push(stored.clone());

        let deleted = service.execute(DeleteListing(stored.id)).await.unwrap();

        assert_eq!(deleted.id, stored.id);
        assert!(db.all().is_empty());
        let destroyed = media.destroyed.lock().unwrap();
        assert_eq!(
            destroyed.iter().map(PublicId::as_str).collect::<Vec<_>>(),
            ["front", "rear"],
        );
    }

    #[tokio::test]
    async fn removes_row_despite_media_failure() {
        let db = MockDb::default();
        let media = MockMedia {
            failing: true,
            ..MockMedia::default()
        };
        let service = testing::service_with(db.clone(), media);
        let stored = testing::listing("BMW X5", "X5", 2021);
        db.listings.lock().unwrap().push(stored.clone());

        service.execute(DeleteListing(stored.id)).await.unwrap();

        assert!(db.all().is_empty());
    }

    #[tokio::test]
    async fn reports_missing_listing() {
        let service = testing::service();

        let err = service
            .execute(DeleteListing(listing::Id::new()))
            .await
            .unwrap_err();

        assert!(matches!(err.as_ref(), ExecutionError::NotExists(_)));
    }
}
