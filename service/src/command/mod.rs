//! [`Command`] definition.

pub mod authorize_admin;
pub mod create_listing;
pub mod delete_listing;
pub mod update_listing;

/// [`Command`] of the [`Service`].
///
/// [`Service`]: crate::Service
pub use common::Handler as Command;

pub use self::{
    authorize_admin::AuthorizeAdmin, create_listing::CreateListing,
    delete_listing::DeleteListing, update_listing::UpdateListing,
};
