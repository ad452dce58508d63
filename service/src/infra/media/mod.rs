//! [`MediaStore`]-related implementations.

pub mod cloudinary;

use derive_more::{AsRef, Display, Error as StdError, From};

use crate::domain::listing::ImageUrl;

pub use self::cloudinary::Cloudinary;

/// Media storage operation.
pub use common::Handler as MediaStore;

/// ID of an asset in a [`MediaStore`].
#[derive(AsRef, Clone, Debug, Display, Eq, Hash, PartialEq)]
#[as_ref(forward)]
pub struct PublicId(String);

impl PublicId {
    /// Returns the string form of this [`PublicId`].
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Extracts a [`PublicId`] out of the provided delivery [`ImageUrl`].
    ///
    /// The ID is the last path segment of the URL with its extension (if
    /// any) stripped. Returns [`None`] for URLs with no path segments.
    #[must_use]
    pub fn from_url(url: &ImageUrl) -> Option<Self> {
        let url: &str = url.as_ref();
        let path = url.split_once("://").map_or(url, |(_scheme, rest)| rest);
        let (_, segment) = path.trim_end_matches('/').rsplit_once('/')?;
        let id = segment
            .rsplit_once('.')
            .map_or(segment, |(stem, _ext)| stem);
        (!id.is_empty()).then(|| Self(id.to_owned()))
    }
}

/// [`MediaStore`] error.
#[derive(Debug, Display, From, StdError)]
pub enum Error {
    /// [`Cloudinary`] error.
    Cloudinary(cloudinary::Error),
}

#[cfg(test)]
mod spec {
    use crate::domain::listing::ImageUrl;

    use super::PublicId;

    fn url(s: &str) -> ImageUrl {
        ImageUrl::new(s).expect("valid `ImageUrl`")
    }

    #[test]
    fn extracts_last_segment_without_extension() {
        let id = PublicId::from_url(&url(
            "https://res.cloudinary.com/demo/image/upload/v42/cars/abc123.jpg",
        ));
        assert_eq!(id.as_ref().map(PublicId::as_str), Some("abc123"));
    }

    #[test]
    fn keeps_extensionless_segment() {
        let id = PublicId::from_url(&url(
            "https://res.cloudinary.com/demo/image/upload/abc123",
        ));
        assert_eq!(id.as_ref().map(PublicId::as_str), Some("abc123"));
    }

    #[test]
    fn strips_only_the_last_extension() {
        let id = PublicId::from_url(&url(
            "https://res.cloudinary.com/demo/image/upload/car.front.png",
        ));
        assert_eq!(id.as_ref().map(PublicId::as_str), Some("car.front"));
    }

    #[test]
    fn rejects_urls_without_path_segments() {
        assert_eq!(PublicId::from_url(&url("https://res.cloudinary.com")), None);
    }
}
