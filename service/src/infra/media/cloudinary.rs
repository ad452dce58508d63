//! [`Cloudinary`]-backed [`MediaStore`] implementation.

use std::time::{Duration, SystemTime, UNIX_EPOCH};

use common::operations::Delete;
use derive_more::{Display, Error as StdError, From};
use secrecy::{ExposeSecret as _, SecretString};
use serde::Deserialize;
use sha2::{Digest as _, Sha256};
use tracerr::Traced;

use crate::infra::media::{self, PublicId};

#[cfg(doc)]
use super::MediaStore;

/// Configuration of a [`Cloudinary`] client.
#[derive(Clone, Debug)]
pub struct Config {
    /// Name of the Cloudinary cloud the assets live in.
    pub cloud_name: String,

    /// API key of the Cloudinary account.
    pub api_key: String,

    /// API secret of the Cloudinary account, used for request signing.
    pub api_secret: SecretString,

    /// Unsigned upload preset used by storefront clients to upload assets
    /// directly. Not involved in any server-side operation.
    pub upload_preset: String,

    /// Timeout of a single API request.
    pub timeout: Duration,
}

/// [`Cloudinary`] [`MediaStore`] client.
#[derive(Clone, Debug)]
pub struct Cloudinary {
    /// [`Config`] of this client.
    config: Config,

    /// HTTP client to perform API requests with.
    http: reqwest::Client,
}

impl Cloudinary {
    /// Creates a new [`Cloudinary`] client with the provided [`Config`].
    ///
    /// # Errors
    ///
    /// If failed to create the underlying HTTP client.
    pub fn new(config: Config) -> Result<Self, Traced<media::Error>> {
        let http = reqwest::Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(tracerr::from_and_wrap!(=> Error))
            .map_err(tracerr::map_from)?;
        Ok(Self { config, http })
    }

    /// Signs a destroy request of the provided [`PublicId`] at the provided
    /// Unix `timestamp`.
    ///
    /// The signature is a hex-encoded SHA-256 digest of the sorted request
    /// parameters with the API secret appended.
    fn sign(&self, public_id: &PublicId, timestamp: u64) -> String {
        use std::fmt::Write as _;

        let payload = format!(
            "public_id={}&timestamp={timestamp}{}",
            public_id.as_str(),
            self.config.api_secret.expose_secret(),
        );
        Sha256::digest(payload.as_bytes()).iter().fold(
            String::with_capacity(64),
            |mut hex, b| {
                write!(hex, "{b:02x}").expect("infallible");
                hex
            },
        )
    }
}

/// Response of a destroy API request.
#[derive(Debug, Deserialize)]
struct DestroyResponse {
    /// Outcome reported by the API.
    result: String,
}

impl common::Handler<Delete<PublicId>> for Cloudinary {
    type Ok = ();
    type Err = Traced<media::Error>;

    async fn execute(
        &self,
        Delete(id): Delete<PublicId>,
    ) -> Result<Self::Ok, Self::Err> {
        let timestamp = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap_or(Duration::ZERO)
            .as_secs();
        let signature = self.sign(&id, timestamp);
        let timestamp = timestamp.to_string();

        let url = format!(
            "https://api.cloudinary.com/v1_1/{}/image/destroy",
            self.config.cloud_name,
        );
        let response = self
            .http
            .post(&url)
            .form(&[
                ("public_id", id.as_str()),
                ("timestamp", timestamp.as_str()),
                ("api_key", self.config.api_key.as_str()),
                ("signature", signature.as_str()),
            ])
            .send()
            .await
            .map_err(tracerr::from_and_wrap!(=> Error))
            .map_err(tracerr::map_from)?
            .error_for_status()
            .map_err(tracerr::from_and_wrap!(=> Error))
            .map_err(tracerr::map_from)?
            .json::<DestroyResponse>()
            .await
            .map_err(tracerr::from_and_wrap!(=> Error))
            .map_err(tracerr::map_from)?;

        // An already removed asset reports `not found`, which is as good as
        // a successful destroy here.
        match response.result.as_str() {
            "ok" | "not found" => Ok(()),
            _ => Err(tracerr::new!(media::Error::Cloudinary(
                Error::UnexpectedResult(response.result),
            ))),
        }
    }
}

/// [`Cloudinary`] error.
#[derive(Debug, Display, From, StdError)]
pub enum Error {
    /// HTTP request error.
    #[display("HTTP request error: {_0}")]
    Http(reqwest::Error),

    /// Destroy API reported an unexpected result.
    #[display("Unexpected destroy result: {_0}")]
    UnexpectedResult(#[error(not(source))] String),
}
