//! Admin session definitions.

use axum::{async_trait, extract::FromRequestParts};
use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};

use crate::{define_error, Error};

/// Name of the cookie carrying an admin session.
pub const COOKIE_NAME: &str = "admin_session";

/// Lifetime of an admin session.
pub const TTL: time::Duration = time::Duration::hours(24);

/// Settings for issuing admin session [`Cookie`]s.
#[derive(Clone, Copy, Debug)]
pub struct Settings {
    /// Indicator whether issued [`Cookie`]s are marked as `Secure`.
    pub secure: bool,
}

impl Settings {
    /// Builds a [`Cookie`] establishing an admin session.
    #[must_use]
    pub fn cookie(&self) -> Cookie<'static> {
        Cookie::build((COOKIE_NAME, "true"))
            .http_only(true)
            .secure(self.secure)
            .same_site(SameSite::Lax)
            .path("/")
            .max_age(TTL)
            .build()
    }

    /// Builds a [`Cookie`] removing an admin session.
    #[must_use]
    pub fn removal(&self) -> Cookie<'static> {
        let mut cookie = self.cookie();
        cookie.make_removal();
        cookie
    }
}

/// Active admin session of the current HTTP request.
///
/// Extraction rejects with `401 Unauthorized` whenever the request carries
/// no admin session cookie.
#[derive(Clone, Copy, Debug)]
pub struct AdminSession;

#[async_trait]
impl<S> FromRequestParts<S> for AdminSession
where
    S: Send + Sync,
{
    type Rejection = Error;

    async fn from_request_parts(
        parts: &mut http::request::Parts,
        _: &S,
    ) -> Result<Self, Self::Rejection> {
        let jar = CookieJar::from_headers(&parts.headers);
        if jar.get(COOKIE_NAME).is_some_and(|c| c.value() == "true") {
            Ok(Self)
        } else {
            Err(AuthError::AuthorizationRequired.into())
        }
    }
}

define_error! {
    enum AuthError {
        #[code = "AUTHORIZATION_REQUIRED"]
        #[status = UNAUTHORIZED]
        #[message = "Authorization required"]
        AuthorizationRequired,
    }
}

#[cfg(test)]
mod spec {
    use super::Settings;

    #[test]
    fn issues_session_cookie() {
        let cookie = Settings { secure: true }.cookie();

        assert_eq!(cookie.name(), "admin_session");
        assert_eq!(cookie.value(), "true");
        assert_eq!(cookie.http_only(), Some(true));
        assert_eq!(cookie.secure(), Some(true));
        assert_eq!(cookie.path(), Some("/"));
        assert_eq!(cookie.max_age(), Some(time::Duration::hours(24)));
    }

    #[test]
    fn respects_secure_setting() {
        let cookie = Settings { secure: false }.cookie();

        assert_eq!(cookie.secure(), Some(false));
    }

    #[test]
    fn removal_expires_cookie() {
        let cookie = Settings { secure: true }.removal();

        assert_eq!(cookie.name(), "admin_session");
        assert_eq!(cookie.max_age(), Some(time::Duration::ZERO));
    }
}
