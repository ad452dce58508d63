//! [`Error`]-related definitions.

use std::fmt;

use axum::{
    response::{IntoResponse, Response},
    Json,
};
use derive_more::Error as StdError;
use itertools::Itertools as _;
use serde::Serialize;
use service::{
    command::{
        authorize_admin, create_listing, delete_listing, update_listing,
    },
    infra::database,
};
use tracerr::{Trace, Traced};

/// Defines a new error type.
#[expect(clippy::module_name_repetitions, reason = "more readable")]
#[macro_export]
macro_rules! define_error {
    (
        enum $name:ident {
            $(
                #[code = $code:literal]
                #[status = $status_code:ident]
                #[message = $message:literal]
                $variant:ident
            ),* $(,)?
        }
    ) => {
        /// Error type.
        #[derive(
            Clone,
            Copy,
            Debug,
            ::derive_more::Display,
            ::derive_more::Error
        )]
        #[repr(u16)]
        pub enum $name {
            $(
                #[display($message)]
                #[doc = $message]
                $variant,
            )*
        }

        impl From<$name> for $crate::Error {
            fn from(err: $name) -> Self {
                match err {
                    $(
                        $name::$variant => Self {
                            code: $code,
                            status_code: ::http::StatusCode::$status_code,
                            message: $message.to_string(),
                            backtrace: None,
                        },
                    )*
                }
            }
        }
    };
}

/// REST API [`Error`].
#[derive(Clone, Debug, StdError)]
pub struct Error {
    /// [`Error`] code.
    pub code: Code,

    /// [`http::StatusCode`] of this [`Error`].
    pub status_code: http::StatusCode,

    /// Backtrace of this [`Error`].
    #[error(not(backtrace))]
    pub backtrace: Option<Trace>,

    /// [`Error`] message.
    pub message: String,
}

impl Error {
    /// Create a new [`Error`] representing an internal server error.
    #[must_use]
    pub fn internal(msg: &impl ToString) -> Self {
        Self {
            code: "INTERNAL_SERVER_ERROR",
            status_code: http::StatusCode::INTERNAL_SERVER_ERROR,
            message: msg.to_string(),
            backtrace: None,
        }
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let Self {
            code,
            status_code: _,
            backtrace,
            message,
        } = self;

        write!(
            f,
            "[{code}]: {message}{}",
            backtrace
                .iter()
                .format_with("\n", |trace, f| f(&format_args!("{trace}"))),
        )
    }
}

/// JSON body of an [`Error`] response.
#[derive(Debug, Serialize)]
struct ErrorBody {
    /// Human-readable message of the [`Error`].
    error: String,
}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        if self.status_code.is_server_error() {
            tracing::error!("{self}");
        }
        (
            self.status_code,
            Json(ErrorBody {
                error: self.message,
            }),
        )
            .into_response()
    }
}

/// [`Error`] code.
pub type Code = &'static str;

/// Helper trait for converting types into [`Error`]s.
pub trait AsError {
    /// Tries to convert the type into an [`Error`].
    ///
    /// [`None`] is returned if the type cannot be converted into an [`Error`].
    fn try_as_error(&self) -> Option<Error>;

    /// Converts the type into an [`Error`].
    fn as_error(&self) -> Error
    where
        Self: fmt::Display,
    {
        self.try_as_error()
            .unwrap_or_else(|| Error::internal(&self))
    }

    /// Converts the type into an [`Error`] by consuming it.
    fn into_error(self) -> Error
    where
        Self: fmt::Display + Sized,
    {
        self.as_error()
    }
}

impl<E: AsError> AsError for Traced<E> {
    fn try_as_error(&self) -> Option<Error> {
        let mut error = self.as_ref().try_as_error()?;
        error.backtrace = Some(self.trace().clone());
        Some(error)
    }
}

impl AsError for database::Error {
    fn try_as_error(&self) -> Option<Error> {
        None
    }
}

impl AsError for authorize_admin::ExecutionError {
    fn try_as_error(&self) -> Option<Error> {
        match self {
            Self::WrongCredentials => Some(Error {
                code: "UNAUTHORIZED",
                status_code: http::StatusCode::UNAUTHORIZED,
                message: "Invalid credentials".to_owned(),
                backtrace: None,
            }),
        }
    }
}

impl AsError for create_listing::ExecutionError {
    fn try_as_error(&self) -> Option<Error> {
        match self {
            Self::NoImages | Self::RegisteredYearOutOfRange(_) => {
                Some(Error {
                    code: "BAD_REQUEST",
                    status_code: http::StatusCode::BAD_REQUEST,
                    message: self.to_string(),
                    backtrace: None,
                })
            }
            Self::Db(_) | Self::SlugsExhausted(_) => None,
        }
    }
}

impl AsError for update_listing::ExecutionError {
    fn try_as_error(&self) -> Option<Error> {
        match self {
            Self::NoImages | Self::RegisteredYearOutOfRange(_) => {
                Some(Error {
                    code: "BAD_REQUEST",
                    status_code: http::StatusCode::BAD_REQUEST,
                    message: self.to_string(),
                    backtrace: None,
                })
            }
            Self::NotExists(_) => Some(Error {
                code: "VEHICLE_NOT_FOUND",
                status_code: http::StatusCode::NOT_FOUND,
                message: "Vehicle not found".to_owned(),
                backtrace: None,
            }),
            Self::Db(_) | Self::SlugsExhausted(_) => None,
        }
    }
}

impl AsError for delete_listing::ExecutionError {
    fn try_as_error(&self) -> Option<Error> {
        match self {
            Self::NotExists(_) => Some(Error {
                code: "VEHICLE_NOT_FOUND",
                status_code: http::StatusCode::NOT_FOUND,
                message: "Vehicle not found".to_owned(),
                backtrace: None,
            }),
            Self::Db(_) => None,
        }
    }
}
