//! [`Command`] for authorizing the admin panel operator.

use derive_more::{Display, Error};
use secrecy::{ExposeSecret as _, SecretString};
use tracerr::Traced;

use crate::Service;

use super::Command;

/// [`Command`] for authorizing the admin panel operator against the
/// configured shared credential.
#[derive(Clone, Debug)]
pub struct AuthorizeAdmin {
    /// Provided login.
    pub login: String,

    /// Provided password.
    pub password: SecretString,
}

impl<Db, M> Command<AuthorizeAdmin> for Service<Db, M> {
    type Ok = ();
    type Err = Traced<ExecutionError>;

    async fn execute(
        &self,
        cmd: AuthorizeAdmin,
    ) -> Result<Self::Ok, Self::Err> {
        use ExecutionError as E;

        let AuthorizeAdmin { login, password } = cmd;

        if login != self.config().admin_login
            || password.expose_secret()
                != self.config().admin_password.expose_secret()
        {
            return Err(tracerr::new!(E::WrongCredentials));
        }

        Ok(())
    }
}

/// Error of [`AuthorizeAdmin`] [`Command`] execution.
#[derive(Debug, Display, Error)]
pub enum ExecutionError {
    /// [`AuthorizeAdmin`] contains wrong credentials.
    #[display("Wrong admin credentials")]
    WrongCredentials,
}

#[cfg(test)]
mod spec {
    use crate::{command::Command as _, testing};

    use super::{AuthorizeAdmin, ExecutionError};

    #[tokio::test]
    async fn accepts_configured_credentials() {
        let service = testing::service();

        service
            .execute(AuthorizeAdmin {
                login: "admin".into(),
                password: "hunter2".into(),
            })
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn rejects_wrong_password() {
        let service = testing::service();

        let err = service
            .execute(AuthorizeAdmin {
                login: "admin".into(),
                password: "letmein".into(),
            })
            .await
            .unwrap_err();

        assert!(matches!(err.as_ref(), ExecutionError::WrongCredentials));
    }

    #[tokio::test]
    async fn rejects_wrong_login() {
        let service = testing::service();

        let err = service
            .execute(AuthorizeAdmin {
                login: "root".into(),
                password: "hunter2".into(),
            })
            .await
            .unwrap_err();

        assert!(matches!(err.as_ref(), ExecutionError::WrongCredentials));
    }
}
