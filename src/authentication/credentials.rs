use crate::firebase::{self, IdentityClient};
use anyhow::Context;
use secrecy::Secret;

#[derive(thiserror::Error, Debug)]
pub enum AuthError {
    #[error("Invalid credentials")]
    InvalidCredentials(#[source] anyhow::Error),
    #[error(transparent)]
    Unexpected(#[from] anyhow::Error),
}

pub struct Credentials {
    pub email: String,
    pub password: Secret<String>,
}

/// Checks the credentials against the identity service and returns the
/// account id on success.
#[tracing::instrument(name = "Validate credentials", skip(identity, credentials))]
pub async fn validate_credentials(
    identity: &IdentityClient,
    credentials: Credentials,
) -> Result<String, AuthError> {
    let result = identity
        .sign_in(&credentials.email, &credentials.password)
        .await;

    match result {
        Ok(account) => Ok(account.local_id),
        Err(err @ firebase::Error::Rejected(_)) => Err(AuthError::InvalidCredentials(err.into())),
        Err(err) => Err(err)
            .context("Failed to reach the identity service")
            .map_err(AuthError::Unexpected),
    }
}
