//! Clients for the hosted Firebase services: the Firestore document
//! database and the Identity Toolkit account service.

mod firestore;
mod identity;

pub use firestore::{Document, FirestoreClient};
pub use identity::{AuthenticatedAccount, IdentityClient};

use crate::routes::error_chain_fmt;
use std::fmt;

#[derive(thiserror::Error)]
pub enum Error {
    #[error("invalid service url `{0}`")]
    InvalidUrl(String),
    #[error("failed to reach the remote service")]
    Transport(#[source] reqwest::Error),
    #[error("the remote service answered with status {0}")]
    UnexpectedStatus(reqwest::StatusCode),
    #[error("failed to decode the remote service response")]
    Decode(#[source] reqwest::Error),
    #[error("the document already exists")]
    AlreadyExists,
    #[error("the request was rejected: {0}")]
    Rejected(String),
}

impl fmt::Debug for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        error_chain_fmt(self, f)
    }
}

fn build_http_client(timeout: std::time::Duration) -> Result<reqwest::Client, reqwest::Error> {
    reqwest::Client::builder().timeout(timeout).build()
}
