use crate::domain::User;
use crate::firebase::{self, Document, FirestoreClient};
use crate::routes::error_chain_fmt;
use actix_web::http::StatusCode;
use actix_web::ResponseError;
use std::fmt;

pub const USERS_COLLECTION: &str = "users";

#[derive(thiserror::Error)]
pub enum LoadUserError {
    #[error("The user directory is unavailable")]
    Unavailable(#[source] firebase::Error),
    #[error("User record {id} has no `{field}` field")]
    MalformedRecord { id: String, field: &'static str },
}

impl fmt::Debug for LoadUserError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        error_chain_fmt(self, f)
    }
}

impl ResponseError for LoadUserError {
    fn status_code(&self) -> StatusCode {
        match self {
            LoadUserError::Unavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
            LoadUserError::MalformedRecord { .. } => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

/// Resolves the user id carried by a session to a [`User`].
///
/// `Ok(None)` means no such user exists and the session must be treated as
/// anonymous. Failing to reach the directory is an error, never `Ok(None)`.
#[tracing::instrument(name = "Load user", skip(firestore))]
pub async fn load_user(
    firestore: &FirestoreClient,
    user_id: &str,
) -> Result<Option<User>, LoadUserError> {
    let document = match firestore
        .get_document(USERS_COLLECTION, user_id)
        .await
        .map_err(LoadUserError::Unavailable)?
    {
        Some(document) => document,
        None => return Ok(None),
    };

    let field = |name: &'static str| {
        document
            .string(name)
            .map(str::to_string)
            .ok_or_else(|| LoadUserError::MalformedRecord {
                id: user_id.to_string(),
                field: name,
            })
    };

    Ok(Some(User {
        id: field("uid")?,
        username: field("username")?,
        email: field("email")?,
    }))
}

#[tracing::instrument(name = "Store user", skip(firestore, user), fields(user_id = %user.id))]
pub async fn store_user(firestore: &FirestoreClient, user: &User) -> Result<(), firebase::Error> {
    let document = Document::default()
        .with_string("uid", &user.id)
        .with_string("username", &user.username)
        .with_string("email", &user.email);

    firestore
        .create_document(USERS_COLLECTION, &user.id, &document)
        .await?;

    Ok(())
}
