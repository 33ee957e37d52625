use crate::authentication::load_user;
use crate::domain::User;
use crate::firebase::FirestoreClient;
use crate::routes::{e500, see_other};
use crate::sessions::TypedSession;
use actix_web::body::{EitherBody, MessageBody};
use actix_web::dev::{ServiceRequest, ServiceResponse};
use actix_web::{web, FromRequest, HttpMessage};
use actix_web_lab::middleware::Next;
use anyhow::anyhow;
use std::ops::Deref;

/// The user resolved for the current request by [`reject_anonymous_users`].
#[derive(Clone, Debug)]
pub struct CurrentUser(User);

impl Deref for CurrentUser {
    type Target = User;
    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

/// Lets the request through only if its session resolves to an existing user.
///
/// Anonymous sessions and sessions whose user no longer exists are redirected
/// to the login form. A failed lookup is surfaced as an error response.
pub async fn reject_anonymous_users<B: MessageBody>(
    mut req: ServiceRequest,
    next: Next<B>,
) -> Result<ServiceResponse<EitherBody<B>>, actix_web::Error> {
    let session = {
        let (http_request, payload) = req.parts_mut();
        TypedSession::from_request(http_request, payload).await
    }?;

    let user_id = match session.get_user_id().map_err(e500)? {
        Some(user_id) => user_id,
        None => {
            tracing::debug!("the user has not logged in");
            return Ok(req.into_response(see_other("/login")).map_into_right_body());
        }
    };

    let firestore = req
        .app_data::<web::Data<FirestoreClient>>()
        .cloned()
        .ok_or_else(|| e500(anyhow!("no document database client registered")))?;

    match load_user(&firestore, &user_id).await? {
        Some(user) => {
            req.extensions_mut().insert(CurrentUser(user));
            next.call(req)
                .await
                .map(ServiceResponse::map_into_left_body)
        }
        None => {
            tracing::info!(%user_id, "session user no longer exists, logging out");
            session.logout();
            Ok(req.into_response(see_other("/login")).map_into_right_body())
        }
    }
}
