use actix_session::storage::CookieSessionStore;
use actix_session::{Session, SessionExt, SessionLength, SessionMiddleware};
use actix_web::cookie::Key;
use actix_web::dev::Payload;
use actix_web::{FromRequest, HttpRequest};
use secrecy::{ExposeSecret, Secret};
use sha2::{Digest, Sha512};
use std::future::{ready, Ready};

/// Typed view over the request session. The only state kept in the session is
/// the id of the logged in user.
pub struct TypedSession(Session);

impl TypedSession {
    const USER_ID_KEY: &'static str = "user_id";

    pub fn renew(&self) {
        self.0.renew();
    }

    pub fn insert_user_id(&self, user_id: &str) -> Result<(), serde_json::Error> {
        self.0.insert(Self::USER_ID_KEY, user_id)
    }

    pub fn get_user_id(&self) -> Result<Option<String>, serde_json::Error> {
        self.0.get(Self::USER_ID_KEY)
    }

    pub fn logout(self) {
        self.0.purge()
    }
}

impl FromRequest for TypedSession {
    type Error = <Session as FromRequest>::Error;
    type Future = Ready<Result<TypedSession, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        ready(Ok(TypedSession(req.get_session())))
    }
}

/// Derives the cookie signing key from the configured secret.
///
/// The secret can be any length, the key needs 64 bytes.
pub fn cookie_signing_key(secret: &Secret<String>) -> Key {
    let digest = Sha512::digest(secret.expose_secret().as_bytes());
    Key::from(digest.as_slice())
}

pub fn session_middleware(
    key: Key,
    ttl: time::Duration,
    cookie_secure: bool,
) -> SessionMiddleware<CookieSessionStore> {
    SessionMiddleware::builder(CookieSessionStore::default(), key)
        .cookie_secure(cookie_secure)
        .session_length(SessionLength::BrowserSession {
            state_ttl: Some(ttl),
        })
        .build()
}
