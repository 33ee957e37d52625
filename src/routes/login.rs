use crate::authentication::{load_user, validate_credentials, AuthError, Credentials};
use crate::firebase::{FirestoreClient, IdentityClient};
use crate::routes::{e500, error_chain_fmt, see_other, RouteGroup};
use crate::sessions::TypedSession;
use actix_web::error::InternalError;
use actix_web::http::header::ContentType;
use actix_web::{web, HttpResponse};
use actix_web_flash_messages::{FlashMessage, IncomingFlashMessages, Level as FlashLevel};
use anyhow::anyhow;
use askama::Template;
use secrecy::Secret;
use std::fmt;

pub const GROUP: RouteGroup = RouteGroup::new("login", "/login", configure);

fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::resource("")
            .route(web::get().to(login_form))
            .route(web::post().to(login)),
    );
}

#[derive(askama::Template)]
#[template(path = "login.html.j2")]
pub struct LoginTemplate {
    error_messages: Vec<String>,
    info_messages: Vec<String>,
}

pub async fn login_form(
    flash_messages: IncomingFlashMessages,
) -> Result<HttpResponse, actix_web::Error> {
    let mut error_messages = Vec::new();
    let mut info_messages = Vec::new();

    for m in flash_messages.iter() {
        match m.level() {
            FlashLevel::Error => error_messages.push(m.content().to_string()),
            _ => info_messages.push(m.content().to_string()),
        }
    }

    let tpl = LoginTemplate {
        error_messages,
        info_messages,
    };

    Ok(HttpResponse::Ok()
        .content_type(ContentType::html())
        .body(tpl.render().map_err(e500)?))
}

#[derive(thiserror::Error)]
pub enum LoginError {
    #[error("Authentication failed")]
    Auth(#[source] anyhow::Error),
    #[error("Something went wrong")]
    Unexpected(#[from] anyhow::Error),
}

impl fmt::Debug for LoginError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        error_chain_fmt(self, f)
    }
}

#[derive(serde::Deserialize)]
pub struct LoginFormData {
    email: String,
    password: Secret<String>,
}

#[tracing::instrument(
    name = "Do login",
    skip(identity, firestore, form, session),
    fields(
        email = tracing::field::Empty,
        user_id = tracing::field::Empty,
    )
)]
pub async fn login(
    identity: web::Data<IdentityClient>,
    firestore: web::Data<FirestoreClient>,
    form: web::Form<LoginFormData>,
    session: TypedSession,
) -> Result<HttpResponse, InternalError<LoginError>> {
    let credentials = Credentials {
        email: form.0.email.trim().to_string(),
        password: form.0.password,
    };

    tracing::Span::current().record("email", &tracing::field::display(&credentials.email));

    let account_id = validate_credentials(&identity, credentials)
        .await
        .map_err(|err| match err {
            AuthError::InvalidCredentials(_) => login_redirect(LoginError::Auth(err.into())),
            AuthError::Unexpected(_) => login_redirect(LoginError::Unexpected(err.into())),
        })?;

    tracing::Span::current().record("user_id", &tracing::field::display(&account_id));

    let user = load_user(&firestore, &account_id)
        .await
        .map_err(|err| login_redirect(LoginError::Unexpected(err.into())))?
        .ok_or_else(|| {
            login_redirect(LoginError::Auth(anyhow!(
                "Account {} has no user record",
                account_id
            )))
        })?;

    session.renew();
    session
        .insert_user_id(&user.id)
        .map_err(|err| login_redirect(LoginError::Unexpected(err.into())))?;

    Ok(see_other("/home"))
}

fn login_redirect(err: LoginError) -> InternalError<LoginError> {
    FlashMessage::error(err.to_string()).send();
    InternalError::from_response(err, see_other("/login"))
}
