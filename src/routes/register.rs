use crate::authentication::store_user;
use crate::domain::{NewUser, User};
use crate::firebase::{self, AuthenticatedAccount, FirestoreClient, IdentityClient};
use crate::routes::{e500, error_chain_fmt, see_other, RouteGroup};
use crate::sessions::TypedSession;
use actix_web::error::InternalError;
use actix_web::http::header::ContentType;
use actix_web::{web, HttpResponse};
use actix_web_flash_messages::{FlashMessage, IncomingFlashMessages, Level as FlashLevel};
use askama::Template;
use secrecy::{ExposeSecret, Secret};
use std::fmt;
use unicode_segmentation::UnicodeSegmentation;

pub const GROUP: RouteGroup = RouteGroup::new("register", "/register", configure);

const MIN_PASSWORD_LENGTH: usize = 8;
const MAX_PASSWORD_LENGTH: usize = 128;

fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::resource("")
            .route(web::get().to(register_form))
            .route(web::post().to(register)),
    );
}

#[derive(askama::Template)]
#[template(path = "register.html.j2")]
pub struct RegisterTemplate {
    error_messages: Vec<String>,
}

pub async fn register_form(
    flash_messages: IncomingFlashMessages,
) -> Result<HttpResponse, actix_web::Error> {
    let error_messages = flash_messages
        .iter()
        .filter(|m| m.level() == FlashLevel::Error)
        .map(|m| m.content().to_string())
        .collect();

    let tpl = RegisterTemplate { error_messages };

    Ok(HttpResponse::Ok()
        .content_type(ContentType::html())
        .body(tpl.render().map_err(e500)?))
}

#[derive(thiserror::Error)]
pub enum RegisterError {
    #[error("{0}")]
    Validation(String),
    #[error("Something went wrong")]
    Unexpected(#[from] anyhow::Error),
}

impl fmt::Debug for RegisterError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        error_chain_fmt(self, f)
    }
}

#[derive(serde::Deserialize)]
pub struct RegisterFormData {
    username: String,
    email: String,
    password: Secret<String>,
    password_check: Secret<String>,
}

#[tracing::instrument(
    name = "Register a new user",
    skip(identity, firestore, form, session),
    fields(
        username = %form.username,
        email = %form.email,
        user_id = tracing::field::Empty,
    )
)]
pub async fn register(
    identity: web::Data<IdentityClient>,
    firestore: web::Data<FirestoreClient>,
    form: web::Form<RegisterFormData>,
    session: TypedSession,
) -> Result<HttpResponse, InternalError<RegisterError>> {
    let form = form.0;

    validate_password(&form.password, &form.password_check)
        .map_err(|reason| register_redirect(RegisterError::Validation(reason)))?;

    let new_user = NewUser::parse(form.username, form.email)
        .map_err(|reason| register_redirect(RegisterError::Validation(reason)))?;

    let account = identity
        .sign_up(new_user.email.as_ref(), &form.password)
        .await
        .map_err(|err| match err {
            firebase::Error::Rejected(reason) => register_redirect(RegisterError::Validation(
                rejection_message(&reason).to_string(),
            )),
            err => register_redirect(RegisterError::Unexpected(err.into())),
        })?;

    tracing::Span::current().record("user_id", &tracing::field::display(&account.local_id));

    let user = User {
        id: account.local_id.clone(),
        username: new_user.username.as_ref().to_string(),
        email: new_user.email.as_ref().to_string(),
    };

    if let Err(err) = store_user(&firestore, &user).await {
        // Without its user record the account could never log in, and its
        // email could not be registered again.
        discard_account(&identity, &account).await;
        return Err(register_redirect(RegisterError::Unexpected(err.into())));
    }

    session.renew();
    session
        .insert_user_id(&user.id)
        .map_err(|err| register_redirect(RegisterError::Unexpected(err.into())))?;

    FlashMessage::info(format!("Welcome to the family, {}", user.username)).send();
    Ok(see_other("/home"))
}

async fn discard_account(identity: &IdentityClient, account: &AuthenticatedAccount) {
    if let Err(err) = identity.delete_account(account).await {
        tracing::error!(
            user_id = %account.local_id,
            error.cause_chain = ?err,
            "failed to delete an account left without a user record"
        );
    }
}

fn validate_password(
    password: &Secret<String>,
    password_check: &Secret<String>,
) -> Result<(), String> {
    if password.expose_secret() != password_check.expose_secret() {
        return Err("The two passwords do not match".to_string());
    }

    let length = password.expose_secret().graphemes(true).count();
    if !(MIN_PASSWORD_LENGTH..=MAX_PASSWORD_LENGTH).contains(&length) {
        return Err(format!(
            "The password must be between {} and {} characters long",
            MIN_PASSWORD_LENGTH, MAX_PASSWORD_LENGTH
        ));
    }

    Ok(())
}

fn rejection_message(reason: &str) -> &'static str {
    match reason {
        "EMAIL_EXISTS" => "An account with this email address already exists",
        "INVALID_EMAIL" => "The email address is not valid",
        reason if reason.starts_with("WEAK_PASSWORD") => "The password is too weak",
        _ => "The registration was rejected",
    }
}

fn register_redirect(err: RegisterError) -> InternalError<RegisterError> {
    FlashMessage::error(err.to_string()).send();
    InternalError::from_response(err, see_other("/register"))
}
