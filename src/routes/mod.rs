use actix_web::http::header::LOCATION;
use actix_web::{web, HttpResponse};
use std::fmt;

pub use home::home;
pub use login::{login, login_form};
pub use logout::logout;
pub use register::{register, register_form};

mod home;
mod login;
mod logout;
mod register;

/// A named set of handlers mounted together under a path prefix.
#[derive(Clone, Copy)]
pub struct RouteGroup {
    pub name: &'static str,
    pub prefix: &'static str,
    configure: fn(&mut web::ServiceConfig),
}

impl RouteGroup {
    pub const fn new(
        name: &'static str,
        prefix: &'static str,
        configure: fn(&mut web::ServiceConfig),
    ) -> Self {
        Self {
            name,
            prefix,
            configure,
        }
    }

    pub fn scope(&self) -> actix_web::Scope {
        web::scope(self.prefix).configure(self.configure)
    }
}

/// Every route group served by the application.
pub fn route_groups() -> Vec<RouteGroup> {
    vec![login::GROUP, logout::GROUP, register::GROUP, home::GROUP]
}

pub fn error_chain_fmt(err: &impl std::error::Error, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    writeln!(f, "{}\n", err)?;
    let mut current = err.source();
    while let Some(cause) = current {
        writeln!(f, "Caused by:\n\t{}", cause)?;
        current = cause.source();
    }
    Ok(())
}

pub fn see_other(location: &str) -> HttpResponse {
    HttpResponse::SeeOther()
        .insert_header((LOCATION, location))
        .finish()
}

pub fn e500<T>(e: T) -> actix_web::Error
where
    T: fmt::Debug + fmt::Display + 'static,
{
    actix_web::error::ErrorInternalServerError(e)
}

pub async fn health_check() -> HttpResponse {
    HttpResponse::Ok().finish()
}

/// The root never serves content, it always points at the login form.
pub async fn index() -> HttpResponse {
    HttpResponse::Found()
        .insert_header((LOCATION, "/login"))
        .finish()
}
