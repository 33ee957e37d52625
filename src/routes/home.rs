use crate::authentication::{reject_anonymous_users, CurrentUser};
use crate::routes::{e500, RouteGroup};
use actix_web::http::header::ContentType;
use actix_web::{web, HttpResponse};
use actix_web_flash_messages::{IncomingFlashMessages, Level as FlashLevel};
use actix_web_lab::middleware::from_fn;
use askama::Template;

pub const GROUP: RouteGroup = RouteGroup::new("home", "/home", configure);

fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::resource("")
            .route(web::get().to(home))
            .wrap(from_fn(reject_anonymous_users)),
    );
}

#[derive(askama::Template)]
#[template(path = "home.html.j2")]
pub struct HomeTemplate {
    info_messages: Vec<String>,
    username: String,
    email: String,
}

#[tracing::instrument(name = "Home", skip_all, fields(user_id = %user.id))]
pub async fn home(
    user: web::ReqData<CurrentUser>,
    flash_messages: IncomingFlashMessages,
) -> Result<HttpResponse, actix_web::Error> {
    let info_messages = flash_messages
        .iter()
        .filter(|m| m.level() == FlashLevel::Info)
        .map(|m| m.content().to_string())
        .collect();

    let user = user.into_inner();
    let tpl = HomeTemplate {
        info_messages,
        username: user.username.clone(),
        email: user.email.clone(),
    };

    Ok(HttpResponse::Ok()
        .content_type(ContentType::html())
        .body(tpl.render().map_err(e500)?))
}
