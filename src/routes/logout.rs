use crate::routes::{e500, see_other, RouteGroup};
use crate::sessions::TypedSession;
use actix_web::{web, HttpResponse};
use actix_web_flash_messages::FlashMessage;

pub const GROUP: RouteGroup = RouteGroup::new("logout", "/logout", configure);

fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::resource("")
            .route(web::post().to(logout))
            .route(web::get().to(logout)),
    );
}

#[tracing::instrument(
    name = "Do logout",
    skip(session),
    fields(
        user_id = tracing::field::Empty,
    )
)]
pub async fn logout(session: TypedSession) -> Result<HttpResponse, actix_web::Error> {
    if let Some(user_id) = session.get_user_id().map_err(e500)? {
        tracing::Span::current().record("user_id", &tracing::field::display(&user_id));
        session.logout();
        FlashMessage::info("You have successfully logged out").send();
    }
    Ok(see_other("/login"))
}
