mod new_user;
mod user;
mod user_email;
mod username;

pub use new_user::NewUser;
pub use user::User;
pub use user_email::UserEmail;
pub use username::Username;
