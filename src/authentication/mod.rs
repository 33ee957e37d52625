mod credentials;
mod middleware;
mod users;

pub use credentials::{validate_credentials, AuthError, Credentials};
pub use middleware::{reject_anonymous_users, CurrentUser};
pub use users::{load_user, store_user, LoadUserError, USERS_COLLECTION};
