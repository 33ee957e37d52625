/// The authenticated user as seen by request handlers.
///
/// Rebuilt from the `users` collection on every authenticated request and
/// never mutated afterwards.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct User {
    pub id: String,
    pub username: String,
    pub email: String,
}
