use crate::domain::{UserEmail, Username};

pub struct NewUser {
    pub username: Username,
    pub email: UserEmail,
}

impl NewUser {
    pub fn parse(username: String, email: String) -> Result<NewUser, String> {
        let username = Username::parse(username)?;
        let email = UserEmail::parse(email)?;
        Ok(NewUser { username, email })
    }
}
