use super::{build_http_client, Error};
use reqwest::StatusCode;
use secrecy::{ExposeSecret, Secret};
use std::time::Duration;

#[derive(serde::Serialize)]
#[serde(rename_all = "camelCase")]
struct PasswordRequest<'a> {
    email: &'a str,
    password: &'a str,
    return_secure_token: bool,
}

#[derive(Debug, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthenticatedAccount {
    pub local_id: String,
    pub id_token: Secret<String>,
}

#[derive(serde::Serialize)]
#[serde(rename_all = "camelCase")]
struct DeleteAccountRequest<'a> {
    id_token: &'a str,
}

#[derive(serde::Deserialize)]
struct ErrorResponse {
    error: ErrorDetails,
}

#[derive(serde::Deserialize)]
struct ErrorDetails {
    message: String,
}

pub struct IdentityClient {
    http_client: reqwest::Client,

    base_url: String,
    api_key: Secret<String>,
}

impl IdentityClient {
    pub fn new(
        base_url: String,
        api_key: Secret<String>,
        timeout: Duration,
    ) -> Result<Self, reqwest::Error> {
        Ok(Self {
            http_client: build_http_client(timeout)?,
            base_url,
            api_key,
        })
    }

    #[tracing::instrument(name = "Sign in with password", skip(self, password))]
    pub async fn sign_in(
        &self,
        email: &str,
        password: &Secret<String>,
    ) -> Result<AuthenticatedAccount, Error> {
        self.password_request("accounts:signInWithPassword", email, password)
            .await
    }

    #[tracing::instrument(name = "Sign up with password", skip(self, password))]
    pub async fn sign_up(
        &self,
        email: &str,
        password: &Secret<String>,
    ) -> Result<AuthenticatedAccount, Error> {
        self.password_request("accounts:signUp", email, password)
            .await
    }

    /// Deletes the account the id token was issued for.
    #[tracing::instrument(
        name = "Delete account",
        skip(self, account),
        fields(user_id = %account.local_id)
    )]
    pub async fn delete_account(&self, account: &AuthenticatedAccount) -> Result<(), Error> {
        let body = DeleteAccountRequest {
            id_token: account.id_token.expose_secret(),
        };

        let response = self
            .http_client
            .post(self.endpoint_url("accounts:delete"))
            .query(&[("key", self.api_key.expose_secret())])
            .json(&body)
            .send()
            .await
            .map_err(Error::Transport)?;

        match response.status() {
            StatusCode::OK => Ok(()),
            StatusCode::BAD_REQUEST => Err(rejection(response).await),
            status => Err(Error::UnexpectedStatus(status)),
        }
    }

    fn endpoint_url(&self, endpoint: &str) -> String {
        format!("{}/v1/{}", self.base_url.trim_end_matches('/'), endpoint)
    }

    async fn password_request(
        &self,
        endpoint: &str,
        email: &str,
        password: &Secret<String>,
    ) -> Result<AuthenticatedAccount, Error> {
        let url = self.endpoint_url(endpoint);

        let body = PasswordRequest {
            email,
            password: password.expose_secret(),
            return_secure_token: true,
        };

        let response = self
            .http_client
            .post(url)
            .query(&[("key", self.api_key.expose_secret())])
            .json(&body)
            .send()
            .await
            .map_err(Error::Transport)?;

        match response.status() {
            StatusCode::OK => response
                .json::<AuthenticatedAccount>()
                .await
                .map_err(Error::Decode),
            StatusCode::BAD_REQUEST => Err(rejection(response).await),
            status => Err(Error::UnexpectedStatus(status)),
        }
    }
}

async fn rejection(response: reqwest::Response) -> Error {
    match response.json::<ErrorResponse>().await {
        Ok(details) => Error::Rejected(details.error.message),
        Err(err) => Error::Decode(err),
    }
}
