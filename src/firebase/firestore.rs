use super::{build_http_client, Error};
use reqwest::{StatusCode, Url};
use secrecy::{ExposeSecret, Secret};
use std::collections::HashMap;
use std::time::Duration;

/// A typed Firestore value. Only string values are interpreted, every other
/// kind deserializes to an empty value.
#[derive(Clone, Debug, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Value {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub string_value: Option<String>,
}

impl Value {
    pub fn string(s: impl Into<String>) -> Self {
        Self {
            string_value: Some(s.into()),
        }
    }
}

#[derive(Clone, Debug, Default, serde::Serialize, serde::Deserialize)]
pub struct Document {
    #[serde(default, skip_serializing)]
    pub name: Option<String>,
    #[serde(default)]
    pub fields: HashMap<String, Value>,
}

impl Document {
    pub fn with_string(mut self, field: &str, value: impl Into<String>) -> Self {
        self.fields.insert(field.to_string(), Value::string(value));
        self
    }

    pub fn string(&self, field: &str) -> Option<&str> {
        self.fields
            .get(field)
            .and_then(|value| value.string_value.as_deref())
    }
}

pub struct FirestoreClient {
    http_client: reqwest::Client,

    base_url: String,
    project_id: String,
    api_key: Secret<String>,
}

impl FirestoreClient {
    pub fn new(
        base_url: String,
        project_id: String,
        api_key: Secret<String>,
        timeout: Duration,
    ) -> Result<Self, reqwest::Error> {
        Ok(Self {
            http_client: build_http_client(timeout)?,
            base_url,
            project_id,
            api_key,
        })
    }

    fn collection_url(&self, collection: &str) -> Result<Url, Error> {
        let mut url =
            Url::parse(&self.base_url).map_err(|_| Error::InvalidUrl(self.base_url.clone()))?;
        url.path_segments_mut()
            .map_err(|_| Error::InvalidUrl(self.base_url.clone()))?
            .pop_if_empty()
            .extend([
                "v1",
                "projects",
                self.project_id.as_str(),
                "databases",
                "(default)",
                "documents",
                collection,
            ]);
        Ok(url)
    }

    /// Fetches `collection/id`, returning `None` when no such document exists.
    ///
    /// Identifiers that cannot name a single document (empty, a dot segment,
    /// or containing a path separator) resolve to `None` without a request.
    #[tracing::instrument(name = "Get document", skip(self))]
    pub async fn get_document(
        &self,
        collection: &str,
        id: &str,
    ) -> Result<Option<Document>, Error> {
        if !names_single_document(id) {
            return Ok(None);
        }

        let mut url = self.collection_url(collection)?;
        url.path_segments_mut()
            .map_err(|_| Error::InvalidUrl(self.base_url.clone()))?
            .push(id);

        let response = self
            .http_client
            .get(url)
            .query(&[("key", self.api_key.expose_secret())])
            .send()
            .await
            .map_err(Error::Transport)?;

        match response.status() {
            StatusCode::OK => response
                .json::<Document>()
                .await
                .map(Some)
                .map_err(Error::Decode),
            StatusCode::NOT_FOUND => Ok(None),
            status => Err(Error::UnexpectedStatus(status)),
        }
    }

    #[tracing::instrument(name = "Create document", skip(self, document))]
    pub async fn create_document(
        &self,
        collection: &str,
        id: &str,
        document: &Document,
    ) -> Result<Document, Error> {
        let url = self.collection_url(collection)?;

        let response = self
            .http_client
            .post(url)
            .query(&[("documentId", id), ("key", self.api_key.expose_secret().as_str())])
            .json(document)
            .send()
            .await
            .map_err(Error::Transport)?;

        match response.status() {
            StatusCode::OK => response.json::<Document>().await.map_err(Error::Decode),
            StatusCode::CONFLICT => Err(Error::AlreadyExists),
            status => Err(Error::UnexpectedStatus(status)),
        }
    }
}

// Dot segments are dropped by URL normalization and would address the
// collection itself.
fn names_single_document(id: &str) -> bool {
    !matches!(id, "" | "." | "..") && !id.contains('/')
}
