use crate::routes::error_chain_fmt;
use azure_storage::{CloudLocation, ConnectionString, EndpointProtocol};
use azure_storage_blobs::prelude::{BlobServiceClient, ClientBuilder};
use reqwest::Url;
use std::fmt;

const DEFAULT_ENDPOINT_SUFFIX: &str = "core.windows.net";

#[derive(thiserror::Error)]
pub enum StorageConfigError {
    #[error("the storage connection string is malformed")]
    Parse(#[source] azure_core::Error),
    #[error("the storage connection string names neither an account nor a blob endpoint")]
    MissingEndpoint,
    #[error("invalid blob endpoint `{0}`")]
    InvalidEndpoint(String),
    #[error("the storage account key is not valid base64")]
    InvalidAccountKey,
    #[error("the storage connection string carries no usable credentials")]
    Credentials(#[source] azure_core::Error),
}

impl fmt::Debug for StorageConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        error_chain_fmt(self, f)
    }
}

/// Builds the blob service client described by an Azure storage connection
/// string.
///
/// Nothing is sent to the storage account, only the connection string is
/// validated.
pub fn blob_service_client(
    connection_string: &str,
) -> Result<BlobServiceClient, StorageConfigError> {
    let parsed = ConnectionString::new(connection_string).map_err(StorageConfigError::Parse)?;

    if parsed.use_development_storage == Some(true) {
        tracing::info!("blob storage uses the local emulator");
        return Ok(ClientBuilder::emulator().blob_service_client());
    }

    let endpoint = blob_endpoint(&parsed)?;
    let account = match parsed.account_name {
        Some(account) => account.to_string(),
        // SAS-only strings name the account through the endpoint host.
        None => endpoint
            .host_str()
            .and_then(|host| host.split('.').next())
            .filter(|label| !label.is_empty())
            .map(str::to_string)
            .ok_or(StorageConfigError::MissingEndpoint)?,
    };

    if let Some(account_key) = parsed.account_key {
        base64::decode(account_key).map_err(|_| StorageConfigError::InvalidAccountKey)?;
    }
    let credentials = parsed
        .storage_credentials()
        .map_err(StorageConfigError::Credentials)?;

    tracing::info!(%account, %endpoint, "blob storage configured");

    let location = CloudLocation::Custom {
        account,
        uri: endpoint.to_string(),
    };
    Ok(ClientBuilder::with_location(location, credentials).blob_service_client())
}

fn blob_endpoint(parsed: &ConnectionString<'_>) -> Result<Url, StorageConfigError> {
    let endpoint = match (parsed.blob_endpoint, parsed.account_name) {
        (Some(endpoint), _) => endpoint.to_string(),
        (None, Some(account)) => {
            let protocol = match parsed.default_endpoints_protocol {
                Some(EndpointProtocol::Http) => "http",
                _ => "https",
            };
            format!(
                "{}://{}.blob.{}",
                protocol,
                account,
                parsed.endpoint_suffix.unwrap_or(DEFAULT_ENDPOINT_SUFFIX)
            )
        }
        (None, None) => return Err(StorageConfigError::MissingEndpoint),
    };

    let url = Url::parse(&endpoint)
        .map_err(|_| StorageConfigError::InvalidEndpoint(endpoint.clone()))?;
    if url.cannot_be_a_base() || !matches!(url.scheme(), "http" | "https") {
        return Err(StorageConfigError::InvalidEndpoint(endpoint));
    }
    Ok(url)
}
