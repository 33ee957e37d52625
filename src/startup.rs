use crate::configuration::{ConfigurationError, Settings, StorageSettings};
use crate::firebase::{FirestoreClient, IdentityClient};
use crate::routes;
use crate::sessions::{cookie_signing_key, session_middleware};
use crate::storage::{blob_service_client, StorageConfigError};
use actix_cors::Cors;
use actix_files::Files;
use actix_web::dev::Server;
use actix_web::{web, App, HttpServer};
use actix_web_flash_messages::storage::CookieMessageStore;
use actix_web_flash_messages::FlashMessagesFramework;
use azure_storage_blobs::prelude::BlobServiceClient;
use secrecy::{ExposeSecret, Secret};
use std::io;
use std::net::TcpListener;
use tracing_actix_web::TracingLogger;

#[derive(thiserror::Error, Debug)]
pub enum StartupError {
    #[error(transparent)]
    Configuration(#[from] ConfigurationError),
    #[error("invalid blob storage configuration")]
    Storage(#[from] StorageConfigError),
    #[error("failed to build the HTTP client")]
    HttpClient(#[from] reqwest::Error),
    #[error("failed to start the HTTP server")]
    Io(#[from] io::Error),
}

pub struct Application {
    port: u16,
    server: Server,
    storage: Option<web::Data<BlobServiceClient>>,
}

impl Application {
    pub async fn build(configuration: Settings) -> Result<Self, StartupError> {
        let secret_key = configuration.secret_key()?;
        let storage = build_storage_client(&configuration.storage)?.map(web::Data::new);

        let firebase = &configuration.firebase;
        let firestore = FirestoreClient::new(
            firebase.firestore_base_url.clone(),
            firebase.project_id.clone(),
            firebase.api_key.clone(),
            firebase.timeout(),
        )?;
        let identity = IdentityClient::new(
            firebase.identity_base_url.clone(),
            firebase.api_key.clone(),
            firebase.timeout(),
        )?;

        let listener = TcpListener::bind(&format!(
            "{}:{}",
            configuration.application.host, configuration.application.port
        ))?;
        let port = listener.local_addr()?.port();

        tracing::info!(host = %configuration.application.host, %port, "listening");

        let server = run(
            listener,
            firestore,
            identity,
            storage.clone(),
            RunSettings {
                secret_key,
                allowed_origins: configuration.application.allowed_origins,
                session_ttl: configuration.session.ttl(),
                cookie_secure: configuration.session.cookie_secure,
            },
        )?;

        Ok(Self {
            port,
            server,
            storage,
        })
    }

    pub fn port(&self) -> u16 {
        self.port
    }

    /// The blob storage client, if a connection string was configured.
    pub fn storage(&self) -> Option<&BlobServiceClient> {
        self.storage.as_ref().map(|storage| storage.get_ref())
    }

    pub async fn run_until_stopped(self) -> Result<(), anyhow::Error> {
        self.server.await?;
        Ok(())
    }
}

/// Builds the blob storage client when a connection string is configured.
///
/// A missing connection string disables storage, a malformed one is an error.
pub fn build_storage_client(
    settings: &StorageSettings,
) -> Result<Option<BlobServiceClient>, StorageConfigError> {
    let connection_string = match &settings.connection_string {
        Some(connection_string) => connection_string,
        None => {
            tracing::info!("no storage connection string, blob storage disabled");
            return Ok(None);
        }
    };

    blob_service_client(connection_string.expose_secret()).map(Some)
}

struct RunSettings {
    secret_key: Secret<String>,
    allowed_origins: Vec<String>,
    session_ttl: time::Duration,
    cookie_secure: bool,
}

fn cors(allowed_origins: &[String]) -> Cors {
    if allowed_origins.is_empty() {
        return Cors::permissive();
    }

    allowed_origins
        .iter()
        .fold(Cors::default(), |cors, origin| cors.allowed_origin(origin))
        .allow_any_method()
        .allow_any_header()
        .supports_credentials()
}

fn run(
    listener: TcpListener,
    firestore: FirestoreClient,
    identity: IdentityClient,
    storage: Option<web::Data<BlobServiceClient>>,
    settings: RunSettings,
) -> Result<Server, io::Error> {
    let cookie_signing_key = cookie_signing_key(&settings.secret_key);

    // Flash messages
    let flash_messages_store = CookieMessageStore::builder(cookie_signing_key.clone()).build();
    let flash_messages_framework = FlashMessagesFramework::builder(flash_messages_store).build();

    let firestore = web::Data::new(firestore);
    let identity = web::Data::new(identity);
    let route_groups = routes::route_groups();

    let RunSettings {
        allowed_origins,
        session_ttl,
        cookie_secure,
        ..
    } = settings;

    let server = HttpServer::new(move || {
        let mut app = App::new()
            .wrap(flash_messages_framework.clone())
            .wrap(session_middleware(
                cookie_signing_key.clone(),
                session_ttl,
                cookie_secure,
            ))
            .wrap(cors(&allowed_origins))
            .wrap(TracingLogger::default())
            .service(Files::new("/static", "./static").prefer_utf8(true))
            .route("/", web::route().to(routes::index))
            .route("/health_check", web::get().to(routes::health_check))
            .app_data(firestore.clone())
            .app_data(identity.clone());

        if let Some(storage) = &storage {
            app = app.app_data(storage.clone());
        }

        for group in &route_groups {
            app = app.service(group.scope());
        }

        app
    })
    .listen(listener)?
    .run();

    Ok(server)
}
