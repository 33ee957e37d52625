use secrecy::{ExposeSecret, Secret};

/// Session-signing secret used when none is configured. Only accepted in the
/// local environment.
pub const DEVELOPMENT_SECRET_KEY: &str = "default_secret_key";

#[derive(serde::Deserialize, Clone)]
pub struct Settings {
    pub application: ApplicationSettings,
    pub firebase: FirebaseSettings,
    pub session: SessionSettings,
    #[serde(default)]
    pub storage: StorageSettings,
}

#[derive(serde::Deserialize, Clone)]
pub struct ApplicationSettings {
    pub host: String,
    pub port: u16,
    pub environment: Environment,
    pub secret_key: Option<Secret<String>>,
    #[serde(default)]
    pub allowed_origins: Vec<String>,
}

#[derive(serde::Deserialize, Clone, Copy, Debug, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Environment {
    Local,
    Production,
}

#[derive(serde::Deserialize, Clone)]
pub struct FirebaseSettings {
    pub project_id: String,
    pub api_key: Secret<String>,
    pub firestore_base_url: String,
    pub identity_base_url: String,
    pub timeout_milliseconds: u64,
}

impl FirebaseSettings {
    pub fn timeout(&self) -> std::time::Duration {
        std::time::Duration::from_millis(self.timeout_milliseconds)
    }
}

#[derive(serde::Deserialize, Clone)]
pub struct SessionSettings {
    pub ttl_minutes: i64,
    pub cookie_secure: bool,
}

impl SessionSettings {
    pub fn ttl(&self) -> time::Duration {
        time::Duration::minutes(self.ttl_minutes)
    }
}

#[derive(serde::Deserialize, Clone, Default)]
pub struct StorageSettings {
    pub connection_string: Option<Secret<String>>,
}

#[derive(thiserror::Error, Debug)]
pub enum ConfigurationError {
    #[error("SECRET_KEY must be set outside of the local environment")]
    MissingSecretKey,
}

impl Settings {
    /// Returns the session-signing secret.
    ///
    /// Falls back to [`DEVELOPMENT_SECRET_KEY`] in the local environment only.
    pub fn secret_key(&self) -> Result<Secret<String>, ConfigurationError> {
        let configured = self
            .application
            .secret_key
            .as_ref()
            .filter(|key| !key.expose_secret().is_empty());

        match (configured, self.application.environment) {
            (Some(key), _) => Ok(key.clone()),
            (None, Environment::Local) => {
                tracing::warn!("no secret key configured, using the development fallback");
                Ok(Secret::new(DEVELOPMENT_SECRET_KEY.to_string()))
            }
            (None, Environment::Production) => Err(ConfigurationError::MissingSecretKey),
        }
    }
}

type Builder = config::ConfigBuilder<config::builder::DefaultState>;

pub fn get_configuration() -> Result<Settings, config::ConfigError> {
    build_configuration(configuration_files, |name| std::env::var(name).ok())
}

fn configuration_files(builder: Builder) -> Builder {
    builder
        .add_source(
            config::File::new("configuration.yml", config::FileFormat::Yaml).required(false),
        )
        .add_source(
            config::File::new("/etc/familien.yml", config::FileFormat::Yaml).required(false),
        )
}

fn build_configuration<S, F>(files: S, lookup: F) -> Result<Settings, config::ConfigError>
where
    S: FnOnce(Builder) -> Builder,
    F: Fn(&str) -> Option<String>,
{
    let var = |name: &str| lookup(name).filter(|value| !value.is_empty());

    let builder = config::Config::builder()
        .set_default("application.host", "0.0.0.0")?
        .set_default("application.port", 3000)?
        .set_default("application.environment", "local")?
        .set_default("firebase.firestore_base_url", "https://firestore.googleapis.com")?
        .set_default(
            "firebase.identity_base_url",
            "https://identitytoolkit.googleapis.com",
        )?
        .set_default("firebase.timeout_milliseconds", 10_000)?
        .set_default("session.ttl_minutes", 60 * 24)?
        .set_default("session.cookie_secure", true)?;

    let settings = files(builder)
        .add_source(
            config::Environment::with_prefix("APP")
                .prefix_separator("__")
                .separator("__")
                .try_parsing(true),
        )
        .set_override_option("application.environment", var("APP_ENVIRONMENT"))?
        .set_override_option("application.port", var("PORT"))?
        .set_override_option("application.secret_key", var("SECRET_KEY"))?
        .set_override_option(
            "storage.connection_string",
            var("AZURE_STORAGE_CONNECTION_STRING"),
        )?
        .build()?;

    settings.try_deserialize::<Settings>()
}
