use familien::configuration::{get_configuration, Environment, Settings};
use familien::startup::Application;
use familien::telemetry;
use once_cell::sync::Lazy;
use secrecy::Secret;
use uuid::Uuid;
use wiremock::matchers::{body_partial_json, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

static TRACING: Lazy<()> = Lazy::new(|| {
    let default_filter_level = "info".into();
    let subscriber_name = "test".into();

    if std::env::var("TEST_LOG").is_ok() {
        let subscriber =
            telemetry::get_subscriber(subscriber_name, default_filter_level, std::io::stdout);
        telemetry::init_subscriber(subscriber);
    } else {
        let subscriber =
            telemetry::get_subscriber(subscriber_name, default_filter_level, std::io::sink);
        telemetry::init_subscriber(subscriber);
    }
});

pub const PROJECT_ID: &str = "familien-test";
pub const SIGN_IN_PATH: &str = "/v1/accounts:signInWithPassword";
pub const SIGN_UP_PATH: &str = "/v1/accounts:signUp";
pub const DELETE_ACCOUNT_PATH: &str = "/v1/accounts:delete";

pub fn document_path(collection: &str, id: &str) -> String {
    format!(
        "/v1/projects/{}/databases/(default)/documents/{}/{}",
        PROJECT_ID, collection, id
    )
}

pub fn collection_path(collection: &str) -> String {
    format!(
        "/v1/projects/{}/databases/(default)/documents/{}",
        PROJECT_ID, collection
    )
}

pub fn identity_rejection(reason: &str) -> ResponseTemplate {
    ResponseTemplate::new(400).set_body_json(serde_json::json!({
        "error": { "code": 400, "message": reason, "errors": [] }
    }))
}

pub struct TestUser {
    pub uid: String,
    pub username: String,
    pub email: String,
    pub password: String,
}

impl TestUser {
    pub fn generate() -> Self {
        Self {
            uid: Uuid::new_v4().simple().to_string(),
            username: format!("user-{}", &Uuid::new_v4().simple().to_string()[..8]),
            email: format!("{}@example.com", Uuid::new_v4().simple()),
            password: Uuid::new_v4().to_string(),
        }
    }

    pub fn document(&self) -> serde_json::Value {
        serde_json::json!({
            "name": format!("projects/{}/databases/(default)/documents/users/{}", PROJECT_ID, self.uid),
            "fields": {
                "uid": { "stringValue": self.uid },
                "username": { "stringValue": self.username },
                "email": { "stringValue": self.email }
            }
        })
    }

    pub fn account(&self) -> serde_json::Value {
        serde_json::json!({
            "localId": self.uid,
            "email": self.email,
            "idToken": "id-token",
            "refreshToken": "refresh-token",
            "expiresIn": "3600"
        })
    }
}

#[derive(serde::Serialize)]
pub struct LoginBody {
    pub email: String,
    pub password: String,
}

#[derive(serde::Serialize)]
pub struct RegisterBody {
    pub username: String,
    pub email: String,
    pub password: String,
    pub password_check: String,
}

pub struct TestApp {
    pub address: String,
    pub port: u16,
    pub firebase_server: MockServer,
    pub api_client: reqwest::Client,
    pub test_user: TestUser,
}

impl TestApp {
    pub async fn mount_sign_in(&self, user: &TestUser) {
        Mock::given(path(SIGN_IN_PATH))
            .and(method("POST"))
            .and(body_partial_json(serde_json::json!({
                "email": user.email,
                "password": user.password,
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(user.account()))
            .mount(&self.firebase_server)
            .await;
    }

    pub async fn mount_user_document(&self, user: &TestUser) {
        Mock::given(path(document_path("users", &user.uid)))
            .and(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_json(user.document()))
            .mount(&self.firebase_server)
            .await;
    }

    /// Logs the test user in, mocking both the identity service and its user
    /// record.
    pub async fn login_test_user(&self) -> reqwest::Response {
        self.mount_sign_in(&self.test_user).await;
        self.mount_user_document(&self.test_user).await;

        self.post_login(&LoginBody {
            email: self.test_user.email.clone(),
            password: self.test_user.password.clone(),
        })
        .await
    }

    pub async fn get_path(&self, path: &str) -> reqwest::Response {
        self.api_client
            .get(&format!("{}{}", &self.address, path))
            .send()
            .await
            .expect("Failed to execute request.")
    }

    pub async fn get_health_check(&self) -> reqwest::Response {
        self.get_path("/health_check").await
    }

    pub async fn get_login(&self) -> reqwest::Response {
        self.get_path("/login").await
    }

    pub async fn get_login_html(&self) -> String {
        self.get_login().await.text().await.unwrap()
    }

    pub async fn post_login<Body>(&self, body: &Body) -> reqwest::Response
    where
        Body: serde::Serialize,
    {
        self.api_client
            .post(&format!("{}/login", &self.address))
            .form(body)
            .send()
            .await
            .expect("Failed to execute request.")
    }

    pub async fn get_home(&self) -> reqwest::Response {
        self.get_path("/home").await
    }

    pub async fn get_home_html(&self) -> String {
        self.get_home().await.text().await.unwrap()
    }

    pub async fn post_logout(&self) -> reqwest::Response {
        self.api_client
            .post(&format!("{}/logout", &self.address))
            .send()
            .await
            .expect("Failed to execute request.")
    }

    pub async fn get_register_html(&self) -> String {
        self.get_path("/register").await.text().await.unwrap()
    }

    pub async fn post_register(&self, body: &RegisterBody) -> reqwest::Response {
        self.api_client
            .post(&format!("{}/register", &self.address))
            .form(body)
            .send()
            .await
            .expect("Failed to execute request.")
    }
}

/// Configuration pointing every remote service at the mock server.
pub fn test_configuration(firebase_uri: &str) -> Settings {
    let mut configuration = get_configuration().expect("Failed to read configuration");

    configuration.application.host = "127.0.0.1".into();
    configuration.application.port = 0;
    configuration.application.environment = Environment::Local;
    configuration.application.secret_key = Some(Secret::new(Uuid::new_v4().to_string()));
    configuration.application.allowed_origins = Vec::new();
    configuration.firebase.project_id = PROJECT_ID.into();
    configuration.firebase.api_key = Secret::new("test-api-key".into());
    configuration.firebase.firestore_base_url = firebase_uri.into();
    configuration.firebase.identity_base_url = firebase_uri.into();
    configuration.firebase.timeout_milliseconds = 500;
    configuration.session.cookie_secure = false;
    configuration.storage.connection_string = None;

    configuration
}

pub async fn spawn_app() -> TestApp {
    spawn_app_with(|_| {}).await
}

pub async fn spawn_app_with<F>(customize: F) -> TestApp
where
    F: FnOnce(&mut Settings),
{
    Lazy::force(&TRACING);

    let firebase_server = MockServer::start().await;

    let mut configuration = test_configuration(&firebase_server.uri());
    customize(&mut configuration);

    let app = Application::build(configuration)
        .await
        .expect("Failed to build application");

    let port = app.port();
    let address = format!("http://127.0.0.1:{}", port);

    let _ = tokio::spawn(app.run_until_stopped());

    let api_client = reqwest::Client::builder()
        .redirect(reqwest::redirect::Policy::none())
        .cookie_store(true)
        .build()
        .unwrap();

    TestApp {
        address,
        port,
        firebase_server,
        api_client,
        test_user: TestUser::generate(),
    }
}

pub fn assert_is_redirect_to(response: &reqwest::Response, location: &str) {
    assert_eq!(response.status().as_u16(), 303);
    assert_eq!(response.headers().get("Location").unwrap(), location);
}
