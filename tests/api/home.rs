use crate::helpers::{assert_is_redirect_to, document_path, spawn_app};
use wiremock::matchers::{method, path};
use wiremock::{Mock, ResponseTemplate};

#[tokio::test]
async fn you_must_be_logged_in_to_access_home() {
    let app = spawn_app().await;

    let response = app.get_home().await;
    assert_is_redirect_to(&response, "/login");
}

#[tokio::test]
async fn a_session_whose_user_no_longer_exists_is_logged_out() {
    let app = spawn_app().await;
    app.login_test_user().await;

    // The user record disappears
    app.firebase_server.reset().await;
    Mock::given(path(document_path("users", &app.test_user.uid)))
        .and(method("GET"))
        .respond_with(ResponseTemplate::new(404))
        .expect(1)
        .mount(&app.firebase_server)
        .await;

    let response = app.get_home().await;
    assert_is_redirect_to(&response, "/login");

    // Even if it comes back, the session is gone
    app.firebase_server.reset().await;
    app.mount_user_document(&app.test_user).await;

    let response = app.get_home().await;
    assert_is_redirect_to(&response, "/login");
}

#[tokio::test]
async fn an_unavailable_user_directory_is_a_503_not_a_logout() {
    let app = spawn_app().await;
    app.login_test_user().await;

    app.firebase_server.reset().await;
    Mock::given(path(document_path("users", &app.test_user.uid)))
        .respond_with(ResponseTemplate::new(500))
        .expect(1)
        .mount(&app.firebase_server)
        .await;

    let response = app.get_home().await;
    assert_eq!(503, response.status().as_u16());

    // Once the directory recovers the session is still valid
    app.firebase_server.reset().await;
    app.mount_user_document(&app.test_user).await;

    let response = app.get_home().await;
    assert_eq!(200, response.status().as_u16());
}
