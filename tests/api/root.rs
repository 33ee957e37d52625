use crate::helpers::spawn_app;
use reqwest::Method;

#[tokio::test]
async fn the_root_redirects_to_the_login_form_for_every_method() {
    let app = spawn_app().await;

    for method in [Method::GET, Method::POST, Method::PUT, Method::DELETE] {
        let response = app
            .api_client
            .request(method.clone(), &format!("{}/", &app.address))
            .send()
            .await
            .expect("Failed to execute request.");

        assert_eq!(
            302,
            response.status().as_u16(),
            "{} / was not redirected",
            method
        );
        assert_eq!(response.headers().get("Location").unwrap(), "/login");
    }
}

#[tokio::test]
async fn the_root_redirects_to_the_login_form_for_logged_in_users() {
    let app = spawn_app().await;
    app.login_test_user().await;

    let response = app.get_path("/").await;

    assert_eq!(302, response.status().as_u16());
    assert_eq!(response.headers().get("Location").unwrap(), "/login");
}

#[tokio::test]
async fn the_root_never_queries_the_user_directory() {
    let app = spawn_app().await;

    let response = app.get_path("/").await;
    assert_eq!(302, response.status().as_u16());

    let received = app.firebase_server.received_requests().await.unwrap();
    assert!(received.is_empty());
}
