use axum::http::StatusCode;
use axum::routing::post;
use axum::{Json, Router};
use serde_json::{Value, json};
use storefront_auth::{Credentials, CredentialsClient, CredentialsConfig, Error};
use tokio::net::TcpListener;
use url::Url;

/// Serve `router` on an ephemeral local port and return its base URL.
async fn spawn_backend(router: Router) -> Url {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, router).await.unwrap();
    });
    format!("http://{addr}/").parse().unwrap()
}

/// Backend that answers every sign-in with a fixed status and JSON body.
async fn fixed_backend(status: StatusCode, body: Value) -> CredentialsClient {
    let router = Router::new().route(
        "/user/signin",
        post(move || {
            let body = body.clone();
            async move { (status, Json(body)) }
        }),
    );
    CredentialsClient::new(CredentialsConfig::new(spawn_backend(router).await))
}

fn credentials() -> Credentials {
    Credentials::new("a@b.com", "x").unwrap()
}

fn success_body() -> Value {
    json!({
        "success": true,
        "accessToken": "tok1",
        "data": {
            "id": "1",
            "name": "A",
            "role": "customer",
            "email": "a@b.com",
            "phonNumber": "555"
        }
    })
}

#[tokio::test]
async fn successful_login_yields_identity() {
    let router = Router::new().route(
        "/user/signin",
        post(|Json(req): Json<Value>| async move {
            if req == json!({"email": "a@b.com", "password": "x"}) {
                (StatusCode::OK, Json(success_body()))
            } else {
                (StatusCode::BAD_REQUEST, Json(json!({"success": false})))
            }
        }),
    );
    let client = CredentialsClient::new(CredentialsConfig::new(spawn_backend(router).await));

    let identity = client.sign_in(&credentials()).await.unwrap();

    assert_eq!(identity.id.0, "1");
    assert_eq!(identity.name, "A");
    assert_eq!(identity.email, "a@b.com");
    assert_eq!(identity.role.as_str(), "customer");
    assert_eq!(identity.phone_number, "555");
    assert_eq!(identity.access_token.as_str(), "tok1");
}

#[tokio::test]
async fn backend_reported_failure_carries_message() {
    let client = fixed_backend(
        StatusCode::OK,
        json!({"success": false, "message": "bad creds"}),
    )
    .await;

    let err = client.sign_in(&credentials()).await.unwrap_err();
    assert!(matches!(err, Error::AuthenticationFailed(ref m) if m == "bad creds"));
}

#[tokio::test]
async fn error_status_carries_message() {
    let client = fixed_backend(
        StatusCode::UNAUTHORIZED,
        json!({"success": false, "message": "Account locked"}),
    )
    .await;

    let err = client.sign_in(&credentials()).await.unwrap_err();
    assert!(matches!(err, Error::AuthenticationFailed(ref m) if m == "Account locked"));
}

#[tokio::test]
async fn error_status_without_json_uses_fallback() {
    let router = Router::new().route(
        "/user/signin",
        post(|| async { (StatusCode::BAD_GATEWAY, "<html>upstream down</html>") }),
    );
    let client = CredentialsClient::new(CredentialsConfig::new(spawn_backend(router).await));

    let err = client.sign_in(&credentials()).await.unwrap_err();
    assert!(matches!(err, Error::AuthenticationFailed(ref m) if m == "Invalid email or password"));
}

#[tokio::test]
async fn non_json_success_body_is_transport_error() {
    let router = Router::new().route("/user/signin", post(|| async { "definitely not json" }));
    let client = CredentialsClient::new(CredentialsConfig::new(spawn_backend(router).await));

    let err = client.sign_in(&credentials()).await.unwrap_err();
    assert!(matches!(err, Error::Transport(_)));
}

#[tokio::test]
async fn success_without_data_is_protocol_mismatch() {
    let client = fixed_backend(
        StatusCode::OK,
        json!({"success": true, "accessToken": "tok1"}),
    )
    .await;

    let err = client.sign_in(&credentials()).await.unwrap_err();
    assert!(matches!(err, Error::ProtocolMismatch(_)));
}

#[tokio::test]
async fn missing_success_flag_is_protocol_mismatch() {
    let mut body = success_body();
    body.as_object_mut().unwrap().remove("success");
    let client = fixed_backend(StatusCode::OK, body).await;

    let err = client.sign_in(&credentials()).await.unwrap_err();
    assert!(matches!(err, Error::ProtocolMismatch(_)));
}

#[tokio::test]
async fn unreachable_backend_is_transport_error() {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let base: Url = format!("http://{addr}/").parse().unwrap();
    let client = CredentialsClient::new(CredentialsConfig::new(base));

    let err = client.sign_in(&credentials()).await.unwrap_err();
    assert!(matches!(err, Error::Transport(_)));
    assert!(!err.public_message().is_empty());
}
