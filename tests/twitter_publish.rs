// tests/twitter_publish.rs
//
// TwitterPublisher against a local stand-in for the tweets endpoint.

use std::sync::{Arc, Mutex};

use axum::{
    extract::State,
    http::{header, HeaderMap, StatusCode},
    routing::post,
    Json, Router,
};
use serde_json::{json, Value};

use newsbot::ingest::providers::USER_AGENT;
use newsbot::publish::twitter::{OAuth1Credentials, TwitterPublisher};
use newsbot::Publisher;

#[derive(Clone, Default)]
struct Seen {
    user_agent: Arc<Mutex<Option<String>>>,
    authorization: Arc<Mutex<Option<String>>>,
    body: Arc<Mutex<Option<Value>>>,
}

async fn create_tweet(
    State(seen): State<Seen>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> Json<Value> {
    let h = |name: header::HeaderName| {
        headers
            .get(name)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string)
    };
    *seen.user_agent.lock().unwrap() = h(header::USER_AGENT);
    *seen.authorization.lock().unwrap() = h(header::AUTHORIZATION);
    *seen.body.lock().unwrap() = Some(body);
    Json(json!({ "data": { "id": "123", "text": "ignored" } }))
}

async fn forbidden() -> (StatusCode, &'static str) {
    (
        StatusCode::FORBIDDEN,
        r#"{"detail":"You are not allowed to create a Tweet with duplicate content."}"#,
    )
}

async fn serve(app: Router) -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    format!("http://{addr}")
}

fn creds() -> OAuth1Credentials {
    OAuth1Credentials {
        consumer_key: "ck".into(),
        consumer_secret: "cs".into(),
        token: "tk".into(),
        token_secret: "ts".into(),
    }
}

#[tokio::test]
async fn publish_sends_identified_signed_request() {
    let seen = Seen::default();
    let app = Router::new()
        .route("/2/tweets", post(create_tweet))
        .with_state(seen.clone());
    let base = serve(app).await;

    let publisher = TwitterPublisher::new(creds())
        .unwrap()
        .with_endpoint(format!("{base}/2/tweets"));
    let id = publisher.publish("Exchange hack").await.unwrap();
    assert_eq!(id, "123");

    let ua = seen.user_agent.lock().unwrap().clone().unwrap();
    assert_eq!(ua, USER_AGENT);
    assert!(ua.starts_with("crypto-ai-newsbot/"));

    let auth = seen.authorization.lock().unwrap().clone().unwrap();
    assert!(auth.starts_with("OAuth "));
    assert!(auth.contains("oauth_consumer_key=\"ck\""));
    assert!(auth.contains("oauth_signature=\""));

    assert_eq!(
        seen.body.lock().unwrap().clone().unwrap(),
        json!({ "text": "Exchange hack" })
    );
}

#[tokio::test]
async fn non_success_status_carries_the_response_body() {
    let app = Router::new().route("/2/tweets", post(forbidden));
    let base = serve(app).await;

    let publisher = TwitterPublisher::new(creds())
        .unwrap()
        .with_endpoint(format!("{base}/2/tweets"));
    let err = publisher.publish("dup").await.unwrap_err().to_string();
    assert!(err.contains("403"), "{err}");
    assert!(err.contains("duplicate content"), "{err}");
}
