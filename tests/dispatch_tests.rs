// Route dispatcher tests
// Author: kelexine (https://github.com/kelexine)

use bytes::Bytes;
use futures::StreamExt;
use http::header::{HeaderMap, HeaderValue, AUTHORIZATION};
use http::{Method, StatusCode};
use infradash::config::UpstreamConfig;
use infradash::dispatch::{dispatch, AuthConfig, ProxyState};
use infradash::exchange::{BodySource, CanonicalRequest, CanonicalResponse, ResponseBody};
use infradash::relay::UpstreamRelay;
use infradash::runtime::RuntimeKind;
use url::Url;

fn state(upstream_url: &str, token: Option<&str>, runtime: RuntimeKind) -> ProxyState {
    ProxyState {
        runtime,
        auth: AuthConfig {
            token: token.map(str::to_string),
        },
        relay: UpstreamRelay::new(&UpstreamConfig {
            chat_completions_url: upstream_url.to_string(),
        })
        .unwrap(),
    }
}

fn request(method: Method, path: &str, auth: Option<&str>, body: BodySource) -> CanonicalRequest {
    let mut headers = HeaderMap::new();
    if let Some(value) = auth {
        headers.insert(AUTHORIZATION, HeaderValue::from_str(value).unwrap());
    }
    CanonicalRequest::new(
        method,
        Url::parse(&format!("http://localhost{path}")).unwrap(),
        headers,
        body,
    )
}

async fn body_bytes(response: CanonicalResponse) -> Bytes {
    let (_, _, body) = response.into_parts();
    match body {
        ResponseBody::Empty => Bytes::new(),
        ResponseBody::Full(bytes) => bytes,
        ResponseBody::Stream(mut stream) => {
            let mut out = Vec::new();
            while let Some(chunk) = stream.next().await {
                out.extend_from_slice(&chunk.unwrap());
            }
            Bytes::from(out)
        }
    }
}

#[tokio::test]
async fn test_options_bypasses_auth_on_any_path() {
    let state = state("http://127.0.0.1:1/unused", Some("secret"), RuntimeKind::Standalone);

    for path in ["/", "/v1/models", "/v1/chat/completions", "/anything"] {
        let response = dispatch(
            request(Method::OPTIONS, path, None, BodySource::Empty),
            &state,
        )
        .await;
        assert_eq!(response.status(), StatusCode::NO_CONTENT);
        let headers = response.header_map();
        assert_eq!(headers.get("access-control-allow-origin").unwrap(), "*");
        assert_eq!(
            headers.get("access-control-allow-methods").unwrap(),
            "POST, GET, OPTIONS"
        );
        assert_eq!(
            headers.get("access-control-allow-headers").unwrap(),
            "Content-Type, Authorization"
        );
        assert_eq!(headers.get("access-control-max-age").unwrap(), "86400");
        assert!(body_bytes(response).await.is_empty());
    }
}

#[tokio::test]
async fn test_model_listing_requires_matching_bearer() {
    let state = state("http://127.0.0.1:1/unused", Some("secret"), RuntimeKind::Standalone);

    let ok = dispatch(
        request(
            Method::GET,
            "/v1/models",
            Some("Bearer secret"),
            BodySource::Empty,
        ),
        &state,
    )
    .await;
    assert_eq!(ok.status(), StatusCode::OK);
    let listing: serde_json::Value = serde_json::from_slice(&body_bytes(ok).await).unwrap();
    assert_eq!(listing["object"], "list");
    assert_eq!(listing["data"].as_array().unwrap().len(), 7);
    assert_eq!(listing["data"][0]["id"], "openai/gpt-oss-120b");

    for auth in [None, Some("Bearer wrong"), Some("secret")] {
        let denied = dispatch(
            request(Method::GET, "/v1/models", auth, BodySource::Empty),
            &state,
        )
        .await;
        assert_eq!(denied.status(), StatusCode::UNAUTHORIZED);
        let body: serde_json::Value =
            serde_json::from_slice(&body_bytes(denied).await).unwrap();
        assert_eq!(body["error"], "Unauthorized");
    }
}

#[tokio::test]
async fn test_model_listing_open_when_no_token_configured() {
    let state = state("http://127.0.0.1:1/unused", None, RuntimeKind::Standalone);

    for auth in [None, Some("Bearer anything")] {
        let response = dispatch(
            request(Method::GET, "/v1/models", auth, BodySource::Empty),
            &state,
        )
        .await;
        assert_eq!(response.status(), StatusCode::OK);
    }
}

#[tokio::test]
async fn test_model_listing_is_idempotent() {
    let state = state("http://127.0.0.1:1/unused", None, RuntimeKind::Standalone);

    let first = body_bytes(
        dispatch(
            request(Method::GET, "/v1/models", None, BodySource::Empty),
            &state,
        )
        .await,
    )
    .await;
    let second = body_bytes(
        dispatch(
            request(Method::GET, "/v1/models", None, BodySource::Empty),
            &state,
        )
        .await,
    )
    .await;
    assert_eq!(first, second);
}

#[tokio::test]
async fn test_health_skips_auth_and_reports_runtime() {
    let state = state("http://127.0.0.1:1/unused", Some("secret"), RuntimeKind::SocketServer);

    let response = dispatch(request(Method::GET, "/", None, BodySource::Empty), &state).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert!(response
        .header_map()
        .contains_key("access-control-allow-origin"));

    let health: serde_json::Value = serde_json::from_slice(&body_bytes(response).await).unwrap();
    assert_eq!(health["status"], "ok");
    assert_eq!(health["environment"], "socket-server");
    assert!(!health["timestamp"].as_str().unwrap().is_empty());
    assert!(!health["message"].as_str().unwrap().is_empty());
}

#[tokio::test]
async fn test_non_post_methods_are_rejected() {
    let state = state("http://127.0.0.1:1/unused", None, RuntimeKind::Standalone);

    let cases = [
        (Method::GET, "/v1/chat/completions"),
        (Method::GET, "/unknown"),
        (Method::DELETE, "/v1/models"),
        (Method::PUT, "/"),
    ];
    for (method, path) in cases {
        let response = dispatch(request(method, path, None, BodySource::Empty), &state).await;
        assert_eq!(response.status(), StatusCode::METHOD_NOT_ALLOWED);
        let body: serde_json::Value =
            serde_json::from_slice(&body_bytes(response).await).unwrap();
        assert_eq!(body["error"], "Method not allowed");
    }
}

#[tokio::test]
async fn test_post_proxies_any_path_upstream() {
    let mut server = mockito::Server::new_async().await;
    let upstream = server
        .mock("POST", "/v1/openai/chat/completions")
        .with_status(201)
        .with_header("content-type", "application/json")
        .with_body("{\"id\":\"cmpl-1\",\"object\":\"chat.completion\"}")
        .expect(2)
        .create_async()
        .await;

    let state = state(
        &format!("{}/v1/openai/chat/completions", server.url()),
        None,
        RuntimeKind::Standalone,
    );

    // The canonical chat path and a typo'd path both proxy.
    for path in ["/v1/chat/completions", "/v1/chat/competions"] {
        let response = dispatch(
            request(
                Method::POST,
                path,
                None,
                BodySource::Buffered(Bytes::from_static(
                    b"{\"model\":\"zai-org/GLM-4.5\",\"messages\":[]}",
                )),
            ),
            &state,
        )
        .await;
        assert_eq!(response.status(), StatusCode::CREATED);
        assert_eq!(
            body_bytes(response).await,
            Bytes::from_static(b"{\"id\":\"cmpl-1\",\"object\":\"chat.completion\"}")
        );
    }

    upstream.assert_async().await;
}

#[tokio::test]
async fn test_post_requires_auth_when_token_configured() {
    let state = state("http://127.0.0.1:1/unused", Some("secret"), RuntimeKind::Standalone);

    let response = dispatch(
        request(
            Method::POST,
            "/v1/chat/completions",
            Some("Bearer wrong"),
            BodySource::Buffered(Bytes::from_static(b"{}")),
        ),
        &state,
    )
    .await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_post_with_invalid_json_returns_500() {
    let state = state("http://127.0.0.1:1/unused", None, RuntimeKind::Standalone);

    let response = dispatch(
        request(
            Method::POST,
            "/v1/chat/completions",
            None,
            BodySource::Buffered(Bytes::from_static(b"this is not json")),
        ),
        &state,
    )
    .await;
    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let body: serde_json::Value = serde_json::from_slice(&body_bytes(response).await).unwrap();
    assert!(!body["error"].as_str().unwrap().is_empty());
}

#[tokio::test]
async fn test_upstream_network_failure_returns_500() {
    // Nothing listens on port 1; the connect fails immediately.
    let state = state(
        "http://127.0.0.1:1/v1/openai/chat/completions",
        None,
        RuntimeKind::Standalone,
    );

    let response = dispatch(
        request(
            Method::POST,
            "/v1/chat/completions",
            None,
            BodySource::Buffered(Bytes::from_static(b"{\"messages\":[]}")),
        ),
        &state,
    )
    .await;
    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let body: serde_json::Value = serde_json::from_slice(&body_bytes(response).await).unwrap();
    assert!(!body["error"].as_str().unwrap().is_empty());
}
