//! Two-call protocol against a mock rendering service.

use std::time::Duration;

use wiremock::matchers::{body_string, header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};
use wsd_core::{RenderRequest, Style};
use wsd_renderer::{ClientConfig, DiagramRenderClient, RenderClient, RenderError, Stage};

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn client_for(server: &MockServer) -> DiagramRenderClient {
    DiagramRenderClient::new(ClientConfig::with_base_url(server.uri())).expect("client")
}

fn request() -> RenderRequest {
    RenderRequest::new("A->B: hello", Style::Napkin, "png")
}

async fn mount_submit(server: &MockServer, response: ResponseTemplate) {
    Mock::given(method("POST"))
        .and(path("/index.php"))
        .respond_with(response)
        .expect(1)
        .mount(server)
        .await;
}

async fn mount_fetch(server: &MockServer, response: ResponseTemplate, times: u64) {
    Mock::given(method("GET"))
        .and(path("/"))
        .and(query_param("png", "mscKTO107"))
        .respond_with(response)
        .expect(times)
        .mount(server)
        .await;
}

// ---------------------------------------------------------------------------
// Success
// ---------------------------------------------------------------------------

#[tokio::test]
async fn render_submits_form_then_fetches_image() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/index.php"))
        .and(header("content-type", "application/x-www-form-urlencoded"))
        .and(body_string(
            "style=napkin&apiVersion=1&format=png&message=A-%3EB%3A%20hello",
        ))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_string(r#"{"img": "?png=mscKTO107", "errors": []}"#),
        )
        .expect(1)
        .mount(&server)
        .await;
    mount_fetch(
        &server,
        ResponseTemplate::new(200).set_body_bytes(b"\x89PNG fake".to_vec()),
        1,
    )
    .await;

    let bytes = client_for(&server).render(&request()).await.expect("render");
    assert_eq!(bytes, b"\x89PNG fake");
}

#[tokio::test]
async fn render_tolerates_service_warnings() {
    let server = MockServer::start().await;
    mount_submit(
        &server,
        ResponseTemplate::new(200).set_body_string(
            r#"{"img": "?png=mscKTO107", "errors": ["Line 2: Syntax error."], "version": 3}"#,
        ),
    )
    .await;
    mount_fetch(&server, ResponseTemplate::new(200).set_body_bytes(vec![1, 2, 3]), 1).await;

    let bytes = client_for(&server).render(&request()).await.expect("render");
    assert_eq!(bytes, vec![1, 2, 3]);
}

// ---------------------------------------------------------------------------
// Protocol errors
// ---------------------------------------------------------------------------

#[tokio::test]
async fn missing_handle_fails_without_fetching() {
    let server = MockServer::start().await;
    mount_submit(
        &server,
        ResponseTemplate::new(200).set_body_string(r#"{"errors": []}"#),
    )
    .await;
    mount_fetch(&server, ResponseTemplate::new(200), 0).await;

    let err = client_for(&server).render(&request()).await.unwrap_err();
    assert!(
        matches!(err, RenderError::Protocol { stage: Stage::Submit, .. }),
        "got: {err:?}"
    );
}

#[tokio::test]
async fn submit_error_status_is_protocol_error() {
    let server = MockServer::start().await;
    mount_submit(&server, ResponseTemplate::new(417)).await;
    mount_fetch(&server, ResponseTemplate::new(200), 0).await;

    let err = client_for(&server).render(&request()).await.unwrap_err();
    match err {
        RenderError::Protocol { stage, message } => {
            assert_eq!(stage, Stage::Submit);
            assert!(message.contains("417"), "got: {message}");
        }
        other => panic!("expected protocol error, got {other:?}"),
    }
}

#[tokio::test]
async fn fetch_error_status_is_protocol_error() {
    let server = MockServer::start().await;
    mount_submit(
        &server,
        ResponseTemplate::new(200).set_body_string(r#"{"img": "?png=mscKTO107"}"#),
    )
    .await;
    mount_fetch(&server, ResponseTemplate::new(404), 1).await;

    let err = client_for(&server).render(&request()).await.unwrap_err();
    assert!(
        matches!(err, RenderError::Protocol { stage: Stage::Fetch, .. }),
        "got: {err:?}"
    );
}

// ---------------------------------------------------------------------------
// Transport errors
// ---------------------------------------------------------------------------

#[tokio::test]
async fn unreachable_service_is_unavailable() {
    let uri = {
        let server = MockServer::start().await;
        server.uri()
    };
    let config = ClientConfig {
        timeout: Some(Duration::from_secs(5)),
        ..ClientConfig::with_base_url(uri)
    };
    let client = DiagramRenderClient::new(config).expect("client");

    let err = client.render(&request()).await.unwrap_err();
    assert!(
        matches!(err, RenderError::Unavailable { stage: Stage::Submit, .. }),
        "got: {err:?}"
    );
}

#[tokio::test]
async fn slow_service_times_out_as_unavailable() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_string(r#"{"img": "?png=mscKTO107"}"#)
                .set_delay(Duration::from_secs(2)),
        )
        .mount(&server)
        .await;

    let config = ClientConfig {
        timeout: Some(Duration::from_millis(100)),
        ..ClientConfig::with_base_url(server.uri())
    };
    let client = DiagramRenderClient::new(config).expect("client");

    let err = client.render(&request()).await.unwrap_err();
    assert!(matches!(err, RenderError::Unavailable { .. }), "got: {err:?}");
}
