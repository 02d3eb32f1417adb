// tests/http_operation.rs

mod common;
use crate::common::init_tracing;

use std::net::TcpListener;
use std::time::Duration;

use serde_json::json;
use wiremock::matchers::{body_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use readygate::credential::Token;
use readygate::request::{GatedOperation, HttpOperation, RequestError, RequestSettings};
use readygate::types::HttpMethod;

const NOTEBOOK_PATH: &str = "/api/contents/ci-local-writeout.ipynb";

fn settings(url: String, payload: Option<serde_json::Value>) -> RequestSettings {
    RequestSettings {
        method: HttpMethod::Put,
        url,
        auth_scheme: "token".to_string(),
        timeout: Duration::from_secs(5),
        payload,
    }
}

#[tokio::test]
async fn sends_authorization_header_and_json_body() {
    init_tracing();

    let server = MockServer::start().await;
    let token = Token::generate(32).unwrap();
    let payload = json!({
        "type": "notebook",
        "content": { "cells": [], "nbformat": 4, "nbformat_minor": 2 }
    });

    Mock::given(method("PUT"))
        .and(path(NOTEBOOK_PATH))
        .and(header(
            "authorization",
            format!("token {}", token.expose()).as_str(),
        ))
        .and(body_json(&payload))
        .respond_with(ResponseTemplate::new(201).set_body_string(r#"{"name":"ci-local-writeout.ipynb"}"#))
        .expect(1)
        .mount(&server)
        .await;

    let op = HttpOperation::new(settings(
        format!("{}{}", server.uri(), NOTEBOOK_PATH),
        Some(payload),
    ))
    .unwrap();

    let response = op.execute(token).await.unwrap();

    assert_eq!(response.status, 201);
    assert!(response.is_success());
    assert_eq!(response.body, r#"{"name":"ci-local-writeout.ipynb"}"#);
}

#[tokio::test]
async fn custom_scheme_and_method_are_used() {
    init_tracing();

    let server = MockServer::start().await;
    let token = Token::generate(16).unwrap();

    Mock::given(method("POST"))
        .and(path("/hooks/ready"))
        .and(header(
            "authorization",
            format!("Bearer {}", token.expose()).as_str(),
        ))
        .respond_with(ResponseTemplate::new(204))
        .expect(1)
        .mount(&server)
        .await;

    let mut s = settings(format!("{}/hooks/ready", server.uri()), None);
    s.method = HttpMethod::Post;
    s.auth_scheme = "Bearer".to_string();

    let response = HttpOperation::new(s).unwrap().execute(token).await.unwrap();

    assert_eq!(response.status, 204);
    assert!(response.body.is_empty());
}

#[tokio::test]
async fn error_status_is_a_response_not_a_failure() {
    init_tracing();

    let server = MockServer::start().await;
    Mock::given(method("PUT"))
        .respond_with(ResponseTemplate::new(403).set_body_string("Forbidden"))
        .expect(1)
        .mount(&server)
        .await;

    let op = HttpOperation::new(settings(
        format!("{}{}", server.uri(), NOTEBOOK_PATH),
        None,
    ))
    .unwrap();

    let response = op.execute(Token::generate(32).unwrap()).await.unwrap();

    assert_eq!(response.status, 403);
    assert!(!response.is_success());
    assert_eq!(response.body, "Forbidden");
}

#[tokio::test]
async fn refused_connection_is_a_transport_error() {
    init_tracing();

    // Grab a free port, then close it again.
    let port = {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        listener.local_addr().unwrap().port()
    };

    let op = HttpOperation::new(settings(
        format!("http://127.0.0.1:{port}{NOTEBOOK_PATH}"),
        None,
    ))
    .unwrap();

    let err = op.execute(Token::generate(32).unwrap()).await.unwrap_err();

    assert!(
        matches!(err, RequestError::Transport(_)),
        "expected transport error, got {err:?}"
    );
}

#[tokio::test]
async fn slow_service_hits_the_request_timeout() {
    init_tracing();

    let server = MockServer::start().await;
    Mock::given(method("PUT"))
        .respond_with(ResponseTemplate::new(200).set_delay(Duration::from_secs(3)))
        .mount(&server)
        .await;

    let mut s = settings(format!("{}{}", server.uri(), NOTEBOOK_PATH), None);
    s.timeout = Duration::from_millis(200);
    let op = HttpOperation::new(s).unwrap();

    let err = op.execute(Token::generate(32).unwrap()).await.unwrap_err();

    match err {
        RequestError::TimedOut(limit) => assert_eq!(limit, Duration::from_millis(200)),
        other => panic!("expected timeout, got {other:?}"),
    }
}
