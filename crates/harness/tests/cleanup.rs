//! Teardown behaviour against a scripted service

mod common;

use futures::FutureExt;
use petstore_harness::prelude::*;
use serde_json::json;
use std::panic::AssertUnwindSafe;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn provider_for(server: &MockServer) -> ConfigProvider {
    ConfigProvider::from(Config::new(format!("{}/v2", server.uri()), common::API_KEY))
}

async fn accept_user_creation(server: &MockServer) {
    Mock::given(method("POST"))
        .and(path("/v2/user"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({"code": 200, "type": "unknown", "message": "1"})),
        )
        .mount(server)
        .await;
}

#[tokio::test]
async fn test_teardown_deletes_registered_user_exactly_once() {
    common::init_logging();
    let server = MockServer::start().await;
    accept_user_creation(&server).await;
    Mock::given(method("DELETE"))
        .and(path("/v2/user/jdoe123"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({"code": 200, "type": "unknown", "message": "jdoe123"})),
        )
        .expect(1)
        .mount(&server)
        .await;

    let mut ctx = TestContext::setup(&provider_for(&server)).unwrap();
    let user = factory::user_with_username("jdoe123");
    ctx.users().create(&user).await.unwrap().error_for_status().unwrap();
    ctx.track_user("jdoe123");

    let report = ctx.teardown().await;

    assert_eq!(report.attempted, 1);
    assert!(report.is_clean());
    server.verify().await;
}

#[tokio::test]
async fn test_teardown_runs_when_body_panics() {
    common::init_logging();
    let server = MockServer::start().await;
    accept_user_creation(&server).await;
    Mock::given(method("DELETE"))
        .and(path("/v2/user/jdoe123"))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&server)
        .await;

    let provider = provider_for(&server);
    let outcome = AssertUnwindSafe(TestContext::run(&provider, |ctx| {
        Box::pin(async move {
            let user = factory::user_with_username("jdoe123");
            ctx.users().create(&user).await.unwrap();
            ctx.track_user("jdoe123");
            assert!(ctx.tracker().is_empty(), "deliberate assertion failure");
        })
    }))
    .catch_unwind()
    .await;

    assert!(outcome.is_err(), "the body's panic must be re-raised");
    server.verify().await;
}

#[tokio::test]
async fn test_failed_cleanup_does_not_fail_the_test() {
    common::init_logging();
    let server = MockServer::start().await;
    Mock::given(method("DELETE"))
        .and(path("/v2/pet/42"))
        .respond_with(ResponseTemplate::new(500).set_body_string("internal error"))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("DELETE"))
        .and(path("/v2/store/order/7"))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&server)
        .await;

    let result = TestContext::run(&provider_for(&server), |ctx| {
        Box::pin(async move {
            ctx.track_pet(42);
            ctx.track_order(7);
        })
    })
    .await;

    assert!(result.is_ok());
    server.verify().await;
}

#[tokio::test]
async fn test_teardown_report_lists_failures() {
    common::init_logging();
    let server = MockServer::start().await;
    Mock::given(method("DELETE"))
        .and(path("/v2/pet/42"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    let mut ctx = TestContext::setup(&provider_for(&server)).unwrap();
    ctx.track_pet(42);
    let report = ctx.teardown().await;

    assert_eq!(report.failed.len(), 1);
    assert_eq!(report.failed[0].resource, TrackedResource::Pet(42));
    assert!(report.failed[0].reason.contains("500"));
}

#[tokio::test]
async fn test_already_deleted_resource_counts_as_cleaned() {
    common::init_logging();
    let server = MockServer::start().await;
    Mock::given(method("DELETE"))
        .and(path("/v2/user/ghost"))
        .respond_with(ResponseTemplate::new(404))
        .expect(1)
        .mount(&server)
        .await;

    let mut ctx = TestContext::setup(&provider_for(&server)).unwrap();
    ctx.track_user("ghost");
    let report = ctx.teardown().await;

    assert!(report.is_clean());
}

#[tokio::test]
async fn test_setup_fails_without_configuration() {
    let provider = ConfigProvider::new(ConfigSource::new("does-not-exist", "nowhere"));
    let result = TestContext::setup(&provider);
    assert!(matches!(result, Err(HarnessError::Api(ApiError::Config(_)))));
}
