use std::sync::Arc;

use actix_web::{test, web, App};
use serde_json::json;
use wiremock::matchers::{body_partial_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use pi_transfer::{MemoryLedger, MemoryTokenStore, PiConfig};
use pi_transfer_server::{routes, AppState};

const SEED: &str = "abandon ability able about above absent absorb abstract absurd abuse access accident";
const DEST: &str = "GDESTINATIONWALLETADDRESS0000000000000001";

fn make_state(server: &MockServer, ledger: &MemoryLedger) -> web::Data<AppState> {
    let config = PiConfig {
        api_base_url: server.uri(),
        client_id: Some("test-client".to_string()),
        client_secret: Some("test-secret".to_string()),
        access_token: Some("tok".to_string()),
        ..PiConfig::default()
    };
    web::Data::new(AppState::with_parts(
        config,
        reqwest::Client::new(),
        Arc::new(MemoryTokenStore::new()),
        Arc::new(ledger.clone()),
    ))
}

async fn mount_balance(server: &MockServer, balance: f64) {
    Mock::given(method("GET"))
        .and(path("/me"))
        .and(header("Authorization", "Bearer tok"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"uid": "u1"})))
        .mount(server)
        .await;
    Mock::given(method("GET"))
        .and(path("/wallet/balance"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({"available_balance": balance})),
        )
        .mount(server)
        .await;
}

async fn received(server: &MockServer) -> usize {
    server.received_requests().await.map(|r| r.len()).unwrap_or(0)
}

#[actix_rt::test]
async fn test_health() {
    let server = MockServer::start().await;
    let state = make_state(&server, &MemoryLedger::new());
    let app = test::init_service(App::new().app_data(state).configure(routes::configure)).await;

    let req = test::TestRequest::get().uri("/health").to_request();
    let resp = test::call_service(&app, req).await;

    assert_eq!(resp.status(), 200);
    let body: serde_json::Value = test::read_body_json(resp).await;
    assert_eq!(body["status"], "ok");
    assert_eq!(body["service"], "pi-transfer-server");
}

#[actix_rt::test]
async fn test_balance_returns_available_balance() {
    let server = MockServer::start().await;
    mount_balance(&server, 7.5).await;
    let state = make_state(&server, &MemoryLedger::new());
    let app = test::init_service(App::new().app_data(state).configure(routes::configure)).await;

    let req = test::TestRequest::post()
        .uri("/balance")
        .set_json(json!({"seed_phrase": SEED}))
        .to_request();
    let resp = test::call_service(&app, req).await;

    assert_eq!(resp.status(), 200);
    let body: serde_json::Value = test::read_body_json(resp).await;
    assert_eq!(body["balance"], 7.5);
}

#[actix_rt::test]
async fn test_balance_requires_seed_phrase() {
    let server = MockServer::start().await;
    let state = make_state(&server, &MemoryLedger::new());
    let app = test::init_service(App::new().app_data(state).configure(routes::configure)).await;

    let req = test::TestRequest::post()
        .uri("/balance")
        .set_json(json!({"seed_phrase": "  "}))
        .to_request();
    let resp = test::call_service(&app, req).await;

    assert_eq!(resp.status(), 400);
    let body: serde_json::Value = test::read_body_json(resp).await;
    assert_eq!(body["error"], "invalid_request");
    assert_eq!(received(&server).await, 0);
}

#[actix_rt::test]
async fn test_expired_token_is_authentication_required() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/me"))
        .respond_with(ResponseTemplate::new(401).set_body_string("token expired"))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/oauth/token"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"access_token": "x"})))
        .expect(0)
        .mount(&server)
        .await;
    let state = make_state(&server, &MemoryLedger::new());
    let app = test::init_service(App::new().app_data(state).configure(routes::configure)).await;

    let req = test::TestRequest::post()
        .uri("/balance")
        .set_json(json!({"seed_phrase": SEED}))
        .to_request();
    let resp = test::call_service(&app, req).await;

    assert_eq!(resp.status(), 401);
    let body: serde_json::Value = test::read_body_json(resp).await;
    assert_eq!(body["error"], "authentication_required");
    server.verify().await;
}

#[actix_rt::test]
async fn test_transfer_prepares_completes_and_logs() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/payments"))
        .and(body_partial_json(json!({"amount": 2.5, "recipient": DEST, "memo": "rent"})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"payment_id": "pay_9"})))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/payments/pay_9/complete"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"txid": "t9"})))
        .expect(1)
        .mount(&server)
        .await;
    let ledger = MemoryLedger::new();
    let state = make_state(&server, &ledger);
    let app = test::init_service(App::new().app_data(state).configure(routes::configure)).await;

    let req = test::TestRequest::post()
        .uri("/transfer")
        .set_json(json!({
            "seed_phrase": SEED,
            "destination_wallet": DEST,
            "amount": 2.5,
            "memo": "rent",
        }))
        .to_request();
    let resp = test::call_service(&app, req).await;

    assert_eq!(resp.status(), 200);
    let body: serde_json::Value = test::read_body_json(resp).await;
    assert_eq!(body["payment_id"], "pay_9");
    assert_eq!(body["result"]["txid"], "t9");

    let entries = ledger.entries();
    assert_eq!(entries.len(), 1);
    assert!(entries[0].success);
    assert_eq!(entries[0].destination_wallet.as_deref(), Some(DEST));
    server.verify().await;
}

#[actix_rt::test]
async fn test_transfer_validation_never_reaches_provider() {
    let server = MockServer::start().await;
    let state = make_state(&server, &MemoryLedger::new());
    let app = test::init_service(App::new().app_data(state).configure(routes::configure)).await;

    let bad_bodies = [
        json!({"destination_wallet": DEST, "amount": 1.0}),
        json!({"seed_phrase": SEED, "destination_wallet": "short", "amount": 1.0}),
        json!({"seed_phrase": SEED, "destination_wallet": DEST, "amount": 0.05}),
        json!({"seed_phrase": SEED, "destination_wallet": DEST}),
    ];
    for body in bad_bodies {
        let req = test::TestRequest::post()
            .uri("/transfer")
            .set_json(&body)
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), 400, "body: {body}");
    }

    let req = test::TestRequest::post()
        .uri("/transfer")
        .set_payload("{not json")
        .insert_header(("Content-Type", "application/json"))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), 400);
    let body: serde_json::Value = test::read_body_json(resp).await;
    assert_eq!(body["error"], "invalid_request");

    assert_eq!(received(&server).await, 0);
}

#[actix_rt::test]
async fn test_transfer_upstream_failure_is_bad_gateway() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/payments"))
        .respond_with(ResponseTemplate::new(500).set_body_string("boom"))
        .mount(&server)
        .await;
    let ledger = MemoryLedger::new();
    let state = make_state(&server, &ledger);
    let app = test::init_service(App::new().app_data(state).configure(routes::configure)).await;

    let req = test::TestRequest::post()
        .uri("/transfer")
        .set_json(json!({"seed_phrase": SEED, "destination_wallet": DEST, "amount": 1.0}))
        .to_request();
    let resp = test::call_service(&app, req).await;

    assert_eq!(resp.status(), 502);
    let body: serde_json::Value = test::read_body_json(resp).await;
    assert_eq!(body["error"], "upstream_rejected");
    // nothing was completed, so nothing is logged
    assert!(ledger.entries().is_empty());
}
