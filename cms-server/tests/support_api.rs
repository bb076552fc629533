mod common;

use std::sync::atomic::Ordering;
use std::time::Duration;

use actix_web::{test, App};
use serde_json::json;

fn ticket_payload() -> serde_json::Value {
    json!({
        "name": "Dana",
        "email": "dana@example.com",
        "subject": "Broken image",
        "message": "The header image does not load."
    })
}

#[actix_rt::test]
async fn ticket_creation_returns_the_id_and_sends_both_emails() {
    let deps = common::TestDeps::new();
    let app = test::init_service(App::new().configure(common::configure_app(&deps))).await;

    let req = test::TestRequest::post()
        .uri("/api/support")
        .set_json(ticket_payload())
        .to_request();
    let resp = test::call_service(&app, req).await;

    assert_eq!(resp.status(), 201);
    let body: serde_json::Value = test::read_body_json(resp).await;
    assert!(body["ticket_id"].as_i64().unwrap() > 0);
    assert!(body["message"]
        .as_str()
        .unwrap()
        .contains("submitted successfully"));

    // Notifications are dispatched off the request path
    tokio::time::sleep(Duration::from_millis(50)).await;
    assert_eq!(deps.notifier.opened.load(Ordering::SeqCst), 1);
    assert_eq!(deps.notifier.confirmations.load(Ordering::SeqCst), 1);
}

#[actix_rt::test]
async fn ticket_survives_a_notifier_outage() {
    let deps = common::TestDeps::new();
    let app = test::init_service(App::new().configure(common::configure_app(&deps))).await;

    deps.notifier.fail.store(true, Ordering::SeqCst);

    let req = test::TestRequest::post()
        .uri("/api/support")
        .set_json(ticket_payload())
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), 201);
    let body: serde_json::Value = test::read_body_json(resp).await;
    let ticket_id = body["ticket_id"].as_i64().unwrap();

    tokio::time::sleep(Duration::from_millis(50)).await;

    // The ticket is persisted regardless of the failed emails
    let token = deps.token_for(1, "operator");
    let req = test::TestRequest::get()
        .uri("/api/support")
        .insert_header(common::bearer(&token))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), 200);
    let tickets: serde_json::Value = test::read_body_json(resp).await;
    let tickets = tickets.as_array().unwrap();
    assert_eq!(tickets.len(), 1);
    assert_eq!(tickets[0]["id"].as_i64().unwrap(), ticket_id);
    assert_eq!(tickets[0]["status"], "open");
    assert_eq!(deps.notifier.opened.load(Ordering::SeqCst), 0);
}

#[actix_rt::test]
async fn listing_tickets_requires_a_token() {
    let deps = common::TestDeps::new();
    let app = test::init_service(App::new().configure(common::configure_app(&deps))).await;

    let req = test::TestRequest::get().uri("/api/support").to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), 401);
}

#[actix_rt::test]
async fn blank_fields_are_rejected() {
    let deps = common::TestDeps::new();
    let app = test::init_service(App::new().configure(common::configure_app(&deps))).await;

    let req = test::TestRequest::post()
        .uri("/api/support")
        .set_json(json!({
            "name": "Dana",
            "email": "dana@example.com",
            "subject": "  ",
            "message": "hello"
        }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), 400);
}
