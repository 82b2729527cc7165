//! End-to-end HTTP tests against the real router wired to a real Postgres
//! pool — not a fake. Requires a reachable, already-migrated database (see
//! `DbConfig`'s env vars: `DB_HOST`, `DB_PORT`, `DB_USERNAME`, `DB_PASSWORD`,
//! `DB_NAME`) plus `JWT_SECRET`/`BARCODE_SECRET`. Schema provisioning lives
//! outside this crate (`AppConfig::synchronize`'s doc comment), so these
//! tests are `#[ignore]`d by default; run with
//! `cargo test -- --ignored` against a provisioned test database.

use std::sync::Arc;

use chrono::Utc;
use reqwest::StatusCode;
use serde_json::json;

use bbqjudge_auth::roles::Role;
use bbqjudge_auth::user::{User, UserRepository};
use bbqjudge_infra::auth::PgUserRepository;
use bbqjudge_infra::config::AppConfig;

struct TestServer {
    base_url: String,
    pool: Arc<sqlx::PgPool>,
    handle: tokio::task::JoinHandle<()>,
}

impl TestServer {
    async fn spawn() -> Self {
        std::env::set_var("JWT_SECRET", "test-jwt-secret-test-jwt-secret");
        std::env::set_var("BARCODE_SECRET", "test-barcode-secret");
        std::env::set_var("PORT", "0");

        let config = AppConfig::from_env().expect("DB_*/JWT_SECRET/BARCODE_SECRET must be set");
        let pool = Arc::new(bbqjudge_infra::db::connect(&config.db).await.expect("failed to connect to test database"));

        let app = bbqjudge_api::app::build_app(config).await.expect("failed to build app");
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.expect("failed to bind ephemeral port");
        let addr = listener.local_addr().unwrap();
        let base_url = format!("http://{addr}");

        let handle = tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        Self { base_url, pool, handle }
    }

    async fn seed_user(&self, username: &str, password: &str, role: Role) -> User {
        let repo = PgUserRepository::new(self.pool.clone());
        let user = User::register(username, password, role, Utc::now()).unwrap();
        repo.create(user).await.unwrap()
    }
}

impl Drop for TestServer {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

async fn login(client: &reqwest::Client, base_url: &str, username: &str, password: &str) -> String {
    let res = client
        .post(format!("{base_url}/auth/login"))
        .json(&json!({ "username": username, "password": password }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    let body: serde_json::Value = res.json().await.unwrap();
    body["data"]["accessToken"].as_str().unwrap().to_string()
}

#[tokio::test]
#[ignore = "requires a live, migrated Postgres database"]
async fn health_probe_is_public() {
    let srv = TestServer::spawn().await;
    let client = reqwest::Client::new();

    let res = client.get(format!("{}/health", srv.base_url)).send().await.unwrap();
    assert_eq!(res.status(), StatusCode::OK);
}

#[tokio::test]
#[ignore = "requires a live, migrated Postgres database"]
async fn protected_routes_reject_missing_token() {
    let srv = TestServer::spawn().await;
    let client = reqwest::Client::new();

    let res = client.get(format!("{}/events", srv.base_url)).send().await.unwrap();
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
#[ignore = "requires a live, migrated Postgres database"]
async fn admin_can_create_and_fetch_an_event() {
    let srv = TestServer::spawn().await;
    srv.seed_user("admin_create_event", "correct horse battery", Role::Admin).await;
    let client = reqwest::Client::new();
    let token = login(&client, &srv.base_url, "admin_create_event", "correct horse battery").await;

    let res = client
        .post(format!("{}/events", srv.base_url))
        .bearer_auth(&token)
        .json(&json!({
            "name": "Smoketown Cookoff",
            "date": "2026-09-12",
            "location": "Smoketown Fairgrounds",
            "scale": { "min": "0", "max": "10", "step": "0.5" },
            "aggregationMethod": "mean",
        }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::CREATED);
    let created: serde_json::Value = res.json().await.unwrap();
    let id = created["data"]["id"].as_str().unwrap().to_string();

    let res = client.get(format!("{}/events/{}", srv.base_url, id)).bearer_auth(&token).send().await.unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    let fetched: serde_json::Value = res.json().await.unwrap();
    assert_eq!(fetched["data"]["name"], "Smoketown Cookoff");
}

#[tokio::test]
#[ignore = "requires a live, migrated Postgres database"]
async fn operator_cannot_create_events() {
    let srv = TestServer::spawn().await;
    srv.seed_user("operator_create_event", "correct horse battery", Role::Operator).await;
    let client = reqwest::Client::new();
    let token = login(&client, &srv.base_url, "operator_create_event", "correct horse battery").await;

    let res = client
        .post(format!("{}/events", srv.base_url))
        .bearer_auth(&token)
        .json(&json!({
            "name": "Should Be Rejected",
            "date": "2026-09-12",
            "location": null,
            "scale": { "min": "0", "max": "10", "step": "0.5" },
            "aggregationMethod": "mean",
        }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::FORBIDDEN);
}

#[tokio::test]
#[ignore = "requires a live, migrated Postgres database"]
async fn operator_patch_touching_non_status_field_is_rejected() {
    let srv = TestServer::spawn().await;
    srv.seed_user("admin_for_patch", "correct horse battery", Role::Admin).await;
    srv.seed_user("operator_for_patch", "correct horse battery", Role::Operator).await;
    let client = reqwest::Client::new();
    let admin_token = login(&client, &srv.base_url, "admin_for_patch", "correct horse battery").await;
    let operator_token = login(&client, &srv.base_url, "operator_for_patch", "correct horse battery").await;

    let res = client
        .post(format!("{}/events", srv.base_url))
        .bearer_auth(&admin_token)
        .json(&json!({
            "name": "Patch Scope Test",
            "date": "2026-09-12",
            "location": null,
            "scale": { "min": "0", "max": "10", "step": "0.5" },
            "aggregationMethod": "mean",
        }))
        .send()
        .await
        .unwrap();
    let created: serde_json::Value = res.json().await.unwrap();
    let id = created["data"]["id"].as_str().unwrap().to_string();

    // Status-only PATCH: allowed for an operator.
    let res = client
        .patch(format!("{}/events/{}", srv.base_url, id))
        .bearer_auth(&operator_token)
        .json(&json!({ "status": "active" }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);

    // Mixing `status` with any other field: rejected outright.
    let res = client
        .patch(format!("{}/events/{}", srv.base_url, id))
        .bearer_auth(&operator_token)
        .json(&json!({ "status": "finalized", "name": "Renamed By Operator" }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::FORBIDDEN);
}

#[tokio::test]
#[ignore = "requires a live, migrated Postgres database"]
async fn seat_token_flow_and_score_authorship() {
    let srv = TestServer::spawn().await;
    srv.seed_user("admin_for_seats", "correct horse battery", Role::Admin).await;
    let client = reqwest::Client::new();
    let admin_token = login(&client, &srv.base_url, "admin_for_seats", "correct horse battery").await;

    let event: serde_json::Value = client
        .post(format!("{}/events", srv.base_url))
        .bearer_auth(&admin_token)
        .json(&json!({
            "name": "Seat Token Test",
            "date": "2026-09-12",
            "location": null,
            "scale": { "min": "0", "max": "10", "step": "0.5" },
            "aggregationMethod": "mean",
        }))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    let event_id = event["data"]["id"].as_str().unwrap();

    let table: serde_json::Value = client
        .post(format!("{}/events/{}/tables", srv.base_url, event_id))
        .bearer_auth(&admin_token)
        .json(&json!({ "tableNumber": 1 }))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    let table_id = table["data"]["id"].as_str().unwrap();
    let qr_token = table["data"]["qrToken"].as_str().unwrap();

    let seat: serde_json::Value = client
        .post(format!("{}/tables/{}/seats", srv.base_url, table_id))
        .bearer_auth(&admin_token)
        .json(&json!({ "seatNumber": 1 }))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(seat["data"]["seatNumber"], 1);

    let seat_token_res = client
        .post(format!("{}/auth/seat-token", srv.base_url))
        .json(&json!({ "qrToken": qr_token, "seatNumber": 1 }))
        .send()
        .await
        .unwrap();
    assert_eq!(seat_token_res.status(), StatusCode::OK);
    let seat_auth: serde_json::Value = seat_token_res.json().await.unwrap();
    let seat_access_token = seat_auth["data"]["accessToken"].as_str().unwrap();

    // An admin may never author a score; only a seat can.
    let category: serde_json::Value = client
        .post(format!("{}/events/{}/categories", srv.base_url, event_id))
        .bearer_auth(&admin_token)
        .json(&json!({ "name": "Ribs", "sortOrder": 1 }))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    let category_id = category["data"]["id"].as_str().unwrap();

    let team: serde_json::Value = client
        .post(format!("{}/events/{}/teams", srv.base_url, event_id))
        .bearer_auth(&admin_token)
        .json(&json!({ "name": "Smoke Signals", "teamNumber": 1 }))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    let team_id = team["data"]["id"].as_str().unwrap();

    let submission: serde_json::Value = client
        .post(format!("{}/categories/{}/submissions", srv.base_url, category_id))
        .bearer_auth(&admin_token)
        .json(&json!({ "teamId": team_id }))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    let submission_id = submission["data"]["id"].as_str().unwrap();

    let criterion: serde_json::Value = client
        .post(format!("{}/events/{}/criteria", srv.base_url, event_id))
        .bearer_auth(&admin_token)
        .json(&json!({ "name": "Tenderness", "weight": "1.0", "sortOrder": 1 }))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    let criterion_id = criterion["data"]["id"].as_str().unwrap();

    let res = client
        .post(format!("{}/submissions/{}/scores", srv.base_url, submission_id))
        .bearer_auth(&admin_token)
        .json(&json!({ "criterionId": criterion_id, "phase": "appearance", "scoreValue": "8" }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);

    let res = client
        .post(format!("{}/submissions/{}/scores", srv.base_url, submission_id))
        .bearer_auth(seat_access_token)
        .json(&json!({ "criterionId": criterion_id, "phase": "appearance", "scoreValue": "8" }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::CREATED);
}
