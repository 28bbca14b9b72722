// tests/api_tests.rs

use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;
use tourhub::{config::Config, routes, state::AppState};

/// Spawns the app on a random port against the database from DATABASE_URL.
/// Returns None (and the test is skipped) when no database is configured.
async fn spawn_app() -> Option<(String, PgPool)> {
    let Ok(database_url) = std::env::var("DATABASE_URL") else {
        eprintln!("DATABASE_URL not set; skipping integration test");
        return None;
    };

    let pool = PgPoolOptions::new()
        .max_connections(2)
        .connect(&database_url)
        .await
        .expect("Failed to connect to Postgres for testing.");

    sqlx::migrate!("./migrations")
        .run(&pool)
        .await
        .expect("Failed to migrate database");

    let upload_dir = std::env::temp_dir()
        .join(format!("tourhub_test_uploads_{}", uuid::Uuid::new_v4()))
        .to_str()
        .unwrap()
        .to_string();

    let config = Config {
        database_url: database_url.clone(),
        jwt_secret: "test_secret_for_integration_tests".to_string(),
        jwt_expiration: 600,
        rust_log: "error".to_string(),
        upload_dir,
        admin_username: None,
        admin_password: None,
    };

    let state = AppState {
        pool: pool.clone(),
        config,
    };

    let app = routes::create_router(state);

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("Failed to bind random port");

    let port = listener.local_addr().unwrap().port();
    let address = format!("http://127.0.0.1:{}", port);

    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    Some((address, pool))
}

fn unique_name(prefix: &str) -> String {
    format!("{}_{}", prefix, &uuid::Uuid::new_v4().to_string()[..8])
}

async fn register(client: &reqwest::Client, address: &str, role: &str, username: &str) -> reqwest::Response {
    client
        .post(format!("{}/api/auth/register", address))
        .json(&serde_json::json!({
            "role": role,
            "username": username,
            "password": "password123",
            "full_name": "Test User",
            "phone": "+91 9876543210",
            "email": "test@example.com"
        }))
        .send()
        .await
        .expect("Failed to execute register request")
}

async fn login(client: &reqwest::Client, address: &str, role: &str, username: &str) -> serde_json::Value {
    client
        .post(format!("{}/api/auth/login", address))
        .json(&serde_json::json!({
            "role": role,
            "username": username,
            "password": "password123"
        }))
        .send()
        .await
        .expect("Login request failed")
        .json::<serde_json::Value>()
        .await
        .expect("Failed to parse login json")
}

#[tokio::test]
async fn health_check_404() {
    let Some((address, _pool)) = spawn_app().await else { return };
    let client = reqwest::Client::new();

    let response = client
        .get(format!("{}/random_path_that_does_not_exist", address))
        .send()
        .await
        .expect("Failed to execute request");

    assert_eq!(response.status().as_u16(), 404);
}

#[tokio::test]
async fn register_and_login_tourist_with_empty_dashboard() {
    let Some((address, _pool)) = spawn_app().await else { return };
    let client = reqwest::Client::new();
    let username = unique_name("alice");

    let response = register(&client, &address, "tourist", &username).await;
    assert_eq!(response.status().as_u16(), 201);

    let login_resp = login(&client, &address, "tourist", &username).await;
    let token = login_resp["token"].as_str().expect("Token not found");
    assert_eq!(login_resp["user"]["role"], "tourist");

    let bookings = client
        .get(format!("{}/api/tourist/bookings", address))
        .bearer_auth(token)
        .send()
        .await
        .unwrap();
    assert_eq!(bookings.status().as_u16(), 200);

    let bookings: Vec<serde_json::Value> = bookings.json().await.unwrap();
    assert!(bookings.is_empty());
}

#[tokio::test]
async fn duplicate_username_is_rejected_across_roles() {
    let Some((address, pool)) = spawn_app().await else { return };
    let client = reqwest::Client::new();
    let username = unique_name("dup");

    assert_eq!(register(&client, &address, "tourist", &username).await.status().as_u16(), 201);

    // Same username again, even under a different role, is a conflict.
    let second = register(&client, &address, "guide", &username).await;
    assert_eq!(second.status().as_u16(), 409);

    // And nothing extra was written.
    let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM users WHERE username = $1")
        .bind(&username)
        .fetch_one(&pool)
        .await
        .unwrap();
    assert_eq!(count, 1);
}

#[tokio::test]
async fn register_fails_validation() {
    let Some((address, _pool)) = spawn_app().await else { return };
    let client = reqwest::Client::new();

    // Username too short
    let response = register(&client, &address, "tourist", "yo").await;
    assert_eq!(response.status().as_u16(), 400);
}

#[tokio::test]
async fn admin_registration_is_rejected() {
    let Some((address, _pool)) = spawn_app().await else { return };
    let client = reqwest::Client::new();

    let response = register(&client, &address, "admin", &unique_name("boss")).await;
    assert_eq!(response.status().as_u16(), 400);
}

#[tokio::test]
async fn login_with_wrong_password_or_unknown_user_is_generic() {
    let Some((address, _pool)) = spawn_app().await else { return };
    let client = reqwest::Client::new();
    let username = unique_name("carol");

    register(&client, &address, "tourist", &username).await;

    let wrong_pw = client
        .post(format!("{}/api/auth/login", address))
        .json(&serde_json::json!({
            "role": "tourist", "username": username, "password": "wrong"
        }))
        .send()
        .await
        .unwrap();
    assert_eq!(wrong_pw.status().as_u16(), 401);
    let wrong_pw: serde_json::Value = wrong_pw.json().await.unwrap();

    let unknown = client
        .post(format!("{}/api/auth/login", address))
        .json(&serde_json::json!({
            "role": "tourist", "username": unique_name("ghost"), "password": "password123"
        }))
        .send()
        .await
        .unwrap();
    assert_eq!(unknown.status().as_u16(), 401);
    let unknown: serde_json::Value = unknown.json().await.unwrap();

    // No username enumeration: identical message either way.
    assert_eq!(wrong_pw["message"], unknown["message"]);
}

#[tokio::test]
async fn guide_registration_creates_default_profile() {
    let Some((address, _pool)) = spawn_app().await else { return };
    let client = reqwest::Client::new();
    let username = unique_name("bob");

    assert_eq!(register(&client, &address, "guide", &username).await.status().as_u16(), 201);

    let login_resp = login(&client, &address, "guide", &username).await;
    let token = login_resp["token"].as_str().unwrap();

    let profile = client
        .get(format!("{}/api/guide/profile", address))
        .bearer_auth(token)
        .send()
        .await
        .unwrap();
    assert_eq!(profile.status().as_u16(), 200);

    let profile: serde_json::Value = profile.json().await.unwrap();
    let content = &profile["content"];
    assert_eq!(content["specialization"], "General Tourism");
    assert_eq!(content["price_per_day"], 2000.0);
    assert_eq!(content["availability_status"], "available");
    assert_eq!(content["experience_years"], 1);
}

#[tokio::test]
async fn booking_flow_with_ownership_and_transitions() {
    let Some((address, _pool)) = spawn_app().await else { return };
    let client = reqwest::Client::new();

    let tourist = unique_name("tourist");
    let guide = unique_name("guide");
    let other_guide = unique_name("intruder");
    for (role, name) in [("tourist", &tourist), ("guide", &guide), ("guide", &other_guide)] {
        assert_eq!(register(&client, &address, role, name).await.status().as_u16(), 201);
    }

    let tourist_token = login(&client, &address, "tourist", &tourist).await["token"]
        .as_str()
        .unwrap()
        .to_string();
    let guide_login = login(&client, &address, "guide", &guide).await;
    let guide_token = guide_login["token"].as_str().unwrap().to_string();
    let guide_id = guide_login["user"]["id"].as_i64().unwrap();
    let other_token = login(&client, &address, "guide", &other_guide).await["token"]
        .as_str()
        .unwrap()
        .to_string();

    // Guide appears in the available list
    let guides = client
        .get(format!("{}/api/tourist/guides", address))
        .bearer_auth(&tourist_token)
        .send()
        .await
        .unwrap();
    assert_eq!(guides.status().as_u16(), 200);
    let guides: Vec<serde_json::Value> = guides.json().await.unwrap();
    assert!(guides.iter().any(|g| g["user_id"].as_i64() == Some(guide_id)));

    // Book: arrival 2024-06-01 + 5 days => departure 2024-06-06
    let created = client
        .post(format!("{}/api/tourist/bookings", address))
        .bearer_auth(&tourist_token)
        .json(&serde_json::json!({
            "guide_id": guide_id,
            "tourist_name": "Asha Kumari",
            "phone": "+91 9876543210",
            "native_place": "Patna",
            "arrival_date": "2024-06-01",
            "days_to_stay": 5
        }))
        .send()
        .await
        .unwrap();
    assert_eq!(created.status().as_u16(), 201);
    let created: serde_json::Value = created.json().await.unwrap();
    let booking_id = created["id"].as_i64().unwrap();

    let bookings = client
        .get(format!("{}/api/tourist/bookings", address))
        .bearer_auth(&tourist_token)
        .send()
        .await
        .unwrap()
        .json::<Vec<serde_json::Value>>()
        .await
        .unwrap();
    let booking = bookings
        .iter()
        .find(|b| b["id"].as_i64() == Some(booking_id))
        .expect("created booking not listed");
    assert_eq!(booking["departure_date"], "2024-06-06");
    assert_eq!(booking["booking_status"], "pending");

    // A different guide cannot touch it
    let denied = client
        .put(format!("{}/api/guide/bookings/{}/status/confirmed", address, booking_id))
        .bearer_auth(&other_token)
        .send()
        .await
        .unwrap();
    assert_eq!(denied.status().as_u16(), 403);

    // Status unchanged after the denied attempt
    let listed = client
        .get(format!("{}/api/guide/bookings", address))
        .bearer_auth(&guide_token)
        .send()
        .await
        .unwrap()
        .json::<Vec<serde_json::Value>>()
        .await
        .unwrap();
    let mine = listed
        .iter()
        .find(|b| b["id"].as_i64() == Some(booking_id))
        .unwrap();
    assert_eq!(mine["booking_status"], "pending");

    // Unknown status value
    let bogus = client
        .put(format!("{}/api/guide/bookings/{}/status/approved", address, booking_id))
        .bearer_auth(&guide_token)
        .send()
        .await
        .unwrap();
    assert_eq!(bogus.status().as_u16(), 400);

    // pending -> completed is not a legal edge
    let skip_ahead = client
        .put(format!("{}/api/guide/bookings/{}/status/completed", address, booking_id))
        .bearer_auth(&guide_token)
        .send()
        .await
        .unwrap();
    assert_eq!(skip_ahead.status().as_u16(), 400);

    // pending -> confirmed -> completed works for the owner
    for status in ["confirmed", "completed"] {
        let resp = client
            .put(format!("{}/api/guide/bookings/{}/status/{}", address, booking_id, status))
            .bearer_auth(&guide_token)
            .send()
            .await
            .unwrap();
        assert_eq!(resp.status().as_u16(), 200, "transition to {} failed", status);
    }

    // completed is terminal
    let reopen = client
        .put(format!("{}/api/guide/bookings/{}/status/cancelled", address, booking_id))
        .bearer_auth(&guide_token)
        .send()
        .await
        .unwrap();
    assert_eq!(reopen.status().as_u16(), 400);
}

#[tokio::test]
async fn booking_against_non_guide_is_rejected() {
    let Some((address, _pool)) = spawn_app().await else { return };
    let client = reqwest::Client::new();

    let tourist = unique_name("dana");
    let victim = unique_name("eve");
    register(&client, &address, "tourist", &tourist).await;
    register(&client, &address, "tourist", &victim).await;

    let login_resp = login(&client, &address, "tourist", &tourist).await;
    let token = login_resp["token"].as_str().unwrap();
    let victim_id = login(&client, &address, "tourist", &victim).await["user"]["id"]
        .as_i64()
        .unwrap();

    let response = client
        .post(format!("{}/api/tourist/bookings", address))
        .bearer_auth(token)
        .json(&serde_json::json!({
            "guide_id": victim_id,
            "tourist_name": "Dana",
            "phone": "+91 9876543210",
            "native_place": "Delhi",
            "arrival_date": "2024-06-01",
            "days_to_stay": 3
        }))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status().as_u16(), 400);
}

#[tokio::test]
async fn role_gates_are_enforced() {
    let Some((address, _pool)) = spawn_app().await else { return };
    let client = reqwest::Client::new();
    let username = unique_name("frank");

    register(&client, &address, "tourist", &username).await;
    let token = login(&client, &address, "tourist", &username).await["token"]
        .as_str()
        .unwrap()
        .to_string();

    // Tourist token on guide and admin routes
    for path in ["/api/guide/bookings", "/api/admin/users"] {
        let resp = client
            .get(format!("{}{}", address, path))
            .bearer_auth(&token)
            .send()
            .await
            .unwrap();
        assert_eq!(resp.status().as_u16(), 403, "{} should be forbidden", path);
        let body: serde_json::Value = resp.json().await.unwrap();
        assert_eq!(body["success"], false);
        assert!(body["message"].is_string());
    }

    // No token at all; the rejection carries the same JSON body shape
    let resp = client
        .get(format!("{}/api/tourist/bookings", address))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status().as_u16(), 401);
    let body: serde_json::Value = resp.json().await.unwrap();
    assert_eq!(body["success"], false);
    assert!(body["message"].is_string());

    // A garbage token is a 401 with the same body shape
    let resp = client
        .get(format!("{}/api/tourist/bookings", address))
        .bearer_auth("not.a.jwt")
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status().as_u16(), 401);
    let body: serde_json::Value = resp.json().await.unwrap();
    assert_eq!(body["success"], false);
}

#[tokio::test]
async fn profile_upsert_is_idempotent() {
    let Some((address, pool)) = spawn_app().await else { return };
    let client = reqwest::Client::new();
    let username = unique_name("gopal");

    register(&client, &address, "guide", &username).await;
    let login_resp = login(&client, &address, "guide", &username).await;
    let token = login_resp["token"].as_str().unwrap();
    let user_id = login_resp["user"]["id"].as_i64().unwrap();

    let payload = serde_json::json!({
        "specialization": "Wildlife Tours",
        "experience_years": 7,
        "languages_spoken": "Hindi, English, Santali",
        "location": "Betla",
        "price_per_day": 3500.0
    });

    for _ in 0..2 {
        let resp = client
            .put(format!("{}/api/guide/profile", address))
            .bearer_auth(token)
            .json(&payload)
            .send()
            .await
            .unwrap();
        assert_eq!(resp.status().as_u16(), 200);
    }

    let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM guides WHERE user_id = $1")
        .bind(user_id)
        .fetch_one(&pool)
        .await
        .unwrap();
    assert_eq!(count, 1);

    let profile: serde_json::Value = client
        .get(format!("{}/api/guide/profile", address))
        .bearer_auth(token)
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(profile["content"]["specialization"], "Wildlife Tours");
    assert_eq!(profile["content"]["price_per_day"], 3500.0);
    // Availability is untouched by the upsert
    assert_eq!(profile["content"]["availability_status"], "available");
}
