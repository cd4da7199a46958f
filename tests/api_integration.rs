use axum::{
    body::Body,
    http::{Method, Request, StatusCode},
    Router,
};
use serde_json::{json, Value};
use tower::ServiceExt;
use uuid::Uuid;

use energy_dashboard::api;
use energy_dashboard::config::Config;
use energy_dashboard::controller::AppState;
use energy_dashboard::domain::{NewAlert, Severity};

fn app() -> (Router, AppState) {
    let mut cfg = Config::default();
    cfg.simulation.random_seed = Some(21);
    let state = AppState::new(cfg.clone());
    (api::router(state.clone(), &cfg), state)
}

async fn send(app: &Router, method: Method, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
    let builder = Request::builder().method(method).uri(uri);
    let request = match body {
        Some(b) => builder
            .header("content-type", "application/json")
            .body(Body::from(b.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };
    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let json = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, json)
}

#[tokio::test]
async fn health_endpoints_report_ok() {
    let (app, _) = app();
    let (status, body) = send(&app, Method::GET, "/health", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "healthy");
    assert_eq!(body["checks"]["simulation"]["detail"], "stopped");

    let (status, _) = send(&app, Method::GET, "/health/live", None).await;
    assert_eq!(status, StatusCode::OK);
    let (status, _) = send(&app, Method::GET, "/health/ready", None).await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn energy_simulation_function_returns_metrics() {
    let (app, state) = app();
    let (status, body) = send(&app, Method::POST, "/api/v1/functions/energy-simulation", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], true);
    let data = &body["data"];
    for field in ["consumption", "solarGeneration", "netUsage", "gridPrice", "currentCost"] {
        assert!(data[field].is_number(), "missing {field}");
    }
    assert!(data["weather"]["condition"].is_string());

    let price = data["gridPrice"].as_f64().unwrap();
    assert!([0.12, 0.15, 0.25].contains(&price));

    let since = chrono::Utc::now() - chrono::Duration::minutes(5);
    let logs = state.repos.energy.energy_logs_since(since, None).await.unwrap();
    assert_eq!(logs.len(), 1);
}

#[tokio::test]
async fn backfill_validates_and_counts() {
    let (app, _) = app();
    let user = Uuid::new_v4();

    let (status, body) = send(
        &app,
        Method::POST,
        "/api/v1/functions/backfill-historical-data",
        Some(json!({ "user_id": user, "days_back": 0 })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "ValidationError");

    for days_back in [json!(-5), json!(1.5), json!("seven")] {
        let (status, body) = send(
            &app,
            Method::POST,
            "/api/v1/functions/backfill-historical-data",
            Some(json!({ "user_id": user, "days_back": days_back })),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST, "days_back = {days_back}");
        assert_eq!(body["error"], "ValidationError");
        assert_eq!(body["success"], false);
    }

    let (status, body) = send(
        &app,
        Method::POST,
        "/api/v1/functions/backfill-historical-data",
        Some(json!({ "user_id": user, "days_back": 1 })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let created = &body["records_created"];
    assert_eq!(created["energy_logs"], 24);
    assert_eq!(created["raw_energy_data"], 96);
    assert_eq!(created["processed_features"], 24);
}

#[tokio::test]
async fn empty_store_charts_the_fallback_series() {
    let (app, _) = app();
    let (status, first) = send(&app, Method::GET, "/api/v1/energy/chart", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(first["metadata"]["is_fallback"], true);
    assert_eq!(first["data"]["points"].as_array().unwrap().len(), 12);

    let (_, second) = send(&app, Method::GET, "/api/v1/energy/chart", None).await;
    assert_eq!(first["data"], second["data"]);
}

#[tokio::test]
async fn backfilled_user_gets_a_real_chart_and_achievements() {
    let (app, _) = app();
    let user = Uuid::new_v4();
    send(
        &app,
        Method::POST,
        "/api/v1/functions/backfill-historical-data",
        Some(json!({ "user_id": user, "days_back": 2 })),
    )
    .await;

    let uri = format!("/api/v1/energy/chart?user_id={user}");
    let (status, body) = send(&app, Method::GET, &uri, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["metadata"]["is_fallback"], false);
    let points = body["data"]["points"].as_array().unwrap();
    assert!(points.len() >= 2);
    for p in points {
        assert!(p["grid"].as_f64().unwrap() >= 0.0);
    }

    let (status, body) = send(
        &app,
        Method::POST,
        "/api/v1/functions/check-gamification",
        Some(json!({ "user_id": user })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let awarded = body["data"]["new_achievements"].as_array().unwrap();
    assert!(awarded.iter().any(|a| a["kind"] == "solar_starter"));

    let (_, again) = send(
        &app,
        Method::POST,
        "/api/v1/functions/check-gamification",
        Some(json!({ "user_id": user })),
    )
    .await;
    assert!(again["data"]["new_achievements"].as_array().unwrap().is_empty());
    assert_eq!(again["data"]["total_points"], body["data"]["total_points"]);
}

#[tokio::test]
async fn alert_lifecycle() {
    let (app, state) = app();
    let alert = state
        .repos
        .alerts
        .insert_alert(
            NewAlert {
                title: "High Energy Usage".to_string(),
                message: "test".to_string(),
                severity: Severity::Warning,
            }
            .into_alert(chrono::Utc::now(), true),
        )
        .await
        .unwrap();

    let (status, body) = send(&app, Method::GET, "/api/v1/alerts", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["metadata"]["unread_count"], 1);
    assert_eq!(body["data"][0]["severity"], "warning");

    let uri = format!("/api/v1/alerts/{}/read", alert.id);
    let (status, body) = send(&app, Method::POST, &uri, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["is_read"], true);

    let (_, body) = send(&app, Method::POST, "/api/v1/alerts/read-all", None).await;
    assert_eq!(body["data"]["updated"], 0);

    let uri = format!("/api/v1/alerts/{}", alert.id);
    let (status, _) = send(&app, Method::DELETE, &uri, None).await;
    assert_eq!(status, StatusCode::NO_CONTENT);
    let (status, _) = send(&app, Method::DELETE, &uri, None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn simulation_session_controls() {
    let (app, _) = app();

    let (status, body) = send(&app, Method::POST, "/api/v1/simulation/start", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["isRunning"], true);

    let (status, _) = send(
        &app,
        Method::POST,
        "/api/v1/simulation/speed",
        Some(json!({ "multiplier": 0.0 })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, body) = send(
        &app,
        Method::POST,
        "/api/v1/simulation/speed",
        Some(json!({ "multiplier": 60.0 })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["speedMultiplier"], 60.0);

    let (status, _) = send(
        &app,
        Method::POST,
        "/api/v1/simulation/devices",
        Some(json!({ "template_id": "jacuzzi" })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, body) = send(
        &app,
        Method::POST,
        "/api/v1/simulation/devices",
        Some(json!({ "template_id": "smart-lights" })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    let device_id = body["data"]["id"].as_str().unwrap().to_string();

    let uri = format!("/api/v1/simulation/devices/{device_id}/status");
    let (status, body) = send(&app, Method::POST, &uri, Some(json!({ "status": "on" }))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["status"], "on");

    let tasks = format!("/api/v1/simulation/devices/{device_id}/tasks");
    let (status, _) = send(
        &app,
        Method::POST,
        &tasks,
        Some(json!({ "action": "set_brightness", "scheduled_time": "2030-01-01T20:00:00Z" })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, body) = send(
        &app,
        Method::POST,
        &tasks,
        Some(json!({
            "action": "turn_off",
            "scheduled_time": "2030-01-01T23:00:00Z",
            "recurrence": { "type": "daily" }
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    let task_id = body["data"]["id"].as_str().unwrap().to_string();

    let (status, _) = send(&app, Method::DELETE, &format!("{tasks}/{task_id}"), None).await;
    assert_eq!(status, StatusCode::NO_CONTENT);
    let (status, _) = send(&app, Method::DELETE, &format!("{tasks}/{task_id}"), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (_, body) = send(&app, Method::GET, "/api/v1/simulation", None).await;
    let state = &body["data"];
    let devices_on: f64 = state["devices"]
        .as_array()
        .unwrap()
        .iter()
        .filter(|d| d["status"] == "on")
        .map(|d| d["current_usage_kw"].as_f64().unwrap())
        .sum();
    let expected = state["baselineConsumption"].as_f64().unwrap() + devices_on;
    assert!((state["totalConsumption"].as_f64().unwrap() - expected).abs() < 1e-9);

    let (_, body) = send(&app, Method::POST, "/api/v1/simulation/reset", None).await;
    assert!(body["data"]["devices"].as_array().unwrap().is_empty());
    assert_eq!(body["data"]["isRunning"], false);
}

#[tokio::test]
async fn device_library_lists_templates() {
    let (app, _) = app();
    let (status, body) = send(&app, Method::GET, "/api/v1/devices/library", None).await;
    assert_eq!(status, StatusCode::OK);
    let templates = body["data"].as_array().unwrap();
    assert!(templates.iter().any(|t| t["id"] == "refrigerator"));
    assert_eq!(body["metadata"]["total_count"], templates.len());
}

#[tokio::test]
async fn preferences_round_trip() {
    let (app, _) = app();
    let (_, body) = send(&app, Method::GET, "/api/v1/preferences", None).await;
    assert_eq!(body["data"]["theme"], "system");

    let (status, body) = send(
        &app,
        Method::PUT,
        "/api/v1/preferences",
        Some(json!({ "theme": "dark", "onboardingCompleted": true })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["theme"], "dark");
    assert_eq!(body["data"]["onboardingCompleted"], true);
}
