use std::sync::Arc;

use axum::{
    body::Body,
    http::{Method, Request, StatusCode},
    Router,
};
use chrono::NaiveDate;
use http_body_util::BodyExt;
use serde_json::{json, Value};
use taskmaster_server::{
    app_state::AppState, build_app, clock::FixedClock, in_memory::InMemoryTaskStore,
    settings::Settings,
};
use tower::ServiceExt;

struct TestApp {
    router: Router,
    store: Arc<InMemoryTaskStore>,
}

impl TestApp {
    fn new() -> Self {
        let store = Arc::new(InMemoryTaskStore::new());
        let clock = Arc::new(FixedClock(
            NaiveDate::from_ymd_opt(2024, 12, 30).unwrap().and_hms_opt(8, 0, 0).unwrap(),
        ));
        let settings = Settings::default();
        let state = Arc::new(AppState::new(store.clone(), clock, &settings));
        TestApp {
            router: build_app(state, &settings),
            store,
        }
    }

    /// Same store, later clock.
    fn at(&self, hour: u32) -> Router {
        let clock = Arc::new(FixedClock(
            NaiveDate::from_ymd_opt(2024, 12, 31).unwrap().and_hms_opt(hour, 0, 0).unwrap(),
        ));
        let settings = Settings::default();
        build_app(Arc::new(AppState::new(self.store.clone(), clock, &settings)), &settings)
    }

    async fn send(&self, method: Method, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
        send(&self.router, method, uri, body).await
    }
}

async fn send(router: &Router, method: Method, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
    let builder = Request::builder().method(method).uri(uri);
    let request = match body {
        Some(body) => builder
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };

    let response = router.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap_or(Value::Null)
    };
    (status, value)
}

fn new_task(title: &str, category: &str) -> Value {
    json!({
        "title": title,
        "dueDate": "2025-01-01T00:00:00",
        "priority": "low",
        "category": category,
    })
}

#[tokio::test]
async fn root_and_health() {
    let app = TestApp::new();

    let (status, body) = app.send(Method::GET, "/api/", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({ "message": "TaskMaster API v1.0.0", "status": "running" }));

    let (status, body) = app.send(Method::GET, "/api/health", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "healthy");
    assert_eq!(body["database"], "connected");
    assert_eq!(body["timestamp"], "2024-12-30T08:00:00");
}

#[tokio::test]
async fn health_reports_unreachable_store() {
    let app = TestApp::new();
    app.store.set_offline(true);

    let (status, body) = app.send(Method::GET, "/api/health", None).await;
    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(body["code"], "service_unavailable");
    assert!(body["detail"].as_str().unwrap().contains("Database connection failed"));
}

#[tokio::test]
async fn task_lifecycle() {
    let app = TestApp::new();

    let (status, created) = app.send(Method::POST, "/api/tasks", Some(new_task("Buy milk", "personal"))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(created["title"], "Buy milk");
    assert_eq!(created["completed"], false);
    assert_eq!(created["priority"], "low");
    assert_eq!(created["category"], "personal");
    assert_eq!(created["createdAt"], created["updatedAt"]);
    assert!(created["notificationId"].is_null());
    let id = created["id"].as_str().unwrap().to_string();

    let (status, fetched) = app.send(Method::GET, &format!("/api/tasks/{id}"), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(fetched, created);

    let later = app.at(10);
    let (status, updated) = send(
        &later,
        Method::PUT,
        &format!("/api/tasks/{id}"),
        Some(json!({ "completed": true })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(updated["completed"], true);
    assert_eq!(updated["title"], "Buy milk");
    assert_eq!(updated["createdAt"], created["createdAt"]);
    assert_ne!(updated["updatedAt"], created["updatedAt"]);

    let (status, deleted) = app.send(Method::DELETE, &format!("/api/tasks/{id}"), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(deleted, json!({ "message": "Task deleted successfully", "taskId": id }));

    let (status, _) = app.send(Method::GET, &format!("/api/tasks/{id}"), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    let (status, body) = app.send(Method::DELETE, &format!("/api/tasks/{id}"), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["detail"], "Task not found");
}

#[tokio::test]
async fn create_rejects_bad_input() {
    let app = TestApp::new();

    let mut bad_priority = new_task("Report", "work");
    bad_priority["priority"] = json!("urgent");
    let (status, body) = app.send(Method::POST, "/api/tasks", Some(bad_priority)).await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["code"], "validation_error");

    let mut bad_category = new_task("Report", "work");
    bad_category["category"] = json!("invalid_category");
    let (status, _) = app.send(Method::POST, "/api/tasks", Some(bad_category)).await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);

    let (status, _) = app.send(Method::POST, "/api/tasks", Some(json!({ "title": "No due date" }))).await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);

    let (status, body) = app.send(Method::POST, "/api/tasks", Some(new_task("  ", "work"))).await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["fields"][0]["field"], "title");

    let (_, listed) = app.send(Method::GET, "/api/tasks", None).await;
    assert_eq!(listed, json!([]));
}

#[tokio::test]
async fn malformed_ids_are_bad_requests() {
    let app = TestApp::new();

    for method in [Method::GET, Method::DELETE] {
        let (status, body) = app.send(method, "/api/tasks/not-an-id", None).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["code"], "invalid_argument");
    }
    let (status, _) = app
        .send(Method::PUT, "/api/tasks/not-an-id", Some(json!({ "completed": true })))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn update_rejections() {
    let app = TestApp::new();
    let (_, created) = app.send(Method::POST, "/api/tasks", Some(new_task("Read", "study"))).await;
    let uri = format!("/api/tasks/{}", created["id"].as_str().unwrap());

    let (status, body) = app.send(Method::PUT, &uri, Some(json!({}))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["detail"], "No fields to update");
    let (_, unchanged) = app.send(Method::GET, &uri, None).await;
    assert_eq!(unchanged, created);

    let (status, _) = app.send(Method::PUT, &uri, Some(json!({ "priority": "urgent" }))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, body) = app.send(Method::PUT, &uri, Some(json!({ "dueDate": "" }))).await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["fields"][0]["field"], "dueDate");
    let (_, unchanged) = app.send(Method::GET, &uri, None).await;
    assert_eq!(unchanged["dueDate"], created["dueDate"]);

    let missing = format!("/api/tasks/{}", uuid_like());
    let (status, _) = app.send(Method::PUT, &missing, Some(json!({ "completed": true }))).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

fn uuid_like() -> &'static str {
    "6f1c0b52-6a4e-4c2e-9d87-0c2f6b7a9e10"
}

#[tokio::test]
async fn list_filters_by_category_and_limit() {
    let app = TestApp::new();
    for (title, category) in [("a", "work"), ("b", "personal"), ("c", "work"), ("d", "study")] {
        let (status, _) = app.send(Method::POST, "/api/tasks", Some(new_task(title, category))).await;
        assert_eq!(status, StatusCode::OK);
    }

    let (status, work) = app.send(Method::GET, "/api/tasks?category=work", None).await;
    assert_eq!(status, StatusCode::OK);
    let work = work.as_array().unwrap();
    assert_eq!(work.len(), 2);
    assert!(work.iter().all(|t| t["category"] == "work"));

    let (_, limited) = app.send(Method::GET, "/api/tasks?limit=3", None).await;
    assert_eq!(limited.as_array().unwrap().len(), 3);

    let (_, ignored) = app.send(Method::GET, "/api/tasks?category=chores&completed=maybe&limit=-1", None).await;
    assert_eq!(ignored.as_array().unwrap().len(), 4);

    let (_, open) = app.send(Method::GET, "/api/tasks?completed=false", None).await;
    assert_eq!(open.as_array().unwrap().len(), 4);
}

#[tokio::test]
async fn sync_overwrites_collection() {
    let app = TestApp::new();
    app.send(Method::POST, "/api/tasks", Some(new_task("stale", "work"))).await;

    let batch = json!({
        "tasks": [
            { "title": "one", "dueDate": "2025-01-02T00:00:00", "priority": "high", "category": "work",
              "completed": true, "createdAt": "2024-12-29T10:00:00" },
            { "_id": "local-7", "title": "two", "dueDate": "2025-01-03T00:00:00", "priority": "medium",
              "category": "study", "createdAt": "2024-12-29T11:00:00" }
        ],
        "lastSyncTime": "2024-12-29T00:00:00"
    });
    let (status, body) = app.send(Method::POST, "/api/tasks/sync", Some(batch)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["tasks"].as_array().unwrap().len(), 2);
    assert_eq!(body["conflicts"], json!([]));
    assert_eq!(body["syncTime"], "2024-12-30T08:00:00");

    let (_, listed) = app.send(Method::GET, "/api/tasks", None).await;
    let titles: Vec<_> = listed.as_array().unwrap().iter().map(|t| t["title"].clone()).collect();
    assert_eq!(titles, [json!("two"), json!("one")]);
}

#[tokio::test]
async fn stats_on_empty_collection() {
    let app = TestApp::new();

    let (status, body) = app.send(Method::GET, "/api/stats", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["overview"]["totalTasks"], 0);
    assert_eq!(body["overview"]["completionRate"], 0.0);
    assert_eq!(body["categoryStats"], json!({}));
    assert_eq!(body["dailyTrends"].as_array().unwrap().len(), 7);
    assert!(body["insights"]["mostProductiveCategory"].is_null());
}

#[tokio::test]
async fn stats_totals_balance() {
    let app = TestApp::new();
    let mut ids = Vec::new();
    for (title, category) in [("a", "work"), ("b", "work"), ("c", "personal")] {
        let (_, created) = app.send(Method::POST, "/api/tasks", Some(new_task(title, category))).await;
        ids.push(created["id"].as_str().unwrap().to_string());
    }
    app.send(Method::PUT, &format!("/api/tasks/{}", ids[0]), Some(json!({ "completed": true })))
        .await;

    let (status, body) = app.send(Method::GET, "/api/stats", None).await;
    assert_eq!(status, StatusCode::OK);
    let overview = &body["overview"];
    assert_eq!(overview["totalTasks"], 3);
    assert_eq!(overview["completedTasks"], 1);
    assert_eq!(overview["pendingTasks"], 2);
    assert_eq!(overview["completionRate"], 33.3);

    for breakdown in ["categoryStats", "priorityStats"] {
        for bucket in body[breakdown].as_object().unwrap().values() {
            let total = bucket["total"].as_u64().unwrap();
            let completed = bucket["completed"].as_u64().unwrap();
            let pending = bucket["pending"].as_u64().unwrap();
            assert_eq!(total, completed + pending);
        }
    }
    assert_eq!(body["categoryStats"]["work"]["completionRate"], 50.0);
    assert_eq!(body["insights"]["mostProductiveCategory"], "work");
}

#[tokio::test]
async fn productivity_trends() {
    let app = TestApp::new();

    let (status, body) = app.send(Method::GET, "/api/analytics/productivity", None).await;
    assert_eq!(status, StatusCode::OK);
    let weeks = body["weeklyTrends"].as_array().unwrap();
    assert_eq!(weeks.len(), 4);
    assert_eq!(weeks[3]["week"], "Week 4");
    assert_eq!(weeks[3]["startDate"], "2024-12-30");
    assert_eq!(body["timestamp"], "2024-12-30T08:00:00");
}

#[tokio::test]
async fn store_failure_is_internal_error() {
    let app = TestApp::new();
    app.store.set_offline(true);

    let (status, body) = app.send(Method::GET, "/api/tasks", None).await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["code"], "internal_error");
}
