//! Integration tests: drive the full router in-process against a fresh
//! in-memory database per test.

use axum::{
    Router,
    body::Body,
    http::{Method, Request, StatusCode, header},
};
use http_body_util::BodyExt;
use serde_json::{Value, json};
use tower::ServiceExt;

use diet_api::AppStateInner;
use diet_db::Database;

fn app() -> Router {
    let db = Database::open_in_memory().unwrap();
    diet_api::router(AppStateInner::new(db))
}

async fn send(
    app: &Router,
    method: Method,
    uri: &str,
    user_id: Option<&str>,
    body: Option<Value>,
) -> (StatusCode, Value) {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(user_id) = user_id {
        builder = builder.header("userId", user_id);
    }
    let req = match body {
        Some(body) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(serde_json::to_vec(&body).unwrap()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };

    let resp = app.clone().oneshot(req).await.unwrap();
    let status = resp.status();
    let bytes = resp.into_body().collect().await.unwrap().to_bytes();
    let json = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, json)
}

async fn create_user(app: &Router, name: &str) -> String {
    let (status, body) = send(app, Method::POST, "/users", None, Some(json!({ "name": name }))).await;
    assert_eq!(status, StatusCode::CREATED);
    body["id"].as_str().unwrap().to_string()
}

async fn create_meal(app: &Router, user_id: &str, title: &str, on_diet: bool) -> String {
    let (status, body) = send(
        app,
        Method::POST,
        "/meals",
        Some(user_id),
        Some(json!({ "title": title, "description": "Test description", "isOnTheDiet": on_diet })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    body["id"].as_str().unwrap().to_string()
}

async fn metrics(app: &Router, user_id: &str) -> Value {
    let (status, body) = send(app, Method::GET, "/meals/metrics", Some(user_id), None).await;
    assert_eq!(status, StatusCode::OK);
    body
}

// -- Users --

#[tokio::test]
async fn created_user_shows_up_in_listing() {
    let app = app();
    let first = create_user(&app, "John Doe").await;
    let second = create_user(&app, "John Doe").await;
    assert_ne!(first, second);

    let (status, body) = send(&app, Method::GET, "/users", None, None).await;
    assert_eq!(status, StatusCode::OK);
    let ids: Vec<&str> = body["users"]
        .as_array()
        .unwrap()
        .iter()
        .map(|u| u["id"].as_str().unwrap())
        .collect();
    assert!(ids.contains(&first.as_str()));
    assert!(ids.contains(&second.as_str()));
}

#[tokio::test]
async fn user_update_then_delete() {
    let app = app();
    let id = create_user(&app, "John Doe").await;

    let (status, body) = send(&app, Method::GET, &format!("/users/{id}"), None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["user"]["name"], "John Doe");

    let (status, _) = send(
        &app,
        Method::PUT,
        &format!("/users/{id}"),
        None,
        Some(json!({ "name": "John Smith" })),
    )
    .await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (_, body) = send(&app, Method::GET, &format!("/users/{id}"), None, None).await;
    assert_eq!(body["user"]["name"], "John Smith");
    assert!(body["user"]["updatedAt"].is_string());

    let (status, _) = send(&app, Method::DELETE, &format!("/users/{id}"), None, None).await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (status, body) = send(&app, Method::GET, &format!("/users/{id}"), None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "User not found");
}

#[tokio::test]
async fn missing_user_cannot_be_updated_or_deleted() {
    let app = app();
    let ghost = "00000000-0000-4000-8000-000000000000";

    let (status, _) = send(
        &app,
        Method::PUT,
        &format!("/users/{ghost}"),
        None,
        Some(json!({ "name": "Nobody" })),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = send(&app, Method::DELETE, &format!("/users/{ghost}"), None, None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn rejects_malformed_user_input() {
    let app = app();

    let (status, _) = send(&app, Method::POST, "/users", None, Some(json!({ "name": "" }))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, body) = send(&app, Method::POST, "/users", None, Some(json!({ "name": "   " }))).await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["name"], "   ");

    let (status, body) = send(&app, Method::POST, "/users", None, Some(json!({ "name": 42 }))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["detail"].is_string());

    let (status, _) = send(&app, Method::GET, "/users/not-a-uuid", None, None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

// -- Identity --

#[tokio::test]
async fn meal_routes_require_identity_header() {
    let app = app();

    for body in [json!({}), json!({ "title": "Lunch", "description": "Salad" })] {
        let (status, _) = send(&app, Method::POST, "/meals", None, Some(body)).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
    }

    let (status, _) = send(&app, Method::GET, "/meals", None, None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, _) = send(&app, Method::GET, "/meals/metrics", None, None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn repeated_identity_header_is_unauthorized() {
    let app = app();
    let a = create_user(&app, "A").await;
    let b = create_user(&app, "B").await;

    let req = Request::builder()
        .method(Method::GET)
        .uri("/meals")
        .header("userid", &a)
        .header("userid", &b)
        .body(Body::empty())
        .unwrap();
    let resp = app.oneshot(req).await.unwrap();
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn unknown_identity_is_not_found() {
    let app = app();
    let (status, _) = send(
        &app,
        Method::GET,
        "/meals",
        Some("00000000-0000-4000-8000-000000000000"),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn empty_identity_header_is_unauthorized() {
    let app = app();
    let (status, body) = send(&app, Method::GET, "/meals", Some(""), None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["message"], "Unauthorized");
}

#[tokio::test]
async fn non_uuid_identity_is_not_found() {
    let app = app();
    let (status, body) = send(&app, Method::GET, "/meals", Some("john"), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["message"], "User not found");
}

#[tokio::test]
async fn identity_header_name_ignores_case() {
    let app = app();
    let user = create_user(&app, "John Doe").await;

    let req = Request::builder()
        .method(Method::GET)
        .uri("/meals")
        .header("USERID", &user)
        .body(Body::empty())
        .unwrap();
    let resp = app.oneshot(req).await.unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
}

// -- Meals --

#[tokio::test]
async fn meal_lifecycle() {
    let app = app();
    let user = create_user(&app, "John Doe").await;

    let (status, created) = send(
        &app,
        Method::POST,
        "/meals",
        Some(&user),
        Some(json!({ "title": "Test meal", "description": "Test description", "isOnTheDiet": true })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(created["userId"], user.as_str());
    assert_eq!(created["isOnTheDiet"], true);
    let meal = created["id"].as_str().unwrap().to_string();

    let (status, body) = send(&app, Method::GET, "/meals", Some(&user), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["meals"].as_array().unwrap().len(), 1);

    let (status, body) = send(&app, Method::GET, &format!("/meals/{meal}"), Some(&user), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["meal"]["id"], meal.as_str());

    let (status, _) = send(
        &app,
        Method::PUT,
        &format!("/meals/{meal}"),
        Some(&user),
        Some(json!({ "title": "Updated Test meal" })),
    )
    .await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (_, body) = send(&app, Method::GET, &format!("/meals/{meal}"), Some(&user), None).await;
    assert_eq!(body["meal"]["title"], "Updated Test meal");
    assert_eq!(body["meal"]["description"], "Test description");

    let (status, _) = send(&app, Method::DELETE, &format!("/meals/{meal}"), Some(&user), None).await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (status, _) = send(&app, Method::GET, &format!("/meals/{meal}"), Some(&user), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = send(&app, Method::DELETE, &format!("/meals/{meal}"), Some(&user), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn diet_flag_defaults_to_off() {
    let app = app();
    let user = create_user(&app, "John Doe").await;

    let (status, body) = send(
        &app,
        Method::POST,
        "/meals",
        Some(&user),
        Some(json!({ "title": "Pizza", "description": "Pepperoni" })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["isOnTheDiet"], false);

    let (status, _) = send(
        &app,
        Method::POST,
        "/meals",
        Some(&user),
        Some(json!({ "description": "No title" })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn toggling_twice_restores_the_flag() {
    let app = app();
    let user = create_user(&app, "John Doe").await;
    let meal = create_meal(&app, &user, "Salad", true).await;
    let toggle = format!("/meals/{meal}/is-on-the-diet");

    let (_, body) = send(&app, Method::GET, &format!("/meals/{meal}"), Some(&user), None).await;
    assert!(body["meal"]["updatedAt"].is_null());

    let (status, _) = send(&app, Method::PATCH, &toggle, Some(&user), None).await;
    assert_eq!(status, StatusCode::NO_CONTENT);
    let (_, body) = send(&app, Method::GET, &format!("/meals/{meal}"), Some(&user), None).await;
    assert_eq!(body["meal"]["isOnTheDiet"], false);
    assert!(body["meal"]["updatedAt"].is_string());

    send(&app, Method::PATCH, &toggle, Some(&user), None).await;
    let (_, body) = send(&app, Method::GET, &format!("/meals/{meal}"), Some(&user), None).await;
    assert_eq!(body["meal"]["isOnTheDiet"], true);
}

#[tokio::test]
async fn other_users_meals_look_missing() {
    let app = app();
    let alice = create_user(&app, "Alice").await;
    let bob = create_user(&app, "Bob").await;
    let meal = create_meal(&app, &alice, "Secret snack", false).await;
    let path = format!("/meals/{meal}");

    let (status, body) = send(&app, Method::GET, &path, Some(&bob), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body, json!({ "message": "Meal not found" }));

    let (status, _) = send(&app, Method::PUT, &path, Some(&bob), Some(json!({ "title": "Mine" }))).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = send(&app, Method::PATCH, &format!("{path}/is-on-the-diet"), Some(&bob), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = send(&app, Method::DELETE, &path, Some(&bob), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (_, body) = send(&app, Method::GET, "/meals", Some(&bob), None).await;
    assert!(body["meals"].as_array().unwrap().is_empty());

    let (_, body) = send(&app, Method::GET, &path, Some(&alice), None).await;
    assert_eq!(body["meal"]["title"], "Secret snack");
}

#[tokio::test]
async fn deleting_user_removes_their_meals() {
    let app = app();
    let doomed = create_user(&app, "Doomed").await;
    let other = create_user(&app, "Other").await;
    let meals = [
        create_meal(&app, &doomed, "Breakfast", true).await,
        create_meal(&app, &doomed, "Lunch", false).await,
    ];

    let (status, _) = send(&app, Method::DELETE, &format!("/users/{doomed}"), None, None).await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    for meal in &meals {
        let path = format!("/meals/{meal}");
        for identity in [&doomed, &other] {
            let (status, _) = send(&app, Method::GET, &path, Some(identity), None).await;
            assert_eq!(status, StatusCode::NOT_FOUND);
        }
    }
}

// -- Metrics --

#[tokio::test]
async fn metrics_for_user_without_meals() {
    let app = app();
    let user = create_user(&app, "John Doe").await;

    assert_eq!(
        metrics(&app, &user).await,
        json!({ "totalMeals": 0, "mealsOnDiet": 0, "mealsOffDiet": 0, "bestStreak": 0 })
    );
}

#[tokio::test]
async fn metrics_streak_broken_by_off_diet_meal() {
    let app = app();
    let user = create_user(&app, "John Doe").await;
    create_meal(&app, &user, "M1", true).await;
    create_meal(&app, &user, "M2", false).await;
    create_meal(&app, &user, "M3", true).await;

    assert_eq!(
        metrics(&app, &user).await,
        json!({ "totalMeals": 3, "mealsOnDiet": 2, "mealsOffDiet": 1, "bestStreak": 1 })
    );
}

#[tokio::test]
async fn metrics_consecutive_on_diet_meals() {
    let app = app();
    let user = create_user(&app, "John Doe").await;
    let other = create_user(&app, "Other").await;
    for title in ["M1", "M2", "M3"] {
        create_meal(&app, &user, title, true).await;
    }
    create_meal(&app, &other, "Noise", false).await;

    let body = metrics(&app, &user).await;
    assert_eq!(body["bestStreak"], 3);
    assert_eq!(body["totalMeals"], 3);
}

#[tokio::test]
async fn metrics_follow_toggled_flags() {
    let app = app();
    let user = create_user(&app, "John Doe").await;
    create_meal(&app, &user, "M1", true).await;
    let middle = create_meal(&app, &user, "M2", false).await;
    create_meal(&app, &user, "M3", true).await;

    send(&app, Method::PATCH, &format!("/meals/{middle}/is-on-the-diet"), Some(&user), None).await;

    let body = metrics(&app, &user).await;
    assert_eq!(body["bestStreak"], 3);
    assert_eq!(body["mealsOffDiet"], 0);
}

#[tokio::test]
async fn health_is_public() {
    let app = app();
    let (status, body) = send(&app, Method::GET, "/health", None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
}
