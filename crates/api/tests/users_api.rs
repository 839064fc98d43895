//! HTTP-level integration tests for the `/users` endpoints.

mod common;

use axum::http::StatusCode;
use common::{body_json, delete, get, get_auth, post_json, post_json_auth, put_json};
use serde_json::json;
use sqlx::PgPool;
use storefront_db::repositories::UserRepo;

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

const PASSWORD: &str = "hunter2-but-longer";

/// Register a user through the API and return the `data` object.
async fn register(pool: &PgPool, email: &str) -> serde_json::Value {
    let app = common::build_test_app(pool.clone());
    let body = json!({
        "email": email,
        "first_name": "Ada",
        "last_name": "Lovelace",
        "address": "12 Analytical Row",
        "password": PASSWORD,
    });
    let response = post_json(app, "/api/v1/users/register", body).await;
    assert_eq!(response.status(), StatusCode::CREATED);
    body_json(response).await["data"].clone()
}

/// Log in through the API and return the access token.
async fn login(pool: &PgPool, email: &str) -> String {
    let app = common::build_test_app(pool.clone());
    let body = json!({ "email": email, "password": PASSWORD });
    let response = post_json(app, "/api/v1/users/login", body).await;
    assert_eq!(response.status(), StatusCode::OK);
    body_json(response).await["data"]["access_token"]
        .as_str()
        .expect("access_token should be a string")
        .to_string()
}

/// Register an account, promote it to admin, and return its token.
async fn admin_token(pool: &PgPool) -> String {
    let admin = register(pool, "admin@shop.test").await;
    let id = admin["id"].as_i64().unwrap();
    assert!(UserRepo::set_admin(pool, id, true).await.unwrap());
    login(pool, "admin@shop.test").await
}

// ---------------------------------------------------------------------------
// Registration
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../db/migrations")]
async fn register_returns_201_without_password_hash(pool: PgPool) {
    let user = register(&pool, "ada@shop.test").await;

    assert!(user["id"].is_number());
    assert_eq!(user["email"], "ada@shop.test");
    assert_eq!(user["first_name"], "Ada");
    assert_eq!(user["is_admin"], false);
    assert!(user.get("password_hash").is_none());
}

#[sqlx::test(migrations = "../db/migrations")]
async fn duplicate_email_returns_409_and_keeps_one_row(pool: PgPool) {
    register(&pool, "dup@shop.test").await;

    let app = common::build_test_app(pool.clone());
    let body = json!({
        "email": "dup@shop.test",
        "first_name": "Other",
        "last_name": "Person",
        "password": PASSWORD,
    });
    let response = post_json(app, "/api/v1/users/register", body).await;
    assert_eq!(response.status(), StatusCode::CONFLICT);
    let json = body_json(response).await;
    assert_eq!(json["code"], "CONFLICT");

    let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM users WHERE email = $1")
        .bind("dup@shop.test")
        .fetch_one(&pool)
        .await
        .unwrap();
    assert_eq!(count, 1);
}

#[sqlx::test(migrations = "../db/migrations")]
async fn short_password_returns_400(pool: PgPool) {
    let app = common::build_test_app(pool);
    let body = json!({
        "email": "short@shop.test",
        "first_name": "Short",
        "last_name": "Pass",
        "password": "abc",
    });
    let response = post_json(app, "/api/v1/users/register", body).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body_json(response).await["code"], "VALIDATION_ERROR");
}

#[sqlx::test(migrations = "../db/migrations")]
async fn malformed_email_returns_400(pool: PgPool) {
    let app = common::build_test_app(pool);
    let body = json!({
        "email": "not-an-email",
        "first_name": "Bad",
        "last_name": "Email",
        "password": PASSWORD,
    });
    let response = post_json(app, "/api/v1/users/register", body).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

// ---------------------------------------------------------------------------
// Login
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../db/migrations")]
async fn login_success_returns_token_and_user(pool: PgPool) {
    let user = register(&pool, "login@shop.test").await;

    let app = common::build_test_app(pool);
    let body = json!({ "email": "login@shop.test", "password": PASSWORD });
    let response = post_json(app, "/api/v1/users/login", body).await;
    assert_eq!(response.status(), StatusCode::OK);

    let json = body_json(response).await;
    assert!(json["data"]["access_token"].is_string());
    assert_eq!(json["data"]["expires_in"], 15 * 60);
    assert_eq!(json["data"]["user"]["id"], user["id"]);
}

#[sqlx::test(migrations = "../db/migrations")]
async fn login_wrong_password_returns_401(pool: PgPool) {
    register(&pool, "wrongpw@shop.test").await;

    let app = common::build_test_app(pool);
    let body = json!({ "email": "wrongpw@shop.test", "password": "not-the-password" });
    let response = post_json(app, "/api/v1/users/login", body).await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[sqlx::test(migrations = "../db/migrations")]
async fn login_unknown_email_returns_same_401(pool: PgPool) {
    register(&pool, "known@shop.test").await;

    let wrong_pw = post_json(
        common::build_test_app(pool.clone()),
        "/api/v1/users/login",
        json!({ "email": "known@shop.test", "password": "not-the-password" }),
    )
    .await;
    let unknown = post_json(
        common::build_test_app(pool),
        "/api/v1/users/login",
        json!({ "email": "nobody@shop.test", "password": PASSWORD }),
    )
    .await;

    assert_eq!(unknown.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(body_json(unknown).await, body_json(wrong_pw).await);
}

// ---------------------------------------------------------------------------
// Lookup, update, delete
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../db/migrations")]
async fn get_user_by_id_and_missing_returns_404(pool: PgPool) {
    let user = register(&pool, "get@shop.test").await;
    let id = user["id"].as_i64().unwrap();

    let response = get(
        common::build_test_app(pool.clone()),
        &format!("/api/v1/users/{id}"),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await["data"]["email"], "get@shop.test");

    let response = get(common::build_test_app(pool), "/api/v1/users/999999").await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    let json = body_json(response).await;
    assert_eq!(json["code"], "NOT_FOUND");
    assert!(json["error"].as_str().unwrap().contains("999999"));
}

#[sqlx::test(migrations = "../db/migrations")]
async fn lookup_by_email_and_exists(pool: PgPool) {
    register(&pool, "lookup@shop.test").await;

    let response = get(
        common::build_test_app(pool.clone()),
        "/api/v1/users/by-email?email=lookup@shop.test",
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await["data"]["last_name"], "Lovelace");

    let response = get(
        common::build_test_app(pool.clone()),
        "/api/v1/users/by-email?email=missing@shop.test",
    )
    .await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let response = get(
        common::build_test_app(pool.clone()),
        "/api/v1/users/exists?email=lookup@shop.test",
    )
    .await;
    assert_eq!(body_json(response).await["data"]["exists"], true);

    let response = get(
        common::build_test_app(pool),
        "/api/v1/users/exists?email=missing@shop.test",
    )
    .await;
    assert_eq!(body_json(response).await["data"]["exists"], false);
}

#[sqlx::test(migrations = "../db/migrations")]
async fn email_lookup_without_query_returns_400_json(pool: PgPool) {
    let response = get(common::build_test_app(pool), "/api/v1/users/exists").await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body_json(response).await["code"], "VALIDATION_ERROR");
}

#[sqlx::test(migrations = "../db/migrations")]
async fn register_missing_password_returns_400_json(pool: PgPool) {
    let body = json!({
        "email": "nopass@shop.test",
        "first_name": "No",
        "last_name": "Pass",
    });
    let response = post_json(
        common::build_test_app(pool.clone()),
        "/api/v1/users/register",
        body,
    )
    .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body_json(response).await["code"], "VALIDATION_ERROR");

    let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM users")
        .fetch_one(&pool)
        .await
        .unwrap();
    assert_eq!(count, 0);
}

#[sqlx::test(migrations = "../db/migrations")]
async fn update_user_changes_only_given_fields(pool: PgPool) {
    let user = register(&pool, "update@shop.test").await;
    let id = user["id"].as_i64().unwrap();

    let response = put_json(
        common::build_test_app(pool.clone()),
        &format!("/api/v1/users/{id}"),
        json!({ "address": "1 New Street" }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);

    let json = body_json(response).await;
    assert_eq!(json["data"]["address"], "1 New Street");
    assert_eq!(json["data"]["first_name"], "Ada");
    assert_eq!(json["data"]["email"], "update@shop.test");
}

#[sqlx::test(migrations = "../db/migrations")]
async fn update_to_taken_email_returns_409(pool: PgPool) {
    register(&pool, "first@shop.test").await;
    let second = register(&pool, "second@shop.test").await;
    let id = second["id"].as_i64().unwrap();

    let response = put_json(
        common::build_test_app(pool),
        &format!("/api/v1/users/{id}"),
        json!({ "email": "first@shop.test" }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::CONFLICT);
}

#[sqlx::test(migrations = "../db/migrations")]
async fn delete_user_returns_204_then_404(pool: PgPool) {
    let user = register(&pool, "delete@shop.test").await;
    let uri = format!("/api/v1/users/{}", user["id"]);

    let response = delete(common::build_test_app(pool.clone()), &uri).await;
    assert_eq!(response.status(), StatusCode::NO_CONTENT);

    let response = get(common::build_test_app(pool.clone()), &uri).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let response = delete(common::build_test_app(pool), &uri).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

// ---------------------------------------------------------------------------
// Admin-only endpoints
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../db/migrations")]
async fn list_users_requires_token(pool: PgPool) {
    let response = get(common::build_test_app(pool), "/api/v1/users").await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[sqlx::test(migrations = "../db/migrations")]
async fn list_users_forbidden_for_non_admin(pool: PgPool) {
    register(&pool, "plain@shop.test").await;
    let token = login(&pool, "plain@shop.test").await;

    let response = get_auth(common::build_test_app(pool), "/api/v1/users", &token).await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
}

#[sqlx::test(migrations = "../db/migrations")]
async fn admin_lists_users(pool: PgPool) {
    register(&pool, "member@shop.test").await;
    let token = admin_token(&pool).await;

    let response = get_auth(common::build_test_app(pool), "/api/v1/users", &token).await;
    assert_eq!(response.status(), StatusCode::OK);

    let json = body_json(response).await;
    assert_eq!(json["data"].as_array().unwrap().len(), 2);
}

#[sqlx::test(migrations = "../db/migrations")]
async fn admin_toggles_admin_flag(pool: PgPool) {
    let member = register(&pool, "promote@shop.test").await;
    let token = admin_token(&pool).await;
    let uri = format!("/api/v1/users/{}/toggle-admin", member["id"]);

    let response =
        post_json_auth(common::build_test_app(pool.clone()), &uri, json!({}), &token).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await["data"]["is_admin"], true);

    let response = post_json_auth(common::build_test_app(pool), &uri, json!({}), &token).await;
    assert_eq!(body_json(response).await["data"]["is_admin"], false);
}

#[sqlx::test(migrations = "../db/migrations")]
async fn demoted_admin_loses_access_before_token_expiry(pool: PgPool) {
    let token = admin_token(&pool).await;
    let admin = UserRepo::find_by_email(&pool, "admin@shop.test")
        .await
        .unwrap()
        .unwrap();
    assert!(UserRepo::set_admin(&pool, admin.id, false).await.unwrap());

    let response = get_auth(common::build_test_app(pool), "/api/v1/users", &token).await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
}

#[sqlx::test(migrations = "../db/migrations")]
async fn deleting_a_user_removes_their_cart(pool: PgPool) {
    let user = register(&pool, "cart-owner@shop.test").await;
    let user_id = user["id"].as_i64().unwrap();

    let item_id: i64 = sqlx::query_scalar(
        "INSERT INTO items (title, price_cents, quantity) VALUES ('Mug', 900, 5) RETURNING id",
    )
    .fetch_one(&pool)
    .await
    .unwrap();
    let response = post_json(
        common::build_test_app(pool.clone()),
        "/api/v1/cart/add",
        json!({ "user_id": user_id, "item_id": item_id, "quantity": 1 }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);

    let response = delete(
        common::build_test_app(pool.clone()),
        &format!("/api/v1/users/{user_id}"),
    )
    .await;
    assert_eq!(response.status(), StatusCode::NO_CONTENT);

    let lines: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM cart_lines WHERE user_id = $1")
        .bind(user_id)
        .fetch_one(&pool)
        .await
        .unwrap();
    assert_eq!(lines, 0);
}
