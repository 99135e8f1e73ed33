//! End-to-end API tests over an in-memory SQLite database.
//!
//! Each test builds a full router and drives it with `tower::ServiceExt`
//! oneshot requests, cookies included, the way a browser client would.

use std::str::FromStr;

use axum::Router;
use axum::body::Body;
use axum::http::{Request, Response, StatusCode, header};
use serde_json::{Value, json};
use sqlx::SqlitePool;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use tower::ServiceExt;

use evergreen_core::UserRole;
use evergreen_server::build_router;
use evergreen_server::config::ServerConfig;
use evergreen_server::db::users::{NewUser, UserRepository};
use evergreen_server::db::{self, catalog::CatalogRepository};
use evergreen_server::services::auth::hash_password;
use evergreen_server::services::token::TokenCodec;
use evergreen_server::state::AppState;

const PRIVATE_PEM: &[u8] = include_bytes!("../testdata/jwt_private.pem");
const PUBLIC_PEM: &[u8] = include_bytes!("../testdata/jwt_public.pem");

/// Single-connection pool so the in-memory database is shared and lives for
/// the whole test.
async fn test_pool() -> SqlitePool {
    let options = SqliteConnectOptions::from_str("sqlite::memory:")
        .expect("parse sqlite url")
        .foreign_keys(true);
    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .min_connections(1)
        .idle_timeout(None)
        .max_lifetime(None)
        .connect_with(options)
        .await
        .expect("connect");
    db::migrate(&pool).await.expect("migrate");
    pool
}

fn test_config() -> ServerConfig {
    let static_dir = std::env::temp_dir()
        .join(format!("evergreen-test-{}", uuid::Uuid::new_v4().simple()))
        .to_string_lossy()
        .into_owned();
    ServerConfig {
        database_url: secrecy::SecretString::from("sqlite::memory:"),
        host: "127.0.0.1".parse().expect("host"),
        port: 0,
        static_dir,
        jwt_private_key_path: String::new(),
        jwt_public_key_path: String::new(),
        token_ttl_minutes: 15,
        allowed_origins: vec!["http://localhost:8080".to_owned()],
    }
}

async fn test_app() -> (Router, SqlitePool) {
    let pool = test_pool().await;
    let tokens = TokenCodec::from_pem(PRIVATE_PEM, PUBLIC_PEM, 15).expect("codec");
    let state = AppState::new(test_config(), pool.clone(), tokens);
    (build_router(state), pool)
}

/// Insert an admin account directly; the API only registers customers.
async fn create_admin(pool: &SqlitePool, username: &str, password: &str) {
    UserRepository::new(pool)
        .create(NewUser {
            username: username.to_owned(),
            full_name: "Test Admin".to_owned(),
            email: format!("{username}@evergreen.shop"),
            password_hash: hash_password(password).expect("hash"),
            role: UserRole::Admin,
            phone: String::new(),
            address: String::new(),
        })
        .await
        .expect("create admin");
}

async fn create_category(pool: &SqlitePool, slug: &str) {
    CatalogRepository::new(pool)
        .insert_category(slug, slug, "test category", "/static/media/test.png")
        .await
        .expect("create category");
}

fn request(method: &str, uri: &str, cookie: Option<&str>, body: Option<Value>) -> Request<Body> {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(cookie) = cookie {
        builder = builder.header(header::COOKIE, cookie);
    }
    match body {
        Some(json) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(json.to_string()))
            .expect("request"),
        None => builder.body(Body::empty()).expect("request"),
    }
}

async fn send(app: &Router, req: Request<Body>) -> Response<Body> {
    app.clone().oneshot(req).await.expect("infallible")
}

async fn json_body(response: Response<Body>) -> Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("read body");
    if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).expect("json body")
    }
}

/// `shop_access_token=<value>` from the Set-Cookie header.
fn auth_cookie(response: &Response<Body>) -> String {
    let set_cookie = response
        .headers()
        .get(header::SET_COOKIE)
        .expect("set-cookie header")
        .to_str()
        .expect("ascii cookie");
    assert!(set_cookie.starts_with("shop_access_token="));
    set_cookie
        .split(';')
        .next()
        .expect("cookie pair")
        .to_owned()
}

async fn register(app: &Router, username: &str, password: &str) -> (String, i64) {
    let response = send(
        app,
        request(
            "POST",
            "/api/v1/shop/auth/register",
            None,
            Some(json!({
                "username": username,
                "email": format!("{username}@example.com"),
                "password": password,
            })),
        ),
    )
    .await;
    assert_eq!(response.status(), StatusCode::CREATED);
    let cookie = auth_cookie(&response);
    let body = json_body(response).await;
    let id = body["user"]["id"].as_i64().expect("user id");
    (cookie, id)
}

async fn login(app: &Router, username: &str, password: &str) -> Response<Body> {
    send(
        app,
        request(
            "POST",
            "/api/v1/shop/auth/login",
            None,
            Some(json!({ "username": username, "password": password })),
        ),
    )
    .await
}

#[tokio::test]
async fn register_then_login_round_trips() {
    let (app, _pool) = test_app().await;

    let (cookie, _) = register(&app, "alice", "pw123").await;

    // The fresh cookie authenticates /auth/me.
    let response = send(&app, request("GET", "/api/v1/shop/auth/me", Some(&cookie), None)).await;
    assert_eq!(response.status(), StatusCode::OK);
    let body = json_body(response).await;
    assert_eq!(body["user"]["username"], "alice");
    assert_eq!(body["user"]["role"], "customer");
    assert_eq!(body["access_token"], "");

    let ok = login(&app, "alice", "pw123").await;
    assert_eq!(ok.status(), StatusCode::OK);

    let wrong = login(&app, "alice", "wrong").await;
    assert_eq!(wrong.status(), StatusCode::UNAUTHORIZED);

    let unknown = login(&app, "nobody", "pw123").await;
    assert_eq!(unknown.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn duplicate_registration_is_rejected() {
    let (app, _pool) = test_app().await;
    register(&app, "alice", "pw123").await;

    let taken_username = send(
        &app,
        request(
            "POST",
            "/api/v1/shop/auth/register",
            None,
            Some(json!({
                "username": "alice",
                "email": "other@example.com",
                "password": "pw456",
            })),
        ),
    )
    .await;
    assert_eq!(taken_username.status(), StatusCode::BAD_REQUEST);

    // A fresh username cannot reuse a registered email either.
    let taken_email = send(
        &app,
        request(
            "POST",
            "/api/v1/shop/auth/register",
            None,
            Some(json!({
                "username": "bob",
                "email": "alice@example.com",
                "password": "pw456",
            })),
        ),
    )
    .await;
    assert_eq!(taken_email.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn protected_routes_fail_closed() {
    let (app, _pool) = test_app().await;

    let no_cookie = send(&app, request("GET", "/api/v1/shop/auth/me", None, None)).await;
    assert_eq!(no_cookie.status(), StatusCode::UNAUTHORIZED);

    let garbage = send(
        &app,
        request(
            "GET",
            "/api/v1/shop/auth/me",
            Some("shop_access_token=not-a-token"),
            None,
        ),
    )
    .await;
    assert_eq!(garbage.status(), StatusCode::UNAUTHORIZED);

    let estimate = send(
        &app,
        request(
            "POST",
            "/api/v1/shop/cart/estimate",
            None,
            Some(json!({ "items": [] })),
        ),
    )
    .await;
    assert_eq!(estimate.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn logout_clears_the_cookie() {
    let (app, _pool) = test_app().await;
    let (cookie, _) = register(&app, "alice", "pw123").await;

    let response = send(
        &app,
        request("POST", "/api/v1/shop/auth/logout", Some(&cookie), None),
    )
    .await;
    assert_eq!(response.status(), StatusCode::NO_CONTENT);
    let set_cookie = response
        .headers()
        .get(header::SET_COOKIE)
        .expect("set-cookie")
        .to_str()
        .expect("ascii");
    assert!(set_cookie.starts_with("shop_access_token="));
}

#[tokio::test]
async fn admin_creates_product_and_reads_it_back() {
    let (app, pool) = test_app().await;
    create_admin(&pool, "admin", "admin").await;
    create_category(&pool, "smart-home").await;

    let admin_cookie = auth_cookie(&login(&app, "admin", "admin").await);

    let created = send(
        &app,
        request(
            "POST",
            "/api/v1/shop/products",
            Some(&admin_cookie),
            Some(json!({
                "id": "p1",
                "title": "Test Hub",
                "description": "A test product.",
                "category_id": "smart-home",
                "price": 100.0,
            })),
        ),
    )
    .await;
    assert_eq!(created.status(), StatusCode::CREATED);

    let detail = send(&app, request("GET", "/api/v1/shop/products/p1", None, None)).await;
    assert_eq!(detail.status(), StatusCode::OK);
    let body = json_body(detail).await;
    assert_eq!(body["price"], 100.0);
    assert_eq!(body["categories"], json!(["smart-home"]));

    // Duplicate id.
    let duplicate = send(
        &app,
        request(
            "POST",
            "/api/v1/shop/products",
            Some(&admin_cookie),
            Some(json!({
                "id": "p1",
                "title": "Again",
                "description": "dup",
                "category_id": "smart-home",
                "price": 1.0,
            })),
        ),
    )
    .await;
    assert_eq!(duplicate.status(), StatusCode::BAD_REQUEST);

    // Unknown category slug.
    let unknown_category = send(
        &app,
        request(
            "POST",
            "/api/v1/shop/products",
            Some(&admin_cookie),
            Some(json!({
                "id": "p2",
                "title": "Orphan",
                "description": "no category",
                "category_id": "does-not-exist",
                "price": 1.0,
            })),
        ),
    )
    .await;
    assert_eq!(unknown_category.status(), StatusCode::NOT_FOUND);

    let missing = send(&app, request("GET", "/api/v1/shop/products/nope", None, None)).await;
    assert_eq!(missing.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn product_creation_requires_admin() {
    let (app, pool) = test_app().await;
    create_category(&pool, "smart-home").await;
    let (customer_cookie, _) = register(&app, "alice", "pw123").await;

    let response = send(
        &app,
        request(
            "POST",
            "/api/v1/shop/products",
            Some(&customer_cookie),
            Some(json!({
                "id": "p1",
                "title": "Nope",
                "description": "forbidden",
                "category_id": "smart-home",
                "price": 1.0,
            })),
        ),
    )
    .await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn category_filter_accepts_dash_and_underscore() {
    let (app, pool) = test_app().await;
    create_admin(&pool, "admin", "admin").await;
    create_category(&pool, "zero-waste").await;
    create_category(&pool, "smart-home").await;
    let admin_cookie = auth_cookie(&login(&app, "admin", "admin").await);

    for (id, category) in [("zw1", "zero-waste"), ("zw2", "zero-waste"), ("sh1", "smart-home")] {
        let response = send(
            &app,
            request(
                "POST",
                "/api/v1/shop/products",
                Some(&admin_cookie),
                Some(json!({
                    "id": id,
                    "title": id,
                    "description": "filter test",
                    "category_id": category,
                    "price": 10.0,
                })),
            ),
        )
        .await;
        assert_eq!(response.status(), StatusCode::CREATED);
    }

    let dash = json_body(
        send(
            &app,
            request("GET", "/api/v1/shop/products?category=zero-waste", None, None),
        )
        .await,
    )
    .await;
    let underscore = json_body(
        send(
            &app,
            request("GET", "/api/v1/shop/products?category=zero_waste", None, None),
        )
        .await,
    )
    .await;

    assert_eq!(dash.as_array().expect("array").len(), 2);
    assert_eq!(dash, underscore);
}

/// Create the service `svc-1` at price 100 in `smart-home`.
async fn create_svc1(app: &Router, admin_cookie: &str) {
    let response = send(
        app,
        request(
            "POST",
            "/api/v1/shop/services",
            Some(admin_cookie),
            Some(json!({
                "id": "svc-1",
                "title": "Test Service",
                "description": "A bookable service.",
                "price": 100.0,
                "category_id": "smart-home",
            })),
        ),
    )
    .await;
    assert_eq!(response.status(), StatusCode::CREATED);
}

#[tokio::test]
async fn cart_estimate_totals_and_breakdown() {
    let (app, pool) = test_app().await;
    create_admin(&pool, "admin", "admin").await;
    create_category(&pool, "smart-home").await;
    let admin_cookie = auth_cookie(&login(&app, "admin", "admin").await);
    create_svc1(&app, &admin_cookie).await;

    let (cookie, _) = register(&app, "alice", "pw123").await;

    // Two lines for the same id: totals accumulate, breakdown keeps the
    // last line.
    let response = send(
        &app,
        request(
            "POST",
            "/api/v1/shop/cart/estimate",
            Some(&cookie),
            Some(json!({
                "items": [
                    { "productId": "svc-1", "quantity": 2 },
                    { "product_id": "svc-1", "quantity": 3 },
                ]
            })),
        ),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    let body = json_body(response).await;
    assert_eq!(body["total_items"], 5);
    assert_eq!(body["total_sum"], 500.0);
    assert_eq!(body["currency"], "RUB");
    assert_eq!(body["breakdown"]["svc-1"], 300.0);

    // Estimation never materializes anything.
    let detail = send(&app, request("GET", "/api/v1/shop/products/svc-1", None, None)).await;
    assert_eq!(detail.status(), StatusCode::NOT_FOUND);

    // Unknown id fails the whole estimate.
    let unknown = send(
        &app,
        request(
            "POST",
            "/api/v1/shop/cart/estimate",
            Some(&cookie),
            Some(json!({ "items": [{ "product_id": "ghost", "quantity": 1 }] })),
        ),
    )
    .await;
    assert_eq!(unknown.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn cart_quantity_bounds_are_enforced() {
    let (app, _pool) = test_app().await;
    let (cookie, _) = register(&app, "alice", "pw123").await;

    for quantity in [0, 100, -1] {
        let response = send(
            &app,
            request(
                "POST",
                "/api/v1/shop/cart/estimate",
                Some(&cookie),
                Some(json!({ "items": [{ "product_id": "p1", "quantity": quantity }] })),
            ),
        )
        .await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }
}

#[tokio::test]
async fn ordering_a_service_materializes_it_once() {
    let (app, pool) = test_app().await;
    create_admin(&pool, "admin", "admin").await;
    create_category(&pool, "smart-home").await;
    let admin_cookie = auth_cookie(&login(&app, "admin", "admin").await);
    create_svc1(&app, &admin_cookie).await;

    let (cookie, _) = register(&app, "alice", "pw123").await;

    let first = send(
        &app,
        request(
            "POST",
            "/api/v1/shop/orders",
            Some(&cookie),
            Some(json!({ "items": [{ "product_id": "svc-1", "quantity": 2 }] })),
        ),
    )
    .await;
    assert_eq!(first.status(), StatusCode::CREATED);
    let body = json_body(first).await;
    assert!(body["id"].as_str().expect("order id").starts_with("ORD-"));
    assert_eq!(body["status"], "new");
    assert_eq!(body["total_sum"], 200.0);
    assert_eq!(body["items"][0]["quantity"], 2);
    assert_eq!(body["items"][0]["price"], 100.0);
    assert_eq!(body["items"][0]["product"]["id"], "svc-1");
    assert_eq!(body["customer"]["username"], "alice");

    // The service now exists as a marked product row.
    let detail = send(&app, request("GET", "/api/v1/shop/products/svc-1", None, None)).await;
    assert_eq!(detail.status(), StatusCode::OK);
    let product = json_body(detail).await;
    assert_eq!(product["characteristics"]["type"], "service");
    assert_eq!(product["categories"], json!(["smart-home"]));

    // A second order resolves the existing row instead of re-inserting.
    let second = send(
        &app,
        request(
            "POST",
            "/api/v1/shop/orders",
            Some(&cookie),
            Some(json!({ "items": [{ "product_id": "svc-1", "quantity": 1 }] })),
        ),
    )
    .await;
    assert_eq!(second.status(), StatusCode::CREATED);

    // Unknown item aborts the whole order.
    let unknown = send(
        &app,
        request(
            "POST",
            "/api/v1/shop/orders",
            Some(&cookie),
            Some(json!({ "items": [{ "product_id": "ghost", "quantity": 1 }] })),
        ),
    )
    .await;
    assert_eq!(unknown.status(), StatusCode::NOT_FOUND);
}

/// Create the category-less service `svc-free` at price 50.
async fn create_svc_free(app: &Router, admin_cookie: &str) {
    let response = send(
        app,
        request(
            "POST",
            "/api/v1/shop/services",
            Some(admin_cookie),
            Some(json!({
                "id": "svc-free",
                "title": "Floating Service",
                "description": "No category attached.",
                "price": 50.0,
            })),
        ),
    )
    .await;
    assert_eq!(response.status(), StatusCode::CREATED);
    let body = json_body(response).await;
    assert_eq!(body["category_id"], Value::Null);
}

#[tokio::test]
async fn category_less_service_falls_back_to_oldest_category() {
    let (app, pool) = test_app().await;
    create_admin(&pool, "admin", "admin").await;
    // Insertion order fixes the ids; the fallback must pick the first row.
    create_category(&pool, "zero-waste").await;
    create_category(&pool, "smart-home").await;
    let admin_cookie = auth_cookie(&login(&app, "admin", "admin").await);
    create_svc_free(&app, &admin_cookie).await;

    let (cookie, _) = register(&app, "alice", "pw123").await;
    let placed = send(
        &app,
        request(
            "POST",
            "/api/v1/shop/orders",
            Some(&cookie),
            Some(json!({ "items": [{ "product_id": "svc-free", "quantity": 1 }] })),
        ),
    )
    .await;
    assert_eq!(placed.status(), StatusCode::CREATED);
    let body = json_body(placed).await;
    assert_eq!(body["total_sum"], 50.0);

    // The materialized product landed in the lowest-id category.
    let detail = send(&app, request("GET", "/api/v1/shop/products/svc-free", None, None)).await;
    assert_eq!(detail.status(), StatusCode::OK);
    let product = json_body(detail).await;
    assert_eq!(product["categories"], json!(["zero-waste"]));
    assert_eq!(product["characteristics"]["type"], "service");
}

#[tokio::test]
async fn ordering_without_any_category_is_rejected() {
    let (app, pool) = test_app().await;
    create_admin(&pool, "admin", "admin").await;
    let admin_cookie = auth_cookie(&login(&app, "admin", "admin").await);
    // No categories exist at all, so the fallback has nothing to offer.
    create_svc_free(&app, &admin_cookie).await;

    let (cookie, _) = register(&app, "alice", "pw123").await;
    let placed = send(
        &app,
        request(
            "POST",
            "/api/v1/shop/orders",
            Some(&cookie),
            Some(json!({ "items": [{ "product_id": "svc-free", "quantity": 1 }] })),
        ),
    )
    .await;
    assert_eq!(placed.status(), StatusCode::BAD_REQUEST);

    // The whole transaction rolled back: no product row, no order.
    let detail = send(&app, request("GET", "/api/v1/shop/products/svc-free", None, None)).await;
    assert_eq!(detail.status(), StatusCode::NOT_FOUND);
    let orders =
        json_body(send(&app, request("GET", "/api/v1/shop/orders", Some(&cookie), None)).await)
            .await;
    assert_eq!(orders.as_array().expect("array").len(), 0);
}

#[tokio::test]
async fn order_listing_enforces_ownership() {
    let (app, pool) = test_app().await;
    create_admin(&pool, "admin", "admin").await;
    create_category(&pool, "smart-home").await;
    let admin_cookie = auth_cookie(&login(&app, "admin", "admin").await);
    create_svc1(&app, &admin_cookie).await;

    let (alice, alice_id) = register(&app, "alice", "pw123").await;
    let (bob, _) = register(&app, "bob", "pw456").await;

    let placed = send(
        &app,
        request(
            "POST",
            "/api/v1/shop/orders",
            Some(&alice),
            Some(json!({ "items": [{ "product_id": "svc-1", "quantity": 1 }] })),
        ),
    )
    .await;
    assert_eq!(placed.status(), StatusCode::CREATED);

    // Alice sees her own order, with or without the explicit filter.
    let own = json_body(send(&app, request("GET", "/api/v1/shop/orders", Some(&alice), None)).await)
        .await;
    assert_eq!(own.as_array().expect("array").len(), 1);

    let explicit = send(
        &app,
        request(
            "GET",
            &format!("/api/v1/shop/orders?customer_id={alice_id}"),
            Some(&alice),
            None,
        ),
    )
    .await;
    assert_eq!(explicit.status(), StatusCode::OK);

    // Bob asking for Alice's orders is forbidden, never an empty list.
    let cross = send(
        &app,
        request(
            "GET",
            &format!("/api/v1/shop/orders?customer_id={alice_id}"),
            Some(&bob),
            None,
        ),
    )
    .await;
    assert_eq!(cross.status(), StatusCode::FORBIDDEN);

    // Bob without a filter sees only his own (none).
    let bobs =
        json_body(send(&app, request("GET", "/api/v1/shop/orders", Some(&bob), None)).await).await;
    assert_eq!(bobs.as_array().expect("array").len(), 0);

    // Admin sees everything and may filter by any customer.
    let all =
        json_body(send(&app, request("GET", "/api/v1/shop/orders", Some(&admin_cookie), None)).await)
            .await;
    assert_eq!(all.as_array().expect("array").len(), 1);

    // Non-numeric filter is a bad request.
    let bad = send(
        &app,
        request(
            "GET",
            "/api/v1/shop/orders?customer_id=abc",
            Some(&admin_cookie),
            None,
        ),
    )
    .await;
    assert_eq!(bad.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn admin_moves_orders_between_any_statuses() {
    let (app, pool) = test_app().await;
    create_admin(&pool, "admin", "admin").await;
    create_category(&pool, "smart-home").await;
    let admin_cookie = auth_cookie(&login(&app, "admin", "admin").await);
    create_svc1(&app, &admin_cookie).await;

    let (alice, _) = register(&app, "alice", "pw123").await;
    let placed = json_body(
        send(
            &app,
            request(
                "POST",
                "/api/v1/shop/orders",
                Some(&alice),
                Some(json!({ "items": [{ "product_id": "svc-1", "quantity": 1 }] })),
            ),
        )
        .await,
    )
    .await;
    let order_id = placed["id"].as_str().expect("order id").to_owned();

    // completed straight from new, then back again: no transition graph.
    for status in ["completed", "new", "canceled"] {
        let response = send(
            &app,
            request(
                "PATCH",
                &format!("/api/v1/shop/orders/{order_id}"),
                Some(&admin_cookie),
                Some(json!({ "status": status })),
            ),
        )
        .await;
        assert_eq!(response.status(), StatusCode::OK);
        let body = json_body(response).await;
        assert_eq!(body["status"], status);
    }

    let not_admin = send(
        &app,
        request(
            "PATCH",
            &format!("/api/v1/shop/orders/{order_id}"),
            Some(&alice),
            Some(json!({ "status": "completed" })),
        ),
    )
    .await;
    assert_eq!(not_admin.status(), StatusCode::FORBIDDEN);

    let missing = send(
        &app,
        request(
            "PATCH",
            "/api/v1/shop/orders/ORD-00000000",
            Some(&admin_cookie),
            Some(json!({ "status": "completed" })),
        ),
    )
    .await;
    assert_eq!(missing.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn admin_lists_and_updates_users() {
    let (app, pool) = test_app().await;
    create_admin(&pool, "admin", "admin").await;
    let admin_cookie = auth_cookie(&login(&app, "admin", "admin").await);
    let (_, alice_id) = register(&app, "alice", "pw123").await;

    let admins = json_body(
        send(
            &app,
            request("GET", "/api/v1/shop/admin/users?role=admin", Some(&admin_cookie), None),
        )
        .await,
    )
    .await;
    assert_eq!(admins.as_array().expect("array").len(), 1);
    assert_eq!(admins[0]["username"], "admin");

    let everyone = json_body(
        send(
            &app,
            request("GET", "/api/v1/shop/admin/users", Some(&admin_cookie), None),
        )
        .await,
    )
    .await;
    assert_eq!(everyone.as_array().expect("array").len(), 2);

    // Customers cannot touch the admin surface.
    let alice_login = login(&app, "alice", "pw123").await;
    let alice_cookie = auth_cookie(&alice_login);
    let forbidden = send(
        &app,
        request("GET", "/api/v1/shop/admin/users", Some(&alice_cookie), None),
    )
    .await;
    assert_eq!(forbidden.status(), StatusCode::FORBIDDEN);

    // Phone and password update; the new password logs in.
    let updated = send(
        &app,
        request(
            "PATCH",
            &format!("/api/v1/shop/admin/users/{alice_id}"),
            Some(&admin_cookie),
            Some(json!({ "phone": "+7 900 555-0001", "password": "fresh" })),
        ),
    )
    .await;
    assert_eq!(updated.status(), StatusCode::OK);
    let body = json_body(updated).await;
    assert_eq!(body["phone"], "+7 900 555-0001");

    assert_eq!(login(&app, "alice", "fresh").await.status(), StatusCode::OK);
    assert_eq!(
        login(&app, "alice", "pw123").await.status(),
        StatusCode::UNAUTHORIZED
    );

    let missing = send(
        &app,
        request(
            "PATCH",
            "/api/v1/shop/admin/users/999999",
            Some(&admin_cookie),
            Some(json!({ "phone": "x" })),
        ),
    )
    .await;
    assert_eq!(missing.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn service_partial_update() {
    let (app, pool) = test_app().await;
    create_admin(&pool, "admin", "admin").await;
    create_category(&pool, "smart-home").await;
    let admin_cookie = auth_cookie(&login(&app, "admin", "admin").await);
    create_svc1(&app, &admin_cookie).await;

    let response = send(
        &app,
        request(
            "PATCH",
            "/api/v1/shop/services/svc-1",
            Some(&admin_cookie),
            Some(json!({ "price": 150.0, "status": "completed" })),
        ),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    let body = json_body(response).await;
    assert_eq!(body["price"], 150.0);
    assert_eq!(body["status"], "completed");
    // Untouched fields survive.
    assert_eq!(body["title"], "Test Service");
    assert_eq!(body["category_id"], "smart-home");

    let missing = send(
        &app,
        request(
            "PATCH",
            "/api/v1/shop/services/ghost",
            Some(&admin_cookie),
            Some(json!({ "price": 1.0 })),
        ),
    )
    .await;
    assert_eq!(missing.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn media_upload_accepts_only_png_data_urls() {
    let (app, pool) = test_app().await;
    create_admin(&pool, "admin", "admin").await;
    let admin_cookie = auth_cookie(&login(&app, "admin", "admin").await);

    for bad in [
        "data:image/jpeg;base64,AAAA",
        "data:text/plain;base64,AAAA",
        "not a data url",
        "data:image/png;base64,%%%",
    ] {
        let response = send(
            &app,
            request(
                "POST",
                "/api/v1/shop/media/upload",
                Some(&admin_cookie),
                Some(json!({ "dataUrl": bad })),
            ),
        )
        .await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST, "payload: {bad}");
    }

    let response = send(
        &app,
        request(
            "POST",
            "/api/v1/shop/media/upload",
            Some(&admin_cookie),
            Some(json!({ "dataUrl": "data:image/png;base64,iVBORw0KGgo=" })),
        ),
    )
    .await;
    assert_eq!(response.status(), StatusCode::CREATED);
    let body = json_body(response).await;
    let url = body["url"].as_str().expect("url");
    assert!(url.starts_with("/static/uploads/media_"));
    assert!(url.ends_with(".png"));
}

#[tokio::test]
async fn health_endpoints_respond() {
    let (app, _pool) = test_app().await;

    let live = send(&app, request("GET", "/health", None, None)).await;
    assert_eq!(live.status(), StatusCode::OK);

    let ready = send(&app, request("GET", "/health/ready", None, None)).await;
    assert_eq!(ready.status(), StatusCode::OK);
}
