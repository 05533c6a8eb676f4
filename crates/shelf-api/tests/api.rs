#![allow(non_snake_case)]

use std::sync::Arc;

use axum::{
    body::{to_bytes, Body},
    http::{header, Request, StatusCode},
    middleware,
    response::Response,
    routing::get as get_route,
    Router,
};
use serde_json::{json, Value};
use shelf_api::middleware::auth::{require_page_auth, AppState, SUBJECT_HEADER};
use shelf_backend::{AuthSettings, Backend};
use tower::ServiceExt;

fn app() -> Router {
    let backend = Arc::new(Backend::in_memory(AuthSettings::default()));
    shelf_api::api_router(AppState::new(backend, false))
}

async fn send(app: &Router, request: Request<Body>) -> Response {
    app.clone().oneshot(request).await.unwrap()
}

async fn body_json(response: Response) -> Value {
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

fn post_json(uri: &str, token: Option<&str>, body: Value) -> Request<Body> {
    let mut builder = Request::post(uri).header(header::CONTENT_TYPE, "application/json");
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
    }
    builder.body(Body::from(body.to_string())).unwrap()
}

fn get(uri: &str) -> Request<Body> {
    Request::get(uri).body(Body::empty()).unwrap()
}

async fn sign_up(app: &Router, email: &str) -> String {
    let response = send(
        app,
        post_json(
            "/api/v1/auth/signup",
            None,
            json!({ "email": email, "password": "secret1" }),
        ),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    body_json(response).await["token"].as_str().unwrap().to_string()
}

async fn add_book(app: &Router, token: &str, title: &str, author: &str, favorite: bool) -> Value {
    let response = send(
        app,
        post_json(
            "/api/v1/books",
            Some(token),
            json!({ "title": title, "author": author, "isFavorite": favorite }),
        ),
    )
    .await;
    assert_eq!(response.status(), StatusCode::CREATED);
    body_json(response).await
}

#[tokio::test]
async fn signup_sets_session_cookie() {
    let app = app();
    let response = send(
        &app,
        post_json(
            "/api/v1/auth/signup",
            None,
            json!({ "email": "reader@example.com", "password": "secret1" }),
        ),
    )
    .await;

    assert_eq!(response.status(), StatusCode::OK);
    let cookie = response
        .headers()
        .get(header::SET_COOKIE)
        .and_then(|v| v.to_str().ok())
        .unwrap()
        .to_string();
    assert!(cookie.starts_with("session_token="));
    assert!(cookie.contains("HttpOnly"));

    let body = body_json(response).await;
    assert_eq!(body["user"]["email"], "reader@example.com");
}

#[tokio::test]
async fn auth_errors_carry_code_and_message() {
    let app = app();
    sign_up(&app, "reader@example.com").await;

    let duplicate = send(
        &app,
        post_json(
            "/api/v1/auth/signup",
            None,
            json!({ "email": "reader@example.com", "password": "secret1" }),
        ),
    )
    .await;
    assert_eq!(duplicate.status(), StatusCode::CONFLICT);
    let body = body_json(duplicate).await;
    assert_eq!(body["code"], "auth/email-already-in-use");
    assert_eq!(
        body["message"],
        "Email is already in use. Please use a different email."
    );

    let wrong = send(
        &app,
        post_json(
            "/api/v1/auth/login",
            None,
            json!({ "email": "reader@example.com", "password": "nope-nope" }),
        ),
    )
    .await;
    assert_eq!(wrong.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(body_json(wrong).await["code"], "auth/wrong-password");
}

#[tokio::test]
async fn me_requires_session() {
    let app = app();
    let anonymous = send(&app, get("/api/v1/auth/me")).await;
    assert_eq!(anonymous.status(), StatusCode::UNAUTHORIZED);

    let token = sign_up(&app, "reader@example.com").await;
    let request = Request::get("/api/v1/auth/me")
        .header(header::COOKIE, format!("session_token={token}"))
        .body(Body::empty())
        .unwrap();
    let response = send(&app, request).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await["email"], "reader@example.com");
}

#[tokio::test]
async fn logout_revokes_session() {
    let app = app();
    let token = sign_up(&app, "reader@example.com").await;

    let response = send(&app, post_json("/api/v1/auth/logout", Some(&token), json!({}))).await;
    assert_eq!(response.status(), StatusCode::OK);

    let request = Request::get("/api/v1/auth/me")
        .header(header::AUTHORIZATION, format!("Bearer {token}"))
        .body(Body::empty())
        .unwrap();
    assert_eq!(send(&app, request).await.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn creating_books_requires_auth_and_valid_fields() {
    let app = app();
    let anonymous = send(
        &app,
        post_json("/api/v1/books", None, json!({ "title": "Dune", "author": "Herbert" })),
    )
    .await;
    assert_eq!(anonymous.status(), StatusCode::UNAUTHORIZED);

    let token = sign_up(&app, "reader@example.com").await;
    let invalid = send(
        &app,
        post_json("/api/v1/books", Some(&token), json!({ "title": " ", "author": "Herbert" })),
    )
    .await;
    assert_eq!(invalid.status(), StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body_json(invalid).await["message"], "Title and author are required");

    let book = add_book(&app, &token, "Dune", "Frank Herbert", false).await;
    assert_eq!(book["status"], "unread");
    assert_eq!(book["rating"], 0);
}

#[tokio::test]
async fn listing_applies_search_filter_and_sort() {
    let app = app();
    let token = sign_up(&app, "reader@example.com").await;
    add_book(&app, &token, "Dune", "Frank Herbert", true).await;
    add_book(&app, &token, "Beloved", "Toni Morrison", false).await;
    add_book(&app, &token, "Children of Dune", "Frank Herbert", false).await;

    let titles = |body: Value| -> Vec<String> {
        body.as_array()
            .unwrap()
            .iter()
            .map(|b| b["title"].as_str().unwrap().to_string())
            .collect()
    };

    let all = body_json(send(&app, get("/api/v1/books?sort=title")).await).await;
    assert_eq!(titles(all), vec!["Beloved", "Children of Dune", "Dune"]);

    let search = body_json(send(&app, get("/api/v1/books?search=dune&sort=oldest")).await).await;
    assert_eq!(titles(search), vec!["Dune", "Children of Dune"]);

    let favorites = body_json(send(&app, get("/api/v1/books?filter=favorites")).await).await;
    assert_eq!(titles(favorites), vec!["Dune"]);
}

#[tokio::test]
async fn detail_and_missing_book() {
    let app = app();
    let token = sign_up(&app, "reader@example.com").await;
    let book = add_book(&app, &token, "Dune", "Frank Herbert", false).await;
    let id = book["id"].as_str().unwrap();

    let found = send(&app, get(&format!("/api/v1/books/{id}"))).await;
    assert_eq!(found.status(), StatusCode::OK);
    assert_eq!(body_json(found).await["title"], "Dune");

    let missing = send(&app, get("/api/v1/books/does-not-exist")).await;
    assert_eq!(missing.status(), StatusCode::NOT_FOUND);
    assert_eq!(body_json(missing).await["message"], "Book not found");
}

#[tokio::test]
async fn only_owner_can_modify() {
    let app = app();
    let owner = sign_up(&app, "owner@example.com").await;
    let other = sign_up(&app, "other@example.com").await;
    let book = add_book(&app, &owner, "Dune", "Frank Herbert", false).await;
    let uri = format!("/api/v1/books/{}", book["id"].as_str().unwrap());

    let patch = |token: &str| {
        Request::patch(uri.as_str())
            .header(header::CONTENT_TYPE, "application/json")
            .header(header::AUTHORIZATION, format!("Bearer {token}"))
            .body(Body::from(json!({ "isFavorite": true, "rating": 4 }).to_string()))
            .unwrap()
    };

    assert_eq!(send(&app, patch(&other)).await.status(), StatusCode::FORBIDDEN);

    let updated = send(&app, patch(&owner)).await;
    assert_eq!(updated.status(), StatusCode::OK);
    let body = body_json(updated).await;
    assert_eq!(body["isFavorite"], true);
    assert_eq!(body["rating"], 4);

    let delete = Request::delete(uri.as_str())
        .header(header::AUTHORIZATION, format!("Bearer {owner}"))
        .body(Body::empty())
        .unwrap();
    assert_eq!(send(&app, delete).await.status(), StatusCode::NO_CONTENT);
    assert_eq!(send(&app, get(&uri)).await.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn mine_lists_only_own_books() {
    let app = app();
    let owner = sign_up(&app, "owner@example.com").await;
    let other = sign_up(&app, "other@example.com").await;
    add_book(&app, &owner, "Dune", "Frank Herbert", false).await;
    add_book(&app, &other, "Beloved", "Toni Morrison", false).await;

    let request = Request::get("/api/v1/books/mine")
        .header(header::AUTHORIZATION, format!("Bearer {owner}"))
        .body(Body::empty())
        .unwrap();
    let body = body_json(send(&app, request).await).await;
    let books = body.as_array().unwrap();
    assert_eq!(books.len(), 1);
    assert_eq!(books[0]["title"], "Dune");
}

#[tokio::test]
async fn provider_callback_signs_in_or_redirects_with_code() {
    let app = app();

    let request = Request::get("/api/v1/auth/github/callback")
        .header(SUBJECT_HEADER, "gh-42")
        .body(Body::empty())
        .unwrap();
    let response = send(&app, request).await;
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(response.headers()[header::LOCATION], "/dashboard");
    assert!(response.headers().contains_key(header::SET_COOKIE));

    let abandoned = send(&app, get("/api/v1/auth/google/callback")).await;
    assert_eq!(
        abandoned.headers()[header::LOCATION],
        "/login?error=auth/popup-closed-by-user"
    );

    let unknown = send(&app, get("/api/v1/auth/myspace/callback")).await;
    assert_eq!(
        unknown.headers()[header::LOCATION],
        "/login?error=auth/provider-disabled"
    );
}

#[tokio::test]
async fn stream_starts_with_current_snapshot() {
    let app = app();
    let token = sign_up(&app, "reader@example.com").await;
    add_book(&app, &token, "Dune", "Frank Herbert", false).await;

    let response = send(&app, get("/api/v1/books/stream")).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(response.headers()[header::CONTENT_TYPE], "text/event-stream");

    let mut body = response.into_body().into_data_stream();
    let frame = futures::StreamExt::next(&mut body).await.unwrap().unwrap();
    let text = String::from_utf8(frame.to_vec()).unwrap();
    let payload = text.trim().strip_prefix("data: ").unwrap();
    let snapshot: Value = serde_json::from_str(payload).unwrap();
    assert_eq!(snapshot["books"][0]["title"], "Dune");
}

fn pages(state: AppState) -> Router {
    Router::new()
        .route("/dashboard", get_route(|| async { "dashboard" }))
        .route("/books/add", get_route(|| async { "add" }))
        .route("/books", get_route(|| async { "books" }))
        .layer(middleware::from_fn_with_state(state, require_page_auth))
}

#[tokio::test]
async fn private_pages_redirect_without_session() {
    let backend = Arc::new(Backend::in_memory(AuthSettings::default()));
    let state = AppState::new(backend, false);
    let app = pages(state.clone());

    for path in ["/dashboard", "/books/add"] {
        let response = send(&app, get(path)).await;
        assert_eq!(response.status(), StatusCode::SEE_OTHER, "{path}");
        assert_eq!(response.headers()[header::LOCATION], "/login");
    }

    let stale = Request::get("/dashboard")
        .header(header::COOKIE, "session_token=not-a-session")
        .body(Body::empty())
        .unwrap();
    assert_eq!(send(&app, stale).await.status(), StatusCode::SEE_OTHER);

    let session = state
        .backend
        .auth
        .sign_up("reader@example.com", "secret1")
        .await
        .unwrap();
    let signedIn = Request::get("/dashboard")
        .header(header::COOKIE, format!("session_token={}", session.token))
        .body(Body::empty())
        .unwrap();
    let response = send(&app, signedIn).await;
    assert_eq!(response.status(), StatusCode::OK);
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    assert_eq!(&bytes[..], b"dashboard");

    let public = send(&app, get("/books")).await;
    assert_eq!(public.status(), StatusCode::OK);
}
