use std::sync::Arc;

use axum::{
    body::Body,
    extract::{Path, State},
    http::{header, HeaderMap, Request, StatusCode},
    middleware::{self, Next},
    response::{IntoResponse, Json, Redirect, Response},
    routing::{get, post},
    Extension, Router,
};
use axum_extra::extract::CookieJar;
use serde::{Deserialize, Serialize};
use shelf_backend::{Backend, Session};
use shelf_types::{AuthErrorCode, AuthProvider, Credentials, FederatedIdentity, User, SESSION_COOKIE};

use crate::error::ApiError;

#[derive(Clone)]
pub struct AppState {
    pub backend: Arc<Backend>,
    pub secure_cookies: bool,
}

impl AppState {
    pub fn new(backend: Arc<Backend>, secureCookies: bool) -> Self {
        Self {
            backend,
            secure_cookies: secureCookies,
        }
    }
}

/// The signed-in user, inserted into request extensions by [`require_api_auth`].
#[derive(Clone, Debug)]
pub struct CurrentUser(pub User);

/// Headers set by the OAuth proxy in front of the provider callback.
pub const SUBJECT_HEADER: &str = "x-auth-subject";
pub const EMAIL_HEADER: &str = "x-auth-email";
pub const NAME_HEADER: &str = "x-auth-name";

/// Pages that redirect to `/login` without a valid session.
const PRIVATE_PAGES: &[&str] = &["/dashboard", "/books/add"];

#[derive(Serialize, Deserialize, Debug)]
pub struct AuthResponse {
    pub user: User,
    pub token: String,
}

pub fn auth_routes(state: AppState) -> Router<AppState> {
    let protected = Router::new()
        .route("/api/v1/auth/me", get(handle_me))
        .route_layer(middleware::from_fn_with_state(state, require_api_auth));

    Router::new()
        .route("/api/v1/auth/signup", post(handle_signup))
        .route("/api/v1/auth/login", post(handle_login))
        .route("/api/v1/auth/logout", post(handle_logout))
        .route("/api/v1/auth/:provider/callback", get(handle_provider_callback))
        .merge(protected)
}

async fn handle_signup(
    State(state): State<AppState>,
    Json(body): Json<Credentials>,
) -> Result<Response, ApiError> {
    let session = state.backend.auth.sign_up(&body.email, &body.password).await?;
    Ok(session_response(&state, session))
}

async fn handle_login(
    State(state): State<AppState>,
    Json(body): Json<Credentials>,
) -> Result<Response, ApiError> {
    let session = state.backend.auth.sign_in(&body.email, &body.password).await?;
    Ok(session_response(&state, session))
}

async fn handle_logout(State(state): State<AppState>, headers: HeaderMap) -> Response {
    if let Some(token) = session_token(&headers) {
        state.backend.auth.sign_out(&token).await;
    }

    (
        StatusCode::OK,
        [(header::SET_COOKIE, clear_session_cookie(state.secure_cookies))],
        Json(serde_json::json!({ "ok": true })),
    )
        .into_response()
}

async fn handle_me(Extension(CurrentUser(user)): Extension<CurrentUser>) -> Json<User> {
    Json(user)
}

async fn handle_provider_callback(
    State(state): State<AppState>,
    Path(provider): Path<String>,
    headers: HeaderMap,
) -> Response {
    let result = match AuthProvider::parse(&provider) {
        Some(provider) => {
            state
                .backend
                .auth
                .sign_in_with_provider(provider, federated_identity(&headers))
                .await
        }
        None => Err(AuthErrorCode::ProviderDisabled.into()),
    };

    match result {
        Ok(session) => (
            [(
                header::SET_COOKIE,
                session_cookie(&session, state.secure_cookies),
            )],
            Redirect::to("/dashboard"),
        )
            .into_response(),
        Err(e) => {
            let code = match e {
                shelf_backend::BackendError::Auth(code) => code,
                _ => AuthErrorCode::Unknown,
            };
            tracing::warn!(provider = %provider, code = code.code(), "provider sign-in failed");
            Redirect::to(&format!("/login?error={}", code.code())).into_response()
        }
    }
}

fn federated_identity(headers: &HeaderMap) -> Option<FederatedIdentity> {
    let value = |name: &str| {
        headers
            .get(name)
            .and_then(|v| v.to_str().ok())
            .map(str::trim)
            .filter(|v| !v.is_empty())
            .map(str::to_string)
    };

    Some(FederatedIdentity {
        subject: value(SUBJECT_HEADER)?,
        email: value(EMAIL_HEADER),
        display_name: value(NAME_HEADER),
    })
}

fn session_response(state: &AppState, session: Session) -> Response {
    let cookie = session_cookie(&session, state.secure_cookies);
    (
        StatusCode::OK,
        [(header::SET_COOKIE, cookie)],
        Json(AuthResponse {
            user: session.user,
            token: session.token,
        }),
    )
        .into_response()
}

pub fn session_cookie(session: &Session, secure: bool) -> String {
    let maxAge = (session.expires_at - chrono::Utc::now()).num_seconds().max(0);
    format!(
        "{SESSION_COOKIE}={}; HttpOnly;{} SameSite=Lax; Path=/; Max-Age={maxAge}",
        session.token,
        if secure { " Secure;" } else { "" },
    )
}

pub fn clear_session_cookie(secure: bool) -> String {
    format!(
        "{SESSION_COOKIE}=; HttpOnly;{} SameSite=Lax; Path=/; Max-Age=0",
        if secure { " Secure;" } else { "" },
    )
}

/// Session token from `Authorization: Bearer <token>` or the session cookie.
pub fn session_token(headers: &HeaderMap) -> Option<String> {
    let bearer = headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|h| h.strip_prefix("Bearer "))
        .map(|t| t.trim().to_string());

    bearer.or_else(|| {
        CookieJar::from_headers(headers)
            .get(SESSION_COOKIE)
            .map(|c| c.value().to_string())
    })
}

/// Middleware for API routes: resolves the session and exposes [`CurrentUser`].
pub async fn require_api_auth(
    State(state): State<AppState>,
    mut request: Request<Body>,
    next: Next,
) -> Response {
    let user = match session_token(request.headers()) {
        Some(token) => state.backend.auth.resolve(&token).await,
        None => None,
    };

    let Some(user) = user else {
        return (
            StatusCode::UNAUTHORIZED,
            Json(crate::error::ErrorResponse {
                error: "unauthorized".into(),
                code: None,
                message: "You must be logged in".into(),
            }),
        )
            .into_response();
    };

    request.extensions_mut().insert(CurrentUser(user));
    next.run(request).await
}

/// Middleware for page routes: private pages redirect to /login without a session.
pub async fn require_page_auth(
    State(state): State<AppState>,
    request: Request<Body>,
    next: Next,
) -> Response {
    let path = request.uri().path();
    if !PRIVATE_PAGES.contains(&path) {
        return next.run(request).await;
    }

    let isAuthorized = match session_token(request.headers()) {
        Some(token) => state.backend.auth.resolve(&token).await.is_some(),
        None => false,
    };

    if !isAuthorized {
        return Redirect::to("/login").into_response();
    }

    next.run(request).await
}
