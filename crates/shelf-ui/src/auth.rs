use leptos::prelude::*;
use shelf_types::User;

use crate::components::toast::ToastContext;

/// Helpers shared by server functions.
#[cfg(feature = "ssr")]
pub mod ssr {
    use leptos::prelude::*;
    use shelf_api::middleware::auth::{clear_session_cookie, session_cookie, session_token, AppState};
    use shelf_backend::{BackendError, Session};
    use shelf_types::User;

    pub fn app_state() -> Result<AppState, ServerFnError> {
        use_context::<AppState>().ok_or_else(|| ServerFnError::new("backend unavailable"))
    }

    pub fn to_server_error(err: BackendError) -> ServerFnError {
        ServerFnError::new(shelf_api::error::user_message(&err))
    }

    pub async fn request_token() -> Option<String> {
        let headers = leptos_axum::extract::<http::HeaderMap>().await.ok()?;
        session_token(&headers)
    }

    pub async fn current_user(state: &AppState) -> Option<User> {
        let token = request_token().await?;
        state.backend.auth.resolve(&token).await
    }

    pub async fn require_user(state: &AppState) -> Result<User, ServerFnError> {
        current_user(state)
            .await
            .ok_or_else(|| ServerFnError::new("You must be logged in"))
    }

    fn set_cookie(value: String) -> Result<(), ServerFnError> {
        use http::header::{HeaderValue, SET_COOKIE};
        let responseOptions = expect_context::<leptos_axum::ResponseOptions>();
        responseOptions.insert_header(
            SET_COOKIE,
            HeaderValue::from_str(&value)
                .map_err(|e| ServerFnError::new(format!("cookie error: {e}")))?,
        );
        Ok(())
    }

    pub fn set_session_cookie(state: &AppState, session: &Session) -> Result<(), ServerFnError> {
        set_cookie(session_cookie(session, state.secure_cookies))
    }

    pub fn clear_cookie(state: &AppState) -> Result<(), ServerFnError> {
        set_cookie(clear_session_cookie(state.secure_cookies))
    }
}

#[server]
pub async fn get_current_user() -> Result<Option<User>, ServerFnError> {
    let state = ssr::app_state()?;
    Ok(ssr::current_user(&state).await)
}

#[server]
pub async fn login(email: String, password: String) -> Result<(), ServerFnError> {
    let state = ssr::app_state()?;
    let session = state
        .backend
        .auth
        .sign_in(&email, &password)
        .await
        .map_err(ssr::to_server_error)?;
    ssr::set_session_cookie(&state, &session)?;
    leptos_axum::redirect("/dashboard");
    Ok(())
}

#[server]
pub async fn signup(email: String, password: String) -> Result<(), ServerFnError> {
    let state = ssr::app_state()?;
    let session = state
        .backend
        .auth
        .sign_up(&email, &password)
        .await
        .map_err(ssr::to_server_error)?;
    ssr::set_session_cookie(&state, &session)?;
    leptos_axum::redirect("/dashboard");
    Ok(())
}

#[server]
pub async fn logout() -> Result<(), ServerFnError> {
    let state = ssr::app_state()?;
    if let Some(token) = ssr::request_token().await {
        state.backend.auth.sign_out(&token).await;
    }
    ssr::clear_cookie(&state)
}

/// The human-readable part of a server function error.
pub fn error_message(err: &ServerFnError) -> String {
    match err {
        ServerFnError::ServerError(message) => message.clone(),
        _ => "An error occurred. Please try again.".to_string(),
    }
}

#[derive(Clone, Copy)]
pub struct AuthContext {
    pub login: ServerAction<Login>,
    pub signup: ServerAction<Signup>,
    pub user: ReadSignal<Option<User>>,
    set_user: WriteSignal<Option<User>>,
    pub loaded: ReadSignal<bool>,
    set_loaded: WriteSignal<bool>,
}

impl AuthContext {
    /// Re-reads the signed-in user from the session cookie.
    pub fn refresh(&self) {
        #[cfg(feature = "hydrate")]
        {
            let setUser = self.set_user;
            let setLoaded = self.set_loaded;
            wasm_bindgen_futures::spawn_local(async move {
                let user = get_current_user().await.ok().flatten();
                setUser.set(user);
                setLoaded.set(true);
            });
        }
    }

    pub fn sign_out<F>(&self, toasts: ToastContext, onDone: F)
    where
        F: FnOnce() + 'static,
    {
        #[cfg(feature = "hydrate")]
        {
            let setUser = self.set_user;
            wasm_bindgen_futures::spawn_local(async move {
                match logout().await {
                    Ok(()) => {
                        setUser.set(None);
                        toasts.success("Logged out successfully!");
                        onDone();
                    }
                    Err(_) => toasts.error("Error during logout. Please try again."),
                }
            });
        }
        #[cfg(not(feature = "hydrate"))]
        {
            let _ = (toasts, onDone);
        }
    }

    pub fn is_signed_in(&self) -> bool {
        self.user.with(Option::is_some)
    }
}

pub fn use_auth() -> AuthContext {
    expect_context::<AuthContext>()
}

/// Owns the sign-in actions and the current user. Must sit inside `ToastProvider`.
#[component]
pub fn AuthProvider(children: Children) -> impl IntoView {
    let toasts = expect_context::<ToastContext>();
    let (user, setUser) = signal(Option::<User>::None);
    let (loaded, setLoaded) = signal(false);

    let ctx = AuthContext {
        login: ServerAction::<Login>::new(),
        signup: ServerAction::<Signup>::new(),
        user,
        set_user: setUser,
        loaded,
        set_loaded: setLoaded,
    };
    provide_context(ctx);

    ctx.refresh();

    let loginValue = ctx.login.value();
    Effect::new(move |_| match loginValue.get() {
        Some(Ok(())) => {
            toasts.success("Logged in successfully!");
            ctx.refresh();
        }
        Some(Err(e)) => toasts.error(error_message(&e)),
        None => {}
    });

    let signupValue = ctx.signup.value();
    Effect::new(move |_| match signupValue.get() {
        Some(Ok(())) => {
            toasts.success("Account created successfully!");
            ctx.refresh();
        }
        Some(Err(e)) => toasts.error(error_message(&e)),
        None => {}
    });

    children()
}
