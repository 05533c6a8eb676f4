use leptos::prelude::*;
use leptos_router::hooks::{use_navigate, use_query_map};
use shelf_types::AuthErrorCode;

use crate::auth::use_auth;
use crate::components::auth_form::{AuthForm, AuthMode};
use crate::components::toast::use_toasts;

/// Message for an `?error=<code>` left by a failed provider callback.
fn callback_error(code: Option<String>) -> Option<&'static str> {
    code.filter(|c| !c.is_empty())
        .map(|c| AuthErrorCode::from_code(&c).message())
}

#[component]
fn AuthPage(mode: AuthMode) -> impl IntoView {
    let auth = use_auth();
    let toasts = use_toasts();
    let query = use_query_map();
    let navigate = use_navigate();

    // A failed provider round trip lands here with `?error=<code>`.
    Effect::new(move |shown: Option<bool>| {
        if shown == Some(true) {
            return true;
        }
        match callback_error(query.with(|q| q.get("error"))) {
            Some(message) => {
                toasts.warning(message);
                true
            }
            None => false,
        }
    });

    // Signed-in visitors have nothing to do here.
    Effect::new(move |_| {
        if auth.is_signed_in() {
            navigate("/dashboard", Default::default());
        }
    });

    let (heading, subtitle, switchPrompt, switchHref, switchLabel) = match mode {
        AuthMode::Login => (
            "Welcome Back to BookShelf",
            "Sign in to access your book collection",
            "Don't have an account?",
            "/signup",
            "Create an account",
        ),
        AuthMode::Signup => (
            "Join BookShelf",
            "Create an account to start your collection",
            "Already have an account?",
            "/login",
            "Sign in instead",
        ),
    };

    view! {
        <div class="login-page">
            <div class="login-card">
                <div class="login-header">
                    <div class="login-icon">"B"</div>
                    <h1>{heading}</h1>
                    <p>{subtitle}</p>
                </div>

                <AuthForm mode />

                <div class="login-switch">
                    <span>{switchPrompt}</span>
                    <a href=switchHref class="btn btn-ghost btn-sm">
                        {switchLabel}
                    </a>
                </div>
            </div>
        </div>
    }
}

#[component]
pub fn LoginPage() -> impl IntoView {
    view! { <AuthPage mode=AuthMode::Login /> }
}

#[component]
pub fn SignupPage() -> impl IntoView {
    view! { <AuthPage mode=AuthMode::Signup /> }
}
