use leptos::prelude::*;
use shelf_types::{AuthProvider, MIN_PASSWORD_LEN};

use crate::auth::use_auth;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AuthMode {
    Login,
    Signup,
}

impl AuthMode {
    fn title(&self) -> &'static str {
        match self {
            AuthMode::Login => "Sign in to your account",
            AuthMode::Signup => "Create a new account",
        }
    }

    fn submit_label(&self, pending: bool) -> &'static str {
        match (self, pending) {
            (AuthMode::Login, false) => "Sign in",
            (AuthMode::Login, true) => "Signing in...",
            (AuthMode::Signup, false) => "Create account",
            (AuthMode::Signup, true) => "Creating account...",
        }
    }
}

fn password_hint() -> String {
    format!("Use {MIN_PASSWORD_LEN} or more characters with a mix of letters, numbers & symbols")
}

fn provider_href(provider: AuthProvider) -> String {
    format!("/api/v1/auth/{}/callback", provider.as_str())
}

#[component]
fn Fields(mode: AuthMode, pending: Signal<bool>) -> impl IntoView {
    view! {
        <div class="form-group">
            <label for="email">"Email"</label>
            <input
                type="email"
                id="email"
                name="email"
                placeholder="you@example.com"
                required
                disabled=pending
            />
        </div>
        <div class="form-group">
            <label for="password">"Password"</label>
            <input
                type="password"
                id="password"
                name="password"
                placeholder="\u{2022}\u{2022}\u{2022}\u{2022}\u{2022}\u{2022}\u{2022}\u{2022}"
                minlength=MIN_PASSWORD_LEN.to_string()
                required
                disabled=pending
            />
            {(mode == AuthMode::Signup)
                .then(|| {
                    view! {
                        <p class="form-hint">{password_hint()}</p>
                    }
                })}
        </div>
        {(mode == AuthMode::Signup)
            .then(|| {
                view! {
                    <div class="form-check">
                        <input type="checkbox" id="terms" required />
                        <label for="terms">"I agree to the Terms of Service and Privacy Policy"</label>
                    </div>
                }
            })}
        <button type="submit" class="btn btn-primary" disabled=pending>
            {move || mode.submit_label(pending.get())}
        </button>
    }
}

/// Email/password form plus social sign-in links.
#[component]
pub fn AuthForm(mode: AuthMode) -> impl IntoView {
    let auth = use_auth();

    let form = match mode {
        AuthMode::Login => {
            let pending: Signal<bool> = auth.login.pending().into();
            view! {
                <ActionForm action=auth.login>
                    <Fields mode pending />
                </ActionForm>
            }
            .into_any()
        }
        AuthMode::Signup => {
            let pending: Signal<bool> = auth.signup.pending().into();
            view! {
                <ActionForm action=auth.signup>
                    <Fields mode pending />
                </ActionForm>
            }
            .into_any()
        }
    };

    view! {
        <div class="auth-form">
            <h2>{mode.title()}</h2>
            {form}
            <div class="auth-divider">
                <span>"Or continue with"</span>
            </div>
            <div class="auth-providers">
                {[AuthProvider::Google, AuthProvider::GitHub]
                    .into_iter()
                    .map(|provider| {
                        view! {
                            <a href=provider_href(provider) rel="external" class="btn btn-ghost">
                                {provider.label()}
                            </a>
                        }
                    })
                    .collect_view()}
            </div>
        </div>
    }
}
