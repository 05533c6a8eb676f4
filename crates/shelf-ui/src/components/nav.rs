use leptos::prelude::*;
use leptos_router::hooks::{use_location, use_navigate};
use shelf_types::Theme;

use crate::auth::use_auth;
use crate::components::toast::use_toasts;
use crate::theme::{apply_theme, load_theme};

const LINKS: &[(&str, &str)] = &[("/", "Home"), ("/dashboard", "Dashboard"), ("/books", "Books")];

#[component]
pub fn Nav() -> impl IntoView {
    let auth = use_auth();
    let toasts = use_toasts();
    let location = use_location();

    let navigate = use_navigate();

    let (theme, setTheme) = signal(Theme::Light);

    // The stored flag is read on the first run only, then every change is written back.
    Effect::new(move |previous: Option<()>| {
        let current = theme.get();
        if previous.is_none() {
            let stored = load_theme();
            if stored != current {
                setTheme.set(stored);
                return;
            }
        }
        apply_theme(current);
    });

    let handleLogout = move |_| {
        let navigate = navigate.clone();
        auth.sign_out(toasts, move || navigate("/login", Default::default()));
    };

    view! {
        <nav class="navbar">
            <a href="/" class="nav-brand">
                <div class="brand-icon">"B"</div>
                <span class="brand-text">"BookShelf"</span>
            </a>
            <ul class="nav-links">
                {LINKS
                    .iter()
                    .map(|(href, label)| {
                        let href = *href;
                        let isActive = move || location.pathname.get() == href;
                        view! {
                            <li class="nav-item" class:active=isActive>
                                <a href=href>{*label}</a>
                            </li>
                        }
                    })
                    .collect_view()}
            </ul>
            <div class="nav-controls">
                <Show when=move || auth.is_signed_in()>
                    <a href="/books/add" class="btn btn-accent btn-sm">
                        "+ New Book"
                    </a>
                </Show>
                <button
                    class="btn btn-ghost btn-sm theme-toggle"
                    aria-label="Toggle dark mode"
                    on:click=move |_| setTheme.update(|t| *t = t.toggled())
                >
                    {move || if theme.get().is_dark() { "\u{2600}" } else { "\u{263E}" }}
                </button>
                <Show
                    when=move || auth.is_signed_in()
                    fallback=|| {
                        view! {
                            <a href="/login" class="btn btn-ghost btn-sm">
                                "Login"
                            </a>
                            <a href="/signup" class="btn btn-accent btn-sm">
                                "Sign Up"
                            </a>
                        }
                    }
                >
                    <span class="nav-user">
                        {move || auth.user.get().map(|u| u.handle().to_string()).unwrap_or_default()}
                    </span>
                    <button class="btn btn-ghost btn-sm" on:click=handleLogout.clone()>
                        "Logout"
                    </button>
                </Show>
            </div>
        </nav>
    }
}
