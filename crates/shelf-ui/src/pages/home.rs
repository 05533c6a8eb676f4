use leptos::prelude::*;

use crate::auth::use_auth;

const FEATURES: &[(&str, &str)] = &[
    (
        "Book Management",
        "Easily add, edit, and organize your book collection with an intuitive interface.",
    ),
    (
        "Live Collection",
        "Every book added by the community shows up instantly, no refresh needed.",
    ),
    (
        "Reading Insights",
        "Track what you are reading and what you have finished from your dashboard.",
    ),
];

#[component]
pub fn HomePage() -> impl IntoView {
    let auth = use_auth();

    view! {
        <section class="hero">
            <h1>"Transform Your Reading Experience"</h1>
            <p class="subtitle">
                "Organize, track, and share your book collection with a platform designed for book lovers."
            </p>
            <div class="hero-actions">
                <Show
                    when=move || auth.is_signed_in()
                    fallback=|| {
                        view! {
                            <a href="/signup" class="btn btn-accent btn-lg">
                                "Get Started Free"
                            </a>
                        }
                    }
                >
                    <a href="/dashboard" class="btn btn-accent btn-lg">
                        "Go to Dashboard"
                    </a>
                </Show>
                <a href="/books" class="btn btn-ghost btn-lg">
                    "Browse Books"
                </a>
            </div>
        </section>

        <section class="features">
            <h2>"Everything You Need for Your Book Journey"</h2>
            <div class="features-grid">
                {FEATURES
                    .iter()
                    .map(|(title, desc)| {
                        view! {
                            <div class="card feature-card">
                                <h3>{*title}</h3>
                                <p>{*desc}</p>
                            </div>
                        }
                    })
                    .collect_view()}
            </div>
        </section>
    }
}
