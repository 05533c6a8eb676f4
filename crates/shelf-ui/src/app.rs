use chrono::Datelike;
use leptos::prelude::*;
use leptos_meta::*;
use leptos_router::{
    components::{Route, Router, Routes},
    hooks::use_navigate,
    ParamSegment, StaticSegment,
};

use crate::auth::{use_auth, AuthProvider};
use crate::components::nav::Nav;
use crate::components::toast::ToastProvider;
use crate::pages::add_book::AddBookPage;
use crate::pages::book_detail::BookDetailPage;
use crate::pages::books::BookListPage;
use crate::pages::dashboard::DashboardPage;
use crate::pages::home::HomePage;
use crate::pages::login::{LoginPage, SignupPage};

pub fn shell(options: LeptosOptions) -> impl IntoView {
    view! {
        <!DOCTYPE html>
        <html lang="en">
            <head>
                <meta charset="utf-8" />
                <meta name="viewport" content="width=device-width, initial-scale=1" />
                <link rel="icon" href="/favicon.svg" type="image/svg+xml" />
                <AutoReload options=options.clone() />
                <HydrationScripts options />
                <MetaTags />
            </head>
            <body>
                <App />
            </body>
        </html>
    }
}

#[component]
pub fn App() -> impl IntoView {
    provide_meta_context();

    view! {
        <Stylesheet id="leptos" href="/pkg/bookshelf.css" />
        <Title text="BookShelf" />
        <ToastProvider>
            <AuthProvider>
                <Router>
                    <Routes fallback=|| view! { <Layout><NotFound /></Layout> }.into_any()>
                        <Route path=StaticSegment("") view=HomeView />
                        <Route path=StaticSegment("login") view=LoginView />
                        <Route path=StaticSegment("signup") view=SignupView />
                        <Route path=StaticSegment("dashboard") view=DashboardView />
                        <Route path=StaticSegment("books") view=BooksView />
                        <Route
                            path=(StaticSegment("books"), StaticSegment("add"))
                            view=AddBookView
                        />
                        <Route
                            path=(StaticSegment("books"), ParamSegment("id"))
                            view=BookDetailView
                        />
                    </Routes>
                </Router>
            </AuthProvider>
        </ToastProvider>
    }
}

#[component]
fn Layout(children: Children) -> impl IntoView {
    let year = chrono::Utc::now().year();

    view! {
        <div class="app-layout">
            <Nav />
            <main class="main-content">{children()}</main>
            <footer class="footer">
                <p>"\u{00A9} " {year} " BookShelf. All rights reserved."</p>
            </footer>
        </div>
    }
}

/// Sends anonymous visitors to the login page once the session check is done.
#[component]
fn RequireAuth(children: ChildrenFn) -> impl IntoView {
    let auth = use_auth();
    let navigate = use_navigate();

    Effect::new(move |_| {
        if auth.loaded.get() && !auth.is_signed_in() {
            navigate("/login", Default::default());
        }
    });

    view! {
        <Show
            when=move || auth.is_signed_in()
            fallback=|| {
                view! {
                    <div class="loading">
                        <div class="spinner"></div>
                        "Checking your session..."
                    </div>
                }
            }
        >
            {children()}
        </Show>
    }
}

#[component]
fn NotFound() -> impl IntoView {
    view! {
        <div class="card empty-state">
            <h2>"Page not found."</h2>
            <a href="/" class="btn btn-primary">
                "Back to Home"
            </a>
        </div>
    }
}

#[component]
fn HomeView() -> impl IntoView {
    view! {
        <Layout>
            <HomePage />
        </Layout>
    }
}

#[component]
fn LoginView() -> impl IntoView {
    view! {
        <Layout>
            <LoginPage />
        </Layout>
    }
}

#[component]
fn SignupView() -> impl IntoView {
    view! {
        <Layout>
            <SignupPage />
        </Layout>
    }
}

#[component]
fn DashboardView() -> impl IntoView {
    view! {
        <Layout>
            <RequireAuth>
                <DashboardPage />
            </RequireAuth>
        </Layout>
    }
}

#[component]
fn BooksView() -> impl IntoView {
    view! {
        <Layout>
            <BookListPage />
        </Layout>
    }
}

#[component]
fn AddBookView() -> impl IntoView {
    view! {
        <Layout>
            <RequireAuth>
                <AddBookPage />
            </RequireAuth>
        </Layout>
    }
}

#[component]
fn BookDetailView() -> impl IntoView {
    view! {
        <Layout>
            <BookDetailPage />
        </Layout>
    }
}
