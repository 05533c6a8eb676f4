use leptos::prelude::*;
use shelf_types::{Book, BookPatch, ReadingStatus};

use crate::auth::use_auth;
use crate::components::book_card::BookCard;
use crate::components::toast::use_toasts;

#[server]
pub async fn my_books() -> Result<Vec<Book>, ServerFnError> {
    use crate::auth::ssr;
    use shelf_types::BookQuery;

    let state = ssr::app_state()?;
    let user = ssr::require_user(&state).await?;
    let books = state.backend.books.list_by_owner(&user.uid).await;
    Ok(BookQuery::default().apply(&books))
}

#[server]
pub async fn update_book(id: String, patch: BookPatch) -> Result<Book, ServerFnError> {
    use crate::auth::ssr;

    let state = ssr::app_state()?;
    let user = ssr::require_user(&state).await?;
    state
        .backend
        .books
        .update(&id, &user.uid, patch)
        .await
        .map_err(ssr::to_server_error)
}

#[server]
pub async fn delete_book(id: String) -> Result<(), ServerFnError> {
    use crate::auth::ssr;

    let state = ssr::app_state()?;
    let user = ssr::require_user(&state).await?;
    state
        .backend
        .books
        .delete(&id, &user.uid)
        .await
        .map_err(ssr::to_server_error)
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
struct ReadingStats {
    total: usize,
    completed: usize,
    in_progress: usize,
}

impl ReadingStats {
    fn of(books: &[Book]) -> Self {
        let count = |status| books.iter().filter(|b| b.status == status).count();
        Self {
            total: books.len(),
            completed: count(ReadingStatus::Read),
            in_progress: count(ReadingStatus::Reading),
        }
    }
}

#[component]
pub fn DashboardPage() -> impl IntoView {
    let auth = use_auth();
    let toasts = use_toasts();

    #[allow(unused_variables)]
    let (books, setBooks) = signal(Option::<Result<Vec<Book>, String>>::None);

    let fetch = move || {
        #[cfg(feature = "hydrate")]
        wasm_bindgen_futures::spawn_local(async move {
            let result = my_books().await.map_err(|e| crate::auth::error_message(&e));
            setBooks.set(Some(result));
        });
    };

    // Owner-scoped, so wait for the session before the first load.
    Effect::new(move |_| {
        if auth.loaded.get() {
            fetch();
        }
    });

    let applyPatch = move |id: String, patch: BookPatch, success: &'static str| {
        #[cfg(feature = "hydrate")]
        wasm_bindgen_futures::spawn_local(async move {
            match update_book(id, patch).await {
                Ok(_) => {
                    toasts.success(success);
                    fetch();
                }
                Err(e) => toasts.error(crate::auth::error_message(&e)),
            }
        });
        #[cfg(not(feature = "hydrate"))]
        let _ = (id, patch, success);
    };

    let remove = move |id: String| {
        #[cfg(feature = "hydrate")]
        wasm_bindgen_futures::spawn_local(async move {
            match delete_book(id).await {
                Ok(()) => {
                    toasts.success("Book deleted");
                    fetch();
                }
                Err(e) => toasts.error(crate::auth::error_message(&e)),
            }
        });
        #[cfg(not(feature = "hydrate"))]
        let _ = id;
    };

    let greeting = move || {
        auth.user
            .get()
            .and_then(|u| u.email)
            .unwrap_or_else(|| "Book Lover".to_string())
    };

    view! {
        <div class="dashboard-header">
            <div>
                <h1>"Your Reading Dashboard"</h1>
                <p class="subtitle">"Welcome back, " {greeting}</p>
            </div>
            <a href="/books/add" class="btn btn-accent">
                "+ Add New Book"
            </a>
        </div>
        {move || match books.get() {
            None => {
                view! {
                    <div class="loading">
                        <div class="spinner"></div>
                        "Loading your books..."
                    </div>
                }
                    .into_any()
            }
            Some(Err(e)) => {
                view! {
                    <div class="card">
                        <p class="login-error">"Failed to load books: " {e}</p>
                    </div>
                }
                    .into_any()
            }
            Some(Ok(list)) => {
                let stats = ReadingStats::of(&list);
                view! {
                    <div class="stats-grid">
                        <div class="card stat-card">
                            <span class="stat-label">"Total Books"</span>
                            <span class="stat-value">{stats.total}</span>
                        </div>
                        <div class="card stat-card">
                            <span class="stat-label">"Completed"</span>
                            <span class="stat-value">{stats.completed}</span>
                        </div>
                        <div class="card stat-card">
                            <span class="stat-label">"In Progress"</span>
                            <span class="stat-value">{stats.in_progress}</span>
                        </div>
                    </div>
                    {if list.is_empty() {
                        view! {
                            <div class="card empty-state">
                                <h3>"Your shelf is empty"</h3>
                                <p>"Add your first book to start tracking your reading."</p>
                            </div>
                        }
                            .into_any()
                    } else {
                        view! {
                            <div class="book-grid">
                                {list
                                    .into_iter()
                                    .map(|book| {
                                        view! {
                                            <OwnedBook
                                                book
                                                on_patch=applyPatch
                                                on_delete=remove
                                            />
                                        }
                                    })
                                    .collect_view()}
                            </div>
                        }
                            .into_any()
                    }}
                }
                    .into_any()
            }
        }}
    }
}

#[component]
fn OwnedBook<P, D>(book: Book, on_patch: P, on_delete: D) -> impl IntoView
where
    P: Fn(String, BookPatch, &'static str) + Copy + Send + Sync + 'static,
    D: Fn(String) + Copy + Send + Sync + 'static,
{
    let id = StoredValue::new(book.id.clone());
    let isFavorite = book.is_favorite;
    let status = book.status;

    let toggleFavorite = move |_| {
        let patch = BookPatch {
            is_favorite: Some(!isFavorite),
            ..Default::default()
        };
        let message = if isFavorite {
            "Removed from favorites"
        } else {
            "Added to favorites"
        };
        on_patch(id.get_value(), patch, message);
    };

    let changeStatus = move |ev| {
        let Some(next) = ReadingStatus::parse(&event_target_value(&ev)) else {
            return;
        };
        let patch = BookPatch {
            status: Some(next),
            ..Default::default()
        };
        on_patch(id.get_value(), patch, "Reading status updated");
    };

    view! {
        <BookCard book>
            <select class="status-select" on:change=changeStatus>
                {ReadingStatus::ALL
                    .into_iter()
                    .map(|s| {
                        view! {
                            <option value=s.as_str() selected={s == status}>
                                {s.label()}
                            </option>
                        }
                    })
                    .collect_view()}
            </select>
            <button class="btn btn-ghost btn-sm" on:click=toggleFavorite>
                {if isFavorite { "Unfavorite" } else { "Favorite" }}
            </button>
            <button class="btn btn-danger btn-sm" on:click=move |_| on_delete(id.get_value())>
                "Delete"
            </button>
        </BookCard>
    }
}
