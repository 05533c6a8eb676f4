use leptos::prelude::*;
use leptos_router::hooks::use_params_map;
use shelf_types::Book;

#[server]
pub async fn get_book(id: String) -> Result<Option<Book>, ServerFnError> {
    use shelf_backend::BackendError;

    let state = crate::auth::ssr::app_state()?;
    match state.backend.books.get(&id).await {
        Ok(book) => Ok(Some(book)),
        Err(BackendError::NotFound(_)) => Ok(None),
        Err(e) => Err(crate::auth::ssr::to_server_error(e)),
    }
}

fn published_label(year: Option<i32>) -> String {
    year.map(|y| y.to_string()).unwrap_or_else(|| "Unknown".to_string())
}

fn description_text(description: &str) -> String {
    if description.trim().is_empty() {
        "No description available for this book.".to_string()
    } else {
        description.to_string()
    }
}

#[component]
pub fn BookDetailPage() -> impl IntoView {
    let params = use_params_map();
    #[allow(unused_variables)]
    let (book, setBook) = signal(Option::<Result<Option<Book>, String>>::None);

    #[cfg(feature = "hydrate")]
    Effect::new(move |_| {
        let id = params.with(|p| p.get("id")).unwrap_or_default();
        setBook.set(None);
        wasm_bindgen_futures::spawn_local(async move {
            let result = get_book(id).await.map_err(|_| "Failed to load book details".to_string());
            setBook.set(Some(result));
        });
    });
    #[cfg(not(feature = "hydrate"))]
    let _ = params;

    view! {
        {move || match book.get() {
            None => {
                view! {
                    <div class="loading">
                        <div class="spinner"></div>
                        "Loading book..."
                    </div>
                }
                    .into_any()
            }
            Some(Ok(Some(book))) => view! { <BookDetails book /> }.into_any(),
            Some(Ok(None)) => view! { <Missing message="Book not found".to_string() /> }.into_any(),
            Some(Err(message)) => view! { <Missing message /> }.into_any(),
        }}
    }
}

#[component]
fn Missing(message: String) -> impl IntoView {
    view! {
        <div class="card empty-state">
            <h2 class="login-error">{message}</h2>
            <a href="/books" class="btn btn-primary">
                "Back to Books"
            </a>
        </div>
    }
}

#[component]
fn BookDetails(book: Book) -> impl IntoView {
    view! {
        <a href="/books" class="btn btn-ghost btn-sm back-link">
            "\u{2190} Back to Books"
        </a>
        <div class="card book-detail">
            <div class="book-detail-header">
                <div>
                    <h1>{book.title.clone()}</h1>
                    <p class="book-author">{book.author.clone()}</p>
                </div>
                {book
                    .is_favorite
                    .then(|| view! { <span class="badge badge-favorite">"\u{2605} Favorite"</span> })}
            </div>
            <section class="book-detail-section">
                <h2>"Details"</h2>
                <div class="detail-grid">
                    <div>
                        <p class="detail-label">"Published Year"</p>
                        <p class="detail-value">{published_label(book.published_year)}</p>
                    </div>
                    <div>
                        <p class="detail-label">"Status"</p>
                        <p class="detail-value">{book.status.label()}</p>
                    </div>
                </div>
            </section>
            <section class="book-detail-section">
                <h2>"Description"</h2>
                <p>{description_text(&book.description)}</p>
            </section>
        </div>
    }
}
