use chrono::Datelike;
use leptos::prelude::*;
use shelf_types::{Book, BookValidationError, NewBook};

use crate::auth::use_auth;
#[cfg(feature = "hydrate")]
use crate::auth::error_message;
use crate::components::toast::use_toasts;

#[server]
pub async fn add_book(
    title: String,
    author: String,
    description: String,
    published_year: Option<i32>,
    is_favorite: bool,
) -> Result<Book, ServerFnError> {
    use crate::auth::ssr;

    let state = ssr::app_state()?;
    let user = ssr::require_user(&state).await?;
    let draft = NewBook {
        title,
        author,
        description,
        published_year,
        is_favorite,
    };
    state
        .backend
        .books
        .create(&user.uid, draft)
        .await
        .map_err(ssr::to_server_error)
}

/// Parses the optional year input. Blank means unknown.
fn parse_year(input: &str) -> Result<Option<i32>, String> {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return Ok(None);
    }
    trimmed
        .parse::<i32>()
        .map(Some)
        .map_err(|_| "Published year must be a number".to_string())
}

fn build_draft(
    title: String,
    author: String,
    description: String,
    year: &str,
    isFavorite: bool,
    currentYear: i32,
) -> Result<NewBook, String> {
    let draft = NewBook {
        title,
        author,
        description,
        published_year: parse_year(year)?,
        is_favorite: isFavorite,
    };
    draft
        .validate(currentYear)
        .map_err(|e: BookValidationError| e.to_string())
}

#[component]
pub fn BookForm(#[prop(optional)] on_success: Option<Callback<()>>) -> impl IntoView {
    let auth = use_auth();
    let toasts = use_toasts();

    let title = RwSignal::new(String::new());
    let author = RwSignal::new(String::new());
    let description = RwSignal::new(String::new());
    let publishedYear = RwSignal::new(String::new());
    let isFavorite = RwSignal::new(false);
    let (error, setError) = signal(Option::<String>::None);
    let (loading, setLoading) = signal(false);

    let maxYear = chrono::Utc::now().year();

    let reset = move || {
        title.set(String::new());
        author.set(String::new());
        description.set(String::new());
        publishedYear.set(String::new());
        isFavorite.set(false);
    };

    let handleSubmit = move |ev: leptos::ev::SubmitEvent| {
        ev.prevent_default();

        if !auth.is_signed_in() {
            toasts.error("You must be logged in to add books");
            return;
        }

        let draft = match build_draft(
            title.get_untracked(),
            author.get_untracked(),
            description.get_untracked(),
            &publishedYear.get_untracked(),
            isFavorite.get_untracked(),
            maxYear,
        ) {
            Ok(draft) => draft,
            Err(message) => {
                setError.set(Some(message));
                return;
            }
        };

        setError.set(None);
        setLoading.set(true);

        #[cfg(feature = "hydrate")]
        wasm_bindgen_futures::spawn_local(async move {
            let result = add_book(
                draft.title,
                draft.author,
                draft.description,
                draft.published_year,
                draft.is_favorite,
            )
            .await;
            setLoading.set(false);
            match result {
                Ok(_) => {
                    reset();
                    toasts.success("Book added successfully!");
                    if let Some(callback) = on_success {
                        callback.run(());
                    }
                }
                Err(e) => {
                    setError.set(Some(error_message(&e)));
                    toasts.error("Failed to add book");
                }
            }
        });

        #[cfg(not(feature = "hydrate"))]
        {
            let _ = (draft, reset, on_success);
            setLoading.set(false);
        }
    };

    view! {
        <form class="book-form" on:submit=handleSubmit>
            {move || error.get().map(|e| view! { <div class="form-error">{e}</div> })}
            <div class="form-row">
                <div class="form-group">
                    <label for="title">"Title " <span class="required">"*"</span></label>
                    <input
                        type="text"
                        id="title"
                        placeholder="Book title"
                        required
                        prop:value=title
                        on:input=move |ev| title.set(event_target_value(&ev))
                    />
                </div>
                <div class="form-group">
                    <label for="author">"Author " <span class="required">"*"</span></label>
                    <input
                        type="text"
                        id="author"
                        placeholder="Author name"
                        required
                        prop:value=author
                        on:input=move |ev| author.set(event_target_value(&ev))
                    />
                </div>
            </div>
            <div class="form-group">
                <label for="publishedYear">"Published Year"</label>
                <input
                    type="number"
                    id="publishedYear"
                    min="0"
                    max=maxYear.to_string()
                    placeholder="Publication year"
                    prop:value=publishedYear
                    on:input=move |ev| publishedYear.set(event_target_value(&ev))
                />
            </div>
            <div class="form-group">
                <label for="description">"Description"</label>
                <textarea
                    id="description"
                    rows="3"
                    placeholder="Brief description of the book"
                    prop:value=description
                    on:input=move |ev| description.set(event_target_value(&ev))
                ></textarea>
            </div>
            <div class="form-check">
                <input
                    type="checkbox"
                    id="isFavorite"
                    prop:checked=isFavorite
                    on:change=move |ev| isFavorite.set(event_target_checked(&ev))
                />
                <label for="isFavorite">"Mark as favorite"</label>
            </div>
            <button type="submit" class="btn btn-primary" disabled=loading>
                {move || if loading.get() { "Adding Book..." } else { "Add to Collection" }}
            </button>
        </form>
    }
}
