use leptos::prelude::*;
use leptos_router::hooks::use_navigate;

use crate::components::book_form::BookForm;

#[component]
pub fn AddBookPage() -> impl IntoView {
    let navigate = use_navigate();
    let onSuccess = Callback::new(move |()| navigate("/books", Default::default()));

    view! {
        <a href="/books" class="btn btn-ghost btn-sm back-link">
            "\u{2190} Back to Books"
        </a>
        <div class="card form-card">
            <div class="page-header">
                <h1>"Add a New Book"</h1>
                <p class="subtitle">"Fill in the details to add a book to the shared collection"</p>
            </div>
            <BookForm on_success=onSuccess />
        </div>
    }
}
