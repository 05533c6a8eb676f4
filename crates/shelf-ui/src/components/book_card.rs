use leptos::prelude::*;
use shelf_types::Book;

/// Summary card linking to the book's detail page. `children` render in the footer.
#[component]
pub fn BookCard(book: Book, #[prop(optional)] children: Option<Children>) -> impl IntoView {
    let href = format!("/books/{}", book.id);
    let star = if book.is_favorite { "\u{2605}" } else { "\u{2606}" };
    let description = (!book.description.is_empty()).then(|| book.description.clone());
    let published = book.published_year;

    view! {
        <div class="card book-card">
            <a href=href class="book-card-body">
                <div class="book-card-header">
                    <div>
                        <h3 class="book-title">{book.title.clone()}</h3>
                        <p class="book-author">"by " {book.author.clone()}</p>
                    </div>
                    <span class="book-star" class:favorite=book.is_favorite>
                        {star}
                    </span>
                </div>
                {description.map(|d| view! { <p class="book-description">{d}</p> })}
                {published
                    .map(|year| {
                        view! { <div class="book-meta">"Published: " {year}</div> }
                    })}
            </a>
            {children.map(|c| view! { <div class="book-card-actions">{c()}</div> })}
        </div>
    }
}
