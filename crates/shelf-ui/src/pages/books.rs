use leptos::prelude::*;
use shelf_types::{Book, BookFilter, BookQuery, BookSnapshot, SortOrder};

use crate::components::book_card::BookCard;

const STREAM_URL: &str = "/api/v1/books/stream";

#[server]
pub async fn list_books() -> Result<Vec<Book>, ServerFnError> {
    let state = crate::auth::ssr::app_state()?;
    Ok(state.backend.books.list().await)
}

/// Tracks which snapshot the page shows.
///
/// Versions only order frames within one connection. The server restarts its
/// counter, so the first frame after a (re)connect is always taken.
#[derive(Clone, Copy, Debug, Default)]
struct SnapshotGate {
    last: Option<u64>,
    received: bool,
}

impl SnapshotGate {
    /// A new connection was opened.
    fn reset(&mut self) {
        self.last = None;
    }

    fn accept(&mut self, payload: &str) -> Option<BookSnapshot> {
        let snapshot: BookSnapshot = serde_json::from_str(payload).ok()?;
        if self.last.is_some_and(|last| snapshot.version < last) {
            return None;
        }
        self.last = Some(snapshot.version);
        self.received = true;
        Some(snapshot)
    }
}

fn empty_message(search: &str) -> String {
    let search = search.trim();
    if search.is_empty() {
        "No books available yet".to_string()
    } else {
        format!("No books match your search for \"{search}\"")
    }
}

/// Subscribes to the snapshot stream until the page is torn down.
#[cfg(feature = "hydrate")]
fn subscribe(
    setBooks: WriteSignal<Option<Result<Vec<Book>, String>>>,
    gate: StoredValue<SnapshotGate>,
) {
    use wasm_bindgen::closure::Closure;
    use wasm_bindgen::JsCast;

    let Ok(source) = web_sys::EventSource::new(STREAM_URL) else {
        leptos::logging::warn!("book stream unavailable");
        return;
    };

    let onMessage = Closure::<dyn FnMut(web_sys::MessageEvent)>::new(
        move |event: web_sys::MessageEvent| {
            let Some(payload) = event.data().as_string() else {
                return;
            };
            if let Some(snapshot) = gate.try_update_value(|g| g.accept(&payload)).flatten() {
                setBooks.set(Some(Ok(snapshot.books)));
            }
        },
    );
    source.set_onmessage(Some(onMessage.as_ref().unchecked_ref()));

    // Fires again when the browser reconnects after a server restart.
    let onOpen = Closure::<dyn FnMut()>::new(move || gate.update_value(SnapshotGate::reset));
    source.set_onopen(Some(onOpen.as_ref().unchecked_ref()));

    let handle = StoredValue::new_local((source, onMessage, onOpen));
    on_cleanup(move || handle.with_value(|(source, _, _)| source.close()));
}

#[component]
pub fn BookListPage() -> impl IntoView {
    #[allow(unused_variables)]
    let (books, setBooks) = signal(Option::<Result<Vec<Book>, String>>::None);
    let search = RwSignal::new(String::new());
    let filter = RwSignal::new(BookFilter::All);
    let sort = RwSignal::new(SortOrder::Newest);

    #[cfg(feature = "hydrate")]
    {
        use wasm_bindgen_futures::spawn_local;

        let gate = StoredValue::new(SnapshotGate::default());

        spawn_local(async move {
            let result = list_books().await.map_err(|e| crate::auth::error_message(&e));
            // A stream frame may already have landed.
            if !gate.with_value(|g| g.received) {
                setBooks.set(Some(result));
            }
        });

        subscribe(setBooks, gate);
    }

    let visible = Memo::new(move |_| {
        let query = BookQuery {
            search: search.get(),
            filter: filter.get(),
            sort: sort.get(),
        };
        books.with(|b| match b {
            Some(Ok(books)) => Some(Ok(query.apply(books))),
            Some(Err(e)) => Some(Err(e.clone())),
            None => None,
        })
    });

    view! {
        <div class="page-header">
            <h1>"Book Collection"</h1>
        </div>

        <div class="card list-controls">
            <input
                type="search"
                class="search-input"
                placeholder="Search books by title or author..."
                prop:value=search
                on:input=move |ev| search.set(event_target_value(&ev))
            />
            <div class="filter-toggle">
                <button
                    class="btn btn-sm"
                    class:active={move || filter.get() == BookFilter::All}
                    on:click=move |_| filter.set(BookFilter::All)
                >
                    "All Books"
                </button>
                <button
                    class="btn btn-sm"
                    class:active={move || filter.get() == BookFilter::Favorites}
                    on:click=move |_| filter.set(BookFilter::Favorites)
                >
                    "Favorites"
                </button>
            </div>
            <select
                class="sort-select"
                on:change=move |ev| sort.set(SortOrder::parse(&event_target_value(&ev)))
            >
                {SortOrder::ALL
                    .into_iter()
                    .map(|order| {
                        view! {
                            <option value=order.as_str() selected={move || sort.get() == order}>
                                {order.label()}
                            </option>
                        }
                    })
                    .collect_view()}
            </select>
        </div>

        {move || match visible.get() {
            None => {
                view! {
                    <div class="loading">
                        <div class="spinner"></div>
                        "Loading books..."
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
            Some(Ok(list)) if list.is_empty() => {
                view! {
                    <div class="card empty-state">
                        <h3>"No books found"</h3>
                        <p>{empty_message(&search.get_untracked())}</p>
                    </div>
                }
                    .into_any()
            }
            Some(Ok(list)) => {
                view! {
                    <div class="book-grid">
                        {list
                            .into_iter()
                            .map(|book| view! { <BookCard book /> })
                            .collect_view()}
                    </div>
                }
                    .into_any()
            }
        }}
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_message_mentions_search_term() {
        assert_eq!(empty_message(""), "No books available yet");
        assert_eq!(empty_message("  "), "No books available yet");
        assert_eq!(empty_message("dune"), "No books match your search for \"dune\"");
    }

    fn frame(version: u64) -> String {
        format!(r#"{{"version":{version},"books":[]}}"#)
    }

    #[test]
    fn stale_snapshots_are_dropped() {
        let mut gate = SnapshotGate::default();
        assert_eq!(gate.accept(&frame(4)).map(|s| s.version), Some(4));
        assert!(gate.accept(&frame(3)).is_none());
        assert_eq!(gate.accept(&frame(4)).map(|s| s.version), Some(4));
        assert_eq!(gate.accept(&frame(5)).map(|s| s.version), Some(5));
    }

    #[test]
    fn reconnect_accepts_restarted_counter() {
        let mut gate = SnapshotGate::default();
        gate.accept(&frame(3)).unwrap();

        gate.reset();
        assert_eq!(gate.accept(&frame(0)).map(|s| s.version), Some(0));
        assert_eq!(gate.accept(&frame(1)).map(|s| s.version), Some(1));
        assert!(gate.received);
    }

    #[test]
    fn malformed_frames_are_ignored() {
        let mut gate = SnapshotGate::default();
        assert!(gate.accept("not json").is_none());
        assert!(!gate.received);
    }
}
