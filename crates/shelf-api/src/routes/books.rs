use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    middleware,
    response::sse::{Event, KeepAlive, Sse},
    routing::get,
    Extension, Json, Router,
};
use futures::stream::{self, Stream};
use serde::Deserialize;
use shelf_types::{Book, BookFilter, BookPatch, BookQuery, NewBook, SortOrder};

use crate::error::ApiError;
use crate::middleware::auth::{require_api_auth, AppState, CurrentUser};

pub fn routes(state: AppState) -> Router<AppState> {
    let protected = Router::new()
        .route("/api/v1/books", axum::routing::post(create_book))
        .route("/api/v1/books/mine", get(list_my_books))
        .route(
            "/api/v1/books/:id",
            axum::routing::patch(update_book).delete(delete_book),
        )
        .route_layer(middleware::from_fn_with_state(state, require_api_auth));

    Router::new()
        .route("/api/v1/books", get(list_books))
        .route("/api/v1/books/stream", get(stream_books))
        .route("/api/v1/books/:id", get(get_book))
        .merge(protected)
}

#[derive(Debug, Default, Deserialize)]
pub struct ListParams {
    search: Option<String>,
    filter: Option<String>,
    sort: Option<String>,
}

impl ListParams {
    fn into_query(self) -> BookQuery {
        BookQuery {
            search: self.search.unwrap_or_default(),
            filter: self.filter.as_deref().map(BookFilter::parse).unwrap_or_default(),
            sort: self.sort.as_deref().map(SortOrder::parse).unwrap_or_default(),
        }
    }
}

async fn list_books(
    State(state): State<AppState>,
    Query(params): Query<ListParams>,
) -> Json<Vec<Book>> {
    let books = state.backend.books.list().await;
    Json(params.into_query().apply(&books))
}

async fn get_book(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Book>, ApiError> {
    Ok(Json(state.backend.books.get(&id).await?))
}

/// One `data:` frame per snapshot, starting with the current one.
async fn stream_books(
    State(state): State<AppState>,
) -> Sse<impl Stream<Item = Result<Event, axum::Error>>> {
    let subscription = state.backend.books.subscribe();

    let events = stream::unfold(
        (subscription, true),
        |(mut subscription, isFirst)| async move {
            let snapshot = if isFirst {
                subscription.current()
            } else {
                subscription.next().await?
            };
            Some((Event::default().json_data(&*snapshot), (subscription, false)))
        },
    );

    Sse::new(events).keep_alive(KeepAlive::default())
}

async fn list_my_books(
    State(state): State<AppState>,
    Extension(CurrentUser(user)): Extension<CurrentUser>,
    Query(params): Query<ListParams>,
) -> Json<Vec<Book>> {
    let books = state.backend.books.list_by_owner(&user.uid).await;
    Json(params.into_query().apply(&books))
}

async fn create_book(
    State(state): State<AppState>,
    Extension(CurrentUser(user)): Extension<CurrentUser>,
    Json(draft): Json<NewBook>,
) -> Result<(StatusCode, Json<Book>), ApiError> {
    let book = state.backend.books.create(&user.uid, draft).await?;
    Ok((StatusCode::CREATED, Json(book)))
}

async fn update_book(
    State(state): State<AppState>,
    Extension(CurrentUser(user)): Extension<CurrentUser>,
    Path(id): Path<String>,
    Json(patch): Json<BookPatch>,
) -> Result<Json<Book>, ApiError> {
    Ok(Json(state.backend.books.update(&id, &user.uid, patch).await?))
}

async fn delete_book(
    State(state): State<AppState>,
    Extension(CurrentUser(user)): Extension<CurrentUser>,
    Path(id): Path<String>,
) -> Result<StatusCode, ApiError> {
    state.backend.books.delete(&id, &user.uid).await?;
    Ok(StatusCode::NO_CONTENT)
}
