use std::path::PathBuf;
use std::sync::Arc;

use chrono::{DateTime, Datelike, Utc};
use shelf_types::{Book, BookPatch, BookSnapshot, NewBook};
use tokio::sync::{watch, RwLock};
use tracing::{debug, info};

use crate::error::{BackendError, Result};
use crate::persist;

/// Document store for the `books` collection.
///
/// Books are kept in creation order. Every successful mutation is written to the
/// backing file (when configured) before it becomes visible, then a fresh
/// [`BookSnapshot`] is published to subscribers.
pub struct BookStore {
    books: RwLock<Vec<Book>>,
    changes: watch::Sender<Arc<BookSnapshot>>,
    path: Option<PathBuf>,
}

impl BookStore {
    pub fn in_memory() -> Self {
        Self::from_books(Vec::new(), None)
    }

    pub async fn open(path: PathBuf) -> Result<Self> {
        let books: Vec<Book> = persist::load(&path).await?.unwrap_or_default();
        info!("loaded {} books from {}", books.len(), path.display());
        Ok(Self::from_books(books, Some(path)))
    }

    fn from_books(books: Vec<Book>, path: Option<PathBuf>) -> Self {
        let snapshot = BookSnapshot {
            version: 0,
            books: books.clone(),
        };
        let (changes, _) = watch::channel(Arc::new(snapshot));
        Self {
            books: RwLock::new(books),
            changes,
            path,
        }
    }

    pub async fn create(&self, ownerUid: &str, draft: NewBook) -> Result<Book> {
        let now = Utc::now();
        let draft = draft.validate(now.year())?;
        let book = draft.into_book(uuid::Uuid::new_v4().to_string(), ownerUid.to_string(), now);

        let mut books = self.books.write().await;
        let mut next = books.clone();
        next.push(book.clone());
        self.commit(&mut books, next).await?;

        info!(book_id = %book.id, owner = %ownerUid, "book created");
        Ok(book)
    }

    pub async fn get(&self, id: &str) -> Result<Book> {
        self.books
            .read()
            .await
            .iter()
            .find(|b| b.id == id)
            .cloned()
            .ok_or_else(|| BackendError::NotFound(id.to_string()))
    }

    pub async fn list(&self) -> Vec<Book> {
        self.books.read().await.clone()
    }

    pub async fn list_by_owner(&self, ownerUid: &str) -> Vec<Book> {
        self.books
            .read()
            .await
            .iter()
            .filter(|b| b.user_id == ownerUid)
            .cloned()
            .collect()
    }

    pub async fn update(&self, id: &str, requesterUid: &str, patch: BookPatch) -> Result<Book> {
        self.update_at(id, requesterUid, patch, Utc::now()).await
    }

    pub(crate) async fn update_at(
        &self,
        id: &str,
        requesterUid: &str,
        patch: BookPatch,
        now: DateTime<Utc>,
    ) -> Result<Book> {
        patch.validate()?;

        let mut books = self.books.write().await;
        let index = owned_index(&books, id, requesterUid)?;

        let mut next = books.clone();
        patch.apply(&mut next[index], now);
        let updated = next[index].clone();
        self.commit(&mut books, next).await?;

        info!(book_id = %id, "book updated");
        Ok(updated)
    }

    pub async fn delete(&self, id: &str, requesterUid: &str) -> Result<()> {
        let mut books = self.books.write().await;
        let index = owned_index(&books, id, requesterUid)?;

        let mut next = books.clone();
        next.remove(index);
        self.commit(&mut books, next).await?;

        info!(book_id = %id, "book deleted");
        Ok(())
    }

    /// Live view of the collection. The first read yields the current state.
    pub fn subscribe(&self) -> BookSubscription {
        BookSubscription {
            receiver: self.changes.subscribe(),
        }
    }

    async fn commit(&self, books: &mut Vec<Book>, next: Vec<Book>) -> Result<()> {
        if let Some(path) = &self.path {
            persist::save(path, &next).await?;
        }
        *books = next;

        let version = self.changes.borrow().version + 1;
        debug!(version, "publishing book snapshot");
        self.changes.send_replace(Arc::new(BookSnapshot {
            version,
            books: books.clone(),
        }));
        Ok(())
    }
}

fn owned_index(books: &[Book], id: &str, requesterUid: &str) -> Result<usize> {
    let index = books
        .iter()
        .position(|b| b.id == id)
        .ok_or_else(|| BackendError::NotFound(id.to_string()))?;

    if books[index].user_id != requesterUid {
        return Err(BackendError::PermissionDenied);
    }
    Ok(index)
}

/// Handle on the stream of collection snapshots.
///
/// Only the latest snapshot is retained, so a slow reader skips intermediate
/// versions instead of queueing them.
pub struct BookSubscription {
    receiver: watch::Receiver<Arc<BookSnapshot>>,
}

impl BookSubscription {
    pub fn current(&mut self) -> Arc<BookSnapshot> {
        self.receiver.borrow_and_update().clone()
    }

    /// Waits for the next change. `None` once the store is gone.
    pub async fn next(&mut self) -> Option<Arc<BookSnapshot>> {
        self.receiver.changed().await.ok()?;
        Some(self.current())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;
    use shelf_types::{BookValidationError, ReadingStatus};

    fn draft(title: &str) -> NewBook {
        NewBook {
            title: title.into(),
            author: "Ursula K. Le Guin".into(),
            ..NewBook::default()
        }
    }

    #[tokio::test]
    async fn create_assigns_id_and_defaults() {
        let store = BookStore::in_memory();
        let book = store.create("u1", draft(" The Dispossessed ")).await.unwrap();

        assert!(!book.id.is_empty());
        assert_eq!(book.title, "The Dispossessed");
        assert_eq!(book.user_id, "u1");
        assert_eq!(book.status, ReadingStatus::Unread);
        assert_eq!(store.get(&book.id).await.unwrap(), book);
    }

    #[tokio::test]
    async fn create_rejects_invalid_draft() {
        let store = BookStore::in_memory();
        let err = store.create("u1", draft("")).await.unwrap_err();
        assert!(matches!(
            err,
            BackendError::Validation(BookValidationError::MissingTitleOrAuthor)
        ));
        assert!(store.list().await.is_empty());
    }

    #[tokio::test]
    async fn list_keeps_creation_order_and_filters_by_owner() {
        let store = BookStore::in_memory();
        let first = store.create("u1", draft("A Wizard of Earthsea")).await.unwrap();
        store.create("u2", draft("The Lathe of Heaven")).await.unwrap();
        let third = store.create("u1", draft("Tehanu")).await.unwrap();

        let all = store.list().await;
        assert_eq!(all.len(), 3);
        assert_eq!(all[0].id, first.id);

        let mine: Vec<String> = store.list_by_owner("u1").await.into_iter().map(|b| b.id).collect();
        assert_eq!(mine, vec![first.id, third.id]);
    }

    #[tokio::test]
    async fn get_unknown_is_not_found() {
        let store = BookStore::in_memory();
        assert!(matches!(
            store.get("missing").await,
            Err(BackendError::NotFound(id)) if id == "missing"
        ));
    }

    #[tokio::test]
    async fn only_owner_may_update_or_delete() {
        let store = BookStore::in_memory();
        let book = store.create("u1", draft("Tehanu")).await.unwrap();
        let patch = BookPatch {
            is_favorite: Some(true),
            ..BookPatch::default()
        };

        assert!(matches!(
            store.update(&book.id, "u2", patch.clone()).await,
            Err(BackendError::PermissionDenied)
        ));
        assert!(matches!(
            store.delete(&book.id, "u2").await,
            Err(BackendError::PermissionDenied)
        ));

        let later = book.created_at + Duration::minutes(5);
        let updated = store.update_at(&book.id, "u1", patch, later).await.unwrap();
        assert!(updated.is_favorite);
        assert_eq!(updated.updated_at, later);

        store.delete(&book.id, "u1").await.unwrap();
        assert!(store.list().await.is_empty());
    }

    #[tokio::test]
    async fn invalid_patch_leaves_book_untouched() {
        let store = BookStore::in_memory();
        let book = store.create("u1", draft("Tehanu")).await.unwrap();
        let patch = BookPatch {
            rating: Some(9),
            ..BookPatch::default()
        };

        assert!(matches!(
            store.update(&book.id, "u1", patch).await,
            Err(BackendError::Validation(_))
        ));
        assert_eq!(store.get(&book.id).await.unwrap().rating, 0);
    }

    #[tokio::test]
    async fn subscribers_see_current_state_then_each_change() {
        let store = BookStore::in_memory();
        store.create("u1", draft("Tehanu")).await.unwrap();

        let mut subscription = store.subscribe();
        let initial = subscription.current();
        assert_eq!(initial.books.len(), 1);

        let added = store.create("u1", draft("The Other Wind")).await.unwrap();
        let next = subscription.next().await.unwrap();
        assert_eq!(next.version, initial.version + 1);
        assert_eq!(next.books.last().map(|b| b.id.clone()), Some(added.id.clone()));

        store.delete(&added.id, "u1").await.unwrap();
        let after = subscription.next().await.unwrap();
        assert_eq!(after.books.len(), 1);
    }

    #[tokio::test]
    async fn slow_subscriber_only_sees_latest() {
        let store = BookStore::in_memory();
        let mut subscription = store.subscribe();
        subscription.current();

        for title in ["One", "Two", "Three"] {
            store.create("u1", draft(title)).await.unwrap();
        }

        let latest = subscription.next().await.unwrap();
        assert_eq!(latest.version, 3);
        assert_eq!(latest.books.len(), 3);
    }

    #[tokio::test]
    async fn subscription_ends_when_store_dropped() {
        let store = BookStore::in_memory();
        let mut subscription = store.subscribe();
        subscription.current();
        drop(store);
        assert!(subscription.next().await.is_none());
    }

    #[tokio::test]
    async fn books_survive_reopen() {
        let dir = std::env::temp_dir().join(format!("shelf-store-{}", uuid::Uuid::new_v4()));
        let path = dir.join("books.json");

        let store = BookStore::open(path.clone()).await.unwrap();
        let book = store.create("u1", draft("Tehanu")).await.unwrap();
        drop(store);

        let reopened = BookStore::open(path).await.unwrap();
        assert_eq!(reopened.get(&book.id).await.unwrap(), book);
        assert_eq!(reopened.subscribe().current().books.len(), 1);

        let _ = std::fs::remove_dir_all(dir);
    }
}
