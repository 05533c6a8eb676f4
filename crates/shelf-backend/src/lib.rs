#![allow(non_snake_case)]

pub mod auth;
pub mod error;
pub mod persist;
pub mod store;

use std::path::PathBuf;

pub use auth::{AuthService, AuthSettings, Session};
pub use error::{BackendError, Result};
pub use store::{BookStore, BookSubscription};

const BOOKS_FILE: &str = "books.json";
const ACCOUNTS_FILE: &str = "accounts.json";

#[derive(Clone, Debug, Default)]
pub struct BackendConfig {
    /// Directory for the JSON data files. `None` keeps everything in memory.
    pub data_dir: Option<PathBuf>,
    pub auth: AuthSettings,
}

/// The hosted services the application talks to: the `books` collection and the auth provider.
pub struct Backend {
    pub books: BookStore,
    pub auth: AuthService,
}

impl Backend {
    pub fn in_memory(settings: AuthSettings) -> Self {
        Self {
            books: BookStore::in_memory(),
            auth: AuthService::in_memory(settings),
        }
    }

    pub async fn open(config: BackendConfig) -> Result<Self> {
        match config.data_dir {
            Some(dir) => {
                let (books, auth) = tokio::join!(
                    BookStore::open(dir.join(BOOKS_FILE)),
                    AuthService::open(config.auth, dir.join(ACCOUNTS_FILE)),
                );
                Ok(Self {
                    books: books?,
                    auth: auth?,
                })
            }
            None => {
                tracing::warn!("no data directory configured, data will not survive a restart");
                Ok(Self::in_memory(config.auth))
            }
        }
    }
}
