use serde::{Deserialize, Serialize};

use crate::book::Book;

#[derive(Clone, Copy, Debug, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum BookFilter {
    #[default]
    All,
    Favorites,
}

impl BookFilter {
    pub fn as_str(&self) -> &'static str {
        match self {
            BookFilter::All => "all",
            BookFilter::Favorites => "favorites",
        }
    }

    /// Unknown tokens fall back to `All`.
    pub fn parse(value: &str) -> Self {
        match value.trim() {
            "favorites" => BookFilter::Favorites,
            _ => BookFilter::All,
        }
    }
}

#[derive(Clone, Copy, Debug, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum SortOrder {
    #[default]
    Newest,
    Oldest,
    Title,
}

impl SortOrder {
    pub const ALL: [SortOrder; 3] = [Self::Newest, Self::Oldest, Self::Title];

    pub fn as_str(&self) -> &'static str {
        match self {
            SortOrder::Newest => "newest",
            SortOrder::Oldest => "oldest",
            SortOrder::Title => "title",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            SortOrder::Newest => "Newest First",
            SortOrder::Oldest => "Oldest First",
            SortOrder::Title => "Title (A-Z)",
        }
    }

    /// Unknown tokens fall back to `Newest`.
    pub fn parse(value: &str) -> Self {
        match value.trim() {
            "oldest" => SortOrder::Oldest,
            "title" => SortOrder::Title,
            _ => SortOrder::Newest,
        }
    }
}

/// Search, filter and sort settings of a book listing.
#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct BookQuery {
    #[serde(default)]
    pub search: String,
    #[serde(default)]
    pub filter: BookFilter,
    #[serde(default)]
    pub sort: SortOrder,
}

impl BookQuery {
    pub fn matches(&self, book: &Book) -> bool {
        let needle = self.search.trim().to_lowercase();
        let matchesSearch = needle.is_empty()
            || book.title.to_lowercase().contains(&needle)
            || book.author.to_lowercase().contains(&needle);

        match self.filter {
            BookFilter::All => matchesSearch,
            BookFilter::Favorites => matchesSearch && book.is_favorite,
        }
    }

    pub fn apply(&self, books: &[Book]) -> Vec<Book> {
        let mut selected: Vec<Book> = books.iter().filter(|b| self.matches(b)).cloned().collect();

        match self.sort {
            SortOrder::Newest => selected.sort_by(|a, b| b.created_at.cmp(&a.created_at)),
            SortOrder::Oldest => selected.sort_by(|a, b| a.created_at.cmp(&b.created_at)),
            SortOrder::Title => selected.sort_by(|a, b| {
                a.title
                    .to_lowercase()
                    .cmp(&b.title.to_lowercase())
                    .then_with(|| a.title.cmp(&b.title))
            }),
        }

        selected
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::book::ReadingStatus;
    use chrono::{TimeZone, Utc};

    fn book(id: &str, title: &str, author: &str, day: u32, favorite: bool) -> Book {
        let at = Utc.with_ymd_and_hms(2024, 1, day, 0, 0, 0).unwrap();
        Book {
            id: id.into(),
            title: title.into(),
            author: author.into(),
            description: String::new(),
            published_year: None,
            is_favorite: favorite,
            status: ReadingStatus::Unread,
            rating: 0,
            user_id: "u1".into(),
            created_at: at,
            updated_at: at,
        }
    }

    fn shelf() -> Vec<Book> {
        vec![
            book("1", "Dune", "Frank Herbert", 3, true),
            book("2", "emma", "Jane Austen", 1, false),
            book("3", "Children of Dune", "Frank Herbert", 2, false),
            book("4", "Beloved", "Toni Morrison", 4, true),
        ]
    }

    fn ids(books: &[Book]) -> Vec<&str> {
        books.iter().map(|b| b.id.as_str()).collect()
    }

    #[test]
    fn default_query_returns_newest_first() {
        let result = BookQuery::default().apply(&shelf());
        assert_eq!(ids(&result), vec!["4", "1", "3", "2"]);
    }

    #[test]
    fn oldest_sort_is_ascending_by_creation() {
        let query = BookQuery {
            sort: SortOrder::Oldest,
            ..BookQuery::default()
        };
        assert_eq!(ids(&query.apply(&shelf())), vec!["2", "3", "1", "4"]);
    }

    #[test]
    fn title_sort_ignores_case() {
        let query = BookQuery {
            sort: SortOrder::Title,
            ..BookQuery::default()
        };
        assert_eq!(ids(&query.apply(&shelf())), vec!["4", "3", "1", "2"]);
    }

    #[test]
    fn search_matches_title_or_author_case_insensitively() {
        let query = BookQuery {
            search: "  DUNE ".into(),
            sort: SortOrder::Oldest,
            ..BookQuery::default()
        };
        assert_eq!(ids(&query.apply(&shelf())), vec!["3", "1"]);

        let byAuthor = BookQuery {
            search: "austen".into(),
            ..BookQuery::default()
        };
        assert_eq!(ids(&byAuthor.apply(&shelf())), vec!["2"]);
    }

    #[test]
    fn favorites_filter_combines_with_search() {
        let query = BookQuery {
            search: "herbert".into(),
            filter: BookFilter::Favorites,
            sort: SortOrder::Newest,
        };
        assert_eq!(ids(&query.apply(&shelf())), vec!["1"]);
    }

    #[test]
    fn no_match_yields_empty_list() {
        let query = BookQuery {
            search: "tolkien".into(),
            ..BookQuery::default()
        };
        assert!(query.apply(&shelf()).is_empty());
    }

    #[test]
    fn unknown_tokens_fall_back_to_defaults() {
        assert_eq!(BookFilter::parse("favorites"), BookFilter::Favorites);
        assert_eq!(BookFilter::parse("bogus"), BookFilter::All);
        assert_eq!(SortOrder::parse("title"), SortOrder::Title);
        assert_eq!(SortOrder::parse(""), SortOrder::Newest);
    }
}
