use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Book {
    pub id: String,
    pub title: String,
    pub author: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub published_year: Option<i32>,
    #[serde(default)]
    pub is_favorite: bool,
    #[serde(default)]
    pub status: ReadingStatus,
    #[serde(default)]
    pub rating: u8,
    pub user_id: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Clone, Copy, Debug, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ReadingStatus {
    #[default]
    Unread,
    Reading,
    Read,
}

impl ReadingStatus {
    pub const ALL: [ReadingStatus; 3] = [Self::Unread, Self::Reading, Self::Read];

    pub fn as_str(&self) -> &'static str {
        match self {
            ReadingStatus::Unread => "unread",
            ReadingStatus::Reading => "reading",
            ReadingStatus::Read => "read",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            ReadingStatus::Unread => "Unread",
            ReadingStatus::Reading => "Reading",
            ReadingStatus::Read => "Read",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|s| s.as_str() == value)
    }
}

/// Fields a user supplies when adding a book. The backend assigns the rest.
#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct NewBook {
    pub title: String,
    pub author: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub published_year: Option<i32>,
    #[serde(default)]
    pub is_favorite: bool,
}

#[derive(Clone, Debug, Error, Serialize, Deserialize, PartialEq, Eq)]
pub enum BookValidationError {
    #[error("Title and author are required")]
    MissingTitleOrAuthor,

    #[error("Published year must be between 0 and {max}")]
    PublishedYearOutOfRange { max: i32 },

    #[error("Rating must be between 0 and {max}")]
    RatingOutOfRange { max: u8 },
}

pub const MAX_RATING: u8 = 5;

impl NewBook {
    /// Trims text fields and checks required fields and the year range.
    pub fn validate(self, currentYear: i32) -> Result<NewBook, BookValidationError> {
        let title = self.title.trim().to_string();
        let author = self.author.trim().to_string();

        if title.is_empty() || author.is_empty() {
            return Err(BookValidationError::MissingTitleOrAuthor);
        }

        if let Some(year) = self.published_year {
            if !(0..=currentYear).contains(&year) {
                return Err(BookValidationError::PublishedYearOutOfRange { max: currentYear });
            }
        }

        Ok(NewBook {
            title,
            author,
            description: self.description.trim().to_string(),
            published_year: self.published_year,
            is_favorite: self.is_favorite,
        })
    }

    pub fn into_book(self, id: String, userId: String, now: DateTime<Utc>) -> Book {
        Book {
            id,
            title: self.title,
            author: self.author,
            description: self.description,
            published_year: self.published_year,
            is_favorite: self.is_favorite,
            status: ReadingStatus::Unread,
            rating: 0,
            user_id: userId,
            created_at: now,
            updated_at: now,
        }
    }
}

/// Partial update of the user-editable book state.
#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct BookPatch {
    #[serde(default)]
    pub is_favorite: Option<bool>,
    #[serde(default)]
    pub status: Option<ReadingStatus>,
    #[serde(default)]
    pub rating: Option<u8>,
}

impl BookPatch {
    pub fn validate(&self) -> Result<(), BookValidationError> {
        match self.rating {
            Some(rating) if rating > MAX_RATING => {
                Err(BookValidationError::RatingOutOfRange { max: MAX_RATING })
            }
            _ => Ok(()),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.is_favorite.is_none() && self.status.is_none() && self.rating.is_none()
    }

    pub fn apply(&self, book: &mut Book, now: DateTime<Utc>) {
        if let Some(isFavorite) = self.is_favorite {
            book.is_favorite = isFavorite;
        }
        if let Some(status) = self.status {
            book.status = status;
        }
        if let Some(rating) = self.rating {
            book.rating = rating;
        }
        book.updated_at = now;
    }
}

/// Full contents of the collection at one point in time.
#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq)]
pub struct BookSnapshot {
    pub version: u64,
    pub books: Vec<Book>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn draft(title: &str, author: &str) -> NewBook {
        NewBook {
            title: title.into(),
            author: author.into(),
            ..NewBook::default()
        }
    }

    #[test]
    fn validate_trims_fields() {
        let book = NewBook {
            description: "  a story  ".into(),
            ..draft("  Dune ", " Frank Herbert")
        }
        .validate(2024)
        .unwrap();

        assert_eq!(book.title, "Dune");
        assert_eq!(book.author, "Frank Herbert");
        assert_eq!(book.description, "a story");
    }

    #[test]
    fn validate_rejects_blank_title_or_author() {
        assert_eq!(
            draft("   ", "Someone").validate(2024),
            Err(BookValidationError::MissingTitleOrAuthor)
        );
        assert_eq!(
            draft("Title", "").validate(2024),
            Err(BookValidationError::MissingTitleOrAuthor)
        );
        assert_eq!(
            BookValidationError::MissingTitleOrAuthor.to_string(),
            "Title and author are required"
        );
    }

    #[test]
    fn validate_checks_year_range() {
        let mut book = draft("Dune", "Frank Herbert");
        book.published_year = Some(2030);
        assert_eq!(
            book.clone().validate(2024),
            Err(BookValidationError::PublishedYearOutOfRange { max: 2024 })
        );

        book.published_year = Some(-1);
        assert!(book.clone().validate(2024).is_err());

        book.published_year = Some(1965);
        assert!(book.validate(2024).is_ok());
    }

    #[test]
    fn new_books_start_unread_and_unrated() {
        let now = Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap();
        let book = draft("Dune", "Frank Herbert").into_book("b1".into(), "u1".into(), now);

        assert_eq!(book.status, ReadingStatus::Unread);
        assert_eq!(book.rating, 0);
        assert_eq!(book.created_at, book.updated_at);
        assert_eq!(book.user_id, "u1");
    }

    #[test]
    fn patch_rejects_rating_above_max() {
        let patch = BookPatch {
            rating: Some(6),
            ..BookPatch::default()
        };
        assert_eq!(
            patch.validate(),
            Err(BookValidationError::RatingOutOfRange { max: 5 })
        );
    }

    #[test]
    fn patch_updates_only_given_fields() {
        let created = Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap();
        let later = Utc.with_ymd_and_hms(2024, 6, 1, 12, 0, 0).unwrap();
        let mut book = draft("Dune", "Frank Herbert").into_book("b1".into(), "u1".into(), created);

        BookPatch {
            status: Some(ReadingStatus::Reading),
            ..BookPatch::default()
        }
        .apply(&mut book, later);

        assert_eq!(book.status, ReadingStatus::Reading);
        assert!(!book.is_favorite);
        assert_eq!(book.created_at, created);
        assert_eq!(book.updated_at, later);
    }

    #[test]
    fn book_uses_camel_case_on_the_wire() {
        let now = Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap();
        let mut book = draft("Dune", "Frank Herbert").into_book("b1".into(), "u1".into(), now);
        book.published_year = Some(1965);

        let json = serde_json::to_value(&book).unwrap();
        assert_eq!(json["publishedYear"], 1965);
        assert_eq!(json["isFavorite"], false);
        assert_eq!(json["userId"], "u1");
        assert_eq!(json["status"], "unread");
    }
}
