pub mod add_book;
pub mod book_detail;
pub mod books;
pub mod dashboard;
pub mod home;
pub mod login;
