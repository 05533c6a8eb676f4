pub mod auth_form;
pub mod book_card;
pub mod book_form;
pub mod nav;
pub mod toast;
