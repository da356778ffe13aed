mod database;
mod page_repository;
mod tag_repository;

pub use database::{Connection, Database};
pub use page_repository::PageRepository;
pub use tag_repository::TagRepository;
