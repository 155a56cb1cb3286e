//! Core query logic for the Gutendex book catalog.
//! This crate owns listing semantics: filter parsing, ordering, pagination
//! and category digests over a read-only SQLite catalog.

pub mod db;
pub mod logging;
pub mod model;
pub mod query;
pub mod repo;
pub mod service;

pub use logging::{default_log_level, init_logging, logging_status};
pub use model::book::{Book, Copyright, Format, GutenbergId, Person};
pub use query::filter::{filter_catalog, BookFilter, Predicate, SortOrder, SEARCH_TERMS_MAX};
pub use query::link::RequestUrl;
pub use query::page::{parse_offset, PageRequest, BOOK_PAGE_SIZE_DEFAULT, BOOK_PAGE_SIZE_MAX};
pub use query::params::QueryParams;
pub use repo::book_repo::{BookListQuery, BookRepository, SqliteBookRepository};
pub use repo::bookshelf_repo::{BookshelfRepository, SqliteBookshelfRepository};
pub use repo::{RepoError, RepoResult};
pub use service::book_service::{BookPage, BookService};
pub use service::category_service::{
    CategoryDigest, CategoryPage, CategoryService, CATEGORY_PAGE_SIZE, CATEGORY_PREVIEW_LIMIT,
};

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
