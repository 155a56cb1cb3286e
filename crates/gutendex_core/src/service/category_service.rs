//! Category (bookshelf) digest use-case service.
//!
//! # Responsibility
//! - Page through bookshelves in fixed windows ordered by name.
//! - Decorate each shelf with its book count, a popularity preview and a
//!   deep link into the book listing.
//!
//! # Invariants
//! - Window size and preview size are fixed at 5.
//! - The per-shelf `next` link always targets page 2 of the EPUB listing,
//!   whatever the shelf size.
//! - The page-level `next` link echoes every inbound parameter and only
//!   overrides `offset`.

use crate::model::book::Book;
use crate::query::link::RequestUrl;
use crate::query::page::parse_offset;
use crate::query::params::QueryParams;
use crate::repo::bookshelf_repo::BookshelfRepository;
use crate::repo::RepoResult;
use log::{error, info};
use serde::Serialize;
use std::time::Instant;

pub const CATEGORY_PAGE_SIZE: u32 = 5;
pub const CATEGORY_PREVIEW_LIMIT: u32 = 5;

const BOOKS_PATH: &str = "/books";
const PREVIEW_MIME_TYPE: &str = "application/epub+zip";

/// One bookshelf with its preview.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CategoryDigest {
    pub name: String,
    /// Number of valid books on the shelf.
    pub count: u64,
    /// Most downloaded books on the shelf, at most [`CATEGORY_PREVIEW_LIMIT`].
    pub books: Vec<Book>,
    /// Book listing link continuing after the preview.
    pub next: String,
}

/// One window of bookshelf digests.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CategoryPage {
    pub results: Vec<CategoryDigest>,
    pub next: Option<String>,
}

/// Category service facade over repository implementations.
pub struct CategoryService<R: BookshelfRepository> {
    repo: R,
}

impl<R: BookshelfRepository> CategoryService<R> {
    /// Creates a service using the provided repository implementation.
    pub fn new(repo: R) -> Self {
        Self { repo }
    }

    /// Lists the category window selected by the request's `offset`.
    ///
    /// A missing, malformed or negative `offset` means `0`.
    pub fn list_categories(&self, request: &RequestUrl) -> RepoResult<CategoryPage> {
        let offset = parse_offset(request.params().get("offset"));
        let started_at = Instant::now();

        let result = self.load_window(request, offset);
        match &result {
            Ok((page, total)) => info!(
                "event=category_list module=service status=ok offset={} total={} returned={} has_next={} duration_ms={}",
                offset,
                total,
                page.results.len(),
                page.next.is_some(),
                started_at.elapsed().as_millis()
            ),
            Err(err) => error!(
                "event=category_list module=service status=error offset={} duration_ms={} error={}",
                offset,
                started_at.elapsed().as_millis(),
                err
            ),
        }
        result.map(|(page, _)| page)
    }

    fn load_window(&self, request: &RequestUrl, offset: u32) -> RepoResult<(CategoryPage, u64)> {
        let total = self.repo.count_bookshelves()?;
        let names = self.repo.list_bookshelves(offset, CATEGORY_PAGE_SIZE)?;

        let mut results = Vec::with_capacity(names.len());
        for name in names {
            let count = self.repo.count_shelf_books(&name)?;
            let books = self.repo.top_shelf_books(&name, CATEGORY_PREVIEW_LIMIT)?;
            let next = next_books_url(request, &name);
            results.push(CategoryDigest {
                name,
                count,
                books,
                next,
            });
        }

        let next_offset = u64::from(offset) + u64::from(CATEGORY_PAGE_SIZE);
        let next = (next_offset < total)
            .then(|| request.with_param("offset", next_offset.to_string()).to_url());

        Ok((CategoryPage { results, next }, total))
    }
}

/// Deep link to the second EPUB page of a shelf's popular books.
pub fn next_books_url(request: &RequestUrl, shelf: &str) -> String {
    let params: QueryParams = [
        ("topic", shelf.to_string()),
        ("sort", "popular".to_string()),
        ("mime_type", PREVIEW_MIME_TYPE.to_string()),
        ("page_size", CATEGORY_PREVIEW_LIMIT.to_string()),
        ("page", "2".to_string()),
    ]
    .into_iter()
    .collect();
    request.sibling(BOOKS_PATH, params).to_url()
}
