//! Book listing use-case service.
//!
//! # Responsibility
//! - Run the listing filter engine against a repository.
//! - Shape page-number pagination with echoed `next`/`previous` links.
//!
//! # Invariants
//! - Listing parameters never fail a request; only storage errors do.
//! - `count` always reports the unpaged number of matching books.

use crate::model::book::{Book, GutenbergId};
use crate::query::filter::BookFilter;
use crate::query::link::RequestUrl;
use crate::query::page::PageRequest;
use crate::query::params::QueryParams;
use crate::repo::book_repo::{BookListQuery, BookRepository};
use crate::repo::RepoResult;
use log::{error, info};
use serde::Serialize;
use std::time::Instant;

/// One page of a book listing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BookPage {
    pub count: u64,
    pub next: Option<String>,
    pub previous: Option<String>,
    pub results: Vec<Book>,
}

/// Book service facade over repository implementations.
pub struct BookService<R: BookRepository> {
    repo: R,
}

impl<R: BookRepository> BookService<R> {
    /// Creates a service using the provided repository implementation.
    pub fn new(repo: R) -> Self {
        Self { repo }
    }

    /// Lists one page of books for the request's query parameters.
    ///
    /// Filter parameters follow [`BookFilter::from_params`]; `page` and
    /// `page_size` follow [`PageRequest::from_params`]. A page past the end
    /// yields empty `results` with the real `count`.
    pub fn list_books(&self, request: &RequestUrl) -> RepoResult<BookPage> {
        let started_at = Instant::now();
        let filter = BookFilter::from_params(request.params());
        let page = PageRequest::from_params(request.params());

        let result = self.load_page(request, filter, page);
        match &result {
            Ok(listed) => info!(
                "event=book_list module=service status=ok page={} page_size={} count={} returned={} duration_ms={}",
                page.page,
                page.page_size,
                listed.count,
                listed.results.len(),
                started_at.elapsed().as_millis()
            ),
            Err(err) => error!(
                "event=book_list module=service status=error page={} duration_ms={} error={}",
                page.page,
                started_at.elapsed().as_millis(),
                err
            ),
        }
        result
    }

    /// Returns every matching book, unpaged, in the requested order.
    pub fn filter_books(&self, params: &QueryParams) -> RepoResult<Vec<Book>> {
        let query = BookListQuery {
            filter: BookFilter::from_params(params),
            limit: None,
            offset: 0,
        };
        self.repo.list_books(&query)
    }

    /// Gets one listable book by its catalog identifier.
    pub fn get_book(&self, gutenberg_id: GutenbergId) -> RepoResult<Option<Book>> {
        self.repo.get_book(gutenberg_id)
    }

    fn load_page(
        &self,
        request: &RequestUrl,
        filter: BookFilter,
        page: PageRequest,
    ) -> RepoResult<BookPage> {
        let count = self.repo.count_books(&filter)?;
        let query = BookListQuery {
            filter,
            limit: Some(page.page_size),
            offset: page.offset(),
        };
        let results = self.repo.list_books(&query)?;

        let next = page
            .has_next(count)
            .then(|| request.with_param("page", (page.page + 1).to_string()).to_url());
        let previous = (page.page > 1)
            .then(|| request.with_param("page", (page.page - 1).to_string()).to_url());

        Ok(BookPage {
            count,
            next,
            previous,
            results,
        })
    }
}
