//! Book listing filter composition.
//!
//! # Responsibility
//! - Parse raw listing parameters into predicate descriptors and a sort order.
//! - Evaluate descriptors in memory over a base collection.
//!
//! # Invariants
//! - Parsing never fails: malformed parameters are dropped, not reported.
//! - Only valid books (title and download count present) are ever matched.
//! - Results are unique by `gutenberg_id` and ordered only by [`SortOrder`].
//! - Text matching folds ASCII case only, mirroring SQLite `LIKE`.

use crate::model::book::{Book, Copyright, GutenbergId};
use crate::query::params::QueryParams;
use std::cmp::Ordering;
use std::collections::{BTreeSet, HashSet};

/// Maximum number of `search` tokens that take part in matching.
pub const SEARCH_TERMS_MAX: usize = 32;

/// Result ordering for book listings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortOrder {
    /// `gutenberg_id` increasing.
    Ascending,
    /// `gutenberg_id` decreasing.
    Descending,
    /// `download_count` decreasing, ties by `gutenberg_id` increasing.
    #[default]
    Popular,
}

impl SortOrder {
    /// Maps the `sort` parameter; every unrecognized value means `Popular`.
    pub fn parse(value: Option<&str>) -> Self {
        match value {
            Some("ascending") => Self::Ascending,
            Some("descending") => Self::Descending,
            Some(_) | None => Self::Popular,
        }
    }

    pub fn compare(self, left: &Book, right: &Book) -> Ordering {
        match self {
            Self::Ascending => left.gutenberg_id.cmp(&right.gutenberg_id),
            Self::Descending => right.gutenberg_id.cmp(&left.gutenberg_id),
            Self::Popular => right
                .download_count
                .cmp(&left.download_count)
                .then_with(|| left.gutenberg_id.cmp(&right.gutenberg_id)),
        }
    }
}

/// One independent listing constraint.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Predicate {
    /// Some author has a birth or death year `<=` the bound.
    AuthorYearEnd(i64),
    /// Some author has a birth or death year `>=` the bound.
    AuthorYearStart(i64),
    /// Copyright status is one of the requested values.
    Copyright(BTreeSet<Copyright>),
    /// `gutenberg_id` is in the set.
    Ids(BTreeSet<GutenbergId>),
    /// Some language code equals one of these lowercase codes.
    Languages(BTreeSet<String>),
    /// Some format MIME type starts with this literal prefix.
    MimeTypePrefix(String),
    /// Term occurs in the title or in some author name.
    SearchTerm(String),
    /// Text occurs in some bookshelf or subject name.
    Topic(String),
}

impl Predicate {
    pub fn matches(&self, book: &Book) -> bool {
        match self {
            Self::AuthorYearEnd(year) => book
                .authors
                .iter()
                .any(|author| author.lived_until(*year)),
            Self::AuthorYearStart(year) => {
                book.authors.iter().any(|author| author.lived_from(*year))
            }
            Self::Copyright(allowed) => allowed.contains(&book.copyright),
            Self::Ids(ids) => ids.contains(&book.gutenberg_id),
            Self::Languages(codes) => book
                .languages
                .iter()
                .any(|code| codes.contains(&code.to_ascii_lowercase())),
            Self::MimeTypePrefix(prefix) => book
                .formats
                .iter()
                .any(|format| format.mime_type.starts_with(prefix.as_str())),
            Self::SearchTerm(term) => {
                book.title
                    .as_deref()
                    .is_some_and(|title| contains_ignore_ascii_case(title, term))
                    || book
                        .authors
                        .iter()
                        .any(|author| contains_ignore_ascii_case(&author.name, term))
            }
            Self::Topic(topic) => book
                .bookshelves
                .iter()
                .chain(book.subjects.iter())
                .any(|name| contains_ignore_ascii_case(name, topic)),
        }
    }
}

/// Parsed book listing request: ordered predicates plus output order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BookFilter {
    pub sort: SortOrder,
    pub predicates: Vec<Predicate>,
}

impl BookFilter {
    /// Builds a filter from raw listing parameters.
    ///
    /// Parameters are read in a fixed order; absent or malformed ones
    /// contribute no predicate.
    pub fn from_params(params: &QueryParams) -> Self {
        let mut predicates = Vec::new();

        if let Some(year) = params.get("author_year_end").and_then(parse_int) {
            predicates.push(Predicate::AuthorYearEnd(year));
        }
        if let Some(year) = params.get("author_year_start").and_then(parse_int) {
            predicates.push(Predicate::AuthorYearStart(year));
        }
        if let Some(allowed) = params.get("copyright").and_then(parse_copyright) {
            predicates.push(Predicate::Copyright(allowed));
        }
        if let Some(ids) = params.get("ids").and_then(parse_ids) {
            predicates.push(Predicate::Ids(ids));
        }
        if let Some(languages) = params.get("languages") {
            predicates.push(Predicate::Languages(parse_languages(languages)));
        }
        if let Some(prefix) = params.get("mime_type") {
            predicates.push(Predicate::MimeTypePrefix(prefix.to_string()));
        }
        if let Some(search) = params.get("search") {
            predicates.extend(search_terms(search).map(Predicate::SearchTerm));
        }
        if let Some(topic) = params.get("topic") {
            predicates.push(Predicate::Topic(topic.to_string()));
        }

        Self {
            sort: SortOrder::parse(params.get("sort")),
            predicates,
        }
    }

    /// Whether `book` is valid and satisfies every predicate.
    pub fn matches(&self, book: &Book) -> bool {
        book.is_valid()
            && self
                .predicates
                .iter()
                .all(|predicate| predicate.matches(book))
    }

    /// Filters, deduplicates and orders `books`.
    ///
    /// The first occurrence of a repeated `gutenberg_id` is kept.
    pub fn apply(&self, books: impl IntoIterator<Item = Book>) -> Vec<Book> {
        let mut seen = HashSet::new();
        let mut matched = books
            .into_iter()
            .filter(|book| self.matches(book))
            .filter(|book| seen.insert(book.gutenberg_id))
            .collect::<Vec<_>>();
        matched.sort_by(|left, right| self.sort.compare(left, right));
        matched
    }
}

/// Filters an in-memory catalog with raw listing parameters.
pub fn filter_catalog(books: impl IntoIterator<Item = Book>, params: &QueryParams) -> Vec<Book> {
    BookFilter::from_params(params).apply(books)
}

fn parse_int(value: &str) -> Option<i64> {
    value.trim().parse().ok()
}

/// Returns `None` when the set would not exclude anything.
fn parse_copyright(value: &str) -> Option<BTreeSet<Copyright>> {
    let allowed = value
        .split(',')
        .filter_map(Copyright::from_token)
        .collect::<BTreeSet<_>>();

    if allowed.is_empty() || allowed.len() == Copyright::ALL.len() {
        return None;
    }
    Some(allowed)
}

/// All-or-nothing: one unparsable token disables the whole list.
fn parse_ids(value: &str) -> Option<BTreeSet<GutenbergId>> {
    value.split(',').map(parse_int).collect()
}

fn parse_languages(value: &str) -> BTreeSet<String> {
    value
        .split(',')
        .map(|code| code.to_ascii_lowercase())
        .collect()
}

fn search_terms(value: &str) -> impl Iterator<Item = String> + '_ {
    value
        .split(' ')
        .filter(|term| !term.is_empty())
        .take(SEARCH_TERMS_MAX)
        .map(str::to_string)
}

fn contains_ignore_ascii_case(haystack: &str, needle: &str) -> bool {
    haystack
        .to_ascii_lowercase()
        .contains(&needle.to_ascii_lowercase())
}
