//! Book repository contracts and SQLite implementation.
//!
//! # Responsibility
//! - Push listing predicates down into SQL over the `books` table.
//! - Hydrate catalog entries with authors, languages, formats, bookshelves
//!   and subjects.
//!
//! # Invariants
//! - Every predicate renders as a self-contained condition on one `books`
//!   row (`EXISTS` for many-to-many relations), so joins never duplicate rows.
//! - Case-insensitive matching uses SQLite `LIKE` (ASCII case folding) with
//!   `\` escaping of wildcard characters.
//! - List predicates (`ids`, `languages`) bind as one JSON array parameter
//!   read through `json_each`, whatever the list length.
//! - Hydration runs one query per relation per result set.
//! - The internal `books.id` row key never leaves this module.

use crate::model::book::{Book, Copyright, Format, GutenbergId, Person};
use crate::query::filter::{BookFilter, Predicate, SortOrder};
use crate::repo::{ensure_catalog_tables, RepoError, RepoResult, TableSpec};
use rusqlite::types::Value;
use rusqlite::{params_from_iter, Connection, Row};
use std::collections::HashMap;

pub(crate) const BOOK_SELECT_SQL: &str = "SELECT DISTINCT
    books.id AS row_id,
    books.gutenberg_id AS gutenberg_id,
    books.title AS title,
    books.download_count AS download_count,
    books.copyright AS copyright
FROM books";

/// Base condition shared by every listing.
pub(crate) const VALID_BOOK_SQL: &str =
    "books.title IS NOT NULL AND books.download_count IS NOT NULL";

pub(crate) const POPULAR_ORDER_SQL: &str =
    "ORDER BY books.download_count DESC, books.gutenberg_id ASC";

const AUTHORS_SQL: &str = "SELECT ba.book_id, p.name, p.birth_year, p.death_year
FROM book_authors ba
INNER JOIN people p ON p.id = ba.person_id
WHERE ba.book_id IN (SELECT value FROM json_each(?1))
ORDER BY ba.book_id ASC, p.name ASC, p.id ASC;";

const FORMATS_SQL: &str = "SELECT book_id, mime_type, url
FROM formats
WHERE book_id IN (SELECT value FROM json_each(?1))
ORDER BY book_id ASC, mime_type ASC, id ASC;";

const LANGUAGES_SQL: &str = "SELECT bl.book_id, l.code
FROM book_languages bl
INNER JOIN languages l ON l.id = bl.language_id
WHERE bl.book_id IN (SELECT value FROM json_each(?1))
ORDER BY bl.book_id ASC, l.code ASC;";

const BOOKSHELVES_SQL: &str = "SELECT bb.book_id, s.name
FROM book_bookshelves bb
INNER JOIN bookshelves s ON s.id = bb.bookshelf_id
WHERE bb.book_id IN (SELECT value FROM json_each(?1))
ORDER BY bb.book_id ASC, s.name ASC;";

const SUBJECTS_SQL: &str = "SELECT bs.book_id, s.name
FROM book_subjects bs
INNER JOIN subjects s ON s.id = bs.subject_id
WHERE bs.book_id IN (SELECT value FROM json_each(?1))
ORDER BY bs.book_id ASC, s.name ASC;";

const AUTHOR_EXISTS_SQL: &str = "EXISTS (
    SELECT 1
    FROM book_authors ba
    INNER JOIN people p ON p.id = ba.person_id
    WHERE ba.book_id = books.id";

pub(crate) const CATALOG_TABLES: &[TableSpec] = &[
    (
        "books",
        &["id", "gutenberg_id", "title", "download_count", "copyright"],
    ),
    ("people", &["id", "name", "birth_year", "death_year"]),
    ("book_authors", &["book_id", "person_id"]),
    ("languages", &["id", "code"]),
    ("book_languages", &["book_id", "language_id"]),
    ("formats", &["book_id", "mime_type", "url"]),
    ("bookshelves", &["id", "name"]),
    ("book_bookshelves", &["book_id", "bookshelf_id"]),
    ("subjects", &["id", "name"]),
    ("book_subjects", &["book_id", "subject_id"]),
];

/// Query options for listing books.
#[derive(Debug, Clone, Default)]
pub struct BookListQuery {
    pub filter: BookFilter,
    pub limit: Option<u32>,
    pub offset: u64,
}

/// Repository interface for book listing and lookup.
pub trait BookRepository {
    /// Lists valid books matching `query.filter`, in its sort order.
    fn list_books(&self, query: &BookListQuery) -> RepoResult<Vec<Book>>;
    /// Counts valid books matching `filter`.
    fn count_books(&self, filter: &BookFilter) -> RepoResult<u64>;
    /// Gets one valid book by its external identifier.
    fn get_book(&self, gutenberg_id: GutenbergId) -> RepoResult<Option<Book>>;
}

/// SQLite-backed book repository.
pub struct SqliteBookRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteBookRepository<'conn> {
    /// Constructs a repository from a migrated/ready connection.
    pub fn try_new(conn: &'conn Connection) -> RepoResult<Self> {
        ensure_catalog_tables(conn, CATALOG_TABLES)?;
        Ok(Self { conn })
    }
}

impl BookRepository for SqliteBookRepository<'_> {
    fn list_books(&self, query: &BookListQuery) -> RepoResult<Vec<Book>> {
        let (where_sql, mut bind_values) = filter_where_sql(&query.filter);
        let mut sql = format!(
            "{BOOK_SELECT_SQL} {where_sql} {}",
            order_by_sql(query.filter.sort)
        );

        let offset = i64::try_from(query.offset).unwrap_or(i64::MAX);
        if let Some(limit) = query.limit {
            sql.push_str(" LIMIT ?");
            bind_values.push(Value::Integer(i64::from(limit)));
            if offset > 0 {
                sql.push_str(" OFFSET ?");
                bind_values.push(Value::Integer(offset));
            }
        } else if offset > 0 {
            sql.push_str(" LIMIT -1 OFFSET ?");
            bind_values.push(Value::Integer(offset));
        }

        load_books(self.conn, &sql, bind_values)
    }

    fn count_books(&self, filter: &BookFilter) -> RepoResult<u64> {
        let (where_sql, bind_values) = filter_where_sql(filter);
        let count: i64 = self.conn.query_row(
            &format!("SELECT COUNT(DISTINCT books.id) FROM books {where_sql}"),
            params_from_iter(bind_values),
            |row| row.get(0),
        )?;
        to_count(count)
    }

    fn get_book(&self, gutenberg_id: GutenbergId) -> RepoResult<Option<Book>> {
        let sql = format!(
            "{BOOK_SELECT_SQL} WHERE {VALID_BOOK_SQL} AND books.gutenberg_id = ?"
        );
        let mut books = load_books(self.conn, &sql, vec![Value::Integer(gutenberg_id)])?;
        Ok(books.pop())
    }
}

/// Runs a book `SELECT` and hydrates every row with its associations.
///
/// `sql` must select the columns of `BOOK_SELECT_SQL`. Associations are
/// loaded with one query per relation for the whole result set.
pub(crate) fn load_books(
    conn: &Connection,
    sql: &str,
    bind_values: Vec<Value>,
) -> RepoResult<Vec<Book>> {
    let mut stmt = conn.prepare(sql)?;
    let mut rows = stmt.query(params_from_iter(bind_values))?;
    let mut entries = Vec::new();
    while let Some(row) = rows.next()? {
        entries.push(parse_book_row(row)?);
    }
    if entries.is_empty() {
        return Ok(Vec::new());
    }

    let row_ids = json_array(entries.iter().map(|(row_id, _)| *row_id));
    let mut authors = load_grouped(conn, AUTHORS_SQL, &row_ids, |row| {
        Ok(Person {
            name: row.get(1)?,
            birth_year: row.get(2)?,
            death_year: row.get(3)?,
        })
    })?;
    let mut formats = load_grouped(conn, FORMATS_SQL, &row_ids, |row| {
        Ok(Format {
            mime_type: row.get(1)?,
            url: row.get(2)?,
        })
    })?;
    let mut languages = load_grouped(conn, LANGUAGES_SQL, &row_ids, |row| {
        row.get::<_, String>(1)
    })?;
    let mut bookshelves = load_grouped(conn, BOOKSHELVES_SQL, &row_ids, |row| {
        row.get::<_, String>(1)
    })?;
    let mut subjects = load_grouped(conn, SUBJECTS_SQL, &row_ids, |row| {
        row.get::<_, String>(1)
    })?;

    Ok(entries
        .into_iter()
        .map(|(row_id, mut book)| {
            book.authors = authors.remove(&row_id).unwrap_or_default();
            book.formats = formats.remove(&row_id).unwrap_or_default();
            book.languages = languages.remove(&row_id).unwrap_or_default();
            book.bookshelves = bookshelves.remove(&row_id).unwrap_or_default();
            book.subjects = subjects.remove(&row_id).unwrap_or_default();
            book
        })
        .collect())
}

pub(crate) fn to_count(value: i64) -> RepoResult<u64> {
    u64::try_from(value)
        .map_err(|_| RepoError::InvalidData(format!("negative row count `{value}`")))
}

fn filter_where_sql(filter: &BookFilter) -> (String, Vec<Value>) {
    let mut sql = format!("WHERE {VALID_BOOK_SQL}");
    let mut bind_values = Vec::new();

    for predicate in &filter.predicates {
        sql.push_str(" AND ");
        sql.push_str(&predicate_sql(predicate, &mut bind_values));
    }

    (sql, bind_values)
}

fn order_by_sql(sort: SortOrder) -> &'static str {
    match sort {
        SortOrder::Ascending => "ORDER BY books.gutenberg_id ASC",
        SortOrder::Descending => "ORDER BY books.gutenberg_id DESC",
        SortOrder::Popular => POPULAR_ORDER_SQL,
    }
}

fn predicate_sql(predicate: &Predicate, bind_values: &mut Vec<Value>) -> String {
    match predicate {
        Predicate::AuthorYearEnd(year) => {
            bind_values.push(Value::Integer(*year));
            bind_values.push(Value::Integer(*year));
            format!("{AUTHOR_EXISTS_SQL} AND (p.birth_year <= ? OR p.death_year <= ?))")
        }
        Predicate::AuthorYearStart(year) => {
            bind_values.push(Value::Integer(*year));
            bind_values.push(Value::Integer(*year));
            format!("{AUTHOR_EXISTS_SQL} AND (p.birth_year >= ? OR p.death_year >= ?))")
        }
        Predicate::Copyright(allowed) => {
            let conditions = allowed
                .iter()
                .map(|value| match value {
                    Copyright::Yes => "books.copyright = 1",
                    Copyright::No => "books.copyright = 0",
                    Copyright::Unknown => "books.copyright IS NULL",
                })
                .collect::<Vec<_>>();
            format!("({})", conditions.join(" OR "))
        }
        Predicate::Ids(ids) => {
            bind_values.push(Value::Text(json_array(ids.iter().copied())));
            "books.gutenberg_id IN (SELECT value FROM json_each(?))".to_string()
        }
        Predicate::Languages(codes) => {
            bind_values.push(Value::Text(json_array(codes.iter().cloned())));
            "EXISTS (
                SELECT 1
                FROM book_languages bl
                INNER JOIN languages l ON l.id = bl.language_id
                WHERE bl.book_id = books.id
                  AND lower(l.code) IN (SELECT value FROM json_each(?))
            )"
            .to_string()
        }
        Predicate::MimeTypePrefix(prefix) => {
            bind_values.push(Value::Text(prefix.clone()));
            bind_values.push(Value::Text(prefix.clone()));
            "EXISTS (
                SELECT 1
                FROM formats f
                WHERE f.book_id = books.id
                  AND substr(f.mime_type, 1, length(?)) = ?
            )"
            .to_string()
        }
        Predicate::SearchTerm(term) => {
            let pattern = like_pattern(term);
            bind_values.push(Value::Text(pattern.clone()));
            bind_values.push(Value::Text(pattern));
            format!(
                "(books.title LIKE ? ESCAPE '\\'
                  OR {AUTHOR_EXISTS_SQL} AND p.name LIKE ? ESCAPE '\\'))"
            )
        }
        Predicate::Topic(topic) => {
            let pattern = like_pattern(topic);
            bind_values.push(Value::Text(pattern.clone()));
            bind_values.push(Value::Text(pattern));
            "(EXISTS (
                SELECT 1
                FROM book_bookshelves bb
                INNER JOIN bookshelves s ON s.id = bb.bookshelf_id
                WHERE bb.book_id = books.id
                  AND s.name LIKE ? ESCAPE '\\'
              )
              OR EXISTS (
                SELECT 1
                FROM book_subjects bs
                INNER JOIN subjects s ON s.id = bs.subject_id
                WHERE bs.book_id = books.id
                  AND s.name LIKE ? ESCAPE '\\'
              ))"
            .to_string()
        }
    }
}

/// Encodes `values` as a JSON array for binding to `json_each(?)`.
fn json_array<T: Into<serde_json::Value>>(values: impl IntoIterator<Item = T>) -> String {
    values.into_iter().collect::<serde_json::Value>().to_string()
}

/// Wraps `text` into a `%text%` pattern with `\`, `%` and `_` escaped.
fn like_pattern(text: &str) -> String {
    let mut pattern = String::with_capacity(text.len() + 2);
    pattern.push('%');
    for ch in text.chars() {
        if matches!(ch, '\\' | '%' | '_') {
            pattern.push('\\');
        }
        pattern.push(ch);
    }
    pattern.push('%');
    pattern
}

fn parse_book_row(row: &Row<'_>) -> RepoResult<(i64, Book)> {
    let copyright = match row.get::<_, Option<i64>>("copyright")? {
        Some(1) => Copyright::Yes,
        Some(0) => Copyright::No,
        None => Copyright::Unknown,
        Some(other) => {
            return Err(RepoError::InvalidData(format!(
                "invalid copyright value `{other}` in books.copyright"
            )));
        }
    };

    let mut book = Book::new(
        row.get("gutenberg_id")?,
        row.get::<_, Option<String>>("title")?.as_deref(),
        row.get("download_count")?,
    );
    book.copyright = copyright;
    Ok((row.get("row_id")?, book))
}

/// Runs a relation query over `row_ids` and groups rows by their leading
/// `book_id` column, keeping query order within each group.
fn load_grouped<T>(
    conn: &Connection,
    sql: &str,
    row_ids: &str,
    mut read: impl FnMut(&Row<'_>) -> rusqlite::Result<T>,
) -> RepoResult<HashMap<i64, Vec<T>>> {
    let mut stmt = conn.prepare_cached(sql)?;
    let mut rows = stmt.query([row_ids])?;
    let mut grouped: HashMap<i64, Vec<T>> = HashMap::new();
    while let Some(row) = rows.next()? {
        let book_id: i64 = row.get(0)?;
        grouped.entry(book_id).or_default().push(read(row)?);
    }
    Ok(grouped)
}
