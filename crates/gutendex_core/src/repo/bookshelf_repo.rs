//! Bookshelf (category) repository contracts and SQLite implementation.
//!
//! # Responsibility
//! - Provide name-ordered bookshelf windows and totals.
//! - Provide per-shelf valid-book counts and popularity previews.
//!
//! # Invariants
//! - Bookshelves are always ordered by `name ASC`.
//! - Per-shelf book queries reuse the valid-book base condition and never
//!   read listing parameters.

use crate::model::book::Book;
use crate::repo::book_repo::{
    load_books, to_count, BOOK_SELECT_SQL, CATALOG_TABLES, POPULAR_ORDER_SQL, VALID_BOOK_SQL,
};
use crate::repo::{ensure_catalog_tables, RepoResult};
use rusqlite::types::Value;
use rusqlite::{params, Connection};

const SHELF_MEMBER_SQL: &str = "EXISTS (
    SELECT 1
    FROM book_bookshelves bb
    INNER JOIN bookshelves s ON s.id = bb.bookshelf_id
    WHERE bb.book_id = books.id
      AND s.name = ?
)";

/// Repository interface for bookshelf digests.
pub trait BookshelfRepository {
    /// Total number of bookshelves.
    fn count_bookshelves(&self) -> RepoResult<u64>;
    /// Up to `limit` bookshelf names in name order, skipping `offset`.
    fn list_bookshelves(&self, offset: u32, limit: u32) -> RepoResult<Vec<String>>;
    /// Number of valid books on the named shelf.
    fn count_shelf_books(&self, shelf: &str) -> RepoResult<u64>;
    /// Up to `limit` valid books on the named shelf, most downloaded first.
    fn top_shelf_books(&self, shelf: &str, limit: u32) -> RepoResult<Vec<Book>>;
}

/// SQLite-backed bookshelf repository.
pub struct SqliteBookshelfRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteBookshelfRepository<'conn> {
    /// Constructs a repository from a migrated/ready connection.
    pub fn try_new(conn: &'conn Connection) -> RepoResult<Self> {
        ensure_catalog_tables(conn, CATALOG_TABLES)?;
        Ok(Self { conn })
    }
}

impl BookshelfRepository for SqliteBookshelfRepository<'_> {
    fn count_bookshelves(&self) -> RepoResult<u64> {
        let count: i64 = self
            .conn
            .query_row("SELECT COUNT(*) FROM bookshelves;", [], |row| row.get(0))?;
        to_count(count)
    }

    fn list_bookshelves(&self, offset: u32, limit: u32) -> RepoResult<Vec<String>> {
        let mut stmt = self.conn.prepare(
            "SELECT name
             FROM bookshelves
             ORDER BY name ASC
             LIMIT ?1 OFFSET ?2;",
        )?;
        let mut rows = stmt.query(params![i64::from(limit), i64::from(offset)])?;
        let mut names = Vec::new();
        while let Some(row) = rows.next()? {
            names.push(row.get("name")?);
        }
        Ok(names)
    }

    fn count_shelf_books(&self, shelf: &str) -> RepoResult<u64> {
        let count: i64 = self.conn.query_row(
            &format!(
                "SELECT COUNT(*) FROM books WHERE {VALID_BOOK_SQL} AND {SHELF_MEMBER_SQL};"
            ),
            [shelf],
            |row| row.get(0),
        )?;
        to_count(count)
    }

    fn top_shelf_books(&self, shelf: &str, limit: u32) -> RepoResult<Vec<Book>> {
        let sql = format!(
            "{BOOK_SELECT_SQL}
             WHERE {VALID_BOOK_SQL} AND {SHELF_MEMBER_SQL}
             {POPULAR_ORDER_SQL}
             LIMIT ?"
        );
        load_books(
            self.conn,
            &sql,
            vec![Value::Text(shelf.to_string()), Value::Integer(i64::from(limit))],
        )
    }
}
