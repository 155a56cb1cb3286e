#![allow(dead_code)]

use gutendex_core::Book;
use rusqlite::{params, Connection, OptionalExtension};

/// Raw-SQL catalog row builder; the public API is read-only.
pub struct SeedBook {
    gutenberg_id: i64,
    title: Option<String>,
    download_count: Option<i64>,
    copyright: Option<bool>,
    authors: Vec<(String, Option<i64>, Option<i64>)>,
    languages: Vec<String>,
    formats: Vec<String>,
    bookshelves: Vec<String>,
    subjects: Vec<String>,
}

impl SeedBook {
    pub fn new(gutenberg_id: i64, title: &str, download_count: i64) -> Self {
        Self {
            gutenberg_id,
            title: Some(title.to_string()),
            download_count: Some(download_count),
            copyright: Some(false),
            authors: Vec::new(),
            languages: Vec::new(),
            formats: Vec::new(),
            bookshelves: Vec::new(),
            subjects: Vec::new(),
        }
    }

    pub fn untitled(mut self) -> Self {
        self.title = None;
        self
    }

    pub fn uncounted(mut self) -> Self {
        self.download_count = None;
        self
    }

    pub fn copyright(mut self, value: Option<bool>) -> Self {
        self.copyright = value;
        self
    }

    pub fn author(mut self, name: &str, birth_year: Option<i64>, death_year: Option<i64>) -> Self {
        self.authors.push((name.to_string(), birth_year, death_year));
        self
    }

    pub fn language(mut self, code: &str) -> Self {
        self.languages.push(code.to_string());
        self
    }

    pub fn format(mut self, mime_type: &str) -> Self {
        self.formats.push(mime_type.to_string());
        self
    }

    pub fn bookshelf(mut self, name: &str) -> Self {
        self.bookshelves.push(name.to_string());
        self
    }

    pub fn subject(mut self, name: &str) -> Self {
        self.subjects.push(name.to_string());
        self
    }

    pub fn insert(self, conn: &Connection) {
        conn.execute(
            "INSERT INTO books (gutenberg_id, title, download_count, copyright)
             VALUES (?1, ?2, ?3, ?4);",
            params![
                self.gutenberg_id,
                self.title,
                self.download_count,
                self.copyright
            ],
        )
        .unwrap();
        let book_id = conn.last_insert_rowid();

        for (name, birth_year, death_year) in &self.authors {
            let person_id = person_id(conn, name, *birth_year, *death_year);
            conn.execute(
                "INSERT INTO book_authors (book_id, person_id) VALUES (?1, ?2);",
                params![book_id, person_id],
            )
            .unwrap();
        }
        for code in &self.languages {
            link_named(conn, book_id, code, "languages", "code", "book_languages", "language_id");
        }
        for mime_type in &self.formats {
            conn.execute(
                "INSERT INTO formats (book_id, mime_type, url) VALUES (?1, ?2, ?3);",
                params![
                    book_id,
                    mime_type,
                    format!(
                        "https://www.gutenberg.org/cache/epub/{}/{}",
                        self.gutenberg_id,
                        mime_type.replace('/', "-")
                    )
                ],
            )
            .unwrap();
        }
        for name in &self.bookshelves {
            link_named(conn, book_id, name, "bookshelves", "name", "book_bookshelves", "bookshelf_id");
        }
        for name in &self.subjects {
            link_named(conn, book_id, name, "subjects", "name", "book_subjects", "subject_id");
        }
    }
}

/// Inserts a bookshelf with no books.
pub fn insert_bookshelf(conn: &Connection, name: &str) {
    conn.execute(
        "INSERT OR IGNORE INTO bookshelves (name) VALUES (?1);",
        [name],
    )
    .unwrap();
}

pub fn ids(books: &[Book]) -> Vec<i64> {
    books.iter().map(|book| book.gutenberg_id).collect()
}

fn person_id(conn: &Connection, name: &str, birth_year: Option<i64>, death_year: Option<i64>) -> i64 {
    let existing: Option<i64> = conn
        .query_row("SELECT id FROM people WHERE name = ?1;", [name], |row| row.get(0))
        .optional()
        .unwrap();
    if let Some(id) = existing {
        return id;
    }

    conn.execute(
        "INSERT INTO people (name, birth_year, death_year) VALUES (?1, ?2, ?3);",
        params![name, birth_year, death_year],
    )
    .unwrap();
    conn.last_insert_rowid()
}

fn link_named(
    conn: &Connection,
    book_id: i64,
    value: &str,
    table: &str,
    column: &str,
    link_table: &str,
    link_column: &str,
) {
    conn.execute(
        &format!("INSERT OR IGNORE INTO {table} ({column}) VALUES (?1);"),
        [value],
    )
    .unwrap();
    conn.execute(
        &format!(
            "INSERT INTO {link_table} (book_id, {link_column})
             SELECT ?1, id FROM {table} WHERE {column} = ?2;"
        ),
        params![book_id, value],
    )
    .unwrap();
}
