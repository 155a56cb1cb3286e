mod common;

use common::{ids, insert_bookshelf, SeedBook};
use gutendex_core::db::open_db_in_memory;
use gutendex_core::{CategoryPage, CategoryService, RequestUrl, SqliteBookshelfRepository};
use rusqlite::Connection;

const NEXT_BOOKS_QUERY: &str = "sort=popular&mime_type=application%2Fepub%2Bzip&page_size=5&page=2";

fn twelve_shelves() -> Connection {
    let conn = open_db_in_memory().unwrap();
    // Inserted out of order; windows are ordered by name.
    for index in (1..=12).rev() {
        insert_bookshelf(&conn, &format!("Shelf {index:02}"));
    }
    conn
}

fn categories(conn: &Connection, url: &str) -> CategoryPage {
    let service = CategoryService::new(SqliteBookshelfRepository::try_new(conn).unwrap());
    service
        .list_categories(&RequestUrl::parse(url).unwrap())
        .unwrap()
}

fn names(page: &CategoryPage) -> Vec<&str> {
    page.results.iter().map(|digest| digest.name.as_str()).collect()
}

#[test]
fn first_window_holds_five_shelves_and_links_onward() {
    let conn = twelve_shelves();

    let page = categories(&conn, "http://localhost:8000/categories");

    assert_eq!(
        names(&page),
        vec!["Shelf 01", "Shelf 02", "Shelf 03", "Shelf 04", "Shelf 05"]
    );
    assert_eq!(
        page.next.as_deref(),
        Some("http://localhost:8000/categories?offset=5")
    );
}

#[test]
fn last_window_is_partial_without_next() {
    let conn = twelve_shelves();

    let middle = categories(&conn, "http://localhost:8000/categories?offset=5");
    assert_eq!(names(&middle)[0], "Shelf 06");
    assert_eq!(
        middle.next.as_deref(),
        Some("http://localhost:8000/categories?offset=10")
    );

    let last = categories(&conn, "http://localhost:8000/categories?offset=10");
    assert_eq!(names(&last), vec!["Shelf 11", "Shelf 12"]);
    assert_eq!(last.next, None);
}

#[test]
fn window_ending_exactly_at_total_has_no_next() {
    let conn = open_db_in_memory().unwrap();
    for index in 1..=10 {
        insert_bookshelf(&conn, &format!("Shelf {index:02}"));
    }

    let page = categories(&conn, "http://localhost/categories?offset=5");
    assert_eq!(page.results.len(), 5);
    assert_eq!(page.next, None);
}

#[test]
fn malformed_offsets_behave_like_zero() {
    let conn = twelve_shelves();
    let first = categories(&conn, "http://localhost/categories");

    for offset in ["-3", "abc", "", "2.5"] {
        let page = categories(&conn, &format!("http://localhost/categories?offset={offset}"));
        assert_eq!(names(&page), names(&first), "offset `{offset}`");
        assert_eq!(
            page.next.as_deref(),
            Some("http://localhost/categories?offset=5"),
            "offset `{offset}`"
        );
    }
}

#[test]
fn offset_past_the_end_yields_empty_window() {
    let conn = twelve_shelves();

    let page = categories(&conn, "http://localhost/categories?offset=40");
    assert!(page.results.is_empty());
    assert_eq!(page.next, None);
}

#[test]
fn next_link_preserves_other_parameters() {
    let conn = twelve_shelves();

    let page = categories(
        &conn,
        "https://catalog.example.org/categories?lang=en&offset=0&flag=x+y",
    );
    assert_eq!(
        page.next.as_deref(),
        Some("https://catalog.example.org/categories?lang=en&offset=5&flag=x+y")
    );
}

#[test]
fn digest_previews_top_five_valid_books() {
    let conn = open_db_in_memory().unwrap();
    for (id, downloads) in [(1, 10), (2, 70), (3, 30), (4, 90), (5, 50), (6, 60), (7, 20)] {
        SeedBook::new(id, &format!("Adventure {id}"), downloads)
            .bookshelf("Adventure")
            .insert(&conn);
    }
    SeedBook::new(8, "Lost Title", 1000)
        .untitled()
        .bookshelf("Adventure")
        .insert(&conn);
    SeedBook::new(9, "Lost Count", 0)
        .uncounted()
        .bookshelf("Adventure")
        .insert(&conn);
    SeedBook::new(10, "Elsewhere", 5000)
        .bookshelf("Other")
        .insert(&conn);

    let page = categories(&conn, "http://localhost/categories");
    let adventure = &page.results[0];

    assert_eq!(adventure.name, "Adventure");
    assert_eq!(adventure.count, 7);
    assert_eq!(ids(&adventure.books), vec![4, 2, 6, 5, 3]);
    assert_eq!(
        adventure.next,
        format!("http://localhost/books?topic=Adventure&{NEXT_BOOKS_QUERY}")
    );
    assert_eq!(page.results[1].name, "Other");
    assert_eq!(page.results[1].count, 1);
}

#[test]
fn empty_shelf_still_links_to_page_two() {
    let conn = open_db_in_memory().unwrap();
    insert_bookshelf(&conn, "Science Fiction & Fantasy");

    let page = categories(&conn, "https://catalog.example.org/categories?offset=0");
    let shelf = &page.results[0];

    assert_eq!(shelf.count, 0);
    assert!(shelf.books.is_empty());
    assert_eq!(
        shelf.next,
        format!(
            "https://catalog.example.org/books?topic=Science+Fiction+%26+Fantasy&{NEXT_BOOKS_QUERY}"
        )
    );
}

#[test]
fn page_serializes_with_listing_keys() {
    let conn = open_db_in_memory().unwrap();
    SeedBook::new(1, "Treasure Island", 400)
        .bookshelf("Adventure")
        .insert(&conn);

    let page = categories(&conn, "http://localhost/categories");
    let json = serde_json::to_value(&page).unwrap();

    assert!(json["next"].is_null());
    let digest = &json["results"][0];
    assert_eq!(digest["name"], "Adventure");
    assert_eq!(digest["count"], 1);
    assert_eq!(digest["books"][0]["id"], 1);
    assert_eq!(digest["books"][0]["title"], "Treasure Island");
    assert!(digest["next"].as_str().unwrap().ends_with("page=2"));
}
