//! Book catalog domain model.
//!
//! # Responsibility
//! - Define the read model for catalog entries and their associations.
//! - Define the external serialization shape shared by every listing.
//!
//! # Invariants
//! - `gutenberg_id` is the externally visible identifier; the internal row
//!   key never leaves the repository layer.
//! - Only books that satisfy [`Book::is_valid`] are exposed by listings.

use serde::ser::SerializeMap;
use serde::{Serialize, Serializer};

/// External catalog identifier of a book.
pub type GutenbergId = i64;

/// Tri-state copyright status.
///
/// `Unknown` means the source data carries no copyright information at all;
/// it is a value of its own, not an absent filter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Copyright {
    Yes,
    No,
    Unknown,
}

impl Copyright {
    pub const ALL: [Copyright; 3] = [Copyright::Yes, Copyright::No, Copyright::Unknown];

    /// Parses one token of the `copyright` query parameter.
    ///
    /// Only the exact lowercase literals `true`, `false` and `null` are
    /// recognized.
    pub fn from_token(token: &str) -> Option<Self> {
        match token {
            "true" => Some(Self::Yes),
            "false" => Some(Self::No),
            "null" => Some(Self::Unknown),
            _ => None,
        }
    }

    pub fn as_option(self) -> Option<bool> {
        match self {
            Self::Yes => Some(true),
            Self::No => Some(false),
            Self::Unknown => None,
        }
    }
}

impl From<Option<bool>> for Copyright {
    fn from(value: Option<bool>) -> Self {
        match value {
            Some(true) => Self::Yes,
            Some(false) => Self::No,
            None => Self::Unknown,
        }
    }
}

impl Serialize for Copyright {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.as_option().serialize(serializer)
    }
}

/// Author (or other contributor) of one or more books.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Person {
    pub name: String,
    pub birth_year: Option<i64>,
    pub death_year: Option<i64>,
}

impl Person {
    /// Whether either life year is at or before `year`.
    pub fn lived_until(&self, year: i64) -> bool {
        self.birth_year.is_some_and(|birth| birth <= year)
            || self.death_year.is_some_and(|death| death <= year)
    }

    /// Whether either life year is at or after `year`.
    pub fn lived_from(&self, year: i64) -> bool {
        self.birth_year.is_some_and(|birth| birth >= year)
            || self.death_year.is_some_and(|death| death >= year)
    }
}

/// One downloadable rendition of a book.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Format {
    pub mime_type: String,
    pub url: String,
}

/// Catalog entry read model.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Book {
    /// Serialized as `id` to match the public listing schema.
    #[serde(rename = "id")]
    pub gutenberg_id: GutenbergId,
    pub title: Option<String>,
    pub authors: Vec<Person>,
    pub subjects: Vec<String>,
    pub bookshelves: Vec<String>,
    pub languages: Vec<String>,
    pub copyright: Copyright,
    /// Serialized as a `mime_type -> url` object.
    #[serde(serialize_with = "serialize_formats")]
    pub formats: Vec<Format>,
    pub download_count: Option<i64>,
}

impl Book {
    /// Creates an entry with no associations and unknown copyright.
    pub fn new(gutenberg_id: GutenbergId, title: Option<&str>, download_count: Option<i64>) -> Self {
        Self {
            gutenberg_id,
            title: title.map(str::to_string),
            authors: Vec::new(),
            subjects: Vec::new(),
            bookshelves: Vec::new(),
            languages: Vec::new(),
            copyright: Copyright::Unknown,
            formats: Vec::new(),
            download_count,
        }
    }

    /// Whether this entry belongs to the listable universe.
    ///
    /// Entries missing a title or a download count are permanently hidden.
    pub fn is_valid(&self) -> bool {
        self.title.is_some() && self.download_count.is_some()
    }
}

fn serialize_formats<S: Serializer>(formats: &[Format], serializer: S) -> Result<S::Ok, S::Error> {
    let mut map = serializer.serialize_map(Some(formats.len()))?;
    for format in formats {
        map.serialize_entry(&format.mime_type, &format.url)?;
    }
    map.end()
}
