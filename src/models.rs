//! Domain models that mirror the JSON documents served by the books endpoint
//! and get passed throughout the TUI. The intent is that these types stay
//! light-weight data holders so other layers can focus on presentation and
//! synchronization logic. Keeping the commentary here means later refactors can
//! reconstruct the assumptions even if other context is lost.

use std::fmt;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
/// A single book record as the server stores it. Field names on the wire are
/// camelCase (`publishedYear`), which the serde rename keeps out of the Rust
/// identifiers.
pub struct Book {
    /// Identifier assigned by the server when the record is created. We keep
    /// this around even when the UI only needs display information because
    /// edit/delete flows bubble the id back to the sync layer.
    pub id: u64,
    /// Title displayed in lists and search results.
    pub title: String,
    /// Author field used both for display and filtering.
    pub author: String,
    /// One of the fixed set of shelving genres.
    pub genre: Genre,
    /// Four-digit publication year. Stored as a number on the wire; the form
    /// layer is responsible for turning typed text into this integer.
    pub published_year: u16,
    /// Whether the copy is on the shelf or checked out.
    pub status: BookStatus,
}

impl Book {
    /// Pair a draft with an id into a full record. Update requests send the
    /// whole resource, so the sync layer needs this to rebuild the body from
    /// what the form collected.
    pub fn from_draft(id: u64, draft: &BookDraft) -> Self {
        Self {
            id,
            title: draft.title.clone(),
            author: draft.author.clone(),
            genre: draft.genre,
            published_year: draft.published_year,
            status: draft.status,
        }
    }
}

impl fmt::Display for Book {
    /// Write the title to any formatter. Display is implemented so the type
    /// plays nicely with Ratatui widgets that consume strings implicitly.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.title)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
/// The mutable portion of a book, used as the body of create and update
/// requests. The server owns `id`, so the draft never carries one.
pub struct BookDraft {
    pub title: String,
    pub author: String,
    pub genre: Genre,
    pub published_year: u16,
    pub status: BookStatus,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
/// Fixed genre catalogue. The wire strings keep their hyphens, so the variants
/// that differ from their Rust identifier carry explicit renames.
pub enum Genre {
    Fiction,
    #[serde(rename = "Non-Fiction")]
    NonFiction,
    Mystery,
    Romance,
    #[serde(rename = "Sci-Fi")]
    SciFi,
    Biography,
    History,
    #[serde(rename = "Self-Help")]
    SelfHelp,
}

impl Genre {
    /// Every genre in catalogue order. Filter cycling and the form's genre
    /// selector both walk this slice rather than hand-rolling match arms.
    pub const ALL: [Genre; 8] = [
        Genre::Fiction,
        Genre::NonFiction,
        Genre::Mystery,
        Genre::Romance,
        Genre::SciFi,
        Genre::Biography,
        Genre::History,
        Genre::SelfHelp,
    ];

    /// The user-facing label, identical to the wire string.
    pub fn label(&self) -> &'static str {
        match self {
            Genre::Fiction => "Fiction",
            Genre::NonFiction => "Non-Fiction",
            Genre::Mystery => "Mystery",
            Genre::Romance => "Romance",
            Genre::SciFi => "Sci-Fi",
            Genre::Biography => "Biography",
            Genre::History => "History",
            Genre::SelfHelp => "Self-Help",
        }
    }
}

impl fmt::Display for Genre {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.label())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
/// Circulation state of a copy.
pub enum BookStatus {
    Available,
    Issued,
}

impl Default for BookStatus {
    /// New drafts start out on the shelf.
    fn default() -> Self {
        BookStatus::Available
    }
}

impl BookStatus {
    pub const ALL: [BookStatus; 2] = [BookStatus::Available, BookStatus::Issued];

    pub fn label(&self) -> &'static str {
        match self {
            BookStatus::Available => "Available",
            BookStatus::Issued => "Issued",
        }
    }
}

impl fmt::Display for BookStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.label())
    }
}
