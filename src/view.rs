//! Pure derivation of what the list screen shows. Filtering and pagination
//! never touch the network or the terminal: they take the full in-memory
//! collection plus the current filter state and return the visible slice with
//! its counts, so the logic stays testable on its own.

use crate::models::{Book, BookStatus, Genre};

/// Books rendered per page. Mirrors the fixed page length of the web
/// dashboard this tool replaces.
pub const PAGE_SIZE: usize = 10;

/// The user's current search text, quick filters, and page. Lives for the
/// session only and is owned by the list screen.
#[derive(Debug, Clone)]
pub struct FilterState {
    /// Raw search text matched against title and author.
    pub search: String,
    /// `None` means every genre passes.
    pub genre: Option<Genre>,
    /// `None` means every status passes.
    pub status: Option<BookStatus>,
    /// 1-based page number into the filtered sequence.
    pub page: usize,
}

impl FilterState {
    pub fn new() -> Self {
        Self {
            search: String::new(),
            genre: None,
            status: None,
            page: 1,
        }
    }

    /// Append a character to the search text. Any edit to the search moves
    /// the view back to the first page so the result counts stay truthful.
    pub fn push_search_char(&mut self, c: char) {
        self.search.push(c);
        self.page = 1;
    }

    pub fn pop_search_char(&mut self) {
        self.search.pop();
        self.page = 1;
    }

    pub fn clear_search(&mut self) {
        self.search.clear();
        self.page = 1;
    }

    /// Advance the genre filter one step: all genres, then each catalogue
    /// entry in order, then back to all.
    pub fn cycle_genre(&mut self) {
        self.genre = match self.genre {
            None => Genre::ALL.first().copied(),
            Some(current) => Genre::ALL
                .iter()
                .position(|g| *g == current)
                .and_then(|idx| Genre::ALL.get(idx + 1))
                .copied(),
        };
        self.page = 1;
    }

    /// Advance the status filter: all, Available, Issued, back to all.
    pub fn cycle_status(&mut self) {
        self.status = match self.status {
            None => BookStatus::ALL.first().copied(),
            Some(current) => BookStatus::ALL
                .iter()
                .position(|s| *s == current)
                .and_then(|idx| BookStatus::ALL.get(idx + 1))
                .copied(),
        };
        self.page = 1;
    }

    /// Move one page back or forward, staying inside `1..=total_pages`.
    pub fn turn_page(&mut self, delta: isize, total_pages: usize) {
        if total_pages == 0 {
            self.page = 1;
            return;
        }
        let current = self.page as isize;
        let new = (current + delta).clamp(1, total_pages as isize);
        self.page = new as usize;
    }

    /// Pull the page back into range after the collection shrank underneath
    /// it, e.g. when a deletion removed the last row of the last page.
    pub fn clamp_page(&mut self, total_pages: usize) {
        if total_pages == 0 {
            self.page = 1;
        } else if self.page > total_pages {
            self.page = total_pages;
        }
    }

    /// Label for the genre quick-filter, matching the dropdown wording users
    /// of the web dashboard know.
    pub fn genre_label(&self) -> &'static str {
        match self.genre {
            Some(genre) => genre.label(),
            None => "All Genres",
        }
    }

    pub fn status_label(&self) -> &'static str {
        match self.status {
            Some(status) => status.label(),
            None => "All Status",
        }
    }
}

impl Default for FilterState {
    fn default() -> Self {
        Self::new()
    }
}

/// One derived page of the view: the visible books plus the counts the list
/// screen prints around them.
#[derive(Debug, Clone)]
pub struct ViewPage {
    /// The books on the requested page, in collection order.
    pub books: Vec<Book>,
    /// How many books matched the filters across all pages.
    pub total_matched: usize,
    /// `ceil(total_matched / page_size)`; zero when nothing matched.
    pub total_pages: usize,
    /// 0-based index of the first visible book within the matched sequence.
    start: usize,
}

impl ViewPage {
    /// The "12 books found" line next to the filters.
    pub fn count_text(&self) -> String {
        format!("{} books found", self.total_matched)
    }

    /// The "Showing 11 to 12 of 12 results" line under the list, or `None`
    /// when the page is empty.
    pub fn range_text(&self) -> Option<String> {
        if self.books.is_empty() {
            return None;
        }
        Some(format!(
            "Showing {} to {} of {} results",
            self.start + 1,
            self.start + self.books.len(),
            self.total_matched
        ))
    }
}

fn matches(book: &Book, filter: &FilterState) -> bool {
    let needle = filter.search.to_lowercase();
    let matches_search = needle.is_empty()
        || book.title.to_lowercase().contains(&needle)
        || book.author.to_lowercase().contains(&needle);
    let matches_genre = filter.genre.map_or(true, |g| g == book.genre);
    let matches_status = filter.status.map_or(true, |s| s == book.status);
    matches_search && matches_genre && matches_status
}

/// Apply the filters to the full collection and slice out the requested
/// page. Callers keep `filter.page` in range themselves; a page past the end
/// simply comes back empty.
pub fn derive_view(books: &[Book], filter: &FilterState, page_size: usize) -> ViewPage {
    let matched: Vec<&Book> = books.iter().filter(|b| matches(b, filter)).collect();
    let total_matched = matched.len();
    let total_pages = total_matched.div_ceil(page_size);
    let start = filter.page.saturating_sub(1) * page_size;
    let visible: Vec<Book> = matched
        .into_iter()
        .skip(start)
        .take(page_size)
        .cloned()
        .collect();
    ViewPage {
        books: visible,
        total_matched,
        total_pages,
        start,
    }
}
