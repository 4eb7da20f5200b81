use std::collections::BTreeMap;

use chrono::Datelike;
use ratatui::style::{Color, Style};
use ratatui::text::{Line, Span};

use crate::models::{Book, BookDraft, BookStatus, Genre};

/// Internal representation of the add/edit book form. Text fields hold raw
/// typed input; the year stays a string until validation turns it into a
/// number.
#[derive(Default, Clone)]
pub(crate) struct BookForm {
    pub(crate) title: String,
    pub(crate) author: String,
    pub(crate) genre: Option<Genre>,
    pub(crate) year: String,
    pub(crate) status: BookStatus,
    pub(crate) active: BookField,
    /// Validation messages keyed by field. Populated all at once on submit,
    /// cleared per field as the user edits.
    pub(crate) errors: BTreeMap<BookField, String>,
}

/// Fields available within the book form, in focus order.
#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub(crate) enum BookField {
    Title,
    Author,
    Genre,
    Year,
    Status,
}

impl Default for BookField {
    fn default() -> Self {
        BookField::Title
    }
}

impl BookForm {
    /// Populate the form from an existing book when entering edit mode.
    pub(crate) fn from_book(book: &Book) -> Self {
        Self {
            title: book.title.clone(),
            author: book.author.clone(),
            genre: Some(book.genre),
            year: book.published_year.to_string(),
            status: book.status,
            active: BookField::Title,
            errors: BTreeMap::new(),
        }
    }

    /// Cycle focus across the five fields.
    pub(crate) fn toggle_field(&mut self) {
        self.active = match self.active {
            BookField::Title => BookField::Author,
            BookField::Author => BookField::Genre,
            BookField::Genre => BookField::Year,
            BookField::Year => BookField::Status,
            BookField::Status => BookField::Title,
        };
    }

    /// Append a character to the active field, validating allowed input. The
    /// genre and status fields take no text; they cycle via [`cycle_value`].
    ///
    /// [`cycle_value`]: BookForm::cycle_value
    pub(crate) fn push_char(&mut self, ch: char) -> bool {
        let accepted = match self.active {
            BookField::Title => {
                if ch.is_control() {
                    false
                } else {
                    self.title.push(ch);
                    true
                }
            }
            BookField::Author => {
                if ch.is_control() {
                    false
                } else {
                    self.author.push(ch);
                    true
                }
            }
            BookField::Year => {
                if ch.is_ascii_digit() {
                    self.year.push(ch);
                    true
                } else {
                    false
                }
            }
            BookField::Genre | BookField::Status => false,
        };
        if accepted {
            self.clear_active_error();
        }
        accepted
    }

    /// Remove the last character from the active field.
    pub(crate) fn backspace(&mut self) {
        match self.active {
            BookField::Title => {
                self.title.pop();
            }
            BookField::Author => {
                self.author.pop();
            }
            BookField::Year => {
                self.year.pop();
            }
            BookField::Genre | BookField::Status => return,
        }
        self.clear_active_error();
    }

    /// Step the active field's choice when it is one of the two enumerated
    /// fields. Genre walks "no selection" plus the whole catalogue; status
    /// flips between its two values.
    pub(crate) fn cycle_value(&mut self, forward: bool) -> bool {
        let changed = match self.active {
            BookField::Genre => {
                self.genre = if forward {
                    match self.genre {
                        None => Genre::ALL.first().copied(),
                        Some(current) => Genre::ALL
                            .iter()
                            .position(|g| *g == current)
                            .and_then(|idx| Genre::ALL.get(idx + 1))
                            .copied(),
                    }
                } else {
                    match self.genre {
                        None => Genre::ALL.last().copied(),
                        Some(current) => Genre::ALL
                            .iter()
                            .position(|g| *g == current)
                            .and_then(|idx| idx.checked_sub(1))
                            .and_then(|idx| Genre::ALL.get(idx))
                            .copied(),
                    }
                };
                true
            }
            BookField::Status => {
                self.status = match self.status {
                    BookStatus::Available => BookStatus::Issued,
                    BookStatus::Issued => BookStatus::Available,
                };
                true
            }
            _ => false,
        };
        if changed {
            self.clear_active_error();
        }
        changed
    }

    /// Check every field and either return a draft ready for the sync layer
    /// or record the full set of messages in [`errors`]. All failing fields
    /// report together; nothing short-circuits.
    ///
    /// [`errors`]: BookForm::errors
    pub(crate) fn validate(&mut self) -> Option<BookDraft> {
        self.validate_at(chrono::Utc::now().year())
    }

    fn validate_at(&mut self, current_year: i32) -> Option<BookDraft> {
        self.errors.clear();

        if self.title.trim().is_empty() {
            self.errors
                .insert(BookField::Title, "Title is required".to_string());
        }
        if self.author.trim().is_empty() {
            self.errors
                .insert(BookField::Author, "Author is required".to_string());
        }
        if self.genre.is_none() {
            self.errors
                .insert(BookField::Genre, "Genre is required".to_string());
        }

        let year_raw = self.year.trim();
        let mut parsed_year = None;
        if year_raw.is_empty() {
            self.errors
                .insert(BookField::Year, "Published year is required".to_string());
        } else {
            match year_raw.parse::<u16>() {
                Ok(year) if year >= 1000 && i32::from(year) <= current_year => {
                    parsed_year = Some(year);
                }
                _ => {
                    self.errors
                        .insert(BookField::Year, "Enter a valid year".to_string());
                }
            }
        }

        if !self.errors.is_empty() {
            return None;
        }
        Some(BookDraft {
            title: self.title.trim().to_string(),
            author: self.author.trim().to_string(),
            genre: self.genre?,
            published_year: parsed_year?,
            status: self.status,
        })
    }

    fn clear_active_error(&mut self) {
        self.errors.remove(&self.active);
    }

    /// Render a styled line for the modal form, appending the field's
    /// validation message when one is pending.
    pub(crate) fn build_line(&self, field_name: &str, field: BookField) -> Line<'static> {
        let is_active = self.active == field;
        let (value, placeholder) = match field {
            BookField::Title => (self.title.clone(), "Enter book title"),
            BookField::Author => (self.author.clone(), "Enter author name"),
            BookField::Genre => (
                self.genre.map(|g| g.label().to_string()).unwrap_or_default(),
                "Select a genre",
            ),
            BookField::Year => (self.year.clone(), "Enter publication year"),
            BookField::Status => (self.status.label().to_string(), ""),
        };

        let display = if value.is_empty() {
            placeholder.to_string()
        } else {
            value.clone()
        };

        let style = if is_active {
            Style::default().fg(Color::Yellow)
        } else if value.is_empty() {
            Style::default().fg(Color::DarkGray)
        } else {
            Style::default()
        };

        let mut spans = vec![
            Span::raw(format!("{field_name}: ")),
            Span::styled(display, style),
        ];
        if let Some(message) = self.errors.get(&field) {
            spans.push(Span::styled(
                format!("  {message}"),
                Style::default().fg(Color::Red),
            ));
        }
        Line::from(spans)
    }

    /// Whether the field accepts typed characters, which decides if the
    /// terminal cursor should be shown on it.
    pub(crate) fn is_text_field(field: BookField) -> bool {
        matches!(
            field,
            BookField::Title | BookField::Author | BookField::Year
        )
    }

    /// Return the character count for the requested field.
    pub(crate) fn value_len(&self, field: BookField) -> usize {
        match field {
            BookField::Title => self.title.chars().count(),
            BookField::Author => self.author.chars().count(),
            BookField::Year => self.year.chars().count(),
            BookField::Genre | BookField::Status => 0,
        }
    }
}

/// State for confirming permanent book deletion.
#[derive(Clone)]
pub(crate) struct ConfirmBookDelete {
    pub(crate) id: u64,
    pub(crate) title: String,
}

impl ConfirmBookDelete {
    /// Build the confirmation state from the book being considered.
    pub(crate) fn from(book: &Book) -> Self {
        Self {
            id: book.id,
            title: book.title.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn filled_form() -> BookForm {
        BookForm {
            title: "X".to_string(),
            author: "Y".to_string(),
            genre: Some(Genre::Fiction),
            year: "1999".to_string(),
            status: BookStatus::Available,
            active: BookField::Title,
            errors: BTreeMap::new(),
        }
    }

    #[test]
    fn valid_form_produces_a_draft_with_numeric_year() {
        let mut form = filled_form();
        let draft = form.validate().expect("form should validate");
        assert!(form.errors.is_empty());
        assert_eq!(draft.title, "X");
        assert_eq!(draft.author, "Y");
        assert_eq!(draft.genre, Genre::Fiction);
        assert_eq!(draft.published_year, 1999);
        assert_eq!(draft.status, BookStatus::Available);
    }

    #[test]
    fn empty_form_reports_every_failure_at_once() {
        let mut form = BookForm::default();
        assert!(form.validate_at(2024).is_none());
        assert_eq!(form.errors.len(), 4);
        assert_eq!(form.errors[&BookField::Title], "Title is required");
        assert_eq!(form.errors[&BookField::Author], "Author is required");
        assert_eq!(form.errors[&BookField::Genre], "Genre is required");
        assert_eq!(
            form.errors[&BookField::Year],
            "Published year is required"
        );
    }

    #[test]
    fn out_of_range_years_are_rejected() {
        for bad in ["999", "2025", "70000"] {
            let mut form = filled_form();
            form.year = bad.to_string();
            assert!(form.validate_at(2024).is_none(), "{bad} should fail");
            assert_eq!(form.errors[&BookField::Year], "Enter a valid year");
            assert_eq!(form.errors.len(), 1);
        }
    }

    #[test]
    fn boundary_years_are_accepted() {
        for good in ["1000", "2024"] {
            let mut form = filled_form();
            form.year = good.to_string();
            assert!(form.validate_at(2024).is_some(), "{good} should pass");
        }
    }

    #[test]
    fn whitespace_only_text_counts_as_missing() {
        let mut form = filled_form();
        form.title = "   ".to_string();
        form.author = "\t".to_string();
        assert!(form.validate_at(2024).is_none());
        assert_eq!(form.errors[&BookField::Title], "Title is required");
        assert_eq!(form.errors[&BookField::Author], "Author is required");
    }

    #[test]
    fn year_field_accepts_digits_only() {
        let mut form = BookForm {
            active: BookField::Year,
            ..BookForm::default()
        };
        assert!(form.push_char('1'));
        assert!(form.push_char('9'));
        assert!(!form.push_char('x'));
        assert!(!form.push_char(' '));
        assert_eq!(form.year, "19");
    }

    #[test]
    fn editing_a_field_clears_only_its_error() {
        let mut form = BookForm::default();
        assert!(form.validate_at(2024).is_none());
        assert_eq!(form.errors.len(), 4);

        form.active = BookField::Title;
        form.push_char('D');
        assert!(!form.errors.contains_key(&BookField::Title));
        assert_eq!(form.errors.len(), 3);

        form.active = BookField::Genre;
        form.cycle_value(true);
        assert!(!form.errors.contains_key(&BookField::Genre));
        assert_eq!(form.errors.len(), 2);
    }

    #[test]
    fn genre_cycle_walks_the_catalogue_both_ways() {
        let mut form = BookForm {
            active: BookField::Genre,
            ..BookForm::default()
        };
        form.cycle_value(true);
        assert_eq!(form.genre, Some(Genre::Fiction));
        form.cycle_value(false);
        assert_eq!(form.genre, None);
        form.cycle_value(false);
        assert_eq!(form.genre, Some(Genre::SelfHelp));
    }

    #[test]
    fn status_cycle_flips_between_the_two_states() {
        let mut form = BookForm {
            active: BookField::Status,
            ..BookForm::default()
        };
        assert_eq!(form.status, BookStatus::Available);
        form.cycle_value(true);
        assert_eq!(form.status, BookStatus::Issued);
        form.cycle_value(false);
        assert_eq!(form.status, BookStatus::Available);
    }

    #[test]
    fn from_book_prefills_every_field() {
        let book = Book {
            id: 5,
            title: "Dune".to_string(),
            author: "Frank Herbert".to_string(),
            genre: Genre::SciFi,
            published_year: 1965,
            status: BookStatus::Issued,
        };
        let form = BookForm::from_book(&book);
        assert_eq!(form.title, "Dune");
        assert_eq!(form.author, "Frank Herbert");
        assert_eq!(form.genre, Some(Genre::SciFi));
        assert_eq!(form.year, "1965");
        assert_eq!(form.status, BookStatus::Issued);
        assert!(form.errors.is_empty());
    }

    #[test]
    fn submitting_an_edit_keeps_the_draft_independent_of_id() {
        let mut form = filled_form();
        let draft = form.validate_at(2024).expect("valid");
        let rebuilt = Book::from_draft(5, &draft);
        assert_eq!(rebuilt.id, 5);
        assert_eq!(rebuilt.title, draft.title);
    }
}
