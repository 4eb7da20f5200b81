use std::mem;
use std::time::{Duration, Instant};

use crossterm::event::KeyCode;
use ratatui::layout::{Alignment, Constraint, Direction, Layout, Rect};
use ratatui::prelude::*;
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Clear, List, ListItem, ListState, Paragraph, Wrap};
use ratatui::Frame;

use crate::api::BooksApi;
use crate::models::Book;
use crate::view::{derive_view, FilterState, ViewPage, PAGE_SIZE};

use super::forms::{BookField, BookForm, ConfirmBookDelete};
use super::helpers::{centered_rect, status_style, surface_error};

/// Footer space reserved for status messages and instructions.
const FOOTER_HEIGHT: u16 = 3;
/// How long a transient footer notification stays visible before the tick
/// clears it.
const STATUS_TTL: Duration = Duration::from_millis(3000);

/// Fine-grained modes layered over the list screen. Each mode decides which
/// overlay renders and where keystrokes go.
enum Mode {
    Normal,
    AddingBook(BookForm),
    EditingBook { id: u64, form: BookForm },
    ConfirmDelete(ConfirmBookDelete),
    Searching,
}

/// Holds the footer message text plus its severity and age.
struct StatusMessage {
    text: String,
    kind: StatusKind,
    shown_at: Instant,
}

/// Severity levels shown in the footer.
enum StatusKind {
    Info,
    Error,
}

impl StatusKind {
    fn style(&self) -> Style {
        match self {
            StatusKind::Info => Style::default().fg(Color::Green),
            StatusKind::Error => Style::default().fg(Color::Red),
        }
    }
}

/// Central application state shared across the TUI. The full collection
/// lives here; the derived page is recomputed whenever books or filters
/// change.
pub struct App {
    api: BooksApi,
    books: Vec<Book>,
    filter: FilterState,
    view: ViewPage,
    selected: usize,
    mode: Mode,
    status: Option<StatusMessage>,
}

impl App {
    pub fn new(api: BooksApi, books: Vec<Book>) -> Self {
        let filter = FilterState::new();
        let view = derive_view(&books, &filter, PAGE_SIZE);
        Self {
            api,
            books,
            filter,
            view,
            selected: 0,
            mode: Mode::Normal,
            status: None,
        }
    }

    /// Advance time-based state. Called from the event loop on every poll
    /// timeout so notifications disappear without user input.
    pub fn tick(&mut self) {
        if let Some(status) = &self.status {
            if status.shown_at.elapsed() >= STATUS_TTL {
                self.status = None;
            }
        }
    }

    pub fn handle_key(&mut self, code: KeyCode) -> bool {
        let mut exit = false;
        let mut mode = mem::replace(&mut self.mode, Mode::Normal);

        mode = match mode {
            Mode::Normal => self.handle_normal_key(code, &mut exit),
            Mode::AddingBook(form) => self.handle_add_book(code, form),
            Mode::EditingBook { id, form } => self.handle_edit_book(code, id, form),
            Mode::ConfirmDelete(confirm) => self.handle_confirm_delete(code, confirm),
            Mode::Searching => self.handle_search(code),
        };

        self.mode = mode;
        exit
    }

    fn handle_normal_key(&mut self, code: KeyCode, exit: &mut bool) -> Mode {
        match code {
            KeyCode::Char('q') | KeyCode::Esc => {
                *exit = true;
            }
            KeyCode::Up => self.move_selection(-1),
            KeyCode::Down => self.move_selection(1),
            KeyCode::Home => self.select_first(),
            KeyCode::End => self.select_last(),
            KeyCode::Left | KeyCode::PageUp | KeyCode::Char('h') => self.turn_page(-1),
            KeyCode::Right | KeyCode::PageDown | KeyCode::Char('l') => self.turn_page(1),
            KeyCode::Char('f') | KeyCode::Char('F') | KeyCode::Char('/') => {
                self.clear_status();
                return Mode::Searching;
            }
            KeyCode::Char('g') | KeyCode::Char('G') => {
                self.filter.cycle_genre();
                self.refresh_view();
                self.set_status(
                    format!("Genre filter: {}.", self.filter.genre_label()),
                    StatusKind::Info,
                );
            }
            KeyCode::Char('s') | KeyCode::Char('S') => {
                self.filter.cycle_status();
                self.refresh_view();
                self.set_status(
                    format!("Status filter: {}.", self.filter.status_label()),
                    StatusKind::Info,
                );
            }
            KeyCode::Char('+') => {
                self.clear_status();
                return Mode::AddingBook(BookForm::default());
            }
            KeyCode::Char('-') => {
                if let Some(book) = self.current_book().cloned() {
                    self.clear_status();
                    return Mode::ConfirmDelete(ConfirmBookDelete::from(&book));
                } else {
                    self.set_status("No book selected to delete.", StatusKind::Error);
                }
            }
            KeyCode::Char('e') | KeyCode::Char('E') | KeyCode::Enter => {
                if let Some(book) = self.current_book().cloned() {
                    self.clear_status();
                    return Mode::EditingBook {
                        id: book.id,
                        form: BookForm::from_book(&book),
                    };
                } else {
                    self.set_status("No book selected to edit.", StatusKind::Error);
                }
            }
            _ => {}
        }
        Mode::Normal
    }

    fn handle_add_book(&mut self, code: KeyCode, mut form: BookForm) -> Mode {
        let mut keep_open = true;
        match code {
            KeyCode::Esc => {
                self.set_status("Add book cancelled.", StatusKind::Info);
                keep_open = false;
            }
            KeyCode::Tab | KeyCode::BackTab => form.toggle_field(),
            KeyCode::Backspace => form.backspace(),
            KeyCode::Left => {
                form.cycle_value(false);
            }
            KeyCode::Right => {
                form.cycle_value(true);
            }
            KeyCode::Enter => {
                if let Some(draft) = form.validate() {
                    match self.api.create(&draft) {
                        Ok(book) => {
                            self.books.push(book);
                            self.refresh_view();
                            self.set_status("Book added successfully!", StatusKind::Info);
                            keep_open = false;
                        }
                        Err(err) => {
                            let err = anyhow::Error::from(err);
                            let message =
                                format!("Failed to add book: {}", surface_error(&err));
                            self.set_status(message, StatusKind::Error);
                        }
                    }
                }
            }
            KeyCode::Char(' ') if !BookForm::is_text_field(form.active) => {
                form.cycle_value(true);
            }
            KeyCode::Char(ch) => {
                form.push_char(ch);
            }
            _ => {}
        }

        if keep_open {
            Mode::AddingBook(form)
        } else {
            Mode::Normal
        }
    }

    fn handle_edit_book(&mut self, code: KeyCode, id: u64, mut form: BookForm) -> Mode {
        let mut keep_open = true;
        match code {
            KeyCode::Esc => {
                self.set_status("Edit cancelled.", StatusKind::Info);
                keep_open = false;
            }
            KeyCode::Tab | KeyCode::BackTab => form.toggle_field(),
            KeyCode::Backspace => form.backspace(),
            KeyCode::Left => {
                form.cycle_value(false);
            }
            KeyCode::Right => {
                form.cycle_value(true);
            }
            KeyCode::Enter => {
                if let Some(draft) = form.validate() {
                    match self.api.update(id, &draft) {
                        Ok(updated) => {
                            if let Some(slot) = self.books.iter_mut().find(|b| b.id == id) {
                                *slot = updated;
                            }
                            self.refresh_view();
                            self.set_status("Book updated successfully!", StatusKind::Info);
                            keep_open = false;
                        }
                        Err(err) => {
                            let err = anyhow::Error::from(err);
                            let message =
                                format!("Failed to update book: {}", surface_error(&err));
                            self.set_status(message, StatusKind::Error);
                        }
                    }
                }
            }
            KeyCode::Char(' ') if !BookForm::is_text_field(form.active) => {
                form.cycle_value(true);
            }
            KeyCode::Char(ch) => {
                form.push_char(ch);
            }
            _ => {}
        }

        if keep_open {
            Mode::EditingBook { id, form }
        } else {
            Mode::Normal
        }
    }

    fn handle_confirm_delete(&mut self, code: KeyCode, confirm: ConfirmBookDelete) -> Mode {
        match code {
            KeyCode::Esc | KeyCode::Char('n') | KeyCode::Char('N') => {
                self.set_status("Deletion cancelled.", StatusKind::Info);
                Mode::Normal
            }
            KeyCode::Enter | KeyCode::Char('y') | KeyCode::Char('Y') => {
                match self.api.delete(confirm.id) {
                    Ok(()) => {
                        self.books.retain(|b| b.id != confirm.id);
                        self.refresh_view();
                        self.set_status("Book deleted successfully!", StatusKind::Info);
                        Mode::Normal
                    }
                    Err(err) => {
                        let err = anyhow::Error::from(err);
                        let message = format!("Failed to delete book: {}", surface_error(&err));
                        self.set_status(message, StatusKind::Error);
                        Mode::ConfirmDelete(confirm)
                    }
                }
            }
            _ => Mode::ConfirmDelete(confirm),
        }
    }

    fn handle_search(&mut self, code: KeyCode) -> Mode {
        match code {
            KeyCode::Esc => {
                self.filter.clear_search();
                self.refresh_view();
                Mode::Normal
            }
            KeyCode::Enter => Mode::Normal,
            KeyCode::Up => {
                self.move_selection(-1);
                Mode::Searching
            }
            KeyCode::Down => {
                self.move_selection(1);
                Mode::Searching
            }
            KeyCode::Left | KeyCode::PageUp => {
                self.turn_page(-1);
                Mode::Searching
            }
            KeyCode::Right | KeyCode::PageDown => {
                self.turn_page(1);
                Mode::Searching
            }
            KeyCode::Backspace => {
                self.filter.pop_search_char();
                self.refresh_view();
                Mode::Searching
            }
            KeyCode::Char(ch) => {
                if !ch.is_control() {
                    self.filter.push_search_char(ch);
                    self.refresh_view();
                }
                Mode::Searching
            }
            _ => Mode::Searching,
        }
    }

    /// Re-derive the visible page after anything affecting it changed. The
    /// page is clamped first so a shrunken collection cannot leave the view
    /// pointing past the end.
    fn refresh_view(&mut self) {
        let mut view = derive_view(&self.books, &self.filter, PAGE_SIZE);
        let before = self.filter.page;
        self.filter.clamp_page(view.total_pages);
        if self.filter.page != before {
            view = derive_view(&self.books, &self.filter, PAGE_SIZE);
        }
        self.view = view;
        self.ensure_in_bounds();
    }

    fn ensure_in_bounds(&mut self) {
        if self.view.books.is_empty() {
            self.selected = 0;
        } else if self.selected >= self.view.books.len() {
            self.selected = self.view.books.len() - 1;
        }
    }

    fn current_book(&self) -> Option<&Book> {
        self.view.books.get(self.selected)
    }

    fn move_selection(&mut self, offset: isize) {
        if self.view.books.is_empty() {
            return;
        }
        let len = self.view.books.len() as isize;
        let mut new = self.selected as isize + offset;
        if new < 0 {
            new = 0;
        }
        if new >= len {
            new = len - 1;
        }
        self.selected = new as usize;
    }

    fn select_first(&mut self) {
        if !self.view.books.is_empty() {
            self.selected = 0;
        }
    }

    fn select_last(&mut self) {
        if !self.view.books.is_empty() {
            self.selected = self.view.books.len() - 1;
        }
    }

    fn turn_page(&mut self, delta: isize) {
        let before = self.filter.page;
        self.filter.turn_page(delta, self.view.total_pages);
        if self.filter.page != before {
            self.view = derive_view(&self.books, &self.filter, PAGE_SIZE);
            self.selected = 0;
        }
    }

    pub(crate) fn draw(&self, frame: &mut Frame) {
        let area = frame.area();
        let footer_height = FOOTER_HEIGHT.min(area.height);

        let (content_area, footer_area) = if area.height > footer_height {
            let chunks = Layout::default()
                .direction(Direction::Vertical)
                .constraints([Constraint::Min(0), Constraint::Length(footer_height)])
                .split(area);
            (chunks[0], chunks[1])
        } else {
            (area, area)
        };

        self.draw_dashboard(frame, content_area);

        if area.height >= footer_height {
            self.draw_footer(frame, footer_area);
        }

        match &self.mode {
            Mode::AddingBook(form) => self.draw_book_form(frame, area, "Add New Book", form),
            Mode::EditingBook { form, .. } => self.draw_book_form(frame, area, "Edit Book", form),
            Mode::ConfirmDelete(confirm) => self.draw_confirm_delete(frame, area, confirm),
            Mode::Searching => self.draw_search_bar(frame, area),
            Mode::Normal => {}
        }
    }

    fn draw_dashboard(&self, frame: &mut Frame, area: Rect) {
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(4),
                Constraint::Min(1),
                Constraint::Length(1),
            ])
            .split(area);

        self.draw_filter_header(frame, chunks[0]);
        self.draw_book_list(frame, chunks[1]);
        self.draw_pagination(frame, chunks[2]);
    }

    fn draw_filter_header(&self, frame: &mut Frame, area: Rect) {
        let search_display = if self.filter.search.is_empty() {
            Span::styled("<none>", Style::default().fg(Color::DarkGray))
        } else {
            Span::styled(self.filter.search.clone(), Style::default().fg(Color::Yellow))
        };
        let genre_style = if self.filter.genre.is_some() {
            Style::default().fg(Color::Yellow)
        } else {
            Style::default()
        };
        let status_filter_style = if self.filter.status.is_some() {
            Style::default().fg(Color::Yellow)
        } else {
            Style::default()
        };

        let filter_line = Line::from(vec![
            Span::raw("Search: "),
            search_display,
            Span::raw("   Genre: "),
            Span::styled(self.filter.genre_label(), genre_style),
            Span::raw("   Status: "),
            Span::styled(self.filter.status_label(), status_filter_style),
        ]);
        let count_line = Line::from(Span::styled(
            self.view.count_text(),
            Style::default().add_modifier(Modifier::BOLD),
        ));

        let header = Paragraph::new(vec![filter_line, count_line])
            .alignment(Alignment::Left)
            .block(
                Block::default()
                    .borders(Borders::ALL)
                    .title("Book Inventory Dashboard"),
            );
        frame.render_widget(header, area);
    }

    fn draw_book_list(&self, frame: &mut Frame, area: Rect) {
        if self.books.is_empty() {
            let message = Paragraph::new("No books yet. Press '+' to add one.")
                .alignment(Alignment::Center)
                .block(Block::default().borders(Borders::NONE));
            frame.render_widget(message, area);
            return;
        }

        if self.view.books.is_empty() {
            let message = Paragraph::new("No books match the current filters.")
                .alignment(Alignment::Center)
                .block(Block::default().borders(Borders::NONE));
            frame.render_widget(message, area);
            return;
        }

        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Length(1), Constraint::Min(1)])
            .split(area);

        let header = Paragraph::new(Line::from(Span::styled(
            format!(
                "  {:<30.30}  {:<22.22}  {:<12.12}  {:>4}  {}",
                "Title", "Author", "Genre", "Year", "Status"
            ),
            Style::default()
                .fg(Color::Gray)
                .add_modifier(Modifier::BOLD),
        )));
        frame.render_widget(header, chunks[0]);

        let items: Vec<ListItem> = self
            .view
            .books
            .iter()
            .map(|book| {
                let columns = format!(
                    "{:<30.30}  {:<22.22}  {:<12.12}  {:>4}  ",
                    book.title,
                    book.author,
                    book.genre.label(),
                    book.published_year
                );
                ListItem::new(Line::from(vec![
                    Span::raw(columns),
                    Span::styled(book.status.label().to_string(), status_style(book.status)),
                ]))
            })
            .collect();

        let list = List::new(items)
            .block(Block::default().borders(Borders::NONE))
            .highlight_style(Style::default().fg(Color::Yellow))
            .highlight_symbol("▶ ");

        let mut list_state = ListState::default();
        list_state.select(Some(self.selected));
        frame.render_stateful_widget(list, chunks[1], &mut list_state);
    }

    fn draw_pagination(&self, frame: &mut Frame, area: Rect) {
        if self.view.total_pages <= 1 {
            return;
        }

        let mut spans = Vec::new();
        if let Some(range) = self.view.range_text() {
            spans.push(Span::styled(range, Style::default().fg(Color::Gray)));
            spans.push(Span::raw("   "));
        }
        for page in 1..=self.view.total_pages {
            let style = if page == self.filter.page {
                Style::default()
                    .fg(Color::Yellow)
                    .add_modifier(Modifier::BOLD)
            } else {
                Style::default().fg(Color::Gray)
            };
            spans.push(Span::styled(format!(" {page} "), style));
        }

        let paragraph = Paragraph::new(Line::from(spans)).alignment(Alignment::Left);
        frame.render_widget(paragraph, area);
    }

    fn draw_footer(&self, frame: &mut Frame, area: Rect) {
        let block = Block::default().borders(Borders::TOP);
        frame.render_widget(block.clone(), area);
        let inner = block.inner(area);

        let status_line = if let Some(status) = &self.status {
            Line::from(vec![Span::styled(status.text.clone(), status.kind.style())])
        } else {
            Line::from("")
        };

        let instructions = self.footer_instructions();

        let paragraph = Paragraph::new(vec![status_line, instructions]).wrap(Wrap { trim: true });
        frame.render_widget(paragraph, inner);
    }

    fn draw_search_bar(&self, frame: &mut Frame, area: Rect) {
        let height = 3u16.min(area.height);
        let popup_area = Rect {
            x: area.x,
            y: area.y,
            width: area.width,
            height,
        };
        frame.render_widget(Clear, popup_area);

        let block = Block::default().borders(Borders::ALL).title("Search");
        let paragraph = Paragraph::new(Span::raw(format!("Search: {}", self.filter.search)))
            .block(block.clone())
            .wrap(Wrap { trim: true });
        frame.render_widget(paragraph, popup_area);

        let inner = block.inner(popup_area);
        let cursor_x =
            inner.x + "Search: ".len() as u16 + self.filter.search.chars().count() as u16;
        let cursor_y = inner.y;
        frame.set_cursor_position((cursor_x, cursor_y));
    }

    fn footer_instructions(&self) -> Line<'static> {
        let key_style = Style::default()
            .fg(Color::Cyan)
            .add_modifier(Modifier::BOLD);
        match &self.mode {
            Mode::Searching => Line::from(vec![
                Span::styled("[Type]", key_style),
                Span::raw(" Filter   "),
                Span::styled("[↑↓]", key_style),
                Span::raw(" Select   "),
                Span::styled("[←→]", key_style),
                Span::raw(" Page   "),
                Span::styled("[Enter]", key_style),
                Span::raw(" Done   "),
                Span::styled("[Esc]", key_style),
                Span::raw(" Clear"),
            ]),
            Mode::AddingBook(_) | Mode::EditingBook { .. } => Line::from(vec![
                Span::styled("[Tab]", key_style),
                Span::raw(" Next Field   "),
                Span::styled("[←→]", key_style),
                Span::raw(" Change Choice   "),
                Span::styled("[Enter]", key_style),
                Span::raw(" Save   "),
                Span::styled("[Esc]", key_style),
                Span::raw(" Cancel"),
            ]),
            Mode::ConfirmDelete(_) => Line::from(vec![
                Span::styled("[Y]", key_style),
                Span::raw(" Confirm   "),
                Span::styled("[N/Esc]", key_style),
                Span::raw(" Cancel"),
            ]),
            Mode::Normal => Line::from(vec![
                Span::styled("[↑↓]", key_style),
                Span::raw(" Select   "),
                Span::styled("[←→]", key_style),
                Span::raw(" Page   "),
                Span::styled("[f]", key_style),
                Span::raw(" Search   "),
                Span::styled("[g]", key_style),
                Span::raw(" Genre   "),
                Span::styled("[s]", key_style),
                Span::raw(" Status   "),
                Span::styled("[+]", key_style),
                Span::raw(" Add   "),
                Span::styled("[e]", key_style),
                Span::raw(" Edit   "),
                Span::styled("[-]", key_style),
                Span::raw(" Delete   "),
                Span::styled("[q]", key_style),
                Span::raw(" Quit"),
            ]),
        }
    }

    fn draw_book_form(&self, frame: &mut Frame, area: Rect, title: &str, form: &BookForm) {
        let popup_area = centered_rect(60, 50, area);
        frame.render_widget(Clear, popup_area);

        let block = Block::default().title(title).borders(Borders::ALL);
        frame.render_widget(block.clone(), popup_area);
        let inner = block.inner(popup_area);

        let lines = vec![
            form.build_line("Title", BookField::Title),
            form.build_line("Author", BookField::Author),
            form.build_line("Genre", BookField::Genre),
            form.build_line("Published Year", BookField::Year),
            form.build_line("Status", BookField::Status),
            Line::from(""),
            Line::from(Span::styled(
                "Enter to save • Tab to switch • ←/→ to change choices • Esc to cancel",
                Style::default().fg(Color::Gray),
            )),
        ];

        let paragraph = Paragraph::new(lines).wrap(Wrap { trim: true });
        frame.render_widget(paragraph, inner);

        let (cursor_row, label) = match form.active {
            BookField::Title => (Some(0u16), "Title"),
            BookField::Author => (Some(1), "Author"),
            BookField::Year => (Some(3), "Published Year"),
            BookField::Genre | BookField::Status => (None, ""),
        };
        if let Some(row) = cursor_row {
            let prefix = label.len() as u16 + 2;
            frame.set_cursor_position((
                inner.x + prefix + form.value_len(form.active) as u16,
                inner.y + row,
            ));
        }
    }

    fn draw_confirm_delete(&self, frame: &mut Frame, area: Rect, confirm: &ConfirmBookDelete) {
        let popup_area = centered_rect(60, 30, area);
        frame.render_widget(Clear, popup_area);

        let block = Block::default().title("Delete Book").borders(Borders::ALL);
        frame.render_widget(block.clone(), popup_area);
        let inner = block.inner(popup_area);

        let lines = vec![
            Line::from(format!(
                "Are you sure you want to delete \"{}\"?",
                confirm.title
            )),
            Line::from("This action cannot be undone."),
            Line::from(""),
            Line::from(Span::styled(
                "Press Y to confirm or N / Esc to cancel.",
                Style::default().fg(Color::Gray),
            )),
        ];

        let paragraph = Paragraph::new(lines)
            .alignment(Alignment::Left)
            .wrap(Wrap { trim: true });
        frame.render_widget(paragraph, inner);
    }

    fn set_status<S: Into<String>>(&mut self, text: S, kind: StatusKind) {
        self.status = Some(StatusMessage {
            text: text.into(),
            kind,
            shown_at: Instant::now(),
        });
    }

    fn clear_status(&mut self) {
        self.status = None;
    }
}
