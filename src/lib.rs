//! Core library surface for the Book Inventory Manager TUI application.
//!
//! The public modules exposed here provide an intentionally small API so the
//! `bin` target as well as potential external tooling can reuse the same pieces.
//! Keeping the glue logic documented makes it easy to recall why each re-export
//! exists when revisiting the project.
pub mod api;
pub mod logging;
pub mod models;
pub mod ui;
pub mod view;

/// Convenience re-exports for the remote sync layer. These are typically used
/// by `main.rs` to build the client and preload the collection.
pub use api::{ApiError, BooksApi};

/// The primary domain types that other layers manipulate.
pub use models::{Book, BookDraft, BookStatus, Genre};

/// The interactive application entry point and state container.
pub use ui::{run_app, App};
