//! Remote synchronization split across logical submodules.

mod client;
mod error;

pub use client::BooksApi;
pub use error::{ApiError, Result};
