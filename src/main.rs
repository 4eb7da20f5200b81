//! Binary entry point that glues the remote inventory service to the TUI.
//! Summarizing the bootstrapping pipeline here keeps the intent obvious when
//! revisiting the code: we bring up logging, hydrate the initial app state
//! from the server, and drive the Ratatui event loop until the user exits.
use anyhow::Context;

use book_inventory_manager::{logging, run_app, App, BooksApi};

/// Where the inventory service listens. The collection endpoints live under
/// `/Books` relative to this address.
const BASE_URL: &str = "http://localhost:4000";

/// Initialize logging, hydrate the collection from the server, and launch the
/// Ratatui event loop.
///
/// Returning a `Result` bubbles up fatal startup problems (for example the
/// inventory service being unreachable) to the terminal instead of crashing
/// silently.
fn main() -> anyhow::Result<()> {
    logging::init();

    let api = BooksApi::new(BASE_URL).context("failed to build the HTTP client")?;
    let books = api
        .fetch_all()
        .context("failed to load books from the server")?;
    tracing::info!(count = books.len(), "loaded initial collection");

    let mut app = App::new(api, books);
    run_app(&mut app)
}
