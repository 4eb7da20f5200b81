//! Blocking HTTP client for the books collection. Every mutation the UI makes
//! goes through here; the caller only patches its in-memory list after the
//! server has said yes.

use std::time::Duration;

use reqwest::blocking::Client;

use crate::api::error::{ApiError, Result};
use crate::models::{Book, BookDraft};

const HTTP_TIMEOUT_SECS: u64 = 6;

/// Handle to the remote collection endpoint. Holds one pooled client for the
/// whole session.
pub struct BooksApi {
    client: Client,
    base_url: String,
}

impl BooksApi {
    /// Build a client against `base_url`, e.g. `http://localhost:4000`. The
    /// `/Books` path segment is appended per request.
    pub fn new(base_url: &str) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(HTTP_TIMEOUT_SECS))
            .build()?;
        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    fn collection_url(&self) -> String {
        format!("{}/Books", self.base_url)
    }

    fn record_url(&self, id: u64) -> String {
        format!("{}/Books/{}", self.base_url, id)
    }

    /// Retrieve the whole collection. The server does not paginate or filter,
    /// so this single call hydrates the session.
    pub fn fetch_all(&self) -> Result<Vec<Book>> {
        let url = self.collection_url();
        tracing::debug!(url = %url, "fetching collection");
        let response = self
            .client
            .get(&url)
            .header(reqwest::header::ACCEPT, "application/json")
            .send()?;
        let status = response.status();
        if !status.is_success() {
            tracing::warn!(url = %url, status = %status, "fetch rejected");
            return Err(ApiError::Status { status, url });
        }
        let books: Vec<Book> = serde_json::from_str(&response.text()?)?;
        tracing::debug!(count = books.len(), "collection fetched");
        Ok(books)
    }

    /// Post a draft and return the record the server stored. The server owns
    /// id assignment, so callers must insert the returned book rather than
    /// anything they built locally.
    pub fn create(&self, draft: &BookDraft) -> Result<Book> {
        let url = self.collection_url();
        tracing::debug!(url = %url, title = %draft.title, "creating book");
        let response = self.client.post(&url).json(draft).send()?;
        let status = response.status();
        if !status.is_success() {
            tracing::warn!(url = %url, status = %status, "create rejected");
            return Err(ApiError::Status { status, url });
        }
        let book: Book = serde_json::from_str(&response.text()?)?;
        tracing::info!(id = book.id, "book created");
        Ok(book)
    }

    /// Replace the record with `id` by the draft's contents. Returns the
    /// server's view of the updated record so the caller can swap it into the
    /// list in place.
    pub fn update(&self, id: u64, draft: &BookDraft) -> Result<Book> {
        let url = self.record_url(id);
        tracing::debug!(url = %url, "updating book");
        let record = Book::from_draft(id, draft);
        let response = self.client.put(&url).json(&record).send()?;
        let status = response.status();
        if !status.is_success() {
            tracing::warn!(url = %url, status = %status, "update rejected");
            return Err(ApiError::Status { status, url });
        }
        let book: Book = serde_json::from_str(&response.text()?)?;
        tracing::info!(id = book.id, "book updated");
        Ok(book)
    }

    /// Delete the record with `id`. The caller removes its local copy only
    /// after this returns `Ok`.
    pub fn delete(&self, id: u64) -> Result<()> {
        let url = self.record_url(id);
        tracing::debug!(url = %url, "deleting book");
        let response = self.client.delete(&url).send()?;
        let status = response.status();
        if !status.is_success() {
            tracing::warn!(url = %url, status = %status, "delete rejected");
            return Err(ApiError::Status { status, url });
        }
        tracing::info!(id, "book deleted");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::thread;

    use tiny_http::{Header, Method, Response, Server};

    use super::*;
    use crate::models::{BookStatus, Genre};

    fn json_header() -> Header {
        Header::from_bytes(&b"Content-Type"[..], &b"application/json"[..]).expect("header")
    }

    /// Bind a throwaway server and let `handler` answer exactly one request
    /// on a background thread.
    fn serve_one<F>(handler: F) -> (String, thread::JoinHandle<()>)
    where
        F: FnOnce(tiny_http::Request) + Send + 'static,
    {
        let server = Server::http("127.0.0.1:0").expect("bind test server");
        let addr = server.server_addr().to_ip().expect("test server address");
        let base = format!("http://{addr}");
        let handle = thread::spawn(move || {
            let request = server.recv().expect("receive request");
            handler(request);
        });
        (base, handle)
    }

    fn sample_book() -> Book {
        Book {
            id: 42,
            title: "The Hobbit".to_string(),
            author: "J.R.R. Tolkien".to_string(),
            genre: Genre::Fiction,
            published_year: 1937,
            status: BookStatus::Available,
        }
    }

    #[test]
    fn fetch_all_decodes_the_collection() {
        let body = serde_json::to_string(&vec![sample_book()]).expect("encode");
        let (base, handle) = serve_one(move |request| {
            assert_eq!(*request.method(), Method::Get);
            assert_eq!(request.url(), "/Books");
            let response = Response::from_string(body).with_header(json_header());
            request.respond(response).expect("respond");
        });

        let api = BooksApi::new(&base).expect("build client");
        let books = api.fetch_all().expect("fetch");
        handle.join().expect("server thread");

        assert_eq!(books.len(), 1);
        assert_eq!(books[0].id, 42);
        assert_eq!(books[0].published_year, 1937);
    }

    #[test]
    fn fetch_all_maps_server_failure_to_status_error() {
        let (base, handle) = serve_one(|request| {
            let response = Response::from_string("boom").with_status_code(500);
            request.respond(response).expect("respond");
        });

        let api = BooksApi::new(&base).expect("build client");
        let err = api.fetch_all().expect_err("should fail");
        handle.join().expect("server thread");

        match err {
            ApiError::Status { status, url } => {
                assert_eq!(status.as_u16(), 500);
                assert!(url.ends_with("/Books"));
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn create_posts_the_draft_and_adopts_the_server_id() {
        let (base, handle) = serve_one(|mut request| {
            assert_eq!(*request.method(), Method::Post);
            assert_eq!(request.url(), "/Books");
            let mut body = String::new();
            request
                .as_reader()
                .read_to_string(&mut body)
                .expect("read body");
            let sent: serde_json::Value = serde_json::from_str(&body).expect("json body");
            assert!(sent.get("id").is_none());
            assert_eq!(sent["publishedYear"], 1999);
            assert_eq!(sent["title"], "X");

            let stored = Book {
                id: 1724,
                title: "X".to_string(),
                author: "Y".to_string(),
                genre: Genre::Fiction,
                published_year: 1999,
                status: BookStatus::Available,
            };
            let response =
                Response::from_string(serde_json::to_string(&stored).expect("encode"))
                    .with_status_code(201)
                    .with_header(json_header());
            request.respond(response).expect("respond");
        });

        let api = BooksApi::new(&base).expect("build client");
        let draft = BookDraft {
            title: "X".to_string(),
            author: "Y".to_string(),
            genre: Genre::Fiction,
            published_year: 1999,
            status: BookStatus::Available,
        };
        let created = api.create(&draft).expect("create");
        handle.join().expect("server thread");

        assert_eq!(created.id, 1724);
        assert_eq!(created.published_year, 1999);
    }

    #[test]
    fn update_puts_the_full_record_to_the_record_url() {
        let (base, handle) = serve_one(|mut request| {
            assert_eq!(*request.method(), Method::Put);
            assert_eq!(request.url(), "/Books/5");
            let mut body = String::new();
            request
                .as_reader()
                .read_to_string(&mut body)
                .expect("read body");
            let sent: serde_json::Value = serde_json::from_str(&body).expect("json body");
            assert_eq!(sent["id"], 5);
            assert_eq!(sent["title"], "Renamed");

            let response = Response::from_string(body).with_header(json_header());
            request.respond(response).expect("respond");
        });

        let api = BooksApi::new(&base).expect("build client");
        let draft = BookDraft {
            title: "Renamed".to_string(),
            author: "Y".to_string(),
            genre: Genre::Mystery,
            published_year: 2001,
            status: BookStatus::Issued,
        };
        let updated = api.update(5, &draft).expect("update");
        handle.join().expect("server thread");

        assert_eq!(updated.id, 5);
        assert_eq!(updated.title, "Renamed");
        assert_eq!(updated.status, BookStatus::Issued);
    }

    #[test]
    fn update_rejection_carries_the_status() {
        let (base, handle) = serve_one(|request| {
            let response = Response::from_string("not here").with_status_code(404);
            request.respond(response).expect("respond");
        });

        let api = BooksApi::new(&base).expect("build client");
        let draft = BookDraft {
            title: "Ghost".to_string(),
            author: "Nobody".to_string(),
            genre: Genre::Mystery,
            published_year: 2001,
            status: BookStatus::Available,
        };
        let err = api.update(99, &draft).expect_err("should fail");
        handle.join().expect("server thread");

        assert!(matches!(
            err,
            ApiError::Status { status, .. } if status.as_u16() == 404
        ));
    }

    #[test]
    fn delete_targets_the_record_url() {
        let (base, handle) = serve_one(|request| {
            assert_eq!(*request.method(), Method::Delete);
            assert_eq!(request.url(), "/Books/5");
            request
                .respond(Response::from_string("{}"))
                .expect("respond");
        });

        let api = BooksApi::new(&base).expect("build client");
        api.delete(5).expect("delete");
        handle.join().expect("server thread");
    }

    #[test]
    fn refused_connection_surfaces_as_transport_error() {
        // Bind then immediately drop to get an address nothing listens on.
        let base = {
            let server = Server::http("127.0.0.1:0").expect("bind test server");
            let addr = server.server_addr().to_ip().expect("test server address");
            format!("http://{addr}")
        };

        let api = BooksApi::new(&base).expect("build client");
        let err = api.fetch_all().expect_err("should fail");
        assert!(matches!(err, ApiError::Http(_)));
    }

    #[test]
    fn trailing_slash_in_base_url_is_tolerated() {
        let (base, handle) = serve_one(|request| {
            assert_eq!(request.url(), "/Books");
            let response = Response::from_string("[]").with_header(json_header());
            request.respond(response).expect("respond");
        });

        let api = BooksApi::new(&format!("{base}/")).expect("build client");
        let books = api.fetch_all().expect("fetch");
        handle.join().expect("server thread");
        assert!(books.is_empty());
    }
}
