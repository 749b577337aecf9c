//! HTTP protocol implementation.
//!
//! This module implements an HTTP/1.0 server codec that works directly on
//! the TCP byte stream, with sequential request reuse of the connection.
//!
//! # Architecture
//!
//! The HTTP layer is organized into several submodules:
//!
//! - **`connection`**: Runs the exchange loop for one accepted socket
//! - **`codec`**: Decodes requests from the wire, multipart bodies included
//! - **`request`**: HTTP request representation with params and body parts
//! - **`response`**: HTTP response representation with builder pattern
//! - **`body`**: Body payloads held in memory or spooled to temp files
//! - **`headers`**: Ordered multi-value header map
//! - **`writer`**: Serializes responses and streams file bodies to the client
//! - **`mime`**: MIME type constants and file extension mapping
//!
//! # Exchange Loop
//!
//! Each client connection runs the same cycle until the peer closes or a
//! failure ends it:
//!
//! ```text
//!        ┌──────────────┐
//!        │   Reading    │ ← Buffer bytes until the head, then the body
//!        └──────┬───────┘
//!               │ Request decoded          (EOF between requests → Closed)
//!               ▼
//!        ┌──────────────┐
//!        │   Session    │ ← Cookie key resolved against the store
//!        └──────┬───────┘
//!               │ Session attached
//!               ▼
//!        ┌──────────────┐
//!        │  Dispatching │ ← Handler builds the response
//!        └──────┬───────┘
//!               │ Response ready
//!               ▼
//!        ┌──────────────┐
//!        │   Writing    │ ← Set-Cookie added when the key is fresh
//!        └──────┬───────┘
//!               │ Response sent
//!               └─ → Reading (same connection)
//! ```
//!
//! Decode failures send a best-effort 400, timeouts a 408 and handler
//! errors a 500, and the connection closes after any of them.
//!
//! # Example
//!
//! ```ignore
//! use std::sync::Arc;
//!
//! use socketd::config::Settings;
//! use socketd::handler::FileHandler;
//! use socketd::http::connection::Connection;
//! use tokio::net::TcpListener;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let settings = Settings::default();
//!     let handler = Arc::new(FileHandler::new("site"));
//!     let listener = TcpListener::bind("127.0.0.1:8080").await?;
//!
//!     loop {
//!         let (socket, _addr) = listener.accept().await?;
//!         let settings = settings.clone();
//!         let handler = handler.clone();
//!         tokio::spawn(async move {
//!             let mut conn = Connection::new(socket, &settings, handler, None);
//!             if let Err(e) = conn.run().await {
//!                 eprintln!("Connection error: {}", e);
//!             }
//!         });
//!     }
//! }
//! ```

pub mod body;
pub mod codec;
pub mod connection;
pub mod headers;
pub mod mime;
pub mod request;
pub mod response;
pub mod writer;
