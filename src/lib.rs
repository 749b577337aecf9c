//! socketd - HTTP/1.0 server built directly on TCP sockets.
//!
//! Core library for the byte-stream buffer, the HTTP codec, session
//! tracking and the connection acceptor.

pub mod buffer;
pub mod config;
pub mod handler;
pub mod http;
pub mod server;
pub mod session;
