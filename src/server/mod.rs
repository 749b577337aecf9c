//! TCP acceptor and server lifecycle.

pub mod listener;

pub use listener::Server;
