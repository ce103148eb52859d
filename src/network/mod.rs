//! Network Layer: HTTP front-end untuk codec
//!
//! Menggunakan mio untuk cross-platform non-blocking I/O.
//!
//! Fitur:
//! - Non-blocking I/O dengan epoll/kqueue/IOCP
//! - HTTP/1.1 minimal (Content-Length, `Connection: close`)
//! - JSON endpoint, health check, halaman statis

pub mod api;
mod connection;
pub mod http;
mod router;
mod server;

pub use router::Router;
pub use server::{Server, ShutdownHandle};
