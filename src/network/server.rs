//! HTTP Server dengan event-driven I/O
//!
//! Menggunakan mio untuk non-blocking I/O multiplexing. Satu thread, satu
//! poll loop; setiap koneksi membawa buffer read/write sendiri.

use std::collections::HashMap;
use std::io;
use std::net::SocketAddr;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use mio::event::Event;
use mio::net::TcpListener;
use mio::{Events, Interest, Poll, Token, Waker};

use super::connection::{Connection, Phase, ReadStatus};
use super::http::{self, Method, Response};
use super::router::Router;
use crate::config::ServerConfig;

const SERVER_TOKEN: Token = Token(0);
const WAKER_TOKEN: Token = Token(1);
const FIRST_CLIENT_TOKEN: usize = 2;
const EVENTS_CAPACITY: usize = 1024;
const BACKLOG_RETRY: Duration = Duration::from_millis(100);

/// Stops a running [`Server`] from another thread.
#[derive(Clone)]
pub struct ShutdownHandle {
    flag: Arc<AtomicBool>,
    waker: Arc<Waker>,
}

impl ShutdownHandle {
    pub fn shutdown(&self) -> io::Result<()> {
        self.flag.store(true, Ordering::Release);
        self.waker.wake()
    }
}

/// HTTP Server
///
/// Event-driven server dengan:
/// - Non-blocking I/O (epoll/kqueue/IOCP)
/// - Batas jumlah koneksi
/// - Satu request per koneksi
pub struct Server {
    poll: Poll,
    listener: TcpListener,
    connections: HashMap<Token, Connection>,
    next_token: usize,
    accept_backlog: bool,
    router: Router,
    config: ServerConfig,
    shutdown: Arc<AtomicBool>,
    waker: Arc<Waker>,
}

impl Server {
    /// Bind the listener and register it. Does not start serving.
    pub fn bind(config: ServerConfig) -> io::Result<Self> {
        let poll = Poll::new()?;
        let mut listener = TcpListener::bind(config.bind_addr)?;
        poll.registry()
            .register(&mut listener, SERVER_TOKEN, Interest::READABLE)?;
        let waker = Arc::new(Waker::new(poll.registry(), WAKER_TOKEN)?);

        Ok(Self {
            poll,
            listener,
            connections: HashMap::with_capacity(config.max_connections.min(1024)),
            next_token: FIRST_CLIENT_TOKEN,
            accept_backlog: false,
            router: Router::new(config.codec),
            config,
            shutdown: Arc::new(AtomicBool::new(false)),
            waker,
        })
    }

    pub fn local_addr(&self) -> io::Result<SocketAddr> {
        self.listener.local_addr()
    }

    pub fn shutdown_handle(&self) -> ShutdownHandle {
        ShutdownHandle {
            flag: Arc::clone(&self.shutdown),
            waker: Arc::clone(&self.waker),
        }
    }

    /// Run server event loop until a [`ShutdownHandle`] fires.
    pub fn run(&mut self) -> io::Result<()> {
        let mut events = Events::with_capacity(EVENTS_CAPACITY);

        tracing::info!(addr = %self.local_addr()?, "server listening");

        loop {
            let timeout = self.accept_backlog.then_some(BACKLOG_RETRY);
            if let Err(e) = self.poll.poll(&mut events, timeout) {
                if e.kind() == io::ErrorKind::Interrupted {
                    continue;
                }
                return Err(e);
            }

            for event in events.iter() {
                match event.token() {
                    SERVER_TOKEN => self.accept_connections()?,
                    WAKER_TOKEN => {}
                    token => self.handle_event(token, event),
                }
            }

            // Listener edge-triggered: backlog yang tertunda tidak memicu event baru
            if self.accept_backlog {
                self.accept_connections()?;
            }

            if self.shutdown.load(Ordering::Acquire) {
                tracing::info!(open = self.connections.len(), "server shutting down");
                return Ok(());
            }
        }
    }

    /// Accept new connections
    fn accept_connections(&mut self) -> io::Result<()> {
        loop {
            match self.listener.accept() {
                Ok((mut stream, addr)) => {
                    if self.connections.len() >= self.config.max_connections {
                        tracing::warn!(%addr, "max connections reached, rejecting");
                        continue;
                    }

                    let token = Token(self.next_token);
                    self.next_token += 1;

                    self.poll
                        .registry()
                        .register(&mut stream, token, Interest::READABLE)?;
                    self.connections.insert(token, Connection::new(stream, addr));
                    tracing::debug!(%addr, token = token.0, "connection accepted");
                }
                Err(e) => match accept_step(&e) {
                    AcceptStep::Retry => continue,
                    AcceptStep::Drained => {
                        self.accept_backlog = false;
                        break;
                    }
                    AcceptStep::Backlog => {
                        tracing::warn!(error = %e, open = self.connections.len(), "accept failed");
                        self.accept_backlog = true;
                        break;
                    }
                },
            }
        }
        Ok(())
    }

    /// Errors on one connection only close that connection.
    fn handle_event(&mut self, token: Token, event: &Event) {
        let done = match self.connections.get_mut(&token) {
            Some(conn) => match drive(conn, event, &self.router, &self.config) {
                Ok(done) => done,
                Err(e) => {
                    tracing::debug!(peer = %conn.peer(), error = %e, "connection error");
                    true
                }
            },
            None => return,
        };

        if done {
            self.close(token);
            return;
        }

        // Sisa response menunggu socket writable
        let rereg = match self.connections.get_mut(&token) {
            Some(conn) if conn.phase() == Phase::Writing => {
                self.poll
                    .registry()
                    .reregister(conn.stream_mut(), token, Interest::WRITABLE)
            }
            _ => Ok(()),
        };
        if let Err(e) = rereg {
            tracing::debug!(error = %e, "reregister failed");
            self.close(token);
        }
    }

    fn close(&mut self, token: Token) {
        if let Some(mut conn) = self.connections.remove(&token) {
            conn.shutdown();
            let _ = self.poll.registry().deregister(conn.stream_mut());
            tracing::debug!(
                peer = %conn.peer(),
                token = token.0,
                unsent = conn.write_pending(),
                "connection closed"
            );
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum AcceptStep {
    /// Call `accept` again right away.
    Retry,
    /// No pending connections left.
    Drained,
    /// Pending connections could not be taken now (fd limit, aborted
    /// handshake). Try again after the next event.
    Backlog,
}

fn accept_step(e: &io::Error) -> AcceptStep {
    match e.kind() {
        io::ErrorKind::WouldBlock => AcceptStep::Drained,
        io::ErrorKind::Interrupted => AcceptStep::Retry,
        _ => AcceptStep::Backlog,
    }
}

/// Advance one connection. Returns `true` when it should be closed.
fn drive(
    conn: &mut Connection,
    event: &Event,
    router: &Router,
    config: &ServerConfig,
) -> io::Result<bool> {
    if conn.phase() == Phase::Reading && (event.is_readable() || event.is_read_closed()) {
        let limit = http::MAX_HEAD_SIZE + config.max_body_bytes + 1;
        let status = conn.fill_read_buffer(limit)?;

        match http::parse_request(conn.readable(), config.max_body_bytes) {
            Ok(Some((request, _))) => {
                let response = router.handle(&request);
                tracing::debug!(
                    method = request.method.as_str(),
                    path = %request.path,
                    status = response.status.as_u16(),
                    "request served"
                );
                let head_only = request.method == Method::Head;
                conn.queue_write(&response.to_bytes(head_only));
            }
            Ok(None) if status == ReadStatus::Closed => return Ok(true),
            Ok(None) => return Ok(false),
            Err(e) => {
                tracing::warn!(peer = %conn.peer(), error = %e, "bad request");
                let response = Response::text(e.status(), &format!("{e}\n"));
                conn.queue_write(&response.to_bytes(false));
            }
        }
    }

    if conn.phase() == Phase::Writing {
        return conn.flush_write_buffer();
    }
    Ok(false)
}
