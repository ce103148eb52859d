//! Connection handling dengan buffered I/O
//!
//! Satu koneksi = satu request = satu response. Read buffer diisi sampai
//! socket `WouldBlock` (mio edge-triggered), write buffer di-flush sampai
//! habis lalu koneksi ditutup.

use std::io::{self, Read, Write};
use std::net::{Shutdown, SocketAddr};

use mio::net::TcpStream;

/// Bytes read per syscall
const READ_CHUNK_SIZE: usize = 4 * 1024;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReadStatus {
    /// Socket drained, peer may still send.
    Open,
    /// Peer closed its write half.
    Closed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Reading,
    Writing,
}

pub struct Connection {
    stream: TcpStream,
    peer: SocketAddr,
    read_buffer: Vec<u8>,
    write_buffer: Vec<u8>,
    write_pos: usize,
    phase: Phase,
}

impl Connection {
    pub fn new(stream: TcpStream, peer: SocketAddr) -> Self {
        // Disable Nagle's algorithm; responses are written in one go anyway
        if let Err(e) = stream.set_nodelay(true) {
            tracing::debug!(%peer, error = %e, "set_nodelay failed");
        }

        Self {
            stream,
            peer,
            read_buffer: Vec::with_capacity(READ_CHUNK_SIZE),
            write_buffer: Vec::new(),
            write_pos: 0,
            phase: Phase::Reading,
        }
    }

    /// Read until the socket would block, the peer closes, or `limit` bytes
    /// are buffered.
    pub fn fill_read_buffer(&mut self, limit: usize) -> io::Result<ReadStatus> {
        let mut chunk = [0u8; READ_CHUNK_SIZE];
        loop {
            if self.read_buffer.len() >= limit {
                return Ok(ReadStatus::Open);
            }
            match self.stream.read(&mut chunk) {
                Ok(0) => return Ok(ReadStatus::Closed),
                Ok(n) => self.read_buffer.extend_from_slice(&chunk[..n]),
                Err(ref e) if e.kind() == io::ErrorKind::WouldBlock => {
                    return Ok(ReadStatus::Open)
                }
                Err(ref e) if e.kind() == io::ErrorKind::Interrupted => continue,
                Err(e) => return Err(e),
            }
        }
    }

    /// Buffered request bytes
    #[inline(always)]
    pub fn readable(&self) -> &[u8] {
        &self.read_buffer
    }

    /// Queue a response and switch to the writing phase.
    pub fn queue_write(&mut self, data: &[u8]) {
        self.write_buffer.extend_from_slice(data);
        self.phase = Phase::Writing;
    }

    /// Write as much as the socket accepts.
    ///
    /// Returns `true` once everything queued has been written.
    pub fn flush_write_buffer(&mut self) -> io::Result<bool> {
        while self.write_pos < self.write_buffer.len() {
            match self.stream.write(&self.write_buffer[self.write_pos..]) {
                Ok(0) => {
                    return Err(io::Error::new(
                        io::ErrorKind::WriteZero,
                        "Failed to write to socket",
                    ));
                }
                Ok(n) => self.write_pos += n,
                Err(ref e) if e.kind() == io::ErrorKind::WouldBlock => return Ok(false),
                Err(ref e) if e.kind() == io::ErrorKind::Interrupted => continue,
                Err(e) => return Err(e),
            }
        }
        Ok(true)
    }

    /// Bytes pending in write buffer
    #[inline(always)]
    pub fn write_pending(&self) -> usize {
        self.write_buffer.len() - self.write_pos
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn peer(&self) -> SocketAddr {
        self.peer
    }

    /// Underlying stream untuk (re)registration
    pub fn stream_mut(&mut self) -> &mut TcpStream {
        &mut self.stream
    }

    /// Send FIN so the client sees EOF after the response.
    pub fn shutdown(&self) {
        if let Err(e) = self.stream.shutdown(Shutdown::Write) {
            tracing::debug!(peer = %self.peer, error = %e, "shutdown failed");
        }
    }
}
