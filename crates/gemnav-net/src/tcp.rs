//! Blocking TCP transport with explicit timeouts.
//!
//! A slow capsule should stall an invocation for seconds, not
//! forever, so both connect and read carry a deadline.

use std::io::{Read, Write};
use std::net::{TcpStream, ToSocketAddrs};
use std::time::Duration;

use gemnav_types::backend::{NetworkBackend, NetworkStream};
use gemnav_types::error::{GemError, Result};

/// TCP connect timeout.
pub const CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

/// TCP read timeout.
pub const READ_TIMEOUT: Duration = Duration::from_secs(15);

/// [`NetworkBackend`] over `std::net::TcpStream`.
pub struct StdNetworkBackend;

impl NetworkBackend for StdNetworkBackend {
    fn connect(&mut self, host: &str, port: u16) -> Result<Box<dyn NetworkStream>> {
        let addr = format!("{host}:{port}")
            .to_socket_addrs()
            .map_err(|e| GemError::Network(format!("DNS resolution failed for {host}: {e}")))?
            .next()
            .ok_or_else(|| GemError::Network(format!("no addresses for {host}:{port}")))?;

        let stream = TcpStream::connect_timeout(&addr, CONNECT_TIMEOUT)
            .map_err(|e| GemError::Network(format!("connect to {host}:{port}: {e}")))?;
        stream
            .set_read_timeout(Some(READ_TIMEOUT))
            .map_err(|e| GemError::Network(format!("set read timeout: {e}")))?;

        log::debug!("connected to {host}:{port}");
        Ok(Box::new(StdNetworkStream::new(stream)))
    }
}

/// A plain TCP [`NetworkStream`].
///
/// I/O errors keep their `io::ErrorKind` (wrapped as `GemError::Io`)
/// so callers can tell a timeout from a reset.
pub struct StdNetworkStream {
    stream: TcpStream,
}

impl StdNetworkStream {
    pub fn new(stream: TcpStream) -> Self {
        Self { stream }
    }
}

impl NetworkStream for StdNetworkStream {
    fn read(&mut self, buf: &mut [u8]) -> Result<usize> {
        self.stream.read(buf).map_err(GemError::Io)
    }

    fn write(&mut self, data: &[u8]) -> Result<usize> {
        self.stream.write(data).map_err(GemError::Io)
    }

    fn close(&mut self) -> Result<()> {
        self.stream
            .shutdown(std::net::Shutdown::Both)
            .or_else(|e| match e.kind() {
                // Already gone; closing is best-effort.
                std::io::ErrorKind::NotConnected => Ok(()),
                _ => Err(GemError::Io(e)),
            })
    }
}
