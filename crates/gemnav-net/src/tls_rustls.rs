//! [`TlsProvider`] backed by rustls + ring, with certificate
//! validation disabled.
//!
//! Gemini capsules overwhelmingly present self-signed certificates;
//! the community convention is to accept them rather than validate
//! against a CA root store. The verifier below therefore accepts any
//! certificate while keeping the handshake signature checks intact.
//! Callers must not assume server authenticity.

use std::io::{self, Read, Write};
use std::sync::Arc;

use rustls::client::danger::{HandshakeSignatureValid, ServerCertVerified, ServerCertVerifier};
use rustls::crypto::CryptoProvider;
use rustls::pki_types::{CertificateDer, ServerName, UnixTime};
use rustls::{ClientConfig, ClientConnection, DigitallySignedStruct, SignatureScheme};

use gemnav_types::backend::NetworkStream;
use gemnav_types::error::{GemError, Result};

use crate::tls::TlsProvider;

/// Shared, reusable TLS client configuration (one per process).
pub struct GeminiTlsProvider {
    config: Arc<ClientConfig>,
}

impl GeminiTlsProvider {
    /// Build a provider that accepts any server certificate.
    pub fn new() -> Self {
        let provider = Arc::new(rustls::crypto::ring::default_provider());
        let verifier = AcceptAnyServerCert::new(Arc::clone(&provider));

        let config = ClientConfig::builder()
            .dangerous()
            .with_custom_certificate_verifier(Arc::new(verifier))
            .with_no_client_auth();

        Self {
            config: Arc::new(config),
        }
    }
}

impl Default for GeminiTlsProvider {
    fn default() -> Self {
        Self::new()
    }
}

impl TlsProvider for GeminiTlsProvider {
    fn connect_tls(
        &self,
        stream: Box<dyn NetworkStream>,
        server_name: &str,
    ) -> Result<Box<dyn NetworkStream>> {
        let sni = ServerName::try_from(server_name.to_owned())
            .map_err(|e| GemError::Network(format!("invalid server name: {e}")))?;

        let conn = ClientConnection::new(Arc::clone(&self.config), sni)
            .map_err(|e| GemError::Network(format!("TLS init: {e}")))?;

        let stream = RustlsStream::handshake(conn, stream)?;
        Ok(Box::new(stream))
    }
}

// ---------------------------------------------------------------------------
// Certificate verifier
// ---------------------------------------------------------------------------

/// A [`ServerCertVerifier`] that accepts every certificate.
///
/// Handshake signatures are still verified against the presented
/// certificate; only the chain/identity check is skipped.
#[derive(Debug)]
struct AcceptAnyServerCert {
    provider: Arc<CryptoProvider>,
}

impl AcceptAnyServerCert {
    fn new(provider: Arc<CryptoProvider>) -> Self {
        Self { provider }
    }
}

impl ServerCertVerifier for AcceptAnyServerCert {
    fn verify_server_cert(
        &self,
        _end_entity: &CertificateDer<'_>,
        _intermediates: &[CertificateDer<'_>],
        _server_name: &ServerName<'_>,
        _ocsp_response: &[u8],
        _now: UnixTime,
    ) -> std::result::Result<ServerCertVerified, rustls::Error> {
        Ok(ServerCertVerified::assertion())
    }

    fn verify_tls12_signature(
        &self,
        message: &[u8],
        cert: &CertificateDer<'_>,
        dss: &DigitallySignedStruct,
    ) -> std::result::Result<HandshakeSignatureValid, rustls::Error> {
        rustls::crypto::verify_tls12_signature(
            message,
            cert,
            dss,
            &self.provider.signature_verification_algorithms,
        )
    }

    fn verify_tls13_signature(
        &self,
        message: &[u8],
        cert: &CertificateDer<'_>,
        dss: &DigitallySignedStruct,
    ) -> std::result::Result<HandshakeSignatureValid, rustls::Error> {
        rustls::crypto::verify_tls13_signature(
            message,
            cert,
            dss,
            &self.provider.signature_verification_algorithms,
        )
    }

    fn supported_verify_schemes(&self) -> Vec<SignatureScheme> {
        self.provider
            .signature_verification_algorithms
            .supported_schemes()
    }
}

// ---------------------------------------------------------------------------
// Adapter: bridge rustls's `Read`/`Write` to our `NetworkStream` trait
// ---------------------------------------------------------------------------

/// A TLS-wrapped network stream over a blocking socket.
///
/// [`rustls::ClientConnection`] does the crypto; raw I/O is delegated
/// to the inner [`NetworkStream`]. `read` returns `Ok(0)` once the
/// peer has closed, with or without a TLS close_notify -- Gemini
/// servers routinely just drop the connection after the body.
struct RustlsStream {
    tls: ClientConnection,
    inner: Box<dyn NetworkStream>,
    /// Data decrypted by rustls but not yet consumed by the caller.
    plaintext_buf: Vec<u8>,
    peer_closed: bool,
}

impl RustlsStream {
    /// Drive the handshake to completion on a blocking stream.
    fn handshake(mut tls: ClientConnection, mut inner: Box<dyn NetworkStream>) -> Result<Self> {
        let mut adapter = IoAdapter::new(&mut *inner);
        while tls.is_handshaking() {
            if tls.wants_write() {
                tls.write_tls(&mut adapter)
                    .map_err(|e| GemError::Network(format!("TLS handshake write: {e}")))?;
            }
            if tls.is_handshaking() && tls.wants_read() {
                let n = tls
                    .read_tls(&mut adapter)
                    .map_err(|e| GemError::Network(format!("TLS handshake read: {e}")))?;
                if n == 0 {
                    return Err(GemError::Network(
                        "connection closed during TLS handshake".to_string(),
                    ));
                }
                tls.process_new_packets()
                    .map_err(|e| GemError::Network(format!("TLS handshake: {e}")))?;
            }
        }
        // Flush any remaining handshake bytes (e.g. the client Finished).
        while tls.wants_write() {
            tls.write_tls(&mut adapter)
                .map_err(|e| GemError::Network(format!("TLS handshake flush: {e}")))?;
        }

        Ok(Self {
            tls,
            inner,
            plaintext_buf: Vec::new(),
            peer_closed: false,
        })
    }

    /// Pull ciphertext from the network, decrypt, and append the
    /// plaintext to `self.plaintext_buf`. Sets `peer_closed` at EOF.
    fn pull_plaintext(&mut self) -> Result<()> {
        let mut adapter = IoAdapter::new(&mut *self.inner);
        match self.tls.read_tls(&mut adapter) {
            Ok(0) => {
                self.peer_closed = true;
                return Ok(());
            },
            Ok(_) => {},
            // Keep the io kind (timeouts matter to the transport).
            Err(e) => return Err(GemError::Io(e)),
        }

        let state = self
            .tls
            .process_new_packets()
            .map_err(|e| GemError::Network(format!("TLS processing: {e}")))?;

        let mut tmp = [0u8; 8192];
        loop {
            match self.tls.reader().read(&mut tmp) {
                Ok(0) => {
                    self.peer_closed = true;
                    break;
                },
                Ok(n) => self.plaintext_buf.extend_from_slice(&tmp[..n]),
                Err(ref e) if e.kind() == io::ErrorKind::WouldBlock => break,
                Err(e) => return Err(GemError::Network(format!("TLS read: {e}"))),
            }
        }

        if state.peer_has_closed() {
            self.peer_closed = true;
        }
        Ok(())
    }
}

impl NetworkStream for RustlsStream {
    fn read(&mut self, buf: &mut [u8]) -> Result<usize> {
        loop {
            if !self.plaintext_buf.is_empty() {
                let n = buf.len().min(self.plaintext_buf.len());
                buf[..n].copy_from_slice(&self.plaintext_buf[..n]);
                self.plaintext_buf.drain(..n);
                return Ok(n);
            }
            if self.peer_closed {
                return Ok(0);
            }
            self.pull_plaintext()?;
        }
    }

    fn write(&mut self, data: &[u8]) -> Result<usize> {
        let n = self
            .tls
            .writer()
            .write(data)
            .map_err(|e| GemError::Network(format!("TLS write: {e}")))?;

        let mut adapter = IoAdapter::new(&mut *self.inner);
        while self.tls.wants_write() {
            self.tls
                .write_tls(&mut adapter)
                .map_err(|e| GemError::Network(format!("TLS write flush: {e}")))?;
        }
        Ok(n)
    }

    fn close(&mut self) -> Result<()> {
        self.tls.send_close_notify();
        let mut adapter = IoAdapter::new(&mut *self.inner);
        let _ = self.tls.write_tls(&mut adapter);
        self.inner.close()
    }
}

/// Lets rustls call `std::io::Read` / `Write` on a
/// `&mut dyn NetworkStream`.
struct IoAdapter<'a> {
    inner: &'a mut dyn NetworkStream,
}

impl<'a> IoAdapter<'a> {
    fn new(inner: &'a mut dyn NetworkStream) -> Self {
        Self { inner }
    }
}

impl Read for IoAdapter<'_> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        self.inner.read(buf).map_err(gem_err_to_io)
    }
}

impl Write for IoAdapter<'_> {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.inner.write(buf).map_err(gem_err_to_io)
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

/// Convert a [`GemError`] to [`io::Error`], preserving the original
/// `io::Error` (and its kind) when the variant is `GemError::Io`.
fn gem_err_to_io(e: GemError) -> io::Error {
    match e {
        GemError::Io(io_err) => io_err,
        other => io::Error::other(other.to_string()),
    }
}
