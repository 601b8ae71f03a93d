//! The thin listener: accept connections, frame them, and hand each one
//! to a session handler on its own thread. Handlers never see the socket
//! or the TLS machinery, only the stream trait.

use std::fs::File;
use std::io::{BufReader, Read, Write};
use std::net::{TcpListener, TcpStream};
use std::path::Path;
use std::sync::Arc;
use std::thread;

use thiserror::Error;
use tracing::{debug, info, warn};

use super::Server;
use crate::error::TransportError;
use crate::transport::{JsonStream, ProtocolStream};

#[derive(Debug, Error)]
pub enum TlsError {
    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Tls(#[from] rustls::Error),

    #[error("no private key found in {0}")]
    NoKey(String),
}

/// Build a TLS server configuration from PEM-encoded certificate chain
/// and private key files.
pub fn tls_config(cert: &Path, key: &Path) -> Result<Arc<rustls::ServerConfig>, TlsError> {
    let certs = rustls_pemfile::certs(&mut BufReader::new(File::open(cert)?))
        .collect::<Result<Vec<_>, _>>()?;
    let key_der = rustls_pemfile::private_key(&mut BufReader::new(File::open(key)?))?
        .ok_or_else(|| TlsError::NoKey(key.display().to_string()))?;
    let config = rustls::ServerConfig::builder()
        .with_no_client_auth()
        .with_single_cert(certs, key_der)?;
    Ok(Arc::new(config))
}

/// Accept connections forever, one session thread per connection.
/// Sessions share nothing but the read-only parameter bundle.
pub fn serve(
    server: Arc<Server>,
    port: u16,
    tls: Option<Arc<rustls::ServerConfig>>,
) -> std::io::Result<()> {
    let listener = TcpListener::bind(("0.0.0.0", port))?;
    info!(port, tls = tls.is_some(), "listening");
    for conn in listener.incoming() {
        let conn = match conn {
            Ok(conn) => conn,
            Err(err) => {
                warn!(error = %err, "accept failed");
                continue;
            }
        };
        let server = Arc::clone(&server);
        let tls = tls.clone();
        thread::spawn(move || drive_connection(&server, conn, tls));
    }
    Ok(())
}

fn drive_connection(server: &Server, conn: TcpStream, tls: Option<Arc<rustls::ServerConfig>>) {
    let peer = conn.peer_addr().ok();
    debug!(?peer, "session opened");
    let outcome = match tls {
        Some(config) => match rustls::ServerConnection::new(config) {
            Ok(tls_conn) => run_session(server, rustls::StreamOwned::new(tls_conn, conn)),
            Err(err) => {
                warn!(?peer, error = %err, "TLS setup failed");
                return;
            }
        },
        None => run_session(server, conn),
    };
    match outcome {
        Ok(()) => debug!(?peer, "session completed"),
        Err(err) => warn!(?peer, error = %err, "session aborted"),
    }
}

fn run_session<S: Read + Write>(server: &Server, stream: S) -> Result<(), TransportError> {
    let mut stream = JsonStream::new(stream);
    let initial = stream.receive()?;
    server.handle_session(initial, &mut stream)
}
