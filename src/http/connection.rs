use std::net::SocketAddr;
use std::sync::Arc;

use bytes::{Buf, BytesMut};
use tokio::io::AsyncReadExt;
use tokio::net::TcpStream;

use crate::config::Config;
use crate::http::parser::{parse_request, ParseError};
use crate::http::request::Request;
use crate::http::response::Response;
use crate::http::writer::ResponseWriter;
use crate::serve::router::Router;

pub struct Connection {
    stream: TcpStream,
    peer: SocketAddr,
    buffer: BytesMut,
    state: ConnectionState,
    router: Router,
}

pub enum ConnectionState {
    Reading,
    Processing(Request),
    Writing(ResponseWriter, bool), // bool = keep_alive?
    Closed,
}

impl Connection {
    pub fn new(stream: TcpStream, peer: SocketAddr, config: Arc<Config>) -> Self {
        Self {
            stream,
            peer,
            buffer: BytesMut::with_capacity(4096),
            state: ConnectionState::Reading,
            router: Router::new(config),
        }
    }

    /// Drives the connection until it closes.
    ///
    /// One request is in flight at a time: the next request is not parsed
    /// until the current response has been fully written. Peer resets and
    /// broken pipes are swallowed (debug-logged); anything else surfaces
    /// to the listener's per-connection task.
    pub async fn run(&mut self) -> anyhow::Result<()> {
        loop {
            match &mut self.state {
                ConnectionState::Reading => {
                    match self.read_request().await {
                        Ok(Some(req)) => {
                            self.state = ConnectionState::Processing(req);
                        }
                        Ok(None) => {
                            self.state = ConnectionState::Closed;
                        }
                        Err(ReadError::Malformed(e)) => {
                            tracing::debug!("Malformed request from {}: {:?}", self.peer, e);
                            let writer =
                                ResponseWriter::new(&Response::error(400), false);
                            self.state = ConnectionState::Writing(writer, false);
                        }
                        Err(ReadError::Io(e)) if is_benign_disconnect(&e) => {
                            tracing::debug!("Peer {} disconnected: {}", self.peer, e);
                            self.state = ConnectionState::Closed;
                        }
                        Err(ReadError::Io(e)) => return Err(e.into()),
                    }
                }

                ConnectionState::Processing(req) => {
                    let response = self.router.route(req).await;
                    let keep_alive = req.keep_alive();

                    let writer = ResponseWriter::new(&response, keep_alive);
                    self.state = ConnectionState::Writing(writer, keep_alive);
                }

                ConnectionState::Writing(writer, keep_alive) => {
                    match writer.write_to_stream(&mut self.stream).await {
                        Ok(()) => {
                            if *keep_alive {
                                // Reset for the next request on the same
                                // socket; the buffer tail is kept.
                                self.state = ConnectionState::Reading;
                            } else {
                                self.state = ConnectionState::Closed;
                            }
                        }
                        Err(e) => {
                            match e.downcast_ref::<std::io::Error>() {
                                Some(io_err) if is_benign_disconnect(io_err) => {
                                    tracing::debug!(
                                        "Peer {} disconnected mid-response: {}",
                                        self.peer,
                                        io_err
                                    );
                                    self.state = ConnectionState::Closed;
                                }
                                _ => return Err(e),
                            }
                        }
                    }
                }

                ConnectionState::Closed => {
                    break;
                }
            }
        }

        Ok(())
    }

    async fn read_request(&mut self) -> Result<Option<Request>, ReadError> {
        loop {
            // Try parsing whatever we already have
            match parse_request(&self.buffer, self.peer) {
                Ok((request, consumed)) => {
                    // Remove consumed bytes
                    self.buffer.advance(consumed);
                    return Ok(Some(request));
                }

                Err(ParseError::Incomplete) => {
                    // Need more data → fall through to read
                }

                Err(e) => {
                    return Err(ReadError::Malformed(e));
                }
            }

            // Read more data
            let mut temp = [0u8; 1024];
            let n = self
                .stream
                .read(&mut temp)
                .await
                .map_err(ReadError::Io)?;

            if n == 0 {
                // Client closed connection
                return Ok(None);
            }

            self.buffer.extend_from_slice(&temp[..n]);
        }
    }
}

enum ReadError {
    Malformed(ParseError),
    Io(std::io::Error),
}

fn is_benign_disconnect(e: &std::io::Error) -> bool {
    matches!(
        e.kind(),
        std::io::ErrorKind::ConnectionReset | std::io::ErrorKind::BrokenPipe
    )
}
