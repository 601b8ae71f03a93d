//! The byte-stream boundary between the protocol handlers and whatever
//! carries the session. Handlers only ever see [`ProtocolStream`]; the
//! listener wraps sockets in the JSON-lines framing, and tests use the
//! in-memory loopback pair.

use std::io::{Read, Write};
use std::sync::mpsc;

use crate::error::TransportError;
use crate::message::Envelope;

/// One bidirectional, totally ordered message stream. `receive` blocks
/// until the next client message arrives; `send` may block on flow
/// control. Both fail with [`TransportError`] once the peer is gone.
pub trait ProtocolStream {
    fn send(&mut self, msg: &Envelope) -> Result<(), TransportError>;
    fn receive(&mut self) -> Result<Envelope, TransportError>;
}

/// Newline-delimited JSON framing over any `Read + Write` transport
/// (plain TCP or a TLS stream).
pub struct JsonStream<S> {
    stream: S,
    buf: Vec<u8>,
}

impl<S> JsonStream<S> {
    pub fn new(stream: S) -> JsonStream<S> {
        JsonStream {
            stream,
            buf: Vec::new(),
        }
    }
}

impl<S: Read + Write> ProtocolStream for JsonStream<S> {
    fn send(&mut self, msg: &Envelope) -> Result<(), TransportError> {
        let mut frame = serde_json::to_vec(msg)?;
        frame.push(b'\n');
        self.stream.write_all(&frame)?;
        self.stream.flush()?;
        Ok(())
    }

    fn receive(&mut self) -> Result<Envelope, TransportError> {
        loop {
            if let Some(end) = self.buf.iter().position(|&b| b == b'\n') {
                let frame: Vec<u8> = self.buf.drain(..=end).collect();
                return Ok(serde_json::from_slice(&frame[..end])?);
            }
            let mut chunk = [0_u8; 4096];
            let n = self.stream.read(&mut chunk)?;
            if n == 0 {
                return Err(TransportError::Closed);
            }
            self.buf.extend_from_slice(&chunk[..n]);
        }
    }
}

/// An in-memory stream pair: what one end sends, the other receives.
/// Mirrors the generate-then-check testing strategy — a test thread plays
/// the client against a handler without any socket.
pub fn loopback() -> (LoopbackStream, LoopbackStream) {
    let (near_tx, far_rx) = mpsc::channel();
    let (far_tx, near_rx) = mpsc::channel();
    (
        LoopbackStream {
            tx: near_tx,
            rx: near_rx,
        },
        LoopbackStream {
            tx: far_tx,
            rx: far_rx,
        },
    )
}

pub struct LoopbackStream {
    tx: mpsc::Sender<Envelope>,
    rx: mpsc::Receiver<Envelope>,
}

impl ProtocolStream for LoopbackStream {
    fn send(&mut self, msg: &Envelope) -> Result<(), TransportError> {
        self.tx.send(msg.clone()).map_err(|_| TransportError::Closed)
    }

    fn receive(&mut self) -> Result<Envelope, TransportError> {
        self.rx.recv().map_err(|_| TransportError::Closed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::message::{BigIntData, Content};
    use std::io::Cursor;

    fn sample(x1: Vec<u8>) -> Envelope {
        Envelope::new(Content::BigInt(BigIntData { x1 }))
    }

    #[test]
    fn json_stream_round_trip() {
        let mut stream = JsonStream::new(Cursor::new(Vec::new()));
        stream.send(&sample(vec![7])).unwrap();
        stream.send(&sample(vec![8, 9])).unwrap();

        stream.stream.set_position(0);
        let first = stream.receive().unwrap();
        let second = stream.receive().unwrap();
        match (first.content, second.content) {
            (Content::BigInt(a), Content::BigInt(b)) => {
                assert_eq!(a.x1, vec![7]);
                assert_eq!(b.x1, vec![8, 9]);
            }
            other => panic!("wrong variants: {:?}", other),
        }
    }

    #[test]
    fn json_stream_reports_eof_as_closed() {
        let mut stream = JsonStream::new(Cursor::new(Vec::new()));
        match stream.receive() {
            Err(TransportError::Closed) => {}
            other => panic!("expected Closed, got {:?}", other.map(|_| ())),
        }
    }

    #[test]
    fn loopback_delivers_in_order() {
        let (mut near, mut far) = loopback();
        near.send(&sample(vec![1])).unwrap();
        near.send(&sample(vec![2])).unwrap();
        match far.receive().unwrap().content {
            Content::BigInt(data) => assert_eq!(data.x1, vec![1]),
            other => panic!("wrong variant: {:?}", other),
        }
        match far.receive().unwrap().content {
            Content::BigInt(data) => assert_eq!(data.x1, vec![2]),
            other => panic!("wrong variant: {:?}", other),
        }
    }

    #[test]
    fn loopback_closed_when_peer_dropped() {
        let (mut near, far) = loopback();
        drop(far);
        assert!(near.send(&sample(vec![1])).is_err());
    }
}
