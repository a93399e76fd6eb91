use std::io::{self, ErrorKind};
use std::net::TcpStream;

use tungstenite::WebSocket;
use tungstenite::protocol::Message;

use crate::reload::registry::{Incoming, ObserverSink};

/// Non-blocking WebSocket transport of one observer.
pub struct WsSink {
    ws: WebSocket<TcpStream>,
}

impl WsSink {
    /// Wrap a handshaken socket and switch it to non-blocking mode.
    pub fn new(ws: WebSocket<TcpStream>) -> Self {
        let _ = ws.get_ref().set_nonblocking(true);
        Self { ws }
    }
}

fn would_block(e: &tungstenite::Error) -> bool {
    matches!(e, tungstenite::Error::Io(io) if io.kind() == ErrorKind::WouldBlock)
}

impl ObserverSink for WsSink {
    fn send_text(&mut self, text: &str) -> io::Result<()> {
        match self.ws.send(Message::Text(text.to_owned().into())) {
            Ok(()) => Ok(()),
            // Frame stays queued and is flushed on the next write.
            Err(ref e) if would_block(e) => Ok(()),
            Err(e) => Err(io::Error::other(e)),
        }
    }

    fn poll(&mut self) -> Incoming {
        match self.ws.read() {
            Ok(Message::Text(text)) => Incoming::Text(text.as_str().to_owned()),
            Ok(Message::Close(_)) => Incoming::Closed,
            Ok(_) => Incoming::Idle,
            Err(ref e) if would_block(e) => Incoming::Idle,
            Err(_) => Incoming::Closed,
        }
    }

    fn close(&mut self) {
        let _ = self.ws.close(None);
        let _ = self.ws.flush();
    }
}
