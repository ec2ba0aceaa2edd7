//! Socket bridge to the remote trainer
//!
//! The trainer hosts a WebSocket server; we connect as the single outstanding
//! client. A dedicated bridge thread alternates between draining the outbound
//! queue and reading with a short timeout, so neither direction can starve
//! the other. Parsed messages cross to the simulation thread over plain mpsc
//! queues; malformed payloads are validated away at this boundary.

pub mod protocol;

use std::io::ErrorKind;
use std::net::TcpStream;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::{channel, Receiver, Sender, TryRecvError};
use std::sync::Arc;
use std::thread::JoinHandle;
use std::time::Duration;

use thiserror::Error;
use tungstenite::stream::MaybeTlsStream;
use tungstenite::{Message, WebSocket};

use protocol::{Inbound, Outbound};

/// Socket poll granularity; bounds outbound latency while reads are idle
const POLL_TIMEOUT: Duration = Duration::from_millis(20);

#[derive(Debug, Error)]
pub enum BridgeError {
    #[error("websocket error: {0}")]
    Socket(#[from] Box<tungstenite::Error>),
    #[error("failed to serialize outbound message: {0}")]
    Serialize(#[from] serde_json::Error),
    #[error("trainer connection closed")]
    Disconnected,
}

/// Single duplex trainer connection
pub struct SocketBridge {
    inbound: Receiver<Inbound>,
    outbound: Sender<String>,
    shutdown: Arc<AtomicBool>,
    worker: Option<JoinHandle<()>>,
}

impl SocketBridge {
    /// Connect to the trainer's WebSocket server and start the poll thread
    pub fn connect(url: &str) -> Result<Self, BridgeError> {
        let (socket, _response) = tungstenite::connect(url).map_err(Box::new)?;
        if let MaybeTlsStream::Plain(stream) = socket.get_ref() {
            // Timeouts turn the blocking read into a poll step
            let _ = stream.set_read_timeout(Some(POLL_TIMEOUT));
        }
        log::info!("Trainer socket connected: {url}");

        let (in_tx, in_rx) = channel();
        let (out_tx, out_rx) = channel::<String>();
        let shutdown = Arc::new(AtomicBool::new(false));
        let stop = shutdown.clone();

        let worker = std::thread::Builder::new()
            .name("trainer-bridge".to_string())
            .spawn(move || poll_loop(socket, in_tx, out_rx, stop))
            .map_err(|e| BridgeError::Socket(Box::new(tungstenite::Error::Io(e))))?;

        Ok(Self {
            inbound: in_rx,
            outbound: out_tx,
            shutdown,
            worker: Some(worker),
        })
    }

    /// Non-blocking pull of the next trainer message
    pub fn try_recv(&self) -> Option<Inbound> {
        match self.inbound.try_recv() {
            Ok(msg) => Some(msg),
            Err(TryRecvError::Empty) => None,
            Err(TryRecvError::Disconnected) => None,
        }
    }

    /// Blocking pull, used when the caller's pacing is trainer-driven
    pub fn recv(&self) -> Result<Inbound, BridgeError> {
        self.inbound.recv().map_err(|_| BridgeError::Disconnected)
    }

    /// Queue one outbound message for the poll thread to deliver
    pub fn send(&self, msg: &Outbound) -> Result<(), BridgeError> {
        let text = serde_json::to_string(msg)?;
        self.outbound
            .send(text)
            .map_err(|_| BridgeError::Disconnected)
    }
}

impl Drop for SocketBridge {
    fn drop(&mut self) {
        self.shutdown.store(true, Ordering::Relaxed);
        if let Some(worker) = self.worker.take() {
            let _ = worker.join();
        }
    }
}

fn poll_loop(
    mut socket: WebSocket<MaybeTlsStream<TcpStream>>,
    in_tx: Sender<Inbound>,
    out_rx: Receiver<String>,
    shutdown: Arc<AtomicBool>,
) {
    loop {
        if shutdown.load(Ordering::Relaxed) {
            let _ = socket.close(None);
            break;
        }

        // Flush everything queued for the trainer first
        let mut write_failed = false;
        while let Ok(text) = out_rx.try_recv() {
            if let Err(e) = socket.send(Message::Text(text)) {
                log::error!("Trainer socket write failed: {e}");
                write_failed = true;
                break;
            }
        }
        if write_failed {
            break;
        }

        match socket.read() {
            Ok(Message::Text(text)) => match serde_json::from_str::<Inbound>(&text) {
                Ok(msg) => {
                    if in_tx.send(msg).is_err() {
                        break;
                    }
                }
                // Validation boundary: drop rather than poison the pipeline
                Err(e) => log::warn!("Dropping malformed trainer message: {e}"),
            },
            Ok(Message::Close(_)) => {
                log::info!("Trainer closed the socket");
                break;
            }
            Ok(_) => {}
            Err(tungstenite::Error::Io(e))
                if e.kind() == ErrorKind::WouldBlock || e.kind() == ErrorKind::TimedOut =>
            {
                // Idle read window; loop back to service the outbound queue
            }
            Err(e) => {
                log::error!("Trainer socket read failed: {e}");
                break;
            }
        }
    }
}
