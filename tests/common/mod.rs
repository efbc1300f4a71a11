//! Shared utilities for integration tests.

use std::io;
use std::net::SocketAddr;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use msg_tracer::transport::LogRecord;
use msg_tracer::{Transport, TransportError};
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::net::TcpListener;
use tokio::sync::mpsc;
use tracing::Dispatch;
use tracing_subscriber::fmt::MakeWriter;
use tracing_subscriber::EnvFilter;

/// In-memory sink for formatted log output.
#[derive(Clone, Default)]
pub struct LogBuffer(Arc<Mutex<Vec<u8>>>);

#[allow(dead_code)]
impl LogBuffer {
    pub fn contents(&self) -> String {
        String::from_utf8(self.0.lock().unwrap().clone()).unwrap()
    }

    pub fn lines(&self) -> Vec<String> {
        self.contents().lines().map(str::to_string).collect()
    }

    /// Local trace records.
    pub fn trace_lines(&self) -> Vec<String> {
        self.lines()
            .into_iter()
            .filter(|l| l.contains("[TRACE]"))
            .collect()
    }

    pub fn warn_lines(&self) -> Vec<String> {
        self.lines()
            .into_iter()
            .filter(|l| l.contains(" WARN "))
            .collect()
    }
}

impl io::Write for LogBuffer {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.lock().unwrap().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

impl<'a> MakeWriter<'a> for LogBuffer {
    type Writer = LogBuffer;

    fn make_writer(&'a self) -> Self::Writer {
        self.clone()
    }
}

/// A dispatcher that renders into a buffer, filtered by `directive`.
pub fn capture_dispatch(directive: &str) -> (Dispatch, LogBuffer) {
    let buffer = LogBuffer::default();
    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(directive))
        .with_writer(buffer.clone())
        .with_ansi(false)
        .finish();
    (Dispatch::new(subscriber), buffer)
}

/// Run `f` on this thread with logs captured under `directive`.
#[allow(dead_code)]
pub fn capture_logs<F: FnOnce()>(directive: &str, f: F) -> LogBuffer {
    let (dispatch, buffer) = capture_dispatch(directive);
    tracing::dispatcher::with_default(&dispatch, f);
    buffer
}

/// Replace the recording timestamp so lines from separate calls compare equal.
#[allow(dead_code)]
pub fn normalize(line: &str) -> String {
    let body = line.split_once("[TRACE]").map_or(line, |(_, rest)| rest);
    let Some(start) = body.find("at time ") else {
        return body.to_string();
    };
    let digits_from = start + "at time ".len();
    let digits_len = body[digits_from..]
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(body.len() - digits_from);
    format!("{}<ts>{}", &body[..digits_from], &body[digits_from + digits_len..])
}

/// Transport that records what it is asked to send, or fails on demand.
#[allow(dead_code)]
#[derive(Default)]
pub struct ScriptedTransport {
    failing: AtomicBool,
    sent: Mutex<Vec<serde_json::Value>>,
    stops: AtomicUsize,
}

#[allow(dead_code)]
impl ScriptedTransport {
    pub fn failing() -> Self {
        let transport = Self::default();
        transport.set_failing(true);
        transport
    }

    pub fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }

    pub fn sent(&self) -> Vec<serde_json::Value> {
        self.sent.lock().unwrap().clone()
    }

    pub fn stop_count(&self) -> usize {
        self.stops.load(Ordering::SeqCst)
    }
}

impl Transport for ScriptedTransport {
    fn app(&self) -> &str {
        "test-broker"
    }

    fn send(&self, record: &LogRecord<'_>) -> Result<(), TransportError> {
        if self.failing.load(Ordering::SeqCst) {
            return Err(TransportError::Connect {
                addr: "scripted".to_string(),
                source: io::Error::new(io::ErrorKind::ConnectionRefused, "collector down"),
            });
        }
        self.sent
            .lock()
            .unwrap()
            .push(serde_json::to_value(record).unwrap());
        Ok(())
    }

    fn stop(&self) {
        self.stops.fetch_add(1, Ordering::SeqCst);
    }
}

/// Start a collector that forwards every received line to the returned channel.
#[allow(dead_code)]
pub async fn start_mock_collector() -> (SocketAddr, mpsc::UnboundedReceiver<String>) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let (tx, rx) = mpsc::unbounded_channel();

    tokio::spawn(async move {
        loop {
            match listener.accept().await {
                Ok((socket, _)) => {
                    let tx = tx.clone();
                    tokio::spawn(async move {
                        let mut lines = BufReader::new(socket).lines();
                        while let Ok(Some(line)) = lines.next_line().await {
                            if tx.send(line).is_err() {
                                break;
                            }
                        }
                    });
                }
                Err(_) => break,
            }
        }
    });

    (addr, rx)
}

/// Start a collector that reads a single line, then closes the connection and
/// stops listening before forwarding that line.
#[allow(dead_code)]
pub async fn start_one_line_collector() -> (SocketAddr, mpsc::UnboundedReceiver<String>) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let (tx, rx) = mpsc::unbounded_channel();

    tokio::spawn(async move {
        let Ok((socket, _)) = listener.accept().await else {
            return;
        };
        drop(listener);

        let mut lines = BufReader::new(socket).lines();
        let first = lines.next_line().await;
        drop(lines);
        if let Ok(Some(line)) = first {
            let _ = tx.send(line);
        }
    });

    (addr, rx)
}
