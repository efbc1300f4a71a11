//! Blocking TCP client for the trace collector.
//!
//! # Responsibilities
//! - Resolve the collector address once and reuse the result until a connect fails
//! - Connect lazily on the first send
//! - Bound every call with connect and write timeouts, the address lookup included
//! - Notice a connection the collector has closed before writing to it
//! - Drop the connection on failure and hold off reconnecting for a backoff window
//!
//! # Design Decisions
//! - Blocking I/O: recorders run inline on broker threads, there is no executor here
//! - One mutex serializes sends, so records are never interleaved on the wire
//! - No buffering; a record that cannot be written is reported and dropped
//! - Lookups run on a helper thread and are waited on for at most `connect_timeout`;
//!   a lookup that is still running is picked up by the next attempt, never restarted

use std::io::{self, Write};
use std::net::{Shutdown, SocketAddr, TcpStream, ToSocketAddrs};
use std::sync::mpsc::{self, Receiver, RecvTimeoutError};
use std::sync::{Arc, Mutex, PoisonError};
use std::thread;
use std::time::{Duration, Instant};

use crate::config::TracerConfig;
use crate::resilience::backoff::ReconnectBackoff;
use crate::transport::{LogRecord, Transport, TransportError};

/// Turns a `host:port` string into socket addresses.
pub type Resolver = Arc<dyn Fn(&str) -> io::Result<Vec<SocketAddr>> + Send + Sync>;

/// Resolver backed by the system's name service.
pub fn system_resolver() -> Resolver {
    Arc::new(|addr: &str| -> io::Result<Vec<SocketAddr>> {
        addr.to_socket_addrs().map(Iterator::collect)
    })
}

type LookupResult = io::Result<Vec<SocketAddr>>;

enum Lookup {
    Idle,
    Pending(Receiver<LookupResult>),
    Resolved(Vec<SocketAddr>),
}

struct ClientState {
    stream: Option<TcpStream>,
    lookup: Lookup,
    backoff: ReconnectBackoff,
    stopped: bool,
}

/// Connection to a trace collector speaking newline-delimited JSON.
pub struct CollectorClient {
    addr: String,
    app: String,
    connect_timeout: Duration,
    write_timeout: Duration,
    /// Set when `addr` is an IP literal; it never needs a lookup.
    literal: bool,
    resolver: Resolver,
    state: Mutex<ClientState>,
}

impl CollectorClient {
    /// Create a client for `addr` using the transport settings in `config`.
    ///
    /// No connection is made until the first send.
    pub fn new(addr: impl Into<String>, config: &TracerConfig) -> Self {
        Self::with_resolver(addr, config, system_resolver())
    }

    /// Like [`CollectorClient::new`], resolving host names through `resolver`.
    pub fn with_resolver(addr: impl Into<String>, config: &TracerConfig, resolver: Resolver) -> Self {
        let addr = addr.into().trim().to_string();
        let (literal, lookup) = match addr.parse::<SocketAddr>() {
            Ok(socket_addr) => (true, Lookup::Resolved(vec![socket_addr])),
            Err(_) => (false, Lookup::Idle),
        };

        Self {
            addr,
            app: config.app.clone(),
            connect_timeout: config.connect_timeout(),
            write_timeout: config.write_timeout(),
            literal,
            resolver,
            state: Mutex::new(ClientState {
                stream: None,
                lookup,
                backoff: ReconnectBackoff::new(
                    Duration::from_millis(config.reconnect_base_delay_ms),
                    Duration::from_millis(config.reconnect_max_delay_ms),
                ),
                stopped: false,
            }),
        }
    }

    /// Client for `addr` with default transport settings.
    pub fn with_addr(addr: impl Into<String>) -> Self {
        Self::new(addr, &TracerConfig::default())
    }

    pub fn addr(&self) -> &str {
        &self.addr
    }

    pub fn connect_timeout(&self) -> Duration {
        self.connect_timeout
    }

    pub fn write_timeout(&self) -> Duration {
        self.write_timeout
    }

    /// True while a connection is open.
    pub fn is_connected(&self) -> bool {
        self.lock_state().stream.is_some()
    }

    /// True once the collector address has been resolved and not invalidated since.
    pub fn is_resolved(&self) -> bool {
        matches!(self.lock_state().lookup, Lookup::Resolved(_))
    }

    fn lock_state(&self) -> std::sync::MutexGuard<'_, ClientState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn spawn_lookup(&self) -> Result<Receiver<LookupResult>, TransportError> {
        let (tx, rx) = mpsc::channel();
        let resolver = Arc::clone(&self.resolver);
        let addr = self.addr.clone();

        thread::Builder::new()
            .name("msgtracer-resolve".to_string())
            .spawn(move || {
                let _ = tx.send(resolver(&addr));
            })
            .map_err(|source| TransportError::Resolve {
                addr: self.addr.clone(),
                source,
            })?;

        Ok(rx)
    }

    /// Collector addresses, from the cache or a lookup bounded by `connect_timeout`.
    fn resolve(&self, state: &mut ClientState) -> Result<Vec<SocketAddr>, TransportError> {
        let rx = match std::mem::replace(&mut state.lookup, Lookup::Idle) {
            Lookup::Resolved(addrs) => {
                state.lookup = Lookup::Resolved(addrs.clone());
                return Ok(addrs);
            }
            Lookup::Pending(rx) => rx,
            Lookup::Idle => self.spawn_lookup()?,
        };

        let invalid = |source: io::Error| TransportError::InvalidAddress {
            addr: self.addr.clone(),
            source,
        };

        match rx.recv_timeout(self.connect_timeout) {
            Ok(Ok(addrs)) if !addrs.is_empty() => {
                tracing::debug!(collector = %self.addr, resolved = addrs.len(), "Resolved trace collector");
                state.lookup = Lookup::Resolved(addrs.clone());
                Ok(addrs)
            }
            Ok(Ok(_)) => Err(invalid(io::Error::new(
                io::ErrorKind::NotFound,
                "address resolved to nothing",
            ))),
            Ok(Err(source)) => Err(invalid(source)),
            Err(RecvTimeoutError::Timeout) => {
                state.lookup = Lookup::Pending(rx);
                Err(TransportError::Resolve {
                    addr: self.addr.clone(),
                    source: io::Error::new(
                        io::ErrorKind::TimedOut,
                        format!("lookup still running after {:?}", self.connect_timeout),
                    ),
                })
            }
            Err(RecvTimeoutError::Disconnected) => Err(TransportError::Resolve {
                addr: self.addr.clone(),
                source: io::Error::new(io::ErrorKind::Other, "resolver exited without an answer"),
            }),
        }
    }

    fn connect(&self, addrs: &[SocketAddr]) -> Result<TcpStream, TransportError> {
        let mut last_err = None;
        for addr in addrs {
            match TcpStream::connect_timeout(addr, self.connect_timeout) {
                Ok(stream) => {
                    stream
                        .set_write_timeout(Some(self.write_timeout))
                        .map_err(|source| TransportError::Connect {
                            addr: self.addr.clone(),
                            source,
                        })?;
                    let _ = stream.set_nodelay(true);
                    tracing::debug!(collector = %self.addr, peer = %addr, "Connected to trace collector");
                    return Ok(stream);
                }
                Err(e) => last_err = Some(e),
            }
        }

        Err(TransportError::Connect {
            addr: self.addr.clone(),
            source: last_err.unwrap_or_else(|| {
                io::Error::new(io::ErrorKind::NotFound, "address resolved to nothing")
            }),
        })
    }

    /// Resolve and connect. A failed connect forgets the lookup so the next
    /// attempt resolves again.
    fn open(&self, state: &mut ClientState) -> Result<TcpStream, TransportError> {
        let addrs = self.resolve(state)?;
        match self.connect(&addrs) {
            Ok(stream) => Ok(stream),
            Err(e) => {
                if !self.literal {
                    state.lookup = Lookup::Idle;
                }
                Err(e)
            }
        }
    }
}

/// True if the collector has closed or reset `stream`.
///
/// The collector never writes, so a readable socket means end of stream or an error.
fn peer_closed(stream: &TcpStream) -> bool {
    if stream.set_nonblocking(true).is_err() {
        return true;
    }
    let mut buf = [0u8; 1];
    let closed = match stream.peek(&mut buf) {
        Ok(0) => true,
        Ok(_) => false,
        Err(e) if e.kind() == io::ErrorKind::WouldBlock => false,
        Err(_) => true,
    };
    stream.set_nonblocking(false).is_err() || closed
}

impl Transport for CollectorClient {
    fn app(&self) -> &str {
        &self.app
    }

    /// Resolve the collector address ahead of the first send.
    fn start(&self) {
        let mut guard = self.lock_state();
        if guard.stopped {
            return;
        }
        if let Err(e) = self.resolve(&mut guard) {
            tracing::debug!(collector = %self.addr, error = %e, "Collector lookup at startup failed");
        }
    }

    fn send(&self, record: &LogRecord<'_>) -> Result<(), TransportError> {
        let line = record.encode_line()?;

        let mut guard = self.lock_state();
        let state = &mut *guard;
        if state.stopped {
            return Err(TransportError::Stopped);
        }

        let reusable = match state.stream.take() {
            Some(stream) if peer_closed(&stream) => {
                let _ = stream.shutdown(Shutdown::Both);
                tracing::debug!(collector = %self.addr, "Collector closed the connection");
                None
            }
            other => other,
        };

        let mut stream = match reusable {
            Some(stream) => stream,
            None => {
                if let Some(retry_in) = state.backoff.remaining(Instant::now()) {
                    return Err(TransportError::Backoff { retry_in });
                }
                match self.open(state) {
                    Ok(stream) => stream,
                    Err(e) => {
                        let delay = state.backoff.on_failure(Instant::now());
                        tracing::debug!(collector = %self.addr, retry_in = ?delay, "Collector connect failed");
                        return Err(e);
                    }
                }
            }
        };

        match stream.write_all(&line) {
            Ok(()) => {
                state.backoff.on_success();
                state.stream = Some(stream);
                Ok(())
            }
            Err(source) => {
                let _ = stream.shutdown(Shutdown::Both);
                let delay = state.backoff.on_failure(Instant::now());
                tracing::debug!(collector = %self.addr, retry_in = ?delay, "Collector connection dropped");
                Err(TransportError::Write {
                    addr: self.addr.clone(),
                    source,
                })
            }
        }
    }

    fn stop(&self) {
        let mut state = self.lock_state();
        state.stopped = true;
        state.lookup = Lookup::Idle;
        if let Some(stream) = state.stream.take() {
            let _ = stream.shutdown(Shutdown::Both);
            tracing::debug!(collector = %self.addr, "Trace collector connection closed");
        }
    }
}
