#![allow(dead_code)]

use parking_lot::Mutex;
use paypipe::config::{AppConfig, HttpConfig, JsbConfig};
use paypipe::{Envelope, Next, Plugin, Result};
use std::io::{self, Write};
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use tempfile::NamedTempFile;
use tracing_subscriber::fmt::MakeWriter;
use url::Url;

pub const SIGN_KEY: &str = "test-secret";

pub fn jsb_config(endpoint: &str) -> JsbConfig {
    JsbConfig {
        partner_id: "P0001".to_string(),
        public_key_code: "00".to_string(),
        sign_key: SIGN_KEY.to_string(),
        endpoint: Url::parse(endpoint).unwrap(),
    }
}

/// Writes a configuration file pointing the Jsb gateway at `endpoint`.
pub fn write_config(endpoint: &str) -> NamedTempFile {
    let config = AppConfig {
        jsb: jsb_config(endpoint),
        http: HttpConfig {
            timeout_secs: 2,
            connect_timeout_secs: 1,
        },
    };
    write_json(&serde_json::to_string(&config).unwrap())
}

pub fn write_json(raw: &str) -> NamedTempFile {
    let mut file = NamedTempFile::new().unwrap();
    file.write_all(raw.as_bytes()).unwrap();
    file.flush().unwrap();
    file
}

/// Shared record of which steps ran, in the order they ran.
#[derive(Clone, Default)]
pub struct Trace(Arc<Mutex<Vec<String>>>);

impl Trace {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&self, entry: impl Into<String>) {
        self.0.lock().push(entry.into());
    }

    pub fn entries(&self) -> Vec<String> {
        self.0.lock().clone()
    }
}

/// Records `name:pre` before forwarding and `name:post` after the rest of
/// the chain returns, and appends its name to the payload's `trail`.
pub struct Recorder {
    name: String,
    trace: Trace,
}

impl Recorder {
    pub fn new(name: impl Into<String>, trace: &Trace) -> Self {
        Self {
            name: name.into(),
            trace: trace.clone(),
        }
    }
}

impl Plugin for Recorder {
    fn name(&self) -> &str {
        &self.name
    }

    fn assembly(&self, mut envelope: Envelope, next: Next<'_>) -> Result<Envelope> {
        self.trace.push(format!("{}:pre", self.name));

        let trail = envelope.payload().get_str("trail").unwrap_or_default();
        let trail = if trail.is_empty() {
            self.name.clone()
        } else {
            format!("{trail},{}", self.name)
        };
        envelope.payload_mut().set("trail", trail);

        let envelope = next(envelope)?;
        self.trace.push(format!("{}:post", self.name));
        Ok(envelope)
    }
}

/// Counts how many envelopes passed through it.
pub struct Counter {
    name: String,
    hits: Arc<AtomicUsize>,
}

impl Counter {
    pub fn new(name: impl Into<String>) -> (Self, Arc<AtomicUsize>) {
        let hits = Arc::new(AtomicUsize::new(0));
        (
            Self {
                name: name.into(),
                hits: hits.clone(),
            },
            hits,
        )
    }
}

impl Plugin for Counter {
    fn name(&self) -> &str {
        &self.name
    }

    fn assembly(&self, envelope: Envelope, next: Next<'_>) -> Result<Envelope> {
        self.hits.fetch_add(1, Ordering::SeqCst);
        next(envelope)
    }
}

/// In-memory log sink for a `tracing_subscriber::fmt` subscriber.
#[derive(Clone, Default)]
pub struct LogBuffer(Arc<Mutex<Vec<u8>>>);

impl LogBuffer {
    /// A dispatch whose formatted records land in this buffer.
    pub fn dispatch(&self) -> tracing::Dispatch {
        let subscriber = tracing_subscriber::fmt()
            .with_writer(self.clone())
            .with_ansi(false)
            .finish();
        tracing::Dispatch::new(subscriber)
    }

    pub fn contents(&self) -> String {
        String::from_utf8_lossy(&self.0.lock()).into_owned()
    }
}

impl Write for LogBuffer {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.lock().extend_from_slice(buf);
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
