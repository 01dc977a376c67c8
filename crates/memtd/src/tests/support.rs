//! Shared collaborators for the daemon lifecycle suites.

use std::io::{BufRead, BufReader, Cursor, Write};
use std::net::{Shutdown, SocketAddr, TcpStream};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Mutex, mpsc};
use std::thread;
use std::time::{Duration, Instant};

use camino::{Utf8Path, Utf8PathBuf};

use memt_config::{LmBackend, LmConfig, ListenEndpoint, ServiceConfig};

use crate::bootstrap::BootstrapError;
use crate::health::HealthReporter;
use crate::model::{CorpusModel, LanguageModel, LoadedModel, ModelLoadError, ModelLoader};
use crate::process::{ShutdownError, ShutdownSignal};

/// Corpus backing the stub language model.
pub const CORPUS: &str = "the cat sat on the mat\n";

/// Lifecycle events captured by [`RecordingHealthReporter`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HealthEvent {
    BootstrapStarting,
    BootstrapSucceeded,
    BootstrapFailed(String),
    ModelLoading(LmBackend),
    ModelReady(LmBackend),
    ModelFailed,
    ListenerReady(SocketAddr),
}

/// Records health events for assertions.
#[derive(Default)]
pub struct RecordingHealthReporter {
    events: Mutex<Vec<HealthEvent>>,
}

impl RecordingHealthReporter {
    /// Captures a copy of the recorded events.
    pub fn events(&self) -> Vec<HealthEvent> {
        self.events
            .lock()
            .expect("health reporter mutex poisoned")
            .clone()
    }

    /// Blocks until the listener reports its bound address.
    pub fn wait_for_listener(&self) -> SocketAddr {
        let deadline = Instant::now() + Duration::from_secs(5);
        loop {
            let ready = self.events().into_iter().find_map(|event| match event {
                HealthEvent::ListenerReady(addr) => Some(addr),
                _ => None,
            });
            if let Some(addr) = ready {
                return addr;
            }
            assert!(Instant::now() < deadline, "listener never became ready");
            thread::sleep(Duration::from_millis(10));
        }
    }

    fn record(&self, event: HealthEvent) {
        self.events
            .lock()
            .expect("health reporter mutex poisoned")
            .push(event);
    }
}

impl HealthReporter for RecordingHealthReporter {
    fn bootstrap_starting(&self) {
        self.record(HealthEvent::BootstrapStarting);
    }

    fn bootstrap_succeeded(&self, _config: &ServiceConfig) {
        self.record(HealthEvent::BootstrapSucceeded);
    }

    fn bootstrap_failed(&self, error: &BootstrapError) {
        self.record(HealthEvent::BootstrapFailed(error.to_string()));
    }

    fn model_loading(&self, config: &LmConfig) {
        self.record(HealthEvent::ModelLoading(config.backend));
    }

    fn model_ready(&self, model: &LoadedModel) {
        self.record(HealthEvent::ModelReady(model.backend()));
    }

    fn model_failed(&self, _error: &ModelLoadError) {
        self.record(HealthEvent::ModelFailed);
    }

    fn listener_ready(&self, addr: SocketAddr) {
        self.record(HealthEvent::ListenerReady(addr));
    }
}

/// Model loader that builds a corpus model from memory and counts calls.
#[derive(Default)]
pub struct StubModelLoader {
    calls: AtomicUsize,
}

impl StubModelLoader {
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl ModelLoader for StubModelLoader {
    fn load(&self, config: &LmConfig) -> Result<LoadedModel, ModelLoadError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        CorpusModel::from_reader(Cursor::new(CORPUS), &config.file, config.order)
            .map(LoadedModel::Salm)
    }
}

/// Model loader that always reports an empty model.
pub struct EmptyModelLoader;

impl ModelLoader for EmptyModelLoader {
    fn load(&self, config: &LmConfig) -> Result<LoadedModel, ModelLoadError> {
        Err(ModelLoadError::Empty {
            backend: config.backend,
            path: config.file.clone(),
        })
    }
}

/// Shutdown signal released by dropping or sending on a channel.
pub struct ChannelShutdown {
    receiver: Mutex<mpsc::Receiver<()>>,
}

impl ChannelShutdown {
    /// Returns the signal together with the sender that triggers it.
    pub fn new() -> (Self, mpsc::Sender<()>) {
        let (sender, receiver) = mpsc::channel();
        (
            Self {
                receiver: Mutex::new(receiver),
            },
            sender,
        )
    }
}

impl ShutdownSignal for ChannelShutdown {
    fn wait(&self) -> Result<(), ShutdownError> {
        let receiver = self.receiver.lock().expect("shutdown mutex poisoned");
        // A dropped sender also means stop.
        let _ = receiver.recv();
        Ok(())
    }
}

/// Configuration bound to an ephemeral loopback port.
pub fn loopback_config() -> ServiceConfig {
    ServiceConfig::new(
        LmConfig {
            backend: LmBackend::Salm,
            file: Utf8PathBuf::from("corpus.txt"),
            order: 3,
        },
        ListenEndpoint::new("127.0.0.1", 0),
    )
}

/// Writes `request`, half-closes and returns everything the daemon sent.
pub fn exchange(addr: SocketAddr, request: &str) -> String {
    let mut stream = TcpStream::connect(addr).expect("connect to daemon");
    stream
        .set_read_timeout(Some(Duration::from_secs(10)))
        .expect("set read timeout");
    stream
        .write_all(request.as_bytes())
        .expect("write request");
    stream.shutdown(Shutdown::Write).expect("half-close");

    let mut response = String::new();
    let mut reader = BufReader::new(stream);
    let mut line = String::new();
    while reader.read_line(&mut line).expect("read response") > 0 {
        response.push_str(&line);
        line.clear();
    }
    response
}

/// Builds a request block with the four mandatory weights.
pub fn request_block(output: &Utf8Path, matched: &Utf8Path, confidence: &str) -> String {
    format!(
        "score.lm = 1\nscore.alignment = 1\nscore.ngram = 1\nscore.overlap = 1\n\
         output.one_best = {output}\ninput.matched_file = {matched}\n\
         input.confidence = {confidence}\n"
    )
}
