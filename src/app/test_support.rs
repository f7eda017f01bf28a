//! Test doubles for the engine, model store and output channel.

use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use crossbeam_channel::{unbounded, Receiver, Sender};
use parking_lot::Mutex;

use crate::domain::{
    DomainError, OutboundMessage, RawTranscript, SegmentTranscript, TranscriptionResult,
};
use crate::ports::{DecodeOptions, EventSink, ModelStore, SpeechBackend, SpeechModel};

const WAIT_LIMIT: Duration = Duration::from_secs(5);

/// Write a fake audio artifact. The fake engine "hears" the file's text:
/// `FAIL` makes inference fail, a leading `WAIT ` blocks on the gate.
pub fn audio_file(dir: &Path, name: &str, content: &str) -> PathBuf {
    let path = dir.join(name);
    std::fs::write(&path, content).unwrap();
    path
}

pub fn transcribe_line(path: &Path, timestamp: u64) -> String {
    serde_json::json!({
        "command": "transcribe",
        "audio_file": path,
        "timestamp": timestamp,
    })
    .to_string()
}

/// Lets a test hold a job inside the engine.
#[derive(Clone)]
pub struct Gate {
    started: Arc<AtomicBool>,
    release_tx: Sender<()>,
    release_rx: Receiver<()>,
}

impl Gate {
    fn new() -> Self {
        let (release_tx, release_rx) = unbounded();
        Self {
            started: Arc::new(AtomicBool::new(false)),
            release_tx,
            release_rx,
        }
    }

    pub async fn wait_started(&self) {
        let deadline = Instant::now() + WAIT_LIMIT;
        while !self.started.load(Ordering::Acquire) {
            assert!(Instant::now() < deadline, "gated job never started");
            tokio::time::sleep(Duration::from_millis(5)).await;
        }
    }

    pub fn release(&self) {
        let _ = self.release_tx.send(());
    }

    fn hold(&self) {
        self.started.store(true, Ordering::Release);
        let _ = self.release_rx.recv_timeout(WAIT_LIMIT);
    }
}

/// Backend that loads any path except ones named `corrupt`, and counts how
/// many of its models are alive.
pub struct FakeBackend {
    live: Arc<AtomicUsize>,
    peak: Arc<AtomicUsize>,
    gate: Option<Gate>,
}

impl FakeBackend {
    pub fn new() -> Self {
        Self {
            live: Arc::new(AtomicUsize::new(0)),
            peak: Arc::new(AtomicUsize::new(0)),
            gate: None,
        }
    }

    pub fn gated() -> (Self, Gate) {
        let gate = Gate::new();
        let backend = Self {
            gate: Some(gate.clone()),
            ..Self::new()
        };
        (backend, gate)
    }

    pub fn live_models(&self) -> usize {
        self.live.load(Ordering::SeqCst)
    }

    pub fn peak_live_models(&self) -> usize {
        self.peak.load(Ordering::SeqCst)
    }
}

impl SpeechBackend for FakeBackend {
    fn name(&self) -> &str {
        "fake"
    }

    fn load(&self, path: &Path) -> Result<Box<dyn SpeechModel>, DomainError> {
        if path.ends_with("corrupt") {
            return Err(DomainError::Engine("bad model file".to_string()));
        }
        let live = self.live.fetch_add(1, Ordering::SeqCst) + 1;
        self.peak.fetch_max(live, Ordering::SeqCst);
        Ok(Box::new(FakeModel {
            live: Arc::clone(&self.live),
            gate: self.gate.clone(),
        }))
    }
}

struct FakeModel {
    live: Arc<AtomicUsize>,
    gate: Option<Gate>,
}

impl SpeechModel for FakeModel {
    fn transcribe(&self, audio: &Path, options: &DecodeOptions) -> Result<RawTranscript, DomainError> {
        assert!(options.full_precision);
        let content = std::fs::read_to_string(audio)?;
        if content == "FAIL" {
            return Err(DomainError::Engine("engine exploded".to_string()));
        }
        let text = match content.strip_prefix("WAIT ") {
            Some(rest) => {
                if let Some(gate) = &self.gate {
                    gate.hold();
                }
                rest.to_string()
            }
            None => content,
        };
        Ok(RawTranscript::from_segments(vec![SegmentTranscript {
            text: format!(" {}", text),
            avg_logprob: Some(-0.3),
        }]))
    }
}

impl Drop for FakeModel {
    fn drop(&mut self) {
        self.live.fetch_sub(1, Ordering::SeqCst);
    }
}

/// Store that knows a fixed set of names; the "path" is the name itself.
pub struct FakeStore {
    known: Vec<String>,
}

impl FakeStore {
    pub fn new(known: &[&str]) -> Self {
        Self {
            known: known.iter().map(|s| s.to_string()).collect(),
        }
    }
}

#[async_trait]
impl ModelStore for FakeStore {
    fn locate(&self, model_name: &str) -> Option<PathBuf> {
        self.known
            .iter()
            .any(|k| k == model_name)
            .then(|| PathBuf::from(model_name))
    }

    async fn fetch(&self, model_name: &str) -> Result<PathBuf, DomainError> {
        self.locate(model_name)
            .ok_or_else(|| DomainError::ModelNotFound(model_name.to_string()))
    }
}

/// EventSink recording every message in memory.
#[derive(Default)]
pub struct MemorySink {
    messages: Mutex<Vec<OutboundMessage>>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn messages(&self) -> Vec<OutboundMessage> {
        self.messages.lock().clone()
    }

    pub fn statuses(&self) -> Vec<String> {
        self.messages()
            .into_iter()
            .filter_map(|m| match m {
                OutboundMessage::Status { message, .. } => Some(message),
                _ => None,
            })
            .collect()
    }

    pub fn errors(&self) -> Vec<String> {
        self.messages()
            .into_iter()
            .filter_map(|m| match m {
                OutboundMessage::Error { message, .. } => Some(message),
                _ => None,
            })
            .collect()
    }

    pub fn transcriptions(&self) -> Vec<TranscriptionResult> {
        self.messages()
            .into_iter()
            .filter_map(|m| match m {
                OutboundMessage::Transcription(result) => Some(result),
                _ => None,
            })
            .collect()
    }

    async fn wait_until<T>(&self, what: &str, mut check: impl FnMut(&Self) -> Option<T>) -> T {
        let deadline = Instant::now() + WAIT_LIMIT;
        loop {
            if let Some(value) = check(self) {
                return value;
            }
            assert!(Instant::now() < deadline, "timed out waiting for {}", what);
            tokio::time::sleep(Duration::from_millis(5)).await;
        }
    }

    pub async fn wait_for_transcriptions(&self, count: usize) -> Vec<TranscriptionResult> {
        self.wait_until("transcriptions", |sink| {
            let results = sink.transcriptions();
            (results.len() >= count).then_some(results)
        })
        .await
    }

    pub async fn wait_for_errors(&self, count: usize) -> Vec<String> {
        self.wait_until("errors", |sink| {
            let errors = sink.errors();
            (errors.len() >= count).then_some(errors)
        })
        .await
    }

    pub async fn wait_for_status(&self, message: &str) {
        self.wait_until(message, |sink| {
            sink.statuses().iter().any(|s| s == message).then_some(())
        })
        .await
    }
}

impl EventSink for MemorySink {
    fn emit(&self, message: OutboundMessage) {
        self.messages.lock().push(message);
    }
}
