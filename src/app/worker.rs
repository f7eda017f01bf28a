use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use tracing::{debug, info, warn};

use crate::app::model_manager::ModelManager;
use crate::app::queue::{JobQueue, Poll, QueueItem};
use crate::domain::{AtomicServiceState, DomainError, Job, OutboundMessage, TranscriptionResult};
use crate::ports::EventSink;

/// Counters reported when the worker exits.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WorkerStats {
    pub processed: usize,
    pub emitted: usize,
    pub failed: usize,
    /// Jobs still queued at shutdown.
    pub discarded: usize,
}

/// The single consumer of the job queue.
///
/// Runs on its own thread, so at most one inference call is ever in flight.
pub struct Worker {
    queue: JobQueue,
    models: Arc<ModelManager>,
    sink: Arc<dyn EventSink>,
    state: Arc<AtomicServiceState>,
    poll_interval: Duration,
}

impl Worker {
    pub fn new(
        queue: JobQueue,
        models: Arc<ModelManager>,
        sink: Arc<dyn EventSink>,
        state: Arc<AtomicServiceState>,
        poll_interval: Duration,
    ) -> Self {
        Self {
            queue,
            models,
            sink,
            state,
            poll_interval,
        }
    }

    /// Start the worker thread.
    pub fn spawn(self) -> Result<JoinHandle<WorkerStats>, DomainError> {
        thread::Builder::new()
            .name("transcription-worker".to_string())
            .spawn(move || self.run())
            .map_err(|e| DomainError::Worker(format!("Failed to spawn worker thread: {}", e)))
    }

    fn run(self) -> WorkerStats {
        info!(poll_ms = self.poll_interval.as_millis() as u64, "Worker started");
        let mut stats = WorkerStats::default();

        // Stop prevents further dequeues; the job in progress always finishes.
        while self.state.is_running() {
            match self.queue.next(self.poll_interval) {
                Poll::Item(QueueItem::Job(job)) => self.process(job, &mut stats),
                Poll::Item(QueueItem::Stop) => {
                    debug!("Stop sentinel received");
                    break;
                }
                Poll::Empty => continue,
                Poll::Closed => break,
            }
        }

        let discarded = self.queue.drain();
        if !discarded.is_empty() {
            warn!(count = discarded.len(), "Discarding queued jobs at shutdown");
            for job in &discarded {
                remove_artifact(job);
            }
        }
        stats.discarded = discarded.len();

        info!(?stats, "Worker stopped");
        stats
    }

    fn process(&self, job: Job, stats: &mut WorkerStats) {
        debug!(audio = %job.audio_file.display(), "Processing job");

        match self.transcribe(&job) {
            Ok(Some(result)) => {
                stats.emitted += 1;
                self.sink.emit(OutboundMessage::Transcription(result));
            }
            Ok(None) => debug!(audio = %job.audio_file.display(), "No speech; nothing emitted"),
            Err(e) => {
                stats.failed += 1;
                warn!(audio = %job.audio_file.display(), error = %e, "Job failed");
                self.sink.error(&e.to_string());
            }
        }
        stats.processed += 1;

        remove_artifact(&job);
    }

    /// Transcribe one job with whichever model is active when it is dequeued.
    fn transcribe(&self, job: &Job) -> Result<Option<TranscriptionResult>, DomainError> {
        if !job.audio_file.exists() {
            return Err(DomainError::AudioNotFound(job.audio_file.display().to_string()));
        }

        let active = self.models.blocking_active();
        let handle = active
            .as_ref()
            .ok_or_else(|| DomainError::NoActiveModel(job.audio_file.display().to_string()))?;

        // Timed from here so a pending model switch does not count.
        let started = Instant::now();
        let transcript = handle.transcribe(&job.audio_file)?;
        let processing_time = started.elapsed().as_secs_f64();
        let text = transcript.text.trim();
        if text.is_empty() {
            return Ok(None);
        }

        Ok(Some(TranscriptionResult {
            text: text.to_string(),
            timestamp: job.submitted_at.clone(),
            confidence: transcript.confidence(),
            processing_time,
            model: handle.name().to_string(),
        }))
    }
}

/// Best-effort removal of a job's audio artifact. Failures are logged only.
fn remove_artifact(job: &Job) {
    if let Err(e) = std::fs::remove_file(&job.audio_file) {
        let err = DomainError::Cleanup {
            path: job.audio_file.display().to_string(),
            reason: e.to_string(),
        };
        debug!(error = %err, "Audio artifact not removed");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::test_support::{audio_file, FakeBackend, FakeStore, MemorySink};
    use crate::domain::ServiceState;
    use serde_json::json;

    struct Fixture {
        queue: JobQueue,
        models: Arc<ModelManager>,
        sink: Arc<MemorySink>,
        state: Arc<AtomicServiceState>,
        dir: tempfile::TempDir,
    }

    impl Fixture {
        fn new() -> Self {
            let sink = Arc::new(MemorySink::new());
            let models = Arc::new(ModelManager::new(
                Arc::new(FakeBackend::new()),
                Arc::new(FakeStore::new(&["tiny.en", "base"])),
                sink.clone(),
            ));
            Self {
                queue: JobQueue::new(),
                models,
                sink,
                state: Arc::new(AtomicServiceState::new(ServiceState::Running)),
                dir: tempfile::tempdir().unwrap(),
            }
        }

        fn spawn(&self) -> JoinHandle<WorkerStats> {
            Worker::new(
                self.queue.clone(),
                Arc::clone(&self.models),
                self.sink.clone(),
                Arc::clone(&self.state),
                Duration::from_millis(20),
            )
            .spawn()
            .unwrap()
        }

        fn stop(&self) {
            self.state.stop();
            self.queue.push_stop();
        }
    }

    #[tokio::test]
    async fn test_results_in_submission_order() {
        let fx = Fixture::new();
        fx.models.load("tiny.en").await.unwrap();

        let mut paths = Vec::new();
        for n in 0..5 {
            let path = audio_file(fx.dir.path(), &format!("chunk_{}.wav", n), &format!("utterance {}", n));
            fx.queue.enqueue(Job::new(&path, json!(n))).unwrap();
            paths.push(path);
        }
        let worker = fx.spawn();

        let results = fx.sink.wait_for_transcriptions(5).await;
        for (n, result) in results.iter().enumerate() {
            assert_eq!(result.text, format!("utterance {}", n));
            assert_eq!(result.timestamp, json!(n));
            assert_eq!(result.model, "tiny.en");
        }

        fx.stop();
        let stats = worker.join().unwrap();
        assert_eq!(stats.processed, 5);
        assert_eq!(stats.emitted, 5);
        // Artifacts are removed after processing.
        assert!(paths.iter().all(|p| !p.exists()));
    }

    #[tokio::test]
    async fn test_empty_text_emits_nothing() {
        let fx = Fixture::new();
        fx.models.load("tiny.en").await.unwrap();

        let silent = audio_file(fx.dir.path(), "silent.wav", "   \n ");
        let spoken = audio_file(fx.dir.path(), "spoken.wav", "hello");
        fx.queue.enqueue(Job::new(&silent, json!(1))).unwrap();
        fx.queue.enqueue(Job::new(&spoken, json!(2))).unwrap();
        let worker = fx.spawn();

        let results = fx.sink.wait_for_transcriptions(1).await;
        fx.stop();
        let stats = worker.join().unwrap();

        assert_eq!(results[0].text, "hello");
        assert_eq!(fx.sink.transcriptions().len(), 1);
        assert!(fx.sink.errors().is_empty());
        assert_eq!(stats.processed, 2);
        assert!(!silent.exists());
    }

    #[tokio::test]
    async fn test_engine_failure_does_not_stop_queue() {
        let fx = Fixture::new();
        fx.models.load("base").await.unwrap();

        let bad = audio_file(fx.dir.path(), "bad.wav", "FAIL");
        let good = audio_file(fx.dir.path(), "good.wav", "still here");
        fx.queue.enqueue(Job::new(&bad, json!(1))).unwrap();
        fx.queue.enqueue(Job::new(&good, json!(2))).unwrap();
        let worker = fx.spawn();

        let results = fx.sink.wait_for_transcriptions(1).await;
        fx.stop();
        let stats = worker.join().unwrap();

        assert_eq!(results[0].text, "still here");
        let errors = fx.sink.errors();
        assert_eq!(errors.len(), 1);
        assert!(errors[0].starts_with("Transcription error:"));
        assert_eq!(stats.failed, 1);
        // Failed jobs are cleaned up too.
        assert!(!bad.exists());
    }

    #[tokio::test]
    async fn test_missing_audio_file() {
        let fx = Fixture::new();
        fx.models.load("tiny.en").await.unwrap();

        let missing = fx.dir.path().join("gone.wav");
        fx.queue.enqueue(Job::new(&missing, json!(1))).unwrap();
        let worker = fx.spawn();

        let errors = fx.sink.wait_for_errors(1).await;
        fx.stop();
        worker.join().unwrap();

        assert!(errors[0].starts_with("Audio file not found:"));
    }

    #[tokio::test]
    async fn test_no_active_model() {
        let fx = Fixture::new();

        let path = audio_file(fx.dir.path(), "chunk.wav", "hello");
        fx.queue.enqueue(Job::new(&path, json!(1))).unwrap();
        let worker = fx.spawn();

        let errors = fx.sink.wait_for_errors(1).await;
        fx.stop();
        worker.join().unwrap();

        assert!(errors[0].starts_with("No model loaded"));
        assert!(fx.sink.transcriptions().is_empty());
    }

    #[tokio::test]
    async fn test_processing_time_excludes_wait_for_model() {
        let fx = Fixture::new();
        fx.models.load("tiny.en").await.unwrap();

        // Another holder keeps the model slot busy, as a switch would.
        let (held_tx, held_rx) = crossbeam_channel::bounded(1);
        let models = Arc::clone(&fx.models);
        let holder = std::thread::spawn(move || {
            let _slot = models.blocking_active();
            held_tx.send(()).unwrap();
            std::thread::sleep(Duration::from_millis(400));
        });
        held_rx.recv().unwrap();

        let path = audio_file(fx.dir.path(), "quick.wav", "quick");
        fx.queue.enqueue(Job::new(&path, json!(1))).unwrap();
        let queued_at = Instant::now();
        let worker = fx.spawn();

        let results = fx.sink.wait_for_transcriptions(1).await;
        let waited = queued_at.elapsed();
        fx.stop();
        worker.join().unwrap();
        holder.join().unwrap();

        assert!(waited >= Duration::from_millis(300));
        assert!(
            results[0].processing_time < 0.1,
            "processing_time was {}",
            results[0].processing_time
        );
    }

    #[test]
    fn test_stopped_worker_discards_queue() {
        let fx = Fixture::new();
        let path = audio_file(fx.dir.path(), "late.wav", "too late");
        fx.queue.enqueue(Job::new(&path, json!(1))).unwrap();
        fx.stop();

        let stats = fx.spawn().join().unwrap();

        assert_eq!(stats.processed, 0);
        assert_eq!(stats.discarded, 1);
        assert!(fx.sink.transcriptions().is_empty());
        assert!(!path.exists());
    }

    #[test]
    fn test_idle_worker_observes_stop_flag() {
        let fx = Fixture::new();
        let worker = fx.spawn();

        // No sentinel: the bounded poll notices the flag.
        fx.state.stop();
        let stats = worker.join().unwrap();
        assert_eq!(stats, WorkerStats::default());
    }

    #[test]
    fn test_cleanup_failure_is_swallowed() {
        let job = Job::new("/nonexistent/dir/chunk.wav", json!(0));
        remove_artifact(&job);
    }
}
