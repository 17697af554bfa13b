//! Frame loop: source -> pipeline -> record stream, latest-value cache and
//! feedback queue.

use std::fs::OpenOptions;
use std::io::Write;
use std::time::{Duration, Instant};

use signvote_engine::{
    FeedbackHandle, GesturePipeline, LandmarkSource, NdjsonSource, RecordStream,
    ThreadedNdjsonSource,
};
use signvote_models::{GesturePayload, Observation};
use tokio::sync::watch;
use tracing::{debug, error, info, warn};

use crate::config::STDIO;
use crate::error::ServerResult;
use crate::metrics;

/// How long to wait for queued feedback to finish playing on shutdown.
const FEEDBACK_DRAIN_TIMEOUT: Duration = Duration::from_secs(10);

/// Boxed NDJSON sink for the record stream.
pub type RecordSink = Box<dyn Write + Send>;

/// Why the frame loop stopped.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StopReason {
    /// The source reached end of stream.
    SourceExhausted,
    /// A shutdown signal was received.
    Shutdown,
    /// The source failed; the message is the reported error.
    SourceFailed(String),
    /// Writing a record failed.
    OutputFailed(String),
}

/// Counters for one run of the frame loop.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunSummary {
    pub frames: u64,
    pub events: u64,
    pub records: u64,
    pub feedback_delivered: u64,
    pub reason: StopReason,
}

/// Open the configured landmark source; `-` reads stdin.
pub async fn open_source(location: &str) -> ServerResult<Box<dyn LandmarkSource>> {
    if location == STDIO {
        return Ok(Box::new(ThreadedNdjsonSource::stdin()?));
    }
    Ok(Box::new(NdjsonSource::open(location).await?))
}

/// Open the configured record output; `-` writes stdout, paths are appended.
pub fn open_output(location: &str) -> ServerResult<RecordSink> {
    if location == STDIO {
        return Ok(Box::new(std::io::stdout()));
    }
    let file = OpenOptions::new().create(true).append(true).open(location)?;
    Ok(Box::new(file))
}

/// Owns everything the frame loop touches.
pub struct FrameRunner {
    source: Box<dyn LandmarkSource>,
    pipeline: GesturePipeline,
    stream: RecordStream<RecordSink>,
    latest: watch::Sender<GesturePayload>,
    feedback: FeedbackHandle,
}

impl FrameRunner {
    pub fn new(
        source: Box<dyn LandmarkSource>,
        pipeline: GesturePipeline,
        output: RecordSink,
        latest: watch::Sender<GesturePayload>,
        feedback: FeedbackHandle,
    ) -> Self {
        Self {
            source,
            pipeline,
            stream: RecordStream::new(output),
            latest,
            feedback,
        }
    }

    /// Process frames until the source ends, fails, or `shutdown` flips to
    /// true, then drain the feedback worker.
    pub async fn run(mut self, mut shutdown: watch::Receiver<bool>) -> RunSummary {
        info!(model = self.pipeline.learned_name(), "Frame loop started");

        let mut frames = 0u64;
        let mut events = 0u64;

        let reason = loop {
            if *shutdown.borrow() {
                break StopReason::Shutdown;
            }

            let next = tokio::select! {
                biased;
                changed = shutdown.changed() => {
                    // A dropped sender also means stop.
                    if changed.is_err() || *shutdown.borrow() {
                        break StopReason::Shutdown;
                    }
                    continue;
                }
                next = self.source.next_observation() => next,
            };

            let observation = match next {
                Ok(Some(observation)) => observation,
                Ok(None) => break StopReason::SourceExhausted,
                Err(e) => {
                    error!(error = %e, frames, "Landmark source failed");
                    break StopReason::SourceFailed(e.to_string());
                }
            };

            frames += 1;
            match self.handle_frame(&observation) {
                Ok(emitted) => events += emitted as u64,
                Err(e) => {
                    error!(error = %e, "Failed to write gesture record");
                    break StopReason::OutputFailed(e.to_string());
                }
            }
        };

        let records = self.stream.written();
        info!(?reason, frames, events, records, "Frame loop stopped");

        let feedback_delivered =
            match tokio::time::timeout(FEEDBACK_DRAIN_TIMEOUT, self.feedback.shutdown()).await {
                Ok(Ok(delivered)) => delivered,
                Ok(Err(e)) => {
                    warn!(error = %e, "Feedback worker did not shut down cleanly");
                    0
                }
                Err(_) => {
                    warn!(
                        timeout_secs = FEEDBACK_DRAIN_TIMEOUT.as_secs(),
                        "Timed out draining feedback queue"
                    );
                    0
                }
            };

        RunSummary {
            frames,
            events,
            records,
            feedback_delivered,
            reason,
        }
    }

    /// Returns whether a vote event was emitted.
    fn handle_frame(&mut self, observation: &Observation) -> ServerResult<bool> {
        let now = Instant::now();
        let outcome = self.pipeline.process(observation, now);
        metrics::record_frame(observation.kind(), now.elapsed().as_secs_f64());

        self.latest.send_replace(outcome.payload.rounded());

        if let Some(record) = self.stream.publish(outcome.payload)? {
            metrics::record_published(record.gesture.as_str());
            debug!(gesture = %record.gesture, confidence = record.confidence, "Published record");
        }

        let Some(event) = outcome.event else {
            return Ok(false);
        };

        metrics::record_event(event.kind.as_str());
        info!(kind = %event.kind, display = %outcome.display, "Vote event");
        let queued = self.feedback.announce(event.announcement(), now);
        debug!(?queued, "Feedback announce");
        Ok(true)
    }
}
