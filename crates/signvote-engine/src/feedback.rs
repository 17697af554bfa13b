//! Asynchronous feedback delivery.
//!
//! Vote announcements go through a bounded queue drained by one dedicated
//! task, so a slow speech program never stalls the frame loop. The queue is
//! FIFO and ends with an explicit `Shutdown` sentinel.
//!
//! Two cooldown layers coexist: the emitter rate-limits per gesture, and
//! `FeedbackHandle` skips repeating the same message within
//! `message_cooldown`.

use std::path::PathBuf;
use std::process::Stdio;
use std::sync::Arc;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use metrics::counter;
use tokio::process::Command;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::error::{EngineError, EngineResult};

/// Counter of announcements dropped because the queue was full.
pub const FEEDBACK_DROPPED_TOTAL: &str = "signvote_feedback_dropped_total";

/// Destination for spoken or logged feedback.
#[async_trait]
pub trait FeedbackSink: Send + Sync + 'static {
    /// Deliver one message. May block for as long as playback takes.
    async fn deliver(&self, message: &str) -> EngineResult<()>;

    fn name(&self) -> &'static str;
}

/// Sink that only logs. Used when no speech program is configured.
#[derive(Debug, Clone, Copy, Default)]
pub struct LogSink;

#[async_trait]
impl FeedbackSink for LogSink {
    async fn deliver(&self, message: &str) -> EngineResult<()> {
        info!(text = message, "Feedback");
        Ok(())
    }

    fn name(&self) -> &'static str {
        "log"
    }
}

/// Runs an external program with the message as its last argument,
/// e.g. `espeak -s 160 "Vote YES submitted"`.
#[derive(Debug, Clone)]
pub struct CommandSink {
    program: PathBuf,
    args: Vec<String>,
}

impl CommandSink {
    /// Parse a whitespace-separated command line and resolve the program on
    /// `PATH`.
    pub fn new(command_line: &str) -> EngineResult<Self> {
        let mut parts = command_line.split_whitespace();
        let name = parts
            .next()
            .ok_or_else(|| EngineError::FeedbackProgramNotFound(command_line.to_string()))?;
        let program =
            which::which(name).map_err(|_| EngineError::FeedbackProgramNotFound(name.to_string()))?;

        Ok(Self {
            program,
            args: parts.map(String::from).collect(),
        })
    }

    pub fn program(&self) -> &PathBuf {
        &self.program
    }
}

#[async_trait]
impl FeedbackSink for CommandSink {
    async fn deliver(&self, message: &str) -> EngineResult<()> {
        debug!(program = %self.program.display(), text = message, "Running feedback command");

        let status = Command::new(&self.program)
            .args(&self.args)
            .arg(message)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .status()
            .await?;

        if status.success() {
            Ok(())
        } else {
            Err(EngineError::feedback_failed(format!(
                "{} exited with {}",
                self.program.display(),
                status
            )))
        }
    }

    fn name(&self) -> &'static str {
        "command"
    }
}

/// Items on the delivery queue.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FeedbackCommand {
    Speak(String),
    Shutdown,
}

/// Result of handing a message to the worker.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AnnounceOutcome {
    Queued,
    /// Same message was queued within the message cooldown.
    CoolingDown,
    /// Queue full; message discarded.
    Dropped,
    /// Worker has stopped.
    Closed,
}

/// Suppresses an identical message repeated within the cooldown.
#[derive(Debug, Clone)]
pub struct MessageCooldown {
    cooldown: Duration,
    last: Option<(String, Instant)>,
}

impl MessageCooldown {
    pub fn new(cooldown: Duration) -> Self {
        Self {
            cooldown,
            last: None,
        }
    }

    /// Holds the same message until strictly more than the cooldown has passed.
    pub fn is_cooling(&self, message: &str, now: Instant) -> bool {
        match &self.last {
            Some((last, at)) => {
                last == message && now.saturating_duration_since(*at) <= self.cooldown
            }
            None => false,
        }
    }

    pub fn record(&mut self, message: &str, now: Instant) {
        self.last = Some((message.to_string(), now));
    }
}

/// Spawns the single delivery task.
pub struct FeedbackWorker;

impl FeedbackWorker {
    pub fn spawn(
        sink: Arc<dyn FeedbackSink>,
        capacity: usize,
        message_cooldown: Duration,
    ) -> FeedbackHandle {
        let (tx, rx) = mpsc::channel(capacity.max(1));
        info!(sink = sink.name(), capacity, "Starting feedback worker");
        let task = tokio::spawn(run_worker(sink, rx));

        FeedbackHandle {
            tx,
            cooldown: MessageCooldown::new(message_cooldown),
            task,
        }
    }
}

async fn run_worker(sink: Arc<dyn FeedbackSink>, mut rx: mpsc::Receiver<FeedbackCommand>) -> u64 {
    let mut delivered = 0u64;
    while let Some(command) = rx.recv().await {
        match command {
            FeedbackCommand::Speak(message) => match sink.deliver(&message).await {
                Ok(()) => delivered += 1,
                Err(e) => warn!(sink = sink.name(), error = %e, "Feedback delivery failed"),
            },
            FeedbackCommand::Shutdown => break,
        }
    }
    debug!(delivered, "Feedback worker stopped");
    delivered
}

/// Producer side of the delivery queue, owned by the frame loop.
pub struct FeedbackHandle {
    tx: mpsc::Sender<FeedbackCommand>,
    cooldown: MessageCooldown,
    task: JoinHandle<u64>,
}

impl FeedbackHandle {
    /// Queue a message without waiting.
    pub fn announce(&mut self, message: impl Into<String>, now: Instant) -> AnnounceOutcome {
        let message = message.into();
        if self.cooldown.is_cooling(&message, now) {
            return AnnounceOutcome::CoolingDown;
        }

        match self.tx.try_send(FeedbackCommand::Speak(message.clone())) {
            Ok(()) => {
                self.cooldown.record(&message, now);
                AnnounceOutcome::Queued
            }
            Err(mpsc::error::TrySendError::Full(_)) => {
                counter!(FEEDBACK_DROPPED_TOTAL).increment(1);
                warn!(text = %message, "Feedback queue full, dropping message");
                AnnounceOutcome::Dropped
            }
            Err(mpsc::error::TrySendError::Closed(_)) => AnnounceOutcome::Closed,
        }
    }

    /// Send the sentinel and wait for queued messages to drain.
    ///
    /// Returns the number of messages delivered successfully.
    pub async fn shutdown(self) -> EngineResult<u64> {
        let sent = self.tx.send(FeedbackCommand::Shutdown).await;
        let delivered = self
            .task
            .await
            .map_err(|e| EngineError::feedback_failed(e.to_string()))?;
        sent.map_err(|_| EngineError::FeedbackClosed)?;
        Ok(delivered)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;
    use tokio::sync::{Notify, Semaphore};

    #[derive(Default)]
    struct RecordingSink {
        messages: Mutex<Vec<String>>,
    }

    #[async_trait]
    impl FeedbackSink for RecordingSink {
        async fn deliver(&self, message: &str) -> EngineResult<()> {
            self.messages.lock().unwrap().push(message.to_string());
            Ok(())
        }

        fn name(&self) -> &'static str {
            "recording"
        }
    }

    /// Blocks every delivery until a permit is released.
    struct GatedSink {
        started: Notify,
        gate: Semaphore,
        messages: Mutex<Vec<String>>,
    }

    #[async_trait]
    impl FeedbackSink for GatedSink {
        async fn deliver(&self, message: &str) -> EngineResult<()> {
            self.started.notify_one();
            self.gate.acquire().await.unwrap().forget();
            self.messages.lock().unwrap().push(message.to_string());
            Ok(())
        }

        fn name(&self) -> &'static str {
            "gated"
        }
    }

    #[tokio::test]
    async fn test_messages_delivered_in_order() {
        let sink = Arc::new(RecordingSink::default());
        let mut handle = FeedbackWorker::spawn(sink.clone(), 8, Duration::from_millis(1500));
        let now = Instant::now();

        assert_eq!(handle.announce("Vote YES submitted", now), AnnounceOutcome::Queued);
        assert_eq!(handle.announce("Vote NO submitted", now), AnnounceOutcome::Queued);
        assert_eq!(handle.announce("Vote YES submitted", now), AnnounceOutcome::Queued);

        assert_eq!(handle.shutdown().await.unwrap(), 3);
        assert_eq!(
            *sink.messages.lock().unwrap(),
            vec!["Vote YES submitted", "Vote NO submitted", "Vote YES submitted"]
        );
    }

    #[tokio::test]
    async fn test_repeated_message_cools_down() {
        let sink = Arc::new(RecordingSink::default());
        let mut handle = FeedbackWorker::spawn(sink.clone(), 8, Duration::from_millis(1500));
        let start = Instant::now();

        assert_eq!(handle.announce("Vote YES submitted", start), AnnounceOutcome::Queued);
        assert_eq!(
            handle.announce("Vote YES submitted", start + Duration::from_millis(500)),
            AnnounceOutcome::CoolingDown
        );
        assert_eq!(
            handle.announce("Vote YES submitted", start + Duration::from_millis(1600)),
            AnnounceOutcome::Queued
        );

        assert_eq!(handle.shutdown().await.unwrap(), 2);
    }

    #[tokio::test]
    async fn test_full_queue_drops_without_blocking() {
        let sink = Arc::new(GatedSink {
            started: Notify::new(),
            gate: Semaphore::new(0),
            messages: Mutex::new(Vec::new()),
        });
        let mut handle = FeedbackWorker::spawn(sink.clone(), 1, Duration::ZERO);
        let now = Instant::now();

        assert_eq!(handle.announce("first", now), AnnounceOutcome::Queued);
        // Worker is now stuck inside deliver("first").
        sink.started.notified().await;

        assert_eq!(handle.announce("second", now), AnnounceOutcome::Queued);
        assert_eq!(handle.announce("third", now), AnnounceOutcome::Dropped);

        sink.gate.add_permits(8);
        assert_eq!(handle.shutdown().await.unwrap(), 2);
        assert_eq!(*sink.messages.lock().unwrap(), vec!["first", "second"]);
    }

    #[test]
    fn test_message_cooldown() {
        let mut cooldown = MessageCooldown::new(Duration::from_secs(1));
        let now = Instant::now();
        assert!(!cooldown.is_cooling("a", now));
        cooldown.record("a", now);
        assert!(cooldown.is_cooling("a", now + Duration::from_millis(999)));
        assert!(!cooldown.is_cooling("b", now));
        assert!(cooldown.is_cooling("a", now + Duration::from_secs(1)));
        assert!(!cooldown.is_cooling("a", now + Duration::from_millis(1001)));
    }

    #[test]
    fn test_repeat_announcement_at_exact_cooldown_is_held() {
        let mut cooldown = MessageCooldown::new(Duration::from_millis(1500));
        let now = Instant::now();
        cooldown.record("Vote YES submitted", now);
        assert!(cooldown.is_cooling("Vote YES submitted", now + Duration::from_millis(1500)));
        assert!(!cooldown.is_cooling("Vote YES submitted", now + Duration::from_millis(1501)));
    }

    #[test]
    fn test_missing_program_is_rejected() {
        assert!(matches!(
            CommandSink::new("signvote-no-such-speech-program"),
            Err(EngineError::FeedbackProgramNotFound(_))
        ));
        assert!(matches!(
            CommandSink::new("   "),
            Err(EngineError::FeedbackProgramNotFound(_))
        ));
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_command_sink_runs_program() {
        let sink = CommandSink::new("true").unwrap();
        sink.deliver("Vote YES submitted").await.unwrap();

        let failing = CommandSink::new("false").unwrap();
        assert!(matches!(
            failing.deliver("Vote NO submitted").await,
            Err(EngineError::FeedbackFailed(_))
        ));
    }
}
