//! Frame loop tests.

use std::io::Write;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use signvote_engine::{
    EngineConfig, FeedbackWorker, GesturePipeline, LogSink, MemorySource, NdjsonSource,
    NullClassifier,
};
use signvote_models::{
    GesturePayload, LandmarkFrame, Observation, PayloadLabel, Point3, LANDMARK_COUNT,
};
use signvote_server::{FrameRunner, StopReason};
use tokio::sync::watch;

/// Cloneable in-memory record sink.
#[derive(Clone, Default)]
struct SharedBuffer(Arc<Mutex<Vec<u8>>>);

impl Write for SharedBuffer {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        self.0.lock().unwrap().write(buf)
    }

    fn flush(&mut self) -> std::io::Result<()> {
        Ok(())
    }
}

impl SharedBuffer {
    fn records(&self) -> Vec<serde_json::Value> {
        String::from_utf8(self.0.lock().unwrap().clone())
            .unwrap()
            .lines()
            .map(|l| serde_json::from_str(l).unwrap())
            .collect()
    }
}

fn fist() -> Observation {
    let mut pts = [Point3::ORIGIN; LANDMARK_COUNT];
    pts[0] = Point3::new(0.50, 0.80, 0.0);
    pts[1] = Point3::new(0.42, 0.74, 0.0);
    pts[2] = Point3::new(0.36, 0.68, 0.0);
    pts[3] = Point3::new(0.31, 0.62, 0.0);
    pts[4] = Point3::new(0.27, 0.56, 0.0);
    for (f, x) in [0.44_f32, 0.50, 0.56, 0.62].iter().enumerate() {
        let base = 5 + f * 4;
        pts[base] = Point3::new(*x, 0.60, 0.0);
        pts[base + 1] = Point3::new(*x, 0.52, 0.0);
        pts[base + 2] = Point3::new(*x, 0.52, -0.06);
        pts[base + 3] = Point3::new(*x, 0.57, -0.06);
    }
    Observation::Hand(LandmarkFrame::new(pts, None))
}

fn runner(
    source: Box<dyn signvote_engine::LandmarkSource>,
    output: SharedBuffer,
) -> (FrameRunner, watch::Receiver<GesturePayload>) {
    let (latest_tx, latest_rx) = watch::channel(GesturePayload::default());
    let feedback = FeedbackWorker::spawn(Arc::new(LogSink), 4, Duration::from_millis(1500));
    let pipeline = GesturePipeline::new(&EngineConfig::default(), Arc::new(NullClassifier));
    (
        FrameRunner::new(source, pipeline, Box::new(output), latest_tx, feedback),
        latest_rx,
    )
}

#[tokio::test]
async fn test_runs_until_source_exhausted() {
    let output = SharedBuffer::default();
    let source = MemorySource::new([fist(), fist(), fist(), Observation::NoHand]);
    let (runner, latest) = runner(Box::new(source), output.clone());
    let (_shutdown_tx, shutdown_rx) = watch::channel(false);

    let summary = runner.run(shutdown_rx).await;

    assert_eq!(summary.reason, StopReason::SourceExhausted);
    assert_eq!(summary.frames, 4);
    assert_eq!(summary.events, 1);
    assert_eq!(summary.records, 2);
    assert_eq!(summary.feedback_delivered, 1);

    let records = output.records();
    assert_eq!(records[0]["gesture"], "YES");
    assert_eq!(records[1]["gesture"], "NONE");
    assert_eq!(latest.borrow().gesture, PayloadLabel::None);
}

#[tokio::test]
async fn test_source_failure_stops_cleanly() {
    let output = SharedBuffer::default();
    let input: &'static [u8] = b"{\"landmarks\": null}\n{\"landmarks\": [[0, 0, 0]]}\n";
    let (runner, _latest) = runner(Box::new(NdjsonSource::new(input)), output.clone());
    let (_shutdown_tx, shutdown_rx) = watch::channel(false);

    let summary = runner.run(shutdown_rx).await;

    assert!(matches!(summary.reason, StopReason::SourceFailed(_)));
    assert_eq!(summary.frames, 1);
    assert_eq!(output.records().len(), 1);
}

#[tokio::test]
async fn test_shutdown_signal_stops_loop() {
    let (runner, _latest) = runner(Box::new(MemorySource::new([fist()])), SharedBuffer::default());
    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    shutdown_tx.send_replace(true);

    let summary = runner.run(shutdown_rx).await;

    assert_eq!(summary.reason, StopReason::Shutdown);
    assert_eq!(summary.frames, 0);
}
