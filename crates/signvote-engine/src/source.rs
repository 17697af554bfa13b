//! Upstream landmark sources.
//!
//! The detector runs outside this process and streams one JSON object per
//! camera frame:
//!
//! ```json
//! {"landmarks": [[0.51, 0.80, 0.0], ...21 points], "handedness": "Right"}
//! {"landmarks": null}
//! ```
//!
//! `null` or missing landmarks mean no hand was detected in that frame.

use std::collections::VecDeque;
use std::io::BufRead;
use std::path::Path;

use async_trait::async_trait;
use serde::Deserialize;
use signvote_models::{Handedness, LandmarkFrame, Observation, Point3};
use tokio::io::{AsyncBufReadExt, AsyncRead, BufReader, Lines};
use tokio::sync::mpsc;
use tracing::debug;

use crate::error::{EngineError, EngineResult};

/// A per-frame observation stream.
#[async_trait]
pub trait LandmarkSource: Send {
    /// Next observation, or `None` at end of stream.
    async fn next_observation(&mut self) -> EngineResult<Option<Observation>>;
}

#[derive(Debug, Deserialize)]
struct RawObservation {
    #[serde(default)]
    landmarks: Option<Vec<[f32; 3]>>,
    #[serde(default)]
    handedness: Option<String>,
}

/// Parse one NDJSON line. `line_number` is 1-based and only used in errors.
pub fn parse_observation(line: &str, line_number: usize) -> EngineResult<Observation> {
    let raw: RawObservation = serde_json::from_str(line)
        .map_err(|e| EngineError::source(line_number, e.to_string()))?;

    let Some(landmarks) = raw.landmarks else {
        return Ok(Observation::NoHand);
    };

    let points: Vec<Point3> = landmarks.into_iter().map(Point3::from).collect();
    // Unrecognized handedness tags are treated as absent.
    let handedness = raw
        .handedness
        .as_deref()
        .and_then(|h| h.parse::<Handedness>().ok());

    let frame = LandmarkFrame::from_points(&points, handedness)
        .map_err(|e| EngineError::source(line_number, e.to_string()))?;
    Ok(Observation::Hand(frame))
}

/// Reads newline-delimited JSON observations from any async reader.
pub struct NdjsonSource<R> {
    lines: Lines<BufReader<R>>,
    line_number: usize,
}

impl<R: AsyncRead + Unpin + Send> NdjsonSource<R> {
    pub fn new(reader: R) -> Self {
        Self {
            lines: BufReader::new(reader).lines(),
            line_number: 0,
        }
    }
}

impl NdjsonSource<tokio::fs::File> {
    pub async fn open(path: impl AsRef<Path>) -> EngineResult<Self> {
        let file = tokio::fs::File::open(path.as_ref()).await?;
        debug!(path = %path.as_ref().display(), "Opened landmark source");
        Ok(Self::new(file))
    }
}

#[async_trait]
impl<R: AsyncRead + Unpin + Send> LandmarkSource for NdjsonSource<R> {
    async fn next_observation(&mut self) -> EngineResult<Option<Observation>> {
        loop {
            let Some(line) = self.lines.next_line().await? else {
                return Ok(None);
            };
            self.line_number += 1;

            if line.trim().is_empty() {
                continue;
            }
            return parse_observation(&line, self.line_number).map(Some);
        }
    }
}

/// Lines buffered between the reader thread and the frame loop.
const READER_BUFFER: usize = 64;

/// NDJSON read from a blocking reader on a dedicated OS thread.
///
/// Used for stdin. Runtime shutdown waits on reads parked in the blocking
/// pool, which `tokio::io::stdin` uses; a plain thread does not hold it up.
pub struct ThreadedNdjsonSource {
    lines: mpsc::Receiver<std::io::Result<String>>,
    line_number: usize,
}

impl ThreadedNdjsonSource {
    pub fn spawn<R: BufRead + Send + 'static>(reader: R) -> EngineResult<Self> {
        let (tx, rx) = mpsc::channel(READER_BUFFER);
        std::thread::Builder::new()
            .name("landmark-reader".to_string())
            .spawn(move || {
                for line in reader.lines() {
                    let failed = line.is_err();
                    // Receiver gone means the frame loop stopped.
                    if tx.blocking_send(line).is_err() || failed {
                        break;
                    }
                }
            })?;
        Ok(Self {
            lines: rx,
            line_number: 0,
        })
    }

    pub fn stdin() -> EngineResult<Self> {
        Self::spawn(std::io::BufReader::new(std::io::stdin()))
    }
}

#[async_trait]
impl LandmarkSource for ThreadedNdjsonSource {
    async fn next_observation(&mut self) -> EngineResult<Option<Observation>> {
        loop {
            let Some(line) = self.lines.recv().await else {
                return Ok(None);
            };
            let line = line?;
            self.line_number += 1;

            if line.trim().is_empty() {
                continue;
            }
            return parse_observation(&line, self.line_number).map(Some);
        }
    }
}

/// In-memory source, handy for replays and tests.
#[derive(Debug, Default)]
pub struct MemorySource {
    observations: VecDeque<Observation>,
}

impl MemorySource {
    pub fn new(observations: impl IntoIterator<Item = Observation>) -> Self {
        Self {
            observations: observations.into_iter().collect(),
        }
    }
}

#[async_trait]
impl LandmarkSource for MemorySource {
    async fn next_observation(&mut self) -> EngineResult<Option<Observation>> {
        Ok(self.observations.pop_front())
    }
}
