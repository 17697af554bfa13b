//! Change-driven NDJSON record stream.
//!
//! One `GestureRecord` line is written only when the (label, rounded
//! confidence) pair differs from the last line written. A steady pose
//! produces a single record instead of one per frame.

use std::io::Write;

use signvote_models::{round_confidence, GesturePayload, GestureRecord, PayloadLabel};

use crate::error::EngineResult;

/// Writes gesture records to any `Write` sink, skipping repeats.
pub struct RecordStream<W: Write> {
    writer: W,
    last: Option<(PayloadLabel, f64)>,
    written: u64,
}

impl<W: Write> RecordStream<W> {
    pub fn new(writer: W) -> Self {
        Self {
            writer,
            last: None,
            written: 0,
        }
    }

    /// Publish a payload stamped with the local wall clock.
    ///
    /// Returns the record when a line was written.
    pub fn publish(&mut self, payload: GesturePayload) -> EngineResult<Option<GestureRecord>> {
        if !self.has_changed(&payload) {
            return Ok(None);
        }
        self.write(GestureRecord::now(payload)).map(Some)
    }

    /// Number of lines written so far.
    pub fn written(&self) -> u64 {
        self.written
    }

    pub fn into_inner(self) -> W {
        self.writer
    }

    fn has_changed(&self, payload: &GesturePayload) -> bool {
        let key = (payload.gesture, round_confidence(payload.confidence));
        self.last != Some(key)
    }

    fn write(&mut self, record: GestureRecord) -> EngineResult<GestureRecord> {
        serde_json::to_writer(&mut self.writer, &record)?;
        self.writer.write_all(b"\n")?;
        self.writer.flush()?;

        self.last = Some((record.gesture, record.confidence));
        self.written += 1;
        Ok(record)
    }
}
