use std::io::Write;

use crate::segment_encoder::SegmentEncoder;
use crate::segments::Segment;
use crate::{Error, Result};

/// A `SegmentEncoder` that writes the persisted subtitle artifact: one JSON array of prepared
/// segments.
///
/// The artifact is meant to be read back with [`crate::segments::load_segments`], so:
/// - every element carries its word list, synthesized or transcribed, after prefix merging
/// - word text is written under the `word` key, the same key transcribers use on input
/// - timestamps are the millisecond-rounded values the scheduler used, so reloading and
///   re-scheduling produces the same windows
///
/// Example output:
/// ```json
/// [
///   { "text": "hello world", "start": 0.0, "end": 1.5,
///     "words": [{ "word": "hello", "start": 0.0, "end": 0.75 },
///               { "word": "world", "start": 0.75, "end": 1.5 }] }
/// ]
/// ```
pub struct JsonArrayEncoder<W: Write> {
    w: W,

    /// Whether the opening `[` has been written.
    started: bool,

    /// Whether the next segment is the first array element (no leading comma).
    first: bool,

    /// Set by `close`; a closed artifact accepts no more segments.
    closed: bool,
}

impl<W: Write> JsonArrayEncoder<W> {
    /// Create an encoder that streams the artifact into `w`.
    ///
    /// Nothing is written until the first segment (or `close`), so an encoder that is dropped
    /// unused leaves its writer untouched.
    pub fn new(w: W) -> Self {
        Self {
            w,
            started: false,
            first: true,
            closed: false,
        }
    }

    fn start_if_needed(&mut self) -> Result<()> {
        if !self.started {
            self.w.write_all(b"[")?;
            self.started = true;
        }
        Ok(())
    }
}

impl<W: Write> SegmentEncoder for JsonArrayEncoder<W> {
    /// Append one prepared segment, words included, and flush it.
    fn write_segment(&mut self, seg: &Segment) -> Result<()> {
        if self.closed {
            return Err(Error::msg("cannot write segment: encoder is already closed"));
        }

        self.start_if_needed()?;
        if !self.first {
            self.w.write_all(b",")?;
        }
        self.first = false;

        // `Word::text` serializes as `word`.
        serde_json::to_writer(&mut self.w, seg)?;

        // Long transcripts are written segment by segment; let pipes see each one.
        self.w.flush()?;
        Ok(())
    }

    /// Close the array and flush.
    ///
    /// An artifact with no segments is still valid JSON (`[]`). Closing twice is a no-op.
    fn close(&mut self) -> Result<()> {
        if self.closed {
            return Ok(());
        }

        self.start_if_needed()?;
        self.w.write_all(b"]")?;
        self.w.flush()?;
        self.closed = true;
        Ok(())
    }
}
