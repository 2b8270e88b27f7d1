use std::io::Write;

use crate::segment_encoder::SegmentEncoder;
use crate::segments::Segment;
use crate::{Error, Result};

/// A `SegmentEncoder` that writes SubRip (`.srt`) cues.
///
/// Cues are numbered from 1 in the order segments are written. Each cue is flushed as soon as
/// it is written so streaming consumers see output promptly.
pub struct SrtEncoder<W: Write> {
    w: W,
    /// Number of cues written so far.
    cues: usize,
    closed: bool,
}

impl<W: Write> SrtEncoder<W> {
    pub fn new(w: W) -> Self {
        Self {
            w,
            cues: 0,
            closed: false,
        }
    }
}

impl<W: Write> SegmentEncoder for SrtEncoder<W> {
    fn write_segment(&mut self, seg: &Segment) -> Result<()> {
        if self.closed {
            return Err(Error::msg("cannot write segment: encoder is already closed"));
        }

        self.cues += 1;
        let start = format_timestamp_srt(seg.start);
        let end = format_timestamp_srt(seg.end);

        // `-->` inside cue text would be read as a timing line.
        let text = seg.text.trim().replace("-->", "->");

        writeln!(&mut self.w, "{}", self.cues)?;
        writeln!(&mut self.w, "{start} --> {end}")?;
        writeln!(&mut self.w, "{text}")?;
        writeln!(&mut self.w)?;
        self.w.flush()?;

        Ok(())
    }

    /// Flush the underlying writer. This is idempotent.
    fn close(&mut self) -> Result<()> {
        if self.closed {
            return Ok(());
        }
        self.w.flush()?;
        self.closed = true;
        Ok(())
    }
}

/// Format seconds as an SRT timestamp (`HH:MM:SS,mmm`), rounded to the nearest millisecond.
/// Negative inputs clamp to zero.
fn format_timestamp_srt(seconds: f64) -> String {
    let total_ms = (seconds.max(0.0) * 1000.0).round() as u64;

    let ms = total_ms % 1000;
    let total_s = total_ms / 1000;
    let s = total_s % 60;
    let total_m = total_s / 60;
    let m = total_m % 60;
    let h = total_m / 60;

    format!("{h:02}:{m:02}:{s:02},{ms:03}")
}
