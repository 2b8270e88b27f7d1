use crate::Result;
use crate::segments::Segment;

/// A sink for subtitle artifacts, fed one segment at a time.
///
/// Encoders stream to their writer; callers must call `close` once after the last segment.
pub trait SegmentEncoder {
    fn write_segment(&mut self, seg: &Segment) -> Result<()>;
    fn close(&mut self) -> Result<()>;
}

/// Write every segment to `encoder`, then close it.
pub fn write_all_segments(encoder: &mut dyn SegmentEncoder, segments: &[Segment]) -> Result<()> {
    for seg in segments {
        encoder.write_segment(seg)?;
    }
    encoder.close()
}
