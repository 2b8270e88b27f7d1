/// What the CLI writes to stdout.
///
/// Each artifact variant maps to a concrete `SegmentEncoder` implementation;
/// `Instructions` is the timed overlay list for the rendering collaborator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "cli", derive(clap::ValueEnum))]
pub enum OutputType {
    /// Render instructions as a JSON array.
    Instructions,

    /// Prepared segments (with word timings) as a JSON array.
    Json,

    /// Prepared segments as SubRip subtitles.
    Srt,
}
