use std::io::Read;

use serde::{Deserialize, Serialize};

use crate::Result;

/// One transcribed utterance.
///
/// Produced by a transcription collaborator (or read back from a persisted artifact). Word
/// timings are optional on input; [`crate::timing::synthesize`] fills them in when missing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Segment {
    pub text: String,
    /// Start time in seconds.
    pub start: f64,
    /// End time in seconds.
    pub end: f64,
    #[serde(default)]
    pub words: Vec<Word>,
}

/// The smallest timed unit of a segment.
///
/// Transcribers commonly emit word text with a leading space (`" hello"`); we keep the text as
/// given and trim wherever it is used.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Word {
    #[serde(rename = "word")]
    pub text: String,
    pub start: f64,
    pub end: f64,
}

impl Segment {
    pub fn new(text: impl Into<String>, start: f64, end: f64) -> Self {
        Self {
            text: text.into(),
            start,
            end,
            words: Vec::new(),
        }
    }

    pub fn duration(&self) -> f64 {
        self.end - self.start
    }
}

/// Accepted top-level transcript layouts.
#[derive(Deserialize)]
#[serde(untagged)]
enum TranscriptFile {
    /// `[{ text, start, end, words? }, ...]`
    Segments(Vec<Segment>),
    /// A Whisper-style result object: `{ "text": ..., "segments": [...], ... }`
    Whisper { segments: Vec<Segment> },
}

/// Load transcript segments from JSON.
///
/// Unknown fields (ids, token lists, probabilities) are ignored. Segments with `start > end`
/// violate the input contract; they are logged and passed through untouched.
pub fn load_segments<R: Read>(r: R) -> Result<Vec<Segment>> {
    let file: TranscriptFile = serde_json::from_reader(r)?;
    let segments = match file {
        TranscriptFile::Segments(segments) => segments,
        TranscriptFile::Whisper { segments } => segments,
    };

    for (index, seg) in segments.iter().enumerate() {
        if seg.start > seg.end {
            tracing::warn!(index, start = seg.start, end = seg.end, "segment ends before it starts");
        }
    }

    Ok(segments)
}
