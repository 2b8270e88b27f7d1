use anyhow::{Context, Result};
use clap::Parser;

use std::fs::File;
use std::io::{self, BufReader, BufWriter, Write};
use std::path::PathBuf;

use captacity::font::DEFAULT_FONT_DIR;
use captacity::json_array_encoder::JsonArrayEncoder;
use captacity::logging;
use captacity::opts::{CaptionOpts, FrameGeometry};
use captacity::output_type::OutputType;
use captacity::scheduler::CaptionScheduler;
use captacity::segment_encoder::{SegmentEncoder, write_all_segments};
use captacity::segments::load_segments;
use captacity::srt_encoder::SrtEncoder;
use captacity::wrapper::LayoutEvent;

fn main() -> Result<()> {
    logging::init();
    let params = Params::parse();
    let opts = params.to_opts()?;

    let segments_file = File::open(&params.segments_path)
        .with_context(|| format!("failed to open segments '{}'", params.segments_path.display()))?;
    let segments = load_segments(BufReader::new(segments_file))?;

    let frame = FrameGeometry::new(params.frame_width, params.frame_height);
    let scheduler = CaptionScheduler::from_font(opts, frame, &params.font_dir)?;

    let stdout = io::stdout();
    let mut writer = BufWriter::new(stdout.lock());

    match params.output_type {
        OutputType::Instructions => {
            let instructions = scheduler.run(&segments);
            serde_json::to_writer_pretty(&mut writer, &instructions)?;
            writeln!(writer)?;
            writer.flush()?;
        }
        OutputType::Json | OutputType::Srt => {
            let prepared = scheduler.prepare(&segments);
            let mut encoder: Box<dyn SegmentEncoder> = match params.output_type {
                OutputType::Srt => Box::new(SrtEncoder::new(writer)),
                _ => Box::new(JsonArrayEncoder::new(writer)),
            };
            write_all_segments(&mut *encoder, &prepared)?;
        }
    }

    for event in scheduler.take_events() {
        match event {
            LayoutEvent::WordTooWide {
                text,
                width,
                max_width,
            } => eprintln!("NOTICE: word '{text}' is too long for the frame ({width}px > {max_width}px)"),
        }
    }

    Ok(())
}

#[derive(Parser, Debug)]
#[command(name = "captacity")]
#[command(about = "Lay out and time captions for a video frame")]
struct Params {
    /// Transcript segments as JSON (`[{text, start, end, words?}]` or a Whisper result).
    #[arg(short = 's', long = "segments")]
    segments_path: PathBuf,

    /// Optional JSON file with caption options; flags below override it.
    #[arg(short = 'c', long = "config")]
    config_path: Option<PathBuf>,

    /// Font file name or path.
    #[arg(short = 'f', long = "font")]
    font: Option<String>,

    /// Directory searched for bare font names.
    #[arg(long = "font-dir", default_value = DEFAULT_FONT_DIR)]
    font_dir: PathBuf,

    #[arg(long = "frame-width")]
    frame_width: u32,

    #[arg(long = "frame-height")]
    frame_height: u32,

    #[arg(long = "font-size")]
    font_size: Option<u32>,

    #[arg(long = "line-count")]
    line_count: Option<u32>,

    #[arg(long = "padding")]
    padding: Option<u32>,

    /// Disable per-word highlight windows.
    #[arg(long = "no-highlight", default_value_t = false)]
    no_highlight: bool,

    #[arg(
        short = 'o',
        long = "output-type",
        value_enum,
        default_value_t = OutputType::Instructions
    )]
    output_type: OutputType,
}

impl Params {
    fn to_opts(&self) -> Result<CaptionOpts> {
        let mut opts = match &self.config_path {
            Some(path) => {
                let file = File::open(path)
                    .with_context(|| format!("failed to open config '{}'", path.display()))?;
                CaptionOpts::from_json_reader(BufReader::new(file))?
            }
            None => CaptionOpts::default(),
        };

        if let Some(font) = &self.font {
            opts.font = font.clone();
        }
        if let Some(font_size) = self.font_size {
            opts.font_size = font_size;
        }
        if let Some(line_count) = self.line_count {
            opts.line_count = line_count;
        }
        if let Some(padding) = self.padding {
            opts.padding = padding;
        }
        if self.no_highlight {
            opts.highlight_current_word = false;
        }

        opts.validate()?;
        Ok(opts)
    }
}
