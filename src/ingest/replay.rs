//! Replay of recorded detector output.
//!
//! One JSON object per line:
//!
//! ```text
//! {"frame": 12, "timestamp_ms": 400, "width": 640, "height": 480,
//!  "detections": [{"class": "knife", "confidence": 0.91, "bbox": [300, 200, 340, 260]}]}
//! ```
//!
//! `frame` and `timestamp_ms` are optional; frames without an index are
//! numbered in reading order. Blank lines and lines starting with `#` are
//! skipped. Unknown fields are ignored so detector pipelines can attach
//! their own metadata.

use anyhow::{anyhow, Context, Result};
use serde::Deserialize;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;
use std::time::Duration;

use super::{FrameSource, SourceStats};
use crate::detect::{DetectionFrame, PixelBox, RawDetection};

#[derive(Debug, Deserialize)]
struct FrameRecord {
    frame: Option<u64>,
    timestamp_ms: Option<u64>,
    width: u32,
    height: u32,
    #[serde(default)]
    detections: Vec<DetectionRecord>,
}

#[derive(Debug, Deserialize)]
struct DetectionRecord {
    class: String,
    confidence: f32,
    bbox: [f32; 4],
}

impl FrameRecord {
    fn into_frame(self, fallback_index: u64) -> Result<DetectionFrame> {
        if self.width == 0 {
            return Err(anyhow!("frame width must be greater than zero"));
        }
        let detections = self
            .detections
            .into_iter()
            .map(|det| {
                if det.class.trim().is_empty() {
                    return Err(anyhow!("detection class must not be empty"));
                }
                Ok(RawDetection::new(
                    det.class,
                    det.confidence,
                    PixelBox::from_coords(det.bbox),
                ))
            })
            .collect::<Result<Vec<_>>>()?;
        Ok(DetectionFrame {
            index: self.frame.unwrap_or(fallback_index),
            timestamp: self.timestamp_ms.map(Duration::from_millis),
            width: self.width,
            height: self.height,
            detections,
        })
    }
}

/// Parse one frame object. Frames without an explicit index get `fallback_index`.
pub fn parse_frame(json: &str, fallback_index: u64) -> Result<DetectionFrame> {
    let record: FrameRecord = serde_json::from_str(json)?;
    record.into_frame(fallback_index)
}

/// Read a single frame from a JSON file (still-image mode).
pub fn load_still_frame(path: impl AsRef<Path>) -> Result<DetectionFrame> {
    let path = path.as_ref();
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read frame file {}", path.display()))?;
    parse_frame(&raw, 0).with_context(|| format!("invalid frame file {}", path.display()))
}

/// JSON Lines replay source.
pub struct ReplaySource {
    reader: Box<dyn BufRead>,
    location: String,
    line_no: u64,
    frames_read: u64,
    healthy: bool,
}

impl ReplaySource {
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let file = File::open(path)
            .with_context(|| format!("failed to open detection log {}", path.display()))?;
        Ok(Self::from_reader(
            BufReader::new(file),
            path.display().to_string(),
        ))
    }

    pub fn stdin() -> Self {
        Self::from_reader(BufReader::new(std::io::stdin()), "-")
    }

    pub fn from_reader(reader: impl BufRead + 'static, location: impl Into<String>) -> Self {
        Self {
            reader: Box::new(reader),
            location: location.into(),
            line_no: 0,
            frames_read: 0,
            healthy: true,
        }
    }

    fn read_frame(&mut self) -> Result<Option<DetectionFrame>> {
        let mut line = String::new();
        loop {
            line.clear();
            let read = self
                .reader
                .read_line(&mut line)
                .with_context(|| format!("failed to read {}", self.location))?;
            if read == 0 {
                return Ok(None);
            }
            self.line_no += 1;

            let trimmed = line.trim();
            if trimmed.is_empty() || trimmed.starts_with('#') {
                continue;
            }

            let frame = parse_frame(trimmed, self.frames_read)
                .with_context(|| format!("{}:{}: invalid frame", self.location, self.line_no))?;
            self.frames_read += 1;
            return Ok(Some(frame));
        }
    }
}

impl FrameSource for ReplaySource {
    fn connect(&mut self) -> Result<()> {
        log::info!("ReplaySource: reading detections from {}", self.location);
        Ok(())
    }

    fn next_frame(&mut self) -> Result<Option<DetectionFrame>> {
        let result = self.read_frame();
        if result.is_err() {
            self.healthy = false;
        }
        result
    }

    fn is_healthy(&self) -> bool {
        self.healthy
    }

    fn stats(&self) -> SourceStats {
        SourceStats {
            frames_read: self.frames_read,
            location: self.location.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    fn source(text: &str) -> ReplaySource {
        ReplaySource::from_reader(Cursor::new(text.to_string()), "test.jsonl")
    }

    #[test]
    fn reads_frames_and_skips_comments() {
        let mut src = source(
            "# recorded at the station\n\
             {\"width\": 300, \"height\": 200, \"detections\": []}\n\
             \n\
             {\"frame\": 9, \"timestamp_ms\": 1500, \"width\": 300, \"height\": 200,\
              \"detections\": [{\"class\": \"knife\", \"confidence\": 0.8, \"bbox\": [10.7, 0, 50.2, 40], \"class_id\": 43}]}\n",
        );
        src.connect().unwrap();

        let first = src.next_frame().unwrap().unwrap();
        assert_eq!(first.index, 0);
        assert_eq!(first.timestamp, None);
        assert!(first.detections.is_empty());

        let second = src.next_frame().unwrap().unwrap();
        assert_eq!(second.index, 9);
        assert_eq!(second.timestamp, Some(Duration::from_millis(1500)));
        assert_eq!(second.detections[0].class_name, "knife");
        assert_eq!(second.detections[0].bbox, PixelBox::new(10, 0, 50, 40));

        assert!(src.next_frame().unwrap().is_none());
        assert_eq!(src.stats().frames_read, 2);
        assert!(src.is_healthy());
    }

    #[test]
    fn errors_carry_line_numbers() {
        let mut src = source("{\"width\": 300, \"height\": 200}\n{\"width\": 300\n");
        assert!(src.next_frame().unwrap().is_some());
        let err = src.next_frame().unwrap_err();
        assert!(format!("{:#}", err).contains("test.jsonl:2"));
        assert!(!src.is_healthy());
    }

    #[test]
    fn zero_width_frames_are_rejected() {
        assert!(parse_frame(r#"{"width": 0, "height": 10}"#, 0).is_err());
    }

    #[test]
    fn empty_class_names_are_rejected() {
        let json = r#"{"width": 10, "height": 10,
            "detections": [{"class": " ", "confidence": 0.9, "bbox": [0, 0, 1, 1]}]}"#;
        assert!(parse_frame(json, 0).is_err());
    }
}
