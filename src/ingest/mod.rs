//! Detection frame sources.
//!
//! The vision model runs outside this crate. Sources deliver its per-frame
//! output (frame size plus labelled pixel boxes) as `DetectionFrame`s:
//! - `ReplaySource`: JSON Lines from a file or stdin (recorded video, or a
//!   live detector piping its output in)
//! - `SyntheticSource`: scripted `stub://` scenes for demos and tests
//! - `load_still_frame`: a single JSON frame (still image)
//!
//! Sources do not filter by confidence or classify positions; the session
//! does that.

mod replay;
mod synthetic;

use anyhow::{anyhow, Result};

use crate::detect::DetectionFrame;

pub use replay::{load_still_frame, parse_frame, ReplaySource};
pub use synthetic::{SyntheticConfig, SyntheticSource};

/// A stream of detection frames.
pub trait FrameSource {
    /// Open the underlying input.
    fn connect(&mut self) -> Result<()>;

    /// Next frame, or `None` once the input is exhausted.
    fn next_frame(&mut self) -> Result<Option<DetectionFrame>>;

    fn is_healthy(&self) -> bool;

    fn stats(&self) -> SourceStats;
}

/// Statistics for a frame source.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SourceStats {
    pub frames_read: u64,
    pub location: String,
}

/// Open a source by location: `stub://<name>`, `-` for stdin, or a local path.
pub fn open_source(location: &str, synthetic: SyntheticConfig) -> Result<Box<dyn FrameSource>> {
    let location = location.trim();
    if location.is_empty() {
        return Err(anyhow!("input location must not be empty"));
    }
    if location.starts_with("stub://") {
        return Ok(Box::new(SyntheticSource::new(location, synthetic)?));
    }
    if location == "-" {
        return Ok(Box::new(ReplaySource::stdin()));
    }
    if location.contains("://") {
        return Err(anyhow!(
            "input '{}' is not supported: use a local file, '-' or stub://",
            location
        ));
    }
    Ok(Box::new(ReplaySource::open(location)?))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_remote_locations() {
        assert!(open_source("rtsp://camera", SyntheticConfig::default()).is_err());
        assert!(open_source("  ", SyntheticConfig::default()).is_err());
    }

    #[test]
    fn opens_stub_sources() {
        let mut source = open_source("stub://walk", SyntheticConfig::default()).unwrap();
        source.connect().unwrap();
        assert!(source.next_frame().unwrap().is_some());
        assert_eq!(source.stats().location, "stub://walk");
    }
}
