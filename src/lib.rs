//! Navigation assistant
//!
//! Turns the object detections of a camera frame into one short instruction
//! for a user navigating by camera, still image or recorded video, e.g.
//! `"knife on the center. person on the left. Stop."`, and decides whether
//! that instruction should be spoken again.
//!
//! # Pipeline
//!
//! For each frame:
//!
//! 1. A `FrameSource` delivers detector output (`DetectionFrame`).
//! 2. Boxes below the confidence threshold are dropped and the rest are
//!    placed in a screen third (`classify_position`).
//! 3. The `NavigationPlanner` ranks them (danger, moving, other; larger
//!    first) and builds the `Instruction`.
//! 4. The `Throttle` decides whether to speak; the `SpeechSynthesizer` is
//!    called only when it says yes. The text is displayed every frame.
//!
//! # Module Structure
//!
//! - `position`: screen-third classification
//! - `detect`: detection and frame types
//! - `planner`: ranking and instruction text
//! - `throttle`: repeat suppression with cooldown
//! - `speech`: synthesizer trait and the espeak engine
//! - `session`: per-input pipeline tying the above together
//! - `ingest`: detection frame sources
//! - `config`: file/env configuration
//! - `ui`: terminal presentation

pub mod config;
pub mod detect;
pub mod ingest;
pub mod planner;
pub mod position;
pub mod session;
pub mod speech;
pub mod throttle;
pub mod ui;

pub use config::NavConfig;
pub use detect::{Detection, DetectionFrame, PixelBox, RawDetection};
pub use ingest::{
    load_still_frame, open_source, FrameSource, ReplaySource, SourceStats, SyntheticConfig,
    SyntheticSource,
};
pub use planner::{
    Action, ClassSets, Instruction, NavigationPlanner, Priority, RankedDetection, DESCRIBED_LIMIT,
};
pub use position::{classify_position, Position};
pub use session::{FrameReport, NavigationSession, SessionStats};
pub use speech::{EspeakSynthesizer, MutedSynthesizer, SpeechSettings, SpeechSynthesizer};
pub use throttle::{AnnouncementState, Throttle, DEFAULT_COOLDOWN};
