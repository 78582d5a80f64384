//! Navigation session.
//!
//! One session per camera/input. It owns the planner, the throttle state and
//! the speech output, and turns each `DetectionFrame` into a `FrameReport`
//! for the presentation layer.

use serde::Serialize;
use std::time::Duration;

use crate::config::NavConfig;
use crate::detect::DetectionFrame;
use crate::planner::{Action, Instruction, NavigationPlanner, RankedDetection};
use crate::speech::SpeechSynthesizer;
use crate::throttle::{AnnouncementState, Throttle};

/// Default minimum detector confidence.
pub const DEFAULT_CONFIDENCE_THRESHOLD: f32 = 0.5;

/// Outcome of one frame, displayed every frame whether or not it was spoken.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct FrameReport {
    pub frame_index: u64,
    pub sentence: String,
    pub described: Vec<RankedDetection>,
    pub action: Action,
    /// The throttle allowed this sentence to be spoken.
    pub announced: bool,
    /// The sentence was handed to the synthesizer without error.
    pub spoken: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub speech_error: Option<String>,
}

/// Running totals for a session.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize)]
pub struct SessionStats {
    pub frames: u64,
    pub announcements: u64,
    pub spoken: u64,
    pub speech_failures: u64,
}

pub struct NavigationSession {
    planner: NavigationPlanner,
    throttle: Throttle,
    state: AnnouncementState,
    synth: Box<dyn SpeechSynthesizer>,
    voice_enabled: bool,
    confidence_threshold: f32,
    stats: SessionStats,
}

impl NavigationSession {
    pub fn new(
        planner: NavigationPlanner,
        throttle: Throttle,
        synth: impl SpeechSynthesizer + 'static,
    ) -> Self {
        Self {
            planner,
            throttle,
            state: AnnouncementState::new(),
            synth: Box::new(synth),
            voice_enabled: true,
            confidence_threshold: DEFAULT_CONFIDENCE_THRESHOLD,
            stats: SessionStats::default(),
        }
    }

    /// Build a session from loaded configuration.
    pub fn from_config(config: &NavConfig, synth: impl SpeechSynthesizer + 'static) -> Self {
        Self::new(
            NavigationPlanner::new(config.class_sets()),
            Throttle::new(config.cooldown),
            synth,
        )
        .with_voice(config.voice_enabled)
        .with_confidence_threshold(config.confidence_threshold)
    }

    pub fn with_voice(mut self, enabled: bool) -> Self {
        self.voice_enabled = enabled;
        self
    }

    pub fn with_confidence_threshold(mut self, threshold: f32) -> Self {
        self.confidence_threshold = threshold;
        self
    }

    pub fn voice_enabled(&self) -> bool {
        self.voice_enabled
    }

    pub fn set_voice_enabled(&mut self, enabled: bool) {
        self.voice_enabled = enabled;
    }

    pub fn announcement_state(&self) -> &AnnouncementState {
        &self.state
    }

    pub fn stats(&self) -> SessionStats {
        self.stats
    }

    pub fn synthesizer_name(&self) -> &'static str {
        self.synth.name()
    }

    /// Plan the frame's instruction without speaking it.
    pub fn plan(&self, frame: &DetectionFrame) -> Instruction {
        let detections = frame.locate(self.confidence_threshold);
        self.planner.plan(&detections)
    }

    /// Live/video path: plan, throttle, and speak when allowed.
    ///
    /// `now` is the time since the session started.
    pub fn process_frame(&mut self, frame: &DetectionFrame, now: Duration) -> FrameReport {
        let instruction = self.plan(frame);
        let sentence = instruction.sentence();
        let announced = self
            .throttle
            .should_announce(&mut self.state, &sentence, now);
        self.finish(frame.index, instruction, sentence, announced)
    }

    /// Still-image path: plan and speak once, bypassing the throttle.
    pub fn describe_still(&mut self, frame: &DetectionFrame) -> FrameReport {
        let instruction = self.plan(frame);
        let sentence = instruction.sentence();
        self.finish(frame.index, instruction, sentence, true)
    }

    fn finish(
        &mut self,
        frame_index: u64,
        instruction: Instruction,
        sentence: String,
        announced: bool,
    ) -> FrameReport {
        self.stats.frames += 1;
        if announced {
            self.stats.announcements += 1;
        }

        let mut spoken = false;
        let mut speech_error = None;
        if announced && self.voice_enabled {
            match self.synth.speak(&sentence) {
                Ok(()) => {
                    spoken = true;
                    self.stats.spoken += 1;
                }
                Err(e) => {
                    log::warn!("speech ({}) failed: {:#}", self.synth.name(), e);
                    self.stats.speech_failures += 1;
                    speech_error = Some(format!("{:#}", e));
                }
            }
        }

        FrameReport {
            frame_index,
            sentence,
            described: instruction.described,
            action: instruction.action,
            announced,
            spoken,
            speech_error,
        }
    }
}
