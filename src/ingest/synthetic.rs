//! Synthetic detection source for `stub://` locations.
//!
//! Plays a fixed walk through five scenes: an empty corridor, a person on
//! the left, a knife straight ahead, a car on the right among furniture, and
//! the corridor again. Box coordinates get a few pixels of seeded jitter so
//! consecutive frames differ the way real detector output does, without any
//! box leaving its screen third.

use anyhow::{anyhow, Result};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::time::Duration;

use super::{FrameSource, SourceStats};
use crate::detect::{DetectionFrame, PixelBox, RawDetection};

const JITTER_PX: i32 = 2;

/// Configuration for a synthetic source.
#[derive(Clone, Debug)]
pub struct SyntheticConfig {
    pub width: u32,
    pub height: u32,
    /// Frame rate used to derive timestamps.
    pub fps: u32,
    pub seed: u64,
}

impl Default for SyntheticConfig {
    fn default() -> Self {
        Self {
            width: 640,
            height: 480,
            fps: 10,
            seed: 0,
        }
    }
}

/// An object in a scene, in fractions of the frame size.
struct Prop {
    class: &'static str,
    center_x: f32,
    center_y: f32,
    width: f32,
    height: f32,
    confidence: f32,
}

struct Scene {
    frames: u64,
    props: &'static [Prop],
}

const fn prop(
    class: &'static str,
    center_x: f32,
    center_y: f32,
    width: f32,
    height: f32,
    confidence: f32,
) -> Prop {
    Prop {
        class,
        center_x,
        center_y,
        width,
        height,
        confidence,
    }
}

const WALK: &[Scene] = &[
    Scene {
        frames: 15,
        props: &[],
    },
    Scene {
        frames: 30,
        props: &[
            prop("person", 0.15, 0.5, 0.2, 0.6, 0.88),
            // Below the default threshold; filtered by the session.
            prop("bottle", 0.8, 0.7, 0.05, 0.1, 0.3),
        ],
    },
    Scene {
        frames: 30,
        props: &[
            prop("person", 0.15, 0.5, 0.2, 0.6, 0.86),
            prop("knife", 0.5, 0.6, 0.08, 0.05, 0.72),
        ],
    },
    Scene {
        frames: 30,
        props: &[
            prop("chair", 0.5, 0.6, 0.2, 0.3, 0.64),
            prop("car", 0.83, 0.5, 0.3, 0.3, 0.91),
            prop("bench", 0.17, 0.7, 0.25, 0.15, 0.58),
        ],
    },
    Scene {
        frames: 15,
        props: &[],
    },
];

/// Scripted `stub://walk` source.
pub struct SyntheticSource {
    config: SyntheticConfig,
    location: String,
    rng: StdRng,
    frame_count: u64,
    connected: bool,
}

impl SyntheticSource {
    pub fn new(location: &str, config: SyntheticConfig) -> Result<Self> {
        if location != "stub://walk" {
            return Err(anyhow!(
                "unknown synthetic scenario '{}' (available: stub://walk)",
                location
            ));
        }
        if config.width == 0 || config.height == 0 {
            return Err(anyhow!("synthetic frame size must be non-zero"));
        }
        if config.fps == 0 {
            return Err(anyhow!("synthetic fps must be >= 1"));
        }
        Ok(Self {
            rng: StdRng::seed_from_u64(config.seed),
            config,
            location: location.to_string(),
            frame_count: 0,
            connected: false,
        })
    }

    /// Total frames in the scenario.
    pub fn len(&self) -> u64 {
        WALK.iter().map(|scene| scene.frames).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn scene_at(&self, index: u64) -> Option<&'static Scene> {
        let mut remaining = index;
        for scene in WALK {
            if remaining < scene.frames {
                return Some(scene);
            }
            remaining -= scene.frames;
        }
        None
    }

    fn place(&mut self, prop: &Prop) -> RawDetection {
        let w = self.config.width as f32;
        let h = self.config.height as f32;
        let half_w = prop.width * w / 2.0;
        let half_h = prop.height * h / 2.0;
        let cx = prop.center_x * w;
        let cy = prop.center_y * h;
        let dx = self.rng.gen_range(-JITTER_PX..=JITTER_PX);
        let dy = self.rng.gen_range(-JITTER_PX..=JITTER_PX);
        let bbox = PixelBox::from_coords([cx - half_w, cy - half_h, cx + half_w, cy + half_h]);
        RawDetection::new(
            prop.class,
            prop.confidence,
            PixelBox::new(
                bbox.x_min + dx,
                bbox.y_min + dy,
                bbox.x_max + dx,
                bbox.y_max + dy,
            ),
        )
    }
}

impl FrameSource for SyntheticSource {
    fn connect(&mut self) -> Result<()> {
        log::info!(
            "SyntheticSource: connected to {} ({} frames)",
            self.location,
            self.len()
        );
        self.connected = true;
        Ok(())
    }

    fn next_frame(&mut self) -> Result<Option<DetectionFrame>> {
        if !self.connected {
            return Err(anyhow!("synthetic source {} is not connected", self.location));
        }
        let index = self.frame_count;
        let Some(scene) = self.scene_at(index) else {
            return Ok(None);
        };
        let detections = scene.props.iter().map(|prop| self.place(prop)).collect();
        self.frame_count += 1;

        let frame_interval = Duration::from_secs(1) / self.config.fps;
        Ok(Some(DetectionFrame {
            index,
            timestamp: Some(frame_interval * index as u32),
            width: self.config.width,
            height: self.config.height,
            detections,
        }))
    }

    fn is_healthy(&self) -> bool {
        self.connected
    }

    fn stats(&self) -> SourceStats {
        SourceStats {
            frames_read: self.frame_count,
            location: self.location.clone(),
        }
    }
}
