use serde::Serialize;
use std::time::Duration;

use crate::position::{classify_position, Position};

/// Bounding box in integer pixel coordinates.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize)]
pub struct PixelBox {
    pub x_min: i32,
    pub y_min: i32,
    pub x_max: i32,
    pub y_max: i32,
}

impl PixelBox {
    pub fn new(x_min: i32, y_min: i32, x_max: i32, y_max: i32) -> Self {
        Self {
            x_min,
            y_min,
            x_max,
            y_max,
        }
    }

    /// Build a box from detector coordinates `[x_min, y_min, x_max, y_max]`.
    ///
    /// Fractional coordinates are truncated toward zero; out-of-range values
    /// saturate and NaN becomes 0.
    pub fn from_coords(coords: [f32; 4]) -> Self {
        Self::new(
            coords[0] as i32,
            coords[1] as i32,
            coords[2] as i32,
            coords[3] as i32,
        )
    }

    /// Pixel area. Inverted boxes count by the magnitude of their sides.
    pub fn area(&self) -> u64 {
        let w = (i64::from(self.x_max) - i64::from(self.x_min)).unsigned_abs();
        let h = (i64::from(self.y_max) - i64::from(self.y_min)).unsigned_abs();
        w.saturating_mul(h)
    }

    /// Flip the box horizontally inside a frame of `frame_width` pixels.
    pub fn mirrored(&self, frame_width: u32) -> Self {
        let width = i64::from(frame_width);
        let flip = |x: i32| {
            (width - i64::from(x)).clamp(i64::from(i32::MIN), i64::from(i32::MAX)) as i32
        };
        Self {
            x_min: flip(self.x_max),
            y_min: self.y_min,
            x_max: flip(self.x_min),
            y_max: self.y_max,
        }
    }
}

/// One detector output box, already decoded but not yet located.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct RawDetection {
    pub class_name: String,
    pub confidence: f32,
    pub bbox: PixelBox,
}

impl RawDetection {
    pub fn new(class_name: impl Into<String>, confidence: f32, bbox: PixelBox) -> Self {
        Self {
            class_name: class_name.into(),
            confidence,
            bbox,
        }
    }

    /// Place this box on screen, producing the planner's input.
    pub fn locate(&self, frame_width: u32) -> Detection {
        let width = i32::try_from(frame_width).unwrap_or(i32::MAX);
        Detection {
            class_name: self.class_name.clone(),
            position: classify_position(self.bbox.x_min, self.bbox.x_max, width),
            area: self.bbox.area(),
        }
    }
}

/// A recognized object in the current frame, as the planner sees it.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct Detection {
    pub class_name: String,
    pub position: Position,
    pub area: u64,
}

impl Detection {
    pub fn new(class_name: impl Into<String>, position: Position, area: u64) -> Self {
        Self {
            class_name: class_name.into(),
            position,
            area,
        }
    }
}

/// Detector output for one frame.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct DetectionFrame {
    /// Frame sequence number within its source.
    pub index: u64,
    /// Capture time relative to the start of the source, when known.
    pub timestamp: Option<Duration>,
    pub width: u32,
    pub height: u32,
    pub detections: Vec<RawDetection>,
}

impl DetectionFrame {
    /// Detections whose confidence is at or above `threshold`.
    pub fn detections_above(&self, threshold: f32) -> impl Iterator<Item = &RawDetection> + '_ {
        self.detections
            .iter()
            .filter(move |det| det.confidence >= threshold)
    }

    /// Filter by confidence and locate every surviving box, keeping detector order.
    pub fn locate(&self, threshold: f32) -> Vec<Detection> {
        self.detections_above(threshold)
            .map(|det| det.locate(self.width))
            .collect()
    }

    /// Mirror every box horizontally, as a front-facing camera preview does.
    pub fn mirrored(mut self) -> Self {
        let width = self.width;
        for det in &mut self.detections {
            det.bbox = det.bbox.mirrored(width);
        }
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn frame(detections: Vec<RawDetection>) -> DetectionFrame {
        DetectionFrame {
            index: 0,
            timestamp: None,
            width: 300,
            height: 200,
            detections,
        }
    }

    #[test]
    fn coords_truncate_to_pixels() {
        let bbox = PixelBox::from_coords([10.9, 20.2, 30.99, -4.7]);
        assert_eq!(bbox, PixelBox::new(10, 20, 30, -4));
        assert_eq!(PixelBox::from_coords([f32::NAN, 0.0, 1.0, 1.0]).x_min, 0);
    }

    #[test]
    fn area_is_never_negative() {
        assert_eq!(PixelBox::new(0, 0, 20, 10).area(), 200);
        assert_eq!(PixelBox::new(20, 10, 0, 0).area(), 200);
        assert_eq!(PixelBox::new(5, 5, 5, 50).area(), 0);
    }

    #[test]
    fn mirroring_swaps_sides() {
        let bbox = PixelBox::new(0, 5, 50, 60).mirrored(300);
        assert_eq!(bbox, PixelBox::new(250, 5, 300, 60));

        let located = RawDetection::new("person", 0.9, PixelBox::new(0, 0, 50, 60));
        let mirrored = frame(vec![located]).mirrored();
        assert_eq!(mirrored.locate(0.5)[0].position, Position::Right);
    }

    #[test]
    fn locate_filters_by_confidence_and_keeps_order() {
        let frame = frame(vec![
            RawDetection::new("chair", 0.6, PixelBox::new(200, 0, 280, 100)),
            RawDetection::new("knife", 0.3, PixelBox::new(0, 0, 10, 10)),
            RawDetection::new("person", 0.5, PixelBox::new(0, 0, 40, 100)),
        ]);

        let located = frame.locate(0.5);
        assert_eq!(
            located,
            vec![
                Detection::new("chair", Position::Right, 8000),
                Detection::new("person", Position::Left, 4000),
            ]
        );
        assert_eq!(frame.locate(0.0).len(), 3);
        assert!(frame.locate(1.0).is_empty());
    }
}
