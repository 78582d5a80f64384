//! Screen-zone classification.
//!
//! A bounding box is placed in one of three vertical thirds of the frame by
//! its horizontal center. The center is computed with integer division that
//! truncates toward zero, then compared against the exact (fractional) thirds
//! of the frame width.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Horizontal zone of the frame an object occupies.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Position {
    Left,
    Center,
    Right,
}

impl Position {
    pub fn as_str(&self) -> &'static str {
        match self {
            Position::Left => "left",
            Position::Center => "center",
            Position::Right => "right",
        }
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Classify a box by the midpoint of its horizontal bounds.
///
/// A center exactly on `width / 3` belongs to `Center`, a center exactly on
/// `2 * width / 3` belongs to `Right`.
///
/// Degenerate inputs never fail: a non-positive `frame_width` yields
/// `Center`, and inverted bounds (`x_min > x_max`) are used as given since
/// the midpoint does not depend on their order.
pub fn classify_position(x_min: i32, x_max: i32, frame_width: i32) -> Position {
    if frame_width <= 0 {
        return Position::Center;
    }

    // i64 so that the sum of two extreme i32 bounds cannot overflow.
    let center = (i64::from(x_min) + i64::from(x_max)) / 2;
    let center = center as f64;
    let width = f64::from(frame_width);

    if center < width / 3.0 {
        Position::Left
    } else if center < 2.0 * width / 3.0 {
        Position::Center
    } else {
        Position::Right
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn classifies_the_three_zones() {
        assert_eq!(classify_position(0, 0, 300), Position::Left);
        assert_eq!(classify_position(150, 150, 300), Position::Center);
        assert_eq!(classify_position(299, 299, 300), Position::Right);
    }

    #[test]
    fn exact_thirds_belong_to_the_next_zone() {
        assert_eq!(classify_position(99, 99, 300), Position::Left);
        assert_eq!(classify_position(100, 100, 300), Position::Center);
        assert_eq!(classify_position(199, 199, 300), Position::Center);
        assert_eq!(classify_position(200, 200, 300), Position::Right);
    }

    #[test]
    fn center_truncates_toward_zero() {
        // (99 + 100) / 2 = 99.5 -> 99, still left of 100.
        assert_eq!(classify_position(99, 100, 300), Position::Left);
        // (-1 + 0) / 2 = -0.5 -> 0.
        assert_eq!(classify_position(-1, 0, 300), Position::Left);
    }

    #[test]
    fn thirds_are_not_rounded_for_uneven_widths() {
        // 640 / 3 = 213.33.., so 213 is left and 214 is center.
        assert_eq!(classify_position(213, 213, 640), Position::Left);
        assert_eq!(classify_position(214, 214, 640), Position::Center);
    }

    #[test]
    fn degenerate_inputs_are_deterministic() {
        assert_eq!(classify_position(10, 20, 0), Position::Center);
        assert_eq!(classify_position(10, 20, -5), Position::Center);
        assert_eq!(
            classify_position(280, 20, 300),
            classify_position(20, 280, 300)
        );
        assert_eq!(classify_position(i32::MAX, i32::MAX, 300), Position::Right);
    }

    #[test]
    fn displays_lowercase_names() {
        assert_eq!(Position::Left.to_string(), "left");
        assert_eq!(Position::Center.to_string(), "center");
        assert_eq!(Position::Right.to_string(), "right");
    }
}
