//! Navigation planner.
//!
//! Turns the located detections of one frame into a single instruction:
//! a short description of the most relevant objects followed by one
//! movement command derived from the most relevant object alone.
//!
//! Ranking is by priority tier first (danger, then moving, then anything
//! else) and by bounding-box area within a tier, largest first. The sort is
//! stable, so detections that tie keep the detector's order.

use serde::Serialize;
use std::collections::HashSet;
use std::fmt;

use crate::detect::Detection;
use crate::position::Position;

/// Maximum number of detections named in the description.
pub const DESCRIBED_LIMIT: usize = 3;

/// Sentence for a frame without detections.
pub const CLEAR_PATH: &str = "Path is clear.";

pub const DEFAULT_DANGER_CLASSES: &[&str] = &["knife", "scissors", "gun", "fire"];
pub const DEFAULT_MOVING_CLASSES: &[&str] =
    &["person", "car", "bus", "truck", "motorcycle", "bicycle"];

/// Ranking tier of a detection. Lower sorts first.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    Danger = 1,
    Moving = 2,
    Other = 3,
}

impl Priority {
    pub fn tier(&self) -> u8 {
        *self as u8
    }
}

/// The class vocabularies that decide a detection's priority.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ClassSets {
    danger: HashSet<String>,
    moving: HashSet<String>,
}

impl ClassSets {
    pub fn new<D, M>(danger: D, moving: M) -> Self
    where
        D: IntoIterator,
        D::Item: Into<String>,
        M: IntoIterator,
        M::Item: Into<String>,
    {
        Self {
            danger: danger.into_iter().map(Into::into).collect(),
            moving: moving.into_iter().map(Into::into).collect(),
        }
    }

    /// Danger membership is checked first, so a class in both sets is danger.
    pub fn priority_of(&self, class_name: &str) -> Priority {
        if self.danger.contains(class_name) {
            Priority::Danger
        } else if self.moving.contains(class_name) {
            Priority::Moving
        } else {
            Priority::Other
        }
    }

    /// Class names present in both sets.
    pub fn overlap(&self) -> Vec<&str> {
        let mut shared: Vec<&str> = self
            .danger
            .intersection(&self.moving)
            .map(String::as_str)
            .collect();
        shared.sort_unstable();
        shared
    }
}

impl Default for ClassSets {
    fn default() -> Self {
        Self::new(
            DEFAULT_DANGER_CLASSES.iter().copied(),
            DEFAULT_MOVING_CLASSES.iter().copied(),
        )
    }
}

/// Movement command spoken after the description.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Action {
    Stop,
    MoveRight,
    MoveLeft,
    MoveForward,
}

impl Action {
    /// Steer away from the primary object; stop when it is straight ahead.
    pub fn avoiding(position: Position) -> Self {
        match position {
            Position::Center => Action::Stop,
            Position::Left => Action::MoveRight,
            Position::Right => Action::MoveLeft,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Action::Stop => "Stop.",
            Action::MoveRight => "Move right.",
            Action::MoveLeft => "Move left.",
            Action::MoveForward => "Move forward.",
        }
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A detection together with the tier it was ranked in.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct RankedDetection {
    #[serde(flatten)]
    pub detection: Detection,
    pub priority: Priority,
}

impl fmt::Display for RankedDetection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} on the {}",
            self.detection.class_name, self.detection.position
        )
    }
}

/// Planner output for one frame.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct Instruction {
    /// Highest-ranked detections, at most `DESCRIBED_LIMIT`, in rank order.
    pub described: Vec<RankedDetection>,
    pub action: Action,
}

impl Instruction {
    pub fn clear_path() -> Self {
        Self {
            described: Vec::new(),
            action: Action::MoveForward,
        }
    }

    pub fn is_clear(&self) -> bool {
        self.described.is_empty()
    }

    /// The detection the action was derived from.
    pub fn primary(&self) -> Option<&RankedDetection> {
        self.described.first()
    }

    /// Description clause, e.g. `"knife on the center. person on the left."`.
    pub fn description(&self) -> Option<String> {
        if self.described.is_empty() {
            return None;
        }
        let parts: Vec<String> = self.described.iter().map(ToString::to_string).collect();
        Some(format!("{}.", parts.join(". ")))
    }

    pub fn sentence(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for Instruction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.description() {
            Some(description) => write!(f, "{} {}", description, self.action),
            None => write!(f, "{} {}", CLEAR_PATH, self.action),
        }
    }
}

/// Ranks detections and derives the instruction for a frame.
#[derive(Clone, Debug, Default)]
pub struct NavigationPlanner {
    classes: ClassSets,
}

impl NavigationPlanner {
    pub fn new(classes: ClassSets) -> Self {
        Self { classes }
    }

    pub fn classes(&self) -> &ClassSets {
        &self.classes
    }

    /// Rank every detection: priority ascending, then area descending.
    pub fn rank(&self, detections: &[Detection]) -> Vec<RankedDetection> {
        let mut ranked: Vec<RankedDetection> = detections
            .iter()
            .map(|detection| RankedDetection {
                priority: self.classes.priority_of(&detection.class_name),
                detection: detection.clone(),
            })
            .collect();
        // `sort_by` is stable: equal priority and area keep input order.
        ranked.sort_by(|a, b| {
            a.priority
                .cmp(&b.priority)
                .then_with(|| b.detection.area.cmp(&a.detection.area))
        });
        ranked
    }

    pub fn plan(&self, detections: &[Detection]) -> Instruction {
        let mut ranked = self.rank(detections);
        let Some(primary) = ranked.first() else {
            return Instruction::clear_path();
        };
        let action = Action::avoiding(primary.detection.position);
        ranked.truncate(DESCRIBED_LIMIT);
        Instruction {
            described: ranked,
            action,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn det(class: &str, position: Position, area: u64) -> Detection {
        Detection::new(class, position, area)
    }

    fn names(instruction: &Instruction) -> Vec<&str> {
        instruction
            .described
            .iter()
            .map(|r| r.detection.class_name.as_str())
            .collect()
    }

    #[test]
    fn empty_frame_is_a_clear_path() {
        let planner = NavigationPlanner::default();
        let instruction = planner.plan(&[]);
        assert!(instruction.is_clear());
        assert_eq!(instruction.description(), None);
        assert_eq!(instruction.sentence(), "Path is clear. Move forward.");
    }

    #[test]
    fn danger_outranks_larger_objects() {
        let planner = NavigationPlanner::default();
        let instruction = planner.plan(&[
            det("person", Position::Left, 500),
            det("knife", Position::Center, 200),
        ]);
        assert_eq!(
            instruction.sentence(),
            "knife on the center. person on the left. Stop."
        );
        assert_eq!(
            instruction.primary().map(|r| r.priority),
            Some(Priority::Danger)
        );
    }

    #[test]
    fn tiers_order_danger_moving_other() {
        let planner = NavigationPlanner::default();
        let instruction = planner.plan(&[
            det("chair", Position::Right, 90_000),
            det("car", Position::Left, 50_000),
            det("scissors", Position::Right, 10),
        ]);
        assert_eq!(names(&instruction), vec!["scissors", "car", "chair"]);
        assert_eq!(instruction.action, Action::MoveLeft);
    }

    #[test]
    fn larger_area_first_within_a_tier() {
        let planner = NavigationPlanner::default();
        let instruction = planner.plan(&[
            det("bus", Position::Right, 100),
            det("person", Position::Left, 300),
            det("bicycle", Position::Center, 200),
        ]);
        assert_eq!(names(&instruction), vec!["person", "bicycle", "bus"]);
        assert_eq!(instruction.action, Action::MoveRight);
    }

    #[test]
    fn ties_keep_detector_order() {
        let planner = NavigationPlanner::default();
        let ranked = planner.rank(&[
            det("cup", Position::Left, 50),
            det("bottle", Position::Center, 50),
            det("book", Position::Right, 50),
            det("laptop", Position::Left, 50),
        ]);
        let order: Vec<&str> = ranked
            .iter()
            .map(|r| r.detection.class_name.as_str())
            .collect();
        assert_eq!(order, vec!["cup", "bottle", "book", "laptop"]);
    }

    #[test]
    fn describes_at_most_three() {
        let planner = NavigationPlanner::default();
        let detections: Vec<Detection> = (0..6)
            .map(|i| det("person", Position::Center, 100 + i))
            .collect();
        let instruction = planner.plan(&detections);
        assert_eq!(instruction.described.len(), DESCRIBED_LIMIT);
        assert_eq!(
            instruction.sentence(),
            "person on the center. person on the center. person on the center. Stop."
        );
        assert_eq!(instruction.described[0].detection.area, 105);
    }

    #[test]
    fn action_follows_primary_position() {
        let planner = NavigationPlanner::default();
        let cases = [
            (Position::Center, "Stop."),
            (Position::Left, "Move right."),
            (Position::Right, "Move left."),
        ];
        for (position, expected) in cases {
            let instruction = planner.plan(&[det("dog", position, 1)]);
            assert_eq!(instruction.action.as_str(), expected);
            assert_eq!(
                instruction.sentence(),
                format!("dog on the {}. {}", position, expected)
            );
        }
    }

    #[test]
    fn planning_has_no_hidden_state() {
        let planner = NavigationPlanner::default();
        let detections = vec![
            det("truck", Position::Right, 4000),
            det("fire", Position::Left, 10),
        ];
        assert_eq!(planner.plan(&detections), planner.plan(&detections));
    }

    #[test]
    fn custom_vocabularies_drive_priority() {
        let planner = NavigationPlanner::new(ClassSets::new(["stairs"], ["dog"]));
        let instruction = planner.plan(&[
            det("dog", Position::Center, 900),
            det("knife", Position::Left, 5000),
            det("stairs", Position::Right, 1),
        ]);
        assert_eq!(names(&instruction), vec!["stairs", "dog", "knife"]);
        assert_eq!(instruction.action, Action::MoveLeft);
    }

    #[test]
    fn class_in_both_sets_is_danger() {
        let classes = ClassSets::new(["drone"], ["drone", "car"]);
        assert_eq!(classes.priority_of("drone"), Priority::Danger);
        assert_eq!(classes.priority_of("car"), Priority::Moving);
        assert_eq!(classes.priority_of("Car"), Priority::Other);
        assert_eq!(classes.overlap(), vec!["drone"]);
        assert_eq!(Priority::Danger.tier(), 1);
        assert_eq!(Priority::Other.tier(), 3);
    }
}
