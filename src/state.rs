//! Plain-data exchange schema for saving and loading a grid layout.
//!
//! ```json
//! { "rows": 5, "cols": 5,
//!   "obstacles": [ { "row": 0, "col": 2 } ],
//!   "start": { "row": 0, "col": 0 }, "goal": { "row": 4, "col": 4 } }
//! ```
//! Search scratch state is never part of the schema.
use serde::{Deserialize, Serialize};

use crate::cell::Coord;

/// An obstacle cell. `weight` is only written when it differs from the default of 1.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ObstacleEntry {
    pub row: usize,
    pub col: usize,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub weight: Option<u32>,
}

/// A traversable cell with a non-default weight.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct WeightEntry {
    pub row: usize,
    pub col: usize,
    pub weight: u32,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct GridState {
    pub rows: usize,
    pub cols: usize,
    #[serde(default)]
    pub obstacles: Vec<ObstacleEntry>,
    pub start: Coord,
    pub goal: Coord,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub weights: Vec<WeightEntry>,
}

impl GridState {
    pub fn to_json(&self) -> crate::Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn from_json(json: &str) -> crate::Result<GridState> {
        Ok(serde_json::from_str(json)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Error;

    #[test]
    fn parses_minimal_schema() {
        let json = r#"{
            "rows": 5, "cols": 6,
            "obstacles": [ {"row": 0, "col": 2}, {"row": 1, "col": 2, "weight": 4} ],
            "start": {"row": 0, "col": 0}, "goal": {"row": 4, "col": 5}
        }"#;
        let state = GridState::from_json(json).unwrap();
        assert_eq!(state.rows, 5);
        assert_eq!(state.cols, 6);
        assert_eq!(state.obstacles.len(), 2);
        assert_eq!(state.obstacles[1].weight, Some(4));
        assert_eq!(state.goal, Coord::new(4, 5));
        assert!(state.weights.is_empty());
    }

    #[test]
    fn missing_dimensions_are_malformed() {
        let json = r#"{ "cols": 6, "start": {"row": 0, "col": 0}, "goal": {"row": 1, "col": 1} }"#;
        assert!(matches!(
            GridState::from_json(json),
            Err(Error::MalformedState(_))
        ));
    }

    #[test]
    fn negative_coordinates_are_malformed() {
        let json = r#"{ "rows": 3, "cols": 3, "obstacles": [ {"row": -1, "col": 0} ],
            "start": {"row": 0, "col": 0}, "goal": {"row": 1, "col": 1} }"#;
        assert!(matches!(
            GridState::from_json(json),
            Err(Error::MalformedState(_))
        ));
    }

    #[test]
    fn default_weights_are_not_written() {
        let state = GridState {
            rows: 2,
            cols: 2,
            obstacles: vec![ObstacleEntry {
                row: 0,
                col: 1,
                weight: None,
            }],
            start: Coord::new(0, 0),
            goal: Coord::new(1, 1),
            weights: Vec::new(),
        };
        let json = state.to_json().unwrap();
        assert!(!json.contains("weight"));
    }
}
