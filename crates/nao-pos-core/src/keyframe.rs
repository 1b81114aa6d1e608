//! Keyframe types produced by the pos file parser
//!
//! Index/value pairs are stored as parallel vectors so they map directly onto
//! the joint command schema (`indexes: [int]`, `values: [float]`).

use serde::{Deserialize, Serialize};

/// Target joint angles, in radians
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct JointPositions {
    pub indexes: Vec<u8>,
    pub positions: Vec<f32>,
}

impl JointPositions {
    pub fn push(&mut self, index: u8, position: f32) {
        self.indexes.push(index);
        self.positions.push(position);
    }

    pub fn len(&self) -> usize {
        self.indexes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.indexes.is_empty()
    }

    /// Iterate over `(index, position)` pairs
    pub fn iter(&self) -> impl Iterator<Item = (u8, f32)> + '_ {
        self.indexes.iter().copied().zip(self.positions.iter().copied())
    }
}

/// Joint stiffness values, nominally in `[0.0, 1.0]`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct JointStiffnesses {
    pub indexes: Vec<u8>,
    pub stiffnesses: Vec<f32>,
}

impl JointStiffnesses {
    pub fn push(&mut self, index: u8, stiffness: f32) {
        self.indexes.push(index);
        self.stiffnesses.push(stiffness);
    }

    pub fn len(&self) -> usize {
        self.indexes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.indexes.is_empty()
    }

    pub fn clear(&mut self) {
        self.indexes.clear();
        self.stiffnesses.clear();
    }

    /// Iterate over `(index, stiffness)` pairs
    pub fn iter(&self) -> impl Iterator<Item = (u8, f32)> + '_ {
        self.indexes.iter().copied().zip(self.stiffnesses.iter().copied())
    }
}

/// One target pose plus the cumulative time at which it should be reached
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct KeyFrame {
    /// Sum of all durations up to and including this keyframe (milliseconds)
    pub absolute_time_ms: u32,
    pub positions: JointPositions,
    pub stiffnesses: JointStiffnesses,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_push_keeps_vectors_parallel() {
        let mut positions = JointPositions::default();
        positions.push(2, 0.5);
        positions.push(7, -0.25);
        assert_eq!(positions.indexes, vec![2, 7]);
        assert_eq!(positions.positions, vec![0.5, -0.25]);
        assert_eq!(positions.iter().collect::<Vec<_>>(), vec![(2, 0.5), (7, -0.25)]);
    }

    #[test]
    fn test_stiffness_clear() {
        let mut stiffnesses = JointStiffnesses::default();
        stiffnesses.push(0, 0.3);
        assert_eq!(stiffnesses.len(), 1);
        stiffnesses.clear();
        assert!(stiffnesses.is_empty());
        assert!(stiffnesses.stiffnesses.is_empty());
    }

    #[test]
    fn test_keyframe_json_shape() {
        let mut frame = KeyFrame {
            absolute_time_ms: 500,
            ..Default::default()
        };
        frame.positions.push(1, 0.0);
        frame.stiffnesses.push(1, 1.0);

        let json = serde_json::to_value(&frame).unwrap();
        assert_eq!(json["absolute_time_ms"], 500);
        assert_eq!(json["positions"]["indexes"][0], 1);
        assert_eq!(json["stiffnesses"]["stiffnesses"][0], 1.0);
    }
}
