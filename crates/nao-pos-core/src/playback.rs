//! Keyframe playback
//!
//! Turns a parsed keyframe sequence into per-tick joint commands by linearly
//! interpolating each driven joint from its previous target to the next one.

use serde::{Deserialize, Serialize};

use crate::joints::NUM_JOINTS;
use crate::keyframe::{JointPositions, JointStiffnesses, KeyFrame};

/// Joint command for a single control tick
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct JointCommand {
    pub positions: JointPositions,
    pub stiffnesses: JointStiffnesses,
}

/// Plays back a keyframe sequence from a known starting pose
#[derive(Debug, Clone)]
pub struct Playback {
    keyframes: Vec<KeyFrame>,
    /// Full pose (radians) before each keyframe; `poses[0]` is the start pose
    poses: Vec<[f32; NUM_JOINTS]>,
}

impl Playback {
    /// Create a playback starting from the robot's current joint positions
    pub fn new(keyframes: Vec<KeyFrame>, start: [f32; NUM_JOINTS]) -> Self {
        let mut poses = Vec::with_capacity(keyframes.len() + 1);
        let mut pose = start;
        poses.push(pose);

        for keyframe in &keyframes {
            for (index, position) in keyframe.positions.iter() {
                if let Some(joint) = pose.get_mut(index as usize) {
                    *joint = position;
                }
            }
            poses.push(pose);
        }

        Self { keyframes, poses }
    }

    pub fn keyframes(&self) -> &[KeyFrame] {
        &self.keyframes
    }

    pub fn duration_ms(&self) -> u32 {
        self.keyframes
            .last()
            .map(|k| k.absolute_time_ms)
            .unwrap_or(0)
    }

    pub fn is_finished(&self, elapsed_ms: u32) -> bool {
        self.keyframes.is_empty() || elapsed_ms > self.duration_ms()
    }

    /// Command for the given time since playback started
    ///
    /// When several keyframes share `elapsed_ms` (zero-duration keyframes),
    /// the last of them is the target. Returns `None` once playback is
    /// finished.
    pub fn sample(&self, elapsed_ms: u32) -> Option<JointCommand> {
        let target_index = self.target_index(elapsed_ms)?;
        let target = &self.keyframes[target_index];
        let from_pose = &self.poses[target_index];

        let segment_start = if target_index == 0 {
            0
        } else {
            self.keyframes[target_index - 1].absolute_time_ms
        };
        let span = target.absolute_time_ms.saturating_sub(segment_start);
        let t = if span == 0 {
            1.0
        } else {
            elapsed_ms.saturating_sub(segment_start) as f32 / span as f32
        };

        let mut positions = JointPositions::default();
        for (index, goal) in target.positions.iter() {
            let from = from_pose.get(index as usize).copied().unwrap_or(goal);
            positions.push(index, from + (goal - from) * t);
        }

        Some(JointCommand {
            positions,
            stiffnesses: target.stiffnesses.clone(),
        })
    }

    fn target_index(&self, elapsed_ms: u32) -> Option<usize> {
        let reached = self
            .keyframes
            .partition_point(|k| k.absolute_time_ms <= elapsed_ms);

        match reached.checked_sub(1) {
            Some(last) if self.keyframes[last].absolute_time_ms == elapsed_ms => Some(last),
            _ if reached < self.keyframes.len() => Some(reached),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn keyframe(time: u32, joints: &[(u8, f32)], stiffness: f32) -> KeyFrame {
        let mut frame = KeyFrame {
            absolute_time_ms: time,
            ..Default::default()
        };
        for (index, position) in joints {
            frame.positions.push(*index, *position);
            frame.stiffnesses.push(*index, stiffness);
        }
        frame
    }

    fn assert_close(actual: f32, expected: f32) {
        assert!((actual - expected).abs() < 1e-5, "{} != {}", actual, expected);
    }

    #[test]
    fn test_empty_playback() {
        let playback = Playback::new(Vec::new(), [0.0; NUM_JOINTS]);
        assert!(playback.is_finished(0));
        assert_eq!(playback.sample(0), None);
    }

    #[test]
    fn test_interpolates_from_start_pose() {
        let mut start = [0.0; NUM_JOINTS];
        start[3] = 1.0;
        let playback = Playback::new(vec![keyframe(100, &[(3, 2.0)], 0.8)], start);

        assert_close(playback.sample(0).unwrap().positions.positions[0], 1.0);
        assert_close(playback.sample(50).unwrap().positions.positions[0], 1.5);

        let end = playback.sample(100).unwrap();
        assert_close(end.positions.positions[0], 2.0);
        assert_eq!(end.stiffnesses.stiffnesses, vec![0.8]);
        assert_eq!(playback.sample(101), None);
    }

    #[test]
    fn test_interpolates_between_keyframes() {
        let playback = Playback::new(
            vec![keyframe(100, &[(0, 1.0)], 1.0), keyframe(300, &[(0, -1.0)], 0.5)],
            [0.0; NUM_JOINTS],
        );

        let mid = playback.sample(200).unwrap();
        assert_close(mid.positions.positions[0], 0.0);
        assert_eq!(mid.stiffnesses.stiffnesses, vec![0.5]);
        assert_close(playback.sample(250).unwrap().positions.positions[0], -0.5);
        assert_eq!(playback.duration_ms(), 300);
    }

    #[test]
    fn test_zero_duration_keyframe_jumps() {
        let playback = Playback::new(
            vec![keyframe(0, &[(5, 0.7)], 1.0), keyframe(0, &[(5, 0.9)], 1.0)],
            [0.0; NUM_JOINTS],
        );

        let command = playback.sample(0).unwrap();
        assert_close(command.positions.positions[0], 0.9);
        assert!(!playback.is_finished(0));
        assert!(playback.is_finished(1));
    }

    #[test]
    fn test_trailing_zero_duration_keyframe_reached() {
        let tail = vec!["-"; NUM_JOINTS - 1].join(" ");
        let lines = [format!("! 10 {} 100", tail), format!("! 50 {} 0", tail)];
        let keyframes = crate::parser::parse(&lines).unwrap();
        let playback = Playback::new(keyframes, [0.0; NUM_JOINTS]);

        assert_eq!(playback.duration_ms(), 100);
        let end = playback.sample(playback.duration_ms()).unwrap();
        assert_close(end.positions.positions[0], crate::joints::deg_to_rad(50.0));

        // still interpolating toward the first keyframe before its time
        assert_close(
            playback.sample(50).unwrap().positions.positions[0],
            crate::joints::deg_to_rad(5.0),
        );
    }

    #[test]
    fn test_keyframe_time_reached_exactly() {
        let playback = Playback::new(
            vec![keyframe(100, &[(0, 1.0)], 1.0), keyframe(300, &[(0, -1.0)], 1.0)],
            [0.0; NUM_JOINTS],
        );
        assert_close(playback.sample(100).unwrap().positions.positions[0], 1.0);
        assert_close(playback.sample(300).unwrap().positions.positions[0], -1.0);
        assert_eq!(playback.sample(301), None);
    }

    #[test]
    fn test_from_parsed_script() {
        let line = format!("! 90 {} 1000", vec!["-"; NUM_JOINTS - 1].join(" "));
        let keyframes = crate::parser::parse([line]).unwrap();
        let playback = Playback::new(keyframes, [0.0; NUM_JOINTS]);

        let command = playback.sample(500).unwrap();
        assert_eq!(command.positions.indexes, vec![0]);
        assert_close(command.positions.positions[0], std::f32::consts::FRAC_PI_4);
        assert_eq!(command.stiffnesses.stiffnesses, vec![1.0]);
    }
}
