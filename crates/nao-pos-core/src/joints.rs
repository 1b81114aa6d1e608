//! NAO joint table in LoLA actuation order
//!
//! Pos files address joints by column, and the column order matches the
//! index order the robot's joint command schema uses.

use serde::{Deserialize, Serialize};

/// Number of controllable joints in the actuation schema
pub const NUM_JOINTS: usize = 25;

/// A single controllable NAO joint
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Joint {
    HeadYaw,
    HeadPitch,
    LShoulderPitch,
    LShoulderRoll,
    LElbowYaw,
    LElbowRoll,
    LWristYaw,
    LHipYawPitch,
    LHipRoll,
    LHipPitch,
    LKneePitch,
    LAnklePitch,
    LAnkleRoll,
    RHipRoll,
    RHipPitch,
    RKneePitch,
    RAnklePitch,
    RAnkleRoll,
    RShoulderPitch,
    RShoulderRoll,
    RElbowYaw,
    RElbowRoll,
    RWristYaw,
    LHand,
    RHand,
}

impl Joint {
    /// All joints, ordered by index
    pub const ALL: [Joint; NUM_JOINTS] = [
        Joint::HeadYaw,
        Joint::HeadPitch,
        Joint::LShoulderPitch,
        Joint::LShoulderRoll,
        Joint::LElbowYaw,
        Joint::LElbowRoll,
        Joint::LWristYaw,
        Joint::LHipYawPitch,
        Joint::LHipRoll,
        Joint::LHipPitch,
        Joint::LKneePitch,
        Joint::LAnklePitch,
        Joint::LAnkleRoll,
        Joint::RHipRoll,
        Joint::RHipPitch,
        Joint::RKneePitch,
        Joint::RAnklePitch,
        Joint::RAnkleRoll,
        Joint::RShoulderPitch,
        Joint::RShoulderRoll,
        Joint::RElbowYaw,
        Joint::RElbowRoll,
        Joint::RWristYaw,
        Joint::LHand,
        Joint::RHand,
    ];

    /// Zero-based index in the actuation schema
    pub fn index(self) -> u8 {
        self as u8
    }

    /// Look up a joint by its schema index
    pub fn from_index(index: u8) -> Option<Self> {
        Self::ALL.get(index as usize).copied()
    }

    /// Joint name as used by NAOqi and LoLA
    pub fn name(self) -> &'static str {
        match self {
            Joint::HeadYaw => "HeadYaw",
            Joint::HeadPitch => "HeadPitch",
            Joint::LShoulderPitch => "LShoulderPitch",
            Joint::LShoulderRoll => "LShoulderRoll",
            Joint::LElbowYaw => "LElbowYaw",
            Joint::LElbowRoll => "LElbowRoll",
            Joint::LWristYaw => "LWristYaw",
            Joint::LHipYawPitch => "LHipYawPitch",
            Joint::LHipRoll => "LHipRoll",
            Joint::LHipPitch => "LHipPitch",
            Joint::LKneePitch => "LKneePitch",
            Joint::LAnklePitch => "LAnklePitch",
            Joint::LAnkleRoll => "LAnkleRoll",
            Joint::RHipRoll => "RHipRoll",
            Joint::RHipPitch => "RHipPitch",
            Joint::RKneePitch => "RKneePitch",
            Joint::RAnklePitch => "RAnklePitch",
            Joint::RAnkleRoll => "RAnkleRoll",
            Joint::RShoulderPitch => "RShoulderPitch",
            Joint::RShoulderRoll => "RShoulderRoll",
            Joint::RElbowYaw => "RElbowYaw",
            Joint::RElbowRoll => "RElbowRoll",
            Joint::RWristYaw => "RWristYaw",
            Joint::LHand => "LHand",
            Joint::RHand => "RHand",
        }
    }
}

impl std::fmt::Display for Joint {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// Convert an angle in degrees to radians
pub fn deg_to_rad(degrees: f32) -> f32 {
    degrees * std::f32::consts::PI / 180.0
}

/// Convert an angle in radians to degrees
pub fn rad_to_deg(radians: f32) -> f32 {
    radians * 180.0 / std::f32::consts::PI
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_index_order_matches_table() {
        for (i, joint) in Joint::ALL.iter().enumerate() {
            assert_eq!(joint.index() as usize, i);
            assert_eq!(Joint::from_index(i as u8), Some(*joint));
        }
        assert_eq!(Joint::from_index(NUM_JOINTS as u8), None);
    }

    #[test]
    fn test_known_indexes() {
        assert_eq!(Joint::HeadYaw.index(), 0);
        assert_eq!(Joint::LHipYawPitch.index(), 7);
        assert_eq!(Joint::RHipRoll.index(), 13);
        assert_eq!(Joint::RHand.index(), 24);
        assert_eq!(Joint::LKneePitch.to_string(), "LKneePitch");
    }

    #[test]
    fn test_degree_radian_conversion() {
        assert!((deg_to_rad(90.0) - std::f32::consts::FRAC_PI_2).abs() < 1e-6);
        assert!((deg_to_rad(-180.0) + std::f32::consts::PI).abs() < 1e-6);
        assert!((rad_to_deg(std::f32::consts::PI) - 180.0).abs() < 1e-4);
    }

    #[test]
    fn test_degree_radian_round_trip() {
        for x in [-720.0f32, -123.456, -1.0, 0.0, 0.001, 45.0, 89.9, 359.0, 1.0e4] {
            let back = rad_to_deg(deg_to_rad(x));
            let tolerance = 1e-5 * x.abs().max(1.0);
            assert!((back - x).abs() <= tolerance, "{} -> {}", x, back);
        }
    }
}
