//! NAO Pos Core - Pos file parsing and keyframe playback
//!
//! This crate provides the building blocks for driving NAO joints from
//! human-authored pos files:
//! - Joint table and angle conversions shared with the command layer
//! - Keyframe types that map onto joint position/stiffness commands
//! - The pos file parser and its error taxonomy
//! - Interpolated playback of a parsed keyframe sequence

pub mod joints;
pub mod keyframe;
pub mod parser;
pub mod playback;
pub mod script;

pub use joints::{deg_to_rad, rad_to_deg, Joint, NUM_JOINTS};
pub use keyframe::{JointPositions, JointStiffnesses, KeyFrame};
pub use parser::{parse, LineKind, ParseError, ParseState};
pub use playback::{JointCommand, Playback};
pub use script::{PosScript, ScriptError};
