//! Pos file parser
//!
//! A pos file is a line-oriented keyframe script. Lines starting with `$` set
//! per-joint stiffness for the next keyframe, lines starting with `!` define a
//! keyframe (target angles in degrees plus a trailing duration in
//! milliseconds), and every other line is ignored.
//!
//! ```text
//! # HY  HP  LSP ... RH   duration
//! $ 0.5 0.5 -   ... -
//! ! 0   -10 90  ... -    500
//! ```
//!
//! A `-` in a joint column leaves that joint out of the directive. Parsing is
//! all-or-nothing: the first bad line rejects the whole script.
//!
//! Values are not range-checked, but `nan` and `inf` are rejected as invalid
//! numbers even though C's `stof` would accept them.

use thiserror::Error;
use tracing::{debug, error};

use crate::joints::{deg_to_rad, NUM_JOINTS};
use crate::keyframe::{JointPositions, JointStiffnesses, KeyFrame};

/// Leading character of a stiffness directive
pub const STIFFNESS_MARKER: char = '$';

/// Leading character of a position directive
pub const POSITION_MARKER: char = '!';

/// Column value meaning "this joint is not part of the directive"
pub const UNSET: &str = "-";

/// Marker plus one field per joint
pub const STIFFNESS_LINE_FIELDS: usize = NUM_JOINTS + 1;

/// Marker plus one field per joint plus the duration
pub const POSITION_LINE_FIELDS: usize = NUM_JOINTS + 2;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum ParseError {
    #[error("line has {actual} fields, expected {expected}: '{line}'")]
    MalformedLine {
        expected: usize,
        actual: usize,
        line: String,
    },
    #[error("'{token}' is not a valid joint value (expected a number or '-'): '{line}'")]
    InvalidNumericField { token: String, line: String },
    #[error("duration '{token}' is not a valid duration in milliseconds: '{line}'")]
    InvalidDuration { token: String, line: String },
    #[error("joint indexes {actual:?} differ from previous keyframe {expected:?}: '{line}'")]
    InconsistentJointSet {
        expected: Vec<u8>,
        actual: Vec<u8>,
        line: String,
    },
    #[error("stiffness indexes {stiffness:?} do not match position indexes {positions:?}: '{line}'")]
    StiffnessPositionMismatch {
        stiffness: Vec<u8>,
        positions: Vec<u8>,
        line: String,
    },
}

impl ParseError {
    /// The offending line, as it appeared in the input
    pub fn line(&self) -> &str {
        match self {
            ParseError::MalformedLine { line, .. }
            | ParseError::InvalidNumericField { line, .. }
            | ParseError::InvalidDuration { line, .. }
            | ParseError::InconsistentJointSet { line, .. }
            | ParseError::StiffnessPositionMismatch { line, .. } => line,
        }
    }
}

/// Classification of a single input line
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineKind {
    Stiffness,
    Position,
    /// Comments, blank lines, and anything else without a directive marker
    Ignored,
}

impl LineKind {
    pub fn classify(line: &str) -> Self {
        match line.trim_start().chars().next() {
            Some(STIFFNESS_MARKER) => LineKind::Stiffness,
            Some(POSITION_MARKER) => LineKind::Position,
            _ => LineKind::Ignored,
        }
    }
}

/// State carried from one line to the next during a single parse
///
/// Each directive is applied with [`ParseState::stiffness_line`] or
/// [`ParseState::position_line`]; a rejected line leaves the state untouched.
#[derive(Debug, Clone, Default)]
pub struct ParseState {
    /// Cumulative keyframe time in milliseconds
    elapsed_ms: u32,
    /// Stiffness collected from `$` lines since the last keyframe
    pending_stiffness: JointStiffnesses,
    has_custom_stiffness: bool,
    /// Joint indexes of the previous keyframe, `None` before the first one
    previous_indexes: Option<Vec<u8>>,
}

impl ParseState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn elapsed_ms(&self) -> u32 {
        self.elapsed_ms
    }

    pub fn has_custom_stiffness(&self) -> bool {
        self.has_custom_stiffness
    }

    /// Classify and apply one line, returning the keyframe it produced, if any
    pub fn line(&mut self, line: &str) -> Result<Option<KeyFrame>, ParseError> {
        let result = match LineKind::classify(line) {
            LineKind::Stiffness => {
                debug!(line, "Stiffness");
                self.stiffness_line(line).map(|()| None)
            }
            LineKind::Position => {
                debug!(line, "Position");
                self.position_line(line).map(Some)
            }
            LineKind::Ignored => {
                debug!(line, "Ignoring");
                Ok(None)
            }
        };

        result.inspect_err(|e| error!(line = e.line(), error = %e, "Rejected pos file line"))
    }

    /// Apply a `$` stiffness directive
    pub fn stiffness_line(&mut self, line: &str) -> Result<(), ParseError> {
        let tokens = tokenize(line);
        check_field_count(&tokens, STIFFNESS_LINE_FIELDS, line)?;

        let values = parse_joint_fields(&tokens[1..=NUM_JOINTS], line)?;

        for (index, stiffness) in values {
            self.pending_stiffness.push(index, stiffness);
        }
        self.has_custom_stiffness = true;
        Ok(())
    }

    /// Apply a `!` position directive and produce its keyframe
    pub fn position_line(&mut self, line: &str) -> Result<KeyFrame, ParseError> {
        let tokens = tokenize(line);
        check_field_count(&tokens, POSITION_LINE_FIELDS, line)?;

        let mut positions = JointPositions::default();
        for (index, degrees) in parse_joint_fields(&tokens[1..=NUM_JOINTS], line)? {
            positions.push(index, deg_to_rad(degrees));
        }

        if let Some(previous) = &self.previous_indexes {
            if *previous != positions.indexes {
                return Err(ParseError::InconsistentJointSet {
                    expected: previous.clone(),
                    actual: positions.indexes,
                    line: line.to_string(),
                });
            }
        }

        let duration_token = tokens[POSITION_LINE_FIELDS - 1];
        let elapsed_ms = duration_token
            .parse::<u32>()
            .ok()
            .and_then(|duration| self.elapsed_ms.checked_add(duration))
            .ok_or_else(|| ParseError::InvalidDuration {
                token: duration_token.to_string(),
                line: line.to_string(),
            })?;

        let stiffnesses = if self.has_custom_stiffness {
            if self.pending_stiffness.indexes != positions.indexes {
                return Err(ParseError::StiffnessPositionMismatch {
                    stiffness: self.pending_stiffness.indexes.clone(),
                    positions: positions.indexes,
                    line: line.to_string(),
                });
            }
            std::mem::take(&mut self.pending_stiffness)
        } else {
            JointStiffnesses {
                indexes: positions.indexes.clone(),
                stiffnesses: vec![1.0; positions.len()],
            }
        };

        self.elapsed_ms = elapsed_ms;
        self.has_custom_stiffness = false;
        self.pending_stiffness.clear();
        self.previous_indexes = Some(positions.indexes.clone());

        debug!(
            time_ms = elapsed_ms,
            positions = ?positions.indexes,
            stiffnesses = ?stiffnesses.indexes,
            "Keyframe"
        );

        Ok(KeyFrame {
            absolute_time_ms: elapsed_ms,
            positions,
            stiffnesses,
        })
    }
}

/// Parse a complete pos script into its keyframes
///
/// Returns an empty list when the script contains no position directives.
pub fn parse<I, S>(lines: I) -> Result<Vec<KeyFrame>, ParseError>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut state = ParseState::new();
    let mut keyframes = Vec::new();

    for line in lines {
        if let Some(keyframe) = state.line(line.as_ref())? {
            keyframes.push(keyframe);
        }
    }

    Ok(keyframes)
}

fn tokenize(line: &str) -> Vec<&str> {
    line.split_whitespace().collect()
}

fn check_field_count(tokens: &[&str], expected: usize, line: &str) -> Result<(), ParseError> {
    if tokens.len() != expected {
        return Err(ParseError::MalformedLine {
            expected,
            actual: tokens.len(),
            line: line.to_string(),
        });
    }
    Ok(())
}

/// Parse the per-joint columns, skipping unset ones
///
/// The returned pairs are `(joint_index, value)` in column order.
fn parse_joint_fields(fields: &[&str], line: &str) -> Result<Vec<(u8, f32)>, ParseError> {
    let mut values = Vec::with_capacity(fields.len());

    for (index, field) in fields.iter().enumerate() {
        if *field == UNSET {
            continue;
        }
        match field.parse::<f32>() {
            Ok(value) if value.is_finite() => values.push((index as u8, value)),
            _ => {
                return Err(ParseError::InvalidNumericField {
                    token: field.to_string(),
                    line: line.to_string(),
                })
            }
        }
    }

    Ok(values)
}
