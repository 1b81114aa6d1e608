//! Pos file loading

use serde::Serialize;
use std::path::Path;
use thiserror::Error;
use tracing::info;

use crate::keyframe::KeyFrame;
use crate::parser::{parse, ParseError};

#[derive(Error, Debug)]
pub enum ScriptError {
    #[error("Failed to read pos file: {0}")]
    Io(#[from] std::io::Error),
    #[error("Invalid pos file: {0}")]
    Parse(#[from] ParseError),
}

/// A parsed pos file
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct PosScript {
    keyframes: Vec<KeyFrame>,
}

impl PosScript {
    pub fn new(keyframes: Vec<KeyFrame>) -> Self {
        Self { keyframes }
    }

    /// Parse pos file contents
    pub fn from_text(content: &str) -> Result<Self, ParseError> {
        parse(content.lines()).map(Self::new)
    }

    /// Read and parse a pos file
    pub fn from_file(path: &Path) -> Result<Self, ScriptError> {
        let content = std::fs::read_to_string(path)?;
        let script = Self::from_text(&content)?;
        info!(
            path = %path.display(),
            keyframes = script.keyframes.len(),
            duration_ms = script.duration_ms(),
            "Loaded pos file"
        );
        Ok(script)
    }

    pub fn keyframes(&self) -> &[KeyFrame] {
        &self.keyframes
    }

    pub fn into_keyframes(self) -> Vec<KeyFrame> {
        self.keyframes
    }

    /// Total script length: the time of the final keyframe
    pub fn duration_ms(&self) -> u32 {
        self.keyframes
            .last()
            .map(|k| k.absolute_time_ms)
            .unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.keyframes.is_empty()
    }
}
