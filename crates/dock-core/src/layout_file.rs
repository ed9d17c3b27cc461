// ABOUTME: Persisted layout format for docking workspaces.
// ABOUTME: Serializes split trees and per-panel host state to compressed JSON on disk.

use serde::{Deserialize, Serialize};
use std::io::{Read, Write};
use std::path::PathBuf;

use crate::geometry::{Orientation, Rect};

/// One node of a saved split tree
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum SavedNode {
    Leaf {
        /// Host-resolved identity of the panel shown in this leaf
        panel: String,
        /// Opaque host state for the panel
        #[serde(default)]
        state: Vec<u8>,
    },
    Split {
        orientation: Orientation,
        ratio: f32,
        first: Box<SavedNode>,
        second: Box<SavedNode>,
    },
}

impl SavedNode {
    pub fn leaf(panel: impl Into<String>) -> Self {
        SavedNode::Leaf {
            panel: panel.into(),
            state: Vec::new(),
        }
    }

    pub fn split(orientation: Orientation, ratio: f32, first: SavedNode, second: SavedNode) -> Self {
        SavedNode::Split {
            orientation,
            ratio,
            first: Box::new(first),
            second: Box::new(second),
        }
    }

    /// Panel identities in first-to-second order
    pub fn panels(&self) -> Vec<&str> {
        let mut out = Vec::new();
        collect_panels(self, &mut out);
        out
    }
}

fn collect_panels<'a>(node: &'a SavedNode, out: &mut Vec<&'a str>) {
    match node {
        SavedNode::Leaf { panel, .. } => out.push(panel),
        SavedNode::Split { first, second, .. } => {
            collect_panels(first, out);
            collect_panels(second, out);
        }
    }
}

/// A single saved workspace
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SavedWorkspace {
    pub bounds: Rect,
    pub root: SavedNode,
}

/// Complete saved layout: every workspace plus the canvas it was laid out on
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LayoutFile {
    pub version: u32,
    /// Canvas width and height at save time
    pub canvas: (f32, f32),
    pub workspaces: Vec<SavedWorkspace>,
}

impl LayoutFile {
    pub const CURRENT_VERSION: u32 = 1;

    pub fn new(canvas: (f32, f32)) -> Self {
        Self {
            version: Self::CURRENT_VERSION,
            canvas,
            workspaces: Vec::new(),
        }
    }

    pub fn add_workspace(&mut self, bounds: Rect, root: SavedNode) {
        self.workspaces.push(SavedWorkspace { bounds, root });
    }

    /// Get the default layout file path (~/.local/state/viewdock/layout.bin)
    pub fn default_path() -> Option<PathBuf> {
        dirs::state_dir()
            .or_else(dirs::data_local_dir)
            .map(|p| p.join("viewdock").join("layout.bin"))
    }

    pub fn to_json(&self) -> Result<String, LayoutFileError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn from_json(json: &str) -> Result<Self, LayoutFileError> {
        let layout: LayoutFile = serde_json::from_str(json)?;
        layout.check_version()?;
        Ok(layout)
    }

    fn check_version(&self) -> Result<(), LayoutFileError> {
        if self.version > Self::CURRENT_VERSION {
            return Err(LayoutFileError::UnsupportedVersion(self.version));
        }
        Ok(())
    }

    /// Save layout to disk as zstd compressed JSON
    pub fn save(&self, path: &std::path::Path) -> Result<(), LayoutFileError> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let json = serde_json::to_vec(self)?;
        let mut encoder = zstd::Encoder::new(Vec::new(), 3)?;
        encoder.write_all(&json)?;
        let compressed = encoder.finish()?;

        std::fs::write(path, compressed)?;
        Ok(())
    }

    /// Load layout from disk
    pub fn load(path: &std::path::Path) -> Result<Self, LayoutFileError> {
        let compressed = std::fs::read(path)?;

        let mut decoder = zstd::Decoder::new(&compressed[..])?;
        let mut json = Vec::new();
        decoder.read_to_end(&mut json)?;

        let layout: LayoutFile = serde_json::from_slice(&json)?;
        layout.check_version()?;
        Ok(layout)
    }
}

#[derive(Debug, thiserror::Error)]
pub enum LayoutFileError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Unsupported layout version: {0}")]
    UnsupportedVersion(u32),
}
