// ABOUTME: Error type for dock tree and grid operations.
// ABOUTME: None of these are fatal; failed operations leave the layout unchanged.

use crate::node::{NodeId, PanelHandle};
use crate::tree::TreeId;

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum DockError {
    #[error("Panel {0:?} is not docked")]
    NodeNotFound(PanelHandle),

    #[error("Node {0:?} is not a split")]
    SplitNotFound(NodeId),

    #[error("Invalid split ratio: {0}")]
    InvalidRatio(f32),

    #[error("Degenerate rect: {width}x{height}")]
    DegenerateRect { width: f32, height: f32 },

    #[error("Panel {0:?} is already docked")]
    DuplicatePanel(PanelHandle),

    #[error("Panel {0:?} is nested {max} splits deep and cannot be split further", max = crate::node::MAX_DEPTH)]
    TooDeep(PanelHandle),

    #[error("Workspace {0:?} does not exist")]
    WorkspaceNotFound(TreeId),

    #[error("Malformed layout for workspace {index}: {reason}")]
    MalformedPersistedTree { index: usize, reason: String },
}

pub type Result<T> = std::result::Result<T, DockError>;
