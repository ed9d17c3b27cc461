// ABOUTME: Docking layout engine for hosting panels in resizable, tileable regions.
// ABOUTME: Split trees per workspace, a frame-driven grid for splitter dragging, and persistence.

mod error;
mod grid;
mod host;
mod node;
mod persist;
mod tree;

pub use error::{DockError, Result};
pub use grid::{DockGrid, DragContext, FrameInput, SizingState};
pub use host::{CursorStyle, DockHost, MouseButtons};
pub use node::{CloseOutcome, DockNode, Layout, NodeArena, NodeId, PanelHandle, Splitter, MAX_DEPTH};
pub use persist::{restore_node, save_node, validate_workspace, RestoredTree};
pub use tree::{DockTree, TreeId};

pub use dock_core::{Direction, Orientation, Rect};
