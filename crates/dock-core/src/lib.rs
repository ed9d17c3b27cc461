// ABOUTME: Shared types and configuration for viewdock.
// ABOUTME: Defines rect geometry, config file handling, and the saved layout format.

pub mod config;
pub mod geometry;
pub mod layout_file;

pub use config::{Config, ConfigError, LayoutSettings, PersistenceSettings, WindowSettings};
pub use geometry::{
    clamp_ratio, point_in_rect, rects_overlap, split_rect, Direction, Orientation, Rect,
    MIN_RATIO,
};
pub use layout_file::{LayoutFile, LayoutFileError, SavedNode, SavedWorkspace};
