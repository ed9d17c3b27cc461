// ABOUTME: A single docking workspace: split tree plus its authoritative bounds.
// ABOUTME: Mutations invalidate a memoized layout that is rebuilt lazily on the next query.

use std::cell::OnceCell;

use dock_core::{Direction, Rect};

use crate::error::{DockError, Result};
use crate::node::{CloseOutcome, DockNode, Layout, NodeArena, NodeId, PanelHandle, Splitter};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TreeId(pub u32);

#[derive(Debug, Clone)]
pub struct DockTree {
    id: TreeId,
    nodes: NodeArena,
    bounds: Rect,
    border: f32,
    layout: OnceCell<Layout>,
}

fn check_bounds(bounds: Rect) -> Result<()> {
    if bounds.is_degenerate() {
        return Err(DockError::DegenerateRect {
            width: bounds.width,
            height: bounds.height,
        });
    }
    Ok(())
}

impl DockTree {
    /// Create a workspace holding a single panel
    pub fn new(id: TreeId, bounds: Rect, panel: PanelHandle, border: f32) -> Result<Self> {
        check_bounds(bounds)?;
        Ok(Self {
            id,
            nodes: NodeArena::new(panel),
            bounds,
            border,
            layout: OnceCell::new(),
        })
    }

    /// Create a workspace from an owned tree, e.g. one restored from disk
    pub fn from_node(id: TreeId, bounds: Rect, root: &DockNode, border: f32) -> Result<Self> {
        check_bounds(bounds)?;
        Ok(Self {
            id,
            nodes: NodeArena::from_node(root)?,
            bounds,
            border,
            layout: OnceCell::new(),
        })
    }

    pub fn id(&self) -> TreeId {
        self.id
    }

    pub fn bounds(&self) -> Rect {
        self.bounds
    }

    pub fn border(&self) -> f32 {
        self.border
    }

    pub fn nodes(&self) -> &NodeArena {
        &self.nodes
    }

    /// Snapshot of the tree's topology and ratios
    pub fn root(&self) -> DockNode {
        self.nodes.to_node()
    }

    pub fn panels(&self) -> Vec<PanelHandle> {
        self.nodes.panels()
    }

    pub fn contains(&self, panel: PanelHandle) -> bool {
        self.nodes.contains(panel)
    }

    fn invalidate(&mut self) {
        self.layout.take();
    }

    pub fn has_cached_layout(&self) -> bool {
        self.layout.get().is_some()
    }

    /// Current layout, computed on first use after any change
    pub fn layout(&self) -> &Layout {
        self.layout
            .get_or_init(|| self.nodes.compute_layout(self.bounds, self.border))
    }

    pub fn panel_rect(&self, panel: PanelHandle) -> Option<Rect> {
        self.layout().panels.get(&panel).copied()
    }

    pub fn splitters(&self) -> &[Splitter] {
        &self.layout().splitters
    }

    /// Rectangle covered by the given split node
    pub fn split_area(&self, split: NodeId) -> Option<Rect> {
        self.splitters()
            .iter()
            .find(|s| s.split == split)
            .map(|s| s.area)
    }

    pub fn split_ratio(&self, split: NodeId) -> Option<f32> {
        self.nodes.ratio(split)
    }

    /// Panel whose rectangle contains `point`
    pub fn panel_at(&self, point: (f32, f32)) -> Option<PanelHandle> {
        self.layout()
            .panels
            .iter()
            .find(|(_, rect)| rect.contains(point))
            .map(|(panel, _)| *panel)
    }

    /// Nearest splitter whose boundary is within `tolerance` of `point`
    pub fn splitter_at(&self, point: (f32, f32), tolerance: f32) -> Option<Splitter> {
        self.splitters()
            .iter()
            .filter_map(|s| s.hit_distance(point, tolerance).map(|d| (*s, d)))
            .min_by(|a, b| a.1.total_cmp(&b.1))
            .map(|(s, _)| s)
    }

    pub fn split(&mut self, target: PanelHandle, direction: Direction, new_panel: PanelHandle) -> Result<NodeId> {
        let split = self.nodes.split(target, direction, new_panel)?;
        self.invalidate();
        tracing::debug!(
            "Workspace {:?}: split {:?} {:?}, new panel {:?}",
            self.id,
            target,
            direction,
            new_panel
        );
        Ok(split)
    }

    /// Close a panel. On [`CloseOutcome::Emptied`] the tree is left untouched
    /// and the owner is expected to drop it.
    pub fn close(&mut self, panel: PanelHandle) -> Result<CloseOutcome> {
        let outcome = self.nodes.close(panel)?;
        if let CloseOutcome::Closed { .. } = outcome {
            self.invalidate();
            tracing::debug!("Workspace {:?}: closed {:?}", self.id, panel);
        }
        Ok(outcome)
    }

    /// Move the workspace to new bounds. Degenerate bounds are rejected and the old ones kept.
    pub fn resize(&mut self, bounds: Rect) -> Result<()> {
        check_bounds(bounds)?;
        if bounds != self.bounds {
            self.bounds = bounds;
            self.invalidate();
        }
        Ok(())
    }

    /// Set a split's ratio, clamped to the usable range. Returns the stored ratio.
    pub fn set_split_ratio(&mut self, split: NodeId, ratio: f32) -> Result<f32> {
        let stored = self.nodes.set_ratio(split, ratio)?;
        if stored != ratio {
            tracing::debug!("Workspace {:?}: ratio {} clamped to {}", self.id, ratio, stored);
        }
        self.invalidate();
        Ok(stored)
    }
}
