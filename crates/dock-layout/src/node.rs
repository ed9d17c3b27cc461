// ABOUTME: Arena-backed binary split tree for docked panels.
// ABOUTME: Supports splitting a leaf, closing a leaf by promoting its sibling, and layout.

use std::collections::{HashMap, HashSet};
use std::fmt;

use dock_core::{clamp_ratio, split_rect, Direction, Orientation, Rect};

use crate::error::{DockError, Result};

/// Deepest split nesting a tree may reach, counted in splits above a leaf
pub const MAX_DEPTH: usize = 64;

/// Opaque host token identifying one hosted view
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PanelHandle(pub u64);

/// Index of a node inside a [`NodeArena`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NodeId(pub(crate) usize);

/// Owned recursive form of a split tree, used for snapshots and persistence
#[derive(Debug, Clone, PartialEq)]
pub enum DockNode {
    Leaf(PanelHandle),
    Split {
        orientation: Orientation,
        ratio: f32,
        first: Box<DockNode>,
        second: Box<DockNode>,
    },
}

impl DockNode {
    pub fn leaf(panel: PanelHandle) -> Self {
        DockNode::Leaf(panel)
    }

    pub fn split(orientation: Orientation, ratio: f32, first: DockNode, second: DockNode) -> Self {
        DockNode::Split {
            orientation,
            ratio,
            first: Box::new(first),
            second: Box::new(second),
        }
    }

    pub fn panels(&self) -> Vec<PanelHandle> {
        let mut out = Vec::new();
        self.collect_panels(&mut out);
        out
    }

    fn collect_panels(&self, out: &mut Vec<PanelHandle>) {
        match self {
            DockNode::Leaf(panel) => out.push(*panel),
            DockNode::Split { first, second, .. } => {
                first.collect_panels(out);
                second.collect_panels(out);
            }
        }
    }

    fn write_indented(&self, f: &mut fmt::Formatter<'_>, level: usize) -> fmt::Result {
        let pad = level * 2;
        match self {
            DockNode::Leaf(panel) => writeln!(f, "{:pad$}leaf {}", "", panel.0),
            DockNode::Split {
                orientation,
                ratio,
                first,
                second,
            } => {
                writeln!(f, "{:pad$}split {:?} {:.3}", "", orientation, ratio)?;
                first.write_indented(f, level + 1)?;
                second.write_indented(f, level + 1)
            }
        }
    }
}

impl fmt::Display for DockNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.write_indented(f, 0)
    }
}

#[derive(Debug, Clone, Copy)]
enum NodeKind {
    Vacant,
    Leaf(PanelHandle),
    Split {
        orientation: Orientation,
        ratio: f32,
        first: NodeId,
        second: NodeId,
    },
}

#[derive(Debug, Clone, Copy)]
struct Slot {
    kind: NodeKind,
    parent: Option<NodeId>,
}

/// Result of closing a leaf
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CloseOutcome {
    /// The leaf was removed and `promoted` took its parent's place
    Closed { promoted: NodeId },
    /// The leaf was the root; the tree would be empty and must be removed by the caller
    Emptied,
}

/// Geometry of one split boundary
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Splitter {
    pub split: NodeId,
    pub orientation: Orientation,
    pub ratio: f32,
    /// Rectangle of the whole split node
    pub area: Rect,
    /// Gap between the two children
    pub bar: Rect,
}

impl Splitter {
    /// Centre line of the boundary along the split axis
    pub fn position(&self) -> f32 {
        self.orientation.origin(self.area) + self.orientation.extent(self.area) * clamp_ratio(self.ratio)
    }

    /// Distance from `point` to the boundary, if it is within `tolerance` of the bar
    pub fn hit_distance(&self, point: (f32, f32), tolerance: f32) -> Option<f32> {
        let (cross, start, end) = match self.orientation {
            Orientation::Horizontal => (point.1, self.area.y, self.area.bottom()),
            Orientation::Vertical => (point.0, self.area.x, self.area.right()),
        };
        if cross < start - tolerance || cross > end + tolerance {
            return None;
        }

        let reach = self.orientation.extent(self.bar) / 2.0 + tolerance;
        let distance = (self.orientation.coord(point) - self.position()).abs();
        (distance <= reach).then_some(distance)
    }
}

/// Panel rectangles and splitter geometry for one tree
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Layout {
    pub panels: HashMap<PanelHandle, Rect>,
    pub splitters: Vec<Splitter>,
}

/// Binary split tree stored in a flat arena.
///
/// Every slot records its parent so a leaf can be closed by rewriting a
/// single child index in its grandparent.
#[derive(Debug, Clone)]
pub struct NodeArena {
    slots: Vec<Slot>,
    free: Vec<usize>,
    root: NodeId,
}

impl NodeArena {
    pub fn new(panel: PanelHandle) -> Self {
        Self {
            slots: vec![Slot {
                kind: NodeKind::Leaf(panel),
                parent: None,
            }],
            free: Vec::new(),
            root: NodeId(0),
        }
    }

    /// Build an arena from an owned tree.
    ///
    /// Ratios must lie strictly between 0 and 1 and are clamped to the
    /// usable range; every panel may appear only once.
    pub fn from_node(node: &DockNode) -> Result<Self> {
        let mut arena = Self {
            slots: Vec::new(),
            free: Vec::new(),
            root: NodeId(0),
        };
        let mut seen = HashSet::new();
        arena.root = arena.insert_node(node, None, 0, &mut seen)?;
        Ok(arena)
    }

    fn insert_node(
        &mut self,
        node: &DockNode,
        parent: Option<NodeId>,
        depth: usize,
        seen: &mut HashSet<PanelHandle>,
    ) -> Result<NodeId> {
        match node {
            DockNode::Leaf(panel) => {
                if depth > MAX_DEPTH {
                    return Err(DockError::TooDeep(*panel));
                }
                if !seen.insert(*panel) {
                    return Err(DockError::DuplicatePanel(*panel));
                }
                Ok(self.alloc(NodeKind::Leaf(*panel), parent))
            }
            DockNode::Split {
                orientation,
                ratio,
                first,
                second,
            } => {
                if !ratio.is_finite() || *ratio <= 0.0 || *ratio >= 1.0 {
                    return Err(DockError::InvalidRatio(*ratio));
                }
                let id = self.alloc(NodeKind::Vacant, parent);
                let first = self.insert_node(first, Some(id), depth + 1, seen)?;
                let second = self.insert_node(second, Some(id), depth + 1, seen)?;
                self.slots[id.0].kind = NodeKind::Split {
                    orientation: *orientation,
                    ratio: clamp_ratio(*ratio),
                    first,
                    second,
                };
                Ok(id)
            }
        }
    }

    fn alloc(&mut self, kind: NodeKind, parent: Option<NodeId>) -> NodeId {
        let slot = Slot { kind, parent };
        match self.free.pop() {
            Some(index) => {
                self.slots[index] = slot;
                NodeId(index)
            }
            None => {
                self.slots.push(slot);
                NodeId(self.slots.len() - 1)
            }
        }
    }

    fn release(&mut self, id: NodeId) {
        self.slots[id.0] = Slot {
            kind: NodeKind::Vacant,
            parent: None,
        };
        self.free.push(id.0);
    }

    pub fn root(&self) -> NodeId {
        self.root
    }

    /// Number of live nodes (leaves and splits)
    pub fn len(&self) -> usize {
        self.slots.len() - self.free.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.slots.get(id.0).and_then(|slot| slot.parent)
    }

    /// Number of splits between `id` and the root
    pub fn depth(&self, id: NodeId) -> usize {
        let mut depth = 0;
        let mut current = self.parent(id);
        while let Some(parent) = current {
            depth += 1;
            current = self.parent(parent);
        }
        depth
    }

    pub fn is_split(&self, id: NodeId) -> bool {
        matches!(self.slots.get(id.0).map(|s| s.kind), Some(NodeKind::Split { .. }))
    }

    pub fn children(&self, id: NodeId) -> Option<(NodeId, NodeId)> {
        match self.slots.get(id.0)?.kind {
            NodeKind::Split { first, second, .. } => Some((first, second)),
            _ => None,
        }
    }

    pub fn ratio(&self, id: NodeId) -> Option<f32> {
        match self.slots.get(id.0)?.kind {
            NodeKind::Split { ratio, .. } => Some(ratio),
            _ => None,
        }
    }

    pub fn orientation(&self, id: NodeId) -> Option<Orientation> {
        match self.slots.get(id.0)?.kind {
            NodeKind::Split { orientation, .. } => Some(orientation),
            _ => None,
        }
    }

    pub fn find_leaf(&self, panel: PanelHandle) -> Option<NodeId> {
        self.slots
            .iter()
            .position(|slot| matches!(slot.kind, NodeKind::Leaf(p) if p == panel))
            .map(NodeId)
    }

    pub fn contains(&self, panel: PanelHandle) -> bool {
        self.find_leaf(panel).is_some()
    }

    /// Panels in first-to-second order
    pub fn panels(&self) -> Vec<PanelHandle> {
        let mut out = Vec::new();
        self.collect_panels(self.root, &mut out);
        out
    }

    fn collect_panels(&self, id: NodeId, out: &mut Vec<PanelHandle>) {
        match self.slots[id.0].kind {
            NodeKind::Leaf(panel) => out.push(panel),
            NodeKind::Split { first, second, .. } => {
                self.collect_panels(first, out);
                self.collect_panels(second, out);
            }
            NodeKind::Vacant => {}
        }
    }

    /// Replace the leaf holding `target` with a split of `target` and `new_panel`.
    ///
    /// Returns the id of the new split, which reuses the old leaf's slot.
    pub fn split(&mut self, target: PanelHandle, direction: Direction, new_panel: PanelHandle) -> Result<NodeId> {
        let leaf = self.find_leaf(target).ok_or(DockError::NodeNotFound(target))?;
        if self.contains(new_panel) {
            return Err(DockError::DuplicatePanel(new_panel));
        }
        if self.depth(leaf) >= MAX_DEPTH {
            return Err(DockError::TooDeep(target));
        }

        let old = self.alloc(NodeKind::Leaf(target), Some(leaf));
        let new = self.alloc(NodeKind::Leaf(new_panel), Some(leaf));
        let (first, second) = if direction.new_panel_first() {
            (new, old)
        } else {
            (old, new)
        };

        self.slots[leaf.0].kind = NodeKind::Split {
            orientation: direction.orientation(),
            ratio: 0.5,
            first,
            second,
        };
        Ok(leaf)
    }

    /// Remove the leaf holding `panel`, promoting its sibling into the parent's place
    pub fn close(&mut self, panel: PanelHandle) -> Result<CloseOutcome> {
        let leaf = self.find_leaf(panel).ok_or(DockError::NodeNotFound(panel))?;
        let Some(parent) = self.slots[leaf.0].parent else {
            return Ok(CloseOutcome::Emptied);
        };
        let NodeKind::Split { first, second, .. } = self.slots[parent.0].kind else {
            return Err(DockError::SplitNotFound(parent));
        };

        let sibling = if first == leaf { second } else { first };
        let grandparent = self.slots[parent.0].parent;
        self.slots[sibling.0].parent = grandparent;

        match grandparent {
            None => self.root = sibling,
            Some(gp) => {
                if let NodeKind::Split { first, second, .. } = &mut self.slots[gp.0].kind {
                    if *first == parent {
                        *first = sibling;
                    } else if *second == parent {
                        *second = sibling;
                    }
                }
            }
        }

        self.release(leaf);
        self.release(parent);
        Ok(CloseOutcome::Closed { promoted: sibling })
    }

    /// Set the ratio of a split, clamped to the usable range. Returns the stored value.
    pub fn set_ratio(&mut self, id: NodeId, ratio: f32) -> Result<f32> {
        if !ratio.is_finite() {
            return Err(DockError::InvalidRatio(ratio));
        }
        let Some(NodeKind::Split { ratio: stored, .. }) = self.slots.get_mut(id.0).map(|s| &mut s.kind) else {
            return Err(DockError::SplitNotFound(id));
        };
        *stored = clamp_ratio(ratio);
        Ok(*stored)
    }

    pub fn to_node(&self) -> DockNode {
        self.node_at(self.root)
    }

    fn node_at(&self, id: NodeId) -> DockNode {
        match self.slots[id.0].kind {
            NodeKind::Split {
                orientation,
                ratio,
                first,
                second,
            } => DockNode::split(orientation, ratio, self.node_at(first), self.node_at(second)),
            NodeKind::Leaf(panel) => DockNode::Leaf(panel),
            // Unreachable from the root of a well-formed arena
            NodeKind::Vacant => DockNode::Leaf(PanelHandle(0)),
        }
    }

    /// Lay out every leaf inside `rect`, trimming `border` from each side of every split
    pub fn compute_layout(&self, rect: Rect, border: f32) -> Layout {
        let mut layout = Layout::default();
        self.layout_node(self.root, rect, border, &mut layout);
        layout
    }

    fn layout_node(&self, id: NodeId, rect: Rect, border: f32, out: &mut Layout) {
        match self.slots[id.0].kind {
            NodeKind::Leaf(panel) => {
                out.panels.insert(panel, rect);
            }
            NodeKind::Split {
                orientation,
                ratio,
                first,
                second,
            } => {
                let (a, b) = split_rect(rect, orientation, ratio, border);
                let bar = match orientation {
                    Orientation::Horizontal => Rect::new(a.right(), rect.y, b.x - a.right(), rect.height),
                    Orientation::Vertical => Rect::new(rect.x, a.bottom(), rect.width, b.y - a.bottom()),
                };
                out.splitters.push(Splitter {
                    split: id,
                    orientation,
                    ratio,
                    area: rect,
                    bar,
                });
                self.layout_node(first, a, border, out);
                self.layout_node(second, b, border, out);
            }
            NodeKind::Vacant => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use dock_core::rects_overlap;

    const A: PanelHandle = PanelHandle(1);
    const B: PanelHandle = PanelHandle(2);
    const C: PanelHandle = PanelHandle(3);
    const D: PanelHandle = PanelHandle(4);

    fn close_to(a: f32, b: f32) -> bool {
        (a - b).abs() < 0.01
    }

    fn sample_trees() -> Vec<NodeArena> {
        let single = NodeArena::new(A);

        let mut pair = NodeArena::new(A);
        pair.split(A, Direction::Right, B).unwrap();

        let mut nested = NodeArena::new(A);
        nested.split(A, Direction::Down, C).unwrap();
        let inner = nested.split(A, Direction::Right, B).unwrap();
        nested.set_ratio(inner, 0.3).unwrap();
        nested.split(C, Direction::Left, D).unwrap();

        vec![single, pair, nested]
    }

    #[test]
    fn new_arena_has_one_leaf() {
        let arena = NodeArena::new(A);
        assert_eq!(arena.panels(), vec![A]);
        assert_eq!(arena.len(), 1);
        assert!(!arena.is_split(arena.root()));
    }

    #[test]
    fn split_orders_children_by_direction() {
        let cases = [
            (Direction::Left, vec![B, A], Orientation::Horizontal),
            (Direction::Right, vec![A, B], Orientation::Horizontal),
            (Direction::Up, vec![B, A], Orientation::Vertical),
            (Direction::Down, vec![A, B], Orientation::Vertical),
        ];

        for (direction, order, orientation) in cases {
            let mut arena = NodeArena::new(A);
            let split = arena.split(A, direction, B).unwrap();
            assert_eq!(arena.panels(), order);
            assert_eq!(arena.orientation(split), Some(orientation));
            assert_eq!(arena.ratio(split), Some(0.5));
        }
    }

    #[test]
    fn split_sets_parent_links() {
        let mut arena = NodeArena::new(A);
        let split = arena.split(A, Direction::Right, B).unwrap();
        let (first, second) = arena.children(split).unwrap();

        assert_eq!(arena.parent(first), Some(split));
        assert_eq!(arena.parent(second), Some(split));
        assert_eq!(arena.parent(split), None);
    }

    #[test]
    fn split_missing_target_is_noop() {
        let mut arena = NodeArena::new(A);
        let before = arena.to_node();

        assert_eq!(arena.split(C, Direction::Right, B), Err(DockError::NodeNotFound(C)));
        assert_eq!(arena.to_node(), before);
    }

    #[test]
    fn split_rejects_duplicate_panel() {
        let mut arena = NodeArena::new(A);
        assert_eq!(arena.split(A, Direction::Right, A), Err(DockError::DuplicatePanel(A)));
        assert_eq!(arena.panels(), vec![A]);
    }

    #[test]
    fn split_stops_at_max_depth() {
        let mut arena = NodeArena::new(PanelHandle(0));
        for i in 0..MAX_DEPTH as u64 {
            arena.split(PanelHandle(i), Direction::Down, PanelHandle(i + 1)).unwrap();
        }
        let deepest = PanelHandle(MAX_DEPTH as u64);
        assert_eq!(arena.depth(arena.find_leaf(deepest).unwrap()), MAX_DEPTH);

        let before = arena.to_node();
        assert_eq!(
            arena.split(deepest, Direction::Down, PanelHandle(999)),
            Err(DockError::TooDeep(deepest))
        );
        assert_eq!(arena.to_node(), before);

        // Shallower leaves can still split
        assert!(arena.split(PanelHandle(0), Direction::Right, PanelHandle(999)).is_ok());
    }

    #[test]
    fn from_node_rejects_nesting_past_max_depth() {
        let mut node = DockNode::leaf(PanelHandle(0));
        for i in 0..=MAX_DEPTH as u64 {
            node = DockNode::split(Orientation::Vertical, 0.5, node, DockNode::leaf(PanelHandle(i + 1)));
        }
        assert_eq!(NodeArena::from_node(&node).unwrap_err(), DockError::TooDeep(PanelHandle(0)));
    }

    #[test]
    fn close_root_leaf_empties_tree() {
        let mut arena = NodeArena::new(A);
        assert_eq!(arena.close(A), Ok(CloseOutcome::Emptied));
    }

    #[test]
    fn close_missing_panel_is_noop() {
        let mut arena = NodeArena::new(A);
        arena.split(A, Direction::Right, B).unwrap();
        let before = arena.to_node();

        assert_eq!(arena.close(C), Err(DockError::NodeNotFound(C)));
        assert_eq!(arena.to_node(), before);
    }

    #[test]
    fn close_promotes_sibling_subtree() {
        let mut arena = NodeArena::new(A);
        arena.split(A, Direction::Right, B).unwrap();
        let inner = arena.split(B, Direction::Down, C).unwrap();
        arena.set_ratio(inner, 0.7).unwrap();

        arena.close(A).unwrap();

        assert_eq!(arena.root(), inner);
        assert_eq!(arena.parent(inner), None);
        assert_eq!(arena.to_node(), DockNode::split(Orientation::Vertical, 0.7, DockNode::leaf(B), DockNode::leaf(C)));
        assert_eq!(arena.len(), 3);
    }

    #[test]
    fn split_then_close_restores_tree() {
        for tree in sample_trees() {
            for target in tree.panels() {
                for direction in [Direction::Left, Direction::Right, Direction::Up, Direction::Down] {
                    let mut arena = tree.clone();
                    let q = PanelHandle(99);
                    arena.split(target, direction, q).unwrap();
                    arena.close(q).unwrap();
                    assert_eq!(arena.to_node(), tree.to_node());
                }
            }
        }
    }

    #[test]
    fn freed_slots_are_reused() {
        let mut arena = NodeArena::new(A);
        arena.split(A, Direction::Right, B).unwrap();
        arena.close(B).unwrap();
        let slots = arena.slots.len();

        arena.split(A, Direction::Down, C).unwrap();
        assert_eq!(arena.slots.len(), slots);
        assert_eq!(arena.panels(), vec![A, C]);
    }

    #[test]
    fn set_ratio_clamps_and_rejects_nan() {
        let mut arena = NodeArena::new(A);
        let split = arena.split(A, Direction::Right, B).unwrap();

        assert_eq!(arena.set_ratio(split, 2.0), Ok(0.95));
        assert_eq!(arena.set_ratio(split, -1.0), Ok(0.05));
        assert!(matches!(arena.set_ratio(split, f32::NAN), Err(DockError::InvalidRatio(_))));
        assert_eq!(arena.ratio(split), Some(0.05));
        let leaf = arena.find_leaf(A).unwrap();
        assert_eq!(arena.set_ratio(leaf, 0.5), Err(DockError::SplitNotFound(leaf)));
    }

    #[test]
    fn layout_tiles_bounds_minus_borders() {
        let bounds = Rect::new(10.0, 20.0, 800.0, 600.0);
        let border = 2.0;

        for tree in sample_trees() {
            let layout = tree.compute_layout(bounds, border);
            assert_eq!(layout.panels.len(), tree.panels().len());

            let rects: Vec<Rect> = layout.panels.values().copied().collect();
            for (i, a) in rects.iter().enumerate() {
                assert!(a.x >= bounds.x && a.right() <= bounds.right() + 0.01);
                assert!(a.y >= bounds.y && a.bottom() <= bounds.bottom() + 0.01);
                for b in &rects[i + 1..] {
                    assert!(!rects_overlap(*a, *b));
                }
            }

            let covered: f32 = rects.iter().map(|r| r.area()).sum::<f32>()
                + layout.splitters.iter().map(|s| s.bar.area()).sum::<f32>();
            assert!((covered - bounds.area()).abs() < 1.0);
        }
    }

    #[test]
    fn layout_reports_splitters() {
        let mut arena = NodeArena::new(A);
        let split = arena.split(A, Direction::Right, B).unwrap();
        let layout = arena.compute_layout(Rect::new(0.0, 0.0, 800.0, 600.0), 2.0);

        assert_eq!(layout.splitters.len(), 1);
        let splitter = layout.splitters[0];
        assert_eq!(splitter.split, split);
        assert!(close_to(splitter.position(), 400.0));
        assert!(close_to(splitter.bar.x, 398.0));
        assert!(close_to(splitter.bar.width, 4.0));
        assert_eq!(splitter.hit_distance((403.0, 100.0), 4.0), Some(3.0));
        assert_eq!(splitter.hit_distance((410.0, 100.0), 4.0), None);
        assert_eq!(splitter.hit_distance((400.0, 700.0), 4.0), None);
    }

    #[test]
    fn from_node_roundtrip() {
        for tree in sample_trees() {
            let node = tree.to_node();
            let rebuilt = NodeArena::from_node(&node).unwrap();
            assert_eq!(rebuilt.to_node(), node);
            assert_eq!(rebuilt.panels(), tree.panels());
        }
    }

    #[test]
    fn from_node_validates() {
        let dup = DockNode::split(Orientation::Horizontal, 0.5, DockNode::leaf(A), DockNode::leaf(A));
        assert_eq!(NodeArena::from_node(&dup).unwrap_err(), DockError::DuplicatePanel(A));

        let bad = DockNode::split(Orientation::Horizontal, 1.0, DockNode::leaf(A), DockNode::leaf(B));
        assert_eq!(NodeArena::from_node(&bad).unwrap_err(), DockError::InvalidRatio(1.0));

        let tiny = DockNode::split(Orientation::Vertical, 0.01, DockNode::leaf(A), DockNode::leaf(B));
        let arena = NodeArena::from_node(&tiny).unwrap();
        assert_eq!(arena.ratio(arena.root()), Some(0.05));
    }

    #[test]
    fn display_dumps_tree() {
        let node = DockNode::split(Orientation::Horizontal, 0.5, DockNode::leaf(A), DockNode::leaf(B));
        assert_eq!(node.to_string(), "split Horizontal 0.500\n  leaf 1\n  leaf 2\n");
    }
}
