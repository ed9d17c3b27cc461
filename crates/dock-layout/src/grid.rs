// ABOUTME: Whole-window dock manager driven once per frame by the host.
// ABOUTME: Owns the workspaces, the splitter hover state machine and the active splitter drag.

use std::collections::{HashMap, HashSet};

use dock_core::{clamp_ratio, rects_overlap, Direction, LayoutFile, LayoutSettings, Orientation, Rect};

use crate::error::{DockError, Result};
use crate::host::{CursorStyle, DockHost, MouseButtons};
use crate::node::{CloseOutcome, NodeId, PanelHandle, Splitter};
use crate::persist;
use crate::tree::{DockTree, TreeId};

/// What the cursor is resting on
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SizingState {
    #[default]
    None,
    /// Over the boundary of a side-by-side split
    Horizontal,
    /// Over the boundary of a stacked split
    Vertical,
    /// Over the crossing of a horizontal and a vertical boundary
    Both,
}

impl SizingState {
    pub fn cursor_style(&self) -> CursorStyle {
        match self {
            SizingState::None => CursorStyle::Default,
            SizingState::Horizontal => CursorStyle::ResizeHorizontal,
            SizingState::Vertical => CursorStyle::ResizeVertical,
            SizingState::Both => CursorStyle::ResizeAll,
        }
    }
}

/// Raw input for one frame
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct FrameInput {
    pub mouse: (f32, f32),
    pub buttons: MouseButtons,
    pub delta_time: f32,
}

impl FrameInput {
    pub fn new(x: f32, y: f32, buttons: MouseButtons) -> Self {
        Self {
            mouse: (x, y),
            buttons,
            delta_time: 0.0,
        }
    }
}

/// An in-progress splitter drag. At most one exists per grid.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DragContext {
    pub tree: TreeId,
    pub axis: SizingState,
    /// Split whose boundary moves along x
    pub horizontal: Option<NodeId>,
    /// Split whose boundary moves along y
    pub vertical: Option<NodeId>,
    /// Cursor position relative to the grabbed boundaries
    pub grab_offset: (f32, f32),
}

#[derive(Debug, Clone, Copy)]
struct HoverHit {
    tree: TreeId,
    horizontal: Option<(Splitter, f32)>,
    vertical: Option<(Splitter, f32)>,
}

impl HoverHit {
    fn state(&self) -> SizingState {
        match (self.horizontal, self.vertical) {
            (Some(_), Some(_)) => SizingState::Both,
            (Some(_), None) => SizingState::Horizontal,
            (None, Some(_)) => SizingState::Vertical,
            (None, None) => SizingState::None,
        }
    }

    fn distance(&self) -> f32 {
        let h = self.horizontal.map_or(f32::MAX, |(_, d)| d);
        let v = self.vertical.map_or(f32::MAX, |(_, d)| d);
        h.min(v)
    }
}

pub struct DockGrid<H: DockHost> {
    host: H,
    trees: Vec<DockTree>,
    next_tree_id: u32,
    sizing: SizingState,
    drag: Option<DragContext>,
    border_thickness: f32,
    hit_tolerance: f32,
    canvas: (f32, f32),
    buttons: MouseButtons,
    /// Last rectangle reported to the host for each panel
    reported: HashMap<PanelHandle, Rect>,
}

impl<H: DockHost> DockGrid<H> {
    pub fn new(host: H, settings: &LayoutSettings, width: f32, height: f32) -> Self {
        Self {
            host,
            trees: Vec::new(),
            next_tree_id: 0,
            sizing: SizingState::None,
            drag: None,
            border_thickness: settings.border_thickness.max(0.0),
            hit_tolerance: settings.hit_tolerance.max(0.0),
            canvas: (width, height),
            buttons: MouseButtons::NONE,
            reported: HashMap::new(),
        }
    }

    pub fn host(&self) -> &H {
        &self.host
    }

    pub fn host_mut(&mut self) -> &mut H {
        &mut self.host
    }

    pub fn trees(&self) -> &[DockTree] {
        &self.trees
    }

    pub fn tree(&self, id: TreeId) -> Option<&DockTree> {
        self.trees.iter().find(|t| t.id() == id)
    }

    pub fn sizing_state(&self) -> SizingState {
        self.sizing
    }

    pub fn drag(&self) -> Option<&DragContext> {
        self.drag.as_ref()
    }

    pub fn canvas(&self) -> (f32, f32) {
        self.canvas
    }

    pub fn canvas_rect(&self) -> Rect {
        Rect::new(0.0, 0.0, self.canvas.0, self.canvas.1)
    }

    fn tree_index_of(&self, panel: PanelHandle) -> Option<usize> {
        self.trees.iter().position(|t| t.contains(panel))
    }

    pub fn tree_of(&self, panel: PanelHandle) -> Option<TreeId> {
        self.tree_index_of(panel).map(|i| self.trees[i].id())
    }

    pub fn panels(&self) -> Vec<PanelHandle> {
        self.trees.iter().flat_map(|t| t.panels()).collect()
    }

    pub fn panel_rect(&self, panel: PanelHandle) -> Option<Rect> {
        self.trees.iter().find_map(|t| t.panel_rect(panel))
    }

    pub fn panel_at(&self, point: (f32, f32)) -> Option<PanelHandle> {
        self.trees.iter().find_map(|t| t.panel_at(point))
    }

    fn alloc_tree_id(&mut self) -> TreeId {
        let id = TreeId(self.next_tree_id);
        self.next_tree_id += 1;
        id
    }

    /// Add a new workspace holding `panel`
    pub fn create_workspace(&mut self, bounds: Rect, panel: PanelHandle) -> Result<TreeId> {
        if self.tree_index_of(panel).is_some() {
            return Err(DockError::DuplicatePanel(panel));
        }
        let id = TreeId(self.next_tree_id);
        let tree = DockTree::new(id, bounds, panel, self.border_thickness)?;
        self.next_tree_id += 1;
        self.trees.push(tree);
        tracing::info!("Created workspace {:?} with panel {:?}", id, panel);
        Ok(id)
    }

    /// Remove a workspace, returning the panels it held
    pub fn remove_workspace(&mut self, id: TreeId) -> Result<Vec<PanelHandle>> {
        let index = self
            .trees
            .iter()
            .position(|t| t.id() == id)
            .ok_or(DockError::WorkspaceNotFound(id))?;
        let tree = self.trees.remove(index);
        let panels = tree.panels();
        for panel in &panels {
            self.reported.remove(panel);
        }
        self.cancel_drag_in(id);
        tracing::info!("Removed workspace {:?}", id);
        Ok(panels)
    }

    /// Dock a new panel next to `target`. The factory is only called once the
    /// target is known to exist.
    ///
    /// If the factory returns a handle that is already docked, or the target is
    /// too deeply nested, the error is returned after the factory has run and
    /// the handle it produced is not docked. The host owns that panel and must
    /// dispose of it.
    pub fn split_panel<F>(&mut self, target: PanelHandle, direction: Direction, factory: F) -> Result<PanelHandle>
    where
        F: FnOnce(&mut H) -> PanelHandle,
    {
        let index = self.tree_index_of(target).ok_or(DockError::NodeNotFound(target))?;
        let new_panel = factory(&mut self.host);
        if self.tree_index_of(new_panel).is_some() {
            return Err(DockError::DuplicatePanel(new_panel));
        }
        self.trees[index].split(target, direction, new_panel)?;
        Ok(new_panel)
    }

    /// Undock a panel. Closing the last panel of a workspace removes the workspace.
    pub fn close_panel(&mut self, panel: PanelHandle) -> Result<()> {
        let index = self.tree_index_of(panel).ok_or(DockError::NodeNotFound(panel))?;
        let id = self.trees[index].id();
        // Drag targets may be released by the close
        self.cancel_drag_in(id);

        match self.trees[index].close(panel)? {
            CloseOutcome::Emptied => {
                self.trees.remove(index);
                tracing::info!("Closed last panel {:?}, removed workspace {:?}", panel, id);
            }
            CloseOutcome::Closed { .. } => {}
        }
        self.reported.remove(&panel);
        Ok(())
    }

    pub fn set_split_ratio(&mut self, tree: TreeId, split: NodeId, ratio: f32) -> Result<f32> {
        self.trees
            .iter_mut()
            .find(|t| t.id() == tree)
            .ok_or(DockError::WorkspaceNotFound(tree))?
            .set_split_ratio(split, ratio)
    }

    /// Rescale every workspace to a new canvas size. Split ratios are untouched.
    pub fn update_size(&mut self, width: f32, height: f32) -> Result<()> {
        let target = Rect::new(0.0, 0.0, width, height);
        if target.is_degenerate() {
            tracing::warn!("Ignoring degenerate canvas size {}x{}", width, height);
            return Err(DockError::DegenerateRect { width, height });
        }

        let (old_width, old_height) = self.canvas;
        if (old_width, old_height) == (width, height) {
            return Ok(());
        }

        if old_width > 0.0 && old_height > 0.0 {
            let sx = width / old_width;
            let sy = height / old_height;
            let scaled: Vec<Rect> = self.trees.iter().map(|t| t.bounds().scaled(sx, sy)).collect();
            if let Some(bad) = scaled.iter().find(|r| r.is_degenerate()) {
                return Err(DockError::DegenerateRect {
                    width: bad.width,
                    height: bad.height,
                });
            }
            for (tree, bounds) in self.trees.iter_mut().zip(scaled) {
                tree.resize(bounds)?;
            }
        }

        tracing::debug!("Canvas resized to {}x{}", width, height);
        self.canvas = (width, height);
        Ok(())
    }

    /// Advance one frame: hover state, drag, mouse routing, then geometry notifications
    pub fn update(&mut self, input: &FrameInput) {
        let pressed = input.buttons.pressed_since(self.buttons);
        let released_primary = self.buttons.left && !input.buttons.left;
        self.buttons = input.buttons;

        match self.drag {
            Some(drag) => {
                self.set_sizing_state(drag.axis);
                if released_primary {
                    self.end_drag();
                    let state = self.hover_at(input.mouse).map_or(SizingState::None, |h| h.state());
                    self.set_sizing_state(state);
                } else {
                    self.service_drag(drag, input.mouse);
                }
            }
            None => {
                let hover = self.hover_at(input.mouse);
                self.set_sizing_state(hover.map_or(SizingState::None, |h| h.state()));

                match hover {
                    Some(hit) if pressed.left => self.begin_drag(hit, input.mouse),
                    // Other buttons over a splitter are swallowed
                    Some(_) => {}
                    None if pressed.any() => self.route_mouse(input.mouse, pressed),
                    None => {}
                }
            }
        }

        self.flush_geometry();
    }

    fn set_sizing_state(&mut self, state: SizingState) {
        if state != self.sizing {
            tracing::debug!("Sizing state {:?} -> {:?}", self.sizing, state);
            self.sizing = state;
            self.host.set_cursor_style(state.cursor_style());
        }
    }

    /// Nearest splitters under the cursor. A crossing of both axes in the same
    /// workspace wins over a single boundary.
    fn hover_at(&self, point: (f32, f32)) -> Option<HoverHit> {
        let mut best: Option<HoverHit> = None;
        // No splitter can be hit from farther than this
        let reach = (self.hit_tolerance + self.border_thickness).max(1.0);
        let window = Rect::new(point.0 - reach, point.1 - reach, reach * 2.0, reach * 2.0);

        for tree in &self.trees {
            if !rects_overlap(tree.bounds(), window) {
                continue;
            }
            let mut hit = HoverHit {
                tree: tree.id(),
                horizontal: None,
                vertical: None,
            };
            for splitter in tree.splitters() {
                let Some(distance) = splitter.hit_distance(point, self.hit_tolerance) else {
                    continue;
                };
                let slot = match splitter.orientation {
                    Orientation::Horizontal => &mut hit.horizontal,
                    Orientation::Vertical => &mut hit.vertical,
                };
                if slot.map_or(true, |(_, d)| distance < d) {
                    *slot = Some((*splitter, distance));
                }
            }

            if hit.state() == SizingState::None {
                continue;
            }
            let better = match best {
                None => true,
                Some(current) => {
                    let (current_both, hit_both) =
                        (current.state() == SizingState::Both, hit.state() == SizingState::Both);
                    if current_both != hit_both {
                        hit_both
                    } else {
                        hit.distance() < current.distance()
                    }
                }
            };
            if better {
                best = Some(hit);
            }
        }

        best
    }

    fn begin_drag(&mut self, hit: HoverHit, mouse: (f32, f32)) {
        let grab_x = hit.horizontal.map_or(0.0, |(s, _)| mouse.0 - s.position());
        let grab_y = hit.vertical.map_or(0.0, |(s, _)| mouse.1 - s.position());
        let drag = DragContext {
            tree: hit.tree,
            axis: hit.state(),
            horizontal: hit.horizontal.map(|(s, _)| s.split),
            vertical: hit.vertical.map(|(s, _)| s.split),
            grab_offset: (grab_x, grab_y),
        };
        tracing::debug!("Begin drag {:?}", drag);
        self.drag = Some(drag);
    }

    fn end_drag(&mut self) {
        if let Some(drag) = self.drag.take() {
            tracing::debug!("End drag in workspace {:?}", drag.tree);
        }
    }

    fn cancel_drag_in(&mut self, tree: TreeId) {
        if self.drag.is_some_and(|d| d.tree == tree) {
            tracing::debug!("Cancelled drag in workspace {:?}", tree);
            self.drag = None;
        }
    }

    fn service_drag(&mut self, drag: DragContext, mouse: (f32, f32)) {
        let Some(tree) = self.trees.iter_mut().find(|t| t.id() == drag.tree) else {
            self.drag = None;
            return;
        };

        let targets = [
            (drag.horizontal, Orientation::Horizontal, drag.grab_offset.0),
            (drag.vertical, Orientation::Vertical, drag.grab_offset.1),
        ];
        for (split, orientation, offset) in targets {
            let Some(split) = split else {
                continue;
            };
            let Some(area) = tree.split_area(split) else {
                tracing::warn!("Drag target {:?} vanished, cancelling drag", split);
                self.drag = None;
                return;
            };
            let extent = orientation.extent(area);
            if extent <= 0.0 {
                continue;
            }

            let ratio = clamp_ratio((orientation.coord(mouse) - offset - orientation.origin(area)) / extent);
            if tree.split_ratio(split) != Some(ratio) {
                if let Err(err) = tree.set_split_ratio(split, ratio) {
                    tracing::warn!("Drag failed: {}", err);
                    self.drag = None;
                    return;
                }
            }
        }
    }

    fn route_mouse(&mut self, point: (f32, f32), pressed: MouseButtons) {
        if let Some(panel) = self.panel_at(point) {
            self.host.mouse_routed(panel, point.0, point.1, pressed);
        }
    }

    /// Report every panel whose rectangle differs from the last one reported
    fn flush_geometry(&mut self) {
        let mut current = Vec::new();
        for tree in &self.trees {
            let layout = tree.layout();
            for panel in tree.panels() {
                if let Some(rect) = layout.panels.get(&panel) {
                    current.push((panel, *rect));
                }
            }
        }

        for (panel, rect) in &current {
            if self.reported.get(panel) != Some(rect) {
                self.host.panel_geometry_changed(*panel, *rect);
            }
        }
        self.reported = current.into_iter().collect();
    }

    /// Snapshot every workspace, collecting per-panel state from the host
    pub fn save_layout(&mut self) -> LayoutFile {
        let mut file = LayoutFile::new(self.canvas);
        for tree in &self.trees {
            let root = persist::save_node(&mut self.host, &tree.root());
            file.add_workspace(tree.bounds(), root);
        }
        tracing::info!("Saved layout with {} workspace(s)", file.workspaces.len());
        file
    }

    /// Replace all workspaces with a saved layout.
    ///
    /// A workspace that fails validation is replaced by a single default panel
    /// from the host (or dropped if the host has none); the returned errors
    /// describe what was recovered from.
    pub fn load_layout(&mut self, file: &LayoutFile) -> Vec<DockError> {
        self.trees.clear();
        self.drag = None;
        self.reported.clear();
        let canvas = Rect::new(0.0, 0.0, file.canvas.0, file.canvas.1);
        if !canvas.is_degenerate() {
            self.canvas = file.canvas;
        }

        let mut errors = Vec::new();
        let mut docked: HashSet<PanelHandle> = HashSet::new();

        for (index, workspace) in file.workspaces.iter().enumerate() {
            let restored = persist::validate_workspace(workspace)
                .and_then(|()| persist::restore_node(&mut self.host, &workspace.root, &docked));

            let id = self.alloc_tree_id();
            let built = restored.and_then(|restored| {
                DockTree::from_node(id, workspace.bounds, &restored.root, self.border_thickness)
                    .map(|tree| (tree, restored.states))
                    .map_err(|err| err.to_string())
            });

            match built {
                Ok((tree, states)) => {
                    for (panel, state) in &states {
                        docked.insert(*panel);
                        self.host.load_state(*panel, state);
                    }
                    self.trees.push(tree);
                }
                Err(reason) => {
                    tracing::warn!("Workspace {} in saved layout is malformed: {}", index, reason);
                    errors.push(DockError::MalformedPersistedTree { index, reason });
                    if let Some(tree) = self.fallback_tree(id, workspace.bounds, &docked) {
                        docked.extend(tree.panels());
                        self.trees.push(tree);
                    }
                }
            }
        }

        tracing::info!(
            "Loaded layout: {} workspace(s), {} recovered",
            self.trees.len(),
            errors.len()
        );
        errors
    }

    fn fallback_tree(&mut self, id: TreeId, bounds: Rect, docked: &HashSet<PanelHandle>) -> Option<DockTree> {
        let bounds = if bounds.is_degenerate() { self.canvas_rect() } else { bounds };
        let panel = self.host.default_panel()?;
        if docked.contains(&panel) {
            return None;
        }
        DockTree::new(id, bounds, panel, self.border_thickness).ok()
    }

    /// Human-readable dump of every workspace
    pub fn dump(&self) -> String {
        let mut out = String::new();
        for tree in &self.trees {
            let b = tree.bounds();
            out.push_str(&format!(
                "workspace {} ({} {} {}x{})\n",
                tree.id().0,
                b.x,
                b.y,
                b.width,
                b.height
            ));
            out.push_str(&tree.root().to_string());
        }
        out
    }
}
