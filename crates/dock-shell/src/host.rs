// ABOUTME: Console host for the dock grid.
// ABOUTME: Tracks named panels, logs every callback, and keeps a small per-panel state blob.

use std::collections::BTreeMap;

use dock_layout::{CursorStyle, DockHost, MouseButtons, PanelHandle, Rect};

#[derive(Debug, Clone, Default)]
struct PanelInfo {
    name: String,
    rect: Rect,
    clicks: u32,
}

impl PanelInfo {
    fn state(&self) -> Vec<u8> {
        format!("clicks={}", self.clicks).into_bytes()
    }

    fn apply_state(&mut self, state: &[u8]) {
        self.clicks = std::str::from_utf8(state)
            .ok()
            .and_then(|s| s.strip_prefix("clicks="))
            .and_then(|n| n.parse().ok())
            .unwrap_or(0);
    }
}

#[derive(Debug, Default)]
pub struct ConsoleHost {
    panels: BTreeMap<PanelHandle, PanelInfo>,
    next_id: u64,
    cursor: CursorStyle,
}

impl ConsoleHost {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a panel, suffixing the name if it is already taken
    pub fn create_panel(&mut self, name: &str) -> PanelHandle {
        let mut unique = name.to_string();
        let mut n = 1;
        while self.find(&unique).is_some() {
            n += 1;
            unique = format!("{}-{}", name, n);
        }

        self.next_id += 1;
        let handle = PanelHandle(self.next_id);
        tracing::info!("Created panel '{}' as {:?}", unique, handle);
        self.panels.insert(
            handle,
            PanelInfo {
                name: unique,
                ..Default::default()
            },
        );
        handle
    }

    pub fn find(&self, name: &str) -> Option<PanelHandle> {
        self.panels
            .iter()
            .find(|(_, info)| info.name == name)
            .map(|(handle, _)| *handle)
    }

    pub fn name(&self, panel: PanelHandle) -> &str {
        self.panels.get(&panel).map_or("?", |info| info.name.as_str())
    }

    pub fn rect(&self, panel: PanelHandle) -> Option<Rect> {
        self.panels.get(&panel).map(|info| info.rect)
    }

    pub fn clicks(&self, panel: PanelHandle) -> u32 {
        self.panels.get(&panel).map_or(0, |info| info.clicks)
    }

    pub fn cursor(&self) -> CursorStyle {
        self.cursor
    }

    /// Forget a panel once it has been undocked
    pub fn destroy_panel(&mut self, panel: PanelHandle) {
        if let Some(info) = self.panels.remove(&panel) {
            tracing::info!("Destroyed panel '{}'", info.name);
        }
    }
}

impl DockHost for ConsoleHost {
    fn panel_geometry_changed(&mut self, panel: PanelHandle, rect: Rect) {
        if let Some(info) = self.panels.get_mut(&panel) {
            tracing::info!(
                "Panel '{}' -> {}x{} at ({}, {})",
                info.name,
                rect.width,
                rect.height,
                rect.x,
                rect.y
            );
            info.rect = rect;
        }
    }

    fn set_cursor_style(&mut self, style: CursorStyle) {
        tracing::info!("Cursor: {:?}", style);
        self.cursor = style;
    }

    fn mouse_routed(&mut self, panel: PanelHandle, x: f32, y: f32, buttons: MouseButtons) {
        if let Some(info) = self.panels.get_mut(&panel) {
            info.clicks += 1;
            tracing::info!("Click {:?} in '{}' at ({}, {})", buttons, info.name, x, y);
        }
    }

    fn save_state(&mut self, panel: PanelHandle) -> Vec<u8> {
        self.panels.get(&panel).map(PanelInfo::state).unwrap_or_default()
    }

    fn load_state(&mut self, panel: PanelHandle, state: &[u8]) {
        if let Some(info) = self.panels.get_mut(&panel) {
            info.apply_state(state);
        }
    }

    fn panel_identity(&self, panel: PanelHandle) -> String {
        self.name(panel).to_string()
    }

    fn resolve_panel(&mut self, identity: &str) -> Option<PanelHandle> {
        Some(self.find(identity).unwrap_or_else(|| self.create_panel(identity)))
    }

    fn default_panel(&mut self) -> Option<PanelHandle> {
        Some(self.create_panel("scratch"))
    }
}
