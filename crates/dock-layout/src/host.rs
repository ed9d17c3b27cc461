// ABOUTME: Callback interface the dock grid uses to talk to its host application.
// ABOUTME: Covers geometry notifications, cursor feedback, mouse routing and panel state.

use dock_core::Rect;

use crate::node::PanelHandle;

/// Mouse cursor the host should display
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CursorStyle {
    #[default]
    Default,
    ResizeHorizontal,
    ResizeVertical,
    ResizeAll,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct MouseButtons {
    pub left: bool,
    pub right: bool,
    pub middle: bool,
}

impl MouseButtons {
    pub const NONE: Self = Self {
        left: false,
        right: false,
        middle: false,
    };

    pub const LEFT: Self = Self {
        left: true,
        right: false,
        middle: false,
    };

    pub const RIGHT: Self = Self {
        left: false,
        right: true,
        middle: false,
    };

    pub fn any(&self) -> bool {
        self.left || self.right || self.middle
    }

    /// Buttons that are down now but were up in `previous`
    pub fn pressed_since(&self, previous: MouseButtons) -> MouseButtons {
        MouseButtons {
            left: self.left && !previous.left,
            right: self.right && !previous.right,
            middle: self.middle && !previous.middle,
        }
    }
}

/// Implemented by the application that owns the panels.
///
/// Only geometry and cursor notifications are required; the persistence hooks
/// default to treating the panel handle's number as its identity with no state.
pub trait DockHost {
    /// A panel's rectangle changed since it was last reported
    fn panel_geometry_changed(&mut self, panel: PanelHandle, rect: Rect);

    /// The hover state over splitters changed
    fn set_cursor_style(&mut self, style: CursorStyle);

    /// A button was pressed over a panel (and not over a splitter)
    fn mouse_routed(&mut self, _panel: PanelHandle, _x: f32, _y: f32, _buttons: MouseButtons) {}

    /// Opaque state to store alongside the panel in a saved layout
    fn save_state(&mut self, _panel: PanelHandle) -> Vec<u8> {
        Vec::new()
    }

    /// Restore state previously returned by `save_state`
    fn load_state(&mut self, _panel: PanelHandle, _state: &[u8]) {}

    /// Stable name for a panel in a saved layout
    fn panel_identity(&self, panel: PanelHandle) -> String {
        panel.0.to_string()
    }

    /// Map a saved identity back to a live panel, creating it if needed
    fn resolve_panel(&mut self, identity: &str) -> Option<PanelHandle> {
        identity.parse().ok().map(PanelHandle)
    }

    /// Panel used to fill a workspace whose saved layout could not be restored
    fn default_panel(&mut self) -> Option<PanelHandle> {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Quiet;

    impl DockHost for Quiet {
        fn panel_geometry_changed(&mut self, _panel: PanelHandle, _rect: Rect) {}
        fn set_cursor_style(&mut self, _style: CursorStyle) {}
    }

    #[test]
    fn default_identity_roundtrips_handle() {
        let mut host = Quiet;
        let identity = host.panel_identity(PanelHandle(42));
        assert_eq!(identity, "42");
        assert_eq!(host.resolve_panel(&identity), Some(PanelHandle(42)));
        assert_eq!(host.resolve_panel("memory"), None);
        assert_eq!(host.default_panel(), None);
        assert!(host.save_state(PanelHandle(42)).is_empty());
    }

    #[test]
    fn pressed_since_detects_edges() {
        let now = MouseButtons {
            left: true,
            right: true,
            middle: false,
        };
        let pressed = now.pressed_since(MouseButtons::LEFT);
        assert_eq!(pressed, MouseButtons::RIGHT);
        assert!(!MouseButtons::NONE.pressed_since(MouseButtons::LEFT).any());
    }
}
