// ABOUTME: Conversion between live split trees and the saved layout format.
// ABOUTME: Validates saved trees before any host callback runs for them.

use std::collections::HashSet;

use dock_core::{SavedNode, SavedWorkspace};

use crate::host::DockHost;
use crate::node::{DockNode, PanelHandle, MAX_DEPTH};

/// Serialize a tree, asking the host for each panel's identity and state
pub fn save_node<H: DockHost>(host: &mut H, node: &DockNode) -> SavedNode {
    match node {
        DockNode::Leaf(panel) => SavedNode::Leaf {
            panel: host.panel_identity(*panel),
            state: host.save_state(*panel),
        },
        DockNode::Split {
            orientation,
            ratio,
            first,
            second,
        } => SavedNode::split(*orientation, *ratio, save_node(host, first), save_node(host, second)),
    }
}

/// Structural checks that need no host: bounds, ratios, depth and unique identities
pub fn validate_workspace(workspace: &SavedWorkspace) -> Result<(), String> {
    let bounds = workspace.bounds;
    if bounds.is_degenerate() {
        return Err(format!("degenerate bounds {}x{}", bounds.width, bounds.height));
    }
    let mut seen = HashSet::new();
    validate_node(&workspace.root, 0, &mut seen)
}

fn validate_node<'a>(node: &'a SavedNode, depth: usize, seen: &mut HashSet<&'a str>) -> Result<(), String> {
    if depth > MAX_DEPTH {
        return Err(format!("split nesting deeper than {}", MAX_DEPTH));
    }
    match node {
        SavedNode::Leaf { panel, .. } => {
            if panel.is_empty() {
                return Err("leaf without a panel identity".to_string());
            }
            if !seen.insert(panel.as_str()) {
                return Err(format!("panel '{}' appears more than once", panel));
            }
            Ok(())
        }
        SavedNode::Split {
            ratio,
            first,
            second,
            ..
        } => {
            if !ratio.is_finite() || *ratio <= 0.0 || *ratio >= 1.0 {
                return Err(format!("split ratio {} outside (0, 1)", ratio));
            }
            validate_node(first, depth + 1, seen)?;
            validate_node(second, depth + 1, seen)
        }
    }
}

/// A saved tree with its panels resolved to live handles
#[derive(Debug, Clone, PartialEq)]
pub struct RestoredTree {
    pub root: DockNode,
    /// Saved state for each leaf, in first-to-second order
    pub states: Vec<(PanelHandle, Vec<u8>)>,
}

/// Resolve every leaf identity through the host. Panels in `docked` are
/// already placed elsewhere and make the tree invalid.
pub fn restore_node<H: DockHost>(
    host: &mut H,
    node: &SavedNode,
    docked: &HashSet<PanelHandle>,
) -> Result<RestoredTree, String> {
    let mut states = Vec::new();
    let root = resolve(host, node, docked, &mut states)?;
    Ok(RestoredTree { root, states })
}

fn resolve<H: DockHost>(
    host: &mut H,
    node: &SavedNode,
    docked: &HashSet<PanelHandle>,
    states: &mut Vec<(PanelHandle, Vec<u8>)>,
) -> Result<DockNode, String> {
    match node {
        SavedNode::Leaf { panel, state } => {
            let handle = host
                .resolve_panel(panel)
                .ok_or_else(|| format!("unknown panel '{}'", panel))?;
            if docked.contains(&handle) || states.iter().any(|(h, _)| *h == handle) {
                return Err(format!("panel '{}' is already docked", panel));
            }
            states.push((handle, state.clone()));
            Ok(DockNode::Leaf(handle))
        }
        SavedNode::Split {
            orientation,
            ratio,
            first,
            second,
        } => {
            let first = resolve(host, first, docked, states)?;
            let second = resolve(host, second, docked, states)?;
            Ok(DockNode::split(*orientation, *ratio, first, second))
        }
    }
}
