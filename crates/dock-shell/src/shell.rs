// ABOUTME: Headless application state: the dock grid, its console host and the simulated mouse.
// ABOUTME: Executes script commands one at a time, running a grid frame after each input change.

use std::path::{Path, PathBuf};

use anyhow::{anyhow, Context, Result};
use dock_core::{Config, LayoutFile};
use dock_layout::{DockGrid, FrameInput, MouseButtons, PanelHandle};

use crate::host::ConsoleHost;
use crate::script::Command;

/// Panel opened when there is no saved layout to restore
const DEFAULT_PANEL: &str = "memory";

pub struct Shell {
    grid: DockGrid<ConsoleHost>,
    window: (f32, f32),
    mouse: (f32, f32),
    buttons: MouseButtons,
    layout_path: Option<PathBuf>,
}

impl Shell {
    pub fn new(config: &Config, layout_path: Option<PathBuf>) -> Self {
        let window = (config.window.width as f32, config.window.height as f32);
        Self {
            grid: DockGrid::new(ConsoleHost::new(), &config.layout, window.0, window.1),
            window,
            mouse: (0.0, 0.0),
            buttons: MouseButtons::NONE,
            layout_path,
        }
    }

    pub fn grid(&self) -> &DockGrid<ConsoleHost> {
        &self.grid
    }

    /// Restore the saved layout if there is one, otherwise open a single default panel
    pub fn restore_or_default(&mut self) -> Result<()> {
        if let Some(path) = self.layout_path.clone().filter(|p| p.exists()) {
            match self.load(&path) {
                Ok(()) if !self.grid.trees().is_empty() => return Ok(()),
                Ok(()) => tracing::warn!("Saved layout {:?} has no workspaces", path),
                Err(e) => tracing::warn!("Failed to restore layout: {:#}", e),
            }
        }

        let panel = self.grid.host_mut().create_panel(DEFAULT_PANEL);
        let bounds = self.grid.canvas_rect();
        self.grid.create_workspace(bounds, panel)?;
        self.frame();
        Ok(())
    }

    fn frame(&mut self) {
        let input = FrameInput::new(self.mouse.0, self.mouse.1, self.buttons);
        self.grid.update(&input);
    }

    fn panel(&self, name: &str) -> Result<PanelHandle> {
        self.grid
            .host()
            .find(name)
            .ok_or_else(|| anyhow!("no panel named '{}'", name))
    }

    pub fn execute(&mut self, command: &Command) -> Result<()> {
        match command {
            Command::Move { x, y } => self.mouse = (*x, *y),
            Command::Down => self.buttons.left = true,
            Command::Up => self.buttons.left = false,
            Command::RightClick => {
                self.buttons.right = true;
                self.frame();
                self.buttons.right = false;
            }
            Command::Frame => {}
            Command::Size { width, height } => {
                self.grid.update_size(*width, *height)?;
                self.window = (*width, *height);
            }
            Command::Split {
                target,
                direction,
                name,
            } => {
                let target = self.panel(target)?;
                let mut created = None;
                let result = self.grid.split_panel(target, *direction, |host| {
                    let panel = host.create_panel(name);
                    created = Some(panel);
                    panel
                });
                if let Err(e) = result {
                    if let Some(panel) = created {
                        self.grid.host_mut().destroy_panel(panel);
                    }
                    return Err(e.into());
                }
            }
            Command::Close { panel } => {
                let handle = self.panel(panel)?;
                self.grid.close_panel(handle)?;
                self.grid.host_mut().destroy_panel(handle);
            }
            Command::Workspace { bounds, name } => {
                let panel = self.grid.host_mut().create_panel(name);
                if let Err(e) = self.grid.create_workspace(*bounds, panel) {
                    self.grid.host_mut().destroy_panel(panel);
                    return Err(e.into());
                }
            }
            Command::Save(path) => self.save(path.as_deref())?,
            Command::Load(path) => {
                let path = self.resolve_path(path.as_deref())?;
                self.load(&path)?;
            }
            Command::Dump => print!("{}", self.report()),
        }
        self.frame();
        Ok(())
    }

    fn resolve_path(&self, path: Option<&Path>) -> Result<PathBuf> {
        path.map(Path::to_path_buf)
            .or_else(|| self.layout_path.clone())
            .ok_or_else(|| anyhow!("no layout path configured"))
    }

    pub fn save(&mut self, path: Option<&Path>) -> Result<()> {
        let path = self.resolve_path(path)?;
        let file = self.grid.save_layout();
        file.save(&path)
            .with_context(|| format!("saving layout to {:?}", path))?;
        tracing::info!("Saved layout to {:?}", path);
        Ok(())
    }

    fn load(&mut self, path: &Path) -> Result<()> {
        let file = LayoutFile::load(path).with_context(|| format!("loading layout from {:?}", path))?;

        let previous = self.grid.panels();
        for error in self.grid.load_layout(&file) {
            tracing::warn!("{}", error);
        }
        let docked = self.grid.panels();
        for panel in previous.into_iter().filter(|p| !docked.contains(p)) {
            self.grid.host_mut().destroy_panel(panel);
        }

        // The saved canvas may differ from the current window
        self.grid.update_size(self.window.0, self.window.1)?;
        self.frame();
        tracing::info!("Loaded layout from {:?}", path);
        Ok(())
    }

    /// Tree dump followed by each panel as the host last saw it
    pub fn report(&self) -> String {
        let mut out = self.grid.dump();
        let host = self.grid.host();
        for panel in self.grid.panels() {
            if let Some(rect) = host.rect(panel) {
                out.push_str(&format!(
                    "panel {} '{}': {} {} {}x{} clicks={}\n",
                    panel.0,
                    host.name(panel),
                    rect.x,
                    rect.y,
                    rect.width,
                    rect.height,
                    host.clicks(panel)
                ));
            }
        }
        out.push_str(&format!("cursor {:?}\n", host.cursor()));
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::script;
    use dock_layout::{CursorStyle, Rect, MAX_DEPTH};

    fn shell() -> Shell {
        let mut shell = Shell::new(&Config::default(), None);
        shell.restore_or_default().unwrap();
        shell
    }

    fn run(shell: &mut Shell, source: &str) {
        for (line, command) in script::parse(source).unwrap() {
            shell
                .execute(&command)
                .unwrap_or_else(|e| panic!("line {}: {:#}", line, e));
        }
    }

    fn rect_of(shell: &Shell, name: &str) -> Rect {
        let panel = shell.grid().host().find(name).unwrap();
        shell.grid().host().rect(panel).unwrap()
    }

    #[test]
    fn default_panel_fills_window() {
        let shell = shell();
        assert_eq!(rect_of(&shell, "memory"), Rect::new(0.0, 0.0, 1280.0, 1024.0));
    }

    #[test]
    fn dragging_splitter_moves_boundary() {
        let mut shell = shell();
        run(&mut shell, "split memory right disasm\nmove 640 100");
        assert_eq!(shell.grid().host().cursor(), CursorStyle::ResizeHorizontal);

        run(&mut shell, "down\nmove 320 100\nup");
        assert_eq!(rect_of(&shell, "memory"), Rect::new(0.0, 0.0, 318.0, 1024.0));
        assert_eq!(rect_of(&shell, "disasm"), Rect::new(322.0, 0.0, 958.0, 1024.0));
    }

    #[test]
    fn click_in_panel_is_routed() {
        let mut shell = shell();
        run(&mut shell, "split memory down registers\nmove 100 900\ndown\nup\nrclick");
        let registers = shell.grid().host().find("registers").unwrap();
        assert_eq!(shell.grid().host().clicks(registers), 2);
    }

    #[test]
    fn unknown_panel_is_an_error() {
        let mut shell = shell();
        let commands = script::parse("close nothing").unwrap();
        assert!(shell.execute(&commands[0].1).is_err());
        assert_eq!(shell.grid().panels().len(), 1);
    }

    #[test]
    fn failed_split_forgets_new_panel() {
        let mut shell = shell();
        let mut source = String::from("split memory down p1\n");
        for i in 1..MAX_DEPTH {
            source.push_str(&format!("split p{} down p{}\n", i, i + 1));
        }
        run(&mut shell, &source);

        let commands = script::parse(&format!("split p{} down overflow", MAX_DEPTH)).unwrap();
        assert!(shell.execute(&commands[0].1).is_err());
        assert!(shell.grid().host().find("overflow").is_none());
        assert_eq!(shell.grid().panels().len(), MAX_DEPTH + 1);
    }

    #[test]
    fn close_forgets_panel() {
        let mut shell = shell();
        run(&mut shell, "split memory left disasm\nclose disasm");
        assert!(shell.grid().host().find("disasm").is_none());
        assert_eq!(rect_of(&shell, "memory"), Rect::new(0.0, 0.0, 1280.0, 1024.0));
    }

    #[test]
    fn save_and_load_roundtrip() {
        let path = std::env::temp_dir().join(format!("viewdock-shell-test-{}.bin", std::process::id()));
        let mut shell = shell();
        run(
            &mut shell,
            &format!(
                "split memory right disasm\nmove 100 100\ndown\nup\nsave {}",
                path.display()
            ),
        );
        let saved = shell.report();

        let mut restored = Shell::new(&Config::default(), Some(path.clone()));
        restored.restore_or_default().unwrap();
        let _ = std::fs::remove_file(&path);

        assert_eq!(restored.grid().panels().len(), 2);
        assert_eq!(rect_of(&restored, "disasm"), rect_of(&shell, "disasm"));
        let memory = restored.grid().host().find("memory").unwrap();
        assert_eq!(restored.grid().host().clicks(memory), 1);
        assert_eq!(restored.report().lines().count(), saved.lines().count());
    }
}
