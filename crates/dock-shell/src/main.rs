// ABOUTME: Entry point for the headless viewdock shell.
// ABOUTME: Loads config, restores the layout, replays an input script and autosaves on exit.

mod host;
mod script;
mod shell;

use anyhow::{Context, Result};
use dock_core::{Config, LayoutFile};

use shell::Shell;

/// Played when no script file is given
const DEMO_SCRIPT: &str = "\
# Dock disassembly beside memory and registers below it
split memory right disassembly
split memory down registers
# Drag the side-by-side boundary to a third of the window
move 640 100
down
move 427 100
up
# Click into the registers panel
move 100 900
down
up
size 1600 1200
dump
";

fn main() -> Result<()> {
    tracing_subscriber::fmt::init();

    tracing::info!("Starting viewdock");

    let config = Config::load_or_default();
    let source = match std::env::args().nth(1) {
        Some(path) => std::fs::read_to_string(&path).with_context(|| format!("reading script {}", path))?,
        None => DEMO_SCRIPT.to_string(),
    };
    let commands = script::parse(&source)?;

    let layout_path = config
        .persistence
        .layout_path
        .clone()
        .or_else(LayoutFile::default_path);
    let mut shell = Shell::new(&config, layout_path);
    shell.restore_or_default()?;

    for (line, command) in &commands {
        if let Err(e) = shell.execute(command) {
            tracing::warn!("line {}: {:#}", line, e);
        }
    }

    if config.persistence.autosave {
        if let Err(e) = shell.save(None) {
            tracing::warn!("Autosave failed: {:#}", e);
        }
    }

    Ok(())
}
