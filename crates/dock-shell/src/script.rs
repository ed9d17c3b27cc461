// ABOUTME: Line-oriented input script for driving the dock grid without a window.
// ABOUTME: Each line is one command; `#` starts a comment.

use std::path::PathBuf;

use anyhow::{anyhow, bail, Context, Result};
use dock_layout::{Direction, Rect};

#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    /// Move the mouse and run a frame
    Move { x: f32, y: f32 },
    /// Press the left button and run a frame
    Down,
    /// Release the left button and run a frame
    Up,
    /// Click the right button at the current position
    RightClick,
    /// Run a frame with unchanged input
    Frame,
    /// Resize the canvas
    Size { width: f32, height: f32 },
    Split {
        target: String,
        direction: Direction,
        name: String,
    },
    Close { panel: String },
    /// Add a floating workspace holding a new panel
    Workspace { bounds: Rect, name: String },
    Save(Option<PathBuf>),
    Load(Option<PathBuf>),
    Dump,
}

fn number(word: Option<&str>, what: &str) -> Result<f32> {
    let word = word.ok_or_else(|| anyhow!("missing {}", what))?;
    let value: f32 = word.parse().with_context(|| format!("invalid {} '{}'", what, word))?;
    if !value.is_finite() {
        bail!("invalid {} '{}'", what, word);
    }
    Ok(value)
}

fn word<'a>(word: Option<&'a str>, what: &str) -> Result<&'a str> {
    word.ok_or_else(|| anyhow!("missing {}", what))
}

fn parse_line(line: &str) -> Result<Option<Command>> {
    let line = line.split('#').next().unwrap_or("").trim();
    let mut words = line.split_whitespace();
    let Some(verb) = words.next() else {
        return Ok(None);
    };

    let command = match verb {
        "move" => Command::Move {
            x: number(words.next(), "x")?,
            y: number(words.next(), "y")?,
        },
        "down" => Command::Down,
        "up" => Command::Up,
        "rclick" => Command::RightClick,
        "frame" => Command::Frame,
        "size" => Command::Size {
            width: number(words.next(), "width")?,
            height: number(words.next(), "height")?,
        },
        "split" => {
            let target = word(words.next(), "target panel")?.to_string();
            let dir = word(words.next(), "direction")?;
            let direction = Direction::parse(dir).ok_or_else(|| anyhow!("unknown direction '{}'", dir))?;
            let name = word(words.next(), "new panel name")?.to_string();
            Command::Split {
                target,
                direction,
                name,
            }
        }
        "close" => Command::Close {
            panel: word(words.next(), "panel")?.to_string(),
        },
        "workspace" => {
            let x = number(words.next(), "x")?;
            let y = number(words.next(), "y")?;
            let width = number(words.next(), "width")?;
            let height = number(words.next(), "height")?;
            Command::Workspace {
                bounds: Rect::new(x, y, width, height),
                name: word(words.next(), "panel name")?.to_string(),
            }
        }
        "save" => Command::Save(words.next().map(PathBuf::from)),
        "load" => Command::Load(words.next().map(PathBuf::from)),
        "dump" => Command::Dump,
        other => bail!("unknown command '{}'", other),
    };

    if let Some(extra) = words.next() {
        bail!("unexpected '{}' after {}", extra, verb);
    }
    Ok(Some(command))
}

/// Parse a whole script, pairing each command with its 1-based line number
pub fn parse(script: &str) -> Result<Vec<(usize, Command)>> {
    let mut commands = Vec::new();
    for (index, line) in script.lines().enumerate() {
        let number = index + 1;
        if let Some(command) = parse_line(line).with_context(|| format!("line {}", number))? {
            commands.push((number, command));
        }
    }
    Ok(commands)
}
