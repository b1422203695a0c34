//! Typed terminal commands mapped onto raw pointer / touch events.

use anyhow::{anyhow, bail, Context, Result};
use client_core::{CardId, InputEvent, PointerEvent, TouchEvent, TouchPoint, UiCommand};

/// Displacement used by the `left` / `right` shortcuts.
const SHORTCUT_DRAG: f64 = 120.0;

pub const HELP: &str = "\
commands:
  left | right          swipe far enough to vote
  drag DX               press, move by DX, release (pointer)
  press X | move X | release | leave
  touch X | tmove X | tend
  continue | results | reload | quit";

#[derive(Debug, Clone, PartialEq)]
pub enum TerminalCommand {
    Gesture(Vec<InputEvent>),
    Session(UiCommand),
    Help,
    Quit,
}

impl TerminalCommand {
    /// Expands into session commands; gestures are addressed to `card`.
    pub fn into_ui_commands(self, card: Option<CardId>) -> Result<Vec<UiCommand>> {
        match self {
            Self::Gesture(events) => {
                let card = card.ok_or_else(|| anyhow!("no card on screen"))?;
                Ok(events
                    .into_iter()
                    .map(|event| UiCommand::Input { card, event })
                    .collect())
            }
            Self::Session(command) => Ok(vec![command]),
            Self::Help | Self::Quit => Ok(Vec::new()),
        }
    }
}

pub fn parse_line(line: &str) -> Result<Option<TerminalCommand>> {
    let mut words = line.split_whitespace();
    let Some(verb) = words.next() else {
        return Ok(None);
    };
    let mut coordinate = || -> Result<f64> {
        let raw = words
            .next()
            .ok_or_else(|| anyhow!("'{verb}' needs a coordinate"))?;
        raw.parse::<f64>()
            .with_context(|| format!("'{raw}' is not a number"))
    };

    let command = match verb.to_ascii_lowercase().as_str() {
        "left" => drag(-SHORTCUT_DRAG),
        "right" => drag(SHORTCUT_DRAG),
        "drag" => drag(coordinate()?),
        "press" => pointer(PointerEvent::Down { x: coordinate()? }),
        "move" => pointer(PointerEvent::Move { x: coordinate()? }),
        "release" => pointer(PointerEvent::Up),
        "leave" => pointer(PointerEvent::Leave),
        "touch" => touch(TouchEvent::Start {
            touches: vec![touch_point(coordinate()?)],
        }),
        "tmove" => touch(TouchEvent::Move {
            touches: vec![touch_point(coordinate()?)],
        }),
        "tend" => touch(TouchEvent::End),
        "continue" => TerminalCommand::Session(UiCommand::ContinueUnbounded),
        "results" => TerminalCommand::Session(UiCommand::ViewResults),
        "reload" => TerminalCommand::Session(UiCommand::Reload),
        "help" | "?" => TerminalCommand::Help,
        "quit" | "exit" => TerminalCommand::Quit,
        other => bail!("unknown command '{other}' (try 'help')"),
    };
    Ok(Some(command))
}

fn drag(delta: f64) -> TerminalCommand {
    TerminalCommand::Gesture(vec![
        PointerEvent::Down { x: 0.0 }.into(),
        PointerEvent::Move { x: delta }.into(),
        PointerEvent::Up.into(),
    ])
}

fn pointer(event: PointerEvent) -> TerminalCommand {
    TerminalCommand::Gesture(vec![event.into()])
}

fn touch(event: TouchEvent) -> TerminalCommand {
    TerminalCommand::Gesture(vec![event.into()])
}

fn touch_point(x: f64) -> TouchPoint {
    TouchPoint { x, y: 0.0 }
}
