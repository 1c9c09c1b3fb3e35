//! Line-based console for driving a session from a terminal

use crate::game::{ClientCommand, Screen};
use crate::input::{Action, InputEvent, Stick};
use crate::room::GameMode;

/// Pointer ids used for the console's virtual sticks
const LEFT_POINTER: u64 = 1;
const RIGHT_POINTER: u64 = 2;

/// A parsed console line
#[derive(Debug, Clone, PartialEq)]
pub enum ConsoleCommand {
    Client(ClientCommand),
    Input(InputEvent),
    /// Print joinable rooms
    Rooms,
    /// Print session status
    Status,
    Help,
    Quit,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ParseError {
    #[error("Unknown command: {0}")]
    Unknown(String),

    #[error("Usage: {0}")]
    Usage(&'static str),
}

pub const HELP: &str = "\
create <name> [classic|infection|bodyguard] [max]
join <room_id> | ready | start | leave | say <text>
press <code> | release <code> | blur
stick <left|right> <dx> <dy> | drag <left|right> <dx> <dy> | unstick <left|right>
button <view|safe|equip> | unbutton <view|safe|equip>
screen <lobby|room|game> | rooms | status | help | quit";

pub fn parse_line(line: &str) -> Result<Option<ConsoleCommand>, ParseError> {
    let line = line.trim();
    let Some((verb, rest)) = split_verb(line) else {
        return Ok(None);
    };
    let args: Vec<&str> = rest.split_whitespace().collect();

    let command = match verb {
        "create" => {
            let name = args.first().ok_or(ParseError::Usage("create <name> [mode] [max]"))?;
            let mode = match args.get(1) {
                Some(raw) => GameMode::parse(raw).ok_or(ParseError::Usage("mode is classic, infection or bodyguard"))?,
                None => GameMode::default(),
            };
            let max_players = match args.get(2) {
                Some(raw) => raw.parse().map_err(|_| ParseError::Usage("max is a number"))?,
                None => 4,
            };
            ConsoleCommand::Client(ClientCommand::CreateRoom {
                name: name.to_string(),
                mode,
                max_players,
            })
        }
        "join" => {
            let room_id = args.first().ok_or(ParseError::Usage("join <room_id>"))?;
            ConsoleCommand::Client(ClientCommand::JoinRoom(room_id.to_string()))
        }
        "ready" => ConsoleCommand::Client(ClientCommand::ToggleReady),
        "start" => ConsoleCommand::Client(ClientCommand::ForceStart),
        "leave" => ConsoleCommand::Client(ClientCommand::LeaveRoom),
        "say" => ConsoleCommand::Client(ClientCommand::Chat(rest.to_string())),
        "press" | "release" => {
            let code = args.first().ok_or(ParseError::Usage("press|release <code>"))?;
            let event = if verb == "press" {
                InputEvent::KeyDown(code.to_string())
            } else {
                InputEvent::KeyUp(code.to_string())
            };
            ConsoleCommand::Input(event)
        }
        "blur" => ConsoleCommand::Input(InputEvent::Blur),
        "stick" | "drag" => {
            let usage = ParseError::Usage("stick|drag <left|right> <dx> <dy>");
            let (stick, pointer_id) = parse_stick(args.first()).ok_or(usage.clone())?;
            let dx = parse_f32(args.get(1)).ok_or(usage.clone())?;
            let dy = parse_f32(args.get(2)).ok_or(usage)?;
            // A drag only moves a stick that is already pressed
            let event = if verb == "stick" {
                InputEvent::StickPress {
                    stick,
                    pointer_id,
                    dx,
                    dy,
                }
            } else {
                InputEvent::StickMove {
                    stick,
                    pointer_id,
                    dx,
                    dy,
                }
            };
            ConsoleCommand::Input(event)
        }
        "unstick" => {
            let (stick, pointer_id) =
                parse_stick(args.first()).ok_or(ParseError::Usage("unstick <left|right>"))?;
            ConsoleCommand::Input(InputEvent::StickRelease { stick, pointer_id })
        }
        "button" | "unbutton" => {
            let action = parse_action(args.first())
                .ok_or(ParseError::Usage("button <view|safe|equip>"))?;
            let event = if verb == "button" {
                InputEvent::ButtonDown(action)
            } else {
                InputEvent::ButtonUp(action)
            };
            ConsoleCommand::Input(event)
        }
        "screen" => {
            let screen = match args.first().copied() {
                Some("lobby") => Screen::Lobby,
                Some("room") => Screen::Room,
                Some("game") => Screen::Game,
                _ => return Err(ParseError::Usage("screen <lobby|room|game>")),
            };
            ConsoleCommand::Client(ClientCommand::SetScreen(screen))
        }
        "rooms" => ConsoleCommand::Rooms,
        "status" => ConsoleCommand::Status,
        "help" => ConsoleCommand::Help,
        "quit" | "exit" => ConsoleCommand::Quit,
        other => return Err(ParseError::Unknown(other.to_string())),
    };

    Ok(Some(command))
}

fn split_verb(line: &str) -> Option<(&str, &str)> {
    if line.is_empty() {
        return None;
    }
    match line.split_once(char::is_whitespace) {
        Some((verb, rest)) => Some((verb, rest.trim())),
        None => Some((line, "")),
    }
}

fn parse_stick(raw: Option<&&str>) -> Option<(Stick, u64)> {
    match raw.copied()? {
        "left" => Some((Stick::Left, LEFT_POINTER)),
        "right" => Some((Stick::Right, RIGHT_POINTER)),
        _ => None,
    }
}

fn parse_action(raw: Option<&&str>) -> Option<Action> {
    match raw.copied()? {
        "view" => Some(Action::ToggleView),
        "safe" => Some(Action::EnterSafeZone),
        "equip" => Some(Action::UseEquipment),
        _ => None,
    }
}

fn parse_f32(raw: Option<&&str>) -> Option<f32> {
    raw?.parse().ok()
}
