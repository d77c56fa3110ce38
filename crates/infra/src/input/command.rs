//! Text commands accepted on the interactive console

use thiserror::Error;
use volsync_core::domain::action::Action;
use volsync_core::domain::device::DeviceId;

#[derive(Debug, Error, PartialEq)]
pub enum CommandError {
    #[error("Unknown command: {0}")]
    Unknown(String),

    #[error("Missing argument <{argument}> for '{command}'")]
    MissingArgument {
        command: &'static str,
        argument: &'static str,
    },

    #[error("Unexpected argument: {0}")]
    UnexpectedArgument(String),

    #[error("Invalid number: {0}")]
    InvalidNumber(String),
}

/// Parsed console line
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    Dispatch(Action),
    Quit,
}

/// Parse one line such as `up`, `set 0.4` or `sub 42 0.3`
///
/// Blank lines parse to `None`. Volumes outside [0, 1] are accepted here and
/// clamped by the reducer.
pub fn parse_command(line: &str) -> Result<Option<Command>, CommandError> {
    let mut words = line.split_whitespace();
    let Some(head) = words.next() else {
        return Ok(None);
    };

    let command = match head.to_ascii_lowercase().as_str() {
        "up" | "+" => Command::Dispatch(Action::IncreaseVolume),
        "down" | "-" => Command::Dispatch(Action::DecreaseVolume),
        "mute" => Command::Dispatch(Action::ToggleMute),
        "refresh" => Command::Dispatch(Action::RefreshDevices),
        "set" => {
            let volume = volume_arg(words.next(), "set")?;
            Command::Dispatch(Action::SetVolume(volume))
        }
        "select" => {
            let id = device_arg(words.next(), "select")?;
            Command::Dispatch(Action::SelectDevice(id))
        }
        "sub" => {
            let id = device_arg(words.next(), "sub")?;
            let volume = volume_arg(words.next(), "sub")?;
            Command::Dispatch(Action::SetSubDeviceVolume(id, volume))
        }
        "clear" => Command::Dispatch(Action::SetError(None)),
        "quit" | "exit" => Command::Quit,
        other => return Err(CommandError::Unknown(other.to_string())),
    };

    if let Some(extra) = words.next() {
        return Err(CommandError::UnexpectedArgument(extra.to_string()));
    }

    Ok(Some(command))
}

fn volume_arg(word: Option<&str>, command: &'static str) -> Result<f32, CommandError> {
    let word = word.ok_or(CommandError::MissingArgument {
        command,
        argument: "volume",
    })?;
    word.parse::<f32>()
        .map_err(|_| CommandError::InvalidNumber(word.to_string()))
}

fn device_arg(word: Option<&str>, command: &'static str) -> Result<DeviceId, CommandError> {
    let word = word.ok_or(CommandError::MissingArgument {
        command,
        argument: "device",
    })?;
    word.parse::<u32>()
        .map(DeviceId::new)
        .map_err(|_| CommandError::InvalidNumber(word.to_string()))
}
