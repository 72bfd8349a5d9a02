//! Parsing of `#`-prefixed chat commands.
//!
//! Lines without the sentinel are ordinary chat and are not commands.
//! Everything after the sentinel is split on whitespace; the first word is
//! the verb. The three error kinds are distinguished here for tests and
//! logs, but users only ever see one generic reply.

use crate::event::SessionEvent;

/// Leading character that marks a command.
pub const SENTINEL: char = '#';

/// Errors that can occur when parsing a command line.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CommandError {
    /// The verb is not one the bot understands (including an empty verb).
    #[error("unknown command verb: {0:?}")]
    UnknownVerb(String),

    /// A required argument was not supplied.
    #[error("missing argument <{0}>")]
    MissingArgument(&'static str),

    /// An argument that must be an integer was not one.
    #[error("argument <{argument}> is not an integer: {value:?}")]
    NonInteger {
        /// Name of the argument.
        argument: &'static str,
        /// What was supplied.
        value: String,
    },
}

/// A recognised command.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    /// `#start <width> <height>`.
    Start {
        /// Requested row count.
        width: i64,
        /// Requested column count.
        height: i64,
    },
    /// `#exit`.
    Exit,
    /// `#help` or `#info`.
    Help,
    /// `#help-play`.
    HelpPlay,
}

impl From<Command> for SessionEvent {
    fn from(command: Command) -> Self {
        match command {
            Command::Start { width, height } => Self::Start { width, height },
            Command::Exit => Self::Shutdown,
            Command::Help => Self::Help,
            Command::HelpPlay => Self::HelpDetail,
        }
    }
}

/// Parse one chat line.
///
/// Returns `Ok(None)` when the line does not start with [`SENTINEL`].
/// Extra arguments after `start`'s two dimensions are ignored.
///
/// # Errors
///
/// Returns [`CommandError`] for an unknown verb, a missing dimension or a
/// dimension that is not an integer.
pub fn parse_command(line: &str) -> Result<Option<Command>, CommandError> {
    let Some(rest) = line.strip_prefix(SENTINEL) else {
        return Ok(None);
    };
    let mut words = rest.split_whitespace();
    let verb = words.next().unwrap_or_default();

    let command = match verb {
        "start" => {
            let width = integer_argument(words.next(), "width")?;
            let height = integer_argument(words.next(), "height")?;
            Command::Start { width, height }
        }
        "exit" => Command::Exit,
        "help" | "info" => Command::Help,
        "help-play" => Command::HelpPlay,
        other => return Err(CommandError::UnknownVerb(other.to_owned())),
    };
    Ok(Some(command))
}

fn integer_argument(word: Option<&str>, argument: &'static str) -> Result<i64, CommandError> {
    let value = word.ok_or(CommandError::MissingArgument(argument))?;
    value.parse().map_err(|_err| CommandError::NonInteger {
        argument,
        value: value.to_owned(),
    })
}
