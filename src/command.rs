//! Line-oriented commands typed into the terminal front end.

use crate::reader::ReaderCommand;
use std::path::PathBuf;
use std::str::FromStr;
use thiserror::Error;

pub const HELP_TEXT: &str = "\
Commands:
  open <path>     load a PDF, DOCX, text or image file
  play            start narration at the first unit of the page
  pause           pause narration
  resume          continue paused narration
  toggle          play, pause or resume as appropriate
  stop            stop narration and rewind
  seek <n>        jump to unit n (0-based) and speak from there
  next | prev     jump one unit forward or back
  next-page       turn to the next PDF page
  prev-page       turn to the previous PDF page
  status [--json] show reader status
  voices          list the engine's voices
  help            show this help
  quit            exit";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TerminalCommand {
    Reader(ReaderCommand),
    Status { json: bool },
    Voices,
    Help,
    Quit,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum CommandParseError {
    #[error("empty command")]
    Empty,
    #[error("unknown command `{0}` (try `help`)")]
    Unknown(String),
    #[error("`{command}` needs {what}")]
    MissingArgument {
        command: &'static str,
        what: &'static str,
    },
    #[error("`{0}` is not a unit index")]
    InvalidIndex(String),
    #[error("unexpected argument `{0}`")]
    UnexpectedArgument(String),
}

impl FromStr for TerminalCommand {
    type Err = CommandParseError;

    fn from_str(line: &str) -> Result<Self, Self::Err> {
        let line = line.trim();
        let (verb, rest) = match line.split_once(char::is_whitespace) {
            Some((verb, rest)) => (verb, rest.trim()),
            None => (line, ""),
        };
        let no_args = |command: TerminalCommand| {
            if rest.is_empty() {
                Ok(command)
            } else {
                Err(CommandParseError::UnexpectedArgument(rest.to_string()))
            }
        };

        match verb.to_ascii_lowercase().as_str() {
            "" => Err(CommandParseError::Empty),
            "open" | "o" => {
                if rest.is_empty() {
                    return Err(CommandParseError::MissingArgument {
                        command: "open",
                        what: "a file path",
                    });
                }
                let path = rest.trim_matches(|c: char| c == '"' || c == '\'');
                Ok(TerminalCommand::Reader(ReaderCommand::LoadFile {
                    path: PathBuf::from(path),
                }))
            }
            "play" | "p" => no_args(TerminalCommand::Reader(ReaderCommand::Play)),
            "pause" => no_args(TerminalCommand::Reader(ReaderCommand::Pause)),
            "resume" | "r" => no_args(TerminalCommand::Reader(ReaderCommand::Resume)),
            "toggle" | "t" => no_args(TerminalCommand::Reader(ReaderCommand::TogglePlayPause)),
            "stop" | "s" => no_args(TerminalCommand::Reader(ReaderCommand::Stop)),
            "seek" => {
                if rest.is_empty() {
                    return Err(CommandParseError::MissingArgument {
                        command: "seek",
                        what: "a unit index",
                    });
                }
                let index = rest
                    .parse::<usize>()
                    .map_err(|_| CommandParseError::InvalidIndex(rest.to_string()))?;
                Ok(TerminalCommand::Reader(ReaderCommand::SeekToUnit { index }))
            }
            "next" | "n" => no_args(TerminalCommand::Reader(ReaderCommand::NextUnit)),
            "prev" => no_args(TerminalCommand::Reader(ReaderCommand::PrevUnit)),
            "next-page" | "np" => no_args(TerminalCommand::Reader(ReaderCommand::NextPage)),
            "prev-page" | "pp" => no_args(TerminalCommand::Reader(ReaderCommand::PrevPage)),
            "status" => match rest {
                "" => Ok(TerminalCommand::Status { json: false }),
                "--json" => Ok(TerminalCommand::Status { json: true }),
                other => Err(CommandParseError::UnexpectedArgument(other.to_string())),
            },
            "voices" => no_args(TerminalCommand::Voices),
            "help" | "?" => no_args(TerminalCommand::Help),
            "quit" | "exit" | "q" => no_args(TerminalCommand::Quit),
            other => Err(CommandParseError::Unknown(other.to_string())),
        }
    }
}
