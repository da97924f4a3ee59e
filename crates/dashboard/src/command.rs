//! Line commands accepted on stdin.

use std::path::PathBuf;
use std::str::FromStr;

use mfw_core::WorkflowId;

pub const HELP: &str = "\
Commands:
  submit           submit the sample batch
  submit <path>    submit the JSON batch in <path>
  watch <id>       follow an existing workflow
  stop             stop following the current workflow
  show             render the dashboard now
  help             show this help
  quit | exit      leave";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Submit(Option<PathBuf>),
    Watch(WorkflowId),
    Stop,
    Show,
    Help,
    Quit,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CommandError {
    #[error("empty command")]
    Empty,

    #[error("unknown command '{0}' (try 'help')")]
    Unknown(String),

    #[error("'{0}' needs an argument")]
    MissingArgument(&'static str),

    #[error("invalid workflow id '{0}': must not contain whitespace, '/', '?', '#' or '%'")]
    InvalidId(String),
}

impl FromStr for Command {
    type Err = CommandError;

    fn from_str(line: &str) -> Result<Self, Self::Err> {
        let line = line.trim();
        let (verb, rest) = match line.split_once(char::is_whitespace) {
            Some((verb, rest)) => (verb, rest.trim()),
            None => (line, ""),
        };

        match verb {
            "" => Err(CommandError::Empty),
            "submit" if rest.is_empty() => Ok(Self::Submit(None)),
            "submit" => Ok(Self::Submit(Some(PathBuf::from(rest)))),
            "watch" if rest.is_empty() => Err(CommandError::MissingArgument("watch")),
            "watch" => {
                let id = WorkflowId::new(rest);
                if !id.is_path_safe() {
                    return Err(CommandError::InvalidId(rest.to_string()));
                }
                Ok(Self::Watch(id))
            }
            "stop" => Ok(Self::Stop),
            "show" => Ok(Self::Show),
            "help" | "?" => Ok(Self::Help),
            "quit" | "exit" => Ok(Self::Quit),
            other => Err(CommandError::Unknown(other.to_string())),
        }
    }
}
