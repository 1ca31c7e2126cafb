//! Command line surface: `dummy-client attrs|cmd|dummy`

use std::{fmt, str::FromStr};

/// What the client does in this run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    /// Send a random temperature reading
    Attrs,

    /// Wait for one command and send its result
    Cmd,

    /// Send placeholder data
    Dummy,
}

impl Command {
    /// The argument that selects this command
    pub fn as_str(&self) -> &'static str {
        match self {
            Command::Attrs => "attrs",
            Command::Cmd => "cmd",
            Command::Dummy => "dummy",
        }
    }
}

impl fmt::Display for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Command {
    type Err = CliError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "attrs" => Ok(Command::Attrs),
            "cmd" => Ok(Command::Cmd),
            "dummy" => Ok(Command::Dummy),
            other => Err(CliError::Unknown(other.to_string())),
        }
    }
}

/// Invalid invocations, both exit with status 1
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CliError {
    /// No command was given
    #[error("Usage: {0} attrs|cmd|dummy")]
    Usage(String),

    /// The command is not one of `attrs|cmd|dummy`
    #[error("unknown cmd ({0})")]
    Unknown(String),
}

/// Parses the process arguments, the first item being the program name
///
/// Arguments after the command are ignored.
pub fn parse_args<I>(args: I) -> Result<Command, CliError>
where
    I: IntoIterator<Item = String>,
{
    let mut args = args.into_iter();
    let program = args.next().unwrap_or_else(|| String::from("dummy-client"));
    match args.next() {
        Some(arg) => arg.parse(),
        None => Err(CliError::Usage(program)),
    }
}
