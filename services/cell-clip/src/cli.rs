//! Command-line parsing

use thiserror::Error;

pub const USAGE: &str = "\
Usage: cell-clip [--config-dir DIR] <command>

Commands:
  get <setting>   Print the cell value for a setting from config.toml
  list            List setting names
  auth setup      Save your Google OAuth client id and secret
  auth login      Authenticate with Google Sheets
  auth logout     Remove the stored token
  help            Show this message

Environment:
  CELL_CLIP_HOME  Config directory (default ~/.cell-clip)
  LOG_LEVEL       Log filter, e.g. debug (falls back to RUST_LOG)";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Get { setting: String },
    List,
    AuthSetup,
    AuthLogin,
    AuthLogout,
    Help,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Cli {
    pub config_dir: Option<String>,
    pub command: Command,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum UsageError {
    #[error("missing command")]
    MissingCommand,

    #[error("unknown command: {0}")]
    UnknownCommand(String),

    #[error("{0} requires a value")]
    MissingValue(&'static str),

    #[error("unexpected argument: {0}")]
    UnexpectedArgument(String),
}

/// Parse arguments, excluding the program name.
pub fn parse<I>(args: I) -> Result<Cli, UsageError>
where
    I: IntoIterator<Item = String>,
{
    let mut config_dir = None;
    let mut positional = Vec::new();

    let mut args = args.into_iter();
    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--config-dir" => {
                config_dir = Some(args.next().ok_or(UsageError::MissingValue("--config-dir"))?);
            }
            "-h" | "--help" => positional.push(String::from("help")),
            _ => {
                if let Some(dir) = arg.strip_prefix("--config-dir=") {
                    config_dir = Some(dir.to_string());
                } else {
                    positional.push(arg);
                }
            }
        }
    }

    let mut positional = positional.into_iter();
    let command = match positional.next().as_deref() {
        None => return Err(UsageError::MissingCommand),
        Some("help") => Command::Help,
        Some("list") => Command::List,
        Some("get") => Command::Get {
            setting: positional
                .next()
                .ok_or(UsageError::MissingValue("get"))?,
        },
        Some("auth") => match positional.next().as_deref() {
            Some("setup") => Command::AuthSetup,
            Some("login") => Command::AuthLogin,
            Some("logout") => Command::AuthLogout,
            Some(other) => return Err(UsageError::UnknownCommand(format!("auth {other}"))),
            None => return Err(UsageError::MissingValue("auth")),
        },
        Some(other) => return Err(UsageError::UnknownCommand(other.to_string())),
    };

    if let Some(extra) = positional.next() {
        return Err(UsageError::UnexpectedArgument(extra));
    }

    Ok(Cli {
        config_dir,
        command,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(s: &str) -> Vec<String> {
        s.split_whitespace().map(String::from).collect()
    }

    #[test]
    fn parses_get_with_config_dir() {
        let cli = parse(args("--config-dir /tmp/cc get budget")).unwrap();
        assert_eq!(cli.config_dir.as_deref(), Some("/tmp/cc"));
        assert_eq!(
            cli.command,
            Command::Get {
                setting: "budget".into()
            }
        );

        let cli = parse(args("get budget --config-dir=/tmp/cc")).unwrap();
        assert_eq!(cli.config_dir.as_deref(), Some("/tmp/cc"));
    }

    #[test]
    fn parses_auth_subcommands() {
        assert_eq!(parse(args("auth setup")).unwrap().command, Command::AuthSetup);
        assert_eq!(parse(args("auth login")).unwrap().command, Command::AuthLogin);
        assert_eq!(parse(args("auth logout")).unwrap().command, Command::AuthLogout);
        assert_eq!(
            parse(args("auth refresh")).unwrap_err(),
            UsageError::UnknownCommand("auth refresh".into())
        );
        assert_eq!(parse(args("auth")).unwrap_err(), UsageError::MissingValue("auth"));
    }

    #[test]
    fn rejects_bad_input() {
        assert_eq!(parse(args("")).unwrap_err(), UsageError::MissingCommand);
        assert_eq!(parse(args("get")).unwrap_err(), UsageError::MissingValue("get"));
        assert_eq!(
            parse(args("list extra")).unwrap_err(),
            UsageError::UnexpectedArgument("extra".into())
        );
        assert_eq!(
            parse(args("--config-dir")).unwrap_err(),
            UsageError::MissingValue("--config-dir")
        );
        assert_eq!(
            parse(args("copy x")).unwrap_err(),
            UsageError::UnknownCommand("copy".into())
        );
    }

    #[test]
    fn help_flag_maps_to_help() {
        assert_eq!(parse(args("--help")).unwrap().command, Command::Help);
    }
}
