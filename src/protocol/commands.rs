//! Command parsing
//!
//! Defines the command set accepted on a client connection and the data
//! structures used to represent commands, their status, and results.

/// A command parsed from client input.
///
/// Every path argument is a logical path relative to the storage root;
/// `/` denotes the root itself. Commands with missing or malformed
/// arguments parse as `Unknown`.
#[derive(Debug, PartialEq)]
pub enum Command {
    /// List the children of a directory (no argument lists the root)
    List(String),
    /// Resolve a path and report its absolute location
    Stat(String),
    /// Download a file
    Retr(String),
    /// Upload `size` bytes as `name` into the directory at `path`
    Stor { path: String, name: String, size: u64 },
    /// Create a directory `name` under `path`
    Mkd { path: String, name: String },
    /// Move the entry at `path` into `target` (`.` means up one level)
    Move { path: String, target: String },
    /// Rename the entry at `path` to `name`
    Ren { path: String, name: String },
    /// Recursively delete the entry at `path`
    Del(String),
    /// Close the connection
    Quit,
    /// Unknown or malformed command
    Unknown,
}

/// Outcome status of executing a command.
pub enum CommandStatus {
    Success,
    Failure(String),
    CloseConnection,
}

/// Full result of a command execution.
pub struct CommandResult {
    pub status: CommandStatus,
    pub message: Option<String>,
}

/// Parses a raw command line received from a client into a `Command`.
///
/// Validates required arguments and returns `Unknown` if a known command
/// is misused.
pub fn parse_command(raw: &str) -> Command {
    let trimmed = raw.trim();
    let mut parts = trimmed.splitn(2, char::is_whitespace);
    let cmd = parts.next().unwrap_or("").to_ascii_uppercase();
    let arg = parts.next().unwrap_or("").trim();

    match cmd.as_str() {
        "QUIT" | "Q" => Command::Quit,
        "LIST" => Command::List(arg.to_string()),
        "STAT" if !arg.is_empty() => Command::Stat(arg.to_string()),
        "RETR" if !arg.is_empty() => Command::Retr(arg.to_string()),
        "DEL" if !arg.is_empty() => Command::Del(arg.to_string()),
        "STOR" => {
            let mut args = arg.split_whitespace();
            match (
                args.next(),
                args.next(),
                args.next().and_then(|s| s.parse::<u64>().ok()),
            ) {
                (Some(path), Some(name), Some(size)) if size > 0 => Command::Stor {
                    path: path.to_string(),
                    name: name.to_string(),
                    size,
                },
                _ => Command::Unknown,
            }
        }
        "MKD" => match parse_pair(arg) {
            Some((path, name)) => Command::Mkd { path, name },
            None => Command::Unknown,
        },
        "MOVE" => match parse_pair(arg) {
            Some((path, target)) => Command::Move { path, target },
            None => Command::Unknown,
        },
        "REN" => match parse_pair(arg) {
            Some((path, name)) => Command::Ren { path, name },
            None => Command::Unknown,
        },
        _ => Command::Unknown,
    }
}

/// Split a two-argument command tail into its parts.
fn parse_pair(arg: &str) -> Option<(String, String)> {
    let mut args = arg.split_whitespace();
    match (args.next(), args.next(), args.next()) {
        (Some(first), Some(second), None) => Some((first.to_string(), second.to_string())),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_list_with_and_without_path() {
        assert_eq!(parse_command("LIST docs"), Command::List("docs".into()));
        assert_eq!(parse_command("LIST"), Command::List(String::new()));
        assert_eq!(parse_command("list docs"), Command::List("docs".into()));
    }

    #[test]
    fn parses_stor_with_size() {
        assert_eq!(
            parse_command("STOR docs report.txt 42"),
            Command::Stor {
                path: "docs".into(),
                name: "report.txt".into(),
                size: 42
            }
        );
        assert_eq!(parse_command("STOR docs report.txt"), Command::Unknown);
        assert_eq!(parse_command("STOR docs report.txt 0"), Command::Unknown);
        assert_eq!(parse_command("STOR docs report.txt x"), Command::Unknown);
    }

    #[test]
    fn parses_two_argument_commands() {
        assert_eq!(
            parse_command("MKD / docs"),
            Command::Mkd {
                path: "/".into(),
                name: "docs".into()
            }
        );
        assert_eq!(
            parse_command("MOVE docs/a.txt ."),
            Command::Move {
                path: "docs/a.txt".into(),
                target: ".".into()
            }
        );
        assert_eq!(
            parse_command("REN docs/a.txt b.txt"),
            Command::Ren {
                path: "docs/a.txt".into(),
                name: "b.txt".into()
            }
        );
        assert_eq!(parse_command("MKD docs"), Command::Unknown);
        assert_eq!(parse_command("REN docs a b"), Command::Unknown);
    }

    #[test]
    fn missing_arguments_degrade_to_unknown() {
        assert_eq!(parse_command("RETR"), Command::Unknown);
        assert_eq!(parse_command("DEL  "), Command::Unknown);
        assert_eq!(parse_command("NOPE"), Command::Unknown);
    }
}
