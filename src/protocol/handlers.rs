//! Command handlers
//!
//! Translates parsed commands into storage operations and renders their
//! outcomes as protocol responses. Upload and download have a data phase
//! framed by the session loop, so they get dedicated entry points.

use log::info;

use crate::error::StoreError;
use crate::protocol::commands::{Command, CommandResult, CommandStatus};
use crate::protocol::responses::{
    ACTION_COMPLETED, DATA_OPEN, GOODBYE, OK, PATH_CREATED, SYNTAX_ERROR, TRANSFER_COMPLETE,
    UNKNOWN_COMMAND, error_response, format_response,
};
use crate::storage::{Entry, FileResource, FileStore};

/// Dispatches a received command to its corresponding handler.
///
/// `Retr` and `Stor` are not handled here: the session loop frames their
/// data phase and calls [`handle_download`] / [`handle_upload`] directly.
pub fn handle_command(store: &FileStore, command: &Command) -> CommandResult {
    match command {
        Command::List(path) => handle_cmd_list(store, path),
        Command::Stat(path) => handle_cmd_stat(store, path),
        Command::Mkd { path, name } => handle_cmd_mkd(store, path, name),
        Command::Move { path, target } => handle_cmd_move(store, path, target),
        Command::Ren { path, name } => handle_cmd_ren(store, path, name),
        Command::Del(path) => handle_cmd_del(store, path),
        Command::Quit => handle_cmd_quit(),
        Command::Retr(_) | Command::Stor { .. } => CommandResult {
            status: CommandStatus::Failure("data command outside session framing".into()),
            message: Some(format_response(
                SYNTAX_ERROR,
                "Transfer commands require a data phase",
            )),
        },
        Command::Unknown => handle_cmd_unknown(),
    }
}

/// Stores an uploaded payload once the session loop has read it.
pub fn handle_upload(
    store: &FileStore,
    path: &str,
    file_name: &str,
    content: &[u8],
) -> CommandResult {
    match store.upload(path, file_name, content) {
        Ok(destination) => success(format_response(
            TRANSFER_COMPLETE,
            &format!("Stored {}", destination.display()),
        )),
        Err(e) => failure(e),
    }
}

/// Opens a stored file for download; the session loop streams it out.
pub fn handle_download(store: &FileStore, path: &str) -> Result<FileResource, CommandResult> {
    store.load_resource(path).map_err(|e| failure(e))
}

/// Handles LIST: returns the directory listing inline, one entry per line.
fn handle_cmd_list(store: &FileStore, path: &str) -> CommandResult {
    match store.list(path) {
        Ok(entries) => {
            let mut message = format_response(DATA_OPEN, &format!("{} entries", entries.len()));
            for entry in &entries {
                message.push_str(&format_entry(entry));
                message.push_str("\r\n");
            }
            message.push_str(&format_response(TRANSFER_COMPLETE, "Listing complete"));
            success(message)
        }
        Err(e) => failure(e),
    }
}

/// Handles STAT: resolves a logical path and reports its absolute location.
fn handle_cmd_stat(store: &FileStore, path: &str) -> CommandResult {
    match store.load(path) {
        Ok(resolved) => success(format_response(OK, &resolved.display().to_string())),
        Err(e) => failure(e),
    }
}

/// Handles MKD: creates a directory under the given parent.
fn handle_cmd_mkd(store: &FileStore, path: &str, name: &str) -> CommandResult {
    match store.create_directory(path, name) {
        Ok(destination) => success(format_response(
            PATH_CREATED,
            &format!("\"{}\" created", destination.display()),
        )),
        Err(e) => failure(e),
    }
}

/// Handles MOVE: relocates an entry into a sibling or parent directory.
fn handle_cmd_move(store: &FileStore, path: &str, target: &str) -> CommandResult {
    match store.move_entry(path, target) {
        Ok(destination) => success(format_response(
            ACTION_COMPLETED,
            &format!("Moved to {}", destination.display()),
        )),
        Err(e) => failure(e),
    }
}

/// Handles REN: renames an entry in place, never clobbering a sibling.
fn handle_cmd_ren(store: &FileStore, path: &str, name: &str) -> CommandResult {
    match store.rename(path, name) {
        Ok(destination) => success(format_response(
            ACTION_COMPLETED,
            &format!("Renamed to {}", destination.display()),
        )),
        Err(e) => failure(e),
    }
}

/// Handles DEL: recursively removes an entry.
fn handle_cmd_del(store: &FileStore, path: &str) -> CommandResult {
    match store.delete(path) {
        Ok(()) => success(format_response(ACTION_COMPLETED, "Deleted")),
        Err(e) => failure(e),
    }
}

/// Handles QUIT: signals the session loop to close the connection.
fn handle_cmd_quit() -> CommandResult {
    CommandResult {
        status: CommandStatus::CloseConnection,
        message: Some(format_response(GOODBYE, "Goodbye")),
    }
}

fn handle_cmd_unknown() -> CommandResult {
    CommandResult {
        status: CommandStatus::Failure("unknown command".into()),
        message: Some(format_response(UNKNOWN_COMMAND, "Unknown command")),
    }
}

/// Render one listing line: `name[/]|size|modified`.
fn format_entry(entry: &Entry) -> String {
    match entry {
        Entry::Directory { name, modified } => format!("{}/|0|{}", name, modified),
        Entry::File { name, size, modified } => format!("{}|{}|{}", name, size, modified),
    }
}

fn success(message: String) -> CommandResult {
    CommandResult {
        status: CommandStatus::Success,
        message: Some(message),
    }
}

fn failure(error: StoreError) -> CommandResult {
    info!("Request failed: {}", error);
    CommandResult {
        status: CommandStatus::Failure(error.to_string()),
        message: Some(error_response(&error)),
    }
}
